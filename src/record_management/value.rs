/**********************************************
  > File Name		: value.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 02:14:50 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::collections::HashMap;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};

use super::decimal::Decimal;

/*
 * Payload of a memo block, text for memo columns and raw bytes for
 * the binary family.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum MemoData {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Decimal(Decimal),
    Logical(bool),
    Integer(i32),
    Double(f64),
    Timestamp(NaiveDateTime),
    Memo(MemoData),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::Decimal(_) => "decimal",
            Value::Logical(_) => "logical",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Timestamp(_) => "timestamp",
            Value::Memo(_) => "memo",
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Logical(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

/*
 * A decoded row: the user visible values in column order, the
 * deletion mark, and a shared lowercase name -> column map.
 */
#[derive(Debug, Clone)]
pub struct Record {
    deleted: bool,
    values: Vec<Value>,
    names: Rc<HashMap<String, usize>>,
}

impl Record {
    pub fn new(deleted: bool, values: Vec<Value>, names: Rc<HashMap<String, usize>>) -> Self {
        Self {
            deleted,
            values,
            names,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.names
            .get(&name.to_lowercase())
            .and_then(|i| self.values.get(*i))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
