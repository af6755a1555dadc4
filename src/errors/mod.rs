/**********************************************
  > File Name		: errors.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 11:05:17 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Define some erros enum for global usage.
 *
 * Every failure aborts the call that triggered it, nothing is retried
 * internally.
 */

use std::io;
use thiserror::Error;

use crate::field_management::FieldType;

pub type Result<T> = std::result::Result<T, Error>;

/*
 * Errors raised while building or parsing a single field descriptor.
 */
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field type code {0:#04x}")]
    UnknownTypeCode(u8),
    #[error("invalid field name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("invalid length {length} for {field_type:?} field {name:?}")]
    InvalidLength {
        name: String,
        field_type: FieldType,
        length: usize,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("unsupported charset {0}")]
    UnsupportedCharset(String),
    #[error("invalid field definition: {0}")]
    InvalidFieldDefinition(String),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("illegal state: {0}")]
    IllegalState(&'static str),
    #[error("{what} index {index} out of range, valid range is 0..{len}")]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("record length mismatch: read {actual} bytes, expected {expected}")]
    RecordLengthMismatch { expected: usize, actual: usize },
    #[error("unsupported field type {0:?} on the write path")]
    UnsupportedFieldType(FieldType),
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
