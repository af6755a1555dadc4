/**********************************************
  > File Name		: field_descriptor.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 10:03:51 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Field descriptor layout, 32 bytes each:
 *
 *     0..=10   name, padded with NUL
 *     11       type code
 *     12..=15  displacement of the field inside the record
 *     16       length
 *     17       decimal count (high byte of length for wide char fields)
 *     18       flags: system | nullable | binary
 *     19..=31  reserved
 *
 * The list of descriptors ends with a 0x0D byte where the next name
 * would start.
 */

use std::io::{ErrorKind, Read, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use super::field_type::FieldType;
use crate::errors::{Error, FieldError, Result};
use crate::io_or_return;

pub const FIELD_DESCRIPTOR_SIZE: usize = 32;
pub const HEADER_TERMINATOR: u8 = 0x0D;
pub const MAX_NAME_LEN: usize = 10;
pub const NULL_FLAGS_NAME: &str = "_NullFlags";

const NAME_SIZE: usize = 11;

const FLAG_SYSTEM: u8 = 0x01;
const FLAG_NULLABLE: u8 = 0x02;
const FLAG_BINARY: u8 = 0x04;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: String,
    field_type: FieldType,
    length: usize,
    decimal_count: u8,
    flags: u8,
}

/*
 * What parsing one descriptor slot produced.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEntry {
    Field(FieldDescriptor),
    End,
}

impl FieldDescriptor {
    pub fn new(name: &str, field_type: FieldType, length: usize, decimal_count: u8) -> std::result::Result<Self, FieldError> {
        Self::check_name(name)?;
        let decimals_ok = match field_type {
            FieldType::Numeric | FieldType::FloatingPoint => (decimal_count as usize) < length,
            _ => true,
        };
        if !Self::width_ok(field_type, length) || !decimals_ok {
            return Err(FieldError::InvalidLength {
                name: name.to_string(),
                field_type,
                length,
            });
        }
        Ok(Self {
            name: name.to_string(),
            field_type,
            length,
            decimal_count,
            flags: 0,
        })
    }

    pub fn character(name: &str, length: usize) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Character, length, 0)
    }

    pub fn varchar(name: &str, length: usize) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Varchar, length, 0)
    }

    pub fn varbinary(name: &str, length: usize) -> std::result::Result<Self, FieldError> {
        Ok(Self::new(name, FieldType::Varbinary, length, 0)?.with_flag(FLAG_BINARY))
    }

    pub fn numeric(name: &str, length: usize, decimal_count: u8) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Numeric, length, decimal_count)
    }

    pub fn date(name: &str) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Date, 8, 0)
    }

    pub fn logical(name: &str) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Logical, 1, 0)
    }

    pub fn long(name: &str) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Long, 4, 0)
    }

    pub fn double(name: &str) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Double, 8, 0)
    }

    pub fn timestamp(name: &str) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Timestamp, 8, 0)
    }

    pub fn currency(name: &str) -> std::result::Result<Self, FieldError> {
        Self::new(name, FieldType::Currency, 8, 4)
    }

    //memo pointers are stored as 10 ascii digits or a 4 byte integer.
    pub fn memo(name: &str, field_type: FieldType, length: usize) -> std::result::Result<Self, FieldError> {
        if length != 4 && length != 10 {
            return Err(FieldError::InvalidLength {
                name: name.to_string(),
                field_type,
                length,
            });
        }
        Self::new(name, field_type, length, 0)
    }

    /*
     * Widths the record codec can work with. Binary columns hold a
     * double when 8 bytes wide and a memo pointer otherwise.
     */
    fn width_ok(field_type: FieldType, length: usize) -> bool {
        let max = match field_type {
            FieldType::Character => u16::MAX as usize,
            _ => u8::MAX as usize,
        };
        if length == 0 || length > max {
            return false;
        }
        if let Some(fixed) = field_type.fixed_length() {
            return length == fixed;
        }
        match field_type {
            FieldType::Currency => length >= 4,
            FieldType::Memo | FieldType::GeneralOle | FieldType::Picture | FieldType::Blob => {
                length == 4 || length == 10
            }
            FieldType::Binary => length == 4 || length == 8 || length == 10,
            _ => true,
        }
    }

    /*
     * The system column holding one bit per nullable field and one
     * per variable length field, sized for the given columns.
     */
    pub fn null_flags_for(fields: &[FieldDescriptor]) -> Self {
        let bits: usize = fields
            .iter()
            .map(|f| f.is_nullable() as usize + f.field_type.is_variable() as usize)
            .sum();
        let length = ((bits + 7) / 8).max(1);
        Self {
            name: NULL_FLAGS_NAME.to_string(),
            field_type: FieldType::NullFlags,
            length,
            decimal_count: 0,
            flags: FLAG_SYSTEM | FLAG_BINARY,
        }
    }

    pub fn nullable(self) -> Self {
        self.with_flag(FLAG_NULLABLE)
    }

    fn with_flag(mut self, flag: u8) -> Self {
        self.flags |= flag;
        self
    }

    fn check_name(name: &str) -> std::result::Result<(), FieldError> {
        let reason = if name.is_empty() {
            Some("empty name")
        } else if name.len() > MAX_NAME_LEN {
            Some("longer than 10 bytes")
        } else if !name.is_ascii() || name.bytes().any(|b| b == 0) {
            Some("must be ascii without NUL")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(FieldError::InvalidName {
                name: name.to_string(),
                reason,
            }),
            None => Ok(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn decimal_count(&self) -> u8 {
        self.decimal_count
    }

    pub fn is_system(&self) -> bool {
        self.flags & FLAG_SYSTEM != 0
    }

    pub fn is_nullable(&self) -> bool {
        self.flags & FLAG_NULLABLE != 0
    }

    pub fn is_binary(&self) -> bool {
        self.flags & FLAG_BINARY != 0
    }

    /*
     * Parse the next descriptor slot. A terminator where the name
     * should start ends the list, the terminator is consumed.
     */
    pub fn parse<R: Read>(input: &mut R) -> Result<FieldEntry> {
        let mut buf = [0u8; FIELD_DESCRIPTOR_SIZE];
        Self::read_or_malformed(input, &mut buf[..1])?;
        if buf[0] == HEADER_TERMINATOR {
            return Ok(FieldEntry::End);
        }
        Self::read_or_malformed(input, &mut buf[1..])?;

        let name_end = buf[..NAME_SIZE].iter().position(|b| *b == 0).unwrap_or(NAME_SIZE);
        let name: String = buf[..name_end].iter().map(|b| *b as char).collect();
        let name = name.trim().to_string();

        let field_type = match FieldType::from_code(buf[11]) {
            Some(t) => t,
            None => return Err(FieldError::UnknownTypeCode(buf[11]).into()),
        };
        let (length, decimal_count) = match field_type {
            FieldType::Character => (buf[16] as usize | (buf[17] as usize) << 8, 0),
            _ => (buf[16] as usize, buf[17]),
        };
        if !Self::width_ok(field_type, length) {
            return Err(Error::MalformedHeader(format!(
                "{:?} field {:?} cannot be {} bytes wide",
                field_type, name, length
            )));
        }
        Ok(FieldEntry::Field(Self {
            name,
            field_type,
            length,
            decimal_count,
            flags: buf[18],
        }))
    }

    fn read_or_malformed<R: Read>(input: &mut R, buf: &mut [u8]) -> Result<()> {
        match input.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(Error::MalformedHeader("truncated field descriptor list".to_string()))
            }
            Err(e) => Err(Error::io("read field descriptor", e)),
        }
    }

    pub fn write<W: Write>(&self, output: &mut W, displacement: u32) -> Result<()> {
        let mut buf = Vec::with_capacity(FIELD_DESCRIPTOR_SIZE);
        let mut name = [0u8; NAME_SIZE];
        let n = self.name.len().min(MAX_NAME_LEN);
        name[..n].copy_from_slice(&self.name.as_bytes()[..n]);
        buf.extend_from_slice(&name);
        buf.push(self.field_type.code());
        io_or_return!(buf.write_u32::<LittleEndian>(displacement), "encode field displacement");
        match self.field_type {
            FieldType::Character => {
                buf.push((self.length & 0xff) as u8);
                buf.push((self.length >> 8) as u8);
            }
            _ => {
                buf.push(self.length as u8);
                buf.push(self.decimal_count);
            }
        }
        buf.push(self.flags);
        buf.resize(FIELD_DESCRIPTOR_SIZE, 0);
        io_or_return!(output.write_all(&buf), "write field descriptor");
        Ok(())
    }
}
