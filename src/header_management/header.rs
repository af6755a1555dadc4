/**********************************************
  > File Name		: header.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 11:20:33 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Header layout:
 *
 *     0        signature
 *     1..=3    last modification date, year since 1900, month, day
 *     4..=7    number of records
 *     8..=9    header length
 *     10..=11  record length
 *     12..=13  reserved
 *     14       incomplete transaction
 *     15       encryption flag
 *     16..=19  free record thread
 *     20..=27  reserved
 *     28       mdx flag
 *     29       language driver
 *     30..=31  reserved
 *     32..     field descriptors, then 0x0D
 *
 * Header length and record length are derived from the fields every
 * time the header is written. Bytes a file keeps between the
 * terminator and the first record, like the 263 byte backlink area of
 * Visual FoxPro tables, stay counted in the header length but are
 * never written here.
 */

use std::io::{Cursor, ErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{Datelike, Local, NaiveDate};

use crate::charset::Charset;
use crate::errors::{Error, Result};
use crate::field_management::{FieldDescriptor, FieldEntry, FIELD_DESCRIPTOR_SIZE, HEADER_TERMINATOR};
use crate::io_or_return;

pub const HEADER_PROLOGUE_SIZE: usize = 32;
pub const SIG_DBASE_III: u8 = 0x03;

const VALID_SIGNATURES: [u8; 15] = [
    0x02, 0x03, 0x04, 0x05, 0x30, 0x31, 0x32, 0x43, 0x63, 0x83, 0x8B, 0x8E, 0xCB, 0xF5, 0xFB,
];

#[derive(Debug, Clone)]
pub struct Header {
    pub signature: u8,
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub number_of_records: u32,
    pub header_length: u16,
    pub record_length: u16,
    reserved1: u16,
    pub incomplete_transaction: u8,
    pub encryption_flag: u8,
    pub free_record_thread: u32,
    reserved2: u32,
    reserved3: u32,
    pub mdx_flag: u8,
    pub language_driver: u8,
    reserved4: u16,
    pub fields: Vec<FieldDescriptor>,
    charset: Charset,
    padding: u16, //bytes after the terminator, part of header_length.
}

impl Header {
    pub fn new(charset: Charset) -> Self {
        Self {
            signature: SIG_DBASE_III,
            year: 0,
            month: 0,
            day: 0,
            number_of_records: 0,
            header_length: 0,
            record_length: 0,
            reserved1: 0,
            incomplete_transaction: 0,
            encryption_flag: 0,
            free_record_thread: 0,
            reserved2: 0,
            reserved3: 0,
            mdx_flag: 0,
            language_driver: charset.language_driver().unwrap_or(0),
            reserved4: 0,
            fields: Vec::new(),
            charset,
            padding: 0,
        }
    }

    /*
     * Read the prologue and the descriptor list. A charset passed in
     * takes precedence over the language driver of the file.
     */
    pub fn parse<R: Read>(input: &mut R, charset: Option<Charset>) -> Result<Self> {
        let mut prologue = [0u8; HEADER_PROLOGUE_SIZE];
        match input.read_exact(&mut prologue) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::MalformedHeader("file shorter than the header prologue".to_string()));
            }
            Err(e) => return Err(Error::io("read header prologue", e)),
        }
        if !VALID_SIGNATURES.contains(&prologue[0]) {
            return Err(Error::MalformedHeader(format!("bad signature {:#04x}", prologue[0])));
        }

        let mut cursor = Cursor::new(&prologue[1..]);
        let year = io_or_return!(cursor.read_u8(), "read header");
        let month = io_or_return!(cursor.read_u8(), "read header");
        let day = io_or_return!(cursor.read_u8(), "read header");
        let number_of_records = io_or_return!(cursor.read_u32::<LittleEndian>(), "read header");
        let header_length = io_or_return!(cursor.read_u16::<LittleEndian>(), "read header");
        let record_length = io_or_return!(cursor.read_u16::<LittleEndian>(), "read header");
        let reserved1 = io_or_return!(cursor.read_u16::<LittleEndian>(), "read header");
        let incomplete_transaction = io_or_return!(cursor.read_u8(), "read header");
        let encryption_flag = io_or_return!(cursor.read_u8(), "read header");
        let free_record_thread = io_or_return!(cursor.read_u32::<LittleEndian>(), "read header");
        let reserved2 = io_or_return!(cursor.read_u32::<LittleEndian>(), "read header");
        let reserved3 = io_or_return!(cursor.read_u32::<LittleEndian>(), "read header");
        let mdx_flag = io_or_return!(cursor.read_u8(), "read header");
        let language_driver = io_or_return!(cursor.read_u8(), "read header");
        let reserved4 = io_or_return!(cursor.read_u16::<LittleEndian>(), "read header");

        let mut fields = Vec::new();
        while let FieldEntry::Field(field) = FieldDescriptor::parse(input)? {
            fields.push(field);
        }

        if Self::derive_record_length(&fields).ok() != Some(record_length) {
            return Err(Error::MalformedHeader(format!(
                "record length {} does not match the {} fields",
                record_length,
                fields.len()
            )));
        }
        let padding = match Self::derive_header_length(fields.len()) {
            Ok(derived) if header_length >= derived => header_length - derived,
            _ => {
                return Err(Error::MalformedHeader(format!(
                    "header length {} is too short for {} fields",
                    header_length,
                    fields.len()
                )))
            }
        };

        Ok(Self {
            signature: prologue[0],
            year,
            month,
            day,
            number_of_records,
            header_length,
            record_length,
            reserved1,
            incomplete_transaction,
            encryption_flag,
            free_record_thread,
            reserved2,
            reserved3,
            mdx_flag,
            language_driver,
            reserved4,
            fields,
            charset: charset.unwrap_or_else(|| Charset::from_language_driver(language_driver)),
            padding,
        })
    }

    pub fn serialize<W: Write>(&mut self, output: &mut W) -> Result<()> {
        self.serialize_on(output, Local::now().date_naive())
    }

    /*
     * Stamp the given date, derive both lengths from the live field
     * list, then write prologue, descriptors and terminator.
     */
    pub fn serialize_on<W: Write>(&mut self, output: &mut W, today: NaiveDate) -> Result<()> {
        let header_length = match Self::derive_header_length(self.fields.len())?.checked_add(self.padding) {
            Some(length) => length,
            None => {
                return Err(Error::InvalidFieldDefinition(format!(
                    "{} fields do not fit in a header",
                    self.fields.len()
                )))
            }
        };
        let record_length = Self::derive_record_length(&self.fields)?;
        self.header_length = header_length;
        self.record_length = record_length;
        self.year = (today.year() - 1900) as u8;
        self.month = today.month() as u8;
        self.day = today.day() as u8;
        if let Some(driver) = self.charset.language_driver() {
            self.language_driver = driver;
        }

        let mut buf = Vec::with_capacity(header_length as usize - self.padding as usize);
        Self::encode_prologue(self, &mut buf)?;
        let mut displacement: u32 = 1;
        for field in &self.fields {
            field.write(&mut buf, displacement)?;
            displacement += field.length() as u32;
        }
        buf.push(HEADER_TERMINATOR);
        io_or_return!(output.write_all(&buf), "write header");
        Ok(())
    }

    fn encode_prologue(&self, buf: &mut Vec<u8>) -> Result<()> {
        buf.push(self.signature);
        buf.push(self.year);
        buf.push(self.month);
        buf.push(self.day);
        io_or_return!(buf.write_u32::<LittleEndian>(self.number_of_records), "encode header");
        io_or_return!(buf.write_u16::<LittleEndian>(self.header_length), "encode header");
        io_or_return!(buf.write_u16::<LittleEndian>(self.record_length), "encode header");
        io_or_return!(buf.write_u16::<LittleEndian>(self.reserved1), "encode header");
        buf.push(self.incomplete_transaction);
        buf.push(self.encryption_flag);
        io_or_return!(buf.write_u32::<LittleEndian>(self.free_record_thread), "encode header");
        io_or_return!(buf.write_u32::<LittleEndian>(self.reserved2), "encode header");
        io_or_return!(buf.write_u32::<LittleEndian>(self.reserved3), "encode header");
        buf.push(self.mdx_flag);
        buf.push(self.language_driver);
        io_or_return!(buf.write_u16::<LittleEndian>(self.reserved4), "encode header");
        Ok(())
    }

    pub fn derive_header_length(field_count: usize) -> Result<u16> {
        let length = HEADER_PROLOGUE_SIZE + FIELD_DESCRIPTOR_SIZE * field_count + 1;
        if length > u16::MAX as usize {
            return Err(Error::InvalidFieldDefinition(format!(
                "{} fields do not fit in a header",
                field_count
            )));
        }
        Ok(length as u16)
    }

    pub fn derive_record_length(fields: &[FieldDescriptor]) -> Result<u16> {
        let length = 1 + fields.iter().map(|f| f.length()).sum::<usize>();
        if length > u16::MAX as usize {
            return Err(Error::InvalidFieldDefinition(format!(
                "record of {} bytes is too long",
                length
            )));
        }
        Ok(length as u16)
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn last_modification_date(&self) -> Option<NaiveDate> {
        if self.year == 0 || self.month == 0 || self.day == 0 {
            return None;
        }
        NaiveDate::from_ymd_opt(1900 + self.year as i32, self.month as u32, self.day as u32)
    }
}
