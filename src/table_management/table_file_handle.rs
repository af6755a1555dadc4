/**********************************************
  > File Name		: table_file_handle.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 12 Apr 2021 11:01:57 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * A TableFileHandle gives random access to the records of one table
 * file.
 *
 * File layout: header | record 0 | record 1 | ... | 0x1A
 *
 * The byte offset of record i is header_length + record_length * i,
 * so any record or field can be read or overwritten in place. Each
 * operation seeks right before its own read or write, a handle is
 * not meant to be shared between threads.
 *
 * Appended records are counted in memory, the header on disk gets the
 * final count when the handle is closed.
 */

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::rc::Rc;

use chrono::NaiveDate;
use log::{debug, info, trace, warn};

use super::options::TableOptions;
use crate::charset::Charset;
use crate::errors::{Error, Result};
use crate::field_management::FieldDescriptor;
use crate::header_management::Header;
use crate::record_management::record_codec::{self, DecodeContext, EncodeContext, Occupancy};
use crate::record_management::{MemoLink, Record, Value, ACTIVE_MARKER, DELETED_MARKER, END_OF_DATA};
use crate::utils;
use crate::{illegal_state_if, io_or_return};

/*
 * A column addressed by its position among the user visible fields,
 * or by its name, compared case-insensitively.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Index(usize),
    Name(&'a str),
}

impl From<usize> for FieldRef<'_> {
    fn from(index: usize) -> Self {
        FieldRef::Index(index)
    }
}

impl<'a> From<&'a str> for FieldRef<'a> {
    fn from(name: &'a str) -> Self {
        FieldRef::Name(name)
    }
}

pub struct TableFileHandle {
    file: Option<File>, //None once closed.
    header: Header,
    fields_defined: bool,
    record_count: usize, //includes records appended since open.
    options: TableOptions,
    memo: Option<Box<dyn MemoLink>>,
    user_fields: Vec<usize>, //user visible index -> index in header.fields
    names: Rc<HashMap<String, usize>>,
}

impl TableFileHandle {
    pub(crate) fn new(file: File, header: Header, fields_defined: bool, options: TableOptions) -> Self {
        let mut handle = Self {
            file: Some(file),
            record_count: header.number_of_records as usize,
            header,
            fields_defined,
            options,
            memo: None,
            user_fields: Vec::new(),
            names: Rc::new(HashMap::new()),
        };
        handle.index_fields();
        handle
    }

    fn index_fields(&mut self) {
        self.user_fields = self
            .header
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| !f.is_system())
            .map(|(i, _)| i)
            .collect();
        let names = self
            .user_fields
            .iter()
            .enumerate()
            .map(|(user, physical)| (self.header.fields[*physical].name().to_lowercase(), user))
            .collect();
        self.names = Rc::new(names);
    }

    /*
     * Fields can be set once. For a new file the header is written
     * right away, so the field layout is on disk before any record.
     */
    pub fn define_fields(&mut self, fields: &[FieldDescriptor]) -> Result<()> {
        illegal_state_if!(self.file.is_none(), "cannot set fields of a closed table");
        illegal_state_if!(self.fields_defined, "fields have already been set");
        if fields.is_empty() {
            return Err(Error::InvalidFieldDefinition("should have at least one field".to_string()));
        }
        let mut seen = HashMap::new();
        for (i, field) in fields.iter().enumerate() {
            if let Some(prev) = seen.insert(field.name().to_lowercase(), i) {
                return Err(Error::InvalidFieldDefinition(format!(
                    "field {} has the same name as field {}: {}",
                    i,
                    prev,
                    field.name()
                )));
            }
        }
        let header_length = Header::derive_header_length(fields.len())?;
        let record_length = Header::derive_record_length(fields)?;

        self.header.fields = fields.to_vec();
        self.header.header_length = header_length;
        self.header.record_length = record_length;
        self.fields_defined = true;
        self.index_fields();
        debug!("defined {} fields", fields.len());

        let file = opened(&mut self.file)?;
        let len = io_or_return!(file.metadata(), "stat table file").len();
        if len == 0 {
            io_or_return!(file.seek(SeekFrom::Start(0)), "seek to header");
            self.header.serialize(file)?;
        }
        Ok(())
    }

    pub fn field(&self, index: usize) -> Result<&FieldDescriptor> {
        match self.user_fields.get(index) {
            Some(physical) => Ok(&self.header.fields[*physical]),
            None => Err(Error::OutOfRange {
                what: "field",
                index,
                len: self.user_fields.len(),
            }),
        }
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.names
            .get(&name.to_lowercase())
            .map(|user| &self.header.fields[self.user_fields[*user]])
    }

    pub fn field_count(&self) -> usize {
        self.user_fields.len()
    }

    //the count stored in the header, appends show up after close.
    pub fn record_count(&self) -> usize {
        self.header.number_of_records as usize
    }

    pub fn live_record_count(&self) -> usize {
        self.record_count
    }

    pub fn charset(&self) -> Charset {
        self.header.charset()
    }

    pub fn last_modification_date(&self) -> Option<NaiveDate> {
        self.header.last_modification_date()
    }

    fn resolve(&self, field: FieldRef<'_>) -> Result<usize> {
        match field {
            FieldRef::Index(index) if index < self.user_fields.len() => Ok(index),
            FieldRef::Index(index) => Err(Error::OutOfRange {
                what: "field",
                index,
                len: self.user_fields.len(),
            }),
            FieldRef::Name(name) => match self.names.get(&name.to_lowercase()) {
                Some(index) => Ok(*index),
                None => Err(Error::invalid_value(name, "no such field")),
            },
        }
    }

    fn check_record_index(&self, index: usize) -> Result<()> {
        if index >= self.record_count {
            return Err(Error::OutOfRange {
                what: "record",
                index,
                len: self.record_count,
            });
        }
        Ok(())
    }

    fn record_offset(&self, index: usize) -> u64 {
        self.header.header_length as u64 + self.header.record_length as u64 * index as u64
    }

    /*
     * Read and decode one record. A deleted record is None unless the
     * table was opened with show_deleted.
     */
    pub fn get_record(&mut self, index: usize) -> Result<Option<Record>> {
        illegal_state_if!(self.file.is_none(), "table file is closed");
        self.check_record_index(index)?;
        let offset = self.record_offset(index);
        let record_length = self.header.record_length as usize;

        let file = opened(&mut self.file)?;
        io_or_return!(file.seek(SeekFrom::Start(offset)), "seek to record");
        let mut data = Vec::with_capacity(record_length);
        io_or_return!(
            file.take(record_length as u64).read_to_end(&mut data),
            "read record"
        );
        if data.len() != record_length {
            return Err(Error::RecordLengthMismatch {
                expected: record_length,
                actual: data.len(),
            });
        }
        trace!("read record {} at offset {}", index, offset);

        if data[0] == DELETED_MARKER && !self.options.show_deleted {
            return Ok(None);
        }
        let ctx = DecodeContext {
            charset: self.header.charset(),
            trim_right_spaces: self.options.trim_right_spaces,
            memo: self.memo.as_deref(),
        };
        let (deleted, values) = record_codec::decode_record(&ctx, &self.header.fields, &data)?;
        Ok(Some(Record::new(deleted, values, Rc::clone(&self.names))))
    }

    pub fn get_value<'a, F: Into<FieldRef<'a>>>(&mut self, index: usize, field: F) -> Result<Option<Value>> {
        let user = self.resolve(field.into())?;
        let record = self.get_record(index)?;
        Ok(record.and_then(|r| r.into_values().into_iter().nth(user)))
    }

    /*
     * Overwrite the bytes of one field in place. The null flags bits
     * of the field, if any, are updated along with it.
     */
    pub fn update_field<'a, F: Into<FieldRef<'a>>>(&mut self, index: usize, field: F, value: &Value) -> Result<()> {
        illegal_state_if!(self.file.is_none(), "table file is closed");
        illegal_state_if!(!self.fields_defined, "fields are not defined");
        let user = self.resolve(field.into())?;
        self.check_record_index(index)?;
        let encoded = self.encode_value(user, value)?;
        debug!("update record {} field {}", index, self.header.fields[encoded.physical].name());
        self.write_fields(index, None, &[encoded])
    }

    /*
     * Mark the record active and overwrite every field with values,
     * given in user visible column order. All values are encoded
     * before the first byte is written, a rejected value leaves the
     * record as it was.
     */
    pub fn update_record(&mut self, index: usize, values: &[Value]) -> Result<()> {
        illegal_state_if!(self.file.is_none(), "table file is closed");
        illegal_state_if!(!self.fields_defined, "fields are not defined");
        self.check_record_count(values)?;
        self.check_record_index(index)?;
        let encoded = values
            .iter()
            .enumerate()
            .map(|(user, value)| self.encode_value(user, value))
            .collect::<Result<Vec<_>>>()?;
        debug!("update record {}", index);
        self.write_fields(index, Some(ACTIVE_MARKER), &encoded)
    }

    fn encode_value(&self, user: usize, value: &Value) -> Result<EncodedField> {
        let physical = self.user_fields[user];
        let descriptor = &self.header.fields[physical];
        if value.is_null() {
            return Err(Error::invalid_value(descriptor.name(), "null value"));
        }
        let ctx = EncodeContext {
            charset: self.header.charset(),
        };
        let mut bytes = vec![0u8; descriptor.length()];
        let occupancy = record_codec::encode_field(&ctx, descriptor, value, &mut bytes)?;
        Ok(EncodedField {
            physical,
            bytes,
            occupancy,
        })
    }

    fn write_fields(&mut self, index: usize, marker: Option<u8>, encoded: &[EncodedField]) -> Result<()> {
        let record_offset = self.record_offset(index);
        let offsets: Vec<u64> = encoded
            .iter()
            .map(|e| record_offset + record_codec::field_offset(&self.header.fields, e.physical) as u64)
            .collect();

        let file = opened(&mut self.file)?;
        if let Some(marker) = marker {
            io_or_return!(file.seek(SeekFrom::Start(record_offset)), "seek to record");
            io_or_return!(file.write_all(&[marker]), "write record marker");
        }
        for (field, offset) in encoded.iter().zip(offsets) {
            io_or_return!(file.seek(SeekFrom::Start(offset)), "seek to field");
            io_or_return!(file.write_all(&field.bytes), "write field");
        }
        self.update_null_flags(record_offset, encoded)
    }

    //read, patch and write back the null flags bytes of one record.
    fn update_null_flags(&mut self, record_offset: u64, encoded: &[EncodedField]) -> Result<()> {
        let flags_index = match record_codec::null_flags_index(&self.header.fields) {
            Some(i) => i,
            None => return Ok(()),
        };
        let bits = record_codec::flag_bits(&self.header.fields);
        if encoded
            .iter()
            .all(|e| bits[e.physical].null.is_none() && bits[e.physical].variable.is_none())
        {
            return Ok(());
        }
        let offset = record_offset + record_codec::field_offset(&self.header.fields, flags_index) as u64;
        let mut bitmap = vec![0u8; self.header.fields[flags_index].length()];

        let file = opened(&mut self.file)?;
        io_or_return!(file.seek(SeekFrom::Start(offset)), "seek to null flags");
        io_or_return!(file.read_exact(&mut bitmap), "read null flags");
        for e in encoded {
            if let Some(bit) = bits[e.physical].null {
                utils::set_bit(&mut bitmap, bit, e.occupancy == Occupancy::Null);
            }
            if let Some(bit) = bits[e.physical].variable {
                utils::set_bit(&mut bitmap, bit, e.occupancy == Occupancy::Full);
            }
        }
        io_or_return!(file.seek(SeekFrom::Start(offset)), "seek to null flags");
        io_or_return!(file.write_all(&bitmap), "write null flags");
        Ok(())
    }

    fn check_record_count(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.user_fields.len() {
            return Err(Error::invalid_value(
                "<record>",
                format!("{} values for {} fields", values.len(), self.user_fields.len()),
            ));
        }
        Ok(())
    }

    /*
     * Append a record after the last one and return its index. The
     * record is encoded in full before anything is written, a failed
     * encoding leaves file and count untouched.
     */
    pub fn add_record(&mut self, values: &[Value]) -> Result<usize> {
        illegal_state_if!(self.file.is_none(), "cannot add records to a closed table");
        illegal_state_if!(!self.fields_defined, "fields should be set before adding records");
        self.check_record_count(values)?;
        if self.record_count >= u32::MAX as usize {
            return Err(Error::OutOfRange {
                what: "record",
                index: self.record_count,
                len: u32::MAX as usize,
            });
        }

        let ctx = EncodeContext {
            charset: self.header.charset(),
        };
        let fields = &self.header.fields;
        let mut buf = vec![0u8; self.header.record_length as usize];
        buf[0] = ACTIVE_MARKER;
        let mut occupancies = Vec::with_capacity(fields.len());
        let null = Value::Null;
        let mut user_values = values.iter();
        let mut offset = 1;
        for field in fields {
            let end = offset + field.length();
            if field.is_system() {
                occupancies.push(Occupancy::Full);
            } else {
                let value = user_values.next().unwrap_or(&null);
                occupancies.push(record_codec::encode_field(&ctx, field, value, &mut buf[offset..end])?);
            }
            offset = end;
        }
        if let Some(flags_index) = record_codec::null_flags_index(fields) {
            let start = record_codec::field_offset(fields, flags_index);
            let end = start + fields[flags_index].length();
            record_codec::encode_null_flags(fields, &occupancies, &mut buf[start..end]);
        }

        let index = self.record_count;
        let offset = self.record_offset(index);
        let file = opened(&mut self.file)?;
        io_or_return!(file.seek(SeekFrom::Start(offset)), "seek to end of records");
        io_or_return!(file.write_all(&buf), "write record");
        self.record_count += 1;
        debug!("appended record {} at offset {}", index, offset);
        Ok(index)
    }

    pub fn delete_record(&mut self, index: usize) -> Result<()> {
        illegal_state_if!(self.file.is_none(), "table file is closed");
        self.check_record_index(index)?;
        let offset = self.record_offset(index);
        let file = opened(&mut self.file)?;
        io_or_return!(file.seek(SeekFrom::Start(offset)), "seek to record");
        io_or_return!(file.write_all(&[DELETED_MARKER]), "write record marker");
        debug!("deleted record {}", index);
        Ok(())
    }

    pub fn set_memo_link(&mut self, link: Box<dyn MemoLink>) -> Result<()> {
        illegal_state_if!(self.memo.is_some(), "memo link is already set");
        self.memo = Some(link);
        debug!("memo link attached");
        Ok(())
    }

    /*
     * Open the memo file read only, then let the caller build the link
     * reading it.
     */
    pub fn attach_memo_file<P, L, F>(&mut self, path: P, open: F) -> Result<()>
    where
        P: AsRef<Path>,
        L: MemoLink + 'static,
        F: FnOnce(File) -> Result<L>,
    {
        illegal_state_if!(self.memo.is_some(), "memo link is already set");
        let path = path.as_ref();
        let file = io_or_return!(File::open(path), format!("open memo file {}", path.display()));
        let link = open(file)?;
        info!("attached memo file {}", path.display());
        self.set_memo_link(Box::new(link))
    }

    /*
     * Write the final record count and the header, then the end of
     * data marker. Closing twice does nothing, the file is released
     * even when writing fails.
     */
    pub fn close(&mut self) -> Result<()> {
        let mut file = match self.file.take() {
            Some(file) => file,
            None => return Ok(()),
        };
        if !self.fields_defined {
            info!("closed table file without fields");
            return Ok(());
        }

        let data_end = self.record_offset(self.record_count);
        self.header.number_of_records = self.record_count as u32;
        io_or_return!(file.seek(SeekFrom::Start(0)), "seek to header");
        self.header.serialize(&mut file)?;
        io_or_return!(file.seek(SeekFrom::Start(data_end)), "seek to end of records");
        io_or_return!(file.write_all(&[END_OF_DATA]), "write end of data marker");
        io_or_return!(file.set_len(data_end + 1), "truncate after end of data marker");
        io_or_return!(file.flush(), "flush table file");
        info!("closed table file with {} records", self.record_count);
        Ok(())
    }
}

//one value encoded to the bytes of its field.
struct EncodedField {
    physical: usize,
    bytes: Vec<u8>,
    occupancy: Occupancy,
}

fn opened(file: &mut Option<File>) -> Result<&mut File> {
    match file.as_mut() {
        Some(file) => Ok(file),
        None => Err(Error::IllegalState("table file is closed")),
    }
}

impl Drop for TableFileHandle {
    fn drop(&mut self) {
        if self.file.is_some() {
            if let Err(e) = self.close() {
                warn!("closing table file on drop failed: {}", e);
            }
        }
    }
}
