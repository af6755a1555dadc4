/**********************************************
  > File Name		: tests.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 11:58:44 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::io::Cursor;

use chrono::NaiveDate;

use super::*;
use crate::charset::{Charset, LATIN1_DRIVER};
use crate::errors::Error;
use crate::field_management::{FieldDescriptor, FieldType};

fn sample_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::character("NAME", 20).unwrap(),
        FieldDescriptor::numeric("AMOUNT", 12, 2).unwrap(),
        FieldDescriptor::date("BORN").unwrap(),
        FieldDescriptor::logical("ACTIVE").unwrap(),
    ]
}

fn serialized(header: &mut Header) -> Vec<u8> {
    let mut out = Vec::new();
    let day = NaiveDate::from_ymd_opt(2023, 1, 15).unwrap();
    header.serialize_on(&mut out, day).expect("serialize header");
    out
}

#[test]
fn derived_lengths() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    let bytes = serialized(&mut header);

    assert_eq!(header.header_length as usize, 32 + 32 * 4 + 1);
    assert_eq!(header.record_length as usize, 1 + 20 + 12 + 8 + 1);
    assert_eq!(bytes.len(), header.header_length as usize);
    assert_eq!(*bytes.last().unwrap(), 0x0D);
    assert_eq!(&bytes[8..10], &header.header_length.to_le_bytes());
    assert_eq!(&bytes[10..12], &header.record_length.to_le_bytes());
}

#[test]
fn stale_lengths_are_recomputed() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    header.header_length = 7;
    header.record_length = 3;
    serialized(&mut header);
    header.fields.push(FieldDescriptor::long("COUNT").unwrap());
    serialized(&mut header);
    assert_eq!(header.header_length as usize, 32 + 32 * 5 + 1);
    assert_eq!(header.record_length as usize, 1 + 20 + 12 + 8 + 1 + 4);
}

#[test]
fn prologue_layout() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    header.number_of_records = 0x0102_0304;
    let bytes = serialized(&mut header);

    assert_eq!(bytes[0], SIG_DBASE_III);
    assert_eq!(&bytes[1..4], &[123, 1, 15]);
    assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(bytes[29], LATIN1_DRIVER);
    assert_eq!(&bytes[32..36], b"NAME");
    // displacement of the second field skips the deletion flag and NAME.
    assert_eq!(&bytes[64 + 12..64 + 16], &[21, 0, 0, 0]);
}

#[test]
fn parse_serialized_header() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    header.number_of_records = 42;
    let bytes = serialized(&mut header);

    let parsed = Header::parse(&mut Cursor::new(bytes), None).unwrap();
    assert_eq!(parsed.number_of_records, 42);
    assert_eq!(parsed.header_length, header.header_length);
    assert_eq!(parsed.record_length, header.record_length);
    assert_eq!(parsed.fields, header.fields);
    assert_eq!(parsed.charset(), Charset::Latin1);
    assert_eq!(
        parsed.last_modification_date(),
        NaiveDate::from_ymd_opt(2023, 1, 15)
    );
    assert_eq!(parsed.fields[1].field_type(), FieldType::Numeric);
}

#[test]
fn charset_override() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    let bytes = serialized(&mut header);
    let parsed = Header::parse(&mut Cursor::new(bytes), Some(Charset::Utf8)).unwrap();
    assert_eq!(parsed.charset(), Charset::Utf8);
}

#[test]
fn bad_signature_is_rejected() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    let mut bytes = serialized(&mut header);
    bytes[0] = 0x42;
    match Header::parse(&mut Cursor::new(bytes), None) {
        Err(Error::MalformedHeader(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn record_length_must_match_fields() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    let good = serialized(&mut header);

    for stored in [0u16, header.record_length - 1, header.record_length + 1].iter() {
        let mut bytes = good.clone();
        bytes[10..12].copy_from_slice(&stored.to_le_bytes());
        match Header::parse(&mut Cursor::new(bytes), None) {
            Err(Error::MalformedHeader(_)) => {}
            other => panic!("record length {}: unexpected {:?}", stored, other),
        }
    }
}

#[test]
fn short_header_length_is_rejected() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    let mut bytes = serialized(&mut header);
    bytes[8..10].copy_from_slice(&(header.header_length - 1).to_le_bytes());
    match Header::parse(&mut Cursor::new(bytes), None) {
        Err(Error::MalformedHeader(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn backlink_area_stays_in_header_length() {
    let mut header = Header::new(Charset::Latin1);
    header.fields = sample_fields();
    let mut bytes = serialized(&mut header);
    let derived = header.header_length;
    bytes[0] = 0x30;
    bytes[8..10].copy_from_slice(&(derived + 263).to_le_bytes());
    bytes.extend_from_slice(&[0u8; 263]);

    let mut parsed = Header::parse(&mut Cursor::new(bytes), None).unwrap();
    assert_eq!(parsed.header_length, derived + 263);
    let rewritten = serialized(&mut parsed);
    assert_eq!(parsed.header_length, derived + 263);
    assert_eq!(rewritten.len(), derived as usize);
    assert_eq!(&rewritten[8..10], &(derived + 263).to_le_bytes());
}

#[test]
fn truncated_header_is_rejected() {
    match Header::parse(&mut Cursor::new(vec![0x03, 0, 0]), None) {
        Err(Error::MalformedHeader(_)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn missing_modification_date() {
    let header = Header::new(Charset::Latin1);
    assert_eq!(header.last_modification_date(), None);
}
