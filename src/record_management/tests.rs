/**********************************************
  > File Name		: tests.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Fri 26 Mar 2021 08:26:32 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::cell::RefCell;

use byteorder::{ByteOrder, LittleEndian};
use chrono::NaiveDate;

use super::record_codec::*;
use super::*;
use crate::charset::Charset;
use crate::errors::{Error, Result};
use crate::field_management::{FieldDescriptor, FieldType};

fn decode_ctx() -> DecodeContext<'static> {
    DecodeContext {
        charset: Charset::Latin1,
        trim_right_spaces: true,
        memo: None,
    }
}

fn encode_ctx() -> EncodeContext {
    EncodeContext {
        charset: Charset::Latin1,
    }
}

fn decode_one(field: &FieldDescriptor, data: &[u8]) -> Value {
    (codec(field.field_type()).decode)(&decode_ctx(), field, data).expect("decode field")
}

fn encode_one(field: &FieldDescriptor, value: &Value) -> Vec<u8> {
    let mut out = vec![0u8; field.length()];
    encode_field(&encode_ctx(), field, value, &mut out).expect("encode field");
    out
}

#[test]
fn currency_decode() {
    let field = FieldDescriptor::currency("PRICE").unwrap();
    let mut data = [0u8; 8];
    LittleEndian::write_i32(&mut data[..4], 12345);
    assert_eq!(decode_one(&field, &data), Value::Decimal("1.2345".parse().unwrap()));

    LittleEndian::write_i32(&mut data[..4], 7);
    assert_eq!(decode_one(&field, &data), Value::Decimal("0.0007".parse().unwrap()));
}

#[test]
fn currency_encode_matches_decode() {
    let field = FieldDescriptor::currency("PRICE").unwrap();
    let amount: Decimal = "-12.5".parse().unwrap();
    let bytes = encode_one(&field, &Value::Decimal(amount));
    assert_eq!(LittleEndian::read_i32(&bytes[..4]), -125000);
    assert_eq!(decode_one(&field, &bytes), Value::Decimal(amount));
}

#[test]
fn date_decode() {
    let field = FieldDescriptor::date("DAY").unwrap();
    assert_eq!(
        decode_one(&field, b"20230115"),
        Value::Date(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
    );
    assert_eq!(decode_one(&field, b"        "), Value::Null);
    assert_eq!(decode_one(&field, b"2023AB15"), Value::Null);
    assert_eq!(decode_one(&field, b"20231345"), Value::Null);
}

#[test]
fn date_encode() {
    let field = FieldDescriptor::date("DAY").unwrap();
    let day = NaiveDate::from_ymd_opt(987, 3, 4).unwrap();
    assert_eq!(encode_one(&field, &Value::Date(day)), b"09870304".to_vec());
    assert_eq!(encode_one(&field, &Value::Null), b"        ".to_vec());
}

#[test]
fn logical_decode() {
    let field = FieldDescriptor::logical("OK").unwrap();
    assert_eq!(decode_one(&field, b"T"), Value::Logical(true));
    assert_eq!(decode_one(&field, b"F"), Value::Logical(false));
    assert_eq!(decode_one(&field, b"?"), Value::Null);
    assert_eq!(decode_one(&field, b" "), Value::Null);
}

#[test]
fn logical_encode() {
    let field = FieldDescriptor::logical("OK").unwrap();
    assert_eq!(encode_one(&field, &Value::Logical(true)), b"T".to_vec());
    assert_eq!(encode_one(&field, &Value::Logical(false)), b"F".to_vec());
    assert_eq!(encode_one(&field, &Value::from("yes")), b"?".to_vec());
}

#[test]
fn character_padding_and_trim() {
    let field = FieldDescriptor::character("NAME", 6).unwrap();
    assert_eq!(encode_one(&field, &Value::from("ab")), b"ab    ".to_vec());
    assert_eq!(encode_one(&field, &Value::from("abcdefgh")), b"abcdef".to_vec());
    assert_eq!(decode_one(&field, b"ab    "), Value::from("ab"));

    let untrimmed = DecodeContext {
        trim_right_spaces: false,
        ..decode_ctx()
    };
    let value = (codec(FieldType::Character).decode)(&untrimmed, &field, b"ab    ").unwrap();
    assert_eq!(value, Value::from("ab    "));
}

#[test]
fn numeric_round_trip() {
    let field = FieldDescriptor::numeric("AMOUNT", 8, 2).unwrap();
    let bytes = encode_one(&field, &Value::Double(3.14159));
    assert_eq!(bytes, b"    3.14".to_vec());
    assert_eq!(decode_one(&field, &bytes), Value::Decimal("3.14".parse().unwrap()));

    let bytes = encode_one(&field, &Value::Integer(-42));
    assert_eq!(bytes, b"  -42.00".to_vec());
    assert_eq!(encode_one(&field, &Value::Null), b"        ".to_vec());
    assert_eq!(decode_one(&field, b"        "), Value::Null);
    assert_eq!(decode_one(&field, b"********"), Value::Null);
}

#[test]
fn numeric_overflow_is_rejected() {
    let field = FieldDescriptor::numeric("AMOUNT", 5, 2).unwrap();
    let mut out = vec![0u8; 5];
    match encode_field(&encode_ctx(), &field, &Value::Integer(123456), &mut out) {
        Err(Error::InvalidValue { .. }) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn long_and_double() {
    let long = FieldDescriptor::long("ID").unwrap();
    let bytes = encode_one(&long, &Value::Integer(-2));
    assert_eq!(bytes, vec![0xfe, 0xff, 0xff, 0xff]);
    assert_eq!(decode_one(&long, &bytes), Value::Integer(-2));

    let double = FieldDescriptor::double("RATIO").unwrap();
    let bytes = encode_one(&double, &Value::Double(0.25));
    assert_eq!(bytes, 0.25f64.to_le_bytes().to_vec());
    assert_eq!(decode_one(&double, &bytes), Value::Double(0.25));
}

#[test]
fn timestamp_decode() {
    let field = FieldDescriptor::timestamp("AT").unwrap();
    let mut data = [0u8; 8];
    assert_eq!(decode_one(&field, &data), Value::Null);

    LittleEndian::write_i32(&mut data[0..4], 2_451_545);
    LittleEndian::write_i32(&mut data[4..8], 12 * 60 * 60 * 1000);
    let expected = NaiveDate::from_ymd_opt(2000, 1, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    assert_eq!(decode_one(&field, &data), Value::Timestamp(expected));
    assert_eq!(encode_one(&field, &Value::Timestamp(expected)), data.to_vec());
}

#[test]
fn variable_length_encoding() {
    let field = FieldDescriptor::varchar("CODE", 6).unwrap();
    let mut out = vec![0u8; 6];
    let occupancy = encode_field(&encode_ctx(), &field, &Value::from("abc"), &mut out).unwrap();
    assert_eq!(occupancy, Occupancy::Partial);
    assert_eq!(out, vec![b'a', b'b', b'c', 0, 0, 3]);

    let occupancy = encode_field(&encode_ctx(), &field, &Value::from("abcdef"), &mut out).unwrap();
    assert_eq!(occupancy, Occupancy::Full);
    assert_eq!(out, b"abcdef".to_vec());
}

#[test]
fn memo_types_are_read_only() {
    let field = FieldDescriptor::memo("NOTES", FieldType::Memo, 10).unwrap();
    let mut out = vec![0u8; 10];
    match encode_field(&encode_ctx(), &field, &Value::from("text"), &mut out) {
        Err(Error::UnsupportedFieldType(FieldType::Memo)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

struct RecordingMemo {
    calls: RefCell<Vec<(u32, FieldType)>>,
}

impl MemoLink for RecordingMemo {
    fn read_data(&self, block: u32, field_type: FieldType) -> Result<MemoData> {
        self.calls.borrow_mut().push((block, field_type));
        Ok(MemoData::Text(format!("block {}", block)))
    }
}

#[test]
fn memo_pointers_resolve_through_link() {
    let memo = RecordingMemo {
        calls: RefCell::new(Vec::new()),
    };
    let ctx = DecodeContext {
        memo: Some(&memo),
        ..decode_ctx()
    };

    let ascii = FieldDescriptor::memo("NOTES", FieldType::Memo, 10).unwrap();
    let value = (codec(FieldType::Memo).decode)(&ctx, &ascii, b"        12").unwrap();
    assert_eq!(value, Value::Memo(MemoData::Text("block 12".to_string())));

    let binary = FieldDescriptor::memo("PIC", FieldType::Blob, 4).unwrap();
    let value = (codec(FieldType::Blob).decode)(&ctx, &binary, &[7, 0, 0, 0]).unwrap();
    assert_eq!(value, Value::Memo(MemoData::Text("block 7".to_string())));

    let value = (codec(FieldType::Memo).decode)(&ctx, &ascii, b"          ").unwrap();
    assert_eq!(value, Value::Null);
    assert_eq!(
        *memo.calls.borrow(),
        vec![(12, FieldType::Memo), (7, FieldType::Blob)]
    );

    assert_eq!(decode_one(&ascii, b"        12"), Value::Null);
}

fn projection_fields() -> Vec<FieldDescriptor> {
    let mut fields = vec![
        FieldDescriptor::character("NAME", 4).unwrap().nullable(),
        FieldDescriptor::varchar("CODE", 5).unwrap(),
        FieldDescriptor::logical("OK").unwrap(),
    ];
    let flags = FieldDescriptor::null_flags_for(&fields);
    fields.push(flags);
    fields
}

#[test]
fn flag_bit_layout() {
    let fields = vec![
        FieldDescriptor::character("A", 4).unwrap().nullable(),
        FieldDescriptor::logical("B").unwrap(),
        FieldDescriptor::varchar("C", 5).unwrap().nullable(),
    ];
    let bits = flag_bits(&fields);
    assert_eq!(bits[0], FlagBits { null: Some(0), variable: None });
    assert_eq!(bits[1], FlagBits::default());
    assert_eq!(bits[2], FlagBits { null: Some(1), variable: Some(2) });
}

#[test]
fn two_pass_projection() {
    let fields = projection_fields();
    // NAME null (bit 0), CODE partial (bit 1 clear) with 2 bytes.
    let mut record = vec![ACTIVE_MARKER];
    record.extend_from_slice(b"zzzz");
    record.extend_from_slice(&[b'x', b'y', 0, 0, 2]);
    record.push(b'T');
    record.push(0b0000_0001);

    let (deleted, values) = decode_record(&decode_ctx(), &fields, &record).unwrap();
    assert!(!deleted);
    assert_eq!(values, vec![Value::Null, Value::from("xy"), Value::Logical(true)]);

    // NAME present, CODE full length.
    let last = record.len() - 1;
    record[last] = 0b0000_0010;
    record[5..10].copy_from_slice(b"hello");
    let (_, values) = decode_record(&decode_ctx(), &fields, &record).unwrap();
    assert_eq!(values, vec![Value::from("zzzz"), Value::from("hello"), Value::Logical(true)]);
}

#[test]
fn null_flags_from_occupancy() {
    let fields = projection_fields();
    let mut out = [0xffu8; 1];
    encode_null_flags(
        &fields,
        &[Occupancy::Null, Occupancy::Full, Occupancy::Full, Occupancy::Full],
        &mut out,
    );
    assert_eq!(out[0], 0b0000_0011);
    encode_null_flags(
        &fields,
        &[Occupancy::Full, Occupancy::Partial, Occupancy::Full, Occupancy::Full],
        &mut out,
    );
    assert_eq!(out[0], 0);
}

#[test]
fn deleted_marker_and_short_buffer() {
    let fields = vec![FieldDescriptor::logical("OK").unwrap()];
    let (deleted, _) = decode_record(&decode_ctx(), &fields, &[DELETED_MARKER, b'T']).unwrap();
    assert!(deleted);
    match decode_record(&decode_ctx(), &fields, &[ACTIVE_MARKER]) {
        Err(Error::RecordLengthMismatch { expected: 2, actual: 1 }) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn field_offsets_skip_deletion_flag() {
    let fields = projection_fields();
    assert_eq!(field_offset(&fields, 0), 1);
    assert_eq!(field_offset(&fields, 1), 5);
    assert_eq!(field_offset(&fields, 3), 11);
}
