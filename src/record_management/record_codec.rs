/**********************************************
  > File Name		: record_codec.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 03:05:41 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Record layout: deletion flag | field 0 | field 1 | ... | field n-1
 *
 * Every field owns exactly field.length() bytes, fields follow each
 * other in declaration order. The deletion flag is '*' for deleted
 * records and ' ' for active ones.
 *
 * Each field type maps to one decode function and at most one encode
 * function, see codec(). Decoding is positional: fields are decoded
 * in order from offset 1, then a second pass applies the null flags
 * bitmap to nullable and variable length fields and drops the system
 * fields.
 */

use byteorder::{ByteOrder, LittleEndian};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use super::decimal::Decimal;
use super::memo_link::MemoLink;
use super::value::Value;
use crate::charset::Charset;
use crate::errors::{Error, Result};
use crate::field_management::{FieldDescriptor, FieldType};
use crate::utils::{self, Alignment};

pub const DELETED_MARKER: u8 = b'*';
pub const ACTIVE_MARKER: u8 = b' ';
pub const END_OF_DATA: u8 = 0x1A;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
//julian day number of 1970-01-01, day 0 being 4713-11-24 BCE proleptic.
const JULIAN_DAY_OF_UNIX_EPOCH: i64 = 2_440_588;
const CURRENCY_SCALE: u32 = 4;

pub struct DecodeContext<'a> {
    pub charset: Charset,
    pub trim_right_spaces: bool,
    pub memo: Option<&'a dyn MemoLink>,
}

pub struct EncodeContext {
    pub charset: Charset,
}

/*
 * How much of its field an encoded value fills, used to maintain the
 * null flags bitmap.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Occupancy {
    Null,
    Partial,
    Full,
}

pub type DecodeFn = fn(&DecodeContext<'_>, &FieldDescriptor, &[u8]) -> Result<Value>;
pub type EncodeFn = fn(&EncodeContext, &FieldDescriptor, &Value, &mut [u8]) -> Result<Occupancy>;

#[derive(Copy, Clone)]
pub struct Codec {
    pub decode: DecodeFn,
    pub encode: Option<EncodeFn>,
}

pub fn codec(field_type: FieldType) -> Codec {
    match field_type {
        FieldType::Character => Codec { decode: decode_character, encode: Some(encode_character) },
        FieldType::Varchar | FieldType::Varbinary => Codec { decode: decode_raw, encode: Some(encode_variable) },
        FieldType::Date => Codec { decode: decode_date, encode: Some(encode_date) },
        FieldType::Numeric | FieldType::FloatingPoint => Codec { decode: decode_numeric, encode: Some(encode_numeric) },
        FieldType::Logical => Codec { decode: decode_logical, encode: Some(encode_logical) },
        FieldType::Long | FieldType::Autoincrement => Codec { decode: decode_long, encode: Some(encode_long) },
        FieldType::Currency => Codec { decode: decode_currency, encode: Some(encode_currency) },
        FieldType::Timestamp | FieldType::TimestampDbase7 => Codec { decode: decode_timestamp, encode: Some(encode_timestamp) },
        FieldType::Double => Codec { decode: decode_double, encode: Some(encode_double) },
        FieldType::Memo | FieldType::GeneralOle | FieldType::Picture | FieldType::Blob => Codec { decode: decode_memo, encode: None },
        FieldType::Binary => Codec { decode: decode_binary, encode: None },
        FieldType::NullFlags => Codec { decode: decode_raw, encode: None },
    }
}

/*
 * Bit positions of one field inside the null flags bitmap.
 */
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FlagBits {
    pub null: Option<usize>,
    pub variable: Option<usize>,
}

//one counter shared by nullable and variable length fields, in
//declaration order, the null bit comes first for a field having both.
pub fn flag_bits(fields: &[FieldDescriptor]) -> Vec<FlagBits> {
    let mut next = 0;
    fields
        .iter()
        .map(|field| {
            let mut bits = FlagBits::default();
            if field.is_nullable() {
                bits.null = Some(next);
                next += 1;
            }
            if field.field_type().is_variable() {
                bits.variable = Some(next);
                next += 1;
            }
            bits
        })
        .collect()
}

pub fn null_flags_index(fields: &[FieldDescriptor]) -> Option<usize> {
    fields
        .iter()
        .position(|f| f.is_system() && f.field_type() == FieldType::NullFlags)
}

//offset of a field inside its record, the deletion flag included.
pub fn field_offset(fields: &[FieldDescriptor], index: usize) -> usize {
    1 + fields[..index].iter().map(|f| f.length()).sum::<usize>()
}

/*
 * Decode a full record buffer into its deletion mark and the user
 * visible values.
 */
pub fn decode_record(ctx: &DecodeContext<'_>, fields: &[FieldDescriptor], data: &[u8]) -> Result<(bool, Vec<Value>)> {
    let deleted = data.first() == Some(&DELETED_MARKER);

    let mut values = Vec::with_capacity(fields.len());
    let mut offset = 1;
    for field in fields {
        let end = offset + field.length();
        if end > data.len() {
            return Err(Error::RecordLengthMismatch {
                expected: end,
                actual: data.len(),
            });
        }
        values.push((codec(field.field_type()).decode)(ctx, field, &data[offset..end])?);
        offset = end;
    }

    let bitmap = match null_flags_index(fields).map(|i| &values[i]) {
        Some(Value::Bytes(bitmap)) => Some(bitmap.clone()),
        _ => None,
    };
    let bits = flag_bits(fields);
    for (j, field) in fields.iter().enumerate() {
        if let Some(bitmap) = &bitmap {
            if let Some(bit) = bits[j].null {
                if utils::get_bit(bitmap, bit) {
                    values[j] = Value::Null;
                    continue;
                }
            }
        }
        if !field.field_type().is_variable() {
            continue;
        }
        let projected = match &values[j] {
            Value::Bytes(raw) => {
                let size = match (&bitmap, bits[j].variable) {
                    (Some(bitmap), Some(bit)) if !utils::get_bit(bitmap, bit) => {
                        raw.last().map(|n| *n as usize).unwrap_or(0).min(raw.len())
                    }
                    _ => raw.len(),
                };
                let payload = &raw[..size];
                match field.field_type() {
                    FieldType::Varchar => Value::Text(ctx.charset.decode(payload)),
                    _ => Value::Bytes(payload.to_vec()),
                }
            }
            _ => continue,
        };
        values[j] = projected;
    }

    let values = values
        .into_iter()
        .zip(fields)
        .filter(|(_, field)| !field.is_system())
        .map(|(value, _)| value)
        .collect();
    Ok((deleted, values))
}

pub fn encode_field(ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    match codec(field.field_type()).encode {
        Some(encode) => encode(ctx, field, value, out),
        None => Err(Error::UnsupportedFieldType(field.field_type())),
    }
}

/*
 * Build the null flags bytes from the occupancy of every field.
 */
pub fn encode_null_flags(fields: &[FieldDescriptor], occupancies: &[Occupancy], out: &mut [u8]) {
    for b in out.iter_mut() {
        *b = 0;
    }
    for (bits, occupancy) in flag_bits(fields).iter().zip(occupancies) {
        if let Some(bit) = bits.null {
            utils::set_bit(out, bit, *occupancy == Occupancy::Null);
        }
        if let Some(bit) = bits.variable {
            utils::set_bit(out, bit, *occupancy == Occupancy::Full);
        }
    }
}

fn mismatch(field: &FieldDescriptor, value: &Value) -> Error {
    Error::invalid_value(
        field.name(),
        format!("{} value for a {:?} field", value.kind(), field.field_type()),
    )
}

fn parse_ascii_u32(data: &[u8]) -> Option<u32> {
    if data.is_empty() || !data.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    std::str::from_utf8(data).ok()?.parse().ok()
}

fn unix_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)
}

fn decode_character(ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    let data = if ctx.trim_right_spaces {
        utils::trim_right_spaces(data)
    } else {
        data
    };
    Ok(Value::Text(ctx.charset.decode(data)))
}

fn decode_raw(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    Ok(Value::Bytes(data.to_vec()))
}

//YYYYMMDD, anything not a calendar date reads as null.
fn decode_date(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    if data.len() < 8 {
        return Ok(Value::Null);
    }
    let date = parse_ascii_u32(&data[0..4]).and_then(|year| {
        let month = parse_ascii_u32(&data[4..6])?;
        let day = parse_ascii_u32(&data[6..8])?;
        NaiveDate::from_ymd_opt(year as i32, month, day)
    });
    Ok(date.map(Value::Date).unwrap_or(Value::Null))
}

fn decode_numeric(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    let text = utils::trim_spaces(data);
    let value = std::str::from_utf8(text)
        .ok()
        .and_then(|s| s.parse::<Decimal>().ok())
        .map(Value::Decimal)
        .unwrap_or(Value::Null);
    Ok(value)
}

fn decode_logical(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    let value = match data.first() {
        Some(b'T') | Some(b't') | Some(b'Y') | Some(b'y') => Value::Logical(true),
        Some(b'F') | Some(b'f') | Some(b'N') | Some(b'n') => Value::Logical(false),
        _ => Value::Null,
    };
    Ok(value)
}

fn decode_long(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    Ok(Value::Integer(LittleEndian::read_i32(&data[..4])))
}

//the integer holds the amount in ten-thousandths, the same as
//splitting its last four digits off as the fraction.
fn decode_currency(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    let minor = LittleEndian::read_i32(&data[..4]);
    Ok(Value::Decimal(Decimal::new(minor as i128, CURRENCY_SCALE)))
}

/*
 * Julian day number and milliseconds since midnight, (0, 0) is null.
 * The result is the wall clock time that was stored, no zone attached.
 */
fn decode_timestamp(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    let days = LittleEndian::read_i32(&data[0..4]) as i64;
    let millis = LittleEndian::read_i32(&data[4..8]) as i64;
    if days == 0 && millis == 0 {
        return Ok(Value::Null);
    }
    let offset = (days - JULIAN_DAY_OF_UNIX_EPOCH)
        .checked_mul(MILLIS_PER_DAY)
        .and_then(|ms| ms.checked_add(millis));
    let timestamp = match (unix_epoch(), offset) {
        (Some(epoch), Some(ms)) => epoch.checked_add_signed(Duration::milliseconds(ms)),
        _ => None,
    };
    Ok(timestamp.map(Value::Timestamp).unwrap_or(Value::Null))
}

fn decode_double(_ctx: &DecodeContext<'_>, _field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    Ok(Value::Double(LittleEndian::read_f64(&data[..8])))
}

//block numbers are 10 ascii digits or a 4 byte integer, block 0 means
//the record has no memo.
fn decode_memo(ctx: &DecodeContext<'_>, field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    let block = if field.length() == 10 {
        parse_ascii_u32(utils::trim_spaces(data))
    } else {
        let n = LittleEndian::read_i32(&data[..4]);
        if n > 0 {
            Some(n as u32)
        } else {
            None
        }
    };
    match (ctx.memo, block) {
        (Some(link), Some(block)) if block > 0 => Ok(Value::Memo(link.read_data(block, field.field_type())?)),
        _ => Ok(Value::Null),
    }
}

fn decode_binary(ctx: &DecodeContext<'_>, field: &FieldDescriptor, data: &[u8]) -> Result<Value> {
    if field.length() == 8 {
        decode_double(ctx, field, data)
    } else {
        decode_memo(ctx, field, data)
    }
}

fn encode_character(ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    match value {
        Value::Text(text) => {
            let bytes = ctx.charset.encode(text, out.len());
            utils::pad_into(out, &bytes, Alignment::Left, b' ');
            Ok(Occupancy::Full)
        }
        Value::Null => {
            utils::pad_into(out, &[], Alignment::Left, b' ');
            Ok(Occupancy::Null)
        }
        other => Err(mismatch(field, other)),
    }
}

/*
 * The payload is zero padded. When it is shorter than the field its
 * length goes to the last byte and the field counts as partial.
 */
fn encode_variable(ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let payload = match value {
        Value::Text(text) => ctx.charset.encode(text, out.len()),
        Value::Bytes(bytes) => bytes[..bytes.len().min(out.len())].to_vec(),
        Value::Null => {
            utils::pad_into(out, &[], Alignment::Left, 0);
            return Ok(Occupancy::Null);
        }
        other => return Err(mismatch(field, other)),
    };
    utils::pad_into(out, &payload, Alignment::Left, 0);
    if payload.len() < out.len() {
        let last = out.len() - 1;
        out[last] = payload.len() as u8;
        Ok(Occupancy::Partial)
    } else {
        Ok(Occupancy::Full)
    }
}

fn encode_date(_ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let date = match value {
        Value::Date(date) => *date,
        Value::Timestamp(ts) => ts.date(),
        Value::Null => {
            utils::pad_into(out, &[], Alignment::Left, b' ');
            return Ok(Occupancy::Null);
        }
        other => return Err(mismatch(field, other)),
    };
    if !(0..=9999).contains(&date.year()) {
        return Err(Error::invalid_value(field.name(), format!("year {} needs more than 4 digits", date.year())));
    }
    let text = format!("{:04}{:02}{:02}", date.year(), date.month(), date.day());
    utils::pad_into(out, text.as_bytes(), Alignment::Left, b' ');
    Ok(Occupancy::Full)
}

fn encode_numeric(_ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let decimals = field.decimal_count() as u32;
    let text = match value {
        Value::Decimal(d) => d.rescale(decimals).map(|d| d.to_string()),
        Value::Integer(i) => Decimal::from(*i).rescale(decimals).map(|d| d.to_string()),
        Value::Double(f) if f.is_finite() => Some(format!("{:.*}", decimals as usize, f)),
        Value::Double(f) => {
            return Err(Error::invalid_value(field.name(), format!("{} is not a finite number", f)));
        }
        Value::Null => {
            utils::pad_into(out, &[], Alignment::Right, b' ');
            return Ok(Occupancy::Null);
        }
        other => return Err(mismatch(field, other)),
    };
    match text {
        Some(text) if text.len() <= out.len() => {
            utils::pad_into(out, text.as_bytes(), Alignment::Right, b' ');
            Ok(Occupancy::Full)
        }
        _ => Err(Error::invalid_value(
            field.name(),
            format!("value does not fit in {} bytes with {} decimals", out.len(), decimals),
        )),
    }
}

fn encode_logical(_ctx: &EncodeContext, _field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let (b, occupancy) = match value {
        Value::Logical(true) => (b'T', Occupancy::Full),
        Value::Logical(false) => (b'F', Occupancy::Full),
        Value::Null => (b'?', Occupancy::Null),
        _ => (b'?', Occupancy::Full),
    };
    out[0] = b;
    Ok(occupancy)
}

fn encode_long(_ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    match value {
        Value::Integer(i) => {
            LittleEndian::write_i32(&mut out[..4], *i);
            Ok(Occupancy::Full)
        }
        Value::Null => {
            LittleEndian::write_i32(&mut out[..4], 0);
            Ok(Occupancy::Null)
        }
        other => Err(mismatch(field, other)),
    }
}

fn encode_currency(_ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let amount = match value {
        Value::Decimal(d) => *d,
        Value::Integer(i) => Decimal::from(*i),
        Value::Null => {
            utils::pad_into(out, &[], Alignment::Left, 0);
            return Ok(Occupancy::Null);
        }
        other => return Err(mismatch(field, other)),
    };
    let minor = amount
        .rescale(CURRENCY_SCALE)
        .map(|d| d.mantissa())
        .filter(|m| *m >= i32::MIN as i128 && *m <= i32::MAX as i128);
    let minor = match minor {
        Some(m) => m as i64,
        None => return Err(Error::invalid_value(field.name(), format!("{} is out of the currency range", amount))),
    };
    if out.len() >= 8 {
        utils::pad_into(out, &[], Alignment::Left, 0);
        LittleEndian::write_i64(&mut out[..8], minor);
    } else {
        LittleEndian::write_i32(&mut out[..4], minor as i32);
    }
    Ok(Occupancy::Full)
}

fn encode_timestamp(_ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let timestamp = match value {
        Value::Timestamp(ts) => *ts,
        Value::Date(date) => match date.and_hms_opt(0, 0, 0) {
            Some(ts) => ts,
            None => return Err(mismatch(field, value)),
        },
        Value::Null => {
            LittleEndian::write_i32(&mut out[0..4], 0);
            LittleEndian::write_i32(&mut out[4..8], 0);
            return Ok(Occupancy::Null);
        }
        other => return Err(mismatch(field, other)),
    };
    let epoch = match unix_epoch() {
        Some(epoch) => epoch.date(),
        None => return Err(mismatch(field, value)),
    };
    let days = timestamp.date().signed_duration_since(epoch).num_days() + JULIAN_DAY_OF_UNIX_EPOCH;
    if days <= 0 || days > i32::MAX as i64 {
        return Err(Error::invalid_value(field.name(), format!("{} is before the julian epoch", timestamp)));
    }
    let time = timestamp.time();
    let millis = time.num_seconds_from_midnight() as i64 * 1000 + (time.nanosecond() / 1_000_000) as i64;
    LittleEndian::write_i32(&mut out[0..4], days as i32);
    LittleEndian::write_i32(&mut out[4..8], millis as i32);
    Ok(Occupancy::Full)
}

fn encode_double(_ctx: &EncodeContext, field: &FieldDescriptor, value: &Value, out: &mut [u8]) -> Result<Occupancy> {
    let v = match value {
        Value::Double(f) => *f,
        Value::Integer(i) => *i as f64,
        Value::Decimal(d) => d.to_f64(),
        Value::Null => {
            LittleEndian::write_f64(&mut out[..8], 0.0);
            return Ok(Occupancy::Null);
        }
        other => return Err(mismatch(field, other)),
    };
    LittleEndian::write_f64(&mut out[..8], v);
    Ok(Occupancy::Full)
}
