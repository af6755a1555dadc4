/**********************************************
  > File Name		: field_type.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 09:40:02 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The closed set of column types, each one tagged by the single
 * ASCII code stored at byte 11 of a field descriptor.
 */

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Character,
    Varchar,
    Varbinary,
    Date,
    FloatingPoint,
    Numeric,
    Logical,
    Memo,
    Binary,
    Blob,
    GeneralOle,
    Picture,
    Long,
    Autoincrement,
    Double,
    Timestamp,
    TimestampDbase7,
    Currency,
    NullFlags,
}

impl FieldType {
    pub fn from_code(code: u8) -> Option<Self> {
        let t = match code {
            b'C' => FieldType::Character,
            b'V' => FieldType::Varchar,
            b'Q' => FieldType::Varbinary,
            b'D' => FieldType::Date,
            b'F' => FieldType::FloatingPoint,
            b'N' => FieldType::Numeric,
            b'L' => FieldType::Logical,
            b'M' => FieldType::Memo,
            b'B' => FieldType::Binary,
            b'W' => FieldType::Blob,
            b'G' => FieldType::GeneralOle,
            b'P' => FieldType::Picture,
            b'I' => FieldType::Long,
            b'+' => FieldType::Autoincrement,
            b'O' => FieldType::Double,
            b'T' => FieldType::Timestamp,
            b'@' => FieldType::TimestampDbase7,
            b'Y' => FieldType::Currency,
            b'0' => FieldType::NullFlags,
            _ => return None,
        };
        Some(t)
    }

    pub fn code(&self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Varchar => b'V',
            FieldType::Varbinary => b'Q',
            FieldType::Date => b'D',
            FieldType::FloatingPoint => b'F',
            FieldType::Numeric => b'N',
            FieldType::Logical => b'L',
            FieldType::Memo => b'M',
            FieldType::Binary => b'B',
            FieldType::Blob => b'W',
            FieldType::GeneralOle => b'G',
            FieldType::Picture => b'P',
            FieldType::Long => b'I',
            FieldType::Autoincrement => b'+',
            FieldType::Double => b'O',
            FieldType::Timestamp => b'T',
            FieldType::TimestampDbase7 => b'@',
            FieldType::Currency => b'Y',
            FieldType::NullFlags => b'0',
        }
    }

    //variable length types keep their true size in the null flags bitmap.
    pub fn is_variable(&self) -> bool {
        matches!(self, FieldType::Varchar | FieldType::Varbinary)
    }

    //the mandated width of fixed size types, None when the width is free.
    pub fn fixed_length(&self) -> Option<usize> {
        match self {
            FieldType::Date => Some(8),
            FieldType::Logical => Some(1),
            FieldType::Long | FieldType::Autoincrement => Some(4),
            FieldType::Double => Some(8),
            FieldType::Timestamp | FieldType::TimestampDbase7 => Some(8),
            _ => None,
        }
    }
}
