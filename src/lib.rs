/**********************************************
  > File Name		: lib.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 09:05:26 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Random access to dBase (.dbf) table files.
 *
 * Components, leaf first:
 *     field_management: column descriptors
 *     header_management: the header and its descriptor list
 *     record_management: value encoding of record bytes, memo links
 *     table_management: open files, record reads, updates and appends
 */

pub mod charset;
pub mod errors;
pub mod field_management;
pub mod header_management;
pub mod macros;
pub mod record_management;
pub mod table_management;
pub mod utils;

pub use charset::Charset;
pub use errors::{Error, FieldError, Result};
pub use field_management::{FieldDescriptor, FieldType};
pub use record_management::{Decimal, MemoData, MemoLink, Record, Value};
pub use table_management::{FieldRef, TableFileHandle, TableFileManager, TableOptions};
