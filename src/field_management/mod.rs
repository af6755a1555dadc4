/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 09:31:18 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The Field Management component describes the columns of a table.
 *
 * A table declares its columns once, every column is then fixed:
 * name, type, width in the record, decimal count, and whether it is
 * a system column or accepts nulls. System columns take record space
 * but are never handed to callers.
 */

pub mod field_descriptor;
pub mod field_type;

pub use field_descriptor::{FieldDescriptor, FieldEntry, FIELD_DESCRIPTOR_SIZE, HEADER_TERMINATOR};
pub use field_type::FieldType;
