/**********************************************
  > File Name		: memo_link.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 02:40:05 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Overflow payloads live in a companion memo file addressed by block
 * number. Block layout and free space management belong to whoever
 * implements this trait, records only hold the block number.
 */

use super::value::MemoData;
use crate::errors::Result;
use crate::field_management::FieldType;

pub trait MemoLink {
    fn read_data(&self, block: u32, field_type: FieldType) -> Result<MemoData>;
}
