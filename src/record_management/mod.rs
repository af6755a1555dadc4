/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time     : Wed Mar 10 07:25:33 PM CST 2021
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The Record Management component turns record bytes into values and
 * values back into record bytes.
 *
 * Every record of a table has the same size, and every field sits at
 * the same offset in every record. So a single field can be read or
 * written without touching the bytes of its neighbours.
 */

pub mod decimal;
pub mod memo_link;
pub mod record_codec;
pub mod value;

pub use decimal::Decimal;
pub use memo_link::MemoLink;
pub use record_codec::{DecodeContext, EncodeContext, Occupancy, ACTIVE_MARKER, DELETED_MARKER, END_OF_DATA};
pub use value::{MemoData, Record, Value};

#[cfg(test)]
mod tests;
