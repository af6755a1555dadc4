/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 11:02:15 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The Header Management component reads and writes the table header:
 * a fixed 32 byte prologue followed by one descriptor per column.
 */

pub mod header;

pub use header::{Header, HEADER_PROLOGUE_SIZE, SIG_DBASE_III};

#[cfg(test)]
mod tests;
