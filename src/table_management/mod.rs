/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 04:05:57 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The Table Management component owns open table files.
 *
 * A table file is a header followed by fixed size records. The handle
 * keeps the file, the header and the live record count, and does all
 * reads and writes at computed byte offsets.
 */

pub mod options;
pub mod table_file_handle;
pub mod table_file_manager;

pub use options::TableOptions;
pub use table_file_handle::{FieldRef, TableFileHandle};
pub use table_file_manager::TableFileManager;
