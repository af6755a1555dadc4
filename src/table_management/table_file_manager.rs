/**********************************************
  > File Name		: table_file_manager.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 12 Apr 2021 09:48:43 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::Path;

use log::info;

use super::options::TableOptions;
use super::table_file_handle::TableFileHandle;
use crate::errors::{Error, Result};
use crate::header_management::Header;
use crate::io_or_return;

/*
 * TableFileManager opens table files and hands out a handle for each.
 *
 * An empty or missing file is a new table: its charset is recorded
 * and the header is only written once the fields are defined. Any
 * other file must start with a valid header.
 */
pub struct TableFileManager {}

impl TableFileManager {
    pub fn open_file<P: AsRef<Path>>(path: P, options: TableOptions) -> Result<TableFileHandle> {
        let path = path.as_ref();
        let context = format!("open table file {}", path.display());
        let file = io_or_return!(
            OpenOptions::new().read(true).write(true).create(true).open(path),
            context
        );
        let len = io_or_return!(file.metadata(), context).len();

        if len == 0 {
            let charset = options.charset.unwrap_or_default();
            if charset.language_driver().is_none() {
                return Err(Error::UnsupportedCharset(charset.to_string()));
            }
            info!("created table file {} with charset {}", path.display(), charset);
            return Ok(TableFileHandle::new(file, Header::new(charset), false, options));
        }

        let header = {
            let mut reader = BufReader::new(&file);
            Header::parse(&mut reader, options.charset)?
        };
        info!(
            "opened table file {}: {} records of {} bytes, {} fields",
            path.display(),
            header.number_of_records,
            header.record_length,
            header.fields.len()
        );
        Ok(TableFileHandle::new(file, header, true, options))
    }
}
