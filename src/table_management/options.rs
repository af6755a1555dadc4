/**********************************************
  > File Name		: options.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 04:22:10 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use crate::charset::Charset;

/*
 * How a table file is opened.
 *
 * charset: None takes the language driver of an existing file, or
 * Latin-1 for a new one.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub charset: Option<Charset>,
    pub show_deleted: bool,
    pub trim_right_spaces: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            charset: None,
            show_deleted: false,
            trim_right_spaces: true,
        }
    }
}

impl TableOptions {
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    pub fn show_deleted(mut self, show: bool) -> Self {
        self.show_deleted = show;
        self
    }

    pub fn trim_right_spaces(mut self, trim: bool) -> Self {
        self.trim_right_spaces = trim;
        self
    }
}
