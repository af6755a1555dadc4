/**********************************************
  > File Name		: macros.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Fri 14 May 2021 10:34:16 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Unwrap an io::Result, or return an Error::Io carrying the
 * operation context.
 */
#[macro_export]
macro_rules! io_or_return {
    ($func: expr, $context: expr) => {{
        match $func {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{} failed: {}", $context, e);
                return Err($crate::errors::Error::io($context, e));
            }
        }
    }};
}

/*
 * Return an Error::IllegalState when the condition holds.
 */
#[macro_export]
macro_rules! illegal_state_if {
    ($cond: expr, $msg: expr) => {
        if $cond {
            return Err($crate::errors::Error::IllegalState($msg));
        }
    };
}
