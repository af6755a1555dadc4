/**********************************************
  > File Name		: charset.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 09:12:40 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * The character set used for field names and text contents.
 *
 * A dbf file names its code page with the language driver byte of
 * the header. Only a narrow slice of the code page table is known
 * here, every single byte western driver is read as Latin-1.
 */

use std::fmt;

pub const LATIN1_DRIVER: u8 = 0x57;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Charset {
    Latin1,
    //no language driver exists for UTF-8, so it can only override the
    //driver of an existing file.
    Utf8,
}

impl Default for Charset {
    fn default() -> Self {
        Charset::Latin1
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Charset::Latin1 => write!(f, "ISO-8859-1"),
            Charset::Utf8 => write!(f, "UTF-8"),
        }
    }
}

impl Charset {
    //unknown drivers fall back to Latin-1 as well.
    pub fn from_language_driver(driver: u8) -> Self {
        log::trace!("language driver {:#04x} read as {}", driver, Charset::Latin1);
        Charset::Latin1
    }

    pub fn language_driver(&self) -> Option<u8> {
        match self {
            Charset::Latin1 => Some(LATIN1_DRIVER),
            Charset::Utf8 => None,
        }
    }

    pub fn decode(&self, data: &[u8]) -> String {
        match self {
            Charset::Latin1 => data.iter().map(|b| *b as char).collect(),
            Charset::Utf8 => String::from_utf8_lossy(data).into_owned(),
        }
    }

    //encode at most max bytes, never splitting a character.
    pub fn encode(&self, text: &str, max: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(max.min(text.len()));
        match self {
            Charset::Latin1 => {
                for c in text.chars().take(max) {
                    let code = c as u32;
                    out.push(if code <= 0xff { code as u8 } else { b'?' });
                }
            }
            Charset::Utf8 => {
                let mut buf = [0u8; 4];
                for c in text.chars() {
                    let bytes = c.encode_utf8(&mut buf).as_bytes();
                    if out.len() + bytes.len() > max {
                        break;
                    }
                    out.extend_from_slice(bytes);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_round_trip() {
        let cs = Charset::Latin1;
        let bytes = cs.encode("caf\u{e9}", 10);
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(cs.decode(&bytes), "caf\u{e9}");
        assert_eq!(cs.encode("\u{4e2d}", 4), vec![b'?']);
    }

    #[test]
    fn utf8_truncates_on_char_boundary() {
        let cs = Charset::Utf8;
        assert_eq!(cs.encode("a\u{e9}b", 2), b"a".to_vec());
        assert_eq!(cs.encode("a\u{e9}b", 3), "a\u{e9}".as_bytes().to_vec());
    }

    #[test]
    fn drivers() {
        assert_eq!(Charset::Latin1.language_driver(), Some(LATIN1_DRIVER));
        assert_eq!(Charset::Utf8.language_driver(), None);
        assert_eq!(Charset::from_language_driver(0x03), Charset::Latin1);
    }
}
