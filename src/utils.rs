/**********************************************
  > File Name		: utils.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Thu 11 Mar 2021 03:54:41 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Utils functions for global usage.
 */

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

//fill dest with src aligned to one side, the rest filled with pad.
//src longer than dest is cut to dest.len().
pub fn pad_into(dest: &mut [u8], src: &[u8], align: Alignment, pad: u8) {
    let n = src.len().min(dest.len());
    for b in dest.iter_mut() {
        *b = pad;
    }
    match align {
        Alignment::Left => dest[..n].copy_from_slice(&src[..n]),
        Alignment::Right => {
            let start = dest.len() - n;
            dest[start..].copy_from_slice(&src[..n]);
        }
    }
}

pub fn trim_right_spaces(data: &[u8]) -> &[u8] {
    let mut end = data.len();
    while end > 0 && data[end - 1] == b' ' {
        end -= 1;
    }
    &data[..end]
}

pub fn trim_spaces(data: &[u8]) -> &[u8] {
    let data = trim_right_spaces(data);
    let start = data.iter().position(|b| *b != b' ').unwrap_or(data.len());
    &data[start..]
}

//bits are numbered from the least significant bit of the first byte.
pub fn get_bit(bitmap: &[u8], bit: usize) -> bool {
    match bitmap.get(bit / 8) {
        Some(byte) => byte & (1 << (bit % 8)) != 0,
        None => false,
    }
}

//set or unset a bit, bits beyond the bitmap are ignored.
pub fn set_bit(bitmap: &mut [u8], bit: usize, set: bool) {
    if let Some(byte) = bitmap.get_mut(bit / 8) {
        if set {
            *byte |= 1 << (bit % 8);
        } else {
            *byte &= !(1 << (bit % 8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_left_and_right() {
        let mut buf = [0u8; 5];
        pad_into(&mut buf, b"ab", Alignment::Left, b' ');
        assert_eq!(&buf, b"ab   ");
        pad_into(&mut buf, b"12", Alignment::Right, b'0');
        assert_eq!(&buf, b"00012");
        pad_into(&mut buf, b"abcdefg", Alignment::Left, b' ');
        assert_eq!(&buf, b"abcde");
    }

    #[test]
    fn trims() {
        assert_eq!(trim_right_spaces(b"ab  "), b"ab");
        assert_eq!(trim_right_spaces(b"ab\0"), b"ab\0");
        assert_eq!(trim_spaces(b"  1.5 "), b"1.5");
        assert_eq!(trim_spaces(b"     "), b"");
    }

    #[test]
    fn bitmap_bits() {
        let mut bitmap = [0u8; 2];
        set_bit(&mut bitmap, 0, true);
        set_bit(&mut bitmap, 9, true);
        assert_eq!(bitmap, [0x01, 0x02]);
        assert!(get_bit(&bitmap, 9));
        assert!(!get_bit(&bitmap, 1));
        assert!(!get_bit(&bitmap, 64));
        set_bit(&mut bitmap, 0, false);
        assert_eq!(bitmap[0], 0);
    }
}
