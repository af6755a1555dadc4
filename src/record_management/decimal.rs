/**********************************************
  > File Name		: decimal.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 19 Oct 2026 01:36:27 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Exact decimal numbers as stored in numeric and currency columns:
 * value = mantissa / 10^scale.
 */

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const MAX_SCALE: u32 = 30;

#[derive(Debug, Copy, Clone)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError;

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid decimal literal")
    }
}

impl std::error::Error for ParseDecimalError {}

impl Decimal {
    pub fn new(mantissa: i128, scale: u32) -> Self {
        Self { mantissa, scale }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /*
     * Change the number of fraction digits, rounding half away from
     * zero when digits are dropped. None on overflow.
     */
    pub fn rescale(&self, scale: u32) -> Option<Decimal> {
        if scale > MAX_SCALE {
            return None;
        }
        match scale.cmp(&self.scale) {
            Ordering::Equal => Some(*self),
            Ordering::Greater => {
                let factor = 10i128.checked_pow(scale - self.scale)?;
                Some(Decimal::new(self.mantissa.checked_mul(factor)?, scale))
            }
            Ordering::Less => {
                let factor = 10i128.checked_pow(self.scale - scale)?;
                let quotient = self.mantissa / factor;
                let remainder = (self.mantissa % factor).abs();
                let rounded = if remainder * 2 >= factor {
                    quotient + self.mantissa.signum()
                } else {
                    quotient
                };
                Some(Decimal::new(rounded, scale))
            }
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }
}

impl From<i32> for Decimal {
    fn from(v: i32) -> Self {
        Decimal::new(v as i128, 0)
    }
}

impl From<i64> for Decimal {
    fn from(v: i64) -> Self {
        Decimal::new(v as i128, 0)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let scale = self.scale.max(other.scale);
        match (self.rescale(scale), other.rescale(scale)) {
            (Some(a), Some(b)) => a.mantissa == b.mantissa,
            _ => false,
        }
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, digits) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };
        let (int_part, frac_part) = match digits.find('.') {
            Some(dot) => (&digits[..dot], &digits[dot + 1..]),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseDecimalError);
        }
        if frac_part.len() as u32 > MAX_SCALE {
            return Err(ParseDecimalError);
        }
        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            if !b.is_ascii_digit() {
                return Err(ParseDecimalError);
            }
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add((b - b'0') as i128))
                .ok_or(ParseDecimalError)?;
        }
        if negative {
            mantissa = -mantissa;
        }
        Ok(Decimal::new(mantissa, frac_part.len() as u32))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        if self.scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let scale = self.scale as usize;
        let digits = format!("{:0>width$}", digits, width = scale + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        write!(f, "{}{}.{}", sign, int_part, frac_part)
    }
}
