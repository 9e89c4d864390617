//! Arbitrary-precision decimal values.
//!
//! Servers send DECIMAL and DOUBLE columns as text. `Numeric` keeps that text's digits and
//! exponent exactly, so values far outside `f64` or `rust_decimal` range (`1.23e100`) are
//! decoded and re-sent without loss.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;

/// Largest exponent magnitude accepted from text, for both the raw and the adjusted exponent.
const MAX_EXPONENT: i64 = i32::MAX as i64;

/// Decimal number `coefficient × 10^exponent`.
///
/// The coefficient keeps the digits as written, so `1.50` remembers its scale of 2.
/// Equality is numeric: `1.5 == 1.50 == 15e-1`.
#[derive(Debug, Clone)]
pub struct Numeric {
    negative: bool,
    /// ASCII digits without leading zeros; `"0"` for zero.
    coefficient: String,
    exponent: i64,
}

/// Reason a string is not a decimal number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal `{input}`: {reason}")]
pub struct ParseNumericError {
    input: String,
    reason: &'static str,
}

impl Numeric {
    #[must_use]
    pub fn zero() -> Self {
        Self {
            negative: false,
            coefficient: "0".to_string(),
            exponent: 0,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.coefficient == "0"
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Digits after the decimal point as written; negative for values like `1E+3`.
    #[must_use]
    pub fn scale(&self) -> i64 {
        -self.exponent
    }

    /// Closest `f64`; may lose precision or overflow to infinity.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Same value with trailing zeros removed from the coefficient.
    #[must_use]
    pub fn normalized(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let trimmed = self.coefficient.trim_end_matches('0');
        let stripped = (self.coefficient.len() - trimmed.len()) as i64;
        Self {
            negative: self.negative,
            coefficient: trimmed.to_string(),
            exponent: self.exponent + stripped,
        }
    }

    /// Position of the most significant digit relative to the decimal point.
    fn adjusted_exponent(&self) -> i64 {
        self.exponent + self.coefficient.len() as i64 - 1
    }

    fn signed_coefficient(&self) -> String {
        if self.negative {
            format!("-{}", self.coefficient)
        } else {
            self.coefficient.clone()
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Numeric {
    type Err = ParseNumericError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParseNumericError {
            input: input.to_string(),
            reason,
        };
        let s = input.trim();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exp_part) = match rest.find(['e', 'E']) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };

        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err("no digits"));
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(err("unexpected character"));
        }

        let mut exponent: i64 = match exp_part {
            Some(e) => {
                let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err("malformed exponent"));
                }
                e.parse().map_err(|_| err("exponent out of range"))?
            }
            None => 0,
        };
        exponent = exponent
            .checked_sub(frac_part.len() as i64)
            .ok_or_else(|| err("exponent out of range"))?;

        let digits = format!("{int_part}{frac_part}");
        let coefficient = digits.trim_start_matches('0');
        let adjusted = exponent.saturating_add(coefficient.len().max(1) as i64 - 1);
        let in_range = |e: i64| e.unsigned_abs() <= MAX_EXPONENT.unsigned_abs();
        if !in_range(exponent) || !in_range(adjusted) {
            return Err(err("exponent out of range"));
        }
        if coefficient.is_empty() {
            // Keep the scale of zeros such as `0.00`.
            return Ok(Self {
                negative: false,
                coefficient: "0".to_string(),
                exponent,
            });
        }

        Ok(Self {
            negative,
            coefficient: coefficient.to_string(),
            exponent,
        })
    }
}

impl fmt::Display for Numeric {
    /// Plain notation when the value has a non-negative scale and is not tiny, scientific
    /// notation (`1.23E+100`) otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        let digits = &self.coefficient;
        let adjusted = self.adjusted_exponent();

        if self.exponent <= 0 && adjusted >= -6 {
            let scale = self.exponent.unsigned_abs() as usize;
            if scale == 0 {
                return f.write_str(digits);
            }
            if digits.len() > scale {
                let (int_part, frac_part) = digits.split_at(digits.len() - scale);
                return write!(f, "{int_part}.{frac_part}");
            }
            return write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()));
        }

        let (head, tail) = digits.split_at(1);
        f.write_str(head)?;
        if !tail.is_empty() {
            write!(f, ".{tail}")?;
        }
        if adjusted >= 0 {
            write!(f, "E+{adjusted}")
        } else {
            write!(f, "E{adjusted}")
        }
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.negative == b.negative && a.coefficient == b.coefficient && a.exponent == b.exponent
    }
}

impl Eq for Numeric {}

impl From<Decimal> for Numeric {
    fn from(value: Decimal) -> Self {
        let mantissa = value.mantissa();
        if mantissa == 0 {
            return Self {
                exponent: -i64::from(value.scale()),
                ..Self::zero()
            };
        }
        Self {
            negative: mantissa < 0,
            coefficient: mantissa.unsigned_abs().to_string(),
            exponent: -i64::from(value.scale()),
        }
    }
}

macro_rules! numeric_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Numeric {
                fn from(value: $t) -> Self {
                    let text = value.to_string();
                    Self {
                        negative: text.starts_with('-'),
                        coefficient: text.trim_start_matches('-').to_string(),
                        exponent: 0,
                    }
                }
            }
        )*
    };
}

numeric_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl TryFrom<&Numeric> for Decimal {
    type Error = String;

    fn try_from(value: &Numeric) -> Result<Self, Self::Error> {
        let value = value.normalized();
        let (digits, scale) = if value.exponent >= 0 {
            let zeros = usize::try_from(value.exponent)
                .map_err(|_| format!("{value} is out of decimal range"))?;
            if zeros > 40 {
                return Err(format!("{value} is out of decimal range"));
            }
            (format!("{}{}", value.signed_coefficient(), "0".repeat(zeros)), 0)
        } else {
            let scale = u32::try_from(-value.exponent)
                .map_err(|_| format!("{value} has too many fractional digits"))?;
            (value.signed_coefficient(), scale)
        };
        let mantissa: i128 = digits
            .parse()
            .map_err(|_| format!("{value} is out of decimal range"))?;
        Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|e| format!("{value}: {e}"))
    }
}

impl TryFrom<Numeric> for Decimal {
    type Error = String;

    fn try_from(value: Numeric) -> Result<Self, Self::Error> {
        Decimal::try_from(&value)
    }
}
