//! Canonical host values produced by model evaluation.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::rounding_mode::FloatingPointRoundingMode;

/// A value evaluated from a model, converted according to the sort of the
/// formula that was evaluated.
///
/// | sort | value |
/// |---|---|
/// | Boolean | `Boolean` |
/// | Integer, Bitvector (unsigned) | `Integer` |
/// | Rational | `Rational` |
/// | FloatingPoint fitting binary64 | `Float` |
/// | wider FloatingPoint | `Rational` for finite values, `Float` for NaN/inf/zero |
/// | FloatingPointRoundingMode | `RoundingMode` |
/// | String | `String` |
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Integer(BigInt),
    Rational(BigRational),
    Float(f64),
    String(String),
    RoundingMode(FloatingPointRoundingMode),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Value::Rational(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Rational(r) => write!(f, "{r}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::RoundingMode(rm) => write!(f, "{rm}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<BigRational> for Value {
    fn from(r: BigRational) -> Self {
        Value::Rational(r)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Parse decimal number text into an exact rational.
///
/// Accepts an optional sign, digits with an optional fraction, and an optional
/// exponent: `-12`, `+0.5`, `.25`, `3.`, `1e-3`, `-0.000`. Returns the sign
/// separately so `-0` stays distinguishable from `0`.
pub fn parse_decimal(text: &str) -> Option<(bool, BigRational)> {
    let (negative, body) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !digits_only(int_part)
        || !digits_only(frac_part)
    {
        return None;
    }

    let all_digits = format!("{int_part}{frac_part}");
    let numerator: BigInt = all_digits.parse().ok()?;
    let mut scale = -i64::try_from(frac_part.len()).ok()?;
    if let Some(exp) = exponent {
        let exp: i64 = exp.parse().ok()?;
        scale = scale.checked_add(exp)?;
    }
    // Guard against exponents that would allocate absurd powers of ten.
    if scale.unsigned_abs() > 100_000 {
        return None;
    }

    let ten = BigInt::from(10);
    let power = num_traits::pow(ten, usize::try_from(scale.unsigned_abs()).ok()?);
    let magnitude = if scale >= 0 {
        BigRational::from_integer(numerator * power)
    } else {
        BigRational::new(numerator, power)
    };
    Some((negative, if negative { -magnitude } else { magnitude }))
}
