//! IEEE 754 binary floating point over exact rationals.
//!
//! Values are kept as a sign plus an exact magnitude, so every operation is
//! computed exactly and rounded once into the target [`FloatFormat`]. This is
//! what the ground evaluator uses for the `FloatingPoint` theory and what the
//! backend uses to build literals of arbitrary precision.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero as _};

use crate::sort::RoundingMode;

/// Exponent width and significand width (hidden bit included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatFormat {
    pub exponent_bits: u32,
    pub significand_bits: u32,
}

impl FloatFormat {
    pub const SINGLE: FloatFormat = FloatFormat {
        exponent_bits: 8,
        significand_bits: 24,
    };
    pub const DOUBLE: FloatFormat = FloatFormat {
        exponent_bits: 11,
        significand_bits: 53,
    };

    /// `None` unless `2 <= exponent_bits <= 30` and `significand_bits >= 2`.
    pub fn new(exponent_bits: u32, significand_bits: u32) -> Option<Self> {
        ((2..=30).contains(&exponent_bits) && significand_bits >= 2).then_some(Self {
            exponent_bits,
            significand_bits,
        })
    }

    pub fn total_bits(self) -> u32 {
        self.exponent_bits + self.significand_bits
    }

    fn bias(self) -> i64 {
        (1i64 << (self.exponent_bits - 1)) - 1
    }

    fn emin(self) -> i64 {
        1 - self.bias()
    }

    fn precision(self) -> i64 {
        i64::from(self.significand_bits)
    }

    /// Largest finite magnitude.
    pub fn max_finite(self) -> BigRational {
        let significand = (BigInt::one() << self.significand_bits) - BigInt::one();
        BigRational::from_integer(significand) * pow2(self.bias() - self.precision() + 1)
    }

    /// Smallest positive magnitude (the least subnormal).
    pub fn min_subnormal(self) -> BigRational {
        pow2(self.emin() - self.precision() + 1)
    }

    fn min_normal(self) -> BigRational {
        pow2(self.emin())
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Float({}, {})", self.exponent_bits, self.significand_bits)
    }
}

/// A floating-point datum of some format.
///
/// `Finite` always holds a non-zero magnitude that is representable in the
/// format it was rounded into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FloatValue {
    NaN,
    Infinity { negative: bool },
    Zero { negative: bool },
    Finite { negative: bool, magnitude: BigRational },
}

fn pow2(exponent: i64) -> BigRational {
    let magnitude = BigInt::one() << exponent.unsigned_abs();
    if exponent >= 0 {
        BigRational::from_integer(magnitude)
    } else {
        BigRational::new(BigInt::one(), magnitude)
    }
}

/// `floor(log2(m))` for a positive rational.
fn floor_log2(m: &BigRational) -> i64 {
    let estimate = m.numer().bits() as i64 - m.denom().bits() as i64;
    if *m >= pow2(estimate) {
        estimate
    } else {
        estimate - 1
    }
}

fn all_ones(bits: u32) -> BigUint {
    (BigUint::one() << bits) - BigUint::one()
}

/// Round a rational to an integer under `rm`.
pub fn round_to_integer(x: &BigRational, rm: RoundingMode) -> BigInt {
    let floor = x.floor().to_integer();
    match rm {
        RoundingMode::Rtz => x.trunc().to_integer(),
        RoundingMode::Rtp => x.ceil().to_integer(),
        RoundingMode::Rtn => floor,
        RoundingMode::Rne | RoundingMode::Rna => {
            let fraction = x - BigRational::from_integer(floor.clone());
            let half = BigRational::new(BigInt::one(), BigInt::from(2));
            match fraction.cmp(&half) {
                Ordering::Less => floor,
                Ordering::Greater => floor + 1,
                Ordering::Equal => {
                    let up = if rm == RoundingMode::Rne {
                        floor.is_odd()
                    } else {
                        x.is_positive()
                    };
                    if up { floor + 1 } else { floor }
                }
            }
        }
    }
}

impl FloatValue {
    /// Round the exact value `(-1)^negative * magnitude` into `format`.
    pub fn round(
        negative: bool,
        magnitude: &BigRational,
        format: FloatFormat,
        rm: RoundingMode,
    ) -> FloatValue {
        if magnitude.is_zero() {
            return FloatValue::Zero { negative };
        }
        let exponent = floor_log2(magnitude).max(format.emin());
        let quantum = exponent - (format.precision() - 1);
        let scaled = magnitude / pow2(quantum);
        let signed = if negative { -scaled } else { scaled };
        let units = round_to_integer(&signed, rm).abs();
        if units.is_zero() {
            return FloatValue::Zero { negative };
        }
        let rounded = BigRational::from_integer(units) * pow2(quantum);
        if rounded > format.max_finite() {
            let to_infinity = match rm {
                RoundingMode::Rne | RoundingMode::Rna => true,
                RoundingMode::Rtz => false,
                RoundingMode::Rtp => !negative,
                RoundingMode::Rtn => negative,
            };
            return if to_infinity {
                FloatValue::Infinity { negative }
            } else {
                FloatValue::Finite {
                    negative,
                    magnitude: format.max_finite(),
                }
            };
        }
        FloatValue::Finite {
            negative,
            magnitude: rounded,
        }
    }

    pub fn from_rational(value: &BigRational, format: FloatFormat, rm: RoundingMode) -> Self {
        Self::round(value.is_negative(), &value.abs(), format, rm)
    }

    /// Integer conversion; zero becomes `+0`.
    pub fn from_integer(value: &BigInt, format: FloatFormat, rm: RoundingMode) -> Self {
        Self::from_rational(&BigRational::from_integer(value.clone()), format, rm)
    }

    pub fn from_f64(value: f64) -> Self {
        Self::from_ieee_bits(&BigUint::from(value.to_bits()), FloatFormat::DOUBLE)
    }

    pub fn from_f32(value: f32) -> Self {
        Self::from_ieee_bits(&BigUint::from(value.to_bits()), FloatFormat::SINGLE)
    }

    /// Nearest `f64` (ties to even).
    pub fn to_f64(&self) -> f64 {
        let double = self.convert(FloatFormat::DOUBLE, RoundingMode::Rne);
        let bits = double.to_ieee_bits(FloatFormat::DOUBLE).to_u64().unwrap_or(0);
        f64::from_bits(bits)
    }

    /// Exact value, `None` for NaN and infinities.
    pub fn to_rational(&self) -> Option<BigRational> {
        match self {
            FloatValue::Zero { .. } => Some(BigRational::zero()),
            FloatValue::Finite {
                negative,
                magnitude,
            } => Some(if *negative {
                -magnitude.clone()
            } else {
                magnitude.clone()
            }),
            FloatValue::NaN | FloatValue::Infinity { .. } => None,
        }
    }

    // -----------------------------------------------------------------------
    // Bit-level representation
    // -----------------------------------------------------------------------

    /// Sign bit, biased exponent and trailing significand. NaN maps to the
    /// canonical quiet NaN.
    pub fn to_fields(&self, format: FloatFormat) -> (bool, BigUint, BigUint) {
        let trailing = format.significand_bits - 1;
        match self {
            FloatValue::NaN => (
                false,
                all_ones(format.exponent_bits),
                BigUint::one() << (trailing - 1),
            ),
            FloatValue::Infinity { negative } => {
                (*negative, all_ones(format.exponent_bits), BigUint::zero())
            }
            FloatValue::Zero { negative } => (*negative, BigUint::zero(), BigUint::zero()),
            FloatValue::Finite {
                negative,
                magnitude,
            } => {
                let exponent = floor_log2(magnitude);
                if exponent < format.emin() {
                    let units = magnitude / format.min_subnormal();
                    (*negative, BigUint::zero(), to_biguint(&units.to_integer()))
                } else {
                    let units = magnitude / pow2(exponent - i64::from(trailing));
                    let hidden = BigInt::one() << trailing;
                    let biased = BigUint::from((exponent + format.bias()).unsigned_abs());
                    (*negative, biased, to_biguint(&(units.to_integer() - hidden)))
                }
            }
        }
    }

    pub fn from_fields(
        negative: bool,
        exponent: &BigUint,
        significand: &BigUint,
        format: FloatFormat,
    ) -> Self {
        let trailing = format.significand_bits - 1;
        if *exponent == all_ones(format.exponent_bits) {
            return if significand.is_zero() {
                FloatValue::Infinity { negative }
            } else {
                FloatValue::NaN
            };
        }
        if exponent.is_zero() {
            if significand.is_zero() {
                return FloatValue::Zero { negative };
            }
            let magnitude =
                BigRational::from_integer(BigInt::from(significand.clone())) * format.min_subnormal();
            return FloatValue::Finite {
                negative,
                magnitude,
            };
        }
        let biased = exponent.to_i64().unwrap_or(i64::MAX);
        let units = (BigInt::one() << trailing) + BigInt::from(significand.clone());
        let magnitude = BigRational::from_integer(units)
            * pow2(biased - format.bias() - i64::from(trailing));
        FloatValue::Finite {
            negative,
            magnitude,
        }
    }

    /// Packed IEEE interchange bits: sign, exponent, trailing significand.
    pub fn to_ieee_bits(&self, format: FloatFormat) -> BigUint {
        let (negative, exponent, significand) = self.to_fields(format);
        let sign = if negative { BigUint::one() } else { BigUint::zero() };
        (sign << (format.total_bits() - 1))
            | (exponent << (format.significand_bits - 1))
            | significand
    }

    pub fn from_ieee_bits(bits: &BigUint, format: FloatFormat) -> Self {
        let trailing = format.significand_bits - 1;
        let significand = bits & all_ones(trailing);
        let exponent = (bits >> trailing) & all_ones(format.exponent_bits);
        let negative = ((bits >> (format.total_bits() - 1)) & BigUint::one()).is_one();
        Self::from_fields(negative, &exponent, &significand, format)
    }

    // -----------------------------------------------------------------------
    // Classification
    // -----------------------------------------------------------------------

    pub fn is_nan(&self) -> bool {
        matches!(self, FloatValue::NaN)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, FloatValue::Infinity { .. })
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, FloatValue::Zero { .. })
    }

    pub fn is_normal(&self, format: FloatFormat) -> bool {
        matches!(self, FloatValue::Finite { magnitude, .. } if *magnitude >= format.min_normal())
    }

    pub fn is_subnormal(&self, format: FloatFormat) -> bool {
        matches!(self, FloatValue::Finite { magnitude, .. } if *magnitude < format.min_normal())
    }

    /// Sign bit set; false for NaN.
    pub fn is_negative(&self) -> bool {
        match self {
            FloatValue::NaN => false,
            FloatValue::Infinity { negative }
            | FloatValue::Zero { negative }
            | FloatValue::Finite { negative, .. } => *negative,
        }
    }

    pub fn is_positive(&self) -> bool {
        !self.is_nan() && !self.is_negative()
    }

    // -----------------------------------------------------------------------
    // Arithmetic
    // -----------------------------------------------------------------------

    pub fn neg(&self) -> Self {
        self.with_sign(|negative| !negative)
    }

    pub fn abs(&self) -> Self {
        self.with_sign(|_| false)
    }

    fn with_sign(&self, sign: impl Fn(bool) -> bool) -> Self {
        match self {
            FloatValue::NaN => FloatValue::NaN,
            FloatValue::Infinity { negative } => FloatValue::Infinity {
                negative: sign(*negative),
            },
            FloatValue::Zero { negative } => FloatValue::Zero {
                negative: sign(*negative),
            },
            FloatValue::Finite {
                negative,
                magnitude,
            } => FloatValue::Finite {
                negative: sign(*negative),
                magnitude: magnitude.clone(),
            },
        }
    }

    pub fn add(&self, other: &Self, format: FloatFormat, rm: RoundingMode) -> Self {
        use FloatValue::*;
        match (self, other) {
            (NaN, _) | (_, NaN) => NaN,
            (Infinity { negative: a }, Infinity { negative: b }) => {
                if a == b {
                    Infinity { negative: *a }
                } else {
                    NaN
                }
            }
            (Infinity { negative }, _) | (_, Infinity { negative }) => Infinity {
                negative: *negative,
            },
            (Zero { negative: a }, Zero { negative: b }) => Zero {
                negative: if a == b { *a } else { rm == RoundingMode::Rtn },
            },
            (Zero { .. }, finite) | (finite, Zero { .. }) => finite.clone(),
            (Finite { .. }, Finite { .. }) => {
                let (Some(a), Some(b)) = (self.to_rational(), other.to_rational()) else {
                    return NaN;
                };
                let sum = a + b;
                if sum.is_zero() {
                    Zero {
                        negative: rm == RoundingMode::Rtn,
                    }
                } else {
                    Self::from_rational(&sum, format, rm)
                }
            }
        }
    }

    pub fn sub(&self, other: &Self, format: FloatFormat, rm: RoundingMode) -> Self {
        self.add(&other.neg(), format, rm)
    }

    pub fn mul(&self, other: &Self, format: FloatFormat, rm: RoundingMode) -> Self {
        use FloatValue::*;
        let negative = self.is_negative() != other.is_negative();
        match (self, other) {
            (NaN, _) | (_, NaN) => NaN,
            (Infinity { .. }, Zero { .. }) | (Zero { .. }, Infinity { .. }) => NaN,
            (Infinity { .. }, _) | (_, Infinity { .. }) => Infinity { negative },
            (Zero { .. }, _) | (_, Zero { .. }) => Zero { negative },
            (Finite { magnitude: a, .. }, Finite { magnitude: b, .. }) => {
                Self::round(negative, &(a * b), format, rm)
            }
        }
    }

    pub fn div(&self, other: &Self, format: FloatFormat, rm: RoundingMode) -> Self {
        use FloatValue::*;
        let negative = self.is_negative() != other.is_negative();
        match (self, other) {
            (NaN, _) | (_, NaN) => NaN,
            (Infinity { .. }, Infinity { .. }) | (Zero { .. }, Zero { .. }) => NaN,
            (Infinity { .. }, _) | (_, Zero { .. }) => Infinity { negative },
            (_, Infinity { .. }) | (Zero { .. }, _) => Zero { negative },
            (Finite { magnitude: a, .. }, Finite { magnitude: b, .. }) => {
                Self::round(negative, &(a / b), format, rm)
            }
        }
    }

    /// Correctly rounded square root.
    pub fn sqrt(&self, format: FloatFormat, rm: RoundingMode) -> Self {
        match self {
            FloatValue::NaN => FloatValue::NaN,
            FloatValue::Zero { negative } => FloatValue::Zero {
                negative: *negative,
            },
            _ if self.is_negative() => FloatValue::NaN,
            FloatValue::Infinity { .. } => FloatValue::Infinity { negative: false },
            FloatValue::Finite { magnitude, .. } => {
                // Enough fractional bits that the integer root carries at
                // least two guard bits beyond the precision.
                let shift = format.bias() + 2 * format.precision() + 4;
                let scaled = magnitude * pow2(2 * shift);
                let floor = scaled.floor().to_integer();
                let root = floor.sqrt();
                let exact = &root * &root == floor && scaled.is_integer();
                let root = BigRational::from_integer(root);
                let approximation = if exact {
                    root
                } else {
                    root + BigRational::new(BigInt::one(), BigInt::from(2))
                };
                Self::round(false, &(approximation / pow2(shift)), format, rm)
            }
        }
    }

    /// `fp.roundToIntegral`: the sign of a zero result follows the operand.
    pub fn round_to_integral(&self, rm: RoundingMode) -> Self {
        match self {
            FloatValue::Finite {
                negative,
                magnitude,
            } => {
                let signed = if *negative {
                    -magnitude.clone()
                } else {
                    magnitude.clone()
                };
                let integer = round_to_integer(&signed, rm);
                if integer.is_zero() {
                    FloatValue::Zero {
                        negative: *negative,
                    }
                } else {
                    FloatValue::Finite {
                        negative: *negative,
                        magnitude: BigRational::from_integer(integer.abs()),
                    }
                }
            }
            other => other.clone(),
        }
    }

    /// Re-round into another format.
    pub fn convert(&self, format: FloatFormat, rm: RoundingMode) -> Self {
        match self {
            FloatValue::Finite {
                negative,
                magnitude,
            } => Self::round(*negative, magnitude, format, rm),
            other => other.clone(),
        }
    }

    /// `fp.to_ubv` / `fp.to_sbv`: the rounded integer, `None` when NaN,
    /// infinite or outside the target range.
    pub fn to_integer_in_range(&self, width: u32, signed: bool, rm: RoundingMode) -> Option<BigInt> {
        let value = self.to_rational()?;
        let integer = round_to_integer(&value, rm);
        let (low, high) = if signed {
            let half = BigInt::one() << (width - 1);
            (-half.clone(), half)
        } else {
            (BigInt::zero(), BigInt::one() << width)
        };
        (integer >= low && integer < high).then_some(integer)
    }

    // -----------------------------------------------------------------------
    // Comparison
    // -----------------------------------------------------------------------

    fn order_key(&self) -> Option<(i8, BigRational)> {
        match self {
            FloatValue::NaN => None,
            FloatValue::Infinity { negative: true } => Some((-1, BigRational::zero())),
            FloatValue::Infinity { negative: false } => Some((1, BigRational::zero())),
            _ => self.to_rational().map(|value| (0, value)),
        }
    }

    /// IEEE ordering: NaN is unordered and `-0 == +0`.
    pub fn ieee_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.order_key()?.cmp(&other.order_key()?))
    }

    pub fn ieee_eq(&self, other: &Self) -> bool {
        self.ieee_cmp(other) == Some(Ordering::Equal)
    }
}

fn to_biguint(value: &BigInt) -> BigUint {
    match value.sign() {
        Sign::Minus => BigUint::zero(),
        _ => value.magnitude().clone(),
    }
}
