//! The closed sort system.
//!
//! Every formula carries a [`FormulaType`]. Sorts compare structurally: two
//! bitvector sorts are equal iff their sizes are, two floating-point sorts iff
//! both bit counts are, and array sorts recurse into index and element.
//!
//! Each sort has a canonical text form (`Bitvector<32>`,
//! `FloatingPoint<exp=8,mant=23>`, ...). [`FromStr`] is the exact inverse of
//! [`Display`](fmt::Display) for every non-array sort. Arrays print as `Array`
//! and cannot be parsed back.

use std::fmt;
use std::str::FromStr;

use crate::error::SortError;

/// Sort of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FormulaType {
    Boolean,
    Integer,
    Rational,
    Bitvector(BitvectorType),
    FloatingPoint(FloatingPointType),
    FloatingPointRoundingMode,
    Array(ArrayType),
    String,
    Regex,
}

/// Fixed-width bitvector sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitvectorType {
    size: u32,
}

impl BitvectorType {
    /// Create a bitvector sort, rejecting a zero size.
    pub fn try_new(size: u32) -> Result<Self, SortError> {
        if size == 0 {
            return Err(SortError::ZeroBitvectorSize);
        }
        Ok(Self { size })
    }

    /// Number of bits.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// IEEE-754 floating-point sort.
///
/// The mantissa size excludes the hidden bit, so single precision is
/// `exp=8, mant=23` and the total size is `exponent + mantissa + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatingPointType {
    exponent_size: u32,
    mantissa_size: u32,
}

impl FloatingPointType {
    /// Create a floating-point sort, rejecting zero sizes and sizes whose
    /// total width overflows `u32`.
    pub fn try_new(exponent_size: u32, mantissa_size: u32) -> Result<Self, SortError> {
        let total = exponent_size
            .checked_add(mantissa_size)
            .and_then(|bits| bits.checked_add(1));
        if exponent_size == 0 || mantissa_size == 0 || total.is_none() {
            return Err(SortError::InvalidFloatingPoint {
                exponent: exponent_size,
                mantissa: mantissa_size,
            });
        }
        Ok(Self {
            exponent_size,
            mantissa_size,
        })
    }

    /// IEEE-754 binary32.
    pub const fn single_precision() -> Self {
        Self {
            exponent_size: 8,
            mantissa_size: 23,
        }
    }

    /// IEEE-754 binary64.
    pub const fn double_precision() -> Self {
        Self {
            exponent_size: 11,
            mantissa_size: 52,
        }
    }

    pub fn exponent_size(&self) -> u32 {
        self.exponent_size
    }

    pub fn mantissa_size(&self) -> u32 {
        self.mantissa_size
    }

    /// Width of the IEEE bit encoding: sign + exponent + mantissa.
    pub fn total_size(&self) -> u32 {
        self.exponent_size + self.mantissa_size + 1
    }
}

/// Array sort with index and element sorts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    index: Box<FormulaType>,
    element: Box<FormulaType>,
}

impl ArrayType {
    pub fn new(index: FormulaType, element: FormulaType) -> Self {
        Self {
            index: Box::new(index),
            element: Box::new(element),
        }
    }

    pub fn index_type(&self) -> &FormulaType {
        &self.index
    }

    pub fn element_type(&self) -> &FormulaType {
        &self.element
    }
}

impl FormulaType {
    /// Bitvector sort of the given size.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero. Use [`FormulaType::try_bitvector`] for
    /// untrusted sizes.
    pub fn bitvector(size: u32) -> Self {
        match Self::try_bitvector(size) {
            Ok(ty) => ty,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_bitvector(size: u32) -> Result<Self, SortError> {
        BitvectorType::try_new(size).map(FormulaType::Bitvector)
    }

    /// Floating-point sort with the given exponent and mantissa sizes.
    ///
    /// # Panics
    ///
    /// Panics if either size is zero.
    pub fn floating_point(exponent_size: u32, mantissa_size: u32) -> Self {
        match Self::try_floating_point(exponent_size, mantissa_size) {
            Ok(ty) => ty,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_floating_point(exponent_size: u32, mantissa_size: u32) -> Result<Self, SortError> {
        FloatingPointType::try_new(exponent_size, mantissa_size).map(FormulaType::FloatingPoint)
    }

    pub fn single_precision() -> Self {
        FormulaType::FloatingPoint(FloatingPointType::single_precision())
    }

    pub fn double_precision() -> Self {
        FormulaType::FloatingPoint(FloatingPointType::double_precision())
    }

    pub fn array(index: FormulaType, element: FormulaType) -> Self {
        FormulaType::Array(ArrayType::new(index, element))
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, FormulaType::Boolean)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, FormulaType::Integer)
    }

    pub fn is_rational(&self) -> bool {
        matches!(self, FormulaType::Rational)
    }

    /// Integer or Rational.
    pub fn is_numeral(&self) -> bool {
        self.is_integer() || self.is_rational()
    }

    pub fn is_bitvector(&self) -> bool {
        matches!(self, FormulaType::Bitvector(_))
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, FormulaType::FloatingPoint(_))
    }

    pub fn is_rounding_mode(&self) -> bool {
        matches!(self, FormulaType::FloatingPointRoundingMode)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FormulaType::Array(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, FormulaType::String)
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, FormulaType::Regex)
    }

    pub fn as_bitvector(&self) -> Option<&BitvectorType> {
        match self {
            FormulaType::Bitvector(bv) => Some(bv),
            _ => None,
        }
    }

    pub fn as_floating_point(&self) -> Option<&FloatingPointType> {
        match self {
            FormulaType::FloatingPoint(fp) => Some(fp),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            FormulaType::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl From<BitvectorType> for FormulaType {
    fn from(ty: BitvectorType) -> Self {
        FormulaType::Bitvector(ty)
    }
}

impl From<FloatingPointType> for FormulaType {
    fn from(ty: FloatingPointType) -> Self {
        FormulaType::FloatingPoint(ty)
    }
}

impl From<ArrayType> for FormulaType {
    fn from(ty: ArrayType) -> Self {
        FormulaType::Array(ty)
    }
}

impl fmt::Display for BitvectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitvector<{}>", self.size)
    }
}

impl fmt::Display for FloatingPointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FloatingPoint<exp={},mant={}>",
            self.exponent_size, self.mantissa_size
        )
    }
}

impl fmt::Display for FormulaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaType::Boolean => write!(f, "Boolean"),
            FormulaType::Integer => write!(f, "Integer"),
            FormulaType::Rational => write!(f, "Rational"),
            FormulaType::Bitvector(bv) => write!(f, "{bv}"),
            FormulaType::FloatingPoint(fp) => write!(f, "{fp}"),
            FormulaType::FloatingPointRoundingMode => write!(f, "FloatingPointRoundingMode"),
            // Index and element sorts are deliberately not printed.
            FormulaType::Array(_) => write!(f, "Array"),
            FormulaType::String => write!(f, "String"),
            FormulaType::Regex => write!(f, "Regex"),
        }
    }
}

impl FromStr for FormulaType {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Boolean" => return Ok(FormulaType::Boolean),
            "Integer" => return Ok(FormulaType::Integer),
            "Rational" => return Ok(FormulaType::Rational),
            "FloatingPointRoundingMode" => return Ok(FormulaType::FloatingPointRoundingMode),
            "String" => return Ok(FormulaType::String),
            "Regex" => return Ok(FormulaType::Regex),
            _ => {}
        }

        let unknown = || SortError::Unknown(s.to_string());

        if let Some(size) = s
            .strip_prefix("Bitvector<")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let size = parse_canonical_u32(size).ok_or_else(unknown)?;
            return FormulaType::try_bitvector(size);
        }

        if let Some(params) = s
            .strip_prefix("FloatingPoint<exp=")
            .and_then(|rest| rest.strip_suffix('>'))
        {
            let (exponent, mantissa) = params.split_once(",mant=").ok_or_else(unknown)?;
            let exponent = parse_canonical_u32(exponent).ok_or_else(unknown)?;
            let mantissa = parse_canonical_u32(mantissa).ok_or_else(unknown)?;
            return FormulaType::try_floating_point(exponent, mantissa);
        }

        Err(unknown())
    }
}

/// Parse a decimal numeral exactly as `Display` prints it: digits only, no
/// sign, no leading zeros.
fn parse_canonical_u32(text: &str) -> Option<u32> {
    let canonical = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit())
        && (text == "0" || !text.starts_with('0'));
    if !canonical {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn predicates(ty: &FormulaType) -> [bool; 9] {
        [
            ty.is_boolean(),
            ty.is_integer(),
            ty.is_rational(),
            ty.is_bitvector(),
            ty.is_floating_point(),
            ty.is_rounding_mode(),
            ty.is_array(),
            ty.is_string(),
            ty.is_regex(),
        ]
    }

    fn arb_scalar_sort() -> impl Strategy<Value = FormulaType> {
        prop_oneof![
            Just(FormulaType::Boolean),
            Just(FormulaType::Integer),
            Just(FormulaType::Rational),
            Just(FormulaType::FloatingPointRoundingMode),
            Just(FormulaType::String),
            Just(FormulaType::Regex),
            (1u32..=u32::MAX).prop_map(FormulaType::bitvector),
            (1u32..=64, 1u32..=256).prop_map(|(e, m)| FormulaType::floating_point(e, m)),
        ]
    }

    fn arb_sort() -> impl Strategy<Value = FormulaType> {
        arb_scalar_sort().prop_recursive(3, 16, 2, |inner| {
            (inner.clone(), inner).prop_map(|(i, e)| FormulaType::array(i, e))
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn round_trip_non_array_sorts(ty in arb_scalar_sort()) {
            let printed = ty.to_string();
            prop_assert_eq!(printed.parse::<FormulaType>(), Ok(ty));
        }

        #[test]
        fn exactly_one_predicate_holds(ty in arb_sort()) {
            let count = predicates(&ty).iter().filter(|p| **p).count();
            prop_assert_eq!(count, 1);
            prop_assert_eq!(ty.is_numeral(), ty.is_integer() || ty.is_rational());
        }

        #[test]
        fn bitvector_equality_is_structural(a in 1u32..512, b in 1u32..512) {
            prop_assert_eq!(FormulaType::bitvector(a) == FormulaType::bitvector(b), a == b);
        }

        #[test]
        fn floating_point_equality_is_structural(
            e1 in 1u32..16, m1 in 1u32..64, e2 in 1u32..16, m2 in 1u32..64
        ) {
            let lhs = FormulaType::floating_point(e1, m1);
            let rhs = FormulaType::floating_point(e2, m2);
            prop_assert_eq!(lhs == rhs, e1 == e2 && m1 == m2);
        }

        #[test]
        fn array_equality_is_structural(
            i1 in arb_scalar_sort(), e1 in arb_scalar_sort(),
            i2 in arb_scalar_sort(), e2 in arb_scalar_sort()
        ) {
            let lhs = FormulaType::array(i1.clone(), e1.clone());
            let rhs = FormulaType::array(i2.clone(), e2.clone());
            prop_assert_eq!(lhs == rhs, i1 == i2 && e1 == e2);
        }
    }

    #[test]
    fn canonical_strings() {
        assert_eq!(FormulaType::Boolean.to_string(), "Boolean");
        assert_eq!(FormulaType::bitvector(32).to_string(), "Bitvector<32>");
        assert_eq!(
            FormulaType::single_precision().to_string(),
            "FloatingPoint<exp=8,mant=23>"
        );
        assert_eq!(
            FormulaType::double_precision().to_string(),
            "FloatingPoint<exp=11,mant=52>"
        );
        assert_eq!(
            FormulaType::FloatingPointRoundingMode.to_string(),
            "FloatingPointRoundingMode"
        );
        let array = FormulaType::array(FormulaType::Integer, FormulaType::bitvector(8));
        assert_eq!(array.to_string(), "Array");
    }

    #[test]
    fn array_text_is_not_parseable() {
        assert_eq!(
            "Array".parse::<FormulaType>(),
            Err(SortError::Unknown("Array".to_string()))
        );
    }

    #[test]
    fn parse_rejects_non_canonical_text() {
        for text in [
            "",
            "boolean",
            " Boolean",
            "Bitvector<>",
            "Bitvector<+8>",
            "Bitvector<08>",
            "Bitvector<8",
            "Bitvector<-1>",
            "FloatingPoint<exp=8, mant=23>",
            "FloatingPoint<exp=8,mant=23,x>",
            "FloatingPoint<mant=23,exp=8>",
            "Bitvector<99999999999>",
        ] {
            assert!(text.parse::<FormulaType>().is_err(), "accepted {text:?}");
        }
    }

    #[test]
    fn parse_rejects_impossible_parameters() {
        assert_eq!(
            "Bitvector<0>".parse::<FormulaType>(),
            Err(SortError::ZeroBitvectorSize)
        );
        assert_eq!(
            "FloatingPoint<exp=0,mant=23>".parse::<FormulaType>(),
            Err(SortError::InvalidFloatingPoint {
                exponent: 0,
                mantissa: 23
            })
        );
        assert_eq!(
            "FloatingPoint<exp=8,mant=4294967295>".parse::<FormulaType>(),
            Err(SortError::InvalidFloatingPoint {
                exponent: 8,
                mantissa: u32::MAX
            })
        );
        assert!(FloatingPointType::try_new(u32::MAX - 1, 1).is_err());
        assert_eq!(
            FloatingPointType::try_new(u32::MAX - 2, 1).map(|ty| ty.total_size()),
            Ok(u32::MAX)
        );
    }

    #[test]
    #[should_panic(expected = "bitvector sort must have a positive size")]
    fn zero_sized_bitvector_panics() {
        let _ = FormulaType::bitvector(0);
    }

    #[test]
    #[should_panic(expected = "floating-point sort needs positive sizes")]
    fn zero_mantissa_panics() {
        let _ = FormulaType::floating_point(8, 0);
    }

    #[test]
    fn try_constructors_return_errors() {
        assert_eq!(
            FormulaType::try_bitvector(0),
            Err(SortError::ZeroBitvectorSize)
        );
        assert!(FormulaType::try_floating_point(0, 0).is_err());
        assert!(FormulaType::try_floating_point(5, 10).is_ok());
    }

    #[test]
    fn well_known_precisions() {
        let single = FloatingPointType::single_precision();
        assert_eq!(single.exponent_size(), 8);
        assert_eq!(single.mantissa_size(), 23);
        assert_eq!(single.total_size(), 32);
        assert_eq!(FloatingPointType::double_precision().total_size(), 64);
    }

    #[test]
    fn numerals() {
        assert!(FormulaType::Integer.is_numeral());
        assert!(FormulaType::Rational.is_numeral());
        assert!(!FormulaType::bitvector(8).is_numeral());
        assert!(!FormulaType::single_precision().is_numeral());
    }

    #[test]
    fn accessors() {
        let array = FormulaType::array(FormulaType::bitvector(4), FormulaType::Boolean);
        let array_type = array.as_array().unwrap();
        assert_eq!(array_type.index_type(), &FormulaType::bitvector(4));
        assert_eq!(array_type.element_type(), &FormulaType::Boolean);
        assert_eq!(
            array_type.index_type().as_bitvector().map(BitvectorType::size),
            Some(4)
        );
        assert!(FormulaType::Boolean.as_floating_point().is_none());
    }
}
