//! Compile-time sort tags.
//!
//! A tag is an uninhabited type naming a sort family. [`Formula`](crate::Formula)
//! is parameterised by a tag, so passing a string where a boolean is expected
//! fails to compile. Families with parameters (bitvector width, floating-point
//! precision, array element sorts) are checked again at runtime through
//! [`SortTag::admits`].

use std::marker::PhantomData;

use crate::formula_type::FormulaType;

/// A sort family usable as the static sort of a formula.
pub trait SortTag: 'static {
    /// Family name used in mismatch errors.
    const NAME: &'static str;

    /// Whether a formula of sort `ty` may carry this tag.
    fn admits(ty: &FormulaType) -> bool;
}

/// A tag that denotes exactly one sort.
pub trait FixedSort: SortTag {
    fn formula_type() -> FormulaType;
}

/// Sorts whose values reduce to a single canonical host value.
pub trait ScalarSort: SortTag {}

/// Integer and Rational.
pub trait NumeralSort: FixedSort + ScalarSort {}

macro_rules! fixed_sort {
    ($(#[$doc:meta])* $tag:ident, $name:literal, $variant:ident) => {
        $(#[$doc])*
        #[derive(Debug)]
        pub enum $tag {}

        impl SortTag for $tag {
            const NAME: &'static str = $name;

            fn admits(ty: &FormulaType) -> bool {
                matches!(ty, FormulaType::$variant)
            }
        }

        impl FixedSort for $tag {
            fn formula_type() -> FormulaType {
                FormulaType::$variant
            }
        }

        impl ScalarSort for $tag {}
    };
}

fixed_sort!(
    /// Tag of `Boolean` formulas.
    BooleanSort,
    "Boolean",
    Boolean
);
fixed_sort!(
    /// Tag of `Integer` formulas.
    IntegerSort,
    "Integer",
    Integer
);
fixed_sort!(
    /// Tag of `Rational` formulas.
    RationalSort,
    "Rational",
    Rational
);
fixed_sort!(
    /// Tag of rounding-mode formulas.
    RoundingModeSort,
    "FloatingPointRoundingMode",
    FloatingPointRoundingMode
);
fixed_sort!(
    /// Tag of `String` formulas.
    StringSort,
    "String",
    String
);
fixed_sort!(
    /// Tag of `Regex` formulas.
    RegexSort,
    "Regex",
    Regex
);

impl NumeralSort for IntegerSort {}
impl NumeralSort for RationalSort {}

/// Tag of bitvector formulas of any width.
#[derive(Debug)]
pub enum BitvectorSort {}

impl SortTag for BitvectorSort {
    const NAME: &'static str = "Bitvector";

    fn admits(ty: &FormulaType) -> bool {
        ty.is_bitvector()
    }
}

impl ScalarSort for BitvectorSort {}

/// Tag of floating-point formulas of any precision.
#[derive(Debug)]
pub enum FloatingPointSort {}

impl SortTag for FloatingPointSort {
    const NAME: &'static str = "FloatingPoint";

    fn admits(ty: &FormulaType) -> bool {
        ty.is_floating_point()
    }
}

impl ScalarSort for FloatingPointSort {}

/// Tag of formulas whose sort is only known at runtime.
#[derive(Debug)]
pub enum AnySort {}

impl SortTag for AnySort {
    const NAME: &'static str = "Any";

    fn admits(_: &FormulaType) -> bool {
        true
    }
}

/// Tag of arrays from `I` to `E`.
#[derive(Debug)]
pub struct ArraySort<I, E>(PhantomData<fn() -> (I, E)>, std::convert::Infallible);

impl<I: SortTag, E: SortTag> SortTag for ArraySort<I, E> {
    const NAME: &'static str = "Array";

    fn admits(ty: &FormulaType) -> bool {
        ty.as_array()
            .is_some_and(|array| I::admits(array.index_type()) && E::admits(array.element_type()))
    }
}

impl<I: FixedSort, E: FixedSort> FixedSort for ArraySort<I, E> {
    fn formula_type() -> FormulaType {
        FormulaType::array(I::formula_type(), E::formula_type())
    }
}
