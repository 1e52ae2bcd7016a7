//! Theory managers.
//!
//! Every manager follows the same three steps for each operation: extract the
//! native terms of its formula arguments through the session's
//! [`FormulaCreator`](crate::FormulaCreator), call the same-named hook of its
//! primitive trait, and encapsulate the result with the statically known sort.
//! A backend implements the primitive traits; the managers are shared.

mod array;
mod bitvector;
mod boolean;
mod floating_point;
mod numeral;
mod string;

pub use array::{ArrayFormulaManager, ArrayPrimitives};
pub use bitvector::{BitvectorFormulaManager, BitvectorPrimitives, to_signed};
pub use boolean::{BooleanFormulaManager, BooleanPrimitives};
pub use floating_point::{FloatingPointFormulaManager, FloatingPointPrimitives};
pub use numeral::{
    IntegerFormulaManager, NumeralFormulaManager, NumeralPrimitives, RationalFormulaManager,
};
pub use string::{StringFormulaManager, StringPrimitives};
