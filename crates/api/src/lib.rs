//! # smtwrap-api
//!
//! Typed formula algebra shared by every smtwrap backend.
//!
//! A backend session is a [`FormulaCreator`] over some [`Backend`]. The
//! creator is the only place where native terms become typed [`Formula`]s and
//! back. Theory managers in [`manager`] build formulas through the creator and
//! a backend's primitive hooks, so a backend only supplies the operations it
//! natively has.
//!
//! ## Usage
//!
//! ```ignore
//! let bmgr = context.booleans();
//! let p = bmgr.make_variable("p")?;
//! let q = bmgr.make_variable("q")?;
//! let both = bmgr.and(&p, &q)?;
//! assert_eq!(both.formula_type(), &FormulaType::Boolean);
//! ```

pub mod creator;
pub mod error;
pub mod formula;
pub mod formula_type;
pub mod manager;
pub mod model;
pub mod naming;
pub mod prover;
pub mod rounding_mode;
pub mod shutdown;
pub mod tag;
pub mod value;

#[cfg(test)]
mod testing;

pub use creator::{Backend, FormulaCreator};
pub use error::{ApiError, ApiResult, SortError};
pub use formula::{
    AnyFormula, ArrayFormula, BitvectorFormula, BooleanFormula, FloatingPointFormula, Formula,
    IntegerFormula, RationalFormula, RegexFormula, RoundingModeFormula, SessionId, StringFormula,
};
pub use formula_type::{ArrayType, BitvectorType, FloatingPointType, FormulaType};
pub use model::{CachingModel, Model, ModelPrimitives, RawAssignment, ValueAssignment};
pub use prover::ProverEnvironment;
pub use rounding_mode::FloatingPointRoundingMode;
pub use shutdown::{ShutdownManager, ShutdownNotifier};
pub use value::Value;
