//! # smtwrap-smtlib
//!
//! SMT-LIB2 as data: sorts, terms and commands, their textual form, and the
//! way back from solver output.
//!
//! - [`sort`], [`term`], [`command`], [`script`]: the AST and scripts built from it
//! - [`formatter`]: `Display` impls producing SMT-LIB2 text
//! - [`reader`]: S-expression reader for models and solver responses
//! - [`typing`]: sort inference over terms
//! - [`float`]: exact IEEE 754 arithmetic in arbitrary formats
//! - [`eval`]: ground evaluation of terms under a model
//!
//! ## Usage
//!
//! ```
//! use smtwrap_smtlib::{Command, Script, Sort, Term};
//!
//! let mut script = Script::new();
//! script.push(Command::DeclareConst("x".into(), Sort::Int));
//! script.push(Command::Assert(Term::Gt(
//!     Box::new(Term::constant("x")),
//!     Box::new(Term::int(0)),
//! )));
//! script.ensure_check_sat_and_get_model();
//! assert!(script.to_string().contains("(declare-const x Int)"));
//! ```

pub mod command;
pub mod eval;
pub mod float;
pub mod formatter;
pub mod reader;
pub mod script;
pub mod sort;
pub mod term;
pub mod typing;

pub use command::Command;
pub use eval::{Definition, Evaluator, Val};
pub use float::{FloatFormat, FloatValue};
pub use reader::{ReadError, SExpr};
pub use script::Script;
pub use sort::{RoundingMode, Sort};
pub use term::Term;
pub use typing::{SymbolTable, TypeError};
