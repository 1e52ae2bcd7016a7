//! # smtwrap-solver
//!
//! SMT-LIB backend for `smtwrap-api`.
//!
//! Formulas are SMT-LIB [`Term`](smtwrap_smtlib::Term)s. Checks run an
//! external solver (Z3, CVC5 or Yices) as a subprocess fed SMT-LIB2 text;
//! `(get-model)` output is parsed back into definitions and evaluated
//! locally.
//!
//! ## Usage
//!
//! ```no_run
//! use smtwrap_api::ProverEnvironment;
//! use smtwrap_solver::{ContextConfig, SolverConfig, SolverContext, StringTheoryKind};
//!
//! let config = ContextConfig::new(SolverConfig::auto_detect()?)
//!     .with_string_theory(StringTheoryKind::Strings);
//! let context = SolverContext::new(config)?;
//!
//! let smgr = context.strings();
//! let imgr = context.integers();
//! let s = smgr.make_variable("s")?;
//! let hello = smgr.concat(&s, &smgr.make_string("!")?)?;
//! let long = imgr.greater_than(&smgr.length(&hello)?, &imgr.make_number(3)?)?;
//!
//! let mut prover = context.new_prover();
//! prover.add_constraint(&long)?;
//! if !prover.is_unsat()? {
//!     let model = prover.model()?;
//!     println!("s = {:?}", model.evaluate_string(&s));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapter;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod evaluation;
pub mod model;
mod parser;
pub mod prover;
pub mod result;
pub mod solver;
pub mod strings;
pub mod theories;

pub use adapter::SmtlibBackend;
pub use backend::{SolverBackend, create_backend, create_default_backend};
pub use config::{ContextConfig, SolverConfig, SolverKind, StringTheoryKind};
pub use context::SolverContext;
pub use error::SolverError;
pub use evaluation::{SmtlibCachingModel, SmtlibModel, SmtlibSessionModel};
pub use model::SolverModel;
pub use prover::SmtlibProver;
pub use result::SolverResult;
pub use solver::CliSolver;
pub use strings::{ConcatOnlyTheory, SequenceTheory, StringTheory, string_primitives};
