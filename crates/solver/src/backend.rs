//! Abstraction over the process that answers `check-sat`.
//!
//! [`SolverBackend`] is the seam between the prover and whatever runs the
//! SMT-LIB script. The subprocess [`CliSolver`] is the production
//! implementation; tests substitute scripted answers.

use smtwrap_api::ShutdownNotifier;
use smtwrap_smtlib::Script;

use crate::config::SolverKind;
use crate::error::SolverError;
use crate::result::SolverResult;
use crate::solver::CliSolver;

/// Trait abstracting over different SMT solver backends.
pub trait SolverBackend {
    /// Check satisfiability of the given SMT script.
    ///
    /// Returns:
    /// - `Ok(SolverResult::Sat(model))` if satisfiable
    /// - `Ok(SolverResult::Unsat)` if unsatisfiable
    /// - `Ok(SolverResult::Unknown(reason))` if solver couldn't determine
    /// - `Err(SolverError)` if the solver invocation failed
    fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        self.check_sat_interruptible(script, &ShutdownNotifier::never())
    }

    /// Same as [`check_sat`](Self::check_sat), giving up with
    /// [`SolverError::Interrupted`] once `notifier` fires.
    fn check_sat_interruptible(
        &self,
        script: &Script,
        notifier: &ShutdownNotifier,
    ) -> Result<SolverResult, SolverError>;

    /// Solver name for diagnostics.
    fn name(&self) -> String;
}

/// Implement `SolverBackend` for the CLI-based solver (Z3, CVC5, Yices).
impl SolverBackend for CliSolver {
    fn check_sat_interruptible(
        &self,
        script: &Script,
        notifier: &ShutdownNotifier,
    ) -> Result<SolverResult, SolverError> {
        CliSolver::check_sat_interruptible(self, script, notifier)
    }

    fn name(&self) -> String {
        self.config().kind.to_string()
    }
}

/// Create a subprocess backend for the specified solver kind, locating its
/// binary automatically.
pub fn create_backend(kind: SolverKind) -> Result<Box<dyn SolverBackend>, SolverError> {
    tracing::debug!("Using {kind} subprocess backend");
    let solver = CliSolver::with_default_config_for(kind)?;
    Ok(Box::new(solver))
}

/// Create the default solver backend (Z3).
pub fn create_default_backend() -> Result<Box<dyn SolverBackend>, SolverError> {
    create_backend(SolverKind::Z3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smtwrap_smtlib::{Command as SmtCmd, Sort, Term};

    #[test]
    fn subprocess_backend_works() {
        let Ok(backend) = create_default_backend() else {
            return;
        };

        let mut script = Script::new();
        script.push(SmtCmd::SetLogic("QF_BV".to_string()));
        script.push(SmtCmd::DeclareConst("x".to_string(), Sort::BitVec(32)));
        script.push(SmtCmd::Assert(Term::BvUGt(
            Box::new(Term::constant("x")),
            Box::new(Term::BitVecLit(0.into(), 32)),
        )));

        let result = backend.check_sat(&script).expect("check_sat failed");
        assert!(result.is_sat(), "Expected SAT result");
        assert_eq!(backend.name(), "Z3");
    }

    #[test]
    fn create_backend_cvc5_fails_when_not_installed() {
        // If it succeeds, CVC5 was found -- that's fine too
        if let Err(err) = create_backend(SolverKind::Cvc5) {
            assert!(
                err.to_string().contains("CVC5"),
                "Error should mention CVC5"
            );
        }
    }

    #[test]
    fn create_backend_yices_fails_when_not_installed() {
        if let Err(err) = create_backend(SolverKind::Yices) {
            assert!(
                err.to_string().contains("Yices"),
                "Error should mention Yices"
            );
        }
    }
}
