use crate::model::SolverModel;

/// Result from the SMT solver.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// The assertions are satisfiable.
    Sat(Option<SolverModel>),
    /// The assertions are unsatisfiable.
    Unsat,
    /// Solver couldn't determine (timeout, resource limit, etc.).
    Unknown(String),
}

impl SolverResult {
    /// Returns `true` if the result is `Sat`.
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    /// Returns `true` if the result is `Unsat`.
    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    /// Returns `true` if the result is `Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverResult::Unknown(_))
    }

    /// Returns the model if the result is `Sat` with a model.
    pub fn model(&self) -> Option<&SolverModel> {
        match self {
            SolverResult::Sat(Some(model)) => Some(model),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<SolverModel> {
        match self {
            SolverResult::Sat(model) => model,
            _ => None,
        }
    }
}
