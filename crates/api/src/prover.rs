use crate::creator::Backend;
use crate::error::ApiResult;
use crate::formula::BooleanFormula;

/// An assertion stack that can be checked for satisfiability.
///
/// Implementations are scoped resources: `close` (or drop) releases them and
/// no operation is possible afterwards.
pub trait ProverEnvironment {
    type Backend: Backend;
    type Model;

    /// Open a new assertion level.
    fn push(&mut self);

    /// Discard the innermost assertion level.
    ///
    /// # Panics
    ///
    /// Panics when no level is open.
    fn pop(&mut self);

    fn add_constraint(
        &mut self,
        constraint: &BooleanFormula<<Self::Backend as Backend>::Term>,
    ) -> ApiResult<()>;

    /// Check the current assertions. Fails with
    /// [`ApiError::Interrupted`](crate::ApiError::Interrupted) when a shutdown
    /// was requested before or during the check.
    fn is_unsat(&mut self) -> ApiResult<bool>;

    /// Model of the last satisfiable check.
    fn model(&mut self) -> ApiResult<Self::Model>;

    /// Number of open assertion levels.
    fn depth(&self) -> usize;

    fn close(self)
    where
        Self: Sized;
}
