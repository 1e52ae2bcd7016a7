//! The encapsulation/extraction boundary between typed formulas and a
//! backend's native terms.

use std::fmt;

use crate::error::ApiResult;
use crate::formula::{
    AnyFormula, BitvectorFormula, BooleanFormula, FloatingPointFormula, Formula, IntegerFormula,
    RationalFormula, RegexFormula, RoundingModeFormula, SessionId, StringFormula,
};
use crate::formula_type::{FloatingPointType, FormulaType};
use crate::naming::check_variable_name;
use crate::tag::SortTag;
use crate::value::Value;

/// Native side of one backend session.
///
/// Implementations map between [`FormulaType`] and native sorts, declare
/// variables, and turn evaluated native terms into canonical [`Value`]s. The
/// theory-specific operations live in the per-theory primitive traits
/// (see [`crate::manager`]).
pub trait Backend {
    /// Native formula handle.
    type Term: Clone + fmt::Debug + PartialEq;
    /// Native sort handle.
    type Sort: Clone + fmt::Debug;

    /// Short backend name used in error messages.
    fn name(&self) -> &'static str;

    fn native_sort(&self, ty: &FormulaType) -> ApiResult<Self::Sort>;

    fn formula_type(&self, sort: &Self::Sort) -> ApiResult<FormulaType>;

    /// Native sort of an arbitrary term.
    fn sort_of(&self, term: &Self::Term) -> ApiResult<Self::Sort>;

    /// Declare (or look up) a free constant. The name has already passed
    /// [`check_variable_name`].
    fn make_variable(&self, sort: &Self::Sort, name: &str) -> ApiResult<Self::Term>;

    /// Convert an evaluated term into the canonical value kind of `original`.
    ///
    /// Returns `None` when `evaluated` is not a value of that sort (for
    /// example a term that still mentions unassigned symbols).
    fn convert_value(&self, original: &FormulaType, evaluated: &Self::Term) -> Option<Value>;
}

/// Session-scoped authority over native terms.
///
/// All formulas handed to client code are built here, and every manager
/// operation passes its arguments back through [`FormulaCreator::extract_info`].
#[derive(Debug)]
pub struct FormulaCreator<B: Backend> {
    backend: B,
    session: SessionId,
}

impl<B: Backend> FormulaCreator<B> {
    /// Open a new session over `backend`.
    pub fn new(backend: B) -> Self {
        let session = SessionId::fresh();
        tracing::debug!(backend = backend.name(), %session, "opened formula session");
        Self { backend, session }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Wrap `term` as a formula of sort `ty`.
    ///
    /// The term is trusted to have sort `ty`; it is not re-checked against the
    /// backend.
    ///
    /// # Panics
    ///
    /// Panics if the static tag `S` does not admit `ty`.
    pub fn encapsulate<S: SortTag>(&self, term: B::Term, ty: FormulaType) -> Formula<S, B::Term> {
        assert!(
            S::admits(&ty),
            "cannot encapsulate a term of sort {ty} as a {} formula",
            S::NAME
        );
        Formula::new(term, ty, self.session)
    }

    pub fn encapsulate_boolean(&self, term: B::Term) -> BooleanFormula<B::Term> {
        self.encapsulate(term, FormulaType::Boolean)
    }

    pub fn encapsulate_integer(&self, term: B::Term) -> IntegerFormula<B::Term> {
        self.encapsulate(term, FormulaType::Integer)
    }

    pub fn encapsulate_rational(&self, term: B::Term) -> RationalFormula<B::Term> {
        self.encapsulate(term, FormulaType::Rational)
    }

    pub fn encapsulate_bitvector(&self, term: B::Term, size: u32) -> BitvectorFormula<B::Term> {
        self.encapsulate(term, FormulaType::bitvector(size))
    }

    pub fn encapsulate_floating_point(
        &self,
        term: B::Term,
        ty: FloatingPointType,
    ) -> FloatingPointFormula<B::Term> {
        self.encapsulate(term, FormulaType::FloatingPoint(ty))
    }

    pub fn encapsulate_rounding_mode(&self, term: B::Term) -> RoundingModeFormula<B::Term> {
        self.encapsulate(term, FormulaType::FloatingPointRoundingMode)
    }

    pub fn encapsulate_string(&self, term: B::Term) -> StringFormula<B::Term> {
        self.encapsulate(term, FormulaType::String)
    }

    pub fn encapsulate_regex(&self, term: B::Term) -> RegexFormula<B::Term> {
        self.encapsulate(term, FormulaType::Regex)
    }

    /// Wrap `term` with the sort the backend reports for it.
    pub fn encapsulate_with_type_of(&self, term: B::Term) -> ApiResult<AnyFormula<B::Term>> {
        let sort = self.backend.sort_of(&term)?;
        let ty = self.backend.formula_type(&sort)?;
        Ok(self.encapsulate(term, ty))
    }

    /// Borrow the native term of a formula.
    ///
    /// # Panics
    ///
    /// Panics if `formula` was created by another session.
    pub fn extract_info<'f, S>(&self, formula: &'f Formula<S, B::Term>) -> &'f B::Term {
        assert_eq!(
            formula.session(),
            self.session,
            "formula {:?} belongs to session {}, not {}",
            formula.native(),
            formula.session(),
            self.session
        );
        formula.native()
    }

    /// Sort recorded for `formula` at encapsulation.
    pub fn formula_type<'f, S>(&self, formula: &'f Formula<S, B::Term>) -> &'f FormulaType {
        formula.formula_type()
    }

    /// Validate `name`, declare it with sort `ty` and wrap the result.
    pub fn make_variable<S: SortTag>(
        &self,
        ty: FormulaType,
        name: &str,
    ) -> ApiResult<Formula<S, B::Term>> {
        check_variable_name(name)?;
        let sort = self.backend.native_sort(&ty)?;
        let term = self.backend.make_variable(&sort, name)?;
        tracing::trace!(name, sort = %ty, "declared variable");
        Ok(self.encapsulate(term, ty))
    }

    /// Convert an evaluation result according to the sort of the formula that
    /// was evaluated, not the shape of the result.
    pub fn convert_value<S>(
        &self,
        original: &Formula<S, B::Term>,
        evaluated: &B::Term,
    ) -> Option<Value> {
        self.backend
            .convert_value(original.formula_type(), evaluated)
    }
}
