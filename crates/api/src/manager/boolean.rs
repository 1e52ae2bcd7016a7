use std::rc::Rc;

use crate::creator::{Backend, FormulaCreator};
use crate::error::ApiResult;
use crate::formula::{BooleanFormula, Formula};
use crate::formula_type::FormulaType;
use crate::tag::SortTag;

/// Native boolean operations.
pub trait BooleanPrimitives {
    type Term;

    fn make_boolean(&self, value: bool) -> ApiResult<Self::Term>;
    fn not(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn and(&self, operands: &[&Self::Term]) -> ApiResult<Self::Term>;
    fn or(&self, operands: &[&Self::Term]) -> ApiResult<Self::Term>;
    fn xor(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn implication(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn equivalence(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn if_then_else(
        &self,
        condition: &Self::Term,
        then_branch: &Self::Term,
        else_branch: &Self::Term,
    ) -> ApiResult<Self::Term>;
    /// Syntactic check, no solving involved.
    fn is_true(&self, term: &Self::Term) -> bool;
    /// Syntactic check, no solving involved.
    fn is_false(&self, term: &Self::Term) -> bool;
}

/// Typed boolean operations.
pub struct BooleanFormulaManager<B: Backend, P> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
}

impl<B, P> BooleanFormulaManager<B, P>
where
    B: Backend,
    P: BooleanPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
        }
    }

    fn wrap(&self, term: B::Term) -> BooleanFormula<B::Term> {
        self.creator.encapsulate_boolean(term)
    }

    pub fn make_true(&self) -> ApiResult<BooleanFormula<B::Term>> {
        self.make_boolean(true)
    }

    pub fn make_false(&self) -> ApiResult<BooleanFormula<B::Term>> {
        self.make_boolean(false)
    }

    pub fn make_boolean(&self, value: bool) -> ApiResult<BooleanFormula<B::Term>> {
        Ok(self.wrap(self.primitives.make_boolean(value)?))
    }

    pub fn make_variable(&self, name: &str) -> ApiResult<BooleanFormula<B::Term>> {
        self.creator.make_variable(FormulaType::Boolean, name)
    }

    pub fn not(&self, operand: &BooleanFormula<B::Term>) -> ApiResult<BooleanFormula<B::Term>> {
        let operand = self.creator.extract_info(operand);
        Ok(self.wrap(self.primitives.not(operand)?))
    }

    pub fn and(
        &self,
        lhs: &BooleanFormula<B::Term>,
        rhs: &BooleanFormula<B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        self.and_all([lhs, rhs])
    }

    pub fn or(
        &self,
        lhs: &BooleanFormula<B::Term>,
        rhs: &BooleanFormula<B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        self.or_all([lhs, rhs])
    }

    /// Conjunction of any number of formulas; empty is `true`.
    pub fn and_all<'a, I>(&self, operands: I) -> ApiResult<BooleanFormula<B::Term>>
    where
        I: IntoIterator<Item = &'a BooleanFormula<B::Term>>,
        B::Term: 'a,
    {
        let operands: Vec<_> = operands
            .into_iter()
            .map(|f| self.creator.extract_info(f))
            .collect();
        Ok(self.wrap(self.primitives.and(&operands)?))
    }

    /// Disjunction of any number of formulas; empty is `false`.
    pub fn or_all<'a, I>(&self, operands: I) -> ApiResult<BooleanFormula<B::Term>>
    where
        I: IntoIterator<Item = &'a BooleanFormula<B::Term>>,
        B::Term: 'a,
    {
        let operands: Vec<_> = operands
            .into_iter()
            .map(|f| self.creator.extract_info(f))
            .collect();
        Ok(self.wrap(self.primitives.or(&operands)?))
    }

    pub fn xor(
        &self,
        lhs: &BooleanFormula<B::Term>,
        rhs: &BooleanFormula<B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        let (lhs, rhs) = (self.creator.extract_info(lhs), self.creator.extract_info(rhs));
        Ok(self.wrap(self.primitives.xor(lhs, rhs)?))
    }

    pub fn implication(
        &self,
        premise: &BooleanFormula<B::Term>,
        conclusion: &BooleanFormula<B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        let premise = self.creator.extract_info(premise);
        let conclusion = self.creator.extract_info(conclusion);
        Ok(self.wrap(self.primitives.implication(premise, conclusion)?))
    }

    pub fn equivalence(
        &self,
        lhs: &BooleanFormula<B::Term>,
        rhs: &BooleanFormula<B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        let (lhs, rhs) = (self.creator.extract_info(lhs), self.creator.extract_info(rhs));
        Ok(self.wrap(self.primitives.equivalence(lhs, rhs)?))
    }

    /// `if condition then then_branch else else_branch` for branches of any
    /// sort.
    ///
    /// # Panics
    ///
    /// Panics if the branches have different sorts (e.g. bitvectors of
    /// different widths).
    pub fn if_then_else<S: SortTag>(
        &self,
        condition: &BooleanFormula<B::Term>,
        then_branch: &Formula<S, B::Term>,
        else_branch: &Formula<S, B::Term>,
    ) -> ApiResult<Formula<S, B::Term>> {
        let ty = then_branch.formula_type();
        assert_eq!(
            ty,
            else_branch.formula_type(),
            "if-then-else branches must have the same sort"
        );
        let condition = self.creator.extract_info(condition);
        let then_term = self.creator.extract_info(then_branch);
        let else_term = self.creator.extract_info(else_branch);
        let term = self
            .primitives
            .if_then_else(condition, then_term, else_term)?;
        Ok(self.creator.encapsulate(term, ty.clone()))
    }

    pub fn is_true(&self, formula: &BooleanFormula<B::Term>) -> bool {
        self.primitives.is_true(self.creator.extract_info(formula))
    }

    pub fn is_false(&self, formula: &BooleanFormula<B::Term>) -> bool {
        self.primitives.is_false(self.creator.extract_info(formula))
    }
}
