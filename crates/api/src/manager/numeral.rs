use std::marker::PhantomData;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::creator::{Backend, FormulaCreator};
use crate::error::{ApiError, ApiResult};
use crate::formula::{BooleanFormula, Formula};
use crate::tag::{IntegerSort, NumeralSort, RationalSort};

/// Native arithmetic over one numeral sort.
///
/// The same trait serves integers and rationals; a backend implements it once
/// per sort so that `make_number` and `divide` pick the right native symbol.
pub trait NumeralPrimitives {
    type Term;

    /// Literal of the sort. Integer implementations only ever receive
    /// integral values.
    fn make_number(&self, value: &BigRational) -> ApiResult<Self::Term>;
    fn negate(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn add(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn sum(&self, operands: &[&Self::Term]) -> ApiResult<Self::Term>;
    fn subtract(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn multiply(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn divide(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn modulo(&self, _lhs: &Self::Term, _rhs: &Self::Term) -> ApiResult<Self::Term> {
        Err(ApiError::unsupported("modulo", "numeral"))
    }
    fn equal(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn distinct(&self, operands: &[&Self::Term]) -> ApiResult<Self::Term>;
    fn greater_than(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn greater_or_equals(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn less_than(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn less_or_equals(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
}

/// Typed arithmetic over the numeral sort `S`.
pub struct NumeralFormulaManager<S, B: Backend, P> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
    _sort: PhantomData<fn() -> S>,
}

pub type IntegerFormulaManager<B, P> = NumeralFormulaManager<IntegerSort, B, P>;
pub type RationalFormulaManager<B, P> = NumeralFormulaManager<RationalSort, B, P>;

type Num<S, B> = Formula<S, <B as Backend>::Term>;

impl<S, B, P> NumeralFormulaManager<S, B, P>
where
    S: NumeralSort,
    B: Backend,
    P: NumeralPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
            _sort: PhantomData,
        }
    }

    fn wrap(&self, term: B::Term) -> Num<S, B> {
        self.creator.encapsulate(term, S::formula_type())
    }

    fn wrap_boolean(&self, term: B::Term) -> BooleanFormula<B::Term> {
        self.creator.encapsulate_boolean(term)
    }

    fn binary(
        &self,
        lhs: &Num<S, B>,
        rhs: &Num<S, B>,
        op: impl FnOnce(&P, &B::Term, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<B::Term> {
        let lhs = self.creator.extract_info(lhs);
        let rhs = self.creator.extract_info(rhs);
        op(&self.primitives, lhs, rhs)
    }

    pub fn make_number(&self, value: i64) -> ApiResult<Num<S, B>> {
        self.make_integer_number(&BigInt::from(value))
    }

    pub fn make_integer_number(&self, value: &BigInt) -> ApiResult<Num<S, B>> {
        let value = BigRational::from_integer(value.clone());
        Ok(self.wrap(self.primitives.make_number(&value)?))
    }

    pub fn make_variable(&self, name: &str) -> ApiResult<Num<S, B>> {
        self.creator.make_variable(S::formula_type(), name)
    }

    pub fn negate(&self, operand: &Num<S, B>) -> ApiResult<Num<S, B>> {
        let operand = self.creator.extract_info(operand);
        Ok(self.wrap(self.primitives.negate(operand)?))
    }

    pub fn add(&self, lhs: &Num<S, B>, rhs: &Num<S, B>) -> ApiResult<Num<S, B>> {
        Ok(self.wrap(self.binary(lhs, rhs, P::add)?))
    }

    /// Sum of any number of formulas; empty is `0`.
    pub fn sum<'a, I>(&self, operands: I) -> ApiResult<Num<S, B>>
    where
        I: IntoIterator<Item = &'a Num<S, B>>,
        B::Term: 'a,
    {
        let operands: Vec<_> = operands
            .into_iter()
            .map(|f| self.creator.extract_info(f))
            .collect();
        Ok(self.wrap(self.primitives.sum(&operands)?))
    }

    pub fn subtract(&self, lhs: &Num<S, B>, rhs: &Num<S, B>) -> ApiResult<Num<S, B>> {
        Ok(self.wrap(self.binary(lhs, rhs, P::subtract)?))
    }

    pub fn multiply(&self, lhs: &Num<S, B>, rhs: &Num<S, B>) -> ApiResult<Num<S, B>> {
        Ok(self.wrap(self.binary(lhs, rhs, P::multiply)?))
    }

    /// Integer division for integers (SMT-LIB `div`), exact division for
    /// rationals.
    pub fn divide(&self, lhs: &Num<S, B>, rhs: &Num<S, B>) -> ApiResult<Num<S, B>> {
        Ok(self.wrap(self.binary(lhs, rhs, P::divide)?))
    }

    pub fn equal(&self, lhs: &Num<S, B>, rhs: &Num<S, B>) -> ApiResult<BooleanFormula<B::Term>> {
        Ok(self.wrap_boolean(self.binary(lhs, rhs, P::equal)?))
    }

    pub fn distinct<'a, I>(&self, operands: I) -> ApiResult<BooleanFormula<B::Term>>
    where
        I: IntoIterator<Item = &'a Num<S, B>>,
        B::Term: 'a,
    {
        let operands: Vec<_> = operands
            .into_iter()
            .map(|f| self.creator.extract_info(f))
            .collect();
        Ok(self.wrap_boolean(self.primitives.distinct(&operands)?))
    }

    pub fn greater_than(
        &self,
        lhs: &Num<S, B>,
        rhs: &Num<S, B>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        Ok(self.wrap_boolean(self.binary(lhs, rhs, P::greater_than)?))
    }

    pub fn greater_or_equals(
        &self,
        lhs: &Num<S, B>,
        rhs: &Num<S, B>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        Ok(self.wrap_boolean(self.binary(lhs, rhs, P::greater_or_equals)?))
    }

    pub fn less_than(&self, lhs: &Num<S, B>, rhs: &Num<S, B>) -> ApiResult<BooleanFormula<B::Term>> {
        Ok(self.wrap_boolean(self.binary(lhs, rhs, P::less_than)?))
    }

    pub fn less_or_equals(
        &self,
        lhs: &Num<S, B>,
        rhs: &Num<S, B>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        Ok(self.wrap_boolean(self.binary(lhs, rhs, P::less_or_equals)?))
    }
}

impl<B, P> NumeralFormulaManager<IntegerSort, B, P>
where
    B: Backend,
    P: NumeralPrimitives<Term = B::Term>,
{
    /// SMT-LIB `mod`: the remainder is never negative.
    pub fn modulo(
        &self,
        lhs: &Num<IntegerSort, B>,
        rhs: &Num<IntegerSort, B>,
    ) -> ApiResult<Num<IntegerSort, B>> {
        Ok(self.wrap(self.binary(lhs, rhs, P::modulo)?))
    }
}

impl<B, P> NumeralFormulaManager<RationalSort, B, P>
where
    B: Backend,
    P: NumeralPrimitives<Term = B::Term>,
{
    pub fn make_rational(&self, value: &BigRational) -> ApiResult<Num<RationalSort, B>> {
        Ok(self.wrap(self.primitives.make_number(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula_type::FormulaType;
    use crate::testing::{TextBackend, TextIntegerTheory, TextRationalTheory};

    fn creator() -> Rc<FormulaCreator<TextBackend>> {
        Rc::new(FormulaCreator::new(TextBackend::default()))
    }

    #[test]
    fn integer_operations() {
        let imgr: IntegerFormulaManager<_, _> = NumeralFormulaManager::new(creator(), TextIntegerTheory);
        let x = imgr.make_variable("x").unwrap();
        let two = imgr.make_number(2).unwrap();
        let minus = imgr.make_number(-3).unwrap();
        assert_eq!(two.to_string(), "2");
        assert_eq!(minus.to_string(), "(- 3)");

        let sum = imgr.add(&x, &two).unwrap();
        assert_eq!(sum.formula_type(), &FormulaType::Integer);
        assert_eq!(sum.to_string(), "(+ x 2)");
        assert_eq!(imgr.divide(&x, &two).unwrap().to_string(), "(div x 2)");
        assert_eq!(imgr.modulo(&x, &two).unwrap().to_string(), "(mod x 2)");
        assert_eq!(imgr.sum([&x, &two, &x]).unwrap().to_string(), "(+ x 2 x)");

        let cmp = imgr.less_than(&x, &two).unwrap();
        assert_eq!(cmp.formula_type(), &FormulaType::Boolean);
        assert_eq!(cmp.to_string(), "(< x 2)");
        assert_eq!(imgr.distinct([&x, &two]).unwrap().to_string(), "(distinct x 2)");
    }

    #[test]
    fn rational_operations() {
        let rmgr: RationalFormulaManager<_, _> = NumeralFormulaManager::new(creator(), TextRationalTheory);
        let y = rmgr.make_variable("y").unwrap();
        let half = rmgr
            .make_rational(&BigRational::new(1.into(), 2.into()))
            .unwrap();
        assert_eq!(half.formula_type(), &FormulaType::Rational);
        assert_eq!(rmgr.divide(&y, &half).unwrap().to_string(), "(/ y (/ 1 2))");
        assert_eq!(rmgr.negate(&y).unwrap().to_string(), "(- y)");
    }

    #[test]
    fn variable_names_are_checked() {
        let imgr: IntegerFormulaManager<_, _> = NumeralFormulaManager::new(creator(), TextIntegerTheory);
        assert!(matches!(
            imgr.make_variable("42"),
            Err(ApiError::InvalidName { .. })
        ));
    }
}
