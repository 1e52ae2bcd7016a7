use std::rc::Rc;

use crate::creator::{Backend, FormulaCreator};
use crate::error::ApiResult;
use crate::formula::{ArrayFormula, BooleanFormula, Formula};
use crate::formula_type::FormulaType;
use crate::tag::SortTag;

/// Native array operations.
pub trait ArrayPrimitives {
    type Term;

    fn select(&self, array: &Self::Term, index: &Self::Term) -> ApiResult<Self::Term>;
    fn store(
        &self,
        array: &Self::Term,
        index: &Self::Term,
        value: &Self::Term,
    ) -> ApiResult<Self::Term>;
    fn equivalence(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
}

/// Typed array operations.
pub struct ArrayFormulaManager<B: Backend, P> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
}

impl<B, P> ArrayFormulaManager<B, P>
where
    B: Backend,
    P: ArrayPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
        }
    }

    /// Declare an array variable from `index` to `element`.
    ///
    /// # Panics
    ///
    /// Panics if the tags `I`/`E` do not admit `index`/`element`.
    pub fn make_array_variable<I: SortTag, E: SortTag>(
        &self,
        name: &str,
        index: FormulaType,
        element: FormulaType,
    ) -> ApiResult<ArrayFormula<I, E, B::Term>> {
        self.creator
            .make_variable(FormulaType::array(index, element), name)
    }

    /// `array[index]`.
    pub fn select<I: SortTag, E: SortTag>(
        &self,
        array: &ArrayFormula<I, E, B::Term>,
        index: &Formula<I, B::Term>,
    ) -> ApiResult<Formula<E, B::Term>> {
        let ty = self.array_type(array);
        assert_eq!(
            index.formula_type(),
            ty.0,
            "array index must have the array's index sort"
        );
        let term = self.primitives.select(
            self.creator.extract_info(array),
            self.creator.extract_info(index),
        )?;
        Ok(self.creator.encapsulate(term, ty.1.clone()))
    }

    /// `array` with `index` mapped to `value`.
    pub fn store<I: SortTag, E: SortTag>(
        &self,
        array: &ArrayFormula<I, E, B::Term>,
        index: &Formula<I, B::Term>,
        value: &Formula<E, B::Term>,
    ) -> ApiResult<ArrayFormula<I, E, B::Term>> {
        let (index_ty, element_ty) = self.array_type(array);
        assert_eq!(
            index.formula_type(),
            index_ty,
            "array index must have the array's index sort"
        );
        assert_eq!(
            value.formula_type(),
            element_ty,
            "stored value must have the array's element sort"
        );
        let term = self.primitives.store(
            self.creator.extract_info(array),
            self.creator.extract_info(index),
            self.creator.extract_info(value),
        )?;
        Ok(self.creator.encapsulate(term, array.formula_type().clone()))
    }

    /// Extensional equality of two arrays of the same sort.
    pub fn equivalence<I: SortTag, E: SortTag>(
        &self,
        lhs: &ArrayFormula<I, E, B::Term>,
        rhs: &ArrayFormula<I, E, B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        assert_eq!(
            lhs.formula_type(),
            rhs.formula_type(),
            "compared arrays must have the same sort"
        );
        let term = self.primitives.equivalence(
            self.creator.extract_info(lhs),
            self.creator.extract_info(rhs),
        )?;
        Ok(self.creator.encapsulate_boolean(term))
    }

    fn array_type<'f, I, E>(
        &self,
        array: &'f ArrayFormula<I, E, B::Term>,
    ) -> (&'f FormulaType, &'f FormulaType) {
        match array.formula_type().as_array() {
            Some(ty) => (ty.index_type(), ty.element_type()),
            None => unreachable!("array formula recorded with sort {}", array.formula_type()),
        }
    }
}
