//! Satisfying assignments and their evaluation.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::creator::{Backend, FormulaCreator};
use crate::error::ApiResult;
use crate::formula::{
    AnyFormula, BitvectorFormula, BooleanFormula, Formula, IntegerFormula, RationalFormula,
    StringFormula,
};
use crate::tag::{ScalarSort, SortTag};
use crate::value::Value;

/// One native `name(arguments) = value` entry of a model.
///
/// `key` is the term that was assigned: the bare symbol for constants, an
/// application (or `select`) for function and array entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAssignment<T> {
    pub key: T,
    pub value: T,
    pub name: String,
    pub arguments: Vec<T>,
}

/// Native side of a model.
pub trait ModelPrimitives {
    type Term;

    /// Evaluate `term` to a value term, or `None` when the model does not
    /// determine it.
    fn eval_impl(&self, term: &Self::Term) -> Option<Self::Term>;

    /// Every assignment of the model, arrays expanded entry by entry.
    fn to_list(&self) -> ApiResult<Vec<RawAssignment<Self::Term>>>;

    /// The defining equality `key = value`.
    fn equality(&self, key: &Self::Term, value: &Self::Term) -> ApiResult<Self::Term>;

    /// Free native resources. Called exactly once.
    fn release(&mut self);
}

/// Immutable snapshot of one model entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueAssignment<N> {
    key: AnyFormula<N>,
    value_formula: AnyFormula<N>,
    equality: BooleanFormula<N>,
    name: String,
    value: Value,
    arguments: Vec<Value>,
}

impl<N> ValueAssignment<N> {
    pub fn key(&self) -> &AnyFormula<N> {
        &self.key
    }

    pub fn value_formula(&self) -> &AnyFormula<N> {
        &self.value_formula
    }

    /// `key = value` as a formula of the model's session.
    pub fn equality(&self) -> &BooleanFormula<N> {
        &self.equality
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Argument values for function applications and array entries; empty
    /// for constants.
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }
}

impl<N> fmt::Display for ValueAssignment<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            let args: Vec<String> = self.arguments.iter().map(ToString::to_string).collect();
            write!(f, "({})", args.join(", "))?;
        }
        write!(f, " = {}", self.value)
    }
}

/// Read-only view over a satisfying assignment, bound to one session.
///
/// Released exactly once: by [`Model::close`] or on drop.
pub struct Model<B: Backend, P: ModelPrimitives<Term = B::Term>> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
    released: bool,
}

impl<B, P> Model<B, P>
where
    B: Backend,
    P: ModelPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
            released: false,
        }
    }

    /// Evaluate to a formula of the same sort.
    pub fn eval<S: SortTag>(&self, formula: &Formula<S, B::Term>) -> Option<Formula<S, B::Term>> {
        let term = self.primitives.eval_impl(self.creator.extract_info(formula))?;
        Some(self.creator.encapsulate(term, formula.formula_type().clone()))
    }

    /// Evaluate to a canonical host value.
    ///
    /// `None` when a needed symbol is unassigned or the model cannot decide
    /// the value.
    pub fn evaluate<S: ScalarSort>(&self, formula: &Formula<S, B::Term>) -> Option<Value> {
        self.evaluate_unchecked(formula)
    }

    /// Like [`Model::evaluate`] for dynamically sorted formulas.
    ///
    /// # Panics
    ///
    /// Panics if `formula` is array-sorted.
    pub fn evaluate_any(&self, formula: &AnyFormula<B::Term>) -> Option<Value> {
        assert!(
            !formula.formula_type().is_array(),
            "cannot compute a simple constant evaluation for an array formula"
        );
        self.evaluate_unchecked(formula)
    }

    fn evaluate_unchecked<S>(&self, formula: &Formula<S, B::Term>) -> Option<Value> {
        let term = self.primitives.eval_impl(self.creator.extract_info(formula))?;
        let value = self.creator.convert_value(formula, &term);
        if value.is_none() {
            tracing::trace!(sort = %formula.formula_type(), ?term, "evaluation is not a value");
        }
        value
    }

    pub fn evaluate_boolean(&self, formula: &BooleanFormula<B::Term>) -> Option<bool> {
        self.evaluate(formula)?.as_bool()
    }

    pub fn evaluate_integer(&self, formula: &IntegerFormula<B::Term>) -> Option<BigInt> {
        self.evaluate(formula)?.as_integer().cloned()
    }

    pub fn evaluate_rational(&self, formula: &RationalFormula<B::Term>) -> Option<BigRational> {
        match self.evaluate(formula)? {
            Value::Rational(r) => Some(r),
            Value::Integer(n) => Some(BigRational::from_integer(n)),
            _ => None,
        }
    }

    /// Unsigned reading of the bits.
    pub fn evaluate_bitvector(&self, formula: &BitvectorFormula<B::Term>) -> Option<BigInt> {
        self.evaluate(formula)?.as_integer().cloned()
    }

    pub fn evaluate_string(&self, formula: &StringFormula<B::Term>) -> Option<String> {
        self.evaluate(formula)?.as_str().map(str::to_string)
    }

    /// Every assignment of the model. Recomputed on each call.
    pub fn as_list(&self) -> ApiResult<Vec<ValueAssignment<B::Term>>> {
        let raw = self.primitives.to_list()?;
        let mut assignments = Vec::with_capacity(raw.len());
        for entry in raw {
            let key = self.creator.encapsulate_with_type_of(entry.key)?;
            let Some(value) = self.creator.convert_value(&key, &entry.value) else {
                tracing::warn!(name = %entry.name, "skipping model entry without a host value");
                continue;
            };
            let equality = self
                .primitives
                .equality(self.creator.extract_info(&key), &entry.value)?;
            let arity = entry.arguments.len();
            let mut arguments = Vec::with_capacity(arity);
            for argument in entry.arguments {
                let argument = self.creator.encapsulate_with_type_of(argument)?;
                let native = self.creator.extract_info(&argument);
                match self.creator.convert_value(&argument, native) {
                    Some(value) => arguments.push(value),
                    None => break,
                }
            }
            if arguments.len() < arity {
                tracing::warn!(name = %entry.name, "skipping model entry without a host value");
                continue;
            }
            let value_formula = self.creator.encapsulate(entry.value, key.formula_type().clone());
            assignments.push(ValueAssignment {
                key,
                value_formula,
                equality: self.creator.encapsulate_boolean(equality),
                name: entry.name,
                value,
                arguments,
            });
        }
        Ok(assignments)
    }

    pub fn creator(&self) -> &Rc<FormulaCreator<B>> {
        &self.creator
    }

    /// Release the model now instead of at drop.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.primitives.release();
            tracing::trace!("model released");
        }
    }
}

impl<B, P> Drop for Model<B, P>
where
    B: Backend,
    P: ModelPrimitives<Term = B::Term>,
{
    fn drop(&mut self) {
        self.release();
    }
}

impl<B, P> fmt::Debug for Model<B, P>
where
    B: Backend,
    P: ModelPrimitives<Term = B::Term>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("session", &self.creator.session())
            .field("released", &self.released)
            .finish()
    }
}

/// A [`Model`] whose assignment list is computed at most once.
pub struct CachingModel<B: Backend, P: ModelPrimitives<Term = B::Term>> {
    model: Model<B, P>,
    assignments: OnceCell<Vec<ValueAssignment<B::Term>>>,
}

impl<B, P> CachingModel<B, P>
where
    B: Backend,
    P: ModelPrimitives<Term = B::Term>,
{
    pub fn new(model: Model<B, P>) -> Self {
        Self {
            model,
            assignments: OnceCell::new(),
        }
    }

    /// The assignment list, computed on first use.
    ///
    /// Every call returns the same slice.
    pub fn as_list(&self) -> ApiResult<&[ValueAssignment<B::Term>]> {
        if self.assignments.get().is_none() {
            let list = self.model.as_list()?;
            let _ = self.assignments.set(list);
        }
        Ok(self
            .assignments
            .get()
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    pub fn eval<S: SortTag>(&self, formula: &Formula<S, B::Term>) -> Option<Formula<S, B::Term>> {
        self.model.eval(formula)
    }

    pub fn evaluate<S: ScalarSort>(&self, formula: &Formula<S, B::Term>) -> Option<Value> {
        self.model.evaluate(formula)
    }

    pub fn evaluate_any(&self, formula: &AnyFormula<B::Term>) -> Option<Value> {
        self.model.evaluate_any(formula)
    }

    pub fn evaluate_boolean(&self, formula: &BooleanFormula<B::Term>) -> Option<bool> {
        self.model.evaluate_boolean(formula)
    }

    pub fn evaluate_integer(&self, formula: &IntegerFormula<B::Term>) -> Option<BigInt> {
        self.model.evaluate_integer(formula)
    }

    pub fn evaluate_rational(&self, formula: &RationalFormula<B::Term>) -> Option<BigRational> {
        self.model.evaluate_rational(formula)
    }

    pub fn evaluate_bitvector(&self, formula: &BitvectorFormula<B::Term>) -> Option<BigInt> {
        self.model.evaluate_bitvector(formula)
    }

    pub fn evaluate_string(&self, formula: &StringFormula<B::Term>) -> Option<String> {
        self.model.evaluate_string(formula)
    }

    pub fn close(self) {
        self.model.close();
    }
}

impl<B, P> From<Model<B, P>> for CachingModel<B, P>
where
    B: Backend,
    P: ModelPrimitives<Term = B::Term>,
{
    fn from(model: Model<B, P>) -> Self {
        Self::new(model)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::formula_type::FormulaType;
    use crate::tag::{AnySort, BooleanSort, IntegerSort};
    use crate::testing::{TextBackend, TextModel};

    fn model(pairs: &[(&str, &str)]) -> (Model<TextBackend, TextModel>, Rc<Cell<u32>>) {
        let creator = Rc::new(FormulaCreator::new(TextBackend::default()));
        let releases = Rc::new(Cell::new(0));
        let primitives = TextModel::new(pairs, Rc::clone(&releases));
        (Model::new(creator, primitives), releases)
    }

    #[test]
    fn evaluate_converts_by_sort() {
        let (model, _) = model(&[("x", "3"), ("p", "true"), ("s", "\"hi\"")]);
        let creator = Rc::clone(model.creator());
        let x = creator.make_variable::<IntegerSort>(FormulaType::Integer, "x").unwrap();
        let p = creator.encapsulate_boolean("p".into());
        let s = creator.encapsulate_string("s".into());
        assert_eq!(model.evaluate_integer(&x), Some(3.into()));
        assert_eq!(model.evaluate_boolean(&p), Some(true));
        assert_eq!(model.evaluate_string(&s).as_deref(), Some("hi"));
        assert_eq!(model.eval(&x).map(|f| f.to_string()).as_deref(), Some("3"));
    }

    #[test]
    fn unassigned_symbols_are_absent() {
        let (model, _) = model(&[("x", "3")]);
        let y = model.creator().encapsulate_integer("y".into());
        assert_eq!(model.evaluate(&y), None);
        assert_eq!(model.evaluate(&y), None);
        assert!(model.eval(&y).is_none());
    }

    #[test]
    #[should_panic(expected = "cannot compute a simple constant evaluation for an array formula")]
    fn evaluate_any_rejects_arrays() {
        let (model, _) = model(&[]);
        let array = model.creator().encapsulate::<AnySort>(
            "a".into(),
            FormulaType::array(FormulaType::Integer, FormulaType::Integer),
        );
        let _ = model.evaluate_any(&array);
    }

    #[test]
    fn as_list_builds_assignments() {
        let (model, _) = model(&[("x", "3"), ("p", "false")]);
        let creator = Rc::clone(model.creator());
        creator
            .make_variable::<IntegerSort>(FormulaType::Integer, "x")
            .unwrap();
        creator
            .make_variable::<BooleanSort>(FormulaType::Boolean, "p")
            .unwrap();
        let list = model.as_list().unwrap();
        let x = list.iter().find(|a| a.name() == "x").unwrap();
        assert_eq!(x.value(), &Value::Integer(3.into()));
        assert_eq!(x.key().formula_type(), &FormulaType::Integer);
        assert_eq!(x.equality().to_string(), "(= x 3)");
        assert!(x.arguments().is_empty());
        assert_eq!(x.to_string(), "x = 3");
        assert_eq!(list.len(), 2);
    }

    /// Raw entries handed out as-is, for application listings.
    struct Applications(Vec<RawAssignment<String>>);

    impl ModelPrimitives for Applications {
        type Term = String;

        fn eval_impl(&self, _term: &String) -> Option<String> {
            None
        }

        fn to_list(&self) -> ApiResult<Vec<RawAssignment<String>>> {
            Ok(self.0.clone())
        }

        fn equality(&self, key: &String, value: &String) -> ApiResult<String> {
            Ok(format!("(= {key} {value})"))
        }

        fn release(&mut self) {}
    }

    #[test]
    fn entries_with_unconvertible_arguments_are_skipped() {
        let creator = Rc::new(FormulaCreator::new(TextBackend::default()));
        for name in ["k1", "k2", "i"] {
            creator
                .make_variable::<IntegerSort>(FormulaType::Integer, name)
                .unwrap();
        }
        let entry = |key: &str, value: &str, arguments: &[&str]| RawAssignment {
            key: key.to_string(),
            value: value.to_string(),
            name: "f".to_string(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
        };
        let model = Model::new(
            creator,
            Applications(vec![
                entry("k1", "5", &["1"]),
                entry("k2", "6", &["1", "i"]),
            ]),
        );

        let list = model.as_list().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].value(), &Value::Integer(5.into()));
        assert_eq!(list[0].arguments(), &[Value::Integer(1.into())]);
    }

    #[test]
    fn caching_model_computes_once() {
        let (model, _) = model(&[("p", "true")]);
        model
            .creator()
            .make_variable::<BooleanSort>(FormulaType::Boolean, "p")
            .unwrap();
        let caching = CachingModel::new(model);
        let first = caching.as_list().unwrap();
        let second = caching.as_list().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn released_exactly_once() {
        let (closed, releases) = model(&[]);
        closed.close();
        assert_eq!(releases.get(), 1);

        let (dropped, releases) = model(&[]);
        drop(dropped);
        assert_eq!(releases.get(), 1);

        let (cached, releases) = model(&[]);
        CachingModel::new(cached).close();
        assert_eq!(releases.get(), 1);
    }
}
