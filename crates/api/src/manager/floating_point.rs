use std::rc::Rc;

use num_rational::BigRational;
use num_traits::Zero;

use crate::creator::{Backend, FormulaCreator};
use crate::error::{ApiError, ApiResult};
use crate::formula::{
    BitvectorFormula, BooleanFormula, FloatingPointFormula, Formula, RationalFormula,
    RoundingModeFormula,
};
use crate::formula_type::{FloatingPointType, FormulaType};
use crate::rounding_mode::FloatingPointRoundingMode;
use crate::tag::NumeralSort;
use crate::value::parse_decimal;

/// Native IEEE-754 operations.
///
/// Rounding modes are passed as host values; the backend picks its own
/// native representation.
pub trait FloatingPointPrimitives {
    type Term;

    /// Rounded literal for a finite, non-zero rational.
    fn make_number(
        &self,
        value: &BigRational,
        ty: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn make_zero(&self, negative: bool, ty: &FloatingPointType) -> ApiResult<Self::Term>;
    fn make_nan(&self, ty: &FloatingPointType) -> ApiResult<Self::Term>;
    fn make_plus_infinity(&self, ty: &FloatingPointType) -> ApiResult<Self::Term>;
    fn make_minus_infinity(&self, ty: &FloatingPointType) -> ApiResult<Self::Term>;
    fn make_rounding_mode(&self, rm: FloatingPointRoundingMode) -> ApiResult<Self::Term>;

    fn negate(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn abs(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn add(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn subtract(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn multiply(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn divide(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn sqrt(&self, operand: &Self::Term, rm: FloatingPointRoundingMode) -> ApiResult<Self::Term>;
    /// Round to an integral value, staying in the same format.
    fn round(&self, operand: &Self::Term, rm: FloatingPointRoundingMode)
    -> ApiResult<Self::Term>;

    fn is_nan(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn is_infinity(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn is_zero(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn is_normal(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn is_subnormal(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn is_negative(&self, operand: &Self::Term) -> ApiResult<Self::Term>;

    /// IEEE equality: `NaN != NaN`, `-0 == +0`.
    fn equal_with_fp_semantics(&self, lhs: &Self::Term, rhs: &Self::Term)
    -> ApiResult<Self::Term>;
    /// Structural identity: `NaN == NaN`, `-0 != +0`.
    fn assignment(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn greater_than(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn greater_or_equals(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn less_than(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn less_or_equals(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;

    fn cast_to_floating_point(
        &self,
        operand: &Self::Term,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn cast_to_bitvector(
        &self,
        operand: &Self::Term,
        width: u32,
        signed: bool,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn cast_to_rational(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn cast_from_bitvector(
        &self,
        operand: &Self::Term,
        signed: bool,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    /// `source` is `Integer` or `Rational`.
    fn cast_from_rational(
        &self,
        operand: &Self::Term,
        source: &FormulaType,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Self::Term>;
    fn to_ieee_bitvector(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn from_ieee_bitvector(
        &self,
        operand: &Self::Term,
        target: &FloatingPointType,
    ) -> ApiResult<Self::Term>;
}

/// Typed floating-point operations.
///
/// Operations without an explicit rounding mode round to nearest, ties to
/// even. Mixing precisions in a binary operation panics.
pub struct FloatingPointFormulaManager<B: Backend, P> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
}

type Fp<B> = FloatingPointFormula<<B as Backend>::Term>;
type Bool<B> = BooleanFormula<<B as Backend>::Term>;

impl<B, P> FloatingPointFormulaManager<B, P>
where
    B: Backend,
    P: FloatingPointPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
        }
    }

    /// Precision of a floating-point formula.
    pub fn precision(&self, formula: &Fp<B>) -> FloatingPointType {
        match formula.formula_type() {
            FormulaType::FloatingPoint(ty) => *ty,
            other => unreachable!("floating-point formula recorded with sort {other}"),
        }
    }

    fn same_precision(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> FloatingPointType {
        let (left, right) = (self.precision(lhs), self.precision(rhs));
        assert_eq!(
            left,
            right,
            "floating-point precision mismatch: {} vs {}",
            FormulaType::FloatingPoint(left),
            FormulaType::FloatingPoint(right)
        );
        left
    }

    fn wrap(&self, term: B::Term, ty: FloatingPointType) -> Fp<B> {
        self.creator.encapsulate_floating_point(term, ty)
    }

    fn unary(
        &self,
        operand: &Fp<B>,
        op: impl FnOnce(&P, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<Fp<B>> {
        let ty = self.precision(operand);
        let term = op(&self.primitives, self.creator.extract_info(operand))?;
        Ok(self.wrap(term, ty))
    }

    fn binary(
        &self,
        lhs: &Fp<B>,
        rhs: &Fp<B>,
        op: impl FnOnce(&P, &B::Term, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<Fp<B>> {
        let ty = self.same_precision(lhs, rhs);
        let term = op(
            &self.primitives,
            self.creator.extract_info(lhs),
            self.creator.extract_info(rhs),
        )?;
        Ok(self.wrap(term, ty))
    }

    fn predicate(
        &self,
        operand: &Fp<B>,
        op: impl FnOnce(&P, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<Bool<B>> {
        let term = op(&self.primitives, self.creator.extract_info(operand))?;
        Ok(self.creator.encapsulate_boolean(term))
    }

    fn comparison(
        &self,
        lhs: &Fp<B>,
        rhs: &Fp<B>,
        op: impl FnOnce(&P, &B::Term, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<Bool<B>> {
        self.same_precision(lhs, rhs);
        let term = op(
            &self.primitives,
            self.creator.extract_info(lhs),
            self.creator.extract_info(rhs),
        )?;
        Ok(self.creator.encapsulate_boolean(term))
    }

    // === Literals ===

    /// Literal from a host double, rounded to nearest-even into `ty`.
    ///
    /// NaN, infinities and signed zeros map to the special values of `ty`.
    pub fn make_number(&self, value: f64, ty: FloatingPointType) -> ApiResult<Fp<B>> {
        if value.is_nan() {
            return self.make_nan(ty);
        }
        if value.is_infinite() {
            return if value > 0.0 {
                self.make_plus_infinity(ty)
            } else {
                self.make_minus_infinity(ty)
            };
        }
        if value == 0.0 {
            return self.make_zero(value.is_sign_negative(), ty);
        }
        let exact = BigRational::from_float(value)
            .ok_or_else(|| ApiError::InvalidNumber(value.to_string()))?;
        self.make_number_from_rational(&exact, ty, FloatingPointRoundingMode::default())
    }

    /// Literal from decimal text such as `"-0.000"`, `"1e-3"`, `"Infinity"` or
    /// `"NaN"`. A leading `-` is kept on zeros.
    pub fn make_number_from_str(
        &self,
        text: &str,
        ty: FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        match text {
            "NaN" | "+NaN" | "-NaN" => return self.make_nan(ty),
            "Infinity" | "+Infinity" | "inf" | "+inf" => return self.make_plus_infinity(ty),
            "-Infinity" | "-inf" => return self.make_minus_infinity(ty),
            _ => {}
        }
        let (negative, value) =
            parse_decimal(text).ok_or_else(|| ApiError::InvalidNumber(text.to_string()))?;
        if value.is_zero() {
            self.make_zero(negative, ty)
        } else {
            self.make_number_from_rational(&value, ty, rm)
        }
    }

    /// Literal from an exact rational, rounded with `rm`. Zero is `+0`.
    pub fn make_number_from_rational(
        &self,
        value: &BigRational,
        ty: FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        if value.is_zero() {
            return self.make_zero(false, ty);
        }
        let term = self.primitives.make_number(value, &ty, rm)?;
        Ok(self.wrap(term, ty))
    }

    pub fn make_zero(&self, negative: bool, ty: FloatingPointType) -> ApiResult<Fp<B>> {
        let term = self.primitives.make_zero(negative, &ty)?;
        Ok(self.wrap(term, ty))
    }

    pub fn make_nan(&self, ty: FloatingPointType) -> ApiResult<Fp<B>> {
        let term = self.primitives.make_nan(&ty)?;
        Ok(self.wrap(term, ty))
    }

    pub fn make_plus_infinity(&self, ty: FloatingPointType) -> ApiResult<Fp<B>> {
        let term = self.primitives.make_plus_infinity(&ty)?;
        Ok(self.wrap(term, ty))
    }

    pub fn make_minus_infinity(&self, ty: FloatingPointType) -> ApiResult<Fp<B>> {
        let term = self.primitives.make_minus_infinity(&ty)?;
        Ok(self.wrap(term, ty))
    }

    pub fn make_rounding_mode(
        &self,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<RoundingModeFormula<B::Term>> {
        let term = self.primitives.make_rounding_mode(rm)?;
        Ok(self.creator.encapsulate_rounding_mode(term))
    }

    pub fn make_variable(&self, name: &str, ty: FloatingPointType) -> ApiResult<Fp<B>> {
        self.creator
            .make_variable(FormulaType::FloatingPoint(ty), name)
    }

    // === Arithmetic ===

    pub fn negate(&self, operand: &Fp<B>) -> ApiResult<Fp<B>> {
        self.unary(operand, P::negate)
    }

    pub fn abs(&self, operand: &Fp<B>) -> ApiResult<Fp<B>> {
        self.unary(operand, P::abs)
    }

    pub fn add(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Fp<B>> {
        self.add_with_rounding(lhs, rhs, FloatingPointRoundingMode::default())
    }

    pub fn add_with_rounding(
        &self,
        lhs: &Fp<B>,
        rhs: &Fp<B>,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        self.binary(lhs, rhs, |p, l, r| p.add(l, r, rm))
    }

    pub fn subtract(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Fp<B>> {
        self.subtract_with_rounding(lhs, rhs, FloatingPointRoundingMode::default())
    }

    pub fn subtract_with_rounding(
        &self,
        lhs: &Fp<B>,
        rhs: &Fp<B>,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        self.binary(lhs, rhs, |p, l, r| p.subtract(l, r, rm))
    }

    pub fn multiply(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Fp<B>> {
        self.multiply_with_rounding(lhs, rhs, FloatingPointRoundingMode::default())
    }

    pub fn multiply_with_rounding(
        &self,
        lhs: &Fp<B>,
        rhs: &Fp<B>,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        self.binary(lhs, rhs, |p, l, r| p.multiply(l, r, rm))
    }

    pub fn divide(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Fp<B>> {
        self.divide_with_rounding(lhs, rhs, FloatingPointRoundingMode::default())
    }

    pub fn divide_with_rounding(
        &self,
        lhs: &Fp<B>,
        rhs: &Fp<B>,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        self.binary(lhs, rhs, |p, l, r| p.divide(l, r, rm))
    }

    pub fn sqrt(&self, operand: &Fp<B>, rm: FloatingPointRoundingMode) -> ApiResult<Fp<B>> {
        self.unary(operand, |p, o| p.sqrt(o, rm))
    }

    /// Round to an integral floating-point value.
    pub fn round(&self, operand: &Fp<B>, rm: FloatingPointRoundingMode) -> ApiResult<Fp<B>> {
        self.unary(operand, |p, o| p.round(o, rm))
    }

    // === Classification ===

    pub fn is_nan(&self, operand: &Fp<B>) -> ApiResult<Bool<B>> {
        self.predicate(operand, P::is_nan)
    }

    pub fn is_infinity(&self, operand: &Fp<B>) -> ApiResult<Bool<B>> {
        self.predicate(operand, P::is_infinity)
    }

    pub fn is_zero(&self, operand: &Fp<B>) -> ApiResult<Bool<B>> {
        self.predicate(operand, P::is_zero)
    }

    pub fn is_normal(&self, operand: &Fp<B>) -> ApiResult<Bool<B>> {
        self.predicate(operand, P::is_normal)
    }

    pub fn is_subnormal(&self, operand: &Fp<B>) -> ApiResult<Bool<B>> {
        self.predicate(operand, P::is_subnormal)
    }

    /// Sign bit set and not NaN; true for `-0`.
    pub fn is_negative(&self, operand: &Fp<B>) -> ApiResult<Bool<B>> {
        self.predicate(operand, P::is_negative)
    }

    // === Comparison ===

    pub fn equal_with_fp_semantics(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Bool<B>> {
        self.comparison(lhs, rhs, P::equal_with_fp_semantics)
    }

    pub fn assignment(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Bool<B>> {
        self.comparison(lhs, rhs, P::assignment)
    }

    pub fn greater_than(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Bool<B>> {
        self.comparison(lhs, rhs, P::greater_than)
    }

    pub fn greater_or_equals(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Bool<B>> {
        self.comparison(lhs, rhs, P::greater_or_equals)
    }

    pub fn less_than(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Bool<B>> {
        self.comparison(lhs, rhs, P::less_than)
    }

    pub fn less_or_equals(&self, lhs: &Fp<B>, rhs: &Fp<B>) -> ApiResult<Bool<B>> {
        self.comparison(lhs, rhs, P::less_or_equals)
    }

    // === Conversion ===

    pub fn cast_to_floating_point(
        &self,
        operand: &Fp<B>,
        target: FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        let term =
            self.primitives
                .cast_to_floating_point(self.creator.extract_info(operand), &target, rm)?;
        Ok(self.wrap(term, target))
    }

    /// Round to an integer and read it as a `width`-bit bitvector.
    pub fn cast_to_bitvector(
        &self,
        operand: &Fp<B>,
        width: u32,
        signed: bool,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<BitvectorFormula<B::Term>> {
        assert!(width > 0, "bitvector width must be positive");
        let term = self.primitives.cast_to_bitvector(
            self.creator.extract_info(operand),
            width,
            signed,
            rm,
        )?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    pub fn cast_to_rational(&self, operand: &Fp<B>) -> ApiResult<RationalFormula<B::Term>> {
        let term = self
            .primitives
            .cast_to_rational(self.creator.extract_info(operand))?;
        Ok(self.creator.encapsulate_rational(term))
    }

    pub fn cast_from_bitvector(
        &self,
        operand: &BitvectorFormula<B::Term>,
        signed: bool,
        target: FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        let term = self.primitives.cast_from_bitvector(
            self.creator.extract_info(operand),
            signed,
            &target,
            rm,
        )?;
        Ok(self.wrap(term, target))
    }

    /// Round an integer or rational formula into `target`.
    pub fn cast_from_rational<S: NumeralSort>(
        &self,
        operand: &Formula<S, B::Term>,
        target: FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Fp<B>> {
        let term = self.primitives.cast_from_rational(
            self.creator.extract_info(operand),
            &S::formula_type(),
            &target,
            rm,
        )?;
        Ok(self.wrap(term, target))
    }

    /// Raw IEEE-754 bits, `total_size()` wide.
    pub fn to_ieee_bitvector(&self, operand: &Fp<B>) -> ApiResult<BitvectorFormula<B::Term>> {
        let width = self.precision(operand).total_size();
        let term = self
            .primitives
            .to_ieee_bitvector(self.creator.extract_info(operand))?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    /// Reinterpret raw IEEE-754 bits.
    ///
    /// # Panics
    ///
    /// Panics unless the bitvector is exactly `target.total_size()` wide.
    pub fn from_ieee_bitvector(
        &self,
        operand: &BitvectorFormula<B::Term>,
        target: FloatingPointType,
    ) -> ApiResult<Fp<B>> {
        let width = operand
            .formula_type()
            .as_bitvector()
            .map(|bv| bv.size())
            .unwrap_or_default();
        assert_eq!(
            width,
            target.total_size(),
            "bitvector of width {width} cannot hold {}",
            FormulaType::FloatingPoint(target)
        );
        let term = self
            .primitives
            .from_ieee_bitvector(self.creator.extract_info(operand), &target)?;
        Ok(self.wrap(term, target))
    }
}
