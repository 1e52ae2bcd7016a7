use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{One, Signed};

use crate::creator::{Backend, FormulaCreator};
use crate::error::ApiResult;
use crate::formula::{BitvectorFormula, BooleanFormula};
use crate::formula_type::FormulaType;

/// Native bitvector operations. Widths are already checked by the manager.
pub trait BitvectorPrimitives {
    type Term;

    /// `value` is already reduced to `0 <= value < 2^width`.
    fn make_bitvector(&self, width: u32, value: &BigInt) -> ApiResult<Self::Term>;
    fn negate(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn add(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn subtract(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn multiply(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn divide(&self, lhs: &Self::Term, rhs: &Self::Term, signed: bool) -> ApiResult<Self::Term>;
    fn modulo(&self, lhs: &Self::Term, rhs: &Self::Term, signed: bool) -> ApiResult<Self::Term>;
    fn not(&self, operand: &Self::Term) -> ApiResult<Self::Term>;
    fn and(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn or(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn xor(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn shift_left(&self, operand: &Self::Term, amount: &Self::Term) -> ApiResult<Self::Term>;
    fn shift_right(
        &self,
        operand: &Self::Term,
        amount: &Self::Term,
        signed: bool,
    ) -> ApiResult<Self::Term>;
    fn concat(&self, high: &Self::Term, low: &Self::Term) -> ApiResult<Self::Term>;
    fn extract(&self, operand: &Self::Term, msb: u32, lsb: u32) -> ApiResult<Self::Term>;
    fn extend(&self, operand: &Self::Term, extension: u32, signed: bool) -> ApiResult<Self::Term>;
    fn equal(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn less_than(&self, lhs: &Self::Term, rhs: &Self::Term, signed: bool)
    -> ApiResult<Self::Term>;
    fn less_or_equals(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        signed: bool,
    ) -> ApiResult<Self::Term>;
    fn greater_than(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        signed: bool,
    ) -> ApiResult<Self::Term>;
    fn greater_or_equals(
        &self,
        lhs: &Self::Term,
        rhs: &Self::Term,
        signed: bool,
    ) -> ApiResult<Self::Term>;
}

/// Typed bitvector operations.
///
/// Mixing widths in a binary operation is a programming error and panics.
pub struct BitvectorFormulaManager<B: Backend, P> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
}

type Bv<B> = BitvectorFormula<<B as Backend>::Term>;

impl<B, P> BitvectorFormulaManager<B, P>
where
    B: Backend,
    P: BitvectorPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
        }
    }

    /// Width of a bitvector formula.
    pub fn length(&self, formula: &Bv<B>) -> u32 {
        match formula.formula_type() {
            FormulaType::Bitvector(ty) => ty.size(),
            other => unreachable!("bitvector formula recorded with sort {other}"),
        }
    }

    fn same_width(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> u32 {
        let (left, right) = (self.length(lhs), self.length(rhs));
        assert_eq!(left, right, "bitvector width mismatch: {left} vs {right}");
        left
    }

    fn binary(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        op: impl FnOnce(&P, &B::Term, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<(B::Term, u32)> {
        let width = self.same_width(lhs, rhs);
        let lhs = self.creator.extract_info(lhs);
        let rhs = self.creator.extract_info(rhs);
        Ok((op(&self.primitives, lhs, rhs)?, width))
    }

    fn arithmetic(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        op: impl FnOnce(&P, &B::Term, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<Bv<B>> {
        let (term, width) = self.binary(lhs, rhs, op)?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    fn predicate(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        op: impl FnOnce(&P, &B::Term, &B::Term) -> ApiResult<B::Term>,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        let (term, _) = self.binary(lhs, rhs, op)?;
        Ok(self.creator.encapsulate_boolean(term))
    }

    /// Bitvector literal.
    ///
    /// Negative values are encoded in two's complement.
    ///
    /// # Panics
    ///
    /// Panics if `width` is zero or `value` lies outside
    /// `-2^(width-1) .. 2^width`.
    pub fn make_bitvector(&self, width: u32, value: &BigInt) -> ApiResult<Bv<B>> {
        assert!(width > 0, "bitvector width must be positive");
        let modulus = BigInt::one() << width;
        let lower = -(BigInt::one() << (width - 1));
        assert!(
            value >= &lower && value < &modulus,
            "value {value} does not fit in {width} bits"
        );
        let unsigned = if value.is_negative() {
            value + &modulus
        } else {
            value.clone()
        };
        debug_assert!(!unsigned.is_negative() && unsigned < modulus);
        let term = self.primitives.make_bitvector(width, &unsigned)?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    pub fn make_bitvector_i64(&self, width: u32, value: i64) -> ApiResult<Bv<B>> {
        self.make_bitvector(width, &BigInt::from(value))
    }

    pub fn make_variable(&self, width: u32, name: &str) -> ApiResult<Bv<B>> {
        self.creator.make_variable(FormulaType::bitvector(width), name)
    }

    pub fn negate(&self, operand: &Bv<B>) -> ApiResult<Bv<B>> {
        let width = self.length(operand);
        let term = self.primitives.negate(self.creator.extract_info(operand))?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    pub fn add(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, P::add)
    }

    pub fn subtract(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, P::subtract)
    }

    pub fn multiply(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, P::multiply)
    }

    pub fn divide(&self, lhs: &Bv<B>, rhs: &Bv<B>, signed: bool) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, |p, l, r| p.divide(l, r, signed))
    }

    /// Remainder with the sign of the dividend (`bvsrem`/`bvurem`).
    pub fn modulo(&self, lhs: &Bv<B>, rhs: &Bv<B>, signed: bool) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, |p, l, r| p.modulo(l, r, signed))
    }

    pub fn not(&self, operand: &Bv<B>) -> ApiResult<Bv<B>> {
        let width = self.length(operand);
        let term = self.primitives.not(self.creator.extract_info(operand))?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    pub fn and(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, P::and)
    }

    pub fn or(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, P::or)
    }

    pub fn xor(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(lhs, rhs, P::xor)
    }

    pub fn shift_left(&self, operand: &Bv<B>, amount: &Bv<B>) -> ApiResult<Bv<B>> {
        self.arithmetic(operand, amount, P::shift_left)
    }

    /// Arithmetic shift when `signed`, logical shift otherwise.
    pub fn shift_right(&self, operand: &Bv<B>, amount: &Bv<B>, signed: bool) -> ApiResult<Bv<B>> {
        self.arithmetic(operand, amount, |p, o, a| p.shift_right(o, a, signed))
    }

    /// `high ++ low`; the result is as wide as both together.
    pub fn concat(&self, high: &Bv<B>, low: &Bv<B>) -> ApiResult<Bv<B>> {
        let width = self.length(high) + self.length(low);
        let high = self.creator.extract_info(high);
        let low = self.creator.extract_info(low);
        let term = self.primitives.concat(high, low)?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    /// Bits `msb` down to `lsb`, both inclusive.
    ///
    /// # Panics
    ///
    /// Panics unless `lsb <= msb < length(operand)`.
    pub fn extract(&self, operand: &Bv<B>, msb: u32, lsb: u32) -> ApiResult<Bv<B>> {
        let width = self.length(operand);
        assert!(
            lsb <= msb && msb < width,
            "cannot extract bits {msb}..{lsb} from a bitvector of width {width}"
        );
        let term = self
            .primitives
            .extract(self.creator.extract_info(operand), msb, lsb)?;
        Ok(self.creator.encapsulate_bitvector(term, msb - lsb + 1))
    }

    /// Widen by `extension` bits, sign-extending when `signed`.
    pub fn extend(&self, operand: &Bv<B>, extension: u32, signed: bool) -> ApiResult<Bv<B>> {
        let width = self.length(operand) + extension;
        let term = self
            .primitives
            .extend(self.creator.extract_info(operand), extension, signed)?;
        Ok(self.creator.encapsulate_bitvector(term, width))
    }

    pub fn equal(&self, lhs: &Bv<B>, rhs: &Bv<B>) -> ApiResult<BooleanFormula<B::Term>> {
        self.predicate(lhs, rhs, P::equal)
    }

    pub fn less_than(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        signed: bool,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        self.predicate(lhs, rhs, |p, l, r| p.less_than(l, r, signed))
    }

    pub fn less_or_equals(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        signed: bool,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        self.predicate(lhs, rhs, |p, l, r| p.less_or_equals(l, r, signed))
    }

    pub fn greater_than(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        signed: bool,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        self.predicate(lhs, rhs, |p, l, r| p.greater_than(l, r, signed))
    }

    pub fn greater_or_equals(
        &self,
        lhs: &Bv<B>,
        rhs: &Bv<B>,
        signed: bool,
    ) -> ApiResult<BooleanFormula<B::Term>> {
        self.predicate(lhs, rhs, |p, l, r| p.greater_or_equals(l, r, signed))
    }
}

/// Two's-complement reading of an unsigned bitvector value.
pub fn to_signed(value: &BigInt, width: u32) -> BigInt {
    if width > 0 && value.bit(u64::from(width - 1)) {
        value - (BigInt::one() << width)
    } else {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TextBackend, TextTheory};

    fn manager() -> BitvectorFormulaManager<TextBackend, TextTheory> {
        let creator = Rc::new(FormulaCreator::new(TextBackend::default()));
        BitvectorFormulaManager::new(creator, TextTheory)
    }

    #[test]
    fn literals_use_twos_complement() {
        let bvmgr = manager();
        assert_eq!(bvmgr.make_bitvector_i64(8, 5).unwrap().to_string(), "#b00000101");
        assert_eq!(bvmgr.make_bitvector_i64(8, -1).unwrap().to_string(), "#b11111111");
        assert_eq!(bvmgr.make_bitvector_i64(4, -8).unwrap().to_string(), "#b1000");
        assert_eq!(bvmgr.make_bitvector_i64(4, 15).unwrap().to_string(), "#b1111");
    }

    #[test]
    #[should_panic(expected = "does not fit in 4 bits")]
    fn literal_out_of_range_panics() {
        let _ = manager().make_bitvector_i64(4, 16);
    }

    #[test]
    fn widths_propagate() {
        let bvmgr = manager();
        let x = bvmgr.make_variable(8, "x").unwrap();
        let y = bvmgr.make_variable(8, "y").unwrap();
        assert_eq!(bvmgr.length(&bvmgr.add(&x, &y).unwrap()), 8);
        assert_eq!(bvmgr.length(&bvmgr.concat(&x, &y).unwrap()), 16);
        assert_eq!(bvmgr.length(&bvmgr.extract(&x, 3, 0).unwrap()), 4);
        assert_eq!(bvmgr.length(&bvmgr.extend(&x, 24, true).unwrap()), 32);
        let cmp = bvmgr.less_than(&x, &y, true).unwrap();
        assert_eq!(cmp.formula_type(), &FormulaType::Boolean);
        assert_eq!(cmp.to_string(), "(bvslt x y)");
        assert_eq!(
            bvmgr.shift_right(&x, &y, false).unwrap().to_string(),
            "(bvlshr x y)"
        );
    }

    #[test]
    #[should_panic(expected = "bitvector width mismatch: 8 vs 16")]
    fn width_mismatch_panics() {
        let bvmgr = manager();
        let x = bvmgr.make_variable(8, "x").unwrap();
        let y = bvmgr.make_variable(16, "y").unwrap();
        let _ = bvmgr.add(&x, &y);
    }

    #[test]
    #[should_panic(expected = "cannot extract bits 8..0")]
    fn extract_out_of_range_panics() {
        let bvmgr = manager();
        let x = bvmgr.make_variable(8, "x").unwrap();
        let _ = bvmgr.extract(&x, 8, 0);
    }

    #[test]
    fn signed_reading() {
        assert_eq!(to_signed(&BigInt::from(255), 8), BigInt::from(-1));
        assert_eq!(to_signed(&BigInt::from(127), 8), BigInt::from(127));
        assert_eq!(to_signed(&BigInt::from(8), 4), BigInt::from(-8));
    }
}
