//! SMT-LIB term construction for the non-string theories.
//!
//! Each struct implements one primitive trait of `smtwrap-api`. Operations
//! map one-to-one onto SMT-LIB operators; only literals need any work.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use smtwrap_api::manager::{
    ArrayPrimitives, BitvectorPrimitives, BooleanPrimitives, FloatingPointPrimitives,
    NumeralPrimitives,
};
use smtwrap_api::{ApiError, ApiResult, FloatingPointRoundingMode, FloatingPointType, FormulaType};
use smtwrap_smtlib::{FloatFormat, FloatValue, Term, Val};

use crate::adapter::native_rounding_mode;

fn b(term: &Term) -> Box<Term> {
    Box::new(term.clone())
}

fn cloned(terms: &[&Term]) -> Vec<Term> {
    terms.iter().map(|t| (*t).clone()).collect()
}

// ---------------------------------------------------------------------------
// Booleans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SmtlibBooleans;

impl BooleanPrimitives for SmtlibBooleans {
    type Term = Term;

    fn make_boolean(&self, value: bool) -> ApiResult<Term> {
        Ok(Term::BoolLit(value))
    }

    fn not(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::Not(b(operand)))
    }

    fn and(&self, operands: &[&Term]) -> ApiResult<Term> {
        Ok(match operands {
            [] => Term::BoolLit(true),
            [single] => (*single).clone(),
            _ => Term::And(cloned(operands)),
        })
    }

    fn or(&self, operands: &[&Term]) -> ApiResult<Term> {
        Ok(match operands {
            [] => Term::BoolLit(false),
            [single] => (*single).clone(),
            _ => Term::Or(cloned(operands)),
        })
    }

    fn xor(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Xor(b(lhs), b(rhs)))
    }

    fn implication(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Implies(b(lhs), b(rhs)))
    }

    fn equivalence(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Iff(b(lhs), b(rhs)))
    }

    fn if_then_else(&self, condition: &Term, then_branch: &Term, else_branch: &Term) -> ApiResult<Term> {
        Ok(Term::Ite(b(condition), b(then_branch), b(else_branch)))
    }

    fn is_true(&self, term: &Term) -> bool {
        matches!(term, Term::BoolLit(true))
    }

    fn is_false(&self, term: &Term) -> bool {
        matches!(term, Term::BoolLit(false))
    }
}

// ---------------------------------------------------------------------------
// Integers and reals
// ---------------------------------------------------------------------------

/// Arithmetic over `Int` (`integral`) or `Real`.
#[derive(Debug, Clone, Copy)]
pub struct SmtlibNumerals {
    integral: bool,
}

impl SmtlibNumerals {
    pub fn integers() -> Self {
        Self { integral: true }
    }

    pub fn rationals() -> Self {
        Self { integral: false }
    }

    fn zero(&self) -> Term {
        if self.integral {
            Term::int(0)
        } else {
            Term::RealLit(BigRational::zero())
        }
    }
}

impl NumeralPrimitives for SmtlibNumerals {
    type Term = Term;

    fn make_number(&self, value: &BigRational) -> ApiResult<Term> {
        if self.integral {
            if !value.is_integer() {
                return Err(ApiError::InvalidNumber(value.to_string()));
            }
            Ok(Term::IntLit(value.to_integer()))
        } else {
            Ok(Term::RealLit(value.clone()))
        }
    }

    fn negate(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::Neg(b(operand)))
    }

    fn add(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Add(vec![lhs.clone(), rhs.clone()]))
    }

    fn sum(&self, operands: &[&Term]) -> ApiResult<Term> {
        Ok(match operands {
            [] => self.zero(),
            [single] => (*single).clone(),
            _ => Term::Add(cloned(operands)),
        })
    }

    fn subtract(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Sub(b(lhs), b(rhs)))
    }

    fn multiply(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Mul(b(lhs), b(rhs)))
    }

    fn divide(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(if self.integral {
            Term::IntDiv(b(lhs), b(rhs))
        } else {
            Term::RealDiv(b(lhs), b(rhs))
        })
    }

    fn modulo(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        if self.integral {
            Ok(Term::IntMod(b(lhs), b(rhs)))
        } else {
            Err(ApiError::unsupported("modulo", "smtlib"))
        }
    }

    fn equal(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }

    fn distinct(&self, operands: &[&Term]) -> ApiResult<Term> {
        // `distinct` needs two arguments; fewer are trivially distinct
        Ok(if operands.len() < 2 {
            Term::BoolLit(true)
        } else {
            Term::Distinct(cloned(operands))
        })
    }

    fn greater_than(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Gt(b(lhs), b(rhs)))
    }

    fn greater_or_equals(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Ge(b(lhs), b(rhs)))
    }

    fn less_than(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Lt(b(lhs), b(rhs)))
    }

    fn less_or_equals(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Le(b(lhs), b(rhs)))
    }
}

// ---------------------------------------------------------------------------
// Bitvectors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SmtlibBitvectors;

impl BitvectorPrimitives for SmtlibBitvectors {
    type Term = Term;

    fn make_bitvector(&self, width: u32, value: &BigInt) -> ApiResult<Term> {
        Ok(Term::BitVecLit(value.clone(), width))
    }

    fn negate(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::BvNeg(b(operand)))
    }

    fn add(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::BvAdd(b(lhs), b(rhs)))
    }

    fn subtract(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::BvSub(b(lhs), b(rhs)))
    }

    fn multiply(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::BvMul(b(lhs), b(rhs)))
    }

    fn divide(&self, lhs: &Term, rhs: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvSDiv(b(lhs), b(rhs))
        } else {
            Term::BvUDiv(b(lhs), b(rhs))
        })
    }

    /// Remainder with the sign of the dividend (`bvsrem`), not `bvsmod`.
    fn modulo(&self, lhs: &Term, rhs: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvSRem(b(lhs), b(rhs))
        } else {
            Term::BvURem(b(lhs), b(rhs))
        })
    }

    fn not(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::BvNot(b(operand)))
    }

    fn and(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::BvAnd(b(lhs), b(rhs)))
    }

    fn or(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::BvOr(b(lhs), b(rhs)))
    }

    fn xor(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::BvXor(b(lhs), b(rhs)))
    }

    fn shift_left(&self, operand: &Term, amount: &Term) -> ApiResult<Term> {
        Ok(Term::BvShl(b(operand), b(amount)))
    }

    fn shift_right(&self, operand: &Term, amount: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvAShr(b(operand), b(amount))
        } else {
            Term::BvLShr(b(operand), b(amount))
        })
    }

    fn concat(&self, high: &Term, low: &Term) -> ApiResult<Term> {
        Ok(Term::Concat(b(high), b(low)))
    }

    fn extract(&self, operand: &Term, msb: u32, lsb: u32) -> ApiResult<Term> {
        Ok(Term::Extract(msb, lsb, b(operand)))
    }

    fn extend(&self, operand: &Term, extension: u32, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::SignExtend(extension, b(operand))
        } else {
            Term::ZeroExtend(extension, b(operand))
        })
    }

    fn equal(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }

    fn less_than(&self, lhs: &Term, rhs: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvSLt(b(lhs), b(rhs))
        } else {
            Term::BvULt(b(lhs), b(rhs))
        })
    }

    fn less_or_equals(&self, lhs: &Term, rhs: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvSLe(b(lhs), b(rhs))
        } else {
            Term::BvULe(b(lhs), b(rhs))
        })
    }

    fn greater_than(&self, lhs: &Term, rhs: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvSGt(b(lhs), b(rhs))
        } else {
            Term::BvUGt(b(lhs), b(rhs))
        })
    }

    fn greater_or_equals(&self, lhs: &Term, rhs: &Term, signed: bool) -> ApiResult<Term> {
        Ok(if signed {
            Term::BvSGe(b(lhs), b(rhs))
        } else {
            Term::BvUGe(b(lhs), b(rhs))
        })
    }
}

// ---------------------------------------------------------------------------
// Floating point
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SmtlibFloatingPoints;

/// `(eb, sb)` with the hidden bit counted in `sb`.
fn widths(ty: &FloatingPointType) -> (u32, u32) {
    (ty.exponent_size(), ty.mantissa_size() + 1)
}

fn rounding(rm: FloatingPointRoundingMode) -> Box<Term> {
    Box::new(Term::RoundingMode(native_rounding_mode(rm)))
}

impl FloatingPointPrimitives for SmtlibFloatingPoints {
    type Term = Term;

    fn make_number(
        &self,
        value: &BigRational,
        ty: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Term> {
        let (e, s) = widths(ty);
        let rm = native_rounding_mode(rm);
        match FloatFormat::new(e, s) {
            Some(format) => {
                let rounded = FloatValue::from_rational(value, format, rm);
                Ok(Val::Float(rounded, format).to_term())
            }
            // outside the exact evaluator's range, leave the rounding to the solver
            None => Ok(Term::ToFp(
                e,
                s,
                Box::new(Term::RoundingMode(rm)),
                Box::new(Term::RealLit(value.clone())),
            )),
        }
    }

    fn make_zero(&self, negative: bool, ty: &FloatingPointType) -> ApiResult<Term> {
        let (e, s) = widths(ty);
        Ok(if negative {
            Term::FpNegZero(e, s)
        } else {
            Term::FpPosZero(e, s)
        })
    }

    fn make_nan(&self, ty: &FloatingPointType) -> ApiResult<Term> {
        let (e, s) = widths(ty);
        Ok(Term::FpNaN(e, s))
    }

    fn make_plus_infinity(&self, ty: &FloatingPointType) -> ApiResult<Term> {
        let (e, s) = widths(ty);
        Ok(Term::FpPosInf(e, s))
    }

    fn make_minus_infinity(&self, ty: &FloatingPointType) -> ApiResult<Term> {
        let (e, s) = widths(ty);
        Ok(Term::FpNegInf(e, s))
    }

    fn make_rounding_mode(&self, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::RoundingMode(native_rounding_mode(rm)))
    }

    fn negate(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpNeg(b(operand)))
    }

    fn abs(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpAbs(b(operand)))
    }

    fn add(&self, lhs: &Term, rhs: &Term, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::FpAdd(rounding(rm), b(lhs), b(rhs)))
    }

    fn subtract(&self, lhs: &Term, rhs: &Term, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::FpSub(rounding(rm), b(lhs), b(rhs)))
    }

    fn multiply(&self, lhs: &Term, rhs: &Term, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::FpMul(rounding(rm), b(lhs), b(rhs)))
    }

    fn divide(&self, lhs: &Term, rhs: &Term, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::FpDiv(rounding(rm), b(lhs), b(rhs)))
    }

    fn sqrt(&self, operand: &Term, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::FpSqrt(rounding(rm), b(operand)))
    }

    fn round(&self, operand: &Term, rm: FloatingPointRoundingMode) -> ApiResult<Term> {
        Ok(Term::FpRoundToIntegral(rounding(rm), b(operand)))
    }

    fn is_nan(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpIsNaN(b(operand)))
    }

    fn is_infinity(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpIsInfinite(b(operand)))
    }

    fn is_zero(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpIsZero(b(operand)))
    }

    fn is_normal(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpIsNormal(b(operand)))
    }

    fn is_subnormal(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpIsSubnormal(b(operand)))
    }

    fn is_negative(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpIsNegative(b(operand)))
    }

    fn equal_with_fp_semantics(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::FpEq(b(lhs), b(rhs)))
    }

    fn assignment(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }

    fn greater_than(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::FpGt(b(lhs), b(rhs)))
    }

    fn greater_or_equals(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::FpGeq(b(lhs), b(rhs)))
    }

    fn less_than(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::FpLt(b(lhs), b(rhs)))
    }

    fn less_or_equals(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::FpLeq(b(lhs), b(rhs)))
    }

    fn cast_to_floating_point(
        &self,
        operand: &Term,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Term> {
        let (e, s) = widths(target);
        Ok(Term::ToFp(e, s, rounding(rm), b(operand)))
    }

    fn cast_to_bitvector(
        &self,
        operand: &Term,
        width: u32,
        signed: bool,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Term> {
        Ok(if signed {
            Term::FpToSbv(width, rounding(rm), b(operand))
        } else {
            Term::FpToUbv(width, rounding(rm), b(operand))
        })
    }

    fn cast_to_rational(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpToReal(b(operand)))
    }

    fn cast_from_bitvector(
        &self,
        operand: &Term,
        signed: bool,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Term> {
        let (e, s) = widths(target);
        Ok(if signed {
            Term::ToFp(e, s, rounding(rm), b(operand))
        } else {
            Term::ToFpUnsigned(e, s, rounding(rm), b(operand))
        })
    }

    fn cast_from_rational(
        &self,
        operand: &Term,
        source: &FormulaType,
        target: &FloatingPointType,
        rm: FloatingPointRoundingMode,
    ) -> ApiResult<Term> {
        let (e, s) = widths(target);
        // `to_fp` takes a Real; integers are converted first
        let operand = if source.is_integer() {
            Term::ToReal(b(operand))
        } else {
            operand.clone()
        };
        Ok(Term::ToFp(e, s, rounding(rm), Box::new(operand)))
    }

    fn to_ieee_bitvector(&self, operand: &Term) -> ApiResult<Term> {
        Ok(Term::FpToIeeeBv(b(operand)))
    }

    fn from_ieee_bitvector(&self, operand: &Term, target: &FloatingPointType) -> ApiResult<Term> {
        let (e, s) = widths(target);
        Ok(Term::FpFromIeeeBv(e, s, b(operand)))
    }
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct SmtlibArrays;

impl ArrayPrimitives for SmtlibArrays {
    type Term = Term;

    fn select(&self, array: &Term, index: &Term) -> ApiResult<Term> {
        Ok(Term::Select(b(array), b(index)))
    }

    fn store(&self, array: &Term, index: &Term, value: &Term) -> ApiResult<Term> {
        Ok(Term::Store(b(array), b(index), b(value)))
    }

    fn equivalence(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }
}
