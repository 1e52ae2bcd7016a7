use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;

use crate::sort::{RoundingMode, Sort};

/// SMT-LIB term (expression) representation.
///
/// Arithmetic operators are shared between `Int` and `Real`; the sort of an
/// application follows from its operands (see [`crate::typing`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    // === Literals ===
    /// Boolean literal
    BoolLit(bool),
    /// Integer literal (unbounded)
    IntLit(BigInt),
    /// Real literal
    RealLit(BigRational),
    /// Bitvector literal: unsigned value and width
    BitVecLit(BigInt, u32),
    /// String literal (unescaped text)
    StringLit(String),

    // === Variables ===
    /// Named constant/variable reference
    Const(String),

    // === Boolean operations ===
    /// Logical NOT
    Not(Box<Term>),
    /// Logical AND (n-ary)
    And(Vec<Term>),
    /// Logical OR (n-ary)
    Or(Vec<Term>),
    /// Exclusive or: `(xor a b)`
    Xor(Box<Term>, Box<Term>),
    /// Logical implication: `(=> a b)`
    Implies(Box<Term>, Box<Term>),
    /// Logical if-and-only-if: `(= a b)` for Bool
    Iff(Box<Term>, Box<Term>),

    // === Core ===
    /// Equality: `(= a b)`
    Eq(Box<Term>, Box<Term>),
    /// Distinct: `(distinct a b ...)`
    Distinct(Vec<Term>),
    /// If-then-else: `(ite cond then else)`
    Ite(Box<Term>, Box<Term>, Box<Term>),

    // === Bitvector arithmetic ===
    /// `(bvadd a b)`
    BvAdd(Box<Term>, Box<Term>),
    /// `(bvsub a b)`
    BvSub(Box<Term>, Box<Term>),
    /// `(bvmul a b)`
    BvMul(Box<Term>, Box<Term>),
    /// `(bvsdiv a b)`: signed division
    BvSDiv(Box<Term>, Box<Term>),
    /// `(bvudiv a b)`: unsigned division
    BvUDiv(Box<Term>, Box<Term>),
    /// `(bvsrem a b)`: signed remainder
    BvSRem(Box<Term>, Box<Term>),
    /// `(bvurem a b)`: unsigned remainder
    BvURem(Box<Term>, Box<Term>),
    /// `(bvneg a)`: two's complement negation
    BvNeg(Box<Term>),

    // === Bitvector comparison (signed) ===
    BvSLt(Box<Term>, Box<Term>),
    BvSLe(Box<Term>, Box<Term>),
    BvSGt(Box<Term>, Box<Term>),
    BvSGe(Box<Term>, Box<Term>),

    // === Bitvector comparison (unsigned) ===
    BvULt(Box<Term>, Box<Term>),
    BvULe(Box<Term>, Box<Term>),
    BvUGt(Box<Term>, Box<Term>),
    BvUGe(Box<Term>, Box<Term>),

    // === Bitvector bitwise ===
    BvAnd(Box<Term>, Box<Term>),
    BvOr(Box<Term>, Box<Term>),
    BvXor(Box<Term>, Box<Term>),
    BvNot(Box<Term>),
    /// `(bvshl a b)`: shift left
    BvShl(Box<Term>, Box<Term>),
    /// `(bvlshr a b)`: logical shift right
    BvLShr(Box<Term>, Box<Term>),
    /// `(bvashr a b)`: arithmetic shift right
    BvAShr(Box<Term>, Box<Term>),

    // === Bitvector conversion ===
    /// `((_ zero_extend n) a)`
    ZeroExtend(u32, Box<Term>),
    /// `((_ sign_extend n) a)`
    SignExtend(u32, Box<Term>),
    /// `((_ extract hi lo) a)`
    Extract(u32, u32, Box<Term>),
    /// `(concat a b)`: bitvector concatenation, also accepted on strings
    Concat(Box<Term>, Box<Term>),
    /// `(bv2int a)`: unsigned value as an integer
    Bv2Int(Box<Term>),
    /// `((_ int2bv n) a)`: integer modulo `2^n`
    Int2Bv(u32, Box<Term>),

    // === Arithmetic (Int and Real) ===
    /// `(+ a b ...)`
    Add(Vec<Term>),
    /// `(- a b)`
    Sub(Box<Term>, Box<Term>),
    /// `(* a b)`
    Mul(Box<Term>, Box<Term>),
    /// `(- a)`
    Neg(Box<Term>),
    /// `(div a b)`: integer division
    IntDiv(Box<Term>, Box<Term>),
    /// `(mod a b)`
    IntMod(Box<Term>, Box<Term>),
    /// `(/ a b)`: real division
    RealDiv(Box<Term>, Box<Term>),
    /// `(to_real a)`
    ToReal(Box<Term>),
    Lt(Box<Term>, Box<Term>),
    Le(Box<Term>, Box<Term>),
    Gt(Box<Term>, Box<Term>),
    Ge(Box<Term>, Box<Term>),

    // === Array operations ===
    /// `(select array index)`
    Select(Box<Term>, Box<Term>),
    /// `(store array index value)`
    Store(Box<Term>, Box<Term>, Box<Term>),
    /// `((as const (Array I E)) value)`; the sort is the array sort
    ConstArray(Sort, Box<Term>),

    // === Quantifiers ===
    /// `(forall ((x Sort) ...) body)`
    Forall(Vec<(String, Sort)>, Box<Term>),
    /// `(exists ((x Sort) ...) body)`
    Exists(Vec<(String, Sort)>, Box<Term>),

    // === Function application ===
    /// `(f arg1 arg2 ...)`
    App(String, Vec<Term>),

    // === Floating-point literals ===
    /// IEEE 754 NaN: `(_ NaN eb sb)`
    FpNaN(u32, u32),
    /// Positive infinity: `(_ +oo eb sb)`
    FpPosInf(u32, u32),
    /// Negative infinity: `(_ -oo eb sb)`
    FpNegInf(u32, u32),
    /// Positive zero: `(_ +zero eb sb)`
    FpPosZero(u32, u32),
    /// Negative zero: `(_ -zero eb sb)`
    FpNegZero(u32, u32),
    /// Bit representation `(fp sign exponent significand)`: sign bit, biased
    /// exponent, trailing significand, then `eb` and `sb`
    FpFromBits(bool, BigUint, BigUint, u32, u32),

    // === Rounding mode ===
    RoundingMode(RoundingMode),

    // === Floating-point arithmetic ===
    /// `(fp.add rm x y)`
    FpAdd(Box<Term>, Box<Term>, Box<Term>),
    /// `(fp.sub rm x y)`
    FpSub(Box<Term>, Box<Term>, Box<Term>),
    /// `(fp.mul rm x y)`
    FpMul(Box<Term>, Box<Term>, Box<Term>),
    /// `(fp.div rm x y)`
    FpDiv(Box<Term>, Box<Term>, Box<Term>),
    /// `(fp.sqrt rm x)`
    FpSqrt(Box<Term>, Box<Term>),
    /// `(fp.roundToIntegral rm x)`
    FpRoundToIntegral(Box<Term>, Box<Term>),
    FpAbs(Box<Term>),
    FpNeg(Box<Term>),

    // === Floating-point comparison ===
    /// `(fp.eq x y)`: IEEE 754 equality
    FpEq(Box<Term>, Box<Term>),
    FpLt(Box<Term>, Box<Term>),
    FpLeq(Box<Term>, Box<Term>),
    FpGt(Box<Term>, Box<Term>),
    FpGeq(Box<Term>, Box<Term>),

    // === Floating-point predicates ===
    FpIsNaN(Box<Term>),
    FpIsInfinite(Box<Term>),
    FpIsZero(Box<Term>),
    FpIsNormal(Box<Term>),
    FpIsSubnormal(Box<Term>),
    FpIsNegative(Box<Term>),
    FpIsPositive(Box<Term>),

    // === Floating-point conversion ===
    /// `((_ to_fp eb sb) rm x)` from a float, a real, or a signed bitvector
    ToFp(u32, u32, Box<Term>, Box<Term>),
    /// `((_ to_fp_unsigned eb sb) rm x)` from an unsigned bitvector
    ToFpUnsigned(u32, u32, Box<Term>, Box<Term>),
    /// `((_ to_fp eb sb) bv)`: reinterpret IEEE bits
    FpFromIeeeBv(u32, u32, Box<Term>),
    /// `((_ fp.to_ubv w) rm x)`
    FpToUbv(u32, Box<Term>, Box<Term>),
    /// `((_ fp.to_sbv w) rm x)`
    FpToSbv(u32, Box<Term>, Box<Term>),
    /// `(fp.to_real x)`
    FpToReal(Box<Term>),
    /// `(fp.to_ieee_bv x)`
    FpToIeeeBv(Box<Term>),

    // === Strings ===
    /// `(str.++ a b ...)`
    StrConcat(Vec<Term>),
    StrLen(Box<Term>),
    /// `(str.substr s offset length)`
    StrSubstr(Box<Term>, Box<Term>, Box<Term>),
    StrAt(Box<Term>, Box<Term>),
    /// `(str.replace s pattern replacement)`: first occurrence
    StrReplace(Box<Term>, Box<Term>, Box<Term>),
    /// `(str.indexof s pattern start)`
    StrIndexOf(Box<Term>, Box<Term>, Box<Term>),
    /// `(str.contains s pattern)`
    StrContains(Box<Term>, Box<Term>),
    /// `(str.prefixof prefix s)`
    StrPrefixOf(Box<Term>, Box<Term>),
    /// `(str.suffixof suffix s)`
    StrSuffixOf(Box<Term>, Box<Term>),
    /// `(str.in_re s re)`
    StrInRe(Box<Term>, Box<Term>),
    /// `(str.to_re s)`
    StrToRe(Box<Term>),

    // === Regular languages ===
    ReNone,
    ReAll,
    ReAllChar,
    ReStar(Box<Term>),
    RePlus(Box<Term>),
    ReOpt(Box<Term>),
    ReConcat(Vec<Term>),
    ReUnion(Vec<Term>),
    ReComp(Box<Term>),
    /// `(re.range lo hi)` over single-character strings
    ReRange(Box<Term>, Box<Term>),

    // === Sequences (Z3 names, over strings) ===
    SeqConcat(Vec<Term>),
    SeqLen(Box<Term>),
    SeqExtract(Box<Term>, Box<Term>, Box<Term>),
    SeqAt(Box<Term>, Box<Term>),
    SeqReplace(Box<Term>, Box<Term>, Box<Term>),
    SeqIndexOf(Box<Term>, Box<Term>, Box<Term>),
    SeqContains(Box<Term>, Box<Term>),
    /// `(seq.prefixof prefix s)`
    SeqPrefixOf(Box<Term>, Box<Term>),
    /// `(seq.suffixof suffix s)`
    SeqSuffixOf(Box<Term>, Box<Term>),
    SeqInRe(Box<Term>, Box<Term>),
    SeqToRe(Box<Term>),
}

impl Term {
    pub fn int(value: impl Into<BigInt>) -> Self {
        Term::IntLit(value.into())
    }

    pub fn constant(name: impl Into<String>) -> Self {
        Term::Const(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Term::StringLit(value.into())
    }

    /// Whether this term is a value literal: no symbols, no operators other
    /// than those forming literals.
    pub fn is_value(&self) -> bool {
        match self {
            Term::BoolLit(_)
            | Term::IntLit(_)
            | Term::RealLit(_)
            | Term::BitVecLit(..)
            | Term::StringLit(_)
            | Term::FpNaN(..)
            | Term::FpPosInf(..)
            | Term::FpNegInf(..)
            | Term::FpPosZero(..)
            | Term::FpNegZero(..)
            | Term::FpFromBits(..)
            | Term::RoundingMode(_) => true,
            Term::ConstArray(_, value) => value.is_value(),
            Term::Store(array, index, value) => {
                array.is_value() && index.is_value() && value.is_value()
            }
            _ => false,
        }
    }
}
