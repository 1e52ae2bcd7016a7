//! Exact ground evaluation of [`Term`]s under a model.
//!
//! A model is a list of [`Definition`]s as printed by `(get-model)`. The
//! evaluator interprets every theory the AST covers (booleans, unbounded
//! arithmetic, bitvectors, IEEE floats via [`crate::float`], arrays, strings
//! and regular languages) and answers `None` whenever the value is not
//! determined by the model: unassigned symbols, division by zero in `Int` or
//! `Real`, quantifiers, and conversions the standard leaves unspecified.

use std::collections::{BTreeSet, HashMap};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::float::{FloatFormat, FloatValue};
use crate::sort::{RoundingMode, Sort};
use crate::term::Term;

/// Nesting limit for function applications.
const MAX_DEPTH: usize = 256;

/// `(define-fun name ((p S) ...) S body)` from a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub params: Vec<(String, Sort)>,
    pub sort: Sort,
    pub body: Term,
}

/// Regular language over characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    None,
    All,
    AllChar,
    Literal(Vec<char>),
    /// Inclusive character range; `None` when the bounds are not single
    /// characters (the empty language)
    Range(Option<(char, char)>),
    Star(Box<Regex>),
    Plus(Box<Regex>),
    Opt(Box<Regex>),
    Concat(Vec<Regex>),
    Union(Vec<Regex>),
    Complement(Box<Regex>),
}

impl Regex {
    /// End positions of every match of `self` starting at `start`.
    fn ends(&self, s: &[char], start: usize) -> BTreeSet<usize> {
        match self {
            Regex::None => BTreeSet::new(),
            Regex::All => (start..=s.len()).collect(),
            Regex::AllChar => (start < s.len()).then_some(start + 1).into_iter().collect(),
            Regex::Literal(word) => s[start..]
                .starts_with(word)
                .then_some(start + word.len())
                .into_iter()
                .collect(),
            Regex::Range(range) => match (range, s.get(start)) {
                (Some((lo, hi)), Some(c)) if lo <= c && c <= hi => BTreeSet::from([start + 1]),
                _ => BTreeSet::new(),
            },
            Regex::Star(inner) => {
                let mut reached = BTreeSet::from([start]);
                let mut frontier = vec![start];
                while let Some(position) = frontier.pop() {
                    for end in inner.ends(s, position) {
                        if reached.insert(end) {
                            frontier.push(end);
                        }
                    }
                }
                reached
            }
            Regex::Plus(inner) => inner
                .ends(s, start)
                .into_iter()
                .flat_map(|mid| Regex::Star(inner.clone()).ends(s, mid))
                .collect(),
            Regex::Opt(inner) => {
                let mut ends = inner.ends(s, start);
                ends.insert(start);
                ends
            }
            Regex::Concat(parts) => parts.iter().fold(BTreeSet::from([start]), |acc, part| {
                acc.into_iter().flat_map(|mid| part.ends(s, mid)).collect()
            }),
            Regex::Union(parts) => parts.iter().flat_map(|part| part.ends(s, start)).collect(),
            Regex::Complement(inner) => {
                let matched = inner.ends(s, start);
                (start..=s.len()).filter(|end| !matched.contains(end)).collect()
            }
        }
    }

    pub fn matches(&self, s: &[char]) -> bool {
        self.ends(s, 0).contains(&s.len())
    }

    pub fn to_term(&self) -> Term {
        let boxed = |r: &Regex| Box::new(r.to_term());
        match self {
            Regex::None | Regex::Range(None) => Term::ReNone,
            Regex::All => Term::ReAll,
            Regex::AllChar => Term::ReAllChar,
            Regex::Literal(word) => {
                Term::StrToRe(Box::new(Term::StringLit(word.iter().collect())))
            }
            Regex::Range(Some((lo, hi))) => Term::ReRange(
                Box::new(Term::StringLit(lo.to_string())),
                Box::new(Term::StringLit(hi.to_string())),
            ),
            Regex::Star(inner) => Term::ReStar(boxed(inner)),
            Regex::Plus(inner) => Term::RePlus(boxed(inner)),
            Regex::Opt(inner) => Term::ReOpt(boxed(inner)),
            Regex::Concat(parts) => Term::ReConcat(parts.iter().map(Regex::to_term).collect()),
            Regex::Union(parts) => Term::ReUnion(parts.iter().map(Regex::to_term).collect()),
            Regex::Complement(inner) => Term::ReComp(boxed(inner)),
        }
    }
}

/// A ground value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Val {
    Bool(bool),
    Int(BigInt),
    Real(BigRational),
    /// Unsigned value in `[0, 2^width)`
    Bv { value: BigInt, width: u32 },
    Str(Vec<char>),
    Float(FloatValue, FloatFormat),
    Rm(RoundingMode),
    Array {
        sort: Sort,
        default: Box<Val>,
        entries: Vec<(Val, Val)>,
    },
    Regex(Regex),
}

fn modulus(width: u32) -> BigInt {
    BigInt::one() << width
}

fn wrap(value: BigInt, width: u32) -> Val {
    Val::Bv {
        value: value.mod_floor(&modulus(width)),
        width,
    }
}

/// Two's complement reading of an unsigned `width`-bit value.
fn to_signed(value: &BigInt, width: u32) -> BigInt {
    if width > 0 && value.bit(u64::from(width - 1)) {
        value - modulus(width)
    } else {
        value.clone()
    }
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    (from..haystack.len())
        .find(|&i| haystack[i..].starts_with(needle))
}

fn single_char(s: &[char]) -> Option<char> {
    match s {
        [c] => Some(*c),
        _ => None,
    }
}

impl Val {
    fn as_bool(&self) -> Option<bool> {
        match self {
            Val::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<&BigInt> {
        match self {
            Val::Int(n) => Some(n),
            _ => None,
        }
    }

    fn as_rational(&self) -> Option<BigRational> {
        match self {
            Val::Int(n) => Some(BigRational::from_integer(n.clone())),
            Val::Real(r) => Some(r.clone()),
            _ => None,
        }
    }

    fn as_bv(&self) -> Option<(&BigInt, u32)> {
        match self {
            Val::Bv { value, width } => Some((value, *width)),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<(&FloatValue, FloatFormat)> {
        match self {
            Val::Float(value, format) => Some((value, *format)),
            _ => None,
        }
    }

    fn as_rm(&self) -> Option<RoundingMode> {
        match self {
            Val::Rm(rm) => Some(*rm),
            _ => None,
        }
    }

    fn as_regex(&self) -> Option<&Regex> {
        match self {
            Val::Regex(re) => Some(re),
            _ => None,
        }
    }

    fn select(&self, index: &Val) -> Option<Val> {
        match self {
            Val::Array {
                default, entries, ..
            } => Some(
                entries
                    .iter()
                    .rev()
                    .find(|(i, _)| i == index)
                    .map_or_else(|| default.as_ref().clone(), |(_, v)| v.clone()),
            ),
            _ => None,
        }
    }

    /// SMT-LIB `=`: structural for scalars, extensional for arrays;
    /// regular languages only compare when structurally identical.
    pub fn smt_eq(&self, other: &Val) -> Option<bool> {
        match (self, other) {
            (Val::Int(_) | Val::Real(_), Val::Int(_) | Val::Real(_)) => {
                Some(self.as_rational()? == other.as_rational()?)
            }
            (Val::Regex(a), Val::Regex(b)) => (a == b).then_some(true),
            (
                Val::Array {
                    default: da,
                    entries: ea,
                    ..
                },
                Val::Array {
                    default: db,
                    entries: eb,
                    ..
                },
            ) => {
                let mut unknown = false;
                for (index, _) in ea.iter().chain(eb) {
                    match self.select(index)?.smt_eq(&other.select(index)?) {
                        Some(false) => return Some(false),
                        Some(true) => {}
                        None => unknown = true,
                    }
                }
                match da.smt_eq(db) {
                    Some(false) => Some(false),
                    Some(true) if !unknown => Some(true),
                    _ => None,
                }
            }
            _ => Some(self == other),
        }
    }

    /// The value as a literal term.
    pub fn to_term(&self) -> Term {
        match self {
            Val::Bool(b) => Term::BoolLit(*b),
            Val::Int(n) => Term::IntLit(n.clone()),
            Val::Real(r) => Term::RealLit(r.clone()),
            Val::Bv { value, width } => Term::BitVecLit(value.clone(), *width),
            Val::Str(chars) => Term::StringLit(chars.iter().collect()),
            Val::Float(value, format) => {
                let (e, s) = (format.exponent_bits, format.significand_bits);
                match value {
                    FloatValue::NaN => Term::FpNaN(e, s),
                    FloatValue::Infinity { negative: false } => Term::FpPosInf(e, s),
                    FloatValue::Infinity { negative: true } => Term::FpNegInf(e, s),
                    FloatValue::Zero { negative: false } => Term::FpPosZero(e, s),
                    FloatValue::Zero { negative: true } => Term::FpNegZero(e, s),
                    FloatValue::Finite { .. } => {
                        let (sign, exponent, significand) = value.to_fields(*format);
                        Term::FpFromBits(sign, exponent, significand, e, s)
                    }
                }
            }
            Val::Rm(rm) => Term::RoundingMode(*rm),
            Val::Array {
                sort,
                default,
                entries,
            } => entries.iter().fold(
                Term::ConstArray(sort.clone(), Box::new(default.to_term())),
                |array, (index, value)| {
                    Term::Store(
                        Box::new(array),
                        Box::new(index.to_term()),
                        Box::new(value.to_term()),
                    )
                },
            ),
            Val::Regex(re) => re.to_term(),
        }
    }
}

type Scope = Vec<(String, Val)>;

/// Evaluates terms against a set of model definitions.
#[derive(Debug, Default)]
pub struct Evaluator<'m> {
    definitions: HashMap<&'m str, &'m Definition>,
}

impl<'m> Evaluator<'m> {
    pub fn new(definitions: impl IntoIterator<Item = &'m Definition>) -> Self {
        Self {
            definitions: definitions
                .into_iter()
                .map(|d| (d.name.as_str(), d))
                .collect(),
        }
    }

    pub fn evaluate(&self, term: &Term) -> Option<Val> {
        self.eval(term, &Vec::new(), 0)
    }

    /// Evaluate and print back as a literal term.
    pub fn evaluate_to_term(&self, term: &Term) -> Option<Term> {
        self.evaluate(term).map(|v| v.to_term())
    }

    fn apply(&self, name: &str, args: &[Term], scope: &Scope, depth: usize) -> Option<Val> {
        if depth >= MAX_DEPTH {
            tracing::warn!(name, "function application nested too deeply");
            return None;
        }
        let definition = self.definitions.get(name)?;
        if definition.params.len() != args.len() {
            return None;
        }
        let mut frame = Scope::with_capacity(args.len());
        for ((param, _), arg) in definition.params.iter().zip(args) {
            frame.push((param.clone(), self.eval(arg, scope, depth)?));
        }
        self.eval(&definition.body, &frame, depth + 1)
    }

    fn eval(&self, term: &Term, scope: &Scope, depth: usize) -> Option<Val> {
        let ev = |t: &Term| self.eval(t, scope, depth);
        let bool_of = |t: &Term| ev(t)?.as_bool();
        let str_of = |t: &Term| match ev(t)? {
            Val::Str(chars) => Some(chars),
            _ => None,
        };
        let int_of = |t: &Term| ev(t)?.as_int().cloned();
        let regex_of = |t: &Term| match ev(t)? {
            Val::Regex(re) => Some(re),
            _ => None,
        };

        let value = match term {
            // --- Literals and symbols ---
            Term::BoolLit(b) => Val::Bool(*b),
            Term::IntLit(n) => Val::Int(n.clone()),
            Term::RealLit(r) => Val::Real(r.clone()),
            Term::BitVecLit(value, width) => wrap(value.clone(), *width),
            Term::StringLit(s) => Val::Str(s.chars().collect()),
            Term::Const(name) => match scope.iter().rev().find(|(n, _)| n == name) {
                Some((_, v)) => v.clone(),
                None => self.apply(name, &[], scope, depth)?,
            },
            Term::App(name, args) => self.apply(name, args, scope, depth)?,

            // --- Boolean ---
            Term::Not(a) => Val::Bool(!bool_of(a)?),
            Term::And(terms) => {
                let values: Vec<Option<bool>> = terms.iter().map(bool_of).collect();
                if values.contains(&Some(false)) {
                    Val::Bool(false)
                } else {
                    values.into_iter().collect::<Option<Vec<_>>>()?;
                    Val::Bool(true)
                }
            }
            Term::Or(terms) => {
                let values: Vec<Option<bool>> = terms.iter().map(bool_of).collect();
                if values.contains(&Some(true)) {
                    Val::Bool(true)
                } else {
                    values.into_iter().collect::<Option<Vec<_>>>()?;
                    Val::Bool(false)
                }
            }
            Term::Xor(a, b) => Val::Bool(bool_of(a)? != bool_of(b)?),
            Term::Implies(a, b) => match (bool_of(a), bool_of(b)) {
                (Some(false), _) | (_, Some(true)) => Val::Bool(true),
                (Some(true), Some(false)) => Val::Bool(false),
                _ => return None,
            },
            Term::Iff(a, b) => Val::Bool(bool_of(a)? == bool_of(b)?),
            Term::Eq(a, b) => Val::Bool(ev(a)?.smt_eq(&ev(b)?)?),
            Term::Distinct(terms) => {
                let values = terms.iter().map(ev).collect::<Option<Vec<_>>>()?;
                let mut unknown = false;
                for (i, a) in values.iter().enumerate() {
                    for b in &values[i + 1..] {
                        match a.smt_eq(b) {
                            Some(true) => return Some(Val::Bool(false)),
                            Some(false) => {}
                            None => unknown = true,
                        }
                    }
                }
                if unknown {
                    return None;
                }
                Val::Bool(true)
            }
            Term::Ite(c, t, e) => {
                if bool_of(c)? {
                    ev(t)?
                } else {
                    ev(e)?
                }
            }

            // --- Bitvectors ---
            Term::BvAdd(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| x + y)?,
            Term::BvSub(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| x - y)?,
            Term::BvMul(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| x * y)?,
            Term::BvUDiv(a, b) => self.bv_binary(a, b, scope, depth, |x, y, w| {
                if y.is_zero() { modulus(w) - 1 } else { x / y }
            })?,
            Term::BvURem(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| {
                if y.is_zero() { x.clone() } else { x % y }
            })?,
            Term::BvSDiv(a, b) => self.bv_binary(a, b, scope, depth, |x, y, w| {
                let (sx, sy) = (to_signed(x, w), to_signed(y, w));
                match (sy.is_zero(), sx.is_negative()) {
                    (true, false) => modulus(w) - 1,
                    (true, true) => BigInt::one(),
                    (false, _) => sx / sy,
                }
            })?,
            Term::BvSRem(a, b) => self.bv_binary(a, b, scope, depth, |x, y, w| {
                let (sx, sy) = (to_signed(x, w), to_signed(y, w));
                if sy.is_zero() { sx } else { sx % sy }
            })?,
            Term::BvAnd(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| x & y)?,
            Term::BvOr(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| x | y)?,
            Term::BvXor(a, b) => self.bv_binary(a, b, scope, depth, |x, y, _| x ^ y)?,
            Term::BvShl(a, b) => self.bv_binary(a, b, scope, depth, |x, y, w| {
                match y.to_u32().filter(|&shift| shift < w) {
                    Some(shift) => x << shift,
                    None => BigInt::zero(),
                }
            })?,
            Term::BvLShr(a, b) => self.bv_binary(a, b, scope, depth, |x, y, w| {
                match y.to_u32().filter(|&shift| shift < w) {
                    Some(shift) => x >> shift,
                    None => BigInt::zero(),
                }
            })?,
            Term::BvAShr(a, b) => self.bv_binary(a, b, scope, depth, |x, y, w| {
                let sx = to_signed(x, w);
                match y.to_u32().filter(|&shift| shift < w) {
                    Some(shift) => sx >> shift,
                    None if sx.is_negative() => -BigInt::one(),
                    None => BigInt::zero(),
                }
            })?,
            Term::BvNeg(a) => {
                let (x, w) = ev(a)?.as_bv().map(|(x, w)| (x.clone(), w))?;
                wrap(-x, w)
            }
            Term::BvNot(a) => {
                let (x, w) = ev(a)?.as_bv().map(|(x, w)| (x.clone(), w))?;
                wrap(modulus(w) - 1 - x, w)
            }
            Term::BvULt(a, b) => self.bv_compare(a, b, scope, depth, false, |o| o.is_lt())?,
            Term::BvULe(a, b) => self.bv_compare(a, b, scope, depth, false, |o| o.is_le())?,
            Term::BvUGt(a, b) => self.bv_compare(a, b, scope, depth, false, |o| o.is_gt())?,
            Term::BvUGe(a, b) => self.bv_compare(a, b, scope, depth, false, |o| o.is_ge())?,
            Term::BvSLt(a, b) => self.bv_compare(a, b, scope, depth, true, |o| o.is_lt())?,
            Term::BvSLe(a, b) => self.bv_compare(a, b, scope, depth, true, |o| o.is_le())?,
            Term::BvSGt(a, b) => self.bv_compare(a, b, scope, depth, true, |o| o.is_gt())?,
            Term::BvSGe(a, b) => self.bv_compare(a, b, scope, depth, true, |o| o.is_ge())?,
            Term::ZeroExtend(n, a) => {
                let (x, w) = ev(a)?.as_bv().map(|(x, w)| (x.clone(), w))?;
                wrap(x, w + n)
            }
            Term::SignExtend(n, a) => {
                let (x, w) = ev(a)?.as_bv().map(|(x, w)| (x.clone(), w))?;
                wrap(to_signed(&x, w), w + n)
            }
            Term::Extract(hi, lo, a) => {
                let (x, w) = ev(a)?.as_bv().map(|(x, w)| (x.clone(), w))?;
                if hi < lo || *hi >= w {
                    return None;
                }
                wrap(x >> *lo, hi - lo + 1)
            }
            Term::Concat(a, b) => match (ev(a)?, ev(b)?) {
                (Val::Bv { value: x, width: wx }, Val::Bv { value: y, width: wy }) => {
                    wrap((x << wy) | y, wx + wy)
                }
                (Val::Str(mut x), Val::Str(y)) => {
                    x.extend(y);
                    Val::Str(x)
                }
                _ => return None,
            },
            Term::Bv2Int(a) => Val::Int(ev(a)?.as_bv()?.0.clone()),
            Term::Int2Bv(n, a) => wrap(int_of(a)?, *n),

            // --- Arithmetic ---
            Term::Add(terms) => {
                let values = terms.iter().map(ev).collect::<Option<Vec<_>>>()?;
                numeric_fold(&values, Some(BigRational::zero()), |acc, x| acc + x)?
            }
            Term::Sub(a, b) => numeric_fold(&[ev(a)?, ev(b)?], None, |acc, x| acc - x)?,
            Term::Mul(a, b) => numeric_fold(&[ev(a)?, ev(b)?], None, |acc, x| acc * x)?,
            Term::Neg(a) => match ev(a)? {
                Val::Int(n) => Val::Int(-n),
                Val::Real(r) => Val::Real(-r),
                _ => return None,
            },
            Term::IntDiv(a, b) => {
                let (x, y) = (int_of(a)?, int_of(b)?);
                if y.is_zero() {
                    return None;
                }
                let r = x.mod_floor(&y.abs());
                Val::Int((x - r) / y)
            }
            Term::IntMod(a, b) => {
                let (x, y) = (int_of(a)?, int_of(b)?);
                if y.is_zero() {
                    return None;
                }
                Val::Int(x.mod_floor(&y.abs()))
            }
            Term::RealDiv(a, b) => {
                let (x, y) = (ev(a)?.as_rational()?, ev(b)?.as_rational()?);
                if y.is_zero() {
                    return None;
                }
                Val::Real(x / y)
            }
            Term::ToReal(a) => Val::Real(ev(a)?.as_rational()?),
            Term::Lt(a, b) => Val::Bool(ev(a)?.as_rational()? < ev(b)?.as_rational()?),
            Term::Le(a, b) => Val::Bool(ev(a)?.as_rational()? <= ev(b)?.as_rational()?),
            Term::Gt(a, b) => Val::Bool(ev(a)?.as_rational()? > ev(b)?.as_rational()?),
            Term::Ge(a, b) => Val::Bool(ev(a)?.as_rational()? >= ev(b)?.as_rational()?),

            // --- Arrays ---
            Term::Select(array, index) => ev(array)?.select(&ev(index)?)?,
            Term::Store(array, index, value) => match ev(array)? {
                Val::Array {
                    sort,
                    default,
                    mut entries,
                } => {
                    let (index, value) = (ev(index)?, ev(value)?);
                    entries.retain(|(i, _)| *i != index);
                    entries.push((index, value));
                    Val::Array {
                        sort,
                        default,
                        entries,
                    }
                }
                _ => return None,
            },
            Term::ConstArray(sort, value) => Val::Array {
                sort: sort.clone(),
                default: Box::new(ev(value)?),
                entries: Vec::new(),
            },

            Term::Forall(..) | Term::Exists(..) => return None,

            // --- Floating point ---
            Term::FpNaN(e, s) => Val::Float(FloatValue::NaN, FloatFormat::new(*e, *s)?),
            Term::FpPosInf(e, s) => float(FloatValue::Infinity { negative: false }, *e, *s)?,
            Term::FpNegInf(e, s) => float(FloatValue::Infinity { negative: true }, *e, *s)?,
            Term::FpPosZero(e, s) => float(FloatValue::Zero { negative: false }, *e, *s)?,
            Term::FpNegZero(e, s) => float(FloatValue::Zero { negative: true }, *e, *s)?,
            Term::FpFromBits(sign, exponent, significand, e, s) => {
                let format = FloatFormat::new(*e, *s)?;
                Val::Float(
                    FloatValue::from_fields(*sign, exponent, significand, format),
                    format,
                )
            }
            Term::RoundingMode(rm) => Val::Rm(*rm),
            Term::FpAdd(rm, a, b) => self.fp_binary(rm, a, b, scope, depth, FloatValue::add)?,
            Term::FpSub(rm, a, b) => self.fp_binary(rm, a, b, scope, depth, FloatValue::sub)?,
            Term::FpMul(rm, a, b) => self.fp_binary(rm, a, b, scope, depth, FloatValue::mul)?,
            Term::FpDiv(rm, a, b) => self.fp_binary(rm, a, b, scope, depth, FloatValue::div)?,
            Term::FpSqrt(rm, a) => {
                let rm = ev(rm)?.as_rm()?;
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                Val::Float(x.sqrt(format, rm), format)
            }
            Term::FpRoundToIntegral(rm, a) => {
                let rm = ev(rm)?.as_rm()?;
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                Val::Float(x.round_to_integral(rm), format)
            }
            Term::FpAbs(a) => {
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                Val::Float(x.abs(), format)
            }
            Term::FpNeg(a) => {
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                Val::Float(x.neg(), format)
            }
            Term::FpEq(a, b) => Val::Bool(self.fp_cmp(a, b, scope, depth)?.is_some_and(|o| o.is_eq())),
            Term::FpLt(a, b) => Val::Bool(self.fp_cmp(a, b, scope, depth)?.is_some_and(|o| o.is_lt())),
            Term::FpLeq(a, b) => Val::Bool(self.fp_cmp(a, b, scope, depth)?.is_some_and(|o| o.is_le())),
            Term::FpGt(a, b) => Val::Bool(self.fp_cmp(a, b, scope, depth)?.is_some_and(|o| o.is_gt())),
            Term::FpGeq(a, b) => Val::Bool(self.fp_cmp(a, b, scope, depth)?.is_some_and(|o| o.is_ge())),
            Term::FpIsNaN(a) => Val::Bool(ev(a)?.as_float()?.0.is_nan()),
            Term::FpIsInfinite(a) => Val::Bool(ev(a)?.as_float()?.0.is_infinite()),
            Term::FpIsZero(a) => Val::Bool(ev(a)?.as_float()?.0.is_zero()),
            Term::FpIsNormal(a) => {
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                Val::Bool(x.is_normal(format))
            }
            Term::FpIsSubnormal(a) => {
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                Val::Bool(x.is_subnormal(format))
            }
            Term::FpIsNegative(a) => Val::Bool(ev(a)?.as_float()?.0.is_negative()),
            Term::FpIsPositive(a) => Val::Bool(ev(a)?.as_float()?.0.is_positive()),
            Term::ToFp(e, s, rm, a) => {
                let format = FloatFormat::new(*e, *s)?;
                let rm = ev(rm)?.as_rm()?;
                let value = match ev(a)? {
                    Val::Float(x, _) => x.convert(format, rm),
                    Val::Int(n) => FloatValue::from_integer(&n, format, rm),
                    Val::Real(r) => FloatValue::from_rational(&r, format, rm),
                    Val::Bv { value, width } => {
                        FloatValue::from_integer(&to_signed(&value, width), format, rm)
                    }
                    _ => return None,
                };
                Val::Float(value, format)
            }
            Term::ToFpUnsigned(e, s, rm, a) => {
                let format = FloatFormat::new(*e, *s)?;
                let rm = ev(rm)?.as_rm()?;
                let x = ev(a)?;
                Val::Float(FloatValue::from_integer(x.as_bv()?.0, format, rm), format)
            }
            Term::FpFromIeeeBv(e, s, a) => {
                let format = FloatFormat::new(*e, *s)?;
                let x = ev(a)?;
                let (bits, width) = x.as_bv()?;
                if width != format.total_bits() {
                    return None;
                }
                Val::Float(
                    FloatValue::from_ieee_bits(bits.magnitude(), format),
                    format,
                )
            }
            Term::FpToUbv(width, rm, a) | Term::FpToSbv(width, rm, a) => {
                let signed = matches!(term, Term::FpToSbv(..));
                let rm = ev(rm)?.as_rm()?;
                let x = ev(a)?;
                let integer = x.as_float()?.0.to_integer_in_range(*width, signed, rm)?;
                wrap(integer, *width)
            }
            Term::FpToReal(a) => Val::Real(ev(a)?.as_float()?.0.to_rational()?),
            Term::FpToIeeeBv(a) => {
                let x = ev(a)?;
                let (x, format) = x.as_float()?;
                if x.is_nan() {
                    // solvers may pick any NaN pattern
                    return None;
                }
                wrap(BigInt::from(x.to_ieee_bits(format)), format.total_bits())
            }

            // --- Strings and sequences ---
            Term::StrConcat(terms) | Term::SeqConcat(terms) => {
                let mut out = Vec::new();
                for t in terms {
                    out.extend(str_of(t)?);
                }
                Val::Str(out)
            }
            Term::StrLen(a) | Term::SeqLen(a) => Val::Int(BigInt::from(str_of(a)?.len())),
            Term::StrSubstr(s, i, n) | Term::SeqExtract(s, i, n) => {
                let (s, i, n) = (str_of(s)?, int_of(i)?, int_of(n)?);
                let len = BigInt::from(s.len());
                if i.is_negative() || !n.is_positive() || i >= len {
                    Val::Str(Vec::new())
                } else {
                    let start = i.to_usize()?;
                    let end = (i + n).min(len).to_usize()?;
                    Val::Str(s[start..end].to_vec())
                }
            }
            Term::StrAt(s, i) | Term::SeqAt(s, i) => {
                let (s, i) = (str_of(s)?, int_of(i)?);
                let picked = i.to_usize().and_then(|i| s.get(i)).map(|c| vec![*c]);
                Val::Str(picked.unwrap_or_default())
            }
            Term::StrReplace(s, p, r) | Term::SeqReplace(s, p, r) => {
                let (s, p, r) = (str_of(s)?, str_of(p)?, str_of(r)?);
                match find_from(&s, &p, 0) {
                    Some(at) => {
                        let mut out = s[..at].to_vec();
                        out.extend(r);
                        out.extend_from_slice(&s[at + p.len()..]);
                        Val::Str(out)
                    }
                    None => Val::Str(s),
                }
            }
            Term::StrIndexOf(s, p, i) | Term::SeqIndexOf(s, p, i) => {
                let (s, p, i) = (str_of(s)?, str_of(p)?, int_of(i)?);
                let found = i.to_usize().and_then(|i| find_from(&s, &p, i));
                Val::Int(found.map_or_else(|| BigInt::from(-1), BigInt::from))
            }
            Term::StrContains(s, p) | Term::SeqContains(s, p) => {
                let (s, p) = (str_of(s)?, str_of(p)?);
                Val::Bool(find_from(&s, &p, 0).is_some())
            }
            Term::StrPrefixOf(p, s) | Term::SeqPrefixOf(p, s) => {
                let (p, s) = (str_of(p)?, str_of(s)?);
                Val::Bool(s.starts_with(&p))
            }
            Term::StrSuffixOf(p, s) | Term::SeqSuffixOf(p, s) => {
                let (p, s) = (str_of(p)?, str_of(s)?);
                Val::Bool(s.ends_with(&p))
            }
            Term::StrInRe(s, r) | Term::SeqInRe(s, r) => {
                let s = str_of(s)?;
                let r = ev(r)?;
                Val::Bool(r.as_regex()?.matches(&s))
            }
            Term::StrToRe(s) | Term::SeqToRe(s) => Val::Regex(Regex::Literal(str_of(s)?)),

            // --- Regular languages ---
            Term::ReNone => Val::Regex(Regex::None),
            Term::ReAll => Val::Regex(Regex::All),
            Term::ReAllChar => Val::Regex(Regex::AllChar),
            Term::ReStar(r) => Val::Regex(Regex::Star(Box::new(regex_of(r)?))),
            Term::RePlus(r) => Val::Regex(Regex::Plus(Box::new(regex_of(r)?))),
            Term::ReOpt(r) => Val::Regex(Regex::Opt(Box::new(regex_of(r)?))),
            Term::ReComp(r) => Val::Regex(Regex::Complement(Box::new(regex_of(r)?))),
            Term::ReConcat(parts) => Val::Regex(Regex::Concat(
                parts.iter().map(regex_of).collect::<Option<_>>()?,
            )),
            Term::ReUnion(parts) => Val::Regex(Regex::Union(
                parts.iter().map(regex_of).collect::<Option<_>>()?,
            )),
            Term::ReRange(lo, hi) => {
                let (lo, hi) = (str_of(lo)?, str_of(hi)?);
                Val::Regex(Regex::Range(single_char(&lo).zip(single_char(&hi))))
            }
        };
        Some(value)
    }

    fn bv_binary(
        &self,
        a: &Term,
        b: &Term,
        scope: &Scope,
        depth: usize,
        op: impl Fn(&BigInt, &BigInt, u32) -> BigInt,
    ) -> Option<Val> {
        let (x, y) = (self.eval(a, scope, depth)?, self.eval(b, scope, depth)?);
        let ((x, wx), (y, wy)) = (x.as_bv()?, y.as_bv()?);
        (wx == wy).then(|| wrap(op(x, y, wx), wx))
    }

    fn bv_compare(
        &self,
        a: &Term,
        b: &Term,
        scope: &Scope,
        depth: usize,
        signed: bool,
        test: impl Fn(std::cmp::Ordering) -> bool,
    ) -> Option<Val> {
        let (x, y) = (self.eval(a, scope, depth)?, self.eval(b, scope, depth)?);
        let ((x, wx), (y, wy)) = (x.as_bv()?, y.as_bv()?);
        if wx != wy {
            return None;
        }
        let ordering = if signed {
            to_signed(x, wx).cmp(&to_signed(y, wy))
        } else {
            x.cmp(y)
        };
        Some(Val::Bool(test(ordering)))
    }

    fn fp_binary(
        &self,
        rm: &Term,
        a: &Term,
        b: &Term,
        scope: &Scope,
        depth: usize,
        op: fn(&FloatValue, &FloatValue, FloatFormat, RoundingMode) -> FloatValue,
    ) -> Option<Val> {
        let rm = self.eval(rm, scope, depth)?.as_rm()?;
        let (x, y) = (self.eval(a, scope, depth)?, self.eval(b, scope, depth)?);
        let ((x, format), (y, other)) = (x.as_float()?, y.as_float()?);
        (format == other).then(|| Val::Float(op(x, y, format, rm), format))
    }

    /// `Some(None)` for unordered operands.
    fn fp_cmp(
        &self,
        a: &Term,
        b: &Term,
        scope: &Scope,
        depth: usize,
    ) -> Option<Option<std::cmp::Ordering>> {
        let (x, y) = (self.eval(a, scope, depth)?, self.eval(b, scope, depth)?);
        Some(x.as_float()?.0.ieee_cmp(y.as_float()?.0))
    }
}

fn float(value: FloatValue, e: u32, s: u32) -> Option<Val> {
    Some(Val::Float(value, FloatFormat::new(e, s)?))
}

/// Fold numeric values; the result is `Int` when every operand is.
fn numeric_fold(
    values: &[Val],
    init: Option<BigRational>,
    op: impl Fn(BigRational, BigRational) -> BigRational,
) -> Option<Val> {
    let all_int = values.iter().all(|v| matches!(v, Val::Int(_)));
    let mut operands = values.iter().map(Val::as_rational);
    let mut acc = match init {
        Some(init) => init,
        None => operands.next()??,
    };
    for operand in operands {
        acc = op(acc, operand?);
    }
    Some(if all_int {
        Val::Int(acc.to_integer())
    } else {
        Val::Real(acc)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{parse_sexprs, read_term};

    fn term(text: &str) -> Term {
        let exprs = parse_sexprs(text).unwrap();
        read_term(&exprs[0]).unwrap()
    }

    fn eval(text: &str) -> Option<Val> {
        Evaluator::default().evaluate(&term(text))
    }

    fn bv(value: i64, width: u32) -> Val {
        wrap(BigInt::from(value), width)
    }

    fn s(text: &str) -> Val {
        Val::Str(text.chars().collect())
    }

    fn b(x: Box<Term>, y: Box<Term>, f: fn(Box<Term>, Box<Term>) -> Term) -> Term {
        f(x, y)
    }

    fn lit(value: i64, width: u32) -> Box<Term> {
        Box::new(Term::BitVecLit(BigInt::from(value).mod_floor(&modulus(width)), width))
    }

    #[test]
    fn boolean_three_valued_logic() {
        assert_eq!(eval("(and true false unknown)"), Some(Val::Bool(false)));
        assert_eq!(eval("(or unknown true)"), Some(Val::Bool(true)));
        assert_eq!(eval("(and true unknown)"), None);
        assert_eq!(eval("(=> false unknown)"), Some(Val::Bool(true)));
        assert_eq!(eval("(distinct 1 2 3)"), Some(Val::Bool(true)));
        assert_eq!(eval("(distinct 1 2 1)"), Some(Val::Bool(false)));
    }

    #[test]
    fn euclidean_integer_division() {
        assert_eq!(eval("(div 7 2)"), Some(Val::Int(BigInt::from(3))));
        let div = |x: i64, y: i64| {
            Evaluator::default().evaluate(&Term::IntDiv(
                Box::new(Term::int(x)),
                Box::new(Term::int(y)),
            ))
        };
        let rem = |x: i64, y: i64| {
            Evaluator::default().evaluate(&Term::IntMod(
                Box::new(Term::int(x)),
                Box::new(Term::int(y)),
            ))
        };
        assert_eq!(div(7, 2), Some(Val::Int(BigInt::from(3))));
        assert_eq!(div(-7, 2), Some(Val::Int(BigInt::from(-4))));
        assert_eq!(div(-7, -2), Some(Val::Int(BigInt::from(4))));
        assert_eq!(rem(-7, 2), Some(Val::Int(BigInt::from(1))));
        assert_eq!(rem(-7, -2), Some(Val::Int(BigInt::from(1))));
        assert_eq!(div(1, 0), None);
    }

    #[test]
    fn arithmetic_promotes_to_real() {
        assert_eq!(eval("(+ 1 2 3)"), Some(Val::Int(BigInt::from(6))));
        assert_eq!(
            eval("(+ 1 0.5)"),
            Some(Val::Real(BigRational::new(BigInt::from(3), BigInt::from(2))))
        );
        assert_eq!(eval("(/ x 0.0)"), None);
        assert_eq!(eval("(< 1 1.5)"), Some(Val::Bool(true)));
    }

    #[test]
    fn bitvector_arithmetic_wraps() {
        let ev = |t: Term| Evaluator::default().evaluate(&t);
        assert_eq!(ev(b(lit(200, 8), lit(100, 8), Term::BvAdd)), Some(bv(44, 8)));
        assert_eq!(ev(b(lit(1, 8), lit(2, 8), Term::BvSub)), Some(bv(255, 8)));
        assert_eq!(ev(b(lit(-7, 8), lit(2, 8), Term::BvSDiv)), Some(bv(-3, 8)));
        assert_eq!(ev(b(lit(-7, 8), lit(2, 8), Term::BvSRem)), Some(bv(-1, 8)));
        assert_eq!(ev(b(lit(-128, 8), lit(1, 8), Term::BvAShr)), Some(bv(-64, 8)));
        assert_eq!(ev(b(lit(1, 8), lit(9, 8), Term::BvShl)), Some(bv(0, 8)));
        assert_eq!(ev(b(lit(-1, 8), lit(1, 8), Term::BvSLt)), Some(Val::Bool(true)));
        assert_eq!(ev(b(lit(-1, 8), lit(1, 8), Term::BvULt)), Some(Val::Bool(false)));
    }

    #[test]
    fn bitvector_division_by_zero() {
        let ev = |t: Term| Evaluator::default().evaluate(&t);
        assert_eq!(ev(b(lit(5, 8), lit(0, 8), Term::BvUDiv)), Some(bv(255, 8)));
        assert_eq!(ev(b(lit(5, 8), lit(0, 8), Term::BvURem)), Some(bv(5, 8)));
        assert_eq!(ev(b(lit(5, 8), lit(0, 8), Term::BvSDiv)), Some(bv(-1, 8)));
        assert_eq!(ev(b(lit(-5, 8), lit(0, 8), Term::BvSDiv)), Some(bv(1, 8)));
        assert_eq!(ev(b(lit(-5, 8), lit(0, 8), Term::BvSRem)), Some(bv(-5, 8)));
    }

    #[test]
    fn bitvector_structure() {
        let ev = |t: Term| Evaluator::default().evaluate(&t);
        assert_eq!(ev(Term::SignExtend(4, lit(-2, 4))), Some(bv(-2, 8)));
        assert_eq!(ev(Term::ZeroExtend(4, lit(-2, 4))), Some(bv(14, 8)));
        assert_eq!(ev(Term::Extract(7, 4, lit(0xab, 8))), Some(bv(0xa, 4)));
        assert_eq!(ev(Term::Concat(lit(0xa, 4), lit(0xb, 4))), Some(bv(0xab, 8)));
        assert_eq!(ev(Term::Bv2Int(lit(-1, 8))), Some(Val::Int(BigInt::from(255))));
        assert_eq!(ev(Term::Int2Bv(4, Box::new(Term::int(-1)))), Some(bv(15, 4)));
    }

    #[test]
    fn string_operations() {
        assert_eq!(eval("(str.++ \"ab\" \"cd\")"), Some(s("abcd")));
        assert_eq!(eval("(str.len \"h\\u{e9}\")"), Some(Val::Int(BigInt::from(2))));
        assert_eq!(eval("(str.substr \"hello\" 1 3)"), Some(s("ell")));
        assert_eq!(eval("(str.substr \"hello\" 3 10)"), Some(s("lo")));
        assert_eq!(eval("(str.substr \"hello\" (- 1) 2)"), Some(s("")));
        assert_eq!(eval("(str.at \"abc\" 5)"), Some(s("")));
        assert_eq!(eval("(str.replace \"aXbX\" \"X\" \"-\")"), Some(s("a-bX")));
        assert_eq!(eval("(str.replace \"ab\" \"\" \"-\")"), Some(s("-ab")));
        assert_eq!(
            eval("(str.indexof \"abcabc\" \"c\" 3)"),
            Some(Val::Int(BigInt::from(5)))
        );
        assert_eq!(
            eval("(str.indexof \"abc\" \"\" 4)"),
            Some(Val::Int(BigInt::from(-1)))
        );
        assert_eq!(eval("(str.prefixof \"ab\" \"abc\")"), Some(Val::Bool(true)));
        assert_eq!(eval("(str.suffixof \"ab\" \"abc\")"), Some(Val::Bool(false)));
        assert_eq!(eval("(str.contains \"abc\" \"bc\")"), Some(Val::Bool(true)));
    }

    #[test]
    fn regex_membership() {
        let in_re = |s: &str, re: &str| eval(&format!("(str.in_re \"{s}\" {re})"));
        let ab_star = "(re.* (re.union (str.to_re \"a\") (str.to_re \"b\")))";
        assert_eq!(in_re("abba", ab_star), Some(Val::Bool(true)));
        assert_eq!(in_re("abca", ab_star), Some(Val::Bool(false)));
        assert_eq!(in_re("", "(re.+ (str.to_re \"a\"))"), Some(Val::Bool(false)));
        assert_eq!(in_re("q", "(re.range \"a\" \"z\")"), Some(Val::Bool(true)));
        assert_eq!(in_re("q", "(re.range \"a\" \"zz\")"), Some(Val::Bool(false)));
        assert_eq!(in_re("xyz", "(re.comp (str.to_re \"xy\"))"), Some(Val::Bool(true)));
        assert_eq!(in_re("xy", "(re.comp (str.to_re \"xy\"))"), Some(Val::Bool(false)));
        assert_eq!(in_re("abc", "(re.++ re.all (str.to_re \"c\"))"), Some(Val::Bool(true)));
        assert_eq!(in_re("", "(re.opt re.allchar)"), Some(Val::Bool(true)));
    }

    #[test]
    fn optional_matches_union_with_empty_word() {
        let words = ["", "a", "aa", "b", "ab"];
        let native = Regex::Opt(Box::new(Regex::Literal(vec!['a'])));
        let synthesized = Regex::Union(vec![Regex::Literal(vec!['a']), Regex::Literal(vec![])]);
        for word in words {
            let chars: Vec<char> = word.chars().collect();
            assert_eq!(native.matches(&chars), synthesized.matches(&chars), "{word:?}");
        }
    }

    #[test]
    fn regex_equality_is_inconclusive_unless_identical() {
        assert_eq!(eval("(= re.all re.all)"), Some(Val::Bool(true)));
        assert_eq!(eval("(= re.all (re.* re.allchar))"), None);
    }

    #[test]
    fn arrays_are_extensional() {
        assert_eq!(
            eval("(select (store ((as const (Array Int Int)) 0) 1 5) 1)"),
            Some(Val::Int(BigInt::from(5)))
        );
        assert_eq!(
            eval("(select (store ((as const (Array Int Int)) 0) 1 5) 2)"),
            Some(Val::Int(BigInt::zero()))
        );
        assert_eq!(
            eval("(= (store ((as const (Array Int Int)) 0) 1 0) ((as const (Array Int Int)) 0))"),
            Some(Val::Bool(true))
        );
        assert_eq!(
            eval("(= (store ((as const (Array Int Int)) 0) 1 5) ((as const (Array Int Int)) 0))"),
            Some(Val::Bool(false))
        );
    }

    #[test]
    fn array_value_prints_back() {
        let value = eval("(store (store ((as const (Array Int Int)) 0) 1 5) 1 6)").unwrap();
        assert_eq!(
            value.to_term().to_string(),
            "(store ((as const (Array Int Int)) 0) 1 6)"
        );
    }

    #[test]
    fn floating_point_terms() {
        assert_eq!(
            eval("(fp.isNegative (fp.div RTZ (fp #b0 #b01111111 #b00000000000000000000000) (_ -zero 8 24)))"),
            Some(Val::Bool(true))
        );
        assert_eq!(
            eval("(fp.eq (_ +zero 8 24) (_ -zero 8 24))"),
            Some(Val::Bool(true))
        );
        assert_eq!(
            eval("(= (_ +zero 8 24) (_ -zero 8 24))"),
            Some(Val::Bool(false))
        );
        assert_eq!(eval("(fp.lt (_ NaN 8 24) (_ +oo 8 24))"), Some(Val::Bool(false)));
        assert_eq!(eval("(fp.to_real (_ +oo 8 24))"), None);
        assert_eq!(eval("((_ fp.to_ubv 8) RNE (_ NaN 8 24))"), None);
        assert_eq!(
            eval("(fp.to_ieee_bv (fp #b1 #b01111111 #b00000000000000000000000))"),
            Some(bv(0xbf80_0000, 32))
        );
    }

    #[test]
    fn model_definitions_and_parameters() {
        let definitions = vec![
            Definition {
                name: "x".into(),
                params: vec![],
                sort: Sort::Int,
                body: Term::int(4),
            },
            Definition {
                name: "f".into(),
                params: vec![("x!0".into(), Sort::Int)],
                sort: Sort::Int,
                body: term("(ite (= x!0 1) 10 20)"),
            },
        ];
        let evaluator = Evaluator::new(&definitions);
        assert_eq!(
            evaluator.evaluate(&term("(+ x (f 1) (f x))")),
            Some(Val::Int(BigInt::from(34)))
        );
        assert_eq!(evaluator.evaluate(&term("(+ x y)")), None);
        assert_eq!(evaluator.evaluate(&term("(f 1 2)")), None);
        let quantified = Term::Exists(vec![("z".into(), Sort::Int)], Box::new(Term::BoolLit(true)));
        assert_eq!(evaluator.evaluate(&quantified), None);
    }
}
