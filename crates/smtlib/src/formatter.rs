//! SMT-LIB2 text formatting for AST types.
//!
//! Implements `Display` for [`Sort`], [`Term`], [`Command`], and [`Script`],
//! producing SMT-LIB 2.6 output accepted by Z3, CVC5 and Yices.

use std::borrow::Cow;
use std::fmt;

use num_bigint::BigUint;
use num_rational::BigRational;
use num_traits::{One, Signed};

use crate::command::Command;
use crate::script::Script;
use crate::sort::Sort;
use crate::term::Term;

/// Words that may never appear as bare symbols.
const RESERVED_WORDS: &[&str] = &[
    "_",
    "!",
    "as",
    "let",
    "exists",
    "forall",
    "match",
    "par",
    "BINARY",
    "DECIMAL",
    "HEXADECIMAL",
    "NUMERAL",
    "STRING",
];

// ---------------------------------------------------------------------------
// Symbols and literals
// ---------------------------------------------------------------------------

fn is_simple_symbol(name: &str) -> bool {
    const EXTRA: &str = "~!@$%^&*_-+=<>.?/";
    let mut chars = name.chars();
    match chars.next() {
        None => false,
        Some(c) if c.is_ascii_digit() => false,
        Some(c) => {
            (c.is_ascii_alphanumeric() || EXTRA.contains(c))
                && chars.all(|c| c.is_ascii_alphanumeric() || EXTRA.contains(c))
                && !RESERVED_WORDS.contains(&name)
        }
    }
}

/// Render a symbol, wrapping it in `|...|` when it is not a simple symbol.
pub fn quote_symbol(name: &str) -> Cow<'_, str> {
    if is_simple_symbol(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("|{name}|"))
    }
}

/// Render a string literal body: `"` doubles, anything outside printable
/// ASCII (and the backslash) becomes a `\u{..}` escape.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\u{5c}"),
            ' '..='~' => out.push(c),
            _ => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
        }
    }
    out.push('"');
    out
}

fn fmt_real_lit(value: &BigRational, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let magnitude = value.abs();
    let body = if magnitude.denom().is_one() {
        format!("{}.0", magnitude.numer())
    } else {
        format!("(/ {}.0 {}.0)", magnitude.numer(), magnitude.denom())
    };
    if value.is_negative() {
        write!(f, "(- {body})")
    } else {
        write!(f, "{body}")
    }
}

fn fmt_binary_digits(value: &BigUint, width: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#b{:0>width$}", value.to_str_radix(2), width = width as usize)
}

/// Write a binary SMT-LIB operator: `(op lhs rhs)`.
fn fmt_binop(op: &str, lhs: &Term, rhs: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({op} {lhs} {rhs})")
}

/// Write a unary SMT-LIB operator: `(op arg)`.
fn fmt_unop(op: &str, arg: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({op} {arg})")
}

fn fmt_ternop(op: &str, a: &Term, b: &Term, c: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({op} {a} {b} {c})")
}

fn fmt_nary(op: &str, terms: &[Term], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({op} ")?;
    fmt_term_list(terms, f)?;
    write!(f, ")")
}

/// Write sorted variable bindings: `((x Sort) (y Sort) ...)`.
fn fmt_sorted_vars(vars: &[(String, Sort)], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "(")?;
    for (i, (name, sort)) in vars.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "({} {sort})", quote_symbol(name))?;
    }
    write!(f, ")")
}

/// Write a space-separated list of terms.
fn fmt_term_list(terms: &[Term], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{t}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::Int => write!(f, "Int"),
            Sort::Real => write!(f, "Real"),
            Sort::BitVec(width) => write!(f, "(_ BitVec {width})"),
            Sort::Array(index, element) => write!(f, "(Array {index} {element})"),
            Sort::Float(e, s) => write!(f, "(_ FloatingPoint {e} {s})"),
            Sort::String => write!(f, "String"),
            Sort::RegLan => write!(f, "RegLan"),
            Sort::RoundingMode => write!(f, "RoundingMode"),
            Sort::Uninterpreted(name) => write!(f, "{}", quote_symbol(name)),
        }
    }
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // --- Literals ---
            Term::BoolLit(true) => write!(f, "true"),
            Term::BoolLit(false) => write!(f, "false"),
            Term::IntLit(n) => {
                if n.is_negative() {
                    // SMT-LIB represents negative integers as `(- N)`
                    write!(f, "(- {})", n.abs())
                } else {
                    write!(f, "{n}")
                }
            }
            Term::RealLit(r) => fmt_real_lit(r, f),
            Term::BitVecLit(value, width) => write!(f, "(_ bv{value} {width})"),
            Term::StringLit(s) => write!(f, "{}", escape_string(s)),

            // --- Variables ---
            Term::Const(name) => write!(f, "{}", quote_symbol(name)),

            // --- Boolean operations ---
            Term::Not(inner) => fmt_unop("not", inner, f),
            Term::And(terms) => match terms.as_slice() {
                [] => write!(f, "true"),
                _ => fmt_nary("and", terms, f),
            },
            Term::Or(terms) => match terms.as_slice() {
                [] => write!(f, "false"),
                _ => fmt_nary("or", terms, f),
            },
            Term::Xor(lhs, rhs) => fmt_binop("xor", lhs, rhs, f),
            Term::Implies(lhs, rhs) => fmt_binop("=>", lhs, rhs, f),
            Term::Iff(lhs, rhs) => fmt_binop("=", lhs, rhs, f),

            // --- Core ---
            Term::Eq(lhs, rhs) => fmt_binop("=", lhs, rhs, f),
            Term::Distinct(terms) => fmt_nary("distinct", terms, f),
            Term::Ite(cond, then_branch, else_branch) => {
                fmt_ternop("ite", cond, then_branch, else_branch, f)
            }

            // --- Bitvector arithmetic ---
            Term::BvAdd(a, b) => fmt_binop("bvadd", a, b, f),
            Term::BvSub(a, b) => fmt_binop("bvsub", a, b, f),
            Term::BvMul(a, b) => fmt_binop("bvmul", a, b, f),
            Term::BvSDiv(a, b) => fmt_binop("bvsdiv", a, b, f),
            Term::BvUDiv(a, b) => fmt_binop("bvudiv", a, b, f),
            Term::BvSRem(a, b) => fmt_binop("bvsrem", a, b, f),
            Term::BvURem(a, b) => fmt_binop("bvurem", a, b, f),
            Term::BvNeg(a) => fmt_unop("bvneg", a, f),

            // --- Bitvector comparison ---
            Term::BvSLt(a, b) => fmt_binop("bvslt", a, b, f),
            Term::BvSLe(a, b) => fmt_binop("bvsle", a, b, f),
            Term::BvSGt(a, b) => fmt_binop("bvsgt", a, b, f),
            Term::BvSGe(a, b) => fmt_binop("bvsge", a, b, f),
            Term::BvULt(a, b) => fmt_binop("bvult", a, b, f),
            Term::BvULe(a, b) => fmt_binop("bvule", a, b, f),
            Term::BvUGt(a, b) => fmt_binop("bvugt", a, b, f),
            Term::BvUGe(a, b) => fmt_binop("bvuge", a, b, f),

            // --- Bitvector bitwise ---
            Term::BvAnd(a, b) => fmt_binop("bvand", a, b, f),
            Term::BvOr(a, b) => fmt_binop("bvor", a, b, f),
            Term::BvXor(a, b) => fmt_binop("bvxor", a, b, f),
            Term::BvNot(a) => fmt_unop("bvnot", a, f),
            Term::BvShl(a, b) => fmt_binop("bvshl", a, b, f),
            Term::BvLShr(a, b) => fmt_binop("bvlshr", a, b, f),
            Term::BvAShr(a, b) => fmt_binop("bvashr", a, b, f),

            // --- Bitvector conversion ---
            Term::ZeroExtend(n, a) => write!(f, "((_ zero_extend {n}) {a})"),
            Term::SignExtend(n, a) => write!(f, "((_ sign_extend {n}) {a})"),
            Term::Extract(hi, lo, a) => write!(f, "((_ extract {hi} {lo}) {a})"),
            Term::Concat(a, b) => fmt_binop("concat", a, b, f),
            Term::Bv2Int(a) => fmt_unop("bv2int", a, f),
            Term::Int2Bv(n, a) => write!(f, "((_ int2bv {n}) {a})"),

            // --- Arithmetic ---
            Term::Add(terms) => match terms.as_slice() {
                [] => write!(f, "0"),
                [single] => write!(f, "{single}"),
                _ => fmt_nary("+", terms, f),
            },
            Term::Sub(a, b) => fmt_binop("-", a, b, f),
            Term::Mul(a, b) => fmt_binop("*", a, b, f),
            Term::Neg(a) => fmt_unop("-", a, f),
            Term::IntDiv(a, b) => fmt_binop("div", a, b, f),
            Term::IntMod(a, b) => fmt_binop("mod", a, b, f),
            Term::RealDiv(a, b) => fmt_binop("/", a, b, f),
            Term::ToReal(a) => fmt_unop("to_real", a, f),
            Term::Lt(a, b) => fmt_binop("<", a, b, f),
            Term::Le(a, b) => fmt_binop("<=", a, b, f),
            Term::Gt(a, b) => fmt_binop(">", a, b, f),
            Term::Ge(a, b) => fmt_binop(">=", a, b, f),

            // --- Array operations ---
            Term::Select(arr, idx) => fmt_binop("select", arr, idx, f),
            Term::Store(arr, idx, val) => fmt_ternop("store", arr, idx, val, f),
            Term::ConstArray(sort, value) => write!(f, "((as const {sort}) {value})"),

            // --- Quantifiers ---
            Term::Forall(vars, body) => {
                write!(f, "(forall ")?;
                fmt_sorted_vars(vars, f)?;
                write!(f, " {body})")
            }
            Term::Exists(vars, body) => {
                write!(f, "(exists ")?;
                fmt_sorted_vars(vars, f)?;
                write!(f, " {body})")
            }

            // --- Function application ---
            Term::App(name, args) => {
                if args.is_empty() {
                    write!(f, "{}", quote_symbol(name))
                } else {
                    fmt_nary(&quote_symbol(name), args, f)
                }
            }

            // --- Floating-point literals ---
            Term::FpNaN(e, s) => write!(f, "(_ NaN {e} {s})"),
            Term::FpPosInf(e, s) => write!(f, "(_ +oo {e} {s})"),
            Term::FpNegInf(e, s) => write!(f, "(_ -oo {e} {s})"),
            Term::FpPosZero(e, s) => write!(f, "(_ +zero {e} {s})"),
            Term::FpNegZero(e, s) => write!(f, "(_ -zero {e} {s})"),
            Term::FpFromBits(sign, exponent, significand, e, s) => {
                write!(f, "(fp #b{} ", u8::from(*sign))?;
                fmt_binary_digits(exponent, *e, f)?;
                write!(f, " ")?;
                fmt_binary_digits(significand, s.saturating_sub(1), f)?;
                write!(f, ")")
            }
            Term::RoundingMode(rm) => write!(f, "{rm}"),

            // --- Floating-point arithmetic ---
            Term::FpAdd(rm, a, b) => fmt_ternop("fp.add", rm, a, b, f),
            Term::FpSub(rm, a, b) => fmt_ternop("fp.sub", rm, a, b, f),
            Term::FpMul(rm, a, b) => fmt_ternop("fp.mul", rm, a, b, f),
            Term::FpDiv(rm, a, b) => fmt_ternop("fp.div", rm, a, b, f),
            Term::FpSqrt(rm, a) => fmt_binop("fp.sqrt", rm, a, f),
            Term::FpRoundToIntegral(rm, a) => fmt_binop("fp.roundToIntegral", rm, a, f),
            Term::FpAbs(a) => fmt_unop("fp.abs", a, f),
            Term::FpNeg(a) => fmt_unop("fp.neg", a, f),

            // --- Floating-point comparison ---
            Term::FpEq(a, b) => fmt_binop("fp.eq", a, b, f),
            Term::FpLt(a, b) => fmt_binop("fp.lt", a, b, f),
            Term::FpLeq(a, b) => fmt_binop("fp.leq", a, b, f),
            Term::FpGt(a, b) => fmt_binop("fp.gt", a, b, f),
            Term::FpGeq(a, b) => fmt_binop("fp.geq", a, b, f),

            // --- Floating-point predicates ---
            Term::FpIsNaN(a) => fmt_unop("fp.isNaN", a, f),
            Term::FpIsInfinite(a) => fmt_unop("fp.isInfinite", a, f),
            Term::FpIsZero(a) => fmt_unop("fp.isZero", a, f),
            Term::FpIsNormal(a) => fmt_unop("fp.isNormal", a, f),
            Term::FpIsSubnormal(a) => fmt_unop("fp.isSubnormal", a, f),
            Term::FpIsNegative(a) => fmt_unop("fp.isNegative", a, f),
            Term::FpIsPositive(a) => fmt_unop("fp.isPositive", a, f),

            // --- Floating-point conversion ---
            Term::ToFp(e, s, rm, a) => write!(f, "((_ to_fp {e} {s}) {rm} {a})"),
            Term::ToFpUnsigned(e, s, rm, a) => {
                write!(f, "((_ to_fp_unsigned {e} {s}) {rm} {a})")
            }
            Term::FpFromIeeeBv(e, s, a) => write!(f, "((_ to_fp {e} {s}) {a})"),
            Term::FpToUbv(w, rm, a) => write!(f, "((_ fp.to_ubv {w}) {rm} {a})"),
            Term::FpToSbv(w, rm, a) => write!(f, "((_ fp.to_sbv {w}) {rm} {a})"),
            Term::FpToReal(a) => fmt_unop("fp.to_real", a, f),
            Term::FpToIeeeBv(a) => fmt_unop("fp.to_ieee_bv", a, f),

            // --- Strings ---
            Term::StrConcat(terms) => match terms.as_slice() {
                [] => write!(f, "\"\""),
                [single] => write!(f, "{single}"),
                _ => fmt_nary("str.++", terms, f),
            },
            Term::StrLen(a) => fmt_unop("str.len", a, f),
            Term::StrSubstr(s, i, n) => fmt_ternop("str.substr", s, i, n, f),
            Term::StrAt(s, i) => fmt_binop("str.at", s, i, f),
            Term::StrReplace(s, p, r) => fmt_ternop("str.replace", s, p, r, f),
            Term::StrIndexOf(s, p, i) => fmt_ternop("str.indexof", s, p, i, f),
            Term::StrContains(s, p) => fmt_binop("str.contains", s, p, f),
            Term::StrPrefixOf(p, s) => fmt_binop("str.prefixof", p, s, f),
            Term::StrSuffixOf(p, s) => fmt_binop("str.suffixof", p, s, f),
            Term::StrInRe(s, r) => fmt_binop("str.in_re", s, r, f),
            Term::StrToRe(s) => fmt_unop("str.to_re", s, f),

            // --- Regular languages ---
            Term::ReNone => write!(f, "re.none"),
            Term::ReAll => write!(f, "re.all"),
            Term::ReAllChar => write!(f, "re.allchar"),
            Term::ReStar(r) => fmt_unop("re.*", r, f),
            Term::RePlus(r) => fmt_unop("re.+", r, f),
            Term::ReOpt(r) => fmt_unop("re.opt", r, f),
            Term::ReConcat(terms) => fmt_nary("re.++", terms, f),
            Term::ReUnion(terms) => fmt_nary("re.union", terms, f),
            Term::ReComp(r) => fmt_unop("re.comp", r, f),
            Term::ReRange(lo, hi) => fmt_binop("re.range", lo, hi, f),

            // --- Sequences ---
            Term::SeqConcat(terms) => match terms.as_slice() {
                [] => write!(f, "\"\""),
                [single] => write!(f, "{single}"),
                _ => fmt_nary("seq.++", terms, f),
            },
            Term::SeqLen(a) => fmt_unop("seq.len", a, f),
            Term::SeqExtract(s, i, n) => fmt_ternop("seq.extract", s, i, n, f),
            Term::SeqAt(s, i) => fmt_binop("seq.at", s, i, f),
            Term::SeqReplace(s, p, r) => fmt_ternop("seq.replace", s, p, r, f),
            Term::SeqIndexOf(s, p, i) => fmt_ternop("seq.indexof", s, p, i, f),
            Term::SeqContains(s, p) => fmt_binop("seq.contains", s, p, f),
            Term::SeqPrefixOf(p, s) => fmt_binop("seq.prefixof", p, s, f),
            Term::SeqSuffixOf(p, s) => fmt_binop("seq.suffixof", p, s, f),
            Term::SeqInRe(s, r) => fmt_binop("seq.in.re", s, r, f),
            Term::SeqToRe(s) => fmt_unop("seq.to.re", s, f),
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetLogic(logic) => write!(f, "(set-logic {logic})"),
            Command::SetOption(key, value) => write!(f, "(set-option :{key} {value})"),
            Command::DeclareSort(name, arity) => {
                write!(f, "(declare-sort {} {arity})", quote_symbol(name))
            }
            Command::DeclareConst(name, sort) => {
                write!(f, "(declare-const {} {sort})", quote_symbol(name))
            }
            Command::DeclareFun(name, param_sorts, return_sort) => {
                write!(f, "(declare-fun {} (", quote_symbol(name))?;
                for (i, s) in param_sorts.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{s}")?;
                }
                write!(f, ") {return_sort})")
            }
            Command::DefineFun(name, params, return_sort, body) => {
                write!(f, "(define-fun {} ", quote_symbol(name))?;
                fmt_sorted_vars(params, f)?;
                write!(f, " {return_sort} {body})")
            }
            Command::Assert(term) => write!(f, "(assert {term})"),
            Command::CheckSat => write!(f, "(check-sat)"),
            Command::GetModel => write!(f, "(get-model)"),
            Command::GetValue(terms) => {
                write!(f, "(get-value (")?;
                fmt_term_list(terms, f)?;
                write!(f, "))")
            }
            Command::Push(n) => write!(f, "(push {n})"),
            Command::Pop(n) => write!(f, "(pop {n})"),
            Command::Echo(msg) => write!(f, "(echo {})", escape_string(msg)),
            Command::Comment(text) => write!(f, ";; {text}"),
            Command::Exit => write!(f, "(exit)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cmd) in self.commands().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{cmd}")?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
