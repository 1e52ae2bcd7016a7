//! Reading SMT-LIB2 text back into the AST.
//!
//! Solvers answer in S-expressions: check-sat results, `(get-model)` blocks
//! and `(error "...")` reports. [`parse_sexprs`] tokenizes that output;
//! [`read_sort`] and [`read_term`] turn the value forms solvers print in
//! models (literals, `ite` chains over parameters, constant arrays, stores)
//! into [`Sort`]s and [`Term`]s. Anything outside that fragment is reported
//! as [`ReadError::Unsupported`] rather than guessed at.

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{Num, Zero};
use thiserror::Error;

use crate::sort::{RoundingMode, Sort};
use crate::term::Term;

/// A parsed S-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SExpr {
    /// Bare token: numeral, keyword, reserved word or simple symbol
    Atom(String),
    /// `|quoted symbol|`, contents without the bars
    Symbol(String),
    /// String literal, already unescaped
    Str(String),
    List(Vec<SExpr>),
}

impl SExpr {
    /// Symbol name of an atom or quoted symbol.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            SExpr::Atom(name) | SExpr::Symbol(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[SExpr]> {
        match self {
            SExpr::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is the bare atom `word`.
    pub fn is_atom(&self, word: &str) -> bool {
        matches!(self, SExpr::Atom(a) if a == word)
    }
}

impl fmt::Display for SExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SExpr::Atom(a) => write!(f, "{a}"),
            SExpr::Symbol(s) => write!(f, "|{s}|"),
            SExpr::Str(s) => write!(f, "{}", crate::formatter::escape_string(s)),
            SExpr::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unbalanced ')' at byte {0}")]
    UnbalancedClose(usize),
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated quoted symbol")]
    UnterminatedSymbol,
    #[error("malformed {what}: {text}")]
    Malformed { what: &'static str, text: String },
    #[error("unsupported expression: {0}")]
    Unsupported(String),
}

fn malformed(what: &'static str, expr: &SExpr) -> ReadError {
    ReadError::Malformed {
        what,
        text: expr.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

/// Parse every top-level S-expression in `input`. `;` comments are skipped.
pub fn parse_sexprs(input: &str) -> Result<Vec<SExpr>, ReadError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut pos = 0;
    let mut stack: Vec<Vec<SExpr>> = vec![Vec::new()];

    while pos < chars.len() {
        let (offset, c) = chars[pos];
        match c {
            _ if c.is_whitespace() => pos += 1,
            ';' => {
                while pos < chars.len() && chars[pos].1 != '\n' {
                    pos += 1;
                }
            }
            '(' => {
                stack.push(Vec::new());
                pos += 1;
            }
            ')' => {
                if stack.len() < 2 {
                    return Err(ReadError::UnbalancedClose(offset));
                }
                let items = stack.pop().unwrap_or_default();
                push_item(&mut stack, SExpr::List(items));
                pos += 1;
            }
            '"' => {
                let mut raw = String::new();
                pos += 1;
                loop {
                    let Some(&(_, c)) = chars.get(pos) else {
                        return Err(ReadError::UnterminatedString);
                    };
                    pos += 1;
                    if c == '"' {
                        if chars.get(pos).map(|&(_, c)| c) == Some('"') {
                            raw.push('"');
                            pos += 1;
                        } else {
                            break;
                        }
                    } else {
                        raw.push(c);
                    }
                }
                push_item(&mut stack, SExpr::Str(unescape_string(&raw)));
            }
            '|' => {
                let mut name = String::new();
                pos += 1;
                loop {
                    let Some(&(_, c)) = chars.get(pos) else {
                        return Err(ReadError::UnterminatedSymbol);
                    };
                    pos += 1;
                    if c == '|' {
                        break;
                    }
                    name.push(c);
                }
                push_item(&mut stack, SExpr::Symbol(name));
            }
            _ => {
                let mut atom = String::new();
                while let Some(&(_, c)) = chars.get(pos) {
                    if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '|') {
                        break;
                    }
                    atom.push(c);
                    pos += 1;
                }
                push_item(&mut stack, SExpr::Atom(atom));
            }
        }
    }

    if stack.len() != 1 {
        return Err(ReadError::UnexpectedEof);
    }
    Ok(stack.pop().unwrap_or_default())
}

fn push_item(stack: &mut [Vec<SExpr>], item: SExpr) {
    if let Some(top) = stack.last_mut() {
        top.push(item);
    }
}

/// Resolve `\u{h..}` and `\uhhhh` escapes; other backslashes stay literal.
pub fn unescape_string(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\'
            && chars.get(i + 1) == Some(&'u')
            && let Some((c, used)) = read_unicode_escape(&chars[i + 2..])
        {
            out.push(c);
            i += 2 + used;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn read_unicode_escape(rest: &[char]) -> Option<(char, usize)> {
    let (digits, used): (String, usize) = if rest.first() == Some(&'{') {
        let close = rest.iter().position(|&c| c == '}')?;
        if !(2..=6).contains(&close) {
            return None;
        }
        (rest[1..close].iter().collect(), close + 1)
    } else {
        if rest.len() < 4 {
            return None;
        }
        (rest[..4].iter().collect(), 4)
    };
    let code = u32::from_str_radix(&digits, 16).ok()?;
    Some((char::from_u32(code)?, used))
}

// ---------------------------------------------------------------------------
// Sorts
// ---------------------------------------------------------------------------

pub fn read_sort(expr: &SExpr) -> Result<Sort, ReadError> {
    match expr {
        SExpr::Atom(name) => Ok(match name.as_str() {
            "Bool" => Sort::Bool,
            "Int" => Sort::Int,
            "Real" => Sort::Real,
            "String" => Sort::String,
            "RegLan" => Sort::RegLan,
            "RoundingMode" => Sort::RoundingMode,
            "Float16" => Sort::Float(5, 11),
            "Float32" => Sort::Float(8, 24),
            "Float64" => Sort::Float(11, 53),
            "Float128" => Sort::Float(15, 113),
            other => Sort::Uninterpreted(other.to_string()),
        }),
        SExpr::Symbol(name) => Ok(Sort::Uninterpreted(name.clone())),
        SExpr::List(items) => match items.as_slice() {
            [underscore, kind, width] if underscore.is_atom("_") && kind.is_atom("BitVec") => {
                Ok(Sort::BitVec(read_index(width)?))
            }
            [underscore, kind, e, s] if underscore.is_atom("_") && kind.is_atom("FloatingPoint") => {
                Ok(Sort::Float(read_index(e)?, read_index(s)?))
            }
            [array, index, element] if array.is_atom("Array") => {
                Ok(Sort::array(read_sort(index)?, read_sort(element)?))
            }
            _ => Err(ReadError::Unsupported(expr.to_string())),
        },
        SExpr::Str(_) => Err(malformed("sort", expr)),
    }
}

fn read_index(expr: &SExpr) -> Result<u32, ReadError> {
    match expr {
        SExpr::Atom(text) => text.parse().map_err(|_| malformed("index", expr)),
        _ => Err(malformed("index", expr)),
    }
}

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

fn read_numeral(text: &str) -> Option<BigInt> {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().ok()
    } else {
        None
    }
}

fn read_decimal(text: &str) -> Option<BigRational> {
    let (int, frac) = text.split_once('.')?;
    let numer = read_numeral(&format!("{int}{frac}"))?;
    let denom = num_traits::pow(BigInt::from(10), frac.len());
    Some(BigRational::new(numer, denom))
}

fn read_bit_literal(text: &str) -> Option<(BigUint, u32)> {
    if let Some(bits) = text.strip_prefix("#b") {
        let value = BigUint::from_str_radix(bits, 2).ok()?;
        Some((value, u32::try_from(bits.len()).ok()?))
    } else if let Some(hex) = text.strip_prefix("#x") {
        let value = BigUint::from_str_radix(hex, 16).ok()?;
        Some((value, u32::try_from(hex.len() * 4).ok()?))
    } else {
        None
    }
}

fn read_atom(text: &str) -> Term {
    if let Some(n) = read_numeral(text) {
        return Term::IntLit(n);
    }
    if let Some(r) = read_decimal(text) {
        return Term::RealLit(r);
    }
    if let Some((value, width)) = read_bit_literal(text) {
        return Term::BitVecLit(BigInt::from(value), width);
    }
    if let Ok(rm) = text.parse::<RoundingMode>() {
        return Term::RoundingMode(rm);
    }
    match text {
        "true" => Term::BoolLit(true),
        "false" => Term::BoolLit(false),
        "re.none" => Term::ReNone,
        "re.all" => Term::ReAll,
        "re.allchar" => Term::ReAllChar,
        _ => Term::Const(text.to_string()),
    }
}

fn as_rational(term: &Term) -> Option<BigRational> {
    match term {
        Term::IntLit(n) => Some(BigRational::from_integer(n.clone())),
        Term::RealLit(r) => Some(r.clone()),
        _ => None,
    }
}

fn boxed(term: Term) -> Box<Term> {
    Box::new(term)
}

/// Read a term as printed in solver models.
pub fn read_term(expr: &SExpr) -> Result<Term, ReadError> {
    match expr {
        SExpr::Atom(text) => Ok(read_atom(text)),
        SExpr::Symbol(name) => Ok(Term::Const(name.clone())),
        SExpr::Str(text) => Ok(Term::StringLit(text.clone())),
        SExpr::List(items) => read_list(expr, items),
    }
}

fn read_indexed(expr: &SExpr, items: &[SExpr]) -> Result<Term, ReadError> {
    let name = items.get(1).and_then(SExpr::as_symbol).unwrap_or_default();
    if let Some(value) = name.strip_prefix("bv")
        && let Some(value) = read_numeral(value)
        && let [_, _, width] = items
    {
        return Ok(Term::BitVecLit(value, read_index(width)?));
    }
    let [_, _, e, s] = items else {
        return Err(ReadError::Unsupported(expr.to_string()));
    };
    let (e, s) = (read_index(e)?, read_index(s)?);
    match name {
        "+zero" => Ok(Term::FpPosZero(e, s)),
        "-zero" => Ok(Term::FpNegZero(e, s)),
        "+oo" => Ok(Term::FpPosInf(e, s)),
        "-oo" => Ok(Term::FpNegInf(e, s)),
        "NaN" => Ok(Term::FpNaN(e, s)),
        _ => Err(ReadError::Unsupported(expr.to_string())),
    }
}

type Unary = fn(Box<Term>) -> Term;
type Binary = fn(Box<Term>, Box<Term>) -> Term;
type Ternary = fn(Box<Term>, Box<Term>, Box<Term>) -> Term;

fn unary(op: &str) -> Option<Unary> {
    Some(match op {
        "not" => Term::Not,
        "bvneg" => Term::BvNeg,
        "bvnot" => Term::BvNot,
        "bv2nat" | "bv2int" => Term::Bv2Int,
        "to_real" => Term::ToReal,
        "fp.abs" => Term::FpAbs,
        "fp.neg" => Term::FpNeg,
        "fp.isNaN" => Term::FpIsNaN,
        "fp.isInfinite" => Term::FpIsInfinite,
        "fp.isZero" => Term::FpIsZero,
        "fp.isNormal" => Term::FpIsNormal,
        "fp.isSubnormal" => Term::FpIsSubnormal,
        "fp.isNegative" => Term::FpIsNegative,
        "fp.isPositive" => Term::FpIsPositive,
        "fp.to_real" => Term::FpToReal,
        "fp.to_ieee_bv" => Term::FpToIeeeBv,
        "str.len" => Term::StrLen,
        "str.to_re" => Term::StrToRe,
        "seq.len" => Term::SeqLen,
        "seq.to.re" => Term::SeqToRe,
        "re.*" => Term::ReStar,
        "re.+" => Term::RePlus,
        "re.opt" => Term::ReOpt,
        "re.comp" => Term::ReComp,
        _ => return None,
    })
}

fn binary(op: &str) -> Option<Binary> {
    Some(match op {
        "=>" => Term::Implies,
        "xor" => Term::Xor,
        "=" => Term::Eq,
        "<" => Term::Lt,
        "<=" => Term::Le,
        ">" => Term::Gt,
        ">=" => Term::Ge,
        "-" => Term::Sub,
        "*" => Term::Mul,
        "div" => Term::IntDiv,
        "mod" => Term::IntMod,
        "select" => Term::Select,
        "bvadd" => Term::BvAdd,
        "bvsub" => Term::BvSub,
        "bvmul" => Term::BvMul,
        "bvudiv" => Term::BvUDiv,
        "bvsdiv" => Term::BvSDiv,
        "bvurem" => Term::BvURem,
        "bvsrem" => Term::BvSRem,
        "bvand" => Term::BvAnd,
        "bvor" => Term::BvOr,
        "bvxor" => Term::BvXor,
        "bvshl" => Term::BvShl,
        "bvlshr" => Term::BvLShr,
        "bvashr" => Term::BvAShr,
        "bvult" => Term::BvULt,
        "bvule" => Term::BvULe,
        "bvugt" => Term::BvUGt,
        "bvuge" => Term::BvUGe,
        "bvslt" => Term::BvSLt,
        "bvsle" => Term::BvSLe,
        "bvsgt" => Term::BvSGt,
        "bvsge" => Term::BvSGe,
        "concat" => Term::Concat,
        "fp.sqrt" => Term::FpSqrt,
        "fp.roundToIntegral" => Term::FpRoundToIntegral,
        "fp.eq" => Term::FpEq,
        "fp.lt" => Term::FpLt,
        "fp.leq" => Term::FpLeq,
        "fp.gt" => Term::FpGt,
        "fp.geq" => Term::FpGeq,
        "str.at" => Term::StrAt,
        "str.contains" => Term::StrContains,
        "str.prefixof" => Term::StrPrefixOf,
        "str.suffixof" => Term::StrSuffixOf,
        "str.in_re" | "str.in.re" => Term::StrInRe,
        "re.range" => Term::ReRange,
        "seq.at" => Term::SeqAt,
        "seq.contains" => Term::SeqContains,
        "seq.prefixof" => Term::SeqPrefixOf,
        "seq.suffixof" => Term::SeqSuffixOf,
        "seq.in.re" => Term::SeqInRe,
        _ => return None,
    })
}

fn ternary(op: &str) -> Option<Ternary> {
    Some(match op {
        "ite" => Term::Ite,
        "store" => Term::Store,
        "fp.add" => Term::FpAdd,
        "fp.sub" => Term::FpSub,
        "fp.mul" => Term::FpMul,
        "fp.div" => Term::FpDiv,
        "str.substr" => Term::StrSubstr,
        "str.replace" => Term::StrReplace,
        "str.indexof" => Term::StrIndexOf,
        "seq.extract" => Term::SeqExtract,
        "seq.replace" => Term::SeqReplace,
        "seq.indexof" => Term::SeqIndexOf,
        _ => return None,
    })
}

fn nary(op: &str) -> Option<fn(Vec<Term>) -> Term> {
    Some(match op {
        "and" => Term::And,
        "or" => Term::Or,
        "distinct" => Term::Distinct,
        "+" => Term::Add,
        "str.++" => Term::StrConcat,
        "seq.++" => Term::SeqConcat,
        "re.++" => Term::ReConcat,
        "re.union" => Term::ReUnion,
        _ => return None,
    })
}

/// `((_ name i..) args..)`
fn read_indexed_app(expr: &SExpr, head: &[SExpr], args: &[Term]) -> Result<Term, ReadError> {
    let name = head.get(1).and_then(SExpr::as_symbol).unwrap_or_default();
    let indices = head[2..]
        .iter()
        .map(read_index)
        .collect::<Result<Vec<_>, _>>()?;
    let b = |t: &Term| boxed(t.clone());
    let term = match (name, indices.as_slice(), args) {
        ("extract", [hi, lo], [x]) => Term::Extract(*hi, *lo, b(x)),
        ("zero_extend", [n], [x]) => Term::ZeroExtend(*n, b(x)),
        ("sign_extend", [n], [x]) => Term::SignExtend(*n, b(x)),
        ("int2bv", [n], [x]) => Term::Int2Bv(*n, b(x)),
        ("to_fp", [e, s], [bits]) => Term::FpFromIeeeBv(*e, *s, b(bits)),
        ("to_fp", [e, s], [rm, x]) => Term::ToFp(*e, *s, b(rm), b(x)),
        ("to_fp_unsigned", [e, s], [rm, x]) => Term::ToFpUnsigned(*e, *s, b(rm), b(x)),
        ("fp.to_ubv", [w], [rm, x]) => Term::FpToUbv(*w, b(rm), b(x)),
        ("fp.to_sbv", [w], [rm, x]) => Term::FpToSbv(*w, b(rm), b(x)),
        _ => return Err(ReadError::Unsupported(expr.to_string())),
    };
    Ok(term)
}

fn read_list(expr: &SExpr, items: &[SExpr]) -> Result<Term, ReadError> {
    let Some(head) = items.first() else {
        return Err(malformed("term", expr));
    };
    if head.is_atom("_") {
        return read_indexed(expr, items);
    }
    if let Some(op) = head.as_symbol()
        && matches!(op, "forall" | "exists" | "let" | "lambda" | "match" | "!")
    {
        return Err(ReadError::Unsupported(expr.to_string()));
    }

    let args = items[1..]
        .iter()
        .map(read_term)
        .collect::<Result<Vec<_>, _>>()?;

    if let SExpr::List(inner) = head {
        return match (inner.as_slice(), args.as_slice()) {
            // ((as const (Array I E)) v)
            ([as_kw, const_kw, sort], [value])
                if as_kw.is_atom("as") && const_kw.is_atom("const") =>
            {
                Ok(Term::ConstArray(read_sort(sort)?, boxed(value.clone())))
            }
            ([under, ..], _) if under.is_atom("_") => read_indexed_app(expr, inner, &args),
            _ => Err(ReadError::Unsupported(expr.to_string())),
        };
    }

    let op = head.as_symbol().ok_or_else(|| malformed("operator", head))?;
    let term = match (op, args.as_slice()) {
        ("-", [x]) => match x {
            Term::IntLit(n) => Term::IntLit(-n),
            Term::RealLit(r) => Term::RealLit(-r),
            _ => Term::Neg(boxed(x.clone())),
        },
        ("/", [a, b]) => match (as_rational(a), as_rational(b)) {
            (Some(n), Some(d)) if !d.is_zero() => Term::RealLit(n / d),
            _ => Term::RealDiv(boxed(a.clone()), boxed(b.clone())),
        },
        ("fp", [Term::BitVecLit(sign, 1), Term::BitVecLit(exp, eb), Term::BitVecLit(sig, tb)]) => {
            Term::FpFromBits(
                !sign.is_zero(),
                exp.magnitude().clone(),
                sig.magnitude().clone(),
                *eb,
                tb + 1,
            )
        }
        ("*", [first, rest @ ..]) if !rest.is_empty() => rest.iter().fold(first.clone(), |acc, x| {
            Term::Mul(boxed(acc), boxed(x.clone()))
        }),
        _ => return Ok(read_application(op, args)),
    };
    Ok(term)
}

fn read_application(op: &str, args: Vec<Term>) -> Term {
    let b = |t: &Term| boxed(t.clone());
    let made = match args.as_slice() {
        [x] => unary(op).map(|make| make(b(x))),
        [x, y] => binary(op).map(|make| make(b(x), b(y))),
        [x, y, z] => ternary(op).map(|make| make(b(x), b(y), b(z))),
        _ => None,
    };
    match (made, nary(op)) {
        (Some(term), _) => term,
        (None, Some(make)) => make(args),
        (None, None) => Term::App(op.to_string(), args),
    }
}

/// Adjust integer-looking literals to a `Real`-sorted position.
pub fn coerce_to_sort(term: Term, sort: &Sort) -> Term {
    match (term, sort) {
        (Term::IntLit(n), Sort::Real) => Term::RealLit(BigRational::from_integer(n)),
        (Term::Ite(c, t, e), _) => Term::Ite(
            c,
            boxed(coerce_to_sort(*t, sort)),
            boxed(coerce_to_sort(*e, sort)),
        ),
        (term, _) => term,
    }
}
