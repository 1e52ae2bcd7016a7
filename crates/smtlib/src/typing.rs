//! Sort inference for [`Term`]s.
//!
//! Only the operators' result sorts are computed; operands are checked where
//! the result sort depends on them (bitvector widths, array element sorts,
//! floating-point formats).

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use crate::sort::Sort;
use crate::term::Term;

/// Lookup of declared symbols: the sort of a constant or the result sort of
/// a function.
pub trait SymbolTable {
    fn sort_of(&self, name: &str) -> Option<Sort>;
}

impl SymbolTable for BTreeMap<String, Sort> {
    fn sort_of(&self, name: &str) -> Option<Sort> {
        self.get(name).cloned()
    }
}

impl SymbolTable for HashMap<String, Sort> {
    fn sort_of(&self, name: &str) -> Option<Sort> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("ill-sorted application of '{operator}': {detail}")]
    IllSorted {
        operator: &'static str,
        detail: String,
    },
}

fn ill_sorted(operator: &'static str, found: &Sort) -> TypeError {
    TypeError::IllSorted {
        operator,
        detail: format!("unexpected operand sort {found}"),
    }
}

/// Infer the sort of `term`, resolving free symbols through `symbols`.
pub fn infer_sort(term: &Term, symbols: &dyn SymbolTable) -> Result<Sort, TypeError> {
    let mut bound = Vec::new();
    infer(term, symbols, &mut bound)
}

fn bitvector_width(
    operator: &'static str,
    term: &Term,
    symbols: &dyn SymbolTable,
    bound: &mut Vec<(String, Sort)>,
) -> Result<u32, TypeError> {
    match infer(term, symbols, bound)? {
        Sort::BitVec(width) => Ok(width),
        other => Err(ill_sorted(operator, &other)),
    }
}

fn numeric_join(
    terms: &[&Term],
    symbols: &dyn SymbolTable,
    bound: &mut Vec<(String, Sort)>,
) -> Result<Sort, TypeError> {
    let mut result = Sort::Int;
    for term in terms {
        match infer(term, symbols, bound)? {
            Sort::Int => {}
            Sort::Real => result = Sort::Real,
            other => return Err(ill_sorted("arithmetic", &other)),
        }
    }
    Ok(result)
}

fn infer(
    term: &Term,
    symbols: &dyn SymbolTable,
    bound: &mut Vec<(String, Sort)>,
) -> Result<Sort, TypeError> {
    let sort = match term {
        Term::BoolLit(_) => Sort::Bool,
        Term::IntLit(_) => Sort::Int,
        Term::RealLit(_) => Sort::Real,
        Term::BitVecLit(_, width) => Sort::BitVec(*width),
        Term::StringLit(_) => Sort::String,

        Term::Const(name) => match bound.iter().rev().find(|(bound_name, _)| bound_name == name) {
            Some((_, sort)) => sort.clone(),
            None => symbols
                .sort_of(name)
                .ok_or_else(|| TypeError::UnknownSymbol(name.clone()))?,
        },
        Term::App(name, _) => symbols
            .sort_of(name)
            .ok_or_else(|| TypeError::UnknownSymbol(name.clone()))?,

        Term::Not(_)
        | Term::And(_)
        | Term::Or(_)
        | Term::Xor(..)
        | Term::Implies(..)
        | Term::Iff(..)
        | Term::Eq(..)
        | Term::Distinct(_)
        | Term::BvSLt(..)
        | Term::BvSLe(..)
        | Term::BvSGt(..)
        | Term::BvSGe(..)
        | Term::BvULt(..)
        | Term::BvULe(..)
        | Term::BvUGt(..)
        | Term::BvUGe(..)
        | Term::Lt(..)
        | Term::Le(..)
        | Term::Gt(..)
        | Term::Ge(..)
        | Term::FpEq(..)
        | Term::FpLt(..)
        | Term::FpLeq(..)
        | Term::FpGt(..)
        | Term::FpGeq(..)
        | Term::FpIsNaN(_)
        | Term::FpIsInfinite(_)
        | Term::FpIsZero(_)
        | Term::FpIsNormal(_)
        | Term::FpIsSubnormal(_)
        | Term::FpIsNegative(_)
        | Term::FpIsPositive(_)
        | Term::StrContains(..)
        | Term::StrPrefixOf(..)
        | Term::StrSuffixOf(..)
        | Term::StrInRe(..)
        | Term::SeqContains(..)
        | Term::SeqPrefixOf(..)
        | Term::SeqSuffixOf(..)
        | Term::SeqInRe(..) => Sort::Bool,

        Term::Forall(vars, body) | Term::Exists(vars, body) => {
            let depth = bound.len();
            bound.extend(vars.iter().cloned());
            let body_sort = infer(body, symbols, bound);
            bound.truncate(depth);
            match body_sort? {
                Sort::Bool => Sort::Bool,
                other => return Err(ill_sorted("quantifier", &other)),
            }
        }

        Term::Ite(_, then_branch, _) => infer(then_branch, symbols, bound)?,

        Term::BvAdd(a, _)
        | Term::BvSub(a, _)
        | Term::BvMul(a, _)
        | Term::BvSDiv(a, _)
        | Term::BvUDiv(a, _)
        | Term::BvSRem(a, _)
        | Term::BvURem(a, _)
        | Term::BvAnd(a, _)
        | Term::BvOr(a, _)
        | Term::BvXor(a, _)
        | Term::BvShl(a, _)
        | Term::BvLShr(a, _)
        | Term::BvAShr(a, _)
        | Term::BvNeg(a)
        | Term::BvNot(a) => Sort::BitVec(bitvector_width("bitvector", a, symbols, bound)?),
        Term::ZeroExtend(n, a) | Term::SignExtend(n, a) => {
            Sort::BitVec(bitvector_width("extend", a, symbols, bound)? + n)
        }
        Term::Extract(hi, lo, a) => {
            let width = bitvector_width("extract", a, symbols, bound)?;
            if hi < lo || *hi >= width {
                return Err(TypeError::IllSorted {
                    operator: "extract",
                    detail: format!("bits {hi}..{lo} out of range for width {width}"),
                });
            }
            Sort::BitVec(hi - lo + 1)
        }
        Term::Concat(a, b) => match (infer(a, symbols, bound)?, infer(b, symbols, bound)?) {
            (Sort::BitVec(l), Sort::BitVec(r)) => Sort::BitVec(l + r),
            (Sort::String, Sort::String) => Sort::String,
            (other, _) => return Err(ill_sorted("concat", &other)),
        },
        Term::Bv2Int(_) => Sort::Int,
        Term::Int2Bv(n, _) => Sort::BitVec(*n),

        Term::Add(terms) => {
            let refs: Vec<&Term> = terms.iter().collect();
            numeric_join(&refs, symbols, bound)?
        }
        Term::Sub(a, b) | Term::Mul(a, b) => {
            numeric_join(&[a.as_ref(), b.as_ref()], symbols, bound)?
        }
        Term::Neg(a) => numeric_join(&[a.as_ref()], symbols, bound)?,
        Term::IntDiv(..) | Term::IntMod(..) => Sort::Int,
        Term::RealDiv(..) | Term::ToReal(_) | Term::FpToReal(_) => Sort::Real,

        Term::Select(array, _) => match infer(array, symbols, bound)? {
            Sort::Array(_, element) => *element,
            other => return Err(ill_sorted("select", &other)),
        },
        Term::Store(array, _, _) => match infer(array, symbols, bound)? {
            sort @ Sort::Array(..) => sort,
            other => return Err(ill_sorted("store", &other)),
        },
        Term::ConstArray(sort, _) => sort.clone(),

        Term::FpNaN(e, s)
        | Term::FpPosInf(e, s)
        | Term::FpNegInf(e, s)
        | Term::FpPosZero(e, s)
        | Term::FpNegZero(e, s)
        | Term::FpFromBits(_, _, _, e, s)
        | Term::ToFp(e, s, _, _)
        | Term::ToFpUnsigned(e, s, _, _)
        | Term::FpFromIeeeBv(e, s, _) => Sort::Float(*e, *s),
        Term::RoundingMode(_) => Sort::RoundingMode,
        Term::FpAdd(_, x, _)
        | Term::FpSub(_, x, _)
        | Term::FpMul(_, x, _)
        | Term::FpDiv(_, x, _)
        | Term::FpSqrt(_, x)
        | Term::FpRoundToIntegral(_, x)
        | Term::FpAbs(x)
        | Term::FpNeg(x) => match infer(x, symbols, bound)? {
            sort @ Sort::Float(..) => sort,
            other => return Err(ill_sorted("floating-point", &other)),
        },
        Term::FpToUbv(width, _, _) | Term::FpToSbv(width, _, _) => Sort::BitVec(*width),
        Term::FpToIeeeBv(x) => match infer(x, symbols, bound)? {
            Sort::Float(e, s) => Sort::BitVec(e + s),
            other => return Err(ill_sorted("fp.to_ieee_bv", &other)),
        },

        Term::StrConcat(_)
        | Term::StrSubstr(..)
        | Term::StrAt(..)
        | Term::StrReplace(..)
        | Term::SeqConcat(_)
        | Term::SeqExtract(..)
        | Term::SeqAt(..)
        | Term::SeqReplace(..) => Sort::String,
        Term::StrLen(_) | Term::StrIndexOf(..) | Term::SeqLen(_) | Term::SeqIndexOf(..) => {
            Sort::Int
        }
        Term::StrToRe(_)
        | Term::SeqToRe(_)
        | Term::ReNone
        | Term::ReAll
        | Term::ReAllChar
        | Term::ReStar(_)
        | Term::RePlus(_)
        | Term::ReOpt(_)
        | Term::ReConcat(_)
        | Term::ReUnion(_)
        | Term::ReComp(_)
        | Term::ReRange(..) => Sort::RegLan,
    };
    Ok(sort)
}
