//! String adapters.
//!
//! Solvers expose strings in one of three shapes: the SMT-LIB `str.*`
//! theory, a `seq.*` sequence theory over characters, or plain concatenation
//! with nothing else. Each shape is one [`StringPrimitives`] implementation;
//! [`string_primitives`] picks one from a [`StringTheoryKind`].

use std::collections::BTreeSet;

use smtwrap_api::manager::StringPrimitives;
use smtwrap_api::{ApiError, ApiResult};
use smtwrap_smtlib::{Sort, Term};

use crate::config::StringTheoryKind;

fn b(term: &Term) -> Box<Term> {
    Box::new(term.clone())
}

fn char_literal(c: char) -> Box<Term> {
    Box::new(Term::StringLit(c.to_string()))
}

/// The adapter for `kind`.
pub fn string_primitives(kind: StringTheoryKind) -> Box<dyn StringPrimitives<Term = Term>> {
    tracing::debug!(string_theory = %kind, "selecting string adapter");
    match kind {
        StringTheoryKind::Strings => Box::new(StringTheory),
        StringTheoryKind::Sequences => Box::new(SequenceTheory),
        StringTheoryKind::ConcatOnly => Box::new(ConcatOnlyTheory),
    }
}

// ---------------------------------------------------------------------------
// str.*
// ---------------------------------------------------------------------------

/// SMT-LIB 2.6 `Strings` theory.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringTheory;

impl StringPrimitives for StringTheory {
    type Term = Term;

    fn make_string(&self, value: &str) -> ApiResult<Term> {
        Ok(Term::string(value))
    }

    fn concat(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::StrConcat(vec![lhs.clone(), rhs.clone()]))
    }

    fn substring(&self, text: &Term, start: &Term, length: &Term) -> ApiResult<Term> {
        Ok(Term::StrSubstr(b(text), b(start), b(length)))
    }

    fn replace(&self, text: &Term, pattern: &Term, replacement: &Term) -> ApiResult<Term> {
        Ok(Term::StrReplace(b(text), b(pattern), b(replacement)))
    }

    fn char_at(&self, text: &Term, index: &Term) -> ApiResult<Term> {
        Ok(Term::StrAt(b(text), b(index)))
    }

    fn length(&self, text: &Term) -> ApiResult<Term> {
        Ok(Term::StrLen(b(text)))
    }

    fn index_of(&self, text: &Term, pattern: &Term, start: &Term) -> ApiResult<Term> {
        Ok(Term::StrIndexOf(b(text), b(pattern), b(start)))
    }

    fn equal(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }

    fn contains(&self, text: &Term, pattern: &Term) -> ApiResult<Term> {
        Ok(Term::StrContains(b(text), b(pattern)))
    }

    fn starts_with(&self, text: &Term, prefix: &Term) -> ApiResult<Term> {
        Ok(Term::StrPrefixOf(b(prefix), b(text)))
    }

    fn ends_with(&self, text: &Term, suffix: &Term) -> ApiResult<Term> {
        Ok(Term::StrSuffixOf(b(suffix), b(text)))
    }

    fn regex_in(&self, text: &Term, regex: &Term) -> ApiResult<Term> {
        Ok(Term::StrInRe(b(text), b(regex)))
    }

    fn make_regex(&self, value: &str) -> ApiResult<Term> {
        Ok(Term::StrToRe(Box::new(Term::string(value))))
    }

    fn regex_star(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::ReStar(b(regex)))
    }

    fn regex_plus(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::RePlus(b(regex)))
    }

    fn regex_optional(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::ReOpt(b(regex)))
    }

    fn regex_concat(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::ReConcat(vec![lhs.clone(), rhs.clone()]))
    }

    fn regex_union(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::ReUnion(vec![lhs.clone(), rhs.clone()]))
    }

    fn regex_complement(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::ReComp(b(regex)))
    }

    fn regex_range(&self, start: char, end: char) -> ApiResult<Term> {
        Ok(Term::ReRange(char_literal(start), char_literal(end)))
    }

    fn regex_none(&self) -> ApiResult<Term> {
        Ok(Term::ReNone)
    }

    fn regex_all(&self) -> ApiResult<Term> {
        Ok(Term::ReAll)
    }

    fn regex_all_char(&self) -> ApiResult<Term> {
        Ok(Term::ReAllChar)
    }
}

// ---------------------------------------------------------------------------
// seq.*
// ---------------------------------------------------------------------------

/// Sequence theory with Z3's operator names. It has no optional operator;
/// `regex_optional` is built as `union(r, to_re(""))`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceTheory;

impl StringPrimitives for SequenceTheory {
    type Term = Term;

    fn make_string(&self, value: &str) -> ApiResult<Term> {
        Ok(Term::string(value))
    }

    fn concat(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::SeqConcat(vec![lhs.clone(), rhs.clone()]))
    }

    fn substring(&self, text: &Term, start: &Term, length: &Term) -> ApiResult<Term> {
        Ok(Term::SeqExtract(b(text), b(start), b(length)))
    }

    fn replace(&self, text: &Term, pattern: &Term, replacement: &Term) -> ApiResult<Term> {
        Ok(Term::SeqReplace(b(text), b(pattern), b(replacement)))
    }

    fn char_at(&self, text: &Term, index: &Term) -> ApiResult<Term> {
        Ok(Term::SeqAt(b(text), b(index)))
    }

    fn length(&self, text: &Term) -> ApiResult<Term> {
        Ok(Term::SeqLen(b(text)))
    }

    fn index_of(&self, text: &Term, pattern: &Term, start: &Term) -> ApiResult<Term> {
        Ok(Term::SeqIndexOf(b(text), b(pattern), b(start)))
    }

    fn equal(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }

    fn contains(&self, text: &Term, pattern: &Term) -> ApiResult<Term> {
        Ok(Term::SeqContains(b(text), b(pattern)))
    }

    fn starts_with(&self, text: &Term, prefix: &Term) -> ApiResult<Term> {
        Ok(Term::SeqPrefixOf(b(prefix), b(text)))
    }

    fn ends_with(&self, text: &Term, suffix: &Term) -> ApiResult<Term> {
        Ok(Term::SeqSuffixOf(b(suffix), b(text)))
    }

    fn regex_in(&self, text: &Term, regex: &Term) -> ApiResult<Term> {
        Ok(Term::SeqInRe(b(text), b(regex)))
    }

    fn make_regex(&self, value: &str) -> ApiResult<Term> {
        Ok(Term::SeqToRe(Box::new(Term::string(value))))
    }

    fn regex_star(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::ReStar(b(regex)))
    }

    fn regex_plus(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::RePlus(b(regex)))
    }

    fn regex_optional(&self, regex: &Term) -> ApiResult<Term> {
        let empty = self.make_regex("")?;
        self.regex_union(regex, &empty)
    }

    fn regex_concat(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::ReConcat(vec![lhs.clone(), rhs.clone()]))
    }

    fn regex_union(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::ReUnion(vec![lhs.clone(), rhs.clone()]))
    }

    fn regex_complement(&self, regex: &Term) -> ApiResult<Term> {
        Ok(Term::ReComp(b(regex)))
    }

    fn regex_range(&self, start: char, end: char) -> ApiResult<Term> {
        Ok(Term::ReRange(char_literal(start), char_literal(end)))
    }

    fn regex_none(&self) -> ApiResult<Term> {
        Ok(Term::ReNone)
    }

    fn regex_all(&self) -> ApiResult<Term> {
        Ok(Term::ReAll)
    }

    fn regex_all_char(&self) -> ApiResult<Term> {
        Ok(Term::ReAllChar)
    }
}

// ---------------------------------------------------------------------------
// concatenation only
// ---------------------------------------------------------------------------

const CONCAT_ONLY: &str = "concat-only";

/// A theory with string literals, concatenation, length and equality.
///
/// Prefix, suffix and containment are expressed with existentially
/// quantified fillers; every other operation and all regexes are
/// [`ApiError::Unsupported`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatOnlyTheory;

/// Bound variable names that occur in none of `operands`.
fn fresh_names(operands: &[&Term], count: usize) -> Vec<String> {
    let printed: Vec<String> = operands.iter().map(|t| t.to_string()).collect();
    let mut taken = BTreeSet::new();
    let mut names = Vec::with_capacity(count);
    let mut index = 0usize;
    while names.len() < count {
        let candidate = format!("fill!{index}");
        index += 1;
        if printed.iter().any(|p| p.contains(&candidate)) || !taken.insert(candidate.clone()) {
            continue;
        }
        names.push(candidate);
    }
    names
}

fn exists_split(text: &Term, parts: Vec<Term>, bound: Vec<String>) -> Term {
    let vars = bound.into_iter().map(|name| (name, Sort::String)).collect();
    Term::Exists(
        vars,
        Box::new(Term::Eq(b(text), Box::new(Term::StrConcat(parts)))),
    )
}

impl StringPrimitives for ConcatOnlyTheory {
    type Term = Term;

    fn supports_regex(&self) -> bool {
        false
    }

    fn make_string(&self, value: &str) -> ApiResult<Term> {
        Ok(Term::string(value))
    }

    fn concat(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::StrConcat(vec![lhs.clone(), rhs.clone()]))
    }

    fn substring(&self, _text: &Term, _start: &Term, _length: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("substring", CONCAT_ONLY))
    }

    fn replace(&self, _text: &Term, _pattern: &Term, _replacement: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("replace", CONCAT_ONLY))
    }

    fn char_at(&self, _text: &Term, _index: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("char_at", CONCAT_ONLY))
    }

    fn length(&self, text: &Term) -> ApiResult<Term> {
        Ok(Term::StrLen(b(text)))
    }

    fn index_of(&self, _text: &Term, _pattern: &Term, _start: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("index_of", CONCAT_ONLY))
    }

    fn equal(&self, lhs: &Term, rhs: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(b(lhs), b(rhs)))
    }

    /// `exists a b. text = a ++ pattern ++ b`
    fn contains(&self, text: &Term, pattern: &Term) -> ApiResult<Term> {
        let names = fresh_names(&[text, pattern], 2);
        let parts = vec![
            Term::constant(names[0].as_str()),
            pattern.clone(),
            Term::constant(names[1].as_str()),
        ];
        Ok(exists_split(text, parts, names))
    }

    fn starts_with(&self, text: &Term, prefix: &Term) -> ApiResult<Term> {
        let names = fresh_names(&[text, prefix], 1);
        let parts = vec![prefix.clone(), Term::constant(names[0].as_str())];
        Ok(exists_split(text, parts, names))
    }

    fn ends_with(&self, text: &Term, suffix: &Term) -> ApiResult<Term> {
        let names = fresh_names(&[text, suffix], 1);
        let parts = vec![Term::constant(names[0].as_str()), suffix.clone()];
        Ok(exists_split(text, parts, names))
    }

    fn regex_in(&self, _text: &Term, _regex: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_in", CONCAT_ONLY))
    }

    fn make_regex(&self, _value: &str) -> ApiResult<Term> {
        Err(ApiError::unsupported("make_regex", CONCAT_ONLY))
    }

    fn regex_star(&self, _regex: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_star", CONCAT_ONLY))
    }

    fn regex_plus(&self, _regex: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_plus", CONCAT_ONLY))
    }

    fn regex_optional(&self, _regex: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_optional", CONCAT_ONLY))
    }

    fn regex_concat(&self, _lhs: &Term, _rhs: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_concat", CONCAT_ONLY))
    }

    fn regex_union(&self, _lhs: &Term, _rhs: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_union", CONCAT_ONLY))
    }

    fn regex_complement(&self, _regex: &Term) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_complement", CONCAT_ONLY))
    }

    fn regex_range(&self, _start: char, _end: char) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_range", CONCAT_ONLY))
    }

    fn regex_none(&self) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_none", CONCAT_ONLY))
    }

    fn regex_all(&self) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_all", CONCAT_ONLY))
    }

    fn regex_all_char(&self) -> ApiResult<Term> {
        Err(ApiError::unsupported("regex_all_char", CONCAT_ONLY))
    }
}
