//! Strings and regular languages.
//!
//! Backends expose three structurally different native string APIs (a
//! dedicated string theory, a sequence theory, a theory with only generic
//! concatenation). All of them sit behind [`StringPrimitives`]; a backend that
//! lacks a primitive either synthesises it from the others inside its hook or
//! returns [`ApiError::Unsupported`](crate::ApiError::Unsupported).

use std::rc::Rc;

use crate::creator::{Backend, FormulaCreator};
use crate::error::ApiResult;
use crate::formula::{BooleanFormula, IntegerFormula, RegexFormula, StringFormula};
use crate::formula_type::FormulaType;

/// Native string and regex operations.
pub trait StringPrimitives {
    type Term;

    /// Whether regex hooks are backed by the native API at all.
    fn supports_regex(&self) -> bool {
        true
    }

    fn make_string(&self, value: &str) -> ApiResult<Self::Term>;
    fn concat(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    /// `length` characters starting at `start`.
    fn substring(
        &self,
        text: &Self::Term,
        start: &Self::Term,
        length: &Self::Term,
    ) -> ApiResult<Self::Term>;
    /// Replace the first occurrence of `pattern` by `replacement`.
    fn replace(
        &self,
        text: &Self::Term,
        pattern: &Self::Term,
        replacement: &Self::Term,
    ) -> ApiResult<Self::Term>;
    fn char_at(&self, text: &Self::Term, index: &Self::Term) -> ApiResult<Self::Term>;
    fn length(&self, text: &Self::Term) -> ApiResult<Self::Term>;
    fn index_of(
        &self,
        text: &Self::Term,
        pattern: &Self::Term,
        start: &Self::Term,
    ) -> ApiResult<Self::Term>;
    fn equal(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn contains(&self, text: &Self::Term, pattern: &Self::Term) -> ApiResult<Self::Term>;
    fn starts_with(&self, text: &Self::Term, prefix: &Self::Term) -> ApiResult<Self::Term>;
    fn ends_with(&self, text: &Self::Term, suffix: &Self::Term) -> ApiResult<Self::Term>;

    fn regex_in(&self, text: &Self::Term, regex: &Self::Term) -> ApiResult<Self::Term>;
    /// The language containing exactly `value`.
    fn make_regex(&self, value: &str) -> ApiResult<Self::Term>;
    fn regex_star(&self, regex: &Self::Term) -> ApiResult<Self::Term>;
    fn regex_plus(&self, regex: &Self::Term) -> ApiResult<Self::Term>;
    fn regex_optional(&self, regex: &Self::Term) -> ApiResult<Self::Term>;
    fn regex_concat(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn regex_union(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term>;
    fn regex_complement(&self, regex: &Self::Term) -> ApiResult<Self::Term>;
    fn regex_range(&self, start: char, end: char) -> ApiResult<Self::Term>;
    fn regex_none(&self) -> ApiResult<Self::Term>;
    fn regex_all(&self) -> ApiResult<Self::Term>;
    fn regex_all_char(&self) -> ApiResult<Self::Term>;
}

impl<P: StringPrimitives + ?Sized> StringPrimitives for Box<P> {
    type Term = P::Term;

    fn supports_regex(&self) -> bool {
        (**self).supports_regex()
    }
    fn make_string(&self, value: &str) -> ApiResult<Self::Term> {
        (**self).make_string(value)
    }
    fn concat(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term> {
        (**self).concat(lhs, rhs)
    }
    fn substring(
        &self,
        text: &Self::Term,
        start: &Self::Term,
        length: &Self::Term,
    ) -> ApiResult<Self::Term> {
        (**self).substring(text, start, length)
    }
    fn replace(
        &self,
        text: &Self::Term,
        pattern: &Self::Term,
        replacement: &Self::Term,
    ) -> ApiResult<Self::Term> {
        (**self).replace(text, pattern, replacement)
    }
    fn char_at(&self, text: &Self::Term, index: &Self::Term) -> ApiResult<Self::Term> {
        (**self).char_at(text, index)
    }
    fn length(&self, text: &Self::Term) -> ApiResult<Self::Term> {
        (**self).length(text)
    }
    fn index_of(
        &self,
        text: &Self::Term,
        pattern: &Self::Term,
        start: &Self::Term,
    ) -> ApiResult<Self::Term> {
        (**self).index_of(text, pattern, start)
    }
    fn equal(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term> {
        (**self).equal(lhs, rhs)
    }
    fn contains(&self, text: &Self::Term, pattern: &Self::Term) -> ApiResult<Self::Term> {
        (**self).contains(text, pattern)
    }
    fn starts_with(&self, text: &Self::Term, prefix: &Self::Term) -> ApiResult<Self::Term> {
        (**self).starts_with(text, prefix)
    }
    fn ends_with(&self, text: &Self::Term, suffix: &Self::Term) -> ApiResult<Self::Term> {
        (**self).ends_with(text, suffix)
    }
    fn regex_in(&self, text: &Self::Term, regex: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_in(text, regex)
    }
    fn make_regex(&self, value: &str) -> ApiResult<Self::Term> {
        (**self).make_regex(value)
    }
    fn regex_star(&self, regex: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_star(regex)
    }
    fn regex_plus(&self, regex: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_plus(regex)
    }
    fn regex_optional(&self, regex: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_optional(regex)
    }
    fn regex_concat(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_concat(lhs, rhs)
    }
    fn regex_union(&self, lhs: &Self::Term, rhs: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_union(lhs, rhs)
    }
    fn regex_complement(&self, regex: &Self::Term) -> ApiResult<Self::Term> {
        (**self).regex_complement(regex)
    }
    fn regex_range(&self, start: char, end: char) -> ApiResult<Self::Term> {
        (**self).regex_range(start, end)
    }
    fn regex_none(&self) -> ApiResult<Self::Term> {
        (**self).regex_none()
    }
    fn regex_all(&self) -> ApiResult<Self::Term> {
        (**self).regex_all()
    }
    fn regex_all_char(&self) -> ApiResult<Self::Term> {
        (**self).regex_all_char()
    }
}

/// Typed string and regex operations.
pub struct StringFormulaManager<B: Backend, P> {
    creator: Rc<FormulaCreator<B>>,
    primitives: P,
}

type Str<B> = StringFormula<<B as Backend>::Term>;
type Re<B> = RegexFormula<<B as Backend>::Term>;
type Bool<B> = BooleanFormula<<B as Backend>::Term>;
type Int<B> = IntegerFormula<<B as Backend>::Term>;

impl<B, P> StringFormulaManager<B, P>
where
    B: Backend,
    P: StringPrimitives<Term = B::Term>,
{
    pub fn new(creator: Rc<FormulaCreator<B>>, primitives: P) -> Self {
        Self {
            creator,
            primitives,
        }
    }

    /// Whether regex operations can succeed on this backend.
    pub fn supports_regex(&self) -> bool {
        self.primitives.supports_regex()
    }

    fn string(&self, term: B::Term) -> Str<B> {
        self.creator.encapsulate_string(term)
    }

    fn regex(&self, term: B::Term) -> Re<B> {
        self.creator.encapsulate_regex(term)
    }

    fn boolean(&self, term: B::Term) -> Bool<B> {
        self.creator.encapsulate_boolean(term)
    }

    // === Strings ===

    /// String literal. Any text is accepted.
    pub fn make_string(&self, value: &str) -> ApiResult<Str<B>> {
        Ok(self.string(self.primitives.make_string(value)?))
    }

    pub fn make_variable(&self, name: &str) -> ApiResult<Str<B>> {
        self.creator.make_variable(FormulaType::String, name)
    }

    pub fn concat(&self, lhs: &Str<B>, rhs: &Str<B>) -> ApiResult<Str<B>> {
        let lhs = self.creator.extract_info(lhs);
        let rhs = self.creator.extract_info(rhs);
        Ok(self.string(self.primitives.concat(lhs, rhs)?))
    }

    /// Concatenation of any number of strings; empty is `""`.
    pub fn concat_all<'a, I>(&self, parts: I) -> ApiResult<Str<B>>
    where
        I: IntoIterator<Item = &'a Str<B>>,
        B::Term: 'a,
    {
        let mut parts = parts.into_iter();
        let Some(first) = parts.next() else {
            return self.make_string("");
        };
        parts.try_fold(first.clone(), |acc, part| self.concat(&acc, part))
    }

    pub fn substring(&self, text: &Str<B>, start: &Int<B>, length: &Int<B>) -> ApiResult<Str<B>> {
        let term = self.primitives.substring(
            self.creator.extract_info(text),
            self.creator.extract_info(start),
            self.creator.extract_info(length),
        )?;
        Ok(self.string(term))
    }

    pub fn replace(
        &self,
        text: &Str<B>,
        pattern: &Str<B>,
        replacement: &Str<B>,
    ) -> ApiResult<Str<B>> {
        let term = self.primitives.replace(
            self.creator.extract_info(text),
            self.creator.extract_info(pattern),
            self.creator.extract_info(replacement),
        )?;
        Ok(self.string(term))
    }

    pub fn char_at(&self, text: &Str<B>, index: &Int<B>) -> ApiResult<Str<B>> {
        let term = self.primitives.char_at(
            self.creator.extract_info(text),
            self.creator.extract_info(index),
        )?;
        Ok(self.string(term))
    }

    pub fn length(&self, text: &Str<B>) -> ApiResult<Int<B>> {
        let term = self.primitives.length(self.creator.extract_info(text))?;
        Ok(self.creator.encapsulate_integer(term))
    }

    /// Position of the first `pattern` at or after `start`, `-1` if none.
    pub fn index_of(&self, text: &Str<B>, pattern: &Str<B>, start: &Int<B>) -> ApiResult<Int<B>> {
        let term = self.primitives.index_of(
            self.creator.extract_info(text),
            self.creator.extract_info(pattern),
            self.creator.extract_info(start),
        )?;
        Ok(self.creator.encapsulate_integer(term))
    }

    pub fn equal(&self, lhs: &Str<B>, rhs: &Str<B>) -> ApiResult<Bool<B>> {
        let term = self.primitives.equal(
            self.creator.extract_info(lhs),
            self.creator.extract_info(rhs),
        )?;
        Ok(self.boolean(term))
    }

    pub fn contains(&self, text: &Str<B>, pattern: &Str<B>) -> ApiResult<Bool<B>> {
        let term = self.primitives.contains(
            self.creator.extract_info(text),
            self.creator.extract_info(pattern),
        )?;
        Ok(self.boolean(term))
    }

    pub fn starts_with(&self, text: &Str<B>, prefix: &Str<B>) -> ApiResult<Bool<B>> {
        let term = self.primitives.starts_with(
            self.creator.extract_info(text),
            self.creator.extract_info(prefix),
        )?;
        Ok(self.boolean(term))
    }

    pub fn ends_with(&self, text: &Str<B>, suffix: &Str<B>) -> ApiResult<Bool<B>> {
        let term = self.primitives.ends_with(
            self.creator.extract_info(text),
            self.creator.extract_info(suffix),
        )?;
        Ok(self.boolean(term))
    }

    // === Regular languages ===

    pub fn regex_in(&self, text: &Str<B>, regex: &Re<B>) -> ApiResult<Bool<B>> {
        let term = self.primitives.regex_in(
            self.creator.extract_info(text),
            self.creator.extract_info(regex),
        )?;
        Ok(self.boolean(term))
    }

    pub fn make_regex(&self, value: &str) -> ApiResult<Re<B>> {
        Ok(self.regex(self.primitives.make_regex(value)?))
    }

    pub fn regex_star(&self, regex: &Re<B>) -> ApiResult<Re<B>> {
        let term = self.primitives.regex_star(self.creator.extract_info(regex))?;
        Ok(self.regex(term))
    }

    pub fn regex_plus(&self, regex: &Re<B>) -> ApiResult<Re<B>> {
        let term = self.primitives.regex_plus(self.creator.extract_info(regex))?;
        Ok(self.regex(term))
    }

    /// `regex` or the empty string.
    pub fn regex_optional(&self, regex: &Re<B>) -> ApiResult<Re<B>> {
        let term = self
            .primitives
            .regex_optional(self.creator.extract_info(regex))?;
        Ok(self.regex(term))
    }

    pub fn regex_concat(&self, lhs: &Re<B>, rhs: &Re<B>) -> ApiResult<Re<B>> {
        let term = self.primitives.regex_concat(
            self.creator.extract_info(lhs),
            self.creator.extract_info(rhs),
        )?;
        Ok(self.regex(term))
    }

    pub fn regex_union(&self, lhs: &Re<B>, rhs: &Re<B>) -> ApiResult<Re<B>> {
        let term = self.primitives.regex_union(
            self.creator.extract_info(lhs),
            self.creator.extract_info(rhs),
        )?;
        Ok(self.regex(term))
    }

    pub fn regex_complement(&self, regex: &Re<B>) -> ApiResult<Re<B>> {
        let term = self
            .primitives
            .regex_complement(self.creator.extract_info(regex))?;
        Ok(self.regex(term))
    }

    /// Single characters between `start` and `end`, inclusive.
    pub fn regex_range(&self, start: char, end: char) -> ApiResult<Re<B>> {
        Ok(self.regex(self.primitives.regex_range(start, end)?))
    }

    /// The empty language.
    pub fn regex_none(&self) -> ApiResult<Re<B>> {
        Ok(self.regex(self.primitives.regex_none()?))
    }

    /// Every string.
    pub fn regex_all(&self) -> ApiResult<Re<B>> {
        Ok(self.regex(self.primitives.regex_all()?))
    }

    /// Every single-character string.
    pub fn regex_all_char(&self) -> ApiResult<Re<B>> {
        Ok(self.regex(self.primitives.regex_all_char()?))
    }
}
