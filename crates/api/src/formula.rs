//! Typed formula handles.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ApiError, ApiResult};
use crate::formula_type::FormulaType;
use crate::tag::{
    AnySort, ArraySort, BitvectorSort, BooleanSort, FloatingPointSort, IntegerSort, RationalSort,
    RegexSort, RoundingModeSort, SortTag, StringSort,
};

/// Identity of one backend session.
///
/// Every formula remembers the session that produced its native term;
/// extraction through a creator of another session is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SessionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A native term of sort family `S`, produced by one session.
///
/// Only a [`FormulaCreator`](crate::FormulaCreator) can build one; the
/// native term is reachable again only through
/// [`FormulaCreator::extract_info`](crate::FormulaCreator::extract_info).
pub struct Formula<S, N> {
    native: N,
    sort: FormulaType,
    session: SessionId,
    _sort: PhantomData<fn() -> S>,
}

pub type AnyFormula<N> = Formula<AnySort, N>;
pub type BooleanFormula<N> = Formula<BooleanSort, N>;
pub type IntegerFormula<N> = Formula<IntegerSort, N>;
pub type RationalFormula<N> = Formula<RationalSort, N>;
pub type BitvectorFormula<N> = Formula<BitvectorSort, N>;
pub type FloatingPointFormula<N> = Formula<FloatingPointSort, N>;
pub type RoundingModeFormula<N> = Formula<RoundingModeSort, N>;
pub type ArrayFormula<I, E, N> = Formula<ArraySort<I, E>, N>;
pub type StringFormula<N> = Formula<StringSort, N>;
pub type RegexFormula<N> = Formula<RegexSort, N>;

impl<S, N> Formula<S, N> {
    pub(crate) fn new(native: N, sort: FormulaType, session: SessionId) -> Self {
        Self {
            native,
            sort,
            session,
            _sort: PhantomData,
        }
    }

    pub(crate) fn native(&self) -> &N {
        &self.native
    }

    /// Sort recorded when the formula was encapsulated.
    pub fn formula_type(&self) -> &FormulaType {
        &self.sort
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Forget the static sort.
    pub fn erase(self) -> AnyFormula<N> {
        self.retag()
    }

    /// Re-tag a formula after checking its recorded sort.
    pub fn downcast<T: SortTag>(self) -> ApiResult<Formula<T, N>> {
        if T::admits(&self.sort) {
            Ok(self.retag())
        } else {
            Err(ApiError::SortMismatch {
                expected: T::NAME.to_string(),
                actual: self.sort.to_string(),
            })
        }
    }

    fn retag<T>(self) -> Formula<T, N> {
        Formula {
            native: self.native,
            sort: self.sort,
            session: self.session,
            _sort: PhantomData,
        }
    }
}

impl<S, N: Clone> Formula<S, N> {
    pub fn to_any(&self) -> AnyFormula<N> {
        self.clone().erase()
    }
}

impl<S, N: Clone> Clone for Formula<S, N> {
    fn clone(&self) -> Self {
        Self {
            native: self.native.clone(),
            sort: self.sort.clone(),
            session: self.session,
            _sort: PhantomData,
        }
    }
}

impl<S, N: fmt::Debug> fmt::Debug for Formula<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formula")
            .field("sort", &self.sort)
            .field("native", &self.native)
            .field("session", &self.session)
            .finish()
    }
}

/// Prints the native term.
impl<S, N: fmt::Display> fmt::Display for Formula<S, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.native.fmt(f)
    }
}

impl<S, N: PartialEq> PartialEq for Formula<S, N> {
    fn eq(&self, other: &Self) -> bool {
        self.session == other.session && self.sort == other.sort && self.native == other.native
    }
}

impl<S, N: Eq> Eq for Formula<S, N> {}

impl<S, N: Hash> Hash for Formula<S, N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.session.hash(state);
        self.sort.hash(state);
        self.native.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula<S>(native: &str, sort: FormulaType) -> Formula<S, String> {
        Formula::new(native.to_string(), sort, SessionId(7))
    }

    #[test]
    fn sessions_are_unique() {
        assert_ne!(SessionId::fresh(), SessionId::fresh());
    }

    #[test]
    fn downcast_checks_recorded_sort() {
        let any: AnyFormula<String> = formula("x", FormulaType::bitvector(8));
        let bv = any.clone().downcast::<BitvectorSort>().unwrap();
        assert_eq!(bv.formula_type(), &FormulaType::bitvector(8));

        let err = any.downcast::<BooleanSort>().unwrap_err();
        assert_eq!(
            err,
            ApiError::SortMismatch {
                expected: "Boolean".to_string(),
                actual: "Bitvector<8>".to_string(),
            }
        );
    }

    #[test]
    fn erase_keeps_native_and_sort() {
        let b: BooleanFormula<String> = formula("p", FormulaType::Boolean);
        let any = b.to_any();
        assert_eq!(any.native(), "p");
        assert_eq!(any.formula_type(), &FormulaType::Boolean);
        assert_eq!(any.session(), b.session());
    }

    #[test]
    fn equality_includes_session() {
        let a: BooleanFormula<String> = formula("p", FormulaType::Boolean);
        let b: BooleanFormula<String> = Formula::new("p".to_string(), FormulaType::Boolean, SessionId(8));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn display_prints_native() {
        let s: StringFormula<String> = formula("(str.++ a b)", FormulaType::String);
        assert_eq!(s.to_string(), "(str.++ a b)");
    }
}
