//! Variable naming rules shared by every backend.

use crate::error::{ApiError, ApiResult};

/// SMT-LIB reserved words, command names and core symbols that must not be
/// shadowed by user variables.
const RESERVED: &[&str] = &[
    // reserved words
    "_", "!", "as", "let", "exists", "forall", "match", "par", "BINARY", "DECIMAL",
    "HEXADECIMAL", "NUMERAL", "STRING",
    // commands
    "assert", "check-sat", "check-sat-assuming", "declare-const", "declare-datatype",
    "declare-datatypes", "declare-fun", "declare-sort", "define-const", "define-fun",
    "define-fun-rec", "define-funs-rec", "define-sort", "echo", "exit", "get-assertions",
    "get-assignment", "get-info", "get-model", "get-option", "get-proof",
    "get-unsat-assumptions", "get-unsat-core", "get-value", "pop", "push", "reset",
    "reset-assertions", "set-info", "set-logic", "set-option",
    // core theory
    "true", "false", "not", "and", "or", "xor", "=>", "=", "distinct", "ite",
    // arithmetic
    "+", "-", "*", "/", "div", "mod", "abs", "<", "<=", ">", ">=", "to_real", "to_int",
    "is_int",
    // arrays
    "select", "store",
];

/// Check `name` against the naming rules.
///
/// A valid name is non-empty, contains neither `|` nor `\`, is not a reserved
/// SMT-LIB word or core symbol, is not a numeral, and does not start with `@`
/// or `.` (prefixes reserved for solver-generated symbols).
pub fn check_variable_name(name: &str) -> ApiResult<()> {
    let reject = |reason| {
        Err(ApiError::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.contains('|') {
        return reject("contains '|'");
    }
    if name.contains('\\') {
        return reject("contains '\\'");
    }
    if name.starts_with('@') || name.starts_with('.') {
        return reject("prefix is reserved for solver-internal symbols");
    }
    if RESERVED.contains(&name) {
        return reject("reserved SMT-LIB word");
    }
    if is_numeral(name) {
        return reject("is a numeral");
    }
    Ok(())
}

/// Convenience predicate over [`check_variable_name`].
pub fn is_valid_name(name: &str) -> bool {
    check_variable_name(name).is_ok()
}

fn is_numeral(name: &str) -> bool {
    let (int_part, frac_part) = name.split_once('.').unwrap_or((name, ""));
    !int_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        for name in ["x", "x1", "long name", "a.b", "_x", "select1", "ß", "x@1"] {
            assert!(is_valid_name(name), "rejected {name:?}");
        }
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            check_variable_name(""),
            Err(ApiError::InvalidName {
                name: String::new(),
                reason: "name is empty"
            })
        );
    }

    #[test]
    fn rejects_reserved_characters() {
        assert!(!is_valid_name("a|b"));
        assert!(!is_valid_name("|x|"));
        assert!(!is_valid_name("a\\b"));
    }

    #[test]
    fn rejects_reserved_words() {
        for name in ["true", "false", "and", "let", "forall", "assert", "select", "=", "+"] {
            assert!(!is_valid_name(name), "accepted {name:?}");
        }
    }

    #[test]
    fn rejects_numerals() {
        for name in ["0", "42", "3.14", "1."] {
            assert!(!is_valid_name(name), "accepted {name:?}");
        }
        assert!(is_valid_name("1a"));
    }

    #[test]
    fn rejects_solver_prefixes() {
        assert!(!is_valid_name("@fresh"));
        assert!(!is_valid_name(".internal"));
    }
}
