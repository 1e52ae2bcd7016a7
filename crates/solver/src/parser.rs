use smtwrap_smtlib::reader::{coerce_to_sort, parse_sexprs, read_sort, read_term};
use smtwrap_smtlib::{Definition, ReadError, SExpr};

use crate::error::SolverError;
use crate::model::SolverModel;
use crate::result::SolverResult;

/// Parse a solver's stdout into a `SolverResult`.
///
/// Expected output format:
/// - optional `success` acknowledgements
/// - `sat`, `unsat`, or `unknown`
/// - if `sat`: the model from `(get-model)`
///
/// An `(error ...)` response before the answer fails the check. Errors after
/// the answer (typically `get-model` following `unsat`) are ignored.
pub fn parse_solver_output(stdout: &str, stderr: &str) -> Result<SolverResult, SolverError> {
    let stdout = stdout.trim();

    if stdout.is_empty() {
        // Check stderr for clues
        if stderr.contains("timeout") {
            return Ok(SolverResult::Unknown("timeout".to_string()));
        }
        return Err(SolverError::ParseError(format!(
            "Empty solver output. stderr: {stderr}"
        )));
    }

    let exprs = parse_sexprs(stdout)
        .map_err(|e| SolverError::ParseError(format!("{e} in solver output: {stdout}")))?;
    let mut exprs = exprs.into_iter().skip_while(|e| e.is_atom("success"));

    let status = exprs.next().ok_or_else(|| {
        SolverError::ParseError(format!("No check-sat answer in solver output: {stdout}"))
    })?;
    if let Some(message) = error_message(&status) {
        return Err(SolverError::ProcessError(message));
    }
    let rest: Vec<SExpr> = exprs.collect();
    for message in rest.iter().filter_map(error_message) {
        tracing::debug!(%message, "solver error after check-sat answer");
    }

    let SExpr::Atom(answer) = &status else {
        return Err(SolverError::ParseError(format!(
            "Unexpected solver output: {status}"
        )));
    };
    match answer.as_str() {
        "unsat" => Ok(SolverResult::Unsat),
        "sat" => Ok(SolverResult::Sat(parse_model(&rest)?)),
        "unknown" => {
            // Try to extract reason from output or stderr
            let reason = extract_unknown_reason(stdout, stderr);
            Ok(SolverResult::Unknown(reason))
        }
        "timeout" => Ok(SolverResult::Unknown("timeout".to_string())),
        other => Err(SolverError::ParseError(format!(
            "Unexpected solver output: {other}"
        ))),
    }
}

/// Message of an `(error "...")` response.
fn error_message(expr: &SExpr) -> Option<String> {
    match expr.as_list()? {
        [head, SExpr::Str(message)] if head.is_atom("error") => Some(message.clone()),
        [head, ..] if head.is_atom("error") => Some(expr.to_string()),
        _ => None,
    }
}

/// Extract the reason string for an "unknown" result.
pub(crate) fn extract_unknown_reason(stdout: &str, stderr: &str) -> String {
    // Z3 sometimes prints the reason after "unknown"
    let after_unknown = stdout
        .lines()
        .skip_while(|line| line.trim() != "unknown")
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with("(error"));

    if let Some(reason) = after_unknown {
        // Clean up parenthesized reasons like "(timeout)"
        reason
            .trim_start_matches('(')
            .trim_end_matches(')')
            .to_string()
    } else if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        "unknown".to_string()
    }
}

/// Find and read the model block following a `sat` answer.
///
/// Solvers print models in two known formats:
///
/// ```text
/// (model
///   (define-fun x () Int 5)
/// )
/// ```
///
/// and, for Z3 4.15+ and CVC5, a bare list of definitions:
///
/// ```text
/// (
///   (define-fun x () Int
///     5)
/// )
/// ```
fn parse_model(rest: &[SExpr]) -> Result<Option<SolverModel>, SolverError> {
    let Some(entries) = rest.iter().find_map(model_entries) else {
        return Ok(None);
    };

    let mut definitions = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(items) = entry.as_list() else {
            continue;
        };
        if !items.first().is_some_and(|head| head.is_atom("define-fun")) {
            // declare-fun for uninterpreted sort elements, forall axioms, ...
            continue;
        }
        match read_definition(entry, items) {
            Ok(definition) => definitions.push(definition),
            Err(ReadError::Unsupported(what)) => {
                tracing::warn!(%what, "skipping model definition with unsupported body");
            }
            Err(e) => return Err(SolverError::ParseError(e.to_string())),
        }
    }
    Ok(Some(SolverModel::with_definitions(definitions)))
}

fn model_entries(expr: &SExpr) -> Option<&[SExpr]> {
    let items = expr.as_list()?;
    match items.split_first() {
        Some((head, entries)) if head.is_atom("model") => Some(entries),
        _ if items.iter().all(|item| item.as_list().is_some()) => Some(items),
        _ => None,
    }
}

/// `(define-fun name ((p S) ...) S body)`
fn read_definition(expr: &SExpr, items: &[SExpr]) -> Result<Definition, ReadError> {
    let malformed = || ReadError::Malformed {
        what: "define-fun",
        text: expr.to_string(),
    };
    let [_, name, params, sort, body] = items else {
        return Err(malformed());
    };
    let name = name.as_symbol().ok_or_else(malformed)?.to_string();
    let params = params
        .as_list()
        .ok_or_else(malformed)?
        .iter()
        .map(|param| match param.as_list() {
            Some([p, s]) => Ok((p.as_symbol().ok_or_else(malformed)?.to_string(), read_sort(s)?)),
            _ => Err(malformed()),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let sort = read_sort(sort)?;
    let body = coerce_to_sort(read_term(body)?, &sort);
    Ok(Definition {
        name,
        params,
        sort,
        body,
    })
}
