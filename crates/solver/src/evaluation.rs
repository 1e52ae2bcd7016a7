//! Models backed by `(get-model)` output.
//!
//! The solver prints one `define-fun` per symbol. Formulas are evaluated
//! locally against those definitions with the ground [`Evaluator`], so a
//! model outlives the solver process that produced it.

use std::collections::BTreeSet;

use smtwrap_api::{ApiResult, CachingModel, Model, ModelPrimitives, RawAssignment};
use smtwrap_smtlib::{Definition, Evaluator, Term, Val};

use crate::adapter::SmtlibBackend;
use crate::model::SolverModel;

/// Model of an SMT-LIB session.
pub type SmtlibSessionModel = Model<SmtlibBackend, SmtlibModel>;

/// [`SmtlibSessionModel`] with a cached assignment list.
pub type SmtlibCachingModel = CachingModel<SmtlibBackend, SmtlibModel>;

/// Native half of a model: the definitions plus the names the session
/// declared.
///
/// Solvers also define auxiliary symbols (`k!0`, `as-array` helpers); only
/// declared names are listed as assignments, though all definitions take part
/// in evaluation.
#[derive(Debug, Clone, Default)]
pub struct SmtlibModel {
    definitions: Vec<Definition>,
    declared: BTreeSet<String>,
}

impl SmtlibModel {
    pub fn new(model: SolverModel, declared: BTreeSet<String>) -> Self {
        Self {
            definitions: model.into_definitions(),
            declared,
        }
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.definitions)
    }
}

/// Push one assignment per array entry, descending into nested arrays.
fn expand(
    name: &str,
    key: Term,
    value: Val,
    arguments: Vec<Term>,
    out: &mut Vec<RawAssignment<Term>>,
) {
    match value {
        Val::Array { entries, .. } => {
            for (index, element) in entries {
                let index = index.to_term();
                let entry_key = Term::Select(Box::new(key.clone()), Box::new(index.clone()));
                let mut entry_arguments = arguments.clone();
                entry_arguments.push(index);
                expand(name, entry_key, element, entry_arguments, out);
            }
        }
        value => out.push(RawAssignment {
            key,
            value: value.to_term(),
            name: name.to_string(),
            arguments,
        }),
    }
}

impl ModelPrimitives for SmtlibModel {
    type Term = Term;

    fn eval_impl(&self, term: &Term) -> Option<Term> {
        self.evaluator().evaluate_to_term(term)
    }

    fn to_list(&self) -> ApiResult<Vec<RawAssignment<Term>>> {
        let evaluator = self.evaluator();
        let mut assignments = Vec::new();
        for definition in &self.definitions {
            if !definition.params.is_empty() || !self.declared.contains(&definition.name) {
                continue;
            }
            let key = Term::constant(definition.name.as_str());
            let Some(value) = evaluator.evaluate(&key) else {
                tracing::debug!(name = %definition.name, "model value is not a ground literal");
                continue;
            };
            expand(&definition.name, key, value, Vec::new(), &mut assignments);
        }
        Ok(assignments)
    }

    fn equality(&self, key: &Term, value: &Term) -> ApiResult<Term> {
        Ok(Term::Eq(Box::new(key.clone()), Box::new(value.clone())))
    }

    fn release(&mut self) {
        self.definitions.clear();
        self.declared.clear();
    }
}
