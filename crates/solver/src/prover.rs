//! Assertion stacks checked by an external solver.
//!
//! The solver process is started fresh for every check, so the assertion
//! levels live here and each check sends the whole script: options, logic,
//! declarations, then every assertion still on the stack.

use std::rc::Rc;

use smtwrap_api::{
    ApiError, ApiResult, BooleanFormula, FormulaCreator, ProverEnvironment, ShutdownNotifier,
};
use smtwrap_smtlib::{Command, Script, Term};

use crate::adapter::SmtlibBackend;
use crate::backend::SolverBackend;
use crate::evaluation::{SmtlibModel, SmtlibSessionModel};
use crate::model::SolverModel;
use crate::result::SolverResult;

pub struct SmtlibProver {
    creator: Rc<FormulaCreator<SmtlibBackend>>,
    solver: Rc<dyn SolverBackend>,
    notifier: ShutdownNotifier,
    logic: Option<String>,
    random_seed: Option<u64>,
    /// Index 0 is the base level, which `pop` never removes.
    levels: Vec<Vec<Term>>,
    last_model: Option<SolverModel>,
}

impl SmtlibProver {
    pub fn new(
        creator: Rc<FormulaCreator<SmtlibBackend>>,
        solver: Rc<dyn SolverBackend>,
        notifier: ShutdownNotifier,
    ) -> Self {
        Self {
            creator,
            solver,
            notifier,
            logic: None,
            random_seed: None,
            levels: vec![Vec::new()],
            last_model: None,
        }
    }

    pub fn with_logic(mut self, logic: Option<String>) -> Self {
        self.logic = logic;
        self
    }

    pub fn with_random_seed(mut self, seed: Option<u64>) -> Self {
        self.random_seed = seed;
        self
    }

    /// Assertions of every open level, outermost first.
    pub fn assertions(&self) -> impl Iterator<Item = &Term> {
        self.levels.iter().flatten()
    }

    /// The script the next check would send, without `check-sat`.
    pub fn script(&self) -> Script {
        let mut script = Script::new();
        script.push(Command::SetOption(
            "produce-models".to_string(),
            "true".to_string(),
        ));
        if let Some(seed) = self.random_seed {
            script.push(Command::SetOption("random-seed".to_string(), seed.to_string()));
        }
        if let Some(logic) = &self.logic {
            script.push(Command::SetLogic(logic.clone()));
        }
        script.extend(self.creator.backend().declarations());
        script.extend(self.assertions().cloned().map(Command::Assert));
        script
    }
}

impl ProverEnvironment for SmtlibProver {
    type Backend = SmtlibBackend;
    type Model = SmtlibSessionModel;

    fn push(&mut self) {
        self.last_model = None;
        self.levels.push(Vec::new());
    }

    fn pop(&mut self) {
        assert!(self.levels.len() > 1, "pop without a matching push: no assertion level is open");
        self.last_model = None;
        self.levels.pop();
    }

    fn add_constraint(&mut self, constraint: &BooleanFormula<Term>) -> ApiResult<()> {
        let term = self.creator.extract_info(constraint).clone();
        tracing::trace!(%term, level = self.depth(), "adding constraint");
        self.last_model = None;
        if let Some(level) = self.levels.last_mut() {
            level.push(term);
        }
        Ok(())
    }

    fn is_unsat(&mut self) -> ApiResult<bool> {
        self.notifier.check()?;
        self.last_model = None;
        let script = self.script();
        tracing::debug!(
            solver = %self.solver.name(),
            assertions = self.assertions().count(),
            "checking satisfiability"
        );
        match self.solver.check_sat_interruptible(&script, &self.notifier)? {
            SolverResult::Unsat => Ok(true),
            SolverResult::Sat(model) => {
                self.last_model = Some(model.unwrap_or_default());
                Ok(false)
            }
            SolverResult::Unknown(reason) => Err(ApiError::Backend(format!(
                "solver could not decide satisfiability: {reason}"
            ))),
        }
    }

    fn model(&mut self) -> ApiResult<SmtlibSessionModel> {
        let Some(model) = self.last_model.clone() else {
            return Err(ApiError::Backend(
                "no model available: the last check was not satisfiable".to_string(),
            ));
        };
        let declared = self.creator.backend().declared_names();
        Ok(SmtlibSessionModel::new(
            Rc::clone(&self.creator),
            SmtlibModel::new(model, declared),
        ))
    }

    fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    fn close(self) {
        drop(self);
    }
}

impl Drop for SmtlibProver {
    fn drop(&mut self) {
        tracing::trace!(depth = self.depth(), "prover closed");
    }
}
