//! One SMT-LIB session: a formula creator plus the solver that checks it.

use std::rc::Rc;

use smtwrap_api::manager::{
    ArrayFormulaManager, BitvectorFormulaManager, BooleanFormulaManager,
    FloatingPointFormulaManager, IntegerFormulaManager, RationalFormulaManager,
    StringFormulaManager, StringPrimitives,
};
use smtwrap_api::{FormulaCreator, ShutdownNotifier};
use smtwrap_smtlib::Term;

use crate::adapter::SmtlibBackend;
use crate::backend::SolverBackend;
use crate::config::ContextConfig;
use crate::error::SolverError;
use crate::prover::SmtlibProver;
use crate::solver::CliSolver;
use crate::strings::string_primitives;
use crate::theories::{
    SmtlibArrays, SmtlibBitvectors, SmtlibBooleans, SmtlibFloatingPoints, SmtlibNumerals,
};

pub type Creator = FormulaCreator<SmtlibBackend>;
pub type BooleanManager = BooleanFormulaManager<SmtlibBackend, SmtlibBooleans>;
pub type IntegerManager = IntegerFormulaManager<SmtlibBackend, SmtlibNumerals>;
pub type RationalManager = RationalFormulaManager<SmtlibBackend, SmtlibNumerals>;
pub type BitvectorManager = BitvectorFormulaManager<SmtlibBackend, SmtlibBitvectors>;
pub type FloatingPointManager = FloatingPointFormulaManager<SmtlibBackend, SmtlibFloatingPoints>;
pub type ArrayManager = ArrayFormulaManager<SmtlibBackend, SmtlibArrays>;
pub type StringManager =
    StringFormulaManager<SmtlibBackend, Box<dyn StringPrimitives<Term = Term>>>;

/// Entry point of the SMT-LIB backend.
///
/// Formulas from different contexts never mix: every manager and prover
/// handed out here shares this context's creator.
///
/// ```no_run
/// use smtwrap_api::ProverEnvironment;
/// use smtwrap_solver::{ContextConfig, SolverContext};
///
/// let context = SolverContext::new(ContextConfig::from_env()?)?;
/// let imgr = context.integers();
/// let x = imgr.make_variable("x")?;
/// let positive = imgr.greater_than(&x, &imgr.make_number(0)?)?;
///
/// let mut prover = context.new_prover();
/// prover.add_constraint(&positive)?;
/// assert!(!prover.is_unsat()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct SolverContext {
    config: ContextConfig,
    creator: Rc<Creator>,
    solver: Rc<dyn SolverBackend>,
}

impl SolverContext {
    /// Context running the configured solver binary.
    pub fn new(config: ContextConfig) -> Result<Self, SolverError> {
        config.solver.validate()?;
        let solver = Rc::new(CliSolver::new(config.solver.clone()));
        Ok(Self::with_solver(config, solver))
    }

    /// Context checking through `solver` instead of the configured binary.
    pub fn with_solver(config: ContextConfig, solver: Rc<dyn SolverBackend>) -> Self {
        tracing::debug!(
            solver = %solver.name(),
            string_theory = %config.string_theory,
            "creating solver context"
        );
        Self {
            config,
            creator: Rc::new(FormulaCreator::new(SmtlibBackend::new())),
            solver,
        }
    }

    /// [`ContextConfig::from_env`] followed by [`SolverContext::new`].
    pub fn from_env() -> Result<Self, SolverError> {
        Self::new(ContextConfig::from_env()?)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn creator(&self) -> &Rc<Creator> {
        &self.creator
    }

    pub fn booleans(&self) -> BooleanManager {
        BooleanFormulaManager::new(Rc::clone(&self.creator), SmtlibBooleans)
    }

    pub fn integers(&self) -> IntegerManager {
        IntegerFormulaManager::new(Rc::clone(&self.creator), SmtlibNumerals::integers())
    }

    pub fn rationals(&self) -> RationalManager {
        RationalFormulaManager::new(Rc::clone(&self.creator), SmtlibNumerals::rationals())
    }

    pub fn bitvectors(&self) -> BitvectorManager {
        BitvectorFormulaManager::new(Rc::clone(&self.creator), SmtlibBitvectors)
    }

    pub fn floating_points(&self) -> FloatingPointManager {
        FloatingPointFormulaManager::new(Rc::clone(&self.creator), SmtlibFloatingPoints)
    }

    pub fn arrays(&self) -> ArrayManager {
        ArrayFormulaManager::new(Rc::clone(&self.creator), SmtlibArrays)
    }

    /// String manager over the configured [`StringTheoryKind`](crate::StringTheoryKind).
    pub fn strings(&self) -> StringManager {
        StringFormulaManager::new(
            Rc::clone(&self.creator),
            string_primitives(self.config.string_theory),
        )
    }

    /// Prover that is never interrupted.
    pub fn new_prover(&self) -> SmtlibProver {
        self.new_prover_with_shutdown(ShutdownNotifier::never())
    }

    pub fn new_prover_with_shutdown(&self, notifier: ShutdownNotifier) -> SmtlibProver {
        SmtlibProver::new(Rc::clone(&self.creator), Rc::clone(&self.solver), notifier)
            .with_logic(self.config.logic.clone())
            .with_random_seed(self.config.random_seed)
    }
}
