use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SolverError;

/// Solver binaries that speak SMT-LIB2 on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    Z3,
    Cvc5,
    /// Yices2 through its `yices-smt2` front end.
    Yices,
}

/// Directories searched after `PATH`.
const FALLBACK_DIRS: &[&str] = &["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

impl SolverKind {
    pub const ALL: [SolverKind; 3] = [SolverKind::Z3, SolverKind::Cvc5, SolverKind::Yices];

    /// Executable name looked up on `PATH`.
    pub fn binary_name(&self) -> &'static str {
        match self {
            SolverKind::Z3 => "z3",
            SolverKind::Cvc5 => "cvc5",
            SolverKind::Yices => "yices-smt2",
        }
    }

    /// Arguments that make the solver read one SMT-LIB2 script from stdin.
    pub fn stdin_args(&self) -> Vec<String> {
        match self {
            SolverKind::Z3 => vec!["-in".to_string(), "-smt2".to_string()],
            SolverKind::Cvc5 => vec!["--lang=smt2".to_string()],
            SolverKind::Yices => vec!["--incremental".to_string()],
        }
    }

    /// Per-check time limit flag; `None` when `timeout_ms` is zero.
    ///
    /// Yices only takes whole seconds, so its limit is rounded up.
    pub fn timeout_arg(&self, timeout_ms: u64) -> Option<String> {
        if timeout_ms == 0 {
            return None;
        }
        match self {
            SolverKind::Z3 => Some(format!("-t:{timeout_ms}")),
            SolverKind::Cvc5 => Some(format!("--tlimit-per={timeout_ms}")),
            SolverKind::Yices => Some(format!("--timeout={}", timeout_ms.div_ceil(1000))),
        }
    }

    /// First existing `binary_name` in `path_var` (a `PATH`-style list),
    /// then in the fallback directories.
    fn locate(&self, path_var: Option<OsString>) -> Option<PathBuf> {
        let binary = self.binary_name();
        let on_path = path_var
            .iter()
            .flat_map(std::env::split_paths)
            .collect::<Vec<_>>();
        on_path
            .iter()
            .map(PathBuf::as_path)
            .chain(FALLBACK_DIRS.iter().map(Path::new))
            .map(|dir| dir.join(binary))
            .find(|candidate| candidate.is_file())
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Z3 => write!(f, "Z3"),
            SolverKind::Cvc5 => write!(f, "CVC5"),
            SolverKind::Yices => write!(f, "Yices"),
        }
    }
}

impl std::str::FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "z3" => Ok(SolverKind::Z3),
            "cvc5" => Ok(SolverKind::Cvc5),
            "yices" | "yices2" | "yices-smt2" => Ok(SolverKind::Yices),
            _ => Err(format!(
                "Unknown solver: {s}. Valid options: z3, cvc5, yices"
            )),
        }
    }
}

/// How to run one solver binary.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub kind: SolverKind,
    pub solver_path: PathBuf,
    /// Per-check limit in milliseconds; 0 disables it.
    pub timeout_ms: u64,
    /// Appended after the generated arguments.
    pub extra_args: Vec<String>,
}

impl SolverConfig {
    pub fn new(kind: SolverKind, solver_path: PathBuf) -> Self {
        Self {
            kind,
            solver_path,
            timeout_ms: 0,
            extra_args: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Locate the binary for `kind` on `PATH` or in the usual install
    /// directories.
    pub fn auto_detect_for(kind: SolverKind) -> Result<Self, SolverError> {
        match kind.locate(std::env::var_os("PATH")) {
            Some(path) => {
                tracing::debug!(solver = %kind, path = %path.display(), "solver binary found");
                Ok(Self::new(kind, path))
            }
            None => Err(SolverError::NotFound(kind, PathBuf::from(kind.binary_name()))),
        }
    }

    /// Auto-detect Z3, the default solver.
    pub fn auto_detect() -> Result<Self, SolverError> {
        Self::auto_detect_for(SolverKind::Z3)
    }

    /// Command-line arguments for one check.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.kind.stdin_args();
        args.extend(self.kind.timeout_arg(self.timeout_ms));
        args.extend(self.extra_args.iter().cloned());
        args
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.solver_path.exists() {
            return Err(SolverError::NotFound(self.kind, self.solver_path.clone()));
        }
        Ok(())
    }
}

/// Which native string API the SMT-LIB backend targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StringTheoryKind {
    /// SMT-LIB 2.6 `str.*` operations with native regular expressions.
    #[default]
    Strings,
    /// Z3-style `seq.*` operations on strings; `re.opt` is synthesized.
    Sequences,
    /// Concatenation, length and equality only; no regular expressions.
    ConcatOnly,
}

impl fmt::Display for StringTheoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StringTheoryKind::Strings => write!(f, "strings"),
            StringTheoryKind::Sequences => write!(f, "sequences"),
            StringTheoryKind::ConcatOnly => write!(f, "concat-only"),
        }
    }
}

impl std::str::FromStr for StringTheoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strings" | "string" | "str" => Ok(StringTheoryKind::Strings),
            "sequences" | "sequence" | "seq" => Ok(StringTheoryKind::Sequences),
            "concat-only" | "concat_only" | "concat" => Ok(StringTheoryKind::ConcatOnly),
            _ => Err(format!(
                "Unknown string theory: {s}. Valid options: strings, sequences, concat-only"
            )),
        }
    }
}

/// Environment variable selecting the solver kind.
pub const ENV_SOLVER: &str = "SMTWRAP_SOLVER";
/// Environment variable with an explicit solver binary path.
pub const ENV_SOLVER_PATH: &str = "SMTWRAP_SOLVER_PATH";
/// Environment variable with the per-check timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "SMTWRAP_TIMEOUT_MS";
/// Environment variable selecting the string adapter.
pub const ENV_STRING_THEORY: &str = "SMTWRAP_STRING_THEORY";

/// Settings for one [`SolverContext`](crate::SolverContext).
#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub solver: SolverConfig,
    pub string_theory: StringTheoryKind,
    /// `(set-logic ...)` emitted before every check, if set.
    pub logic: Option<String>,
    pub random_seed: Option<u64>,
}

impl ContextConfig {
    pub fn new(solver: SolverConfig) -> Self {
        Self {
            solver,
            string_theory: StringTheoryKind::default(),
            logic: None,
            random_seed: None,
        }
    }

    pub fn with_string_theory(mut self, string_theory: StringTheoryKind) -> Self {
        self.string_theory = string_theory;
        self
    }

    pub fn with_logic(mut self, logic: impl Into<String>) -> Self {
        self.logic = Some(logic.into());
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Read `SMTWRAP_SOLVER`, `SMTWRAP_SOLVER_PATH`, `SMTWRAP_TIMEOUT_MS` and
    /// `SMTWRAP_STRING_THEORY`. Unset variables fall back to Z3 found by
    /// auto-detection, no timeout, and the `str.*` adapter.
    pub fn from_env() -> Result<Self, SolverError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SolverError> {
        let kind = match lookup(ENV_SOLVER) {
            Some(text) => text
                .parse::<SolverKind>()
                .map_err(|e| SolverError::Config(format!("{ENV_SOLVER}: {e}")))?,
            None => SolverKind::Z3,
        };
        let mut solver = match lookup(ENV_SOLVER_PATH) {
            Some(path) => SolverConfig::new(kind, PathBuf::from(path)),
            None => SolverConfig::auto_detect_for(kind)?,
        };
        if let Some(text) = lookup(ENV_TIMEOUT_MS) {
            let timeout_ms = text.trim().parse::<u64>().map_err(|e| {
                SolverError::Config(format!("{ENV_TIMEOUT_MS}: '{text}' is not a number ({e})"))
            })?;
            solver = solver.with_timeout(timeout_ms);
        }
        let string_theory = match lookup(ENV_STRING_THEORY) {
            Some(text) => text
                .parse::<StringTheoryKind>()
                .map_err(|e| SolverError::Config(format!("{ENV_STRING_THEORY}: {e}")))?,
            None => StringTheoryKind::default(),
        };
        tracing::debug!(
            solver = %kind,
            path = %solver.solver_path.display(),
            timeout_ms = solver.timeout_ms,
            %string_theory,
            "context configuration from environment"
        );
        Ok(Self::new(solver).with_string_theory(string_theory))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/opt/homebrew/bin/z3"));
        assert_eq!(config.solver_path, PathBuf::from("/opt/homebrew/bin/z3"));
        assert_eq!(config.kind, SolverKind::Z3);
        assert_eq!(config.timeout_ms, 0);
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn builder_pattern() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/opt/homebrew/bin/z3"))
            .with_timeout(5000)
            .with_extra_args(vec!["-v:1".to_string()]);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.extra_args, vec!["-v:1".to_string()]);
    }

    #[test]
    fn auto_detect_reports_kind_and_existing_path() {
        match SolverConfig::auto_detect() {
            Ok(config) => {
                assert!(config.solver_path.exists());
                assert_eq!(config.kind, SolverKind::Z3);
                assert!(config.validate().is_ok());
            }
            Err(err) => assert_eq!(err, SolverError::NotFound(SolverKind::Z3, "z3".into())),
        }
    }

    #[test]
    fn validate_missing_binary() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/nonexistent/z3"));
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            SolverError::NotFound(SolverKind::Z3, PathBuf::from("/nonexistent/z3"))
        );
    }

    // ---- SolverKind tests ----

    #[test]
    fn solver_kind_binary_names() {
        assert_eq!(SolverKind::Z3.binary_name(), "z3");
        assert_eq!(SolverKind::Cvc5.binary_name(), "cvc5");
        assert_eq!(SolverKind::Yices.binary_name(), "yices-smt2");
    }

    #[test]
    fn solver_kind_display() {
        assert_eq!(SolverKind::Z3.to_string(), "Z3");
        assert_eq!(SolverKind::Cvc5.to_string(), "CVC5");
        assert_eq!(SolverKind::Yices.to_string(), "Yices");
    }

    #[test]
    fn solver_kind_from_str() {
        assert_eq!("z3".parse::<SolverKind>().unwrap(), SolverKind::Z3);
        assert_eq!("cvc5".parse::<SolverKind>().unwrap(), SolverKind::Cvc5);
        assert_eq!("yices".parse::<SolverKind>().unwrap(), SolverKind::Yices);
        assert_eq!("yices2".parse::<SolverKind>().unwrap(), SolverKind::Yices);
        assert_eq!(
            "yices-smt2".parse::<SolverKind>().unwrap(),
            SolverKind::Yices
        );
        assert!("unknown".parse::<SolverKind>().is_err());
    }

    #[test]
    fn solver_kind_stdin_args() {
        assert_eq!(SolverKind::Z3.stdin_args(), vec!["-in", "-smt2"]);
        assert_eq!(SolverKind::Cvc5.stdin_args(), vec!["--lang=smt2"]);
        assert_eq!(SolverKind::Yices.stdin_args(), vec!["--incremental"]);
    }

    #[test]
    fn solver_kind_timeout_args() {
        assert_eq!(
            SolverKind::Z3.timeout_arg(5000),
            Some("-t:5000".to_string())
        );
        assert_eq!(
            SolverKind::Cvc5.timeout_arg(5000),
            Some("--tlimit-per=5000".to_string())
        );
        assert_eq!(
            SolverKind::Yices.timeout_arg(5000),
            Some("--timeout=5".to_string())
        );
        assert_eq!(SolverKind::Z3.timeout_arg(0), None);
    }

    #[test]
    fn yices_timeout_rounds_up_to_a_second() {
        assert_eq!(SolverKind::Yices.timeout_arg(1), Some("--timeout=1".to_string()));
        assert_eq!(SolverKind::Yices.timeout_arg(1500), Some("--timeout=2".to_string()));
    }

    // ---- Binary lookup ----

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("smtwrap-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn locate_prefers_path_entries_in_order() {
        let empty = scratch_dir("locate-empty");
        let first = scratch_dir("locate-first");
        let second = scratch_dir("locate-second");
        std::fs::write(first.join("cvc5"), b"").unwrap();
        std::fs::write(second.join("cvc5"), b"").unwrap();

        let path_var = std::env::join_paths([&empty, &first, &second]).unwrap();
        assert_eq!(SolverKind::Cvc5.locate(Some(path_var)), Some(first.join("cvc5")));
    }

    #[test]
    fn locate_skips_directories_named_like_the_binary() {
        let dir = scratch_dir("locate-dir");
        std::fs::create_dir_all(dir.join("yices-smt2")).unwrap();
        let path_var = std::env::join_paths([&dir]).unwrap();
        let found = SolverKind::Yices.locate(Some(path_var));
        assert_ne!(found, Some(dir.join("yices-smt2")));
    }

    // ---- StringTheoryKind / ContextConfig tests ----

    #[test]
    fn string_theory_round_trips_through_text() {
        for kind in [
            StringTheoryKind::Strings,
            StringTheoryKind::Sequences,
            StringTheoryKind::ConcatOnly,
        ] {
            assert_eq!(kind.to_string().parse::<StringTheoryKind>(), Ok(kind));
        }
        assert_eq!("SEQ".parse::<StringTheoryKind>(), Ok(StringTheoryKind::Sequences));
        assert!("regexes".parse::<StringTheoryKind>().is_err());
    }

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn context_config_from_variables() {
        let config = ContextConfig::from_lookup(lookup(&[
            (ENV_SOLVER, "cvc5"),
            (ENV_SOLVER_PATH, "/opt/solvers/cvc5"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_STRING_THEORY, "concat-only"),
        ]))
        .unwrap();
        assert_eq!(config.solver.kind, SolverKind::Cvc5);
        assert_eq!(config.solver.solver_path, PathBuf::from("/opt/solvers/cvc5"));
        assert_eq!(config.solver.timeout_ms, 2500);
        assert_eq!(config.string_theory, StringTheoryKind::ConcatOnly);
        assert_eq!(config.logic, None);
    }

    #[test]
    fn context_config_rejects_bad_values() {
        let err = ContextConfig::from_lookup(lookup(&[
            (ENV_SOLVER_PATH, "/usr/bin/z3"),
            (ENV_TIMEOUT_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SolverError::Config(msg) if msg.contains(ENV_TIMEOUT_MS)));

        let err = ContextConfig::from_lookup(lookup(&[(ENV_SOLVER, "minisat")])).unwrap_err();
        assert!(matches!(err, SolverError::Config(msg) if msg.contains("minisat")));
    }

    #[test]
    fn context_config_builders() {
        let config = ContextConfig::new(SolverConfig::new(SolverKind::Z3, "/usr/bin/z3".into()))
            .with_logic("QF_S")
            .with_random_seed(7)
            .with_string_theory(StringTheoryKind::Sequences);
        assert_eq!(config.logic.as_deref(), Some("QF_S"));
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.string_theory, StringTheoryKind::Sequences);
    }

    #[test]
    fn build_args_z3() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/usr/bin/z3"))
            .with_timeout(3000)
            .with_extra_args(vec!["-v:1".to_string()]);
        assert_eq!(config.build_args(), vec!["-in", "-smt2", "-t:3000", "-v:1"]);
    }

    #[test]
    fn build_args_cvc5() {
        let config =
            SolverConfig::new(SolverKind::Cvc5, PathBuf::from("/usr/bin/cvc5")).with_timeout(10000);
        assert_eq!(config.build_args(), vec!["--lang=smt2", "--tlimit-per=10000"]);
    }

    #[test]
    fn build_args_yices() {
        let config = SolverConfig::new(SolverKind::Yices, PathBuf::from("/usr/bin/yices-smt2"))
            .with_timeout(60000);
        let args = config.build_args();
        assert!(args.contains(&"--incremental".to_string()));
        assert!(args.contains(&"--timeout=60".to_string()));
    }
}
