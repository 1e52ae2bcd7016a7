use std::io::{Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use smtwrap_api::ShutdownNotifier;
use smtwrap_smtlib::Script;

use crate::config::{SolverConfig, SolverKind};
use crate::error::SolverError;
use crate::parser::parse_solver_output;
use crate::result::SolverResult;

/// How often a running solver is polled for exit and shutdown requests.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Time a solver gets past its own timeout before it is killed.
const KILL_GRACE: Duration = Duration::from_millis(1000);

/// Subprocess SMT solver (Z3, CVC5 or Yices).
///
/// Communicates with the solver by spawning it as a subprocess and piping
/// SMT-LIB2 text.
#[derive(Debug)]
pub struct CliSolver {
    config: SolverConfig,
}

impl CliSolver {
    /// Create a new `CliSolver` with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Create a `CliSolver` with auto-detected Z3 location and default settings.
    pub fn with_default_config() -> Result<Self, SolverError> {
        Self::with_default_config_for(SolverKind::Z3)
    }

    /// Create a `CliSolver` for `kind` with auto-detected location.
    pub fn with_default_config_for(kind: SolverKind) -> Result<Self, SolverError> {
        let config = SolverConfig::auto_detect_for(kind)?;
        Ok(Self { config })
    }

    /// Get a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Check satisfiability of a Script.
    ///
    /// Formats the script to SMT-LIB2 text, appending `(check-sat)` and
    /// `(get-model)` if not already present.
    pub fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        self.check_sat_interruptible(script, &ShutdownNotifier::never())
    }

    /// Like [`check_sat`](Self::check_sat), but kills the solver as soon as
    /// `notifier` reports a shutdown request.
    pub fn check_sat_interruptible(
        &self,
        script: &Script,
        notifier: &ShutdownNotifier,
    ) -> Result<SolverResult, SolverError> {
        let mut script = script.clone();
        script.ensure_check_sat_and_get_model();
        self.run(&script.to_string(), notifier)
    }

    /// Check satisfiability from a raw SMT-LIB2 string.
    pub fn check_sat_raw(&self, smtlib: &str) -> Result<SolverResult, SolverError> {
        self.run(smtlib, &ShutdownNotifier::never())
    }

    fn run(&self, smtlib: &str, notifier: &ShutdownNotifier) -> Result<SolverResult, SolverError> {
        self.config.validate()?;
        check_shutdown(notifier)?;

        let kind = self.config.kind;
        let args = self.config.build_args();
        tracing::trace!(solver = %kind, ?args, "spawning solver");

        let start = Instant::now();
        let mut child = Command::new(&self.config.solver_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolverError::ProcessError(format!("Failed to start {kind}: {e}")))?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        // Write SMT-LIB to stdin, then close it so the solver sees EOF
        {
            let Some(mut stdin) = child.stdin.take() else {
                kill(&mut child);
                return Err(SolverError::ProcessError(format!(
                    "Failed to open {kind} stdin"
                )));
            };
            if let Err(e) = stdin.write_all(smtlib.as_bytes()) {
                kill(&mut child);
                return Err(SolverError::ProcessError(format!(
                    "Failed to write to {kind} stdin: {e}"
                )));
            }
        }

        let deadline = (self.config.timeout_ms > 0)
            .then(|| start + Duration::from_millis(self.config.timeout_ms) + KILL_GRACE);
        wait(&mut child, notifier, deadline)?;

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        tracing::debug!(
            solver = %kind,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "solver finished"
        );

        // Check for timeout
        if stderr.contains("timeout") || stdout.trim() == "timeout" {
            return Ok(SolverResult::Unknown("timeout".to_string()));
        }

        parse_solver_output(&stdout, &stderr)
    }
}

fn check_shutdown(notifier: &ShutdownNotifier) -> Result<(), SolverError> {
    if notifier.is_shutdown_requested() {
        let reason = notifier
            .reason()
            .unwrap_or_else(|| "shutdown requested".to_string());
        return Err(SolverError::Interrupted(reason));
    }
    Ok(())
}

/// Poll `child` until it exits, the shutdown notifier fires, or `deadline`
/// passes. The latter two kill the process.
fn wait(
    child: &mut Child,
    notifier: &ShutdownNotifier,
    deadline: Option<Instant>,
) -> Result<ExitStatus, SolverError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => {
                kill(child);
                return Err(SolverError::ProcessError(format!(
                    "Failed to wait for solver: {e}"
                )));
            }
        }
        if let Err(err) = check_shutdown(notifier) {
            tracing::debug!("killing solver on shutdown request");
            kill(child);
            return Err(err);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::debug!("killing solver past its time limit");
            kill(child);
            return Err(SolverError::Timeout);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Read a pipe to the end on its own thread so a chatty solver never blocks
/// on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    let mut pipe = pipe?;
    Some(thread::spawn(move || {
        let mut bytes = Vec::new();
        let _ = pipe.read_to_end(&mut bytes);
        String::from_utf8_lossy(&bytes).into_owned()
    }))
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use smtwrap_api::ShutdownManager;
    use smtwrap_smtlib::{Command as SmtCmd, Sort, Term};

    fn solver() -> Option<CliSolver> {
        CliSolver::with_default_config().ok()
    }

    fn positive_x() -> Script {
        let mut script = Script::new();
        script.push(SmtCmd::SetLogic("QF_LIA".to_string()));
        script.push(SmtCmd::DeclareConst("x".to_string(), Sort::Int));
        script.push(SmtCmd::Assert(Term::Gt(
            Box::new(Term::constant("x")),
            Box::new(Term::int(0)),
        )));
        script
    }

    #[test]
    fn missing_binary_is_reported_before_spawning() {
        let solver = CliSolver::new(SolverConfig::new(
            SolverKind::Cvc5,
            "/nonexistent/bin/cvc5".into(),
        ));
        let err = solver.check_sat(&positive_x()).unwrap_err();
        assert!(matches!(err, SolverError::NotFound(SolverKind::Cvc5, _)));
    }

    #[test]
    fn interrupted_before_start() {
        let Some(solver) = solver() else {
            return;
        };
        let manager = ShutdownManager::new();
        manager.request_shutdown("user cancelled");
        let err = solver
            .check_sat_interruptible(&positive_x(), &manager.notifier())
            .unwrap_err();
        assert_eq!(err, SolverError::Interrupted("user cancelled".to_string()));
    }

    #[test]
    fn sat_with_model() {
        let Some(solver) = solver() else {
            return;
        };
        let result = solver.check_sat(&positive_x()).unwrap();
        let model = result.model().expect("sat result carries a model");
        assert!(matches!(model.get("x"), Some(Term::IntLit(n)) if *n > BigInt::from(0)));
    }

    #[test]
    fn raw_unsat() {
        let Some(solver) = solver() else {
            return;
        };
        let result = solver
            .check_sat_raw("(declare-const p Bool)\n(assert (and p (not p)))\n(check-sat)\n")
            .unwrap();
        assert!(result.is_unsat());
    }

    #[test]
    fn solver_error_fails_the_check() {
        let Some(solver) = solver() else {
            return;
        };
        let err = solver
            .check_sat_raw("(assert (> undeclared 0))\n(check-sat)\n")
            .unwrap_err();
        assert!(matches!(err, SolverError::ProcessError(_)));
    }

    // ---- Shutdown while running ----

    /// Executable that swallows stdin and then never answers.
    #[cfg(unix)]
    fn hanging_solver(name: &str) -> std::path::PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = std::env::temp_dir().join(format!("smtwrap-{name}-{}.sh", std::process::id()));
        std::fs::write(&path, "#!/bin/sh\ncat >/dev/null\nexec sleep 30\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn shutdown_kills_a_running_solver() {
        let solver = CliSolver::new(SolverConfig::new(
            SolverKind::Z3,
            hanging_solver("hang-cli"),
        ));
        let manager = ShutdownManager::new();
        let notifier = manager.notifier();
        let trigger = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            manager.request_shutdown("stop");
        });

        let start = Instant::now();
        let err = solver.check_sat_interruptible(&positive_x(), &notifier).unwrap_err();
        let elapsed = start.elapsed();
        trigger.join().unwrap();

        assert_eq!(err, SolverError::Interrupted("stop".to_string()));
        assert!(elapsed < Duration::from_secs(10), "took {elapsed:?}");
    }
}
