//! Guard-probe sandbox.
//!
//! The engine never evaluates snippets itself; it hands them to a
//! [`SnippetSandbox`] collaborator. That keeps the engine deterministic and
//! testable with a scripted sandbox, and keeps all side effects of probing
//! (imports, filesystem access) inside a short-lived throwaway scope.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::SandboxError;

/// Executes short source snippets in an isolated, throwaway scope.
///
/// Implementations must be shareable across module-processing workers.
pub trait SnippetSandbox: Send + Sync {
    /// Run the guard context statements in order, in a fresh scope.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError`] when any statement fails; the caller treats
    /// that as "this rule group is inapplicable", never as a compiler error.
    fn probe(&self, statements: &[String]) -> Result<(), SandboxError>;

    /// Run the context statements, then evaluate one expression and return
    /// its textual value.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError`] when the context or the expression fails.
    fn evaluate(&self, statements: &[String], expression: &str) -> Result<String, SandboxError>;
}

/// Default poll interval while waiting for a probe process.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default wall-clock deadline for a single probe.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sandbox backed by the compile host's Python interpreter.
///
/// Every call spawns a fresh `python -c` process, so probes cannot leak
/// state into each other or into the compiler. A probe that fails to
/// finish within the deadline is killed and reported as failed, never
/// left hanging.
#[derive(Debug, Clone)]
pub struct PythonSandbox {
    interpreter: PathBuf,
    timeout: Duration,
}

impl PythonSandbox {
    /// Sandbox using an explicit interpreter path.
    #[must_use]
    pub fn new(interpreter: PathBuf) -> Self {
        Self {
            interpreter,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Locate `python3` (or `python`) on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::InterpreterNotFound`] when neither exists.
    pub fn discover() -> Result<Self, SandboxError> {
        which::which("python3")
            .or_else(|_| which::which("python"))
            .map(Self::new)
            .map_err(|e| SandboxError::InterpreterNotFound(e.to_string()))
    }

    /// Override the per-probe deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn run(&self, program: &str) -> Result<String, SandboxError> {
        let mut child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(program)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes off-thread; a probe writing more than the pipe
        // buffer would otherwise block forever and hit the deadline.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = self.wait_with_deadline(&mut child);
        // Killing the child closes the pipes, so the readers always finish.
        let stdout = join_reader(stdout)?;
        let stderr = join_reader(stderr)?;
        let status = status?;

        if status.success() {
            Ok(stdout)
        } else {
            let detail = last_line(&stderr).unwrap_or("probe exited with failure");
            Err(SandboxError::Probe(detail.to_string()))
        }
    }

    fn wait_with_deadline(
        &self,
        child: &mut Child,
    ) -> Result<std::process::ExitStatus, SandboxError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(SandboxError::Timeout(self.timeout.as_secs()));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl SnippetSandbox for PythonSandbox {
    fn probe(&self, statements: &[String]) -> Result<(), SandboxError> {
        self.run(&statements.join("\n")).map(|_| ())
    }

    fn evaluate(&self, statements: &[String], expression: &str) -> Result<String, SandboxError> {
        let mut program = statements.join("\n");
        if !program.is_empty() {
            program.push('\n');
        }
        // str() of the expression goes to stdout without a trailing newline.
        program.push_str("import sys\n");
        program.push_str(&format!("sys.stdout.write(str(({expression})))\n"));
        self.run(&program)
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    stream: Option<R>,
) -> std::thread::JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut raw = Vec::new();
        if let Some(mut stream) = stream {
            stream.read_to_end(&mut raw)?;
        }
        Ok(raw)
    })
}

fn join_reader(
    handle: std::thread::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<String, SandboxError> {
    let raw = handle.join().unwrap_or_else(|_| Ok(Vec::new()))?;
    String::from_utf8(raw).map_err(|_| SandboxError::Output)
}

fn last_line(text: &str) -> Option<&str> {
    text.lines().rev().find(|line| !line.trim().is_empty())
}
