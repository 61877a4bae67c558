//! Execution of external commands through `sh -c`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::{Result, ShellError};
use crate::sanitize::sanitize;

/// Interval between exit checks while a timeout is running.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs commands in a fixed working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    working_dir: PathBuf,
    timeout: Option<Duration>,
}

impl Shell {
    /// Creates a shell rooted at `working_dir` with no timeout.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            timeout: None,
        }
    }

    /// Sets the timeout; `None` waits indefinitely.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the working directory.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Builds the command line: `command` followed by each argument in
    /// single quotes.
    #[must_use]
    pub fn command_line(command: &str, args: &[&str]) -> String {
        let mut line = command.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&quote(arg));
        }
        line
    }

    /// Runs `command` with `args` and returns its standard output lines.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Spawn`] if the process cannot be started,
    /// [`ShellError::Timeout`] if it outlives the timeout (it is killed),
    /// and [`ShellError::Failed`] if it exits unsuccessfully.
    pub fn execute(&self, command: &str, args: &[&str]) -> Result<Vec<String>> {
        let line = Self::command_line(command, args);
        let shown = sanitize(&line);
        tracing::info!(command = %shown, cwd = %self.working_dir.display(), "executing");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&line)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ShellError::Spawn {
                command: shown.clone(),
                source: e,
            })?;

        let stdout = capture(child.stdout.take());
        let stderr = capture(child.stderr.take());

        let status = self.wait(&mut child).map_err(|e| ShellError::Spawn {
            command: shown.clone(),
            source: e,
        })?;
        let Some(status) = status else {
            return Err(ShellError::Timeout {
                command: shown,
                timeout: self.timeout.unwrap_or_default(),
            });
        };

        let output = collect(stdout);
        let errors = collect(stderr);
        if !output.is_empty() {
            tracing::debug!(output = %sanitize(output.trim_end()), "command output");
        }

        if !status.success() {
            return Err(ShellError::Failed {
                command: shown,
                code: status.code().unwrap_or(-1),
                stderr: sanitize(errors.trim_end()),
            });
        }

        Ok(output.lines().map(str::to_string).collect())
    }

    /// Waits for `child`, killing it when the timeout expires.
    /// Returns `None` on timeout.
    fn wait(&self, child: &mut Child) -> std::io::Result<Option<ExitStatus>> {
        let Some(timeout) = self.timeout else {
            return child.wait().map(Some);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                tracing::warn!(timeout_s = timeout.as_secs_f64(), "command timed out; killing");
                child.kill()?;
                let _ = child.wait()?;
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Resolves `program` on the search path.
///
/// # Errors
///
/// Returns [`ShellError::NotFound`] if the program cannot be located.
pub fn resolve_program(program: &str) -> Result<PathBuf> {
    let path = which::which(program).map_err(|e| ShellError::NotFound {
        program: program.to_string(),
        source: e,
    })?;
    tracing::debug!(program, path = %path.display(), "program resolved");
    Ok(path)
}

/// Wraps `arg` in single quotes, escaping embedded single quotes.
fn quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Drains a pipe on its own thread so a chatty process cannot block on a
/// full buffer.
fn capture<R>(pipe: Option<R>) -> Option<JoinHandle<std::io::Result<String>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf)?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        })
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<String>>>) -> String {
    let Some(handle) = handle else {
        return String::new();
    };
    match handle.join() {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "failed to capture command output");
            String::new()
        }
        Err(_) => {
            tracing::error!("output capture thread panicked");
            String::new()
        }
    }
}
