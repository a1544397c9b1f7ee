use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::foundation::{
    core::truncate_output,
    error::{CdpError, CdpResult},
};

/// Substrings that mark a run as failed even when the exit status says otherwise.
///
/// Some toolchain builds exit 0 after printing a usage or error banner, so the text scan
/// is applied on every platform.
pub const FAILURE_MARKERS: &[&str] = &["ERROR", "Application doesn't work"];

pub fn is_failure_output(text: &str) -> bool {
    FAILURE_MARKERS.iter().any(|m| text.contains(m))
}

/// One external program invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessSpec {
    /// Stage or task name used in errors and logs.
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Extra environment for the child; the parent environment is inherited.
    pub env: Vec<(String, String)>,
}

impl ProcessSpec {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn envs(mut self, env: &[(String, String)]) -> Self {
        self.env.extend_from_slice(env);
        self
    }

    /// Path argument helper; non-UTF-8 paths are passed lossily.
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy())
    }

    /// Human-readable command line for logs.
    pub fn command_line(&self) -> String {
        let mut out = self.program.display().to_string();
        for a in &self.args {
            out.push(' ');
            out.push_str(a);
        }
        out
    }
}

/// A finished process: its exit status and combined stdout + stderr text.
#[derive(Clone, Debug)]
pub struct ProcessOutcome {
    pub label: String,
    pub output: String,
    pub exit_code: Option<i32>,
    pub exit_ok: bool,
    pub elapsed: Duration,
}

impl ProcessOutcome {
    /// Success needs a clean exit status and no failure marker in the output.
    pub fn succeeded(&self) -> bool {
        self.exit_ok && !is_failure_output(&self.output)
    }

    /// Convert into a [`CdpError::StageFailure`] when the run failed.
    pub fn check(self, max_chars: usize) -> CdpResult<Self> {
        if self.succeeded() {
            return Ok(self);
        }
        let mut text = truncate_output(&self.output, max_chars);
        if !self.exit_ok {
            let code = self
                .exit_code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            if text.is_empty() {
                text = format!("exited with status {code}");
            } else {
                text = format!("exited with status {code}: {text}");
            }
        }
        Err(CdpError::stage_failure(self.label, text))
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

/// A spawned child whose output is drained on background threads.
///
/// Dropping a still-running process kills it.
#[derive(Debug)]
pub struct RunningProcess {
    label: String,
    child: Child,
    stdout: Option<Drain>,
    stderr: Option<Drain>,
    started: Instant,
    finished: bool,
}

impl RunningProcess {
    pub fn spawn(spec: &ProcessSpec) -> CdpResult<Self> {
        tracing::debug!(label = %spec.label, cmd = %spec.command_line(), "launching");
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                CdpError::stage_failure(
                    spec.label.clone(),
                    format!("could not start '{}': {e}", spec.program.display()),
                )
            })?;
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);
        Ok(Self {
            label: spec.label.clone(),
            child,
            stdout,
            stderr,
            started: Instant::now(),
            finished: false,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Non-blocking: `Some` once the child has exited and its output is collected.
    pub fn try_finish(&mut self) -> CdpResult<Option<ProcessOutcome>> {
        let status = self.child.try_wait().map_err(|e| {
            CdpError::stage_failure(self.label.clone(), format!("wait failed: {e}"))
        })?;
        match status {
            Some(status) => Ok(Some(self.collect(status))),
            None => Ok(None),
        }
    }

    pub fn kill(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Err(e) = self.child.kill() {
            tracing::debug!(label = %self.label, error = %e, "kill failed");
        }
        let _ = self.child.wait();
    }

    fn collect(&mut self, status: ExitStatus) -> ProcessOutcome {
        self.finished = true;
        let mut output = join_drain(self.stdout.take());
        let err = join_drain(self.stderr.take());
        if !err.is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&err);
        }
        let elapsed = self.started.elapsed();
        tracing::debug!(
            label = %self.label,
            code = ?status.code(),
            elapsed_ms = elapsed.as_millis() as u64,
            "process exited"
        );
        ProcessOutcome {
            label: self.label.clone(),
            output,
            exit_code: status.code(),
            exit_ok: status.success(),
            elapsed,
        }
    }
}

impl Drop for RunningProcess {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(label = %self.label, "killing unfinished process");
            self.kill();
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(handle: Option<Drain>) -> String {
    match handle.map(JoinHandle::join) {
        Some(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
        _ => String::new(),
    }
}

/// Run one process to completion, polling every `poll` until it exits or `timeout` passes.
///
/// Timeout is reported as [`CdpError::StageTimeout`] and the child is killed. The outcome is
/// returned whether or not the program succeeded; use [`ProcessOutcome::check`] to classify.
pub fn run_process(
    spec: &ProcessSpec,
    timeout: Duration,
    poll: Duration,
) -> CdpResult<ProcessOutcome> {
    let mut running = RunningProcess::spawn(spec)?;
    loop {
        if let Some(outcome) = running.try_finish()? {
            return Ok(outcome);
        }
        if running.elapsed() >= timeout {
            running.kill();
            tracing::warn!(label = %spec.label, timeout_ms = timeout.as_millis() as u64, "process timed out");
            return Err(CdpError::stage_timeout(
                spec.label.clone(),
                timeout.as_millis() as u64,
            ));
        }
        std::thread::sleep(poll);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/supervisor.rs"]
mod tests;
