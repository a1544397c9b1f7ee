use std::time::{Duration, Instant};

use crate::{
    foundation::error::{CdpError, CdpResult},
    process::supervisor::{ProcessOutcome, ProcessSpec, RunningProcess, run_process},
};

/// How a [`ProcessGroup`] runs its tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupMode {
    /// Start everything, then poll until all exit; the first failure to complete wins.
    #[default]
    Parallel,
    /// Run one at a time in registration order, stopping at the first failure.
    Sequential,
}

/// A cohort of external processes that succeed or fail together.
#[derive(Clone, Debug)]
pub struct ProcessGroup {
    label: String,
    tasks: Vec<ProcessSpec>,
    timeout: Duration,
    poll: Duration,
    max_error_chars: usize,
}

impl ProcessGroup {
    pub fn new(label: impl Into<String>, timeout: Duration, poll: Duration) -> Self {
        Self {
            label: label.into(),
            tasks: Vec::new(),
            timeout,
            poll: poll.max(Duration::from_millis(1)),
            max_error_chars: 2000,
        }
    }

    pub fn with_max_error_chars(mut self, max: usize) -> Self {
        self.max_error_chars = max;
        self
    }

    pub fn add_task(&mut self, spec: ProcessSpec) {
        self.tasks.push(spec);
    }

    pub fn tasks(&self) -> &[ProcessSpec] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn run(&self, mode: GroupMode) -> CdpResult<Vec<ProcessOutcome>> {
        match mode {
            GroupMode::Parallel => self.run_parallel(),
            GroupMode::Sequential => self.run_sequential(),
        }
    }

    /// Run the group and report as text: empty on success, otherwise the failure message.
    pub fn wait_for_finished(&self, mode: GroupMode) -> String {
        match self.run(mode) {
            Ok(_) => String::new(),
            Err(CdpError::StageTimeout { .. }) => "Wait time exceeded".to_string(),
            Err(CdpError::StageFailure { output, .. }) => output,
            Err(e) => e.to_string(),
        }
    }

    /// Start every task, then poll until all exit.
    ///
    /// Returns outcomes in registration order. The first task to *finish* unsuccessfully
    /// aborts the wait; every task still running is killed. The group timeout covers the
    /// whole cohort.
    #[tracing::instrument(skip(self), fields(label = %self.label, tasks = self.tasks.len()))]
    pub fn run_parallel(&self) -> CdpResult<Vec<ProcessOutcome>> {
        let started = Instant::now();
        // dropped on early return, which kills whatever is still running
        let mut running = self
            .tasks
            .iter()
            .map(|spec| RunningProcess::spawn(spec).map(Some))
            .collect::<CdpResult<Vec<_>>>()?;
        let mut outcomes: Vec<Option<ProcessOutcome>> = vec![None; running.len()];
        let mut remaining = running.len();

        while remaining > 0 {
            for (slot, outcome_slot) in running.iter_mut().zip(outcomes.iter_mut()) {
                let Some(proc) = slot.as_mut() else {
                    continue;
                };
                if let Some(outcome) = proc.try_finish()? {
                    *slot = None;
                    remaining -= 1;
                    *outcome_slot = Some(outcome.check(self.max_error_chars)?);
                }
            }
            if remaining == 0 {
                break;
            }
            if started.elapsed() >= self.timeout {
                tracing::warn!(unfinished = remaining, "group wait exceeded");
                return Err(CdpError::stage_timeout(
                    self.label.clone(),
                    self.timeout.as_millis() as u64,
                ));
            }
            std::thread::sleep(self.poll);
        }

        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "group finished");
        Ok(outcomes.into_iter().flatten().collect())
    }

    /// Run tasks one after another; later tasks never start after a failure.
    #[tracing::instrument(skip(self), fields(label = %self.label, tasks = self.tasks.len()))]
    pub fn run_sequential(&self) -> CdpResult<Vec<ProcessOutcome>> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for spec in &self.tasks {
            let outcome = run_process(spec, self.timeout, self.poll)?;
            outcomes.push(outcome.check(self.max_error_chars)?);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/process/group.rs"]
mod tests;
