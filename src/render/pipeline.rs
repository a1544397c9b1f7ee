//! The render state machine.
//!
//! A render attempt validates its inputs, builds a [`RenderPlan`], then folds the plan's
//! stages over a list of *lanes* (one file per channel being processed). Each stage maps the
//! current lanes to new files through a [`ProcessGroup`]. Every file an attempt creates is
//! registered in a [`TempLedger`] that is dropped when the attempt returns; only the final
//! output is taken back out of it and committed.

use std::{
    path::{Path, PathBuf},
    sync::{Mutex, mpsc::Sender},
    time::Instant,
};

use crate::{
    curve::{materialize::materialize_argument, naming::TempNamer},
    foundation::{
        core::TimeRange,
        error::{CdpError, CdpResult},
    },
    media::info::AudioInfoProvider,
    params::processor::{PRE_VOLUME, ProcessorDescriptor},
    process::{
        group::{GroupMode, ProcessGroup},
        supervisor::ProcessSpec,
    },
    render::{
        config::RenderConfig,
        epoch::TaskEpoch,
        event::{EventSink, RenderEvent},
        job::RenderJob,
        ledger::TempLedger,
        plan::{RenderPlan, Stage},
    },
};

/// Result of a render attempt that did not fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Committed(PathBuf),
    /// A newer render was requested; nothing was committed.
    Superseded,
}

/// Per-attempt state threaded through the stages.
struct Attempt<'a> {
    job: &'a RenderJob,
    input_duration: f64,
    window: TimeRange,
    ledger: TempLedger,
}

/// Runs render attempts and owns the committed output.
#[derive(Debug)]
pub struct RenderPipeline {
    config: RenderConfig,
    epoch: TaskEpoch,
    events: EventSink,
    namer: TempNamer,
    committed: Mutex<Option<PathBuf>>,
}

impl RenderPipeline {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            namer: TempNamer::new(config.render_dir.clone()),
            config,
            epoch: TaskEpoch::new(),
            events: EventSink::none(),
            committed: Mutex::new(None),
        }
    }

    pub fn with_events(mut self, tx: Sender<RenderEvent>) -> Self {
        self.events = EventSink::new(tx);
        self
    }

    /// Share an epoch counter with other pipelines or the caller.
    pub fn with_epoch(mut self, epoch: TaskEpoch) -> Self {
        self.epoch = epoch;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Handle for superseding in-flight renders.
    pub fn epoch(&self) -> TaskEpoch {
        self.epoch.clone()
    }

    pub fn committed_output(&self) -> Option<PathBuf> {
        self.committed.lock().ok().and_then(|c| c.clone())
    }

    /// Take ownership of the committed file; the next commit will no longer delete it.
    pub fn take_committed_output(&self) -> Option<PathBuf> {
        self.committed.lock().ok().and_then(|mut c| c.take())
    }

    /// Run one render attempt to completion.
    ///
    /// Stage failures surface as errors after a [`RenderEvent::Failed`] event. All files the
    /// attempt created, except a committed output, are deleted before this returns.
    #[tracing::instrument(skip_all, fields(input = %job.input.display(), program = %job.processor.program))]
    pub fn render(
        &self,
        job: &RenderJob,
        audio: &dyn AudioInfoProvider,
    ) -> CdpResult<RenderOutcome> {
        let captured = self.epoch.current();
        match self.render_attempt(job, audio, captured) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if !e.is_silent() {
                    tracing::warn!(error = %e, "render failed");
                    self.events.send(RenderEvent::Failed(e.to_string()));
                }
                Err(e)
            }
        }
    }

    fn render_attempt(
        &self,
        job: &RenderJob,
        audio: &dyn AudioInfoProvider,
        captured: u64,
    ) -> CdpResult<RenderOutcome> {
        if job.input.as_os_str().is_empty() {
            return Err(CdpError::input("no input file set"));
        }
        self.config.validate_binaries()?;
        if !job.input.is_file() {
            return Err(CdpError::input(format!(
                "input file '{}' does not exist",
                job.input.display()
            )));
        }
        let info = audio.probe(&job.input)?;
        let input_duration = info.length_seconds();
        if input_duration <= 0.0 {
            return Err(CdpError::input(format!(
                "input file '{}' is empty",
                job.input.display()
            )));
        }
        let window = job.resolve_selection(input_duration)?;
        let plan = RenderPlan::build(&job.processor, info.channels, window, job.downmix);
        tracing::debug!(stages = ?plan.stages, lanes = plan.lanes, "render plan");

        let attempt = Attempt {
            job,
            input_duration,
            window,
            ledger: TempLedger::new(),
        };
        let mut lanes = vec![job.input.clone()];
        for stage in &plan.stages {
            let started = Instant::now();
            let result = self.run_stage(&attempt, stage, &lanes);

            // A superseded attempt is discarded whether or not its main stage succeeded.
            if matches!(stage, Stage::MainTransform) && !self.epoch.is_current(captured) {
                tracing::info!(
                    epoch = captured,
                    stage_ok = result.is_ok(),
                    "render superseded, discarding outputs"
                );
                self.events
                    .send(RenderEvent::Superseded { epoch: captured });
                return Ok(RenderOutcome::Superseded);
            }
            lanes = result?;
            tracing::info!(
                stage = stage.label(),
                lanes = lanes.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "stage finished"
            );
            self.events.status(stage.status_ok());
        }

        let output = match lanes.as_slice() {
            [single] => single.clone(),
            _ => {
                return Err(CdpError::output_missing(format!(
                    "render finished with {} output files instead of one",
                    lanes.len()
                )));
            }
        };
        if !output.is_file() {
            return Err(CdpError::output_missing(format!(
                "final output '{}' was not created",
                output.display()
            )));
        }
        attempt.ledger.forget(&output);
        self.commit(&attempt.ledger, output.clone());
        self.events.status("CDP process ok!");
        self.events.send(RenderEvent::Committed(output.clone()));
        Ok(RenderOutcome::Committed(output))
    }

    /// Make `output` the committed result; the previous one is left for `ledger` to delete.
    fn commit(&self, ledger: &TempLedger, output: PathBuf) {
        let previous = match self.committed.lock() {
            Ok(mut c) => c.replace(output),
            Err(poisoned) => poisoned.into_inner().replace(output),
        };
        if let Some(old) = previous {
            ledger.register(old);
        }
    }

    fn run_stage(
        &self,
        attempt: &Attempt<'_>,
        stage: &Stage,
        lanes: &[PathBuf],
    ) -> CdpResult<Vec<PathBuf>> {
        let processor = &attempt.job.processor;
        let mut group = self.group(stage.label());
        let mut mode = GroupMode::Parallel;

        let outputs = match *stage {
            Stage::Cut { window } => {
                let out = self.temp_output(attempt, "cut", &self.config.sound_ext);
                let end = (window.end - 0.001).max(window.start);
                group.add_task(
                    self.tool("sfedit", stage)
                        .args(["cut", "1"])
                        .path_arg(&lanes[0])
                        .arg(format!("-f{}", out.display()))
                        .arg(window.start.to_string())
                        .arg(end.to_string()),
                );
                vec![out]
            }
            Stage::MonoDownmix => {
                let out = self.temp_output(attempt, "mono", &self.config.sound_ext);
                group.add_task(
                    self.tool("housekeep", stage)
                        .args(["chans", "4"])
                        .path_arg(&lanes[0])
                        .arg(format!("-f{}", out.display())),
                );
                vec![out]
            }
            Stage::PreGain => {
                let gain = materialize_argument(
                    &processor.parameters[PRE_VOLUME],
                    processor,
                    attempt.input_duration,
                    attempt.window,
                    self.config.curve_subdivisions,
                    &self.namer,
                )?;
                if let Some(path) = gain.cleanup {
                    attempt.ledger.register(path);
                }
                let out = self.temp_output(attempt, "gain", &self.config.sound_ext);
                group.add_task(
                    self.tool("modify", stage)
                        .args(["loudness", "2"])
                        .path_arg(&lanes[0])
                        .arg(format!("-f{}", out.display()))
                        .arg(gain.text),
                );
                vec![out]
            }
            Stage::ChannelSplit { channels } => {
                let outs = split_names(&lanes[0], channels);
                for out in &outs {
                    attempt.ledger.register_unchecked(out);
                }
                group.add_task(
                    self.tool("housekeep", stage)
                        .args(["chans", "2"])
                        .path_arg(&lanes[0]),
                );
                outs
            }
            Stage::SpectralAnalysis {
                window_size,
                overlap,
            } => lanes
                .iter()
                .map(|lane| {
                    let out = self.temp_output(
                        attempt,
                        &format!("{}_{window_size}_{overlap}", file_stem(lane)),
                        "ana",
                    );
                    group.add_task(
                        self.tool("pvoc", stage)
                            .args(["anal", "1"])
                            .path_arg(lane)
                            .path_arg(&out)
                            .arg(format!("-c{window_size}"))
                            .arg(format!("-o{overlap}")),
                    );
                    out
                })
                .collect(),
            Stage::MainTransform => {
                if !self.config.parallel_main {
                    mode = GroupMode::Sequential;
                }
                let args = self.main_arguments(attempt, processor)?;
                lanes
                    .iter()
                    .map(|lane| {
                        let ext = if processor.is_spectral {
                            "ana"
                        } else {
                            self.config.sound_ext.as_str()
                        };
                        let out = self.temp_output(attempt, "main", ext);
                        let mut spec = self
                            .tool(&processor.program, stage)
                            .arg(processor.sub_command.clone());
                        if let Some(m) = &processor.mode {
                            spec = spec.arg(m.clone());
                        }
                        spec = spec.path_arg(lane);
                        spec = if processor.is_spectral {
                            spec.path_arg(&out)
                        } else {
                            spec.arg(format!("-f{}", out.display()))
                        };
                        group.add_task(spec.args(args.iter().cloned()));
                        out
                    })
                    .collect()
            }
            Stage::SpectralResynthesis => lanes
                .iter()
                .map(|lane| {
                    let out = self.temp_output(attempt, "synth", &self.config.sound_ext);
                    group.add_task(
                        self.tool("pvoc", stage)
                            .arg("synth")
                            .path_arg(lane)
                            .arg(format!("-f{}", out.display())),
                    );
                    out
                })
                .collect(),
            Stage::ChannelMerge => {
                let out = self.temp_output(attempt, "merge", &self.config.sound_ext);
                let mut spec = self.tool("submix", stage).arg("interleave");
                for lane in lanes {
                    spec = spec.path_arg(lane);
                }
                group.add_task(spec.path_arg(&out));
                vec![out]
            }
        };

        group.run(mode)?;
        ensure_outputs(&outputs)?;
        Ok(outputs)
    }

    /// Arguments for every main-program parameter, shared by all lanes.
    fn main_arguments(
        &self,
        attempt: &Attempt<'_>,
        processor: &ProcessorDescriptor,
    ) -> CdpResult<Vec<String>> {
        processor
            .main_parameters()
            .iter()
            .map(|param| {
                let arg = materialize_argument(
                    param,
                    processor,
                    attempt.input_duration,
                    attempt.window,
                    self.config.curve_subdivisions,
                    &self.namer,
                )?;
                if let Some(path) = arg.cleanup {
                    attempt.ledger.register(path);
                }
                Ok(arg.text)
            })
            .collect()
    }

    fn group(&self, label: &str) -> ProcessGroup {
        ProcessGroup::new(label, self.config.max_wait(), self.config.poll_interval())
            .with_max_error_chars(self.config.max_error_chars)
    }

    fn tool(&self, program: &str, stage: &Stage) -> ProcessSpec {
        ProcessSpec::new(stage.label(), self.config.program(program)).envs(&self.config.child_env())
    }

    /// A fresh temp path, registered for cleanup before any process writes it.
    fn temp_output(&self, attempt: &Attempt<'_>, stem: &str, ext: &str) -> PathBuf {
        let path = self.namer.unique(stem, ext);
        attempt.ledger.register(&path);
        path
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Files `housekeep chans 2` writes beside its input: `<stem>_c<N>.<ext>`, N from 1.
pub fn split_names(input: &Path, channels: u32) -> Vec<PathBuf> {
    let stem = file_stem(input);
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (1..=channels)
        .map(|n| input.with_file_name(format!("{stem}_c{n}{ext}")))
        .collect()
}

fn ensure_outputs(outputs: &[PathBuf]) -> CdpResult<()> {
    let missing: Vec<String> = outputs
        .iter()
        .filter(|p| !p.is_file())
        .map(|p| p.display().to_string())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(CdpError::output_missing(format!(
        "CDP returned success but file or files were not created: {}",
        missing.join(", ")
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
