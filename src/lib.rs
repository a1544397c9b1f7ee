//! cdp-render turns automated processor parameters into CDP command lines and runs them.
//!
//! The crate has two halves:
//!
//! - an automation-curve engine: [`Envelope`]s of shaped [`Breakpoint`]s, evaluated and
//!   resampled into the two-column curve files the toolchain reads
//! - a render pipeline: a [`RenderPlan`] of external stages (cut, split, analysis, main
//!   transform, resynthesis, merge) run through supervised [`ProcessGroup`]s, with every
//!   intermediate file tracked by a [`TempLedger`]
#![forbid(unsafe_code)]

pub mod curve;
pub mod envelope;
pub mod foundation;
pub mod media;
pub mod params;
pub mod process;
pub mod render;

pub use crate::foundation::core::{TEMP_FILE_PREFIX, TimeRange};
pub use crate::foundation::error::{CdpError, CdpResult};

pub use crate::curve::materialize::{CurveRow, materialize_argument, read_curve_file};
pub use crate::curve::naming::TempNamer;
pub use crate::envelope::interp::{BorderMode, evaluate};
pub use crate::envelope::mapping::ValueMapping;
pub use crate::envelope::model::Envelope;
pub use crate::envelope::node::{Breakpoint, ShapeKind};
pub use crate::media::cycles::CycleCountCache;
pub use crate::media::info::{
    AudioInfo, AudioInfoCache, AudioInfoProvider, FfprobeProvider, StaticAudioInfo,
};
pub use crate::params::parameter::{
    ArgFormatter, CommandArg, CustomFormatter, Parameter, TimeScaling,
};
pub use crate::params::processor::ProcessorDescriptor;
pub use crate::process::group::{GroupMode, ProcessGroup};
pub use crate::process::supervisor::{ProcessOutcome, ProcessSpec, run_process};
pub use crate::render::config::RenderConfig;
pub use crate::render::epoch::TaskEpoch;
pub use crate::render::event::RenderEvent;
pub use crate::render::job::RenderJob;
pub use crate::render::ledger::TempLedger;
pub use crate::render::pipeline::{RenderOutcome, RenderPipeline};
pub use crate::render::plan::{RenderPlan, Stage};
