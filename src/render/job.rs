use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::{
        core::TimeRange,
        error::{CdpError, CdpResult},
    },
    params::processor::ProcessorDescriptor,
};

/// Everything one render attempt needs besides configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RenderJob {
    pub input: PathBuf,
    /// Seconds within `input`; the whole file when absent.
    #[serde(default)]
    pub selection: Option<TimeRange>,
    pub processor: ProcessorDescriptor,
    /// Mix multichannel input to mono before processing.
    #[serde(default)]
    pub downmix: bool,
}

impl RenderJob {
    pub fn new(input: impl Into<PathBuf>, processor: ProcessorDescriptor) -> Self {
        Self {
            input: input.into(),
            selection: None,
            processor,
            downmix: false,
        }
    }

    pub fn with_selection(mut self, selection: TimeRange) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_downmix(mut self, downmix: bool) -> Self {
        self.downmix = downmix;
        self
    }

    pub fn from_json_str(s: &str) -> CdpResult<Self> {
        serde_json::from_str(s).map_err(|e| CdpError::validation(format!("render job: {e}")))
    }

    pub fn load(path: &Path) -> CdpResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read render job '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// The window to render, checked against the input duration.
    ///
    /// A selection running past the end is clamped to it.
    pub fn resolve_selection(&self, input_duration: f64) -> CdpResult<TimeRange> {
        let Some(sel) = self.selection else {
            return Ok(TimeRange::whole(input_duration));
        };
        let sel = TimeRange::new(sel.start, sel.end.min(input_duration))?;
        if sel.length() <= 0.0 {
            return Err(CdpError::input(format!(
                "empty time selection {:.3}..{:.3} for a {input_duration:.3} s input",
                sel.start, sel.end
            )));
        }
        Ok(sel)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/job.rs"]
mod tests;
