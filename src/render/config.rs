use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::foundation::{
    core::program_name,
    error::{CdpError, CdpResult},
};

/// Programs that must exist in the toolchain directory before any render is attempted.
pub const REQUIRED_PROGRAMS: &[&str] = &["pvoc", "modify", "sfedit"];

/// Settings shared by every render attempt.
///
/// Every field has a default, so an empty JSON object is a valid configuration (apart from
/// `binaries_dir`, which [`RenderConfig::validate_binaries`] insists on).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Directory holding the toolchain executables.
    pub binaries_dir: Option<PathBuf>,
    /// Where intermediate and output files are created.
    pub render_dir: PathBuf,
    /// Wait budget for each stage, in milliseconds.
    pub max_wait_ms: u64,
    /// Process-group polling interval, in milliseconds.
    pub poll_interval_ms: u64,
    /// Exported as `CDP_MEMORY_BBSIZE`.
    pub memory_buffer_mb: Option<u32>,
    /// Exported as `CDP_SOUND_EXT`.
    pub sound_ext: String,
    /// Exports `CDP_NOCLIP_FLOATS=1` when set.
    pub noclip_floats: bool,
    /// Run the per-channel main transform in parallel instead of one after another.
    pub parallel_main: bool,
    /// Longest process output surfaced in an error.
    pub max_error_chars: usize,
    /// Sub-steps between breakpoints in generated curve files.
    pub curve_subdivisions: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            binaries_dir: None,
            render_dir: std::env::temp_dir(),
            max_wait_ms: 15_000,
            poll_interval_ms: 10,
            memory_buffer_mb: None,
            sound_ext: "wav".to_string(),
            noclip_floats: true,
            parallel_main: true,
            max_error_chars: 2000,
            curve_subdivisions: crate::curve::materialize::DEFAULT_SUBDIVISIONS,
        }
    }
}

impl RenderConfig {
    pub fn with_binaries_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.binaries_dir = Some(dir.into());
        self
    }

    pub fn with_render_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.render_dir = dir.into();
        self
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Environment passed to every child process.
    pub fn child_env(&self) -> Vec<(String, String)> {
        let mut env = vec![("CDP_SOUND_EXT".to_string(), self.sound_ext.clone())];
        if self.noclip_floats {
            env.push(("CDP_NOCLIP_FLOATS".to_string(), "1".to_string()));
        }
        if let Some(mb) = self.memory_buffer_mb {
            env.push(("CDP_MEMORY_BBSIZE".to_string(), mb.to_string()));
        }
        env
    }

    /// The toolchain directory, checked to exist and contain [`REQUIRED_PROGRAMS`].
    pub fn validate_binaries(&self) -> CdpResult<&Path> {
        let dir = self
            .binaries_dir
            .as_deref()
            .ok_or_else(|| CdpError::configuration("CDP binaries location not set"))?;
        if !dir.is_dir() {
            return Err(CdpError::configuration(format!(
                "CDP binaries location '{}' does not exist",
                dir.display()
            )));
        }
        let missing: Vec<String> = REQUIRED_PROGRAMS
            .iter()
            .map(|p| program_name(p))
            .filter(|p| !dir.join(p).is_file())
            .collect();
        if !missing.is_empty() {
            return Err(CdpError::configuration(format!(
                "CDP binaries location '{}' is missing {}",
                dir.display(),
                missing.join(", ")
            )));
        }
        Ok(dir)
    }

    /// Full path of toolchain program `name`; call after [`RenderConfig::validate_binaries`].
    pub fn program(&self, name: &str) -> PathBuf {
        let file = program_name(name);
        match &self.binaries_dir {
            Some(dir) => dir.join(file),
            None => PathBuf::from(file),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
