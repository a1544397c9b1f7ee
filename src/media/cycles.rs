use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    foundation::error::{CdpError, CdpResult},
    process::supervisor::{ProcessSpec, run_process},
    render::config::RenderConfig,
};

/// Integer immediately preceding `token` in whitespace-separated `text`.
pub fn parse_count_before(text: &str, token: &str) -> Option<u64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens
        .windows(2)
        .find(|w| w[1] == token)
        .and_then(|w| w[0].trim_matches('"').parse().ok())
}

/// Wave-cycle counts from `distort cyclecnt`, memoized per file.
#[derive(Debug, Default)]
pub struct CycleCountCache {
    entries: Mutex<HashMap<PathBuf, u64>>,
}

impl CycleCountCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count zero-crossing cycles in `file` using the toolchain's `distort` program.
    ///
    /// The child gets the same CDP environment and wait limit as render stages.
    pub fn count(&self, config: &RenderConfig, file: &Path) -> CdpResult<u64> {
        if let Some(hit) = self.entries.lock().ok().and_then(|e| e.get(file).copied()) {
            return Ok(hit);
        }
        let spec = ProcessSpec::new("distort cyclecnt", config.program("distort"))
            .envs(&config.child_env())
            .arg("cyclecnt")
            .path_arg(file);
        let outcome = run_process(&spec, config.max_wait(), config.poll_interval())?;
        let count = if outcome.succeeded() {
            parse_count_before(&outcome.output, "cycles")
        } else {
            None
        };
        let Some(count) = count else {
            return Err(CdpError::stage_failure(
                "distort cyclecnt",
                format!("Error running CDP Distort Cyclecnt: {}", outcome.output.trim()),
            ));
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(file.to_path_buf(), count);
        }
        Ok(count)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/cycles.rs"]
mod tests;
