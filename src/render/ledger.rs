use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::foundation::{
    core::has_temp_prefix,
    error::{CdpError, CdpResult},
};

#[derive(Clone, Debug)]
struct Entry {
    path: PathBuf,
    ignore_prefix: bool,
}

/// Counts from one [`TempLedger::cleanup`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub refused: usize,
    pub failed: usize,
}

/// Files owed deletion when a render attempt ends.
///
/// Paths whose file name lacks the temp prefix are never deleted unless registered through
/// [`TempLedger::register_unchecked`]. Cleanup also runs on drop, so every exit path of an
/// attempt releases its files.
#[derive(Debug, Default)]
pub struct TempLedger {
    entries: Mutex<Vec<Entry>>,
}

impl TempLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, path: impl Into<PathBuf>) {
        self.push(path.into(), false);
    }

    /// Register a file whose name the toolchain chose, bypassing the prefix check.
    pub fn register_unchecked(&self, path: impl Into<PathBuf>) {
        self.push(path.into(), true);
    }

    fn push(&self, path: PathBuf, ignore_prefix: bool) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Entry {
                path,
                ignore_prefix,
            });
        }
    }

    /// Drop `path` from the ledger without deleting it. Returns false if it was not registered.
    pub fn forget(&self, path: &Path) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };
        let before = entries.len();
        entries.retain(|e| e.path != path);
        entries.len() != before
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries
            .lock()
            .map(|e| e.iter().any(|e| e.path == path))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |e| e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delete every registered file and empty the ledger.
    pub fn cleanup(&self) -> CleanupReport {
        let entries = match self.entries.lock() {
            Ok(mut e) => std::mem::take(&mut *e),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        let mut report = CleanupReport::default();
        for entry in entries {
            match remove_file_if_exists(&entry.path, entry.ignore_prefix) {
                Ok(true) => report.removed += 1,
                Ok(false) => {}
                Err(CdpError::Validation(msg)) => {
                    tracing::warn!("{msg}");
                    report.refused += 1;
                }
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), error = %e, "temp file cleanup failed");
                    report.failed += 1;
                }
            }
        }
        if report != CleanupReport::default() {
            tracing::debug!(?report, "temp files cleaned");
        }
        report
    }
}

impl Drop for TempLedger {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Delete `path` if it exists. Returns whether a file was removed.
///
/// Without `ignore_prefix`, a file name lacking the temp prefix is refused with
/// [`CdpError::Validation`] and left in place.
pub fn remove_file_if_exists(path: &Path, ignore_prefix: bool) -> CdpResult<bool> {
    if !ignore_prefix && !has_temp_prefix(path) {
        return Err(CdpError::validation(format!(
            "refusing to delete '{}': not a file created by the renderer",
            path.display()
        )));
    }
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("remove '{}'", path.display()))
            .into()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/ledger.rs"]
mod tests;
