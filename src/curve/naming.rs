use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use crate::foundation::core::TEMP_FILE_PREFIX;

/// Generates collision-free file names inside a render directory.
///
/// Every name carries [`TEMP_FILE_PREFIX`], a per-namer sequence number and a nanosecond
/// timestamp, so two namers over the same directory do not collide either.
#[derive(Debug)]
pub struct TempNamer {
    dir: PathBuf,
    seq: AtomicU64,
}

impl TempNamer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix><stem>_<seq>_<nanos>.<ext>`
    pub fn unique(&self, stem: &str, ext: &str) -> PathBuf {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let ext = ext.trim_start_matches('.');
        self.dir.join(format!(
            "{TEMP_FILE_PREFIX}{}_{seq}_{nanos}.{ext}",
            sanitize(stem)
        ))
    }
}

/// Keep names shell- and tool-friendly: the toolchain splits its arguments on spaces.
fn sanitize(stem: &str) -> String {
    let out: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() { "tmp".to_string() } else { out }
}

#[cfg(test)]
#[path = "../../tests/unit/curve/naming.rs"]
mod tests;
