use std::path::Path;

use crate::foundation::error::{CdpError, CdpResult};

/// Marker embedded in every file name the crate creates.
///
/// The temp-file ledger refuses to delete files whose name lacks this marker unless the
/// registration explicitly opted out of the check.
pub const TEMP_FILE_PREFIX: &str = "__CDPTEMP934125__";

/// A selected time window in seconds (start inclusive, end inclusive).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> CdpResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(CdpError::validation("time range bounds must be finite"));
        }
        if start < 0.0 {
            return Err(CdpError::validation("time range start must be >= 0"));
        }
        if start > end {
            return Err(CdpError::validation("time range start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// The whole-file window `[0, duration]`.
    pub fn whole(duration: f64) -> Self {
        Self {
            start: 0.0,
            end: duration.max(0.0),
        }
    }

    pub fn length(self) -> f64 {
        self.end - self.start
    }

    pub fn contains(self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

pub fn fuzzy_is_zero(d: f64) -> bool {
    d.abs() <= 1e-12
}

pub fn fuzzy_compare(a: f64, b: f64) -> bool {
    (a - b).abs() * 1e12 <= a.abs().min(b.abs())
}

/// True when the file name carries [`TEMP_FILE_PREFIX`].
pub fn has_temp_prefix(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().contains(TEMP_FILE_PREFIX))
        .unwrap_or(false)
}

/// Cut process output down to `max_chars`, keeping the head (where the tools print
/// their usage/error banner).
pub fn truncate_output(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("\n[output truncated]");
    out
}

/// Toolchain executable name for the host platform.
pub fn program_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
