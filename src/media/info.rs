use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::foundation::error::{CdpError, CdpResult};

/// Basic metadata about an audio file.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioInfo {
    pub channels: u32,
    pub sample_rate: f64,
    pub length_frames: u64,
}

impl AudioInfo {
    pub fn new(channels: u32, sample_rate: f64, length_frames: u64) -> Self {
        Self {
            channels,
            sample_rate,
            length_frames,
        }
    }

    /// Length in seconds; zero when the sample rate is unknown.
    pub fn length_seconds(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.length_frames as f64 / self.sample_rate
        } else {
            0.0
        }
    }
}

/// Source of audio file metadata.
pub trait AudioInfoProvider {
    fn probe(&self, path: &Path) -> CdpResult<AudioInfo>;

    fn get_length_seconds(&self, path: &Path) -> CdpResult<f64> {
        Ok(self.probe(path)?.length_seconds())
    }

    fn channel_count(&self, path: &Path) -> CdpResult<u32> {
        Ok(self.probe(path)?.channels)
    }
}

/// Memoizing wrapper, keyed by path.
///
/// Owned by the caller; nothing is cached process-wide. Entries are never refreshed, so call
/// [`AudioInfoCache::invalidate`] after a file is rewritten in place.
#[derive(Debug, Default)]
pub struct AudioInfoCache<P> {
    provider: P,
    entries: Mutex<HashMap<PathBuf, AudioInfo>>,
}

impl<P: AudioInfoProvider> AudioInfoCache<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(path);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |e| e.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: AudioInfoProvider> AudioInfoProvider for AudioInfoCache<P> {
    fn probe(&self, path: &Path) -> CdpResult<AudioInfo> {
        if let Some(hit) = self
            .entries
            .lock()
            .ok()
            .and_then(|e| e.get(path).copied())
        {
            return Ok(hit);
        }
        // probe outside the lock; a concurrent miss on the same path just probes twice
        let info = self.provider.probe(path)?;
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(path.to_path_buf(), info);
        }
        Ok(info)
    }
}

/// Metadata through `ffprobe` (must be on `PATH` unless `program` says otherwise).
#[derive(Clone, Debug)]
pub struct FfprobeProvider {
    pub program: PathBuf,
}

impl Default for FfprobeProvider {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffprobe"),
        }
    }
}

impl AudioInfoProvider for FfprobeProvider {
    fn probe(&self, path: &Path) -> CdpResult<AudioInfo> {
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
            channels: Option<u32>,
            sample_rate: Option<String>,
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        if !path.is_file() {
            return Err(CdpError::input(format!(
                "audio file '{}' does not exist",
                path.display()
            )));
        }
        let out = std::process::Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| CdpError::input(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(CdpError::input(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
            .map_err(|e| CdpError::input(format!("ffprobe json parse failed: {e}")))?;
        let stream = parsed
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("audio"))
            .ok_or_else(|| {
                CdpError::input(format!("no audio stream in '{}'", path.display()))
            })?;
        let channels = stream.channels.unwrap_or(0);
        let sample_rate = stream
            .sample_rate
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let duration = stream
            .duration
            .as_deref()
            .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        let length_frames = (duration * sample_rate).round().max(0.0) as u64;
        Ok(AudioInfo::new(channels, sample_rate, length_frames))
    }
}

/// Fixed in-memory metadata, for tests and for callers that already know their files.
#[derive(Clone, Debug, Default)]
pub struct StaticAudioInfo {
    entries: HashMap<PathBuf, AudioInfo>,
}

impl StaticAudioInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: impl Into<PathBuf>, info: AudioInfo) -> Self {
        self.entries.insert(path.into(), info);
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, info: AudioInfo) {
        self.entries.insert(path.into(), info);
    }
}

impl AudioInfoProvider for StaticAudioInfo {
    fn probe(&self, path: &Path) -> CdpResult<AudioInfo> {
        self.entries
            .get(path)
            .copied()
            .ok_or_else(|| CdpError::input(format!("no audio info for '{}'", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/info.rs"]
mod tests;
