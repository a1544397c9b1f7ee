use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Counting<'a> {
    calls: &'a AtomicUsize,
}

impl AudioInfoProvider for Counting<'_> {
    fn probe(&self, path: &Path) -> CdpResult<AudioInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if path.ends_with("missing.wav") {
            return Err(CdpError::input("missing"));
        }
        Ok(AudioInfo::new(2, 48_000.0, 96_000))
    }
}

#[test]
fn length_is_frames_over_rate() {
    assert_eq!(AudioInfo::new(1, 44_100.0, 88_200).length_seconds(), 2.0);
    assert_eq!(AudioInfo::new(1, 0.0, 88_200).length_seconds(), 0.0);
}

#[test]
fn cache_probes_each_path_once() {
    let calls = AtomicUsize::new(0);
    let cache = AudioInfoCache::new(Counting { calls: &calls });
    let p = Path::new("/audio/a.wav");
    assert_eq!(cache.get_length_seconds(p).unwrap(), 2.0);
    assert_eq!(cache.channel_count(p).unwrap(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);

    cache.invalidate(p);
    cache.probe(p).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn cache_does_not_store_failures() {
    let calls = AtomicUsize::new(0);
    let cache = AudioInfoCache::new(Counting { calls: &calls });
    let p = Path::new("/audio/missing.wav");
    assert!(cache.probe(p).is_err());
    assert!(cache.probe(p).is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(cache.is_empty());
}

#[test]
fn static_provider_reports_unknown_paths_as_input_errors() {
    let info = StaticAudioInfo::new().with("/a.wav", AudioInfo::new(1, 44_100.0, 441));
    assert_eq!(info.channel_count(Path::new("/a.wav")).unwrap(), 1);
    assert!(matches!(
        info.probe(Path::new("/b.wav")),
        Err(CdpError::Input(_))
    ));
}

#[test]
fn ffprobe_rejects_missing_files_before_spawning() {
    let provider = FfprobeProvider::default();
    assert!(matches!(
        provider.probe(Path::new("/definitely/not/here.wav")),
        Err(CdpError::Input(_))
    ));
}
