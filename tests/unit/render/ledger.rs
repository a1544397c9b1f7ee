use super::*;
use crate::foundation::core::TEMP_FILE_PREFIX;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "cdp_render_ledger_{name}_{}_{nanos}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    let p = dir.join(name);
    std::fs::write(&p, b"x").unwrap();
    p
}

#[test]
fn cleanup_removes_prefixed_files_and_refuses_others() {
    let dir = temp_dir("mixed");
    let owned = touch(&dir, &format!("{TEMP_FILE_PREFIX}a.wav"));
    let foreign = touch(&dir, "user_take.wav");
    let split = touch(&dir, "user_take_c1.wav");

    let ledger = TempLedger::new();
    ledger.register(&owned);
    ledger.register(&foreign);
    ledger.register_unchecked(&split);
    ledger.register(dir.join(format!("{TEMP_FILE_PREFIX}never_created.wav")));
    assert_eq!(ledger.len(), 4);

    let report = ledger.cleanup();
    assert_eq!(
        report,
        CleanupReport {
            removed: 2,
            refused: 1,
            failed: 0
        }
    );
    assert!(!owned.exists());
    assert!(!split.exists());
    assert!(foreign.exists());
    assert!(ledger.is_empty());
}

#[test]
fn drop_runs_cleanup() {
    let dir = temp_dir("drop");
    let owned = touch(&dir, &format!("{TEMP_FILE_PREFIX}b.wav"));
    {
        let ledger = TempLedger::new();
        ledger.register(&owned);
    }
    assert!(!owned.exists());
}

#[test]
fn forgotten_files_survive() {
    let dir = temp_dir("forget");
    let keep = touch(&dir, &format!("{TEMP_FILE_PREFIX}out.wav"));
    let ledger = TempLedger::new();
    ledger.register(&keep);
    assert!(ledger.contains(&keep));
    assert!(ledger.forget(&keep));
    assert!(!ledger.forget(&keep));
    drop(ledger);
    assert!(keep.exists());
}

#[test]
fn remove_file_if_exists_checks_prefix() {
    let dir = temp_dir("remove");
    let foreign = touch(&dir, "keep.wav");
    assert!(matches!(
        remove_file_if_exists(&foreign, false),
        Err(CdpError::Validation(_))
    ));
    assert!(remove_file_if_exists(&foreign, true).unwrap());
    assert!(!remove_file_if_exists(&foreign, true).unwrap());
}
