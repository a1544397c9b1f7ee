use super::*;

fn sh(label: &str, script: &str) -> ProcessSpec {
    ProcessSpec::new(label, "/bin/sh").args(["-c", script])
}

fn group(timeout_ms: u64) -> ProcessGroup {
    ProcessGroup::new("test", Duration::from_millis(timeout_ms), Duration::from_millis(5))
}

#[cfg(unix)]
#[test]
fn parallel_all_succeed_in_registration_order() {
    let mut g = group(10_000);
    g.add_task(sh("a", "sleep 0.2; echo a"));
    g.add_task(sh("b", "echo b"));
    g.add_task(sh("c", "sleep 0.1; echo c"));
    let outcomes = g.run_parallel().unwrap();
    let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b", "c"]);
    assert_eq!(g.wait_for_finished(GroupMode::Parallel), "");
}

#[cfg(unix)]
#[test]
fn parallel_returns_the_failure_among_successes() {
    let mut g = group(10_000);
    g.add_task(sh("ok1", "echo fine"));
    g.add_task(sh("ok2", "sleep 0.05; echo fine"));
    g.add_task(sh("bad", "echo 'ERROR: bad arg'"));
    g.add_task(sh("ok3", "echo fine"));
    let started = Instant::now();
    let text = g.wait_for_finished(GroupMode::Parallel);
    assert!(text.contains("ERROR: bad arg"), "{text}");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[cfg(unix)]
#[test]
fn parallel_first_failure_is_by_completion_order() {
    let mut g = group(10_000);
    g.add_task(sh("late", "sleep 1; echo 'ERROR: late'"));
    g.add_task(sh("early", "echo 'ERROR: early'"));
    match g.run_parallel() {
        Err(CdpError::StageFailure { stage, .. }) => assert_eq!(stage, "early"),
        other => panic!("unexpected {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn parallel_timeout_is_wait_exceeded() {
    let mut g = group(150);
    g.add_task(sh("fast", "echo done"));
    g.add_task(sh("slow", "exec sleep 5"));
    let started = Instant::now();
    assert_eq!(g.wait_for_finished(GroupMode::Parallel), "Wait time exceeded");
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[cfg(unix)]
#[test]
fn sequential_stops_at_first_failure() {
    let dir = std::env::temp_dir().join(format!(
        "cdp_render_group_seq_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let marker = dir.join("third_ran");

    let mut g = group(10_000);
    g.add_task(sh("first", "echo ok"));
    g.add_task(sh("second", "exit 1"));
    g.add_task(sh("third", &format!("touch '{}'", marker.display())));
    let err = g.run_sequential().unwrap_err();
    assert!(matches!(err, CdpError::StageFailure { ref stage, .. } if stage == "second"));
    assert!(!marker.exists());
}

#[test]
fn empty_group_succeeds() {
    let g = group(100);
    assert!(g.is_empty());
    assert!(g.run(GroupMode::Parallel).unwrap().is_empty());
    assert!(g.run(GroupMode::Sequential).unwrap().is_empty());
}
