use super::*;

fn sample_env() -> Envelope {
    Envelope::from_nodes(
        "density",
        vec![
            Breakpoint::new(0.8, 0.3),
            Breakpoint::new(0.0, 0.1),
            Breakpoint::new(0.4, 0.9),
        ],
    )
}

#[test]
fn add_node_keeps_sorted_outside_batch() {
    let mut env = sample_env();
    env.add_node(Breakpoint::new(0.2, 0.5));
    let times: Vec<f64> = env.nodes().iter().map(|n| n.time).collect();
    assert_eq!(times, vec![0.0, 0.2, 0.4, 0.8]);
}

#[test]
fn batch_defers_sorting_until_end() {
    let mut env = sample_env();
    env.begin_batch();
    env.add_node(Breakpoint::new(0.1, 0.5));
    assert!(!env.is_sorted());
    env.end_batch();
    assert!(env.is_sorted());

    let count = env.batch(|e| {
        e.add_node(Breakpoint::new(0.9, 0.0));
        e.add_node(Breakpoint::new(0.05, 0.0));
        e.len()
    });
    assert_eq!(count, 6);
    assert!(env.is_sorted());
    assert!(!env.is_batching());
}

#[test]
fn sort_is_stable_and_idempotent() {
    let mut env = Envelope::new("x", 0.0, 1.0);
    env.batch(|e| {
        e.add_node(Breakpoint::new(0.5, 0.1));
        e.add_node(Breakpoint::new(0.5, 0.2));
        e.add_node(Breakpoint::new(0.0, 0.3));
        e.add_node(Breakpoint::new(0.5, 0.4));
    });
    let before: Vec<Breakpoint> = env.nodes().to_vec();
    assert_eq!(
        before.iter().map(|n| n.value).collect::<Vec<_>>(),
        vec![0.3, 0.1, 0.2, 0.4]
    );
    env.sort();
    assert_eq!(env.nodes(), before.as_slice());
}

#[test]
fn delete_node_clamps_and_ignores_empty() {
    let mut env = sample_env();
    env.delete_node(99);
    assert_eq!(env.len(), 2);
    assert_eq!(env.nodes()[1].time, 0.4);

    let mut empty = Envelope::default();
    empty.delete_node(0);
    assert!(empty.is_empty());
}

#[test]
fn delete_nodes_in_range_is_inclusive() {
    let mut env = Envelope::from_nodes(
        "x",
        [0.0, 0.1, 0.2, 0.3, 0.4, 0.5]
            .iter()
            .map(|&t| Breakpoint::new(t, t))
            .collect(),
    );
    env.delete_nodes_in_range(0.1, 0.3);
    let times: Vec<f64> = env.nodes().iter().map(|n| n.time).collect();
    assert_eq!(times, vec![0.0, 0.4, 0.5]);
}

#[test]
fn empty_envelope_access_fails_fast() {
    let mut env = Envelope::default();
    assert!(matches!(env.node(0), Err(CdpError::Envelope(_))));
    assert!(env.set_node(0, Breakpoint::new(0.0, 0.0)).is_err());
    assert!(env.set_node_status(0, 1).is_err());
}

#[test]
fn set_node_clamps_index_and_resorts() {
    let mut env = sample_env();
    env.set_node(10, Breakpoint::new(0.1, 0.7)).unwrap();
    let times: Vec<f64> = env.nodes().iter().map(|n| n.time).collect();
    assert_eq!(times, vec![0.0, 0.1, 0.4]);
    assert_eq!(env.node(1).unwrap().value, 0.7);

    env.set_node_time_value(0, None, Some(0.25)).unwrap();
    assert_eq!(env.node(0).unwrap().value, 0.25);
    assert_eq!(env.node(0).unwrap().time, 0.0);
}

#[test]
fn snapshot_and_restore() {
    let mut env = sample_env();
    env.snapshot();
    env.clear();
    assert!(env.is_empty());
    assert_eq!(env.snapshot_nodes().map(<[Breakpoint]>::len), Some(3));
    assert!(env.restore());
    assert_eq!(env.len(), 3);
    assert!(!env.restore());

    env.snapshot();
    env.delete_node(0);
    env.discard_snapshot();
    assert!(!env.restore());
    assert_eq!(env.len(), 2);
}

#[test]
fn manipulate_commits_only_on_success() {
    let mut env = sample_env();
    let applied = env.manipulate(|nodes| {
        nodes.clear();
        false
    });
    assert!(!applied);
    assert_eq!(env.len(), 3);

    let applied = env.manipulate(|nodes| {
        for n in nodes.iter_mut() {
            n.time = 1.0 - n.time;
        }
        true
    });
    assert!(applied);
    assert!(env.is_sorted());
    assert_eq!(env.node(0).unwrap().value, 0.3);
}

#[test]
fn empty_envelope_uses_default_value() {
    let mut env = Envelope::new("x", 0.0, 1.0);
    env.default_value = 0.42;
    assert_eq!(env.interpolated_value(0.3), 0.42);
}

#[test]
fn scaled_values_follow_the_mapping() {
    let mut env = sample_env();
    env.mapping = ValueMapping::linear(-12.0, 12.0);
    assert!((env.scaled_value(0.0) - (-12.0 + 24.0 * 0.1)).abs() < 1e-12);

    env.set_nodes_from_scaled(&[Breakpoint::new(0.0, 0.0), Breakpoint::new(1.0, 12.0)]);
    assert!((env.node(0).unwrap().value - 0.5).abs() < 1e-12);
    assert!((env.node(1).unwrap().value - 1.0).abs() < 1e-12);
}

#[test]
fn reset_returns_to_stored_nodes() {
    let mut env = sample_env();
    env.set_reset_nodes(vec![Breakpoint::new(0.0, 0.5), Breakpoint::new(1.0, 0.5)]);
    env.add_node(Breakpoint::new(0.6, 0.0));
    env.reset();
    assert_eq!(env.len(), 2);
    assert_eq!(env.interpolated_value(0.6), 0.5);
}

#[test]
fn repeater_nodes_rebase_to_offset() {
    let env = Envelope::from_nodes(
        "x",
        vec![
            Breakpoint::new(0.2, 0.1),
            Breakpoint::new(0.7, 0.2),
            Breakpoint::new(1.6, 0.3),
        ],
    );
    let rep = env.repeater_nodes(0.5);
    assert_eq!(rep.len(), 1);
    assert!((rep[0].time - 0.2).abs() < 1e-12);
}

#[test]
fn quantize_pulls_toward_nearest_grid_line() {
    let env = Envelope::default();
    assert!((env.quantize_to_grid(0.3, 1.0) - 0.25).abs() < 1e-12);
    assert!((env.quantize_to_grid(0.3, 0.5) - 0.275).abs() < 1e-12);
    assert!((env.quantize_to_grid(0.7, 1.0) - 0.75).abs() < 1e-12);
    assert!((env.quantize_to_grid(1.4, 1.0) - 1.0).abs() < 1e-12);
}

#[test]
fn serde_round_trip_keeps_nodes_and_mapping() {
    let mut env = sample_env();
    env.mapping = ValueMapping::linear(2.0, 500.0);
    env.begin_batch();
    let json = serde_json::to_string(&env).unwrap();
    let back: Envelope = serde_json::from_str(&json).unwrap();
    assert_eq!(back.nodes(), env.nodes());
    assert_eq!(back.mapping, env.mapping);
    assert!(!back.is_batching());
}

#[test]
fn deserialized_nodes_are_sorted() {
    let json = r#"{"name":"Amount","nodes":[{"time":1.0,"value":1.0},{"time":0.0,"value":0.0}]}"#;
    let env: Envelope = serde_json::from_str(json).unwrap();
    assert!(env.is_sorted());
    assert_eq!(env.nodes()[0].time, 0.0);
    assert!((env.interpolated_value(0.5) - 0.5).abs() < 1e-9);
}
