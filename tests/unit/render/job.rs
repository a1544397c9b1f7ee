use super::*;

#[test]
fn parses_a_minimal_job() {
    let job = RenderJob::from_json_str(
        r#"{
            "input": "/audio/take.wav",
            "processor": { "title": "Reverse", "program": "modify", "sub_command": "radical", "mode": "1" }
        }"#,
    )
    .unwrap();
    assert_eq!(job.input, PathBuf::from("/audio/take.wav"));
    assert!(job.selection.is_none());
    assert!(!job.downmix);
    assert_eq!(job.processor.mode.as_deref(), Some("1"));
}

#[test]
fn malformed_json_is_a_validation_error() {
    assert!(matches!(
        RenderJob::from_json_str("{"),
        Err(CdpError::Validation(_))
    ));
}

#[test]
fn selection_defaults_to_whole_file_and_clamps() {
    let p = ProcessorDescriptor::new("x", "modify", "speed", None, false);
    let job = RenderJob::new("/a.wav", p);
    assert_eq!(job.resolve_selection(3.0).unwrap(), TimeRange::whole(3.0));

    let job = job.with_selection(TimeRange { start: 1.0, end: 9.0 });
    assert_eq!(
        job.resolve_selection(3.0).unwrap(),
        TimeRange { start: 1.0, end: 3.0 }
    );
}

#[test]
fn empty_or_invalid_selection_is_rejected() {
    let p = ProcessorDescriptor::new("x", "modify", "speed", None, false);
    let job = RenderJob::new("/a.wav", p.clone()).with_selection(TimeRange { start: 4.0, end: 5.0 });
    assert!(job.resolve_selection(3.0).is_err());

    let job = RenderJob::new("/a.wav", p).with_selection(TimeRange { start: 1.0, end: 1.0 });
    assert!(matches!(job.resolve_selection(3.0), Err(CdpError::Input(_))));
}
