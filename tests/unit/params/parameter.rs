use super::*;

#[test]
fn default_mapping_is_linear_over_range() {
    let p = Parameter::new("Gain", 0.0, -12.0, 12.0);
    assert_eq!(p.slider_mapping(), ValueMapping::linear(-12.0, 12.0));
    assert_eq!(p.scale(0.5), 0.0);
    assert_eq!(p.scale(1.0), 12.0);
}

#[test]
fn explicit_mapping_wins() {
    let mut p = Parameter::new("Freq", 440.0, 20.0, 20000.0);
    p.mapping = Some(ValueMapping::Skewed {
        min: 20.0,
        max: 20000.0,
        skew: 0.3,
    });
    assert!(p.scale(0.5) < 10010.0);
}

#[test]
fn automation_follows_the_enabled_flag_only() {
    let mut p = Parameter::new("x", 0.0, 0.0, 1.0);
    assert!(!p.can_automate);
    assert!(!p.is_automated());
    p.automation_enabled = true;
    assert!(p.is_automated());
    p.can_automate = true;
    p.automation_enabled = false;
    assert!(!p.is_automated());
}

#[test]
fn set_value_clamps() {
    let mut p = Parameter::new("x", 0.5, 0.0, 1.0);
    p.set_value(2.0);
    assert_eq!(p.current_value, 1.0);
    p.set_value(-1.0);
    assert_eq!(p.current_value, 0.0);
}

#[test]
fn prefix_is_prepended() {
    let p = Parameter::new("FFT", 1024.0, 128.0, 8192.0).with_prefix("-c");
    assert_eq!(p.prefixed(1024), "-c1024");
}

#[test]
fn minimal_json_fills_defaults() {
    let p: Parameter = serde_json::from_str(
        r#"{ "name": "Depth", "current_value": 0.3, "default_value": 0.5, "min": 0, "max": 1,
             "time_scaling": { "kind": "parameter_value", "index": 2 } }"#,
    )
    .unwrap();
    assert!(!p.can_automate);
    assert!(p.command_prefix.is_empty());
    assert!(p.envelope.is_empty());
    assert_eq!(p.time_scaling, Some(TimeScaling::ParameterValue { index: 2 }));
}
