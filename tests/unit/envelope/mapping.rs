use super::*;

#[test]
fn linear_maps_both_ways() {
    let m = ValueMapping::linear(-12.0, 12.0);
    assert_eq!(m.to_scaled(0.25), -6.0);
    assert_eq!(m.to_normalized(6.0), 0.75);
    assert_eq!(ValueMapping::linear(3.0, 3.0).to_normalized(3.0), 0.0);
}

#[test]
fn skewed_inverse_recovers_the_input() {
    let m = ValueMapping::Skewed {
        min: 20.0,
        max: 20_000.0,
        skew: 0.3,
    };
    for x in [0.0, 0.1, 0.5, 0.9, 1.0] {
        assert!((m.to_normalized(m.to_scaled(x)) - x).abs() < 1e-9, "x={x}");
    }
    // low skew spends more of the normalized range below the midpoint value
    assert!(m.to_scaled(0.5) < 10_010.0);
}

#[test]
fn identity_is_the_default() {
    assert_eq!(ValueMapping::default(), ValueMapping::Identity);
    assert_eq!(ValueMapping::Identity.to_scaled(0.3), 0.3);
}

#[test]
fn serializes_with_a_kind_tag() {
    let json = serde_json::to_string(&ValueMapping::linear(0.0, 2.0)).unwrap();
    assert_eq!(json, r#"{"kind":"linear","min":0.0,"max":2.0}"#);
}
