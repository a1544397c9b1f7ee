use super::*;

const PARAMS: [f64; 7] = [0.0, 0.1, 0.3, 0.5, 0.7, 0.9, 1.0];

#[test]
fn endpoints_are_stable() {
    for p1 in PARAMS {
        assert_eq!(apply_shape(ShapeKind::Power, 0.0, p1, 0.5), 0.0);
        assert_eq!(apply_shape(ShapeKind::Power, 1.0, p1, 0.5), 1.0);
    }
}

#[test]
fn half_is_linear() {
    for x in [0.1, 0.25, 0.5, 0.9] {
        assert!((apply_shape(ShapeKind::Power, x, 0.5, 0.0) - x).abs() < 1e-12);
    }
}

#[test]
fn families_bend_in_opposite_directions() {
    // ease-out rises above the diagonal, ease-in stays below it
    assert!(apply_shape(ShapeKind::Power, 0.5, 0.0, 0.0) > 0.5);
    assert!(apply_shape(ShapeKind::Power, 0.5, 1.0, 0.0) < 0.5);
    // p1 = 1.0 is x^5
    assert!((apply_shape(ShapeKind::Power, 0.5, 1.0, 0.0) - 0.03125).abs() < 1e-12);
}

#[test]
fn monotonic_spot_check() {
    for p1 in PARAMS {
        let a = apply_shape(ShapeKind::Power, 0.25, p1, 0.0);
        let b = apply_shape(ShapeKind::Power, 0.5, p1, 0.0);
        let c = apply_shape(ShapeKind::Power, 0.75, p1, 0.0);
        assert!(a < b);
        assert!(b < c);
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    assert_eq!(apply_shape(ShapeKind::Power, -0.5, 0.2, 0.0), 0.0);
    assert_eq!(apply_shape(ShapeKind::Power, 1.5, 0.8, 0.0), 1.0);
}
