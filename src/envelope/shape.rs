use crate::envelope::node::ShapeKind;

/// Map a segment fraction `x` in `[0, 1]` through the segment's curvature.
///
/// `p1 < 0.5` selects the ease-out family, `p1 >= 0.5` the ease-in family. The exponent
/// runs linearly from 1 (at `p1 == 0.5`) to 5 (at either extreme), so `p1 == 0.5` is linear.
/// `p2` is reserved and currently ignored.
pub fn apply_shape(kind: ShapeKind, x: f64, p1: f64, _p2: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    match kind {
        ShapeKind::Power => {
            if p1 < 0.5 {
                let k = 1.0 - p1 * 2.0;
                1.0 - (1.0 - x).powf(1.0 + k * 4.0)
            } else {
                let k = (p1 - 0.5) * 2.0;
                x.powf(1.0 + k * 4.0)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/envelope/shape.rs"]
mod tests;
