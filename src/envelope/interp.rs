//! Breakpoint evaluation.
//!
//! Pure functions over a slice of [`Breakpoint`]s sorted by time. Outside the node range the
//! curve either clamps to the nearest endpoint ([`BorderMode::Clamp`], the default) or treats the
//! normalized `[0, 1]` domain as cyclic and interpolates from the last node into the first
//! ([`BorderMode::Cyclic`]).

use crate::envelope::{node::Breakpoint, shape::apply_shape};

/// Smallest segment length used as a divisor.
pub const MIN_SEGMENT_LENGTH: f64 = 1e-5;

/// Behaviour for query times outside the first/last node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BorderMode {
    #[default]
    Clamp,
    Cyclic,
}

/// Evaluate `nodes` at `t` with clamped borders.
pub fn evaluate(nodes: &[Breakpoint], t: f64, default: f64) -> f64 {
    evaluate_with(nodes, t, default, BorderMode::Clamp)
}

/// Evaluate `nodes` at `t`.
///
/// - no nodes: `default`
/// - one node: that node's value
/// - `t` exactly on a node: the first node with that time
pub fn evaluate_with(nodes: &[Breakpoint], t: f64, default: f64, border: BorderMode) -> f64 {
    let (first, last) = match nodes {
        [] => return default,
        [only] => return only.value,
        [first, .., last] => (first, last),
    };

    if t <= first.time {
        return match border {
            BorderMode::Clamp => first.value,
            BorderMode::Cyclic => {
                let wrapped_t0 = 0.0 - (1.0 - last.time);
                interpolate_segment(t, wrapped_t0, last, first.time, first.value)
            }
        };
    }
    if t > last.time {
        return match border {
            BorderMode::Clamp => last.value,
            BorderMode::Cyclic => {
                let wrapped_t1 = 1.0 + first.time;
                interpolate_segment(t, last.time, last, wrapped_t1, first.value)
            }
        };
    }

    // first node with time >= t; t > first.time guarantees idx >= 1
    let idx = nodes.partition_point(|n| n.time < t).clamp(1, nodes.len() - 1);
    let hi = &nodes[idx];
    if hi.time == t {
        return hi.value;
    }
    let lo = &nodes[idx - 1];
    interpolate_segment(t, lo.time, lo, hi.time, hi.value)
}

/// Shaped interpolation from `lo` (at `t0`) to `v1` (at `t1`), using `lo`'s shape.
pub fn interpolate_segment(t: f64, t0: f64, lo: &Breakpoint, t1: f64, v1: f64) -> f64 {
    let dt = (t1 - t0).max(MIN_SEGMENT_LENGTH);
    let frac = (t - t0) / dt;
    let shaped = apply_shape(lo.shape_kind, frac, lo.shape_param_1, lo.shape_param_2);
    lo.value + (v1 - lo.value) * shaped
}

#[cfg(test)]
#[path = "../../tests/unit/envelope/interp.rs"]
mod tests;
