/// Shaping family applied to the segment that starts at a breakpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    /// Two-branch power curve controlled by `shape_param_1`.
    #[default]
    Power,
}

/// One vertex of an automation curve.
///
/// `shape_*` fields describe the segment from this node to the next one.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Breakpoint {
    pub time: f64,
    pub value: f64,
    #[serde(default)]
    pub shape_kind: ShapeKind,
    #[serde(default = "neutral_shape")]
    pub shape_param_1: f64,
    #[serde(default = "neutral_shape")]
    pub shape_param_2: f64,
    /// UI tag; never interpreted here.
    #[serde(default)]
    pub status: i32,
}

fn neutral_shape() -> f64 {
    0.5
}

impl Breakpoint {
    /// A node with a linear outgoing segment.
    pub fn new(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            shape_kind: ShapeKind::Power,
            shape_param_1: 0.5,
            shape_param_2: 0.5,
            status: 0,
        }
    }

    /// A node whose outgoing segment uses `p1` as the curvature control.
    pub fn with_shape(time: f64, value: f64, p1: f64) -> Self {
        Self {
            shape_param_1: p1.clamp(0.0, 1.0),
            ..Self::new(time, value)
        }
    }
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
