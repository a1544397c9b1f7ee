//! Curve-file generation for automated parameters.

pub mod materialize;
pub mod naming;
