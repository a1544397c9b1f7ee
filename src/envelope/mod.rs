//! Breakpoint envelopes and their evaluation.

pub mod interp;
pub mod mapping;
pub mod model;
pub mod node;
pub mod shape;
