//! External process supervision.

pub mod group;
pub mod supervisor;
