//! Audio file metadata and analysis helpers.

pub mod cycles;
pub mod info;
