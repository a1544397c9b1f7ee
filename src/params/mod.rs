//! Processor descriptors and their parameters.

pub mod parameter;
pub mod processor;
