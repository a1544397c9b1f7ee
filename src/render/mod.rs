//! Render attempts: configuration, temp-file lifetime, stage planning and execution.

pub mod config;
pub mod epoch;
pub mod event;
pub mod job;
pub mod ledger;
pub mod pipeline;
pub mod plan;
