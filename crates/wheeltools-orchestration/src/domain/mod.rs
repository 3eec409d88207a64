//! Domain layer for the orchestration context.

pub mod delivery;
pub mod report;
