//! Application layer for the orchestration context.

pub mod orchestrator;
