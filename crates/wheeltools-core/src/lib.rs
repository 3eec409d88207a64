//! WheelTools Core — shared domain abstractions.
//!
//! This crate defines the ports and error types that the roster,
//! orchestration and IPC crates depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod ipc;
pub mod providers;
pub mod repository;
