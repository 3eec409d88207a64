//! WheelTools — orchestration bounded context.
//!
//! Drives game creation over IPC for every enabled member and delivers the
//! resulting links through the chat channel, one member at a time.

pub mod application;
pub mod domain;
