//! WheelTools — IPC client for the remote create-game capability.
//!
//! The client resolves its channel on first use and caches the handle; the
//! TCP transport carries one JSON line per request and reply.

pub mod client;
pub mod transport;
