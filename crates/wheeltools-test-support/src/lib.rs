//! Shared test mocks and utilities for WheelTools.

mod clock;
mod ipc;
mod providers;
mod repository;

pub use clock::{FixedClock, ManualClock};
pub use ipc::{ScriptedGameBackend, StaticChannelResolver, UnavailableChannelResolver};
pub use providers::{FailingMessenger, RecordingMessenger, StaticMembershipProvider};
pub use repository::{FailingConfigRepository, FlakyConfigRepository, InMemoryConfigRepository};
