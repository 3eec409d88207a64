//! Host-facing implementations of the membership and messaging ports.

pub mod membership_feed;
pub mod outbox;
