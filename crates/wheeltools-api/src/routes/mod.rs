//! Route modules, one per area of the control surface.

pub mod games;
pub mod health;
pub mod outbox;
pub mod party;
pub mod roster;
