//! Application layer for the roster context.

pub mod accrual;
pub mod query_handlers;
pub mod reconciler;
pub mod roster_store;
