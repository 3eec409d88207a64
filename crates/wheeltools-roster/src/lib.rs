//! WheelTools — roster bounded context.
//!
//! Responsible for the tracked member list, its defaults and accrual
//! settings, reconciliation against the live party, and timed spin accrual.

pub mod application;
pub mod domain;
