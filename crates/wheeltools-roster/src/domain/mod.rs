//! Domain layer for the roster context.

pub mod config;
pub mod member;
