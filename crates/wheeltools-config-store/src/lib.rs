//! WheelTools — configuration persistence.

pub mod json_file_repository;
