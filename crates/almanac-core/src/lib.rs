//! Shared configuration, errors and constants for the Almanac workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
