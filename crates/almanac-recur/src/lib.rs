//! Recurrence materialization: expands recurring event definitions into
//! concrete, ordered occurrence slots.

pub mod error;
pub mod recur;
