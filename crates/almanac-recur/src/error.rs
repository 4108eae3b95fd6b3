use thiserror::Error;

use crate::recur::{ConversionError, RuleError};

/// Recurrence engine errors
#[derive(Error, Debug)]
pub enum RecurError {
    #[error("Malformed recurrence rule: {0}")]
    RuleError(#[from] RuleError),

    #[error(transparent)]
    ConversionError(#[from] ConversionError),

    #[error("RRULE export error: {0}")]
    RRuleError(String),
}

pub type RecurResult<T> = std::result::Result<T, RecurError>;
