use almanac_recur::recur::RuleError;
use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] almanac_core::error::CoreError),

    #[error("Malformed recurrence: {0}")]
    RuleError(#[from] RuleError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Request would produce up to {estimated} occurrences, the limit is {limit}")]
    TooManyOccurrences { estimated: u64, limit: u64 },

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
