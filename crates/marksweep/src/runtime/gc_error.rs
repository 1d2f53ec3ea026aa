use thiserror::Error;

use crate::ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GcError {
    /// Push attempted with the root stack at capacity
    #[error("Stack overflow! (capacity {capacity})")]
    StackOverflow { capacity: usize },
    /// Pop attempted on an empty root stack
    #[error("Stack underflow!")]
    StackUnderflow,
    /// Handle refers to an object that was already reclaimed
    #[error("stale object reference {0}")]
    StaleReference(ObjectRef),
    /// Live object cap reached even after collecting
    #[error("heap limit of {limit} objects exceeded")]
    HeapLimitExceeded { limit: usize },
    #[error("invalid option: {0}")]
    InvalidOption(&'static str),
    /// Reported by heap verification
    #[error("heap corrupted: {0}")]
    HeapCorrupted(String),
}

pub type GcResult<T> = Result<T, GcError>;
