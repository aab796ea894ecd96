//! Count-up error types

use thiserror::Error;

/// Errors recorded by a count-up engine.
///
/// These are never raised out of control operations. The engine stores the
/// most recent one and refuses to animate until it is reconfigured.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CountUpError {
    /// A start or end value could not be coerced to a finite number
    #[error("invalid start or end value: {raw}")]
    InvalidValue { raw: String },

    /// A target path did not resolve in the engine's target scope
    #[error("display target not found: {path}")]
    TargetNotFound { path: String },

    /// No target was given and none is bound to the engine
    #[error("no display target bound")]
    NoTarget,
}

/// Result type for count-up operations
pub type Result<T> = std::result::Result<T, CountUpError>;
