//! Error types for the lookaway engine.

/// Top-level error type for the reminder engine.
#[derive(Debug, thiserror::Error)]
pub enum LookawayError {
    /// Configuration load/save or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// Scheduler lifecycle or state error.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, LookawayError>;
