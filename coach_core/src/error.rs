//! Error types for the coach_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for coach_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input that cannot be applied; nothing was mutated
    #[error("{0}")]
    Validation(String),

    /// Export requested before a plan exists
    #[error("Generate or load a plan first.")]
    EmptyPlan,

    /// A (week, day) coordinate outside the current plan (zero-based)
    #[error("No day at week {week}, day {day} in the current plan")]
    OutOfRange { week: usize, day: usize },
}
