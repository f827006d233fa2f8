//! Common error types for the meal-plan crates

use thiserror::Error;

/// Common result type for meal-plan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the meal-plan crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
