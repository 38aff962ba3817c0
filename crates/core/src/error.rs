//! Centralized error types for the CareFund workspace.
//!
//! A guard denial is not an error; see `carefund_guards::Denial`.

use thiserror::Error;

/// Top-level error enum. Variants map to subsystems.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CarefundError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type CarefundResult<T> = Result<T, CarefundError>;
