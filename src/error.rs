//! Error types for quizstyle operations.

use thiserror::Error;

/// Errors that can occur while parsing selectors or driving the CLI.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid selector: {0}")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, Error>;
