//!
//! src/errors.rs  Andrew Belles  Oct 2nd, 2025
//!
//! Defines enums and methods of error conversion
//! for errors the enricher uses
//!
//!

use thiserror::Error;

use crate::validate::ValidationError;

/// Fatal errors. Any of these aborts the run before the catalog is written
#[derive(Error, Debug)]
pub enum EnricherError {
    #[error("config error: {0}")]
    Config(String),
    #[error("read error: {0}")]
    Read(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("write error: {0}")]
    Write(String),
}

impl From<reqwest::Error> for EnricherError {
    fn from(e: reqwest::Error) -> Self { EnricherError::Transport(e.to_string()) }
}
