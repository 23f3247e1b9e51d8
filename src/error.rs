use crate::config::ConfigError;
use crate::parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a generation run
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to scan application at {path:?}: {reason}")]
    Scan { path: PathBuf, reason: String },

    #[error("Cannot determine application name for {0:?}, pass --name")]
    MissingName(PathBuf),
}
