use std::path::PathBuf;
use thiserror::Error;

/// Result type for loading user-supplied inputs
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading the configuration file or a route manifest
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid route manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },
}
