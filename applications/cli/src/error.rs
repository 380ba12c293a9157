/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in (run `encore login` first)")]
    NotAuthenticated,

    #[error("No track named {0:?}")]
    TrackNotFound(String),

    #[error(transparent)]
    Encore(#[from] encore_core::EncoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
