use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoragePilotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Advisor error: {0}")]
    Advisor(String),

    #[error("Cancelled")]
    Cancelled,
}
