use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("user '{0}' already exists")]
    UserExists(String),

    #[error("no account named '{0}'")]
    UnknownUser(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
