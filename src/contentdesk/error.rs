use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("GitHub token, owner and repository must be configured (run `contentdesk config`)")]
    NotConfigured,

    #[error("Remote write failed: {0}")]
    RemoteWrite(String),

    #[error("Remote read failed: {0}")]
    RemoteRead(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error(
        "Tree delete stopped at {failed_path} after removing {} file(s): {reason}",
        deleted.len()
    )]
    PartialTreeDelete {
        deleted: Vec<String>,
        failed_path: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("Refusing to delete protected folder: {0}")]
    Protected(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DeskError>;
