use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("message bus error: {0}")]
    Bus(String),

    #[error("blob store error: {0}")]
    Blob(String),

    #[error("failed to upload `{path}` after {attempts} attempts: {last}")]
    UploadExhausted {
        path: String,
        attempts: u32,
        last: String,
    },

    #[error("mutex poison error: {0}")]
    Poison(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Config(#[from] config_parser::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl<T> From<std::sync::PoisonError<T>> for SinkError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        SinkError::Poison(err.to_string())
    }
}

pub type Result<T> = core::result::Result<T, SinkError>;
