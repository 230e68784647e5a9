use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChorusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Malformed post {id:?}: {reason}")]
    MalformedPost { id: String, reason: &'static str },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ChorusError {
    fn from(e: serde_json::Error) -> Self {
        ChorusError::Serialize(e.to_string())
    }
}

pub type ChorusResult<T> = Result<T, ChorusError>;
