use thiserror::Error;

use crate::client::error::TransportError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Input is empty or whitespace-only")]
    InvalidInput,

    #[error("Transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
