//! Error types for the training engine

use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum DrillError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("Session has no recorded cards")]
    EmptySession,

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, DrillError>;
