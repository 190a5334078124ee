//! Application-wide error types.

use thiserror::Error;

use crate::chains::ChainError;
use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("generation failed: {0}")]
    Generation(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
