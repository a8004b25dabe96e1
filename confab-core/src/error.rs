//! Unified error handling for the Confab system

use thiserror::Error;

/// Error types shared across the Confab crates
#[derive(Debug, Error)]
pub enum ConfabError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Plan schema error: {0}")]
    PlanSchema(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ConfabResult<T> = Result<T, ConfabError>;
