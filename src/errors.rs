// ABOUTME: Error types for the smart-slides application
// ABOUTME: Provides structured error handling for each stage of the pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideError {
    #[error("Failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),

    #[error("Failed to fetch remote resource: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Outline provider failed: {0}")]
    OutlineError(String),

    #[error("Image acquisition failed: {0}")]
    AssetFetchError(String),

    #[error("Diagram rendering failed: {0}")]
    RenderError(String),

    #[error("Layout classification failed: {0}")]
    ClassificationError(String),

    #[error("Presentation assembly error: {0}")]
    AssemblyError(String),

    #[error("Input validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown error: {0}")]
    UnknownError(String),
}

// Implement conversion from anyhow::Error to our SlideError
impl From<anyhow::Error> for SlideError {
    fn from(err: anyhow::Error) -> Self {
        SlideError::UnknownError(err.to_string())
    }
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for SlideError {
    fn from(err: zip::result::ZipError) -> Self {
        SlideError::AssemblyError(format!("ZIP operation failed: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SlideError>;
