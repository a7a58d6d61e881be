//! Defines the custom error types for the lead-sleuth application.

use std::io;
use thiserror::Error;

/// The primary error type for the lead hunting process.
///
/// Search-provider failures are deliberately absent here: a failed or
/// malformed backend response degrades to an empty result set inside the
/// provider and never crosses the pipeline boundary.
#[derive(Error, Debug)]
pub(crate) enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error building the shared HTTP client.
    #[error("HTTP Client Error: {0}")]
    Request(#[from] reqwest::Error),

    /// A caller-supplied hunt request violated the call contract.
    #[error("Invalid Hunt Request: {0}")]
    InvalidRequest(String),

    /// Error related to concurrency or task execution.
    #[error("Task Execution Error: {0}")]
    Task(String),

    /// An underlying error that doesn't fit other categories, using anyhow.
    #[error("Generic Error: {0}")]
    Generic(#[from] anyhow::Error),
}

pub(crate) type Result<T> = std::result::Result<T, AppError>;
