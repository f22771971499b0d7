//! Error types for the meme analyzer.
//!
//! Every stage boundary returns one of these. The orchestrator is the only
//! place they are flattened into an `AnalysisOutcome::Failure` message.

use std::path::PathBuf;

/// Error returned by any fallible stage of the analysis pipeline.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Engine failure: {0}")]
    Engine(#[from] EngineError),
}

/// OCR / sentiment / correction engine errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{engine} engine is unavailable: {reason}")]
    Unavailable { engine: String, reason: String },

    #[error("{engine} engine failed: {reason}")]
    Invocation { engine: String, reason: String },

    #[error("Failed to load {}: {reason}", .path.display())]
    Asset { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn unavailable(engine: &str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            engine: engine.to_string(),
            reason: reason.into(),
        }
    }

    pub fn invocation(engine: &str, reason: impl Into<String>) -> Self {
        Self::Invocation {
            engine: engine.to_string(),
            reason: reason.into(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
