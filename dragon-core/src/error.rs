//! Error types for the dragon core

use thiserror::Error;

/// Errors raised by mesh generation
#[derive(Debug, Error)]
pub enum DragonError {
    /// The shape parameters cannot describe a tube
    #[error("Degenerate configuration: {reason}")]
    DegenerateConfiguration { reason: String },
}

impl DragonError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading shape parameters
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading or writing STL data
#[derive(Debug, Error)]
pub enum StlError {
    #[error("File too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),

    #[error("Unexpected end of file at facet {0}")]
    UnexpectedEof(usize),

    #[error("Failed to parse ASCII STL: {0}")]
    Ascii(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for generation
pub type DragonResult<T> = Result<T, DragonError>;
