//! Error types for text chunking and offset resolution

/// Error types for chunking operations
#[derive(thiserror::Error, Debug)]
pub enum ChunkingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Offset out of range: start={start}, end={end:?}, total length={total}")]
    OutOfRange {
        start: usize,
        end: Option<usize>,
        total: usize,
    },

    #[error("Length function failed: {0}")]
    LengthFunction(#[from] anyhow::Error),

    #[error("Regex compilation error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Cannot read chunk settings from env: {0}")]
    Environment(#[from] envy::Error),
}

/// Result type for chunking operations
pub type Result<T> = std::result::Result<T, ChunkingError>;

impl ChunkingError {
    /// Create an invalid configuration error
    pub fn invalid_configuration<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create an out of range error
    pub fn out_of_range(start: usize, end: Option<usize>, total: usize) -> Self {
        Self::OutOfRange { start, end, total }
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::OutOfRange { .. } => "out_of_range",
            Self::LengthFunction(_) => "length_function",
            Self::Regex(_) => "regex",
            Self::Environment(_) => "environment",
        }
    }
}
