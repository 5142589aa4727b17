//! Error taxonomy for stream processing
//!
//! Every variant is fatal for the `process` call that produced it. Hitting
//! the read deadline is not an error and never shows up here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    /// Missing source/sink, or a processor constructed without a time limit
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A collected line could not be decoded into a pick event
    #[error("Malformed event record at line {line}: {source}")]
    Decode {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// Reading the source or writing the sink failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessError::InvalidArgument(_) => "invalid_argument",
            ProcessError::Decode { .. } => "decode",
            ProcessError::Io(_) => "io",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessError>;
