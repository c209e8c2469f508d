// Error taxonomy for stream runs.

use std::io;

use crate::engine::EngineError;

/// Error type for compression and decompression runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Rejected driver configuration (e.g. a zero buffer size).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A buffer operation was asked to move more bytes than fit.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The engine session could not be opened.
    #[error("engine initialization failed: {0}")]
    EngineInit(#[source] EngineError),

    /// The engine answered in a way that breaks the step protocol.
    #[error("engine protocol violation: {0}")]
    Protocol(String),

    /// The engine failed a step. The kind is passed through unchanged.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The compressed source ended before the engine saw the logical stream end.
    #[error("compressed stream truncated after {bytes_read} bytes")]
    TruncatedStream { bytes_read: u64 },

    /// Bytes follow the logical stream end and the run was told to reject them.
    #[error("{bytes} trailing bytes after end of compressed stream")]
    TrailingData { bytes: u64 },

    /// Source or sink failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// The engine error kind behind this error, if any.
    pub fn engine_kind(&self) -> Option<EngineError> {
        match self {
            Self::EngineInit(kind) | Self::Engine(kind) => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
