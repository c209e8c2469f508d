// Codec engine protocol.
//
// A codec engine is an opaque, stateful, block-oriented compressor or
// decompressor. The stream drivers only talk to it through this narrow
// request/response protocol:
//
//   - `CodecEngine::open`    create an independent session for one direction
//   - `EngineSession::step`  offer bounded input, receive bounded output
//   - `EngineSession::close` engine-side teardown
//
// Built-in engines:
//   - bzip2 (`bz2`, via the `bzip2` crate, feature-gated `bzip2`)
//   - zlib  (via `flate2`, feature-gated `zlib`)
//   - store (framing only, always available)

#[cfg(feature = "bzip2")]
pub mod bz2;
pub mod store;
#[cfg(feature = "zlib")]
pub mod zlib;

use std::fmt;

// ---------------------------------------------------------------------------
// Protocol types
// ---------------------------------------------------------------------------

/// Which way a session transcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Compress,
    Decompress,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compress => f.write_str("compress"),
            Self::Decompress => f.write_str("decompress"),
        }
    }
}

/// Action requested from the engine on a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Compression: take more input, the stream is not finished yet.
    Accumulate,
    /// Compression: no more input will come, flush everything and close the stream.
    Finalize,
    /// Decompression: the only action.
    Process,
}

/// Non-error status reported by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The engine wants to be called again.
    Continue,
    /// The logical stream is complete; nothing more will be produced.
    StreamEnd,
}

/// Outcome of one `EngineSession::step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Bytes taken from the front of the offered input.
    pub consumed: usize,
    /// Bytes written to the front of the offered output.
    pub produced: usize,
    pub status: StepStatus,
}

/// Engine failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("engine ran out of memory")]
    OutOfMemory,
    #[error("invalid engine parameter")]
    InvalidParameter,
    #[error("compressed data is corrupt")]
    DataCorruption,
    #[error("compressed data ended unexpectedly")]
    UnexpectedEof,
    #[error("engine call out of sequence")]
    Sequence,
    #[error("unknown engine error code {0}")]
    Unknown(i32),
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Engine tuning parameters.
///
/// These are passed through to the engine untouched; each engine decides
/// how they map onto its own knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    /// Block size in units of 100 KiB (1-9).
    pub block_size_100k: u32,
    /// Diagnostic verbosity (0-4).
    pub verbosity: u32,
    /// Fallback threshold for highly repetitive input (0-250, 0 = engine default).
    pub work_factor: u32,
    /// Trade decompression speed for a smaller memory footprint.
    pub small_memory: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            block_size_100k: 1,
            verbosity: 0,
            work_factor: 0,
            small_memory: false,
        }
    }
}

impl EngineParams {
    /// Check that every field is inside the range engines accept.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(1..=9).contains(&self.block_size_100k)
            || self.verbosity > 4
            || self.work_factor > 250
        {
            return Err(EngineError::InvalidParameter);
        }
        Ok(())
    }

    /// Log level for per-call records.
    pub(crate) fn trace_level(&self) -> log::Level {
        if self.verbosity > 0 {
            log::Level::Debug
        } else {
            log::Level::Trace
        }
    }
}

// ---------------------------------------------------------------------------
// Engine traits
// ---------------------------------------------------------------------------

/// A factory for codec sessions.
///
/// Implementations must not keep shared mutable state between sessions:
/// the same engine value may open sessions on many threads at once.
pub trait CodecEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Open a new session bound to `direction`.
    fn open(
        &self,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Box<dyn EngineSession>, EngineError>;
}

/// One open engine instance, bound to a single direction for a single run.
pub trait EngineSession: Send {
    /// Offer `input` and an empty `output` region to the engine.
    ///
    /// The engine must never consume more than `input.len()` bytes nor
    /// produce more than `output.len()` bytes.
    fn step(
        &mut self,
        action: Action,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<StepResult, EngineError>;

    /// Release engine-side resources. Calling it more than once is a no-op.
    fn close(&mut self);
}

impl<E: CodecEngine + ?Sized> CodecEngine for &E {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(
        &self,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        (**self).open(direction, params)
    }
}

impl<E: CodecEngine + ?Sized> CodecEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn open(
        &self,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        (**self).open(direction, params)
    }
}

// ---------------------------------------------------------------------------
// Format selection
// ---------------------------------------------------------------------------

/// Built-in stream formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bzip2,
    Zlib,
}

impl Format {
    /// All formats compiled into this build.
    pub fn available() -> Vec<Format> {
        let mut formats = Vec::new();
        if cfg!(feature = "bzip2") {
            formats.push(Format::Bzip2);
        }
        if cfg!(feature = "zlib") {
            formats.push(Format::Zlib);
        }
        formats
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bzip2 => "bzip2",
            Self::Zlib => "zlib",
        }
    }

    /// Parse a format name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Format> {
        match name.to_ascii_lowercase().as_str() {
            "bzip2" | "bz2" => Some(Self::Bzip2),
            "zlib" | "zz" => Some(Self::Zlib),
            _ => None,
        }
    }

    /// Guess the format of a compressed file from its name.
    pub fn detect(path: &std::path::Path) -> Option<Format> {
        let name = path.file_name()?.to_str()?;
        crate::naming::format_of(name)
    }

    /// Engine for this format, or `None` when the backing feature is disabled.
    pub fn engine(self) -> Option<Box<dyn CodecEngine>> {
        match self {
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => Some(Box::new(bz2::Bzip2Engine)),
            #[cfg(feature = "zlib")]
            Self::Zlib => Some(Box::new(zlib::ZlibEngine)),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
