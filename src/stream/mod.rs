// Chunked streaming drivers.
//
// The drivers move an arbitrarily long byte stream through a codec engine
// that only accepts and emits bounded chunks:
//
// - `compressor`:   Compressor, INIT -> FEEDING -> DRAINING -> DONE
// - `decompressor`: Decompressor, INIT -> FEEDING -> DRAINING (optional) -> DONE
//
// Each run owns one engine session and two transfer buffers. Memory per run
// is bounded by 2 x buffer_size regardless of the payload length. Sessions
// are closed and buffers released on every exit path.

pub mod compressor;
pub mod decompressor;

pub use compressor::{Compressor, compress_all, run_compression};
pub use decompressor::{Decompressor, decompress_all, run_decompression};

use crate::buffer::DEFAULT_CAPACITY;
use crate::engine::{
    Action, CodecEngine, Direction, EngineParams, EngineSession, StepResult, StepStatus,
};
use crate::error::{Error, Result};

/// Consecutive engine calls without any progress before a run is aborted.
const MAX_IDLE_CALLS: u32 = 16;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What a decompression run does with bytes that follow the logical stream end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingData {
    /// Stop at the stream end; leftover bytes are reported in `RunStats`.
    #[default]
    Ignore,
    /// Fail with `Error::TrailingData` if anything follows the stream end.
    Reject,
}

/// Configuration shared by both stream drivers.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Capacity of each of the two transfer buffers.
    pub buffer_size: usize,
    /// Engine tuning, passed through on session open.
    pub params: EngineParams,
    /// Upper bound on engine calls spent on one chunk (or on the final drain)
    /// without the engine producing any output.
    pub max_calls_per_chunk: u64,
    /// Policy for data after the logical stream end (decompression only).
    pub trailing_data: TrailingData,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_CAPACITY,
            params: EngineParams::default(),
            max_calls_per_chunk: 1 << 20,
            trailing_data: TrailingData::Ignore,
        }
    }
}

impl StreamOptions {
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfiguration(
                "buffer size must be greater than zero".into(),
            ));
        }
        if self.max_calls_per_chunk == 0 {
            return Err(Error::InvalidConfiguration(
                "max calls per chunk must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Progress and stats
// ---------------------------------------------------------------------------

/// Progress notification, delivered once per source chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Bytes read from the source in this chunk.
    pub chunk_bytes: u64,
    /// Bytes read from the source so far in this run.
    pub processed_bytes: u64,
    /// Caller-declared source length, if known.
    pub total_bytes: Option<u64>,
}

impl Progress {
    /// Completion percentage, when the total is known and non-zero.
    pub fn percent(&self) -> Option<f64> {
        match self.total_bytes {
            Some(total) if total > 0 => {
                Some((self.processed_bytes as f64 / total as f64 * 100.0).min(100.0))
            }
            _ => None,
        }
    }
}

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Bytes read from the source.
    pub bytes_read: u64,
    /// Bytes written to the sink.
    pub bytes_written: u64,
    /// Source chunks processed.
    pub chunks: u64,
    /// Engine step calls made.
    pub engine_calls: u64,
    /// Bytes read from the source but not consumed by the engine
    /// (decompression only: data after the logical stream end).
    pub unconsumed_bytes: u64,
}

// ---------------------------------------------------------------------------
// Session guard
// ---------------------------------------------------------------------------

/// An open engine session that is closed exactly once, on every exit path.
pub(crate) struct Session {
    inner: Box<dyn EngineSession>,
    engine: &'static str,
    direction: Direction,
    params: EngineParams,
    calls: u64,
}

impl Session {
    pub(crate) fn open<E: CodecEngine + ?Sized>(
        engine: &E,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Self> {
        let inner = engine.open(direction, params).map_err(|e| {
            log::debug!("{}: failed to open {direction} session: {e}", engine.name());
            Error::EngineInit(e)
        })?;
        log::debug!("{}: {direction} session opened", engine.name());
        Ok(Self {
            inner,
            engine: engine.name(),
            direction,
            params: *params,
            calls: 0,
        })
    }

    /// One engine call, with the result checked against the offered sizes.
    pub(crate) fn step(
        &mut self,
        action: Action,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<StepResult> {
        let avail_out = output.len();
        let result = self.inner.step(action, input, output)?;
        self.calls += 1;
        log::log!(
            self.params.trace_level(),
            "{}: {action:?} in={} out={avail_out} -> consumed={} produced={} {:?}",
            self.engine,
            input.len(),
            result.consumed,
            result.produced,
            result.status
        );
        if result.consumed > input.len() || result.produced > avail_out {
            return Err(Error::Protocol(format!(
                "{action:?} step reported consumed={}/{} produced={}/{avail_out}",
                result.consumed,
                input.len(),
                result.produced
            )));
        }
        Ok(result)
    }

    pub(crate) fn calls(&self) -> u64 {
        self.calls
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.close();
        log::debug!(
            "{}: {} session closed after {} calls",
            self.engine,
            self.direction,
            self.calls
        );
    }
}

// ---------------------------------------------------------------------------
// Call budget
// ---------------------------------------------------------------------------

/// Guards a step loop against engines that never make progress or never finish.
///
/// The call cap counts calls since the engine last produced output, so a
/// highly expanding stream drained through a small buffer is never cut off.
pub(crate) struct CallBudget {
    max_calls: u64,
    calls: u64,
    idle: u32,
}

impl CallBudget {
    pub(crate) fn new(max_calls: u64) -> Self {
        Self {
            max_calls,
            calls: 0,
            idle: 0,
        }
    }

    /// Account for one call. Fails once the budget is spent.
    pub(crate) fn charge(&mut self, phase: &str) -> Result<()> {
        self.calls += 1;
        if self.calls > self.max_calls {
            return Err(Error::Protocol(format!(
                "engine exceeded {} calls while {phase}",
                self.max_calls
            )));
        }
        Ok(())
    }

    /// Record whether the last call moved any bytes. Fails after too many
    /// idle calls in a row.
    pub(crate) fn record(&mut self, step: &StepResult, phase: &str) -> Result<()> {
        if step.produced > 0 {
            self.calls = 0;
        }
        if step.consumed > 0 || step.produced > 0 || step.status == StepStatus::StreamEnd {
            self.idle = 0;
            return Ok(());
        }
        self.idle += 1;
        if self.idle >= MAX_IDLE_CALLS {
            return Err(Error::Protocol(format!(
                "engine made no progress in {} consecutive calls while {phase}",
                self.idle
            )));
        }
        Ok(())
    }
}

fn notify(progress: &mut Option<&mut dyn FnMut(Progress)>, event: Progress) {
    if let Some(callback) = progress.as_mut() {
        callback(event);
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
