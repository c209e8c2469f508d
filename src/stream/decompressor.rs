// Streaming decompression driver.
//
// FEEDING:  read one chunk and call the engine with Process until the chunk
//           is consumed. Stop without reading further as soon as the engine
//           reports the logical stream end.
// DRAINING: only if the source ran dry first. Call with no input until the
//           stream end appears; a call that produces nothing and does not
//           end the stream means the input was truncated.
//
// Bytes after the stream end are handled by `TrailingData`.

use std::io::{Read, Write};

use crate::buffer::TransferBuffer;
use crate::engine::{Action, CodecEngine, Direction, StepStatus};
use crate::error::{Error, Result};

use super::{
    CallBudget, Progress, RunStats, Session, StreamOptions, TrailingData, notify,
};

/// Streaming decompressor bound to an engine.
pub struct Decompressor<E: CodecEngine> {
    engine: E,
    opts: StreamOptions,
}

impl<E: CodecEngine> Decompressor<E> {
    pub fn new(engine: E, opts: StreamOptions) -> Self {
        Self { engine, opts }
    }

    /// Decompress one logical stream from `source` into `sink`.
    ///
    /// `declared_len` is the expected compressed length, used only for
    /// progress reporting.
    pub fn run<R: Read + ?Sized, W: Write + ?Sized>(
        &self,
        source: &mut R,
        sink: &mut W,
        declared_len: Option<u64>,
    ) -> Result<RunStats> {
        self.run_inner(source, sink, declared_len, None)
    }

    /// Like `run`, calling `on_progress` after every compressed chunk.
    pub fn run_with_progress<R, W, F>(
        &self,
        source: &mut R,
        sink: &mut W,
        declared_len: Option<u64>,
        mut on_progress: F,
    ) -> Result<RunStats>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
        F: FnMut(Progress),
    {
        self.run_inner(source, sink, declared_len, Some(&mut on_progress))
    }

    fn run_inner<R: Read + ?Sized, W: Write + ?Sized>(
        &self,
        source: &mut R,
        sink: &mut W,
        declared_len: Option<u64>,
        mut progress: Option<&mut dyn FnMut(Progress)>,
    ) -> Result<RunStats> {
        self.opts.validate()?;
        let mut input = TransferBuffer::acquire(self.opts.buffer_size)?;
        let mut output = TransferBuffer::acquire(self.opts.buffer_size)?;
        let mut session = Session::open(&self.engine, Direction::Decompress, &self.opts.params)?;
        let mut stats = RunStats::default();
        let mut finished = false;

        while !finished {
            let n = input.read_from(source)?;
            if n == 0 {
                break;
            }
            finished = self.feed_chunk(&mut session, &mut input, &mut output, sink, &mut stats)?;
            stats.bytes_read += n as u64;
            stats.chunks += 1;
            notify(
                &mut progress,
                Progress {
                    chunk_bytes: n as u64,
                    processed_bytes: stats.bytes_read,
                    total_bytes: declared_len,
                },
            );
        }

        if finished {
            stats.unconsumed_bytes = self.check_trailing(&mut input, source)?;
        } else {
            self.drain(&mut session, &mut output, sink, &mut stats)?;
        }

        stats.engine_calls = session.calls();
        log::debug!(
            "{}: decompressed {} -> {} bytes in {} chunks",
            self.engine.name(),
            stats.bytes_read,
            stats.bytes_written,
            stats.chunks
        );
        Ok(stats)
    }

    /// Process the staged chunk. Returns true once the stream end is seen.
    fn feed_chunk<W: Write + ?Sized>(
        &self,
        session: &mut Session,
        input: &mut TransferBuffer,
        output: &mut TransferBuffer,
        sink: &mut W,
        stats: &mut RunStats,
    ) -> Result<bool> {
        let mut budget = CallBudget::new(self.opts.max_calls_per_chunk);
        while !input.is_empty() {
            budget.charge("feeding")?;
            let step = session.step(Action::Process, input.filled(), output.output_region())?;
            input.compact(step.consumed)?;
            output.commit(step.produced)?;
            stats.bytes_written += output.drain_to(sink)? as u64;
            if step.status == StepStatus::StreamEnd {
                return Ok(true);
            }
            budget.record(&step, "feeding")?;
        }
        Ok(false)
    }

    /// Source is exhausted: flush what the engine still holds.
    fn drain<W: Write + ?Sized>(
        &self,
        session: &mut Session,
        output: &mut TransferBuffer,
        sink: &mut W,
        stats: &mut RunStats,
    ) -> Result<()> {
        let mut budget = CallBudget::new(self.opts.max_calls_per_chunk);
        loop {
            budget.charge("draining")?;
            let step = session.step(Action::Process, &[], output.output_region())?;
            output.commit(step.produced)?;
            stats.bytes_written += output.drain_to(sink)? as u64;
            if step.status == StepStatus::StreamEnd {
                return Ok(());
            }
            if step.produced == 0 {
                return Err(Error::TruncatedStream {
                    bytes_read: stats.bytes_read,
                });
            }
            budget.record(&step, "draining")?;
        }
    }

    /// Apply the trailing-data policy. Returns the unconsumed byte count.
    fn check_trailing<R: Read + ?Sized>(
        &self,
        input: &mut TransferBuffer,
        source: &mut R,
    ) -> Result<u64> {
        let leftover = input.len() as u64;
        match self.opts.trailing_data {
            TrailingData::Ignore => {
                if leftover > 0 {
                    log::warn!(
                        "{}: ignoring {leftover} bytes after end of stream",
                        self.engine.name()
                    );
                }
                Ok(leftover)
            }
            TrailingData::Reject if leftover > 0 => Err(Error::TrailingData { bytes: leftover }),
            TrailingData::Reject => match input.read_from(source)? {
                0 => Ok(0),
                n => Err(Error::TrailingData { bytes: n as u64 }),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Decompress `source` into `sink` with default options.
pub fn run_decompression<E, R, W>(
    engine: &E,
    source: &mut R,
    sink: &mut W,
    declared_len: Option<u64>,
    on_progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<RunStats>
where
    E: CodecEngine + ?Sized,
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    Decompressor::new(engine, StreamOptions::default()).run_inner(
        source,
        sink,
        declared_len,
        on_progress,
    )
}

/// Decompress an in-memory buffer holding one complete stream.
pub fn decompress_all<E: CodecEngine + ?Sized>(engine: &E, data: &[u8]) -> Result<Vec<u8>> {
    let mut source = data;
    let mut sink = Vec::with_capacity(data.len().saturating_mul(4));
    Decompressor::new(engine, StreamOptions::default()).run(
        &mut source,
        &mut sink,
        Some(data.len() as u64),
    )?;
    Ok(sink)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
