// Streaming compression driver.
//
// FEEDING:  read one chunk, then call the engine with Accumulate until the
//           whole chunk has been consumed, draining output after every call.
// DRAINING: at end of source, call the engine with Finalize and no input
//           until it reports the stream end.
//
// The session is closed and both transfer buffers are released on every
// exit path (they are owned locals of `run_inner`).

use std::io::{Read, Write};

use crate::buffer::TransferBuffer;
use crate::engine::{Action, CodecEngine, Direction, StepStatus};
use crate::error::{Error, Result};

use super::{CallBudget, Progress, RunStats, Session, StreamOptions, notify};

/// Streaming compressor bound to an engine.
///
/// # Example
/// ```no_run
/// use bzflow::engine::bz2::Bzip2Engine;
/// use bzflow::stream::{Compressor, StreamOptions};
///
/// let mut source: &[u8] = b"some data";
/// let mut sink = Vec::new();
/// Compressor::new(Bzip2Engine, StreamOptions::default())
///     .run(&mut source, &mut sink, Some(9))
///     .unwrap();
/// ```
pub struct Compressor<E: CodecEngine> {
    engine: E,
    opts: StreamOptions,
}

impl<E: CodecEngine> Compressor<E> {
    pub fn new(engine: E, opts: StreamOptions) -> Self {
        Self { engine, opts }
    }

    /// Compress everything `source` yields into `sink`.
    ///
    /// `declared_len` is only used for progress reporting.
    pub fn run<R: Read + ?Sized, W: Write + ?Sized>(
        &self,
        source: &mut R,
        sink: &mut W,
        declared_len: Option<u64>,
    ) -> Result<RunStats> {
        self.run_inner(source, sink, declared_len, None)
    }

    /// Like `run`, calling `on_progress` after every fully consumed chunk.
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
        let mut session = Session::open(&self.engine, Direction::Compress, &self.opts.params)?;
        let mut stats = RunStats::default();

        loop {
            let n = input.read_from(source)?;
            if n == 0 {
                break;
            }
            self.feed_chunk(&mut session, &mut input, &mut output, sink, &mut stats)?;
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

        self.finalize(&mut session, &mut output, sink, &mut stats)?;
        stats.engine_calls = session.calls();
        log::debug!(
            "{}: compressed {} -> {} bytes in {} chunks",
            self.engine.name(),
            stats.bytes_read,
            stats.bytes_written,
            stats.chunks
        );
        Ok(stats)
    }

    /// Accumulate until the staged chunk is fully consumed.
    fn feed_chunk<W: Write + ?Sized>(
        &self,
        session: &mut Session,
        input: &mut TransferBuffer,
        output: &mut TransferBuffer,
        sink: &mut W,
        stats: &mut RunStats,
    ) -> Result<()> {
        let mut budget = CallBudget::new(self.opts.max_calls_per_chunk);
        while !input.is_empty() {
            budget.charge("feeding")?;
            let step = session.step(Action::Accumulate, input.filled(), output.output_region())?;
            if step.status == StepStatus::StreamEnd {
                return Err(Error::Protocol(format!(
                    "stream end reported with {} input bytes pending and no finalize requested",
                    input.len() - step.consumed
                )));
            }
            input.compact(step.consumed)?;
            output.commit(step.produced)?;
            stats.bytes_written += output.drain_to(sink)? as u64;
            budget.record(&step, "feeding")?;
        }
        Ok(())
    }

    /// Finalize with no input until the engine reports the stream end.
    fn finalize<W: Write + ?Sized>(
        &self,
        session: &mut Session,
        output: &mut TransferBuffer,
        sink: &mut W,
        stats: &mut RunStats,
    ) -> Result<()> {
        let mut budget = CallBudget::new(self.opts.max_calls_per_chunk);
        loop {
            budget.charge("finalizing")?;
            let step = session.step(Action::Finalize, &[], output.output_region())?;
            if step.consumed != 0 {
                return Err(Error::Protocol(format!(
                    "finalize consumed {} bytes but none were offered",
                    step.consumed
                )));
            }
            output.commit(step.produced)?;
            stats.bytes_written += output.drain_to(sink)? as u64;
            if step.status == StepStatus::StreamEnd {
                return Ok(());
            }
            budget.record(&step, "finalizing")?;
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience functions
// ---------------------------------------------------------------------------

/// Compress `source` into `sink` with default options.
///
/// `declared_len` is the expected source length (`None` if unknown) and is
/// only used to fill `Progress::total_bytes`.
pub fn run_compression<E, R, W>(
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
    Compressor::new(engine, StreamOptions::default()).run_inner(source, sink, declared_len, on_progress)
}

/// Compress an in-memory buffer.
pub fn compress_all<E: CodecEngine + ?Sized>(engine: &E, data: &[u8]) -> Result<Vec<u8>> {
    let opts = StreamOptions {
        buffer_size: data.len().clamp(1, StreamOptions::default().buffer_size),
        ..Default::default()
    };
    let mut source = data;
    let mut sink = Vec::with_capacity(data.len() / 2 + 64);
    Compressor::new(engine, opts).run(&mut source, &mut sink, Some(data.len() as u64))?;
    Ok(sink)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
