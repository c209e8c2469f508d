// Zlib codec engine.
//
// Wraps `flate2::Compress` / `flate2::Decompress` (zlib format: deflate plus
// zlib header and Adler-32 trailer, so the stream is self-describing).
// `EngineParams::block_size_100k` is used as the deflate level (1-9); the
// remaining parameters have no zlib counterpart.

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use super::{
    Action, CodecEngine, Direction, EngineError, EngineParams, EngineSession, StepResult,
    StepStatus,
};

/// Zlib engine. Stateless; every session owns its own deflate/inflate stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibEngine;

impl CodecEngine for ZlibEngine {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn open(
        &self,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        params.validate()?;
        let stream = match direction {
            Direction::Compress => {
                Stream::Deflate(Compress::new(Compression::new(params.block_size_100k), true))
            }
            Direction::Decompress => Stream::Inflate(Decompress::new(true)),
        };
        log::trace!("zlib: opened {direction} stream ({params:?})");
        Ok(Box::new(ZlibSession {
            stream: Some(stream),
        }))
    }
}

enum Stream {
    Deflate(Compress),
    Inflate(Decompress),
}

struct ZlibSession {
    stream: Option<Stream>,
}

impl EngineSession for ZlibSession {
    fn step(
        &mut self,
        action: Action,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<StepResult, EngineError> {
        match (self.stream.as_mut(), action) {
            (Some(Stream::Deflate(c)), Action::Accumulate | Action::Finalize) => {
                let (in0, out0) = (c.total_in(), c.total_out());
                let flush = if action == Action::Finalize {
                    FlushCompress::Finish
                } else {
                    FlushCompress::None
                };
                let status = c.compress(input, output, flush).map_err(|e| {
                    log::debug!("zlib: deflate failed: {e}");
                    EngineError::Sequence
                })?;
                Ok(StepResult {
                    consumed: (c.total_in() - in0) as usize,
                    produced: (c.total_out() - out0) as usize,
                    status: map_status(status),
                })
            }
            (Some(Stream::Inflate(d)), Action::Process) => {
                let (in0, out0) = (d.total_in(), d.total_out());
                let status = d
                    .decompress(input, output, FlushDecompress::None)
                    .map_err(|e| {
                        log::debug!("zlib: inflate failed: {e}");
                        EngineError::DataCorruption
                    })?;
                Ok(StepResult {
                    consumed: (d.total_in() - in0) as usize,
                    produced: (d.total_out() - out0) as usize,
                    status: map_status(status),
                })
            }
            _ => Err(EngineError::Sequence),
        }
    }

    fn close(&mut self) {
        if self.stream.take().is_some() {
            log::trace!("zlib: stream closed");
        }
    }
}

fn map_status(status: Status) -> StepStatus {
    match status {
        Status::StreamEnd => StepStatus::StreamEnd,
        // BufError only means "no progress possible right now"; the driver
        // decides whether that is a stall.
        Status::Ok | Status::BufError => StepStatus::Continue,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
