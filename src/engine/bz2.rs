// bzip2 codec engine.
//
// Wraps `bzip2::Compress` / `bzip2::Decompress` (libbzip2 semantics) in the
// session protocol. Action mapping:
//   Accumulate -> BZ_RUN
//   Finalize   -> BZ_FINISH
//   Process    -> BZ2_bzDecompress

use bzip2::{Compress, Compression, Decompress};

use super::{
    Action, CodecEngine, Direction, EngineError, EngineParams, EngineSession, StepResult,
    StepStatus,
};

/// bzip2 engine. Stateless; every session owns its own libbzip2 stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bzip2Engine;

impl CodecEngine for Bzip2Engine {
    fn name(&self) -> &'static str {
        "bzip2"
    }

    fn open(
        &self,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        params.validate()?;
        let stream = match direction {
            Direction::Compress => Stream::Compress(Compress::new(
                Compression::new(params.block_size_100k),
                params.work_factor,
            )),
            Direction::Decompress => Stream::Decompress(Decompress::new(params.small_memory)),
        };
        log::trace!("bzip2: opened {direction} stream ({params:?})");
        Ok(Box::new(Bzip2Session {
            stream: Some(stream),
        }))
    }
}

enum Stream {
    Compress(Compress),
    Decompress(Decompress),
}

struct Bzip2Session {
    /// `None` once closed.
    stream: Option<Stream>,
}

impl EngineSession for Bzip2Session {
    fn step(
        &mut self,
        action: Action,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<StepResult, EngineError> {
        match (self.stream.as_mut(), action) {
            (Some(Stream::Compress(c)), Action::Accumulate | Action::Finalize) => {
                let (in0, out0) = (c.total_in(), c.total_out());
                let bz_action = if action == Action::Finalize {
                    bzip2::Action::Finish
                } else {
                    bzip2::Action::Run
                };
                let status = c.compress(input, output, bz_action).map_err(map_error)?;
                Ok(StepResult {
                    consumed: (c.total_in() - in0) as usize,
                    produced: (c.total_out() - out0) as usize,
                    status: map_status(status)?,
                })
            }
            (Some(Stream::Decompress(d)), Action::Process) => {
                let (in0, out0) = (d.total_in(), d.total_out());
                let status = d.decompress(input, output).map_err(map_error)?;
                Ok(StepResult {
                    consumed: (d.total_in() - in0) as usize,
                    produced: (d.total_out() - out0) as usize,
                    status: map_status(status)?,
                })
            }
            _ => Err(EngineError::Sequence),
        }
    }

    fn close(&mut self) {
        // Dropping the stream runs BZ2_bz{Compress,Decompress}End.
        if self.stream.take().is_some() {
            log::trace!("bzip2: stream closed");
        }
    }
}

fn map_status(status: bzip2::Status) -> Result<StepStatus, EngineError> {
    match status {
        bzip2::Status::StreamEnd => Ok(StepStatus::StreamEnd),
        bzip2::Status::MemNeeded => Err(EngineError::OutOfMemory),
        _ => Ok(StepStatus::Continue),
    }
}

#[allow(unreachable_patterns)]
fn map_error(err: bzip2::Error) -> EngineError {
    match err {
        bzip2::Error::Sequence => EngineError::Sequence,
        bzip2::Error::Data | bzip2::Error::DataMagic => EngineError::DataCorruption,
        bzip2::Error::Param => EngineError::InvalidParameter,
        _ => EngineError::Unknown(-1),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
