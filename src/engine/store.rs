// Store engine: framing without compression.
//
// Wire format: payload bytes, with 0xFF escaped as `FF 00`, terminated by
// the end marker `FF 01`. Anything after the marker is not part of the stream.
//
// Per-call input/output limits can be lowered to force the drivers through
// many buffer-full iterations, which makes this engine useful for exercising
// the step protocol without a real codec.

use std::collections::VecDeque;

use super::{
    Action, CodecEngine, Direction, EngineError, EngineParams, EngineSession, StepResult,
    StepStatus,
};

const ESCAPE: u8 = 0xFF;
const ESCAPED_FF: u8 = 0x00;
const END: u8 = 0x01;

/// Passthrough engine with an explicit end-of-stream marker.
#[derive(Debug, Clone, Copy)]
pub struct StoreEngine {
    max_in: usize,
    max_out: usize,
}

impl Default for StoreEngine {
    fn default() -> Self {
        Self {
            max_in: usize::MAX,
            max_out: usize::MAX,
        }
    }
}

impl StoreEngine {
    /// Limit every step to at most `max_in` consumed and `max_out` produced bytes.
    pub fn with_limits(max_in: usize, max_out: usize) -> Self {
        Self {
            max_in: max_in.max(1),
            max_out: max_out.max(1),
        }
    }
}

impl CodecEngine for StoreEngine {
    fn name(&self) -> &'static str {
        "store"
    }

    fn open(
        &self,
        direction: Direction,
        params: &EngineParams,
    ) -> Result<Box<dyn EngineSession>, EngineError> {
        params.validate()?;
        Ok(Box::new(StoreSession {
            direction,
            max_in: self.max_in,
            max_out: self.max_out,
            pending: VecDeque::new(),
            escape: false,
            finished: false,
            closed: false,
        }))
    }
}

struct StoreSession {
    direction: Direction,
    max_in: usize,
    max_out: usize,
    /// Bytes decided but not yet handed out.
    pending: VecDeque<u8>,
    /// Decoder saw an escape byte at the end of the previous input.
    escape: bool,
    /// Encoder queued the end marker / decoder saw it.
    finished: bool,
    closed: bool,
}

impl StoreSession {
    /// Hand out pending bytes. Returns true once the per-call output limit is hit.
    fn flush(&mut self, output: &mut [u8], produced: &mut usize) -> bool {
        let limit = output.len().min(self.max_out);
        while *produced < limit {
            match self.pending.pop_front() {
                Some(b) => {
                    output[*produced] = b;
                    *produced += 1;
                }
                None => break,
            }
        }
        *produced == limit
    }

    fn encode(&mut self, action: Action, input: &[u8], output: &mut [u8]) -> StepResult {
        let (mut consumed, mut produced) = (0, 0);
        let input = if action == Action::Finalize {
            // Finalize carries no input; the marker goes after everything queued.
            if !self.finished {
                self.finished = true;
                self.pending.extend([ESCAPE, END]);
            }
            &[][..]
        } else {
            input
        };
        loop {
            let full = self.flush(output, &mut produced);
            if full
                || !self.pending.is_empty()
                || consumed == input.len()
                || consumed == self.max_in
            {
                break;
            }
            let b = input[consumed];
            consumed += 1;
            if b == ESCAPE {
                self.pending.extend([ESCAPE, ESCAPED_FF]);
            } else {
                self.pending.push_back(b);
            }
        }
        let status = if self.finished && self.pending.is_empty() {
            StepStatus::StreamEnd
        } else {
            StepStatus::Continue
        };
        StepResult {
            consumed,
            produced,
            status,
        }
    }

    fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Result<StepResult, EngineError> {
        let (mut consumed, mut produced) = (0, 0);
        loop {
            let full = self.flush(output, &mut produced);
            if full
                || self.finished
                || !self.pending.is_empty()
                || consumed == input.len()
                || consumed == self.max_in
            {
                break;
            }
            let b = input[consumed];
            consumed += 1;
            if self.escape {
                self.escape = false;
                match b {
                    ESCAPED_FF => self.pending.push_back(ESCAPE),
                    END => self.finished = true,
                    _ => return Err(EngineError::DataCorruption),
                }
            } else if b == ESCAPE {
                self.escape = true;
            } else {
                self.pending.push_back(b);
            }
        }
        let status = if self.finished && self.pending.is_empty() {
            StepStatus::StreamEnd
        } else {
            StepStatus::Continue
        };
        Ok(StepResult {
            consumed,
            produced,
            status,
        })
    }
}

impl EngineSession for StoreSession {
    fn step(
        &mut self,
        action: Action,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<StepResult, EngineError> {
        if self.closed {
            return Err(EngineError::Sequence);
        }
        match (self.direction, action) {
            (Direction::Compress, Action::Accumulate) if self.finished => {
                Err(EngineError::Sequence)
            }
            (Direction::Compress, Action::Accumulate | Action::Finalize) => {
                Ok(self.encode(action, input, output))
            }
            (Direction::Decompress, Action::Process) => self.decode(input, output),
            _ => Err(EngineError::Sequence),
        }
    }

    fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn session(engine: StoreEngine, direction: Direction) -> Box<dyn EngineSession> {
        engine.open(direction, &EngineParams::default()).unwrap()
    }

    #[test]
    fn escapes_and_terminates() {
        let mut enc = session(StoreEngine::default(), Direction::Compress);
        let mut out = [0u8; 16];
        let s = enc.step(Action::Accumulate, &[1, 0xFF, 2], &mut out).unwrap();
        assert_eq!(s.consumed, 3);
        assert_eq!(&out[..s.produced], &[1, 0xFF, 0x00, 2]);
        let f = enc.step(Action::Finalize, &[], &mut out).unwrap();
        assert_eq!(&out[..f.produced], &[0xFF, 0x01]);
        assert_eq!(f.status, StepStatus::StreamEnd);
    }

    #[test]
    fn limits_split_output_across_calls() {
        let mut enc = session(StoreEngine::with_limits(8, 2), Direction::Compress);
        let mut out = [0u8; 16];
        let s = enc.step(Action::Accumulate, b"abcdef", &mut out).unwrap();
        assert_eq!((s.consumed, s.produced), (2, 2));
        let s = enc.step(Action::Accumulate, b"cdef", &mut out).unwrap();
        assert_eq!((s.consumed, s.produced), (2, 2));
    }

    #[test]
    fn decoder_stops_at_marker() {
        let mut dec = session(StoreEngine::default(), Direction::Decompress);
        let mut out = [0u8; 16];
        let s = dec
            .step(Action::Process, &[b'h', b'i', 0xFF, 0x01, b'z', b'z'], &mut out)
            .unwrap();
        assert_eq!(s.consumed, 4);
        assert_eq!(&out[..s.produced], b"hi");
        assert_eq!(s.status, StepStatus::StreamEnd);
    }

    #[test]
    fn escape_split_across_calls() {
        let mut dec = session(StoreEngine::default(), Direction::Decompress);
        let mut out = [0u8; 4];
        let a = dec.step(Action::Process, &[7, 0xFF], &mut out).unwrap();
        assert_eq!((a.consumed, a.produced), (2, 1));
        let b = dec.step(Action::Process, &[0x00, 0xFF, 0x01], &mut out).unwrap();
        assert_eq!(&out[..b.produced], &[0xFF]);
        assert_eq!(b.status, StepStatus::StreamEnd);
    }

    #[test]
    fn bad_escape_is_corruption() {
        let mut dec = session(StoreEngine::default(), Direction::Decompress);
        let mut out = [0u8; 4];
        assert_eq!(
            dec.step(Action::Process, &[0xFF, 0x42], &mut out),
            Err(EngineError::DataCorruption)
        );
    }

    #[test]
    fn closed_session_refuses_steps() {
        let mut enc = session(StoreEngine::default(), Direction::Compress);
        enc.close();
        let mut out = [0u8; 4];
        assert_eq!(
            enc.step(Action::Finalize, &[], &mut out),
            Err(EngineError::Sequence)
        );
    }
}
