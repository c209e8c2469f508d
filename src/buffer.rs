// Transfer buffers.
//
// Each stream run owns exactly two fixed-capacity buffers: one stages input
// for the engine, the other receives the engine's output. Both are plain
// owned slices; the engine only ever sees bounds-checked sub-slices.
//
// Input side:  read_from / stage append, compact drops the consumed prefix.
// Output side: output_region hands out the whole (reset) buffer, commit
//              records how much the last engine call produced, drain_to /
//              drain copy it out.

use std::io::{self, Read, Write};

use crate::error::{Error, Result};

/// Default capacity of each transfer buffer (1 MiB).
pub const DEFAULT_CAPACITY: usize = 1 << 20;

/// A fixed-capacity staging buffer.
///
/// `len()` is the number of valid bytes: unconsumed input on the input side,
/// bytes produced by the last engine call on the output side. It never
/// exceeds `capacity()`.
#[derive(Debug)]
pub struct TransferBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl TransferBuffer {
    /// Allocate a zeroed buffer of exactly `capacity` bytes.
    pub fn acquire(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "transfer buffer capacity must be greater than zero".into(),
            ));
        }
        Ok(Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        })
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Free space after the valid region.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.len
    }

    /// The valid bytes.
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copy `src` in after the valid region.
    pub fn stage(&mut self, src: &[u8]) -> Result<()> {
        if src.len() > self.remaining() {
            return Err(Error::InvalidArgument(format!(
                "cannot stage {} bytes, only {} of {} free",
                src.len(),
                self.remaining(),
                self.capacity()
            )));
        }
        self.data[self.len..self.len + src.len()].copy_from_slice(src);
        self.len += src.len();
        Ok(())
    }

    /// Read one chunk from `reader` into the free space.
    ///
    /// Returns the number of bytes read; 0 means end of source (or no free
    /// space). Interrupted reads are retried.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<usize> {
        if self.remaining() == 0 {
            return Ok(0);
        }
        loop {
            match reader.read(&mut self.data[self.len..]) {
                Ok(n) => {
                    // A misbehaving reader must not push `len` past capacity.
                    let n = n.min(self.remaining());
                    self.len += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Drop `consumed` bytes from the front, moving the rest to offset 0.
    pub fn compact(&mut self, consumed: usize) -> Result<()> {
        if consumed > self.len {
            return Err(Error::Protocol(format!(
                "engine consumed {consumed} bytes but only {} were offered",
                self.len
            )));
        }
        if consumed > 0 {
            self.data.copy_within(consumed..self.len, 0);
            self.len -= consumed;
        }
        Ok(())
    }

    /// Reset to empty and hand out the whole buffer for the engine to fill.
    pub fn output_region(&mut self) -> &mut [u8] {
        self.len = 0;
        &mut self.data
    }

    /// Record that the engine wrote `produced` bytes to the front.
    pub fn commit(&mut self, produced: usize) -> Result<()> {
        if produced > self.capacity() {
            return Err(Error::Protocol(format!(
                "engine produced {produced} bytes into a {}-byte buffer",
                self.capacity()
            )));
        }
        self.len = produced;
        Ok(())
    }

    /// Copy the first `dst.len()` valid bytes out.
    pub fn drain(&self, dst: &mut [u8]) -> Result<()> {
        if dst.len() > self.len {
            return Err(Error::InvalidArgument(format!(
                "cannot drain {} bytes, only {} available",
                dst.len(),
                self.len
            )));
        }
        dst.copy_from_slice(&self.data[..dst.len()]);
        Ok(())
    }

    /// Write all valid bytes to `sink`. Returns how many were written.
    pub fn drain_to<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<usize> {
        if self.len > 0 {
            sink.write_all(&self.data[..self.len])?;
        }
        Ok(self.len)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_zero_is_rejected() {
        assert!(matches!(
            TransferBuffer::acquire(0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn acquire_is_zeroed_and_empty() {
        let mut buf = TransferBuffer::acquire(16).unwrap();
        assert_eq!(buf.capacity(), 16);
        assert!(buf.is_empty());
        assert!(buf.output_region().iter().all(|&b| b == 0));
    }

    #[test]
    fn stage_past_capacity_fails() {
        let mut buf = TransferBuffer::acquire(4).unwrap();
        buf.stage(b"abc").unwrap();
        assert!(matches!(buf.stage(b"de"), Err(Error::InvalidArgument(_))));
        assert_eq!(buf.filled(), b"abc");
    }

    #[test]
    fn compact_moves_tail_to_front() {
        let mut buf = TransferBuffer::acquire(8).unwrap();
        buf.stage(b"abcdef").unwrap();
        buf.compact(4).unwrap();
        assert_eq!(buf.filled(), b"ef");
        buf.stage(b"gh").unwrap();
        assert_eq!(buf.filled(), b"efgh");
        buf.compact(4).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn compact_beyond_valid_is_protocol_error() {
        let mut buf = TransferBuffer::acquire(8).unwrap();
        buf.stage(b"ab").unwrap();
        assert!(matches!(buf.compact(3), Err(Error::Protocol(_))));
        assert_eq!(buf.filled(), b"ab");
    }

    #[test]
    fn read_from_fills_free_space_only() {
        let mut buf = TransferBuffer::acquire(5).unwrap();
        buf.stage(b"xy").unwrap();
        let mut src: &[u8] = b"0123456789";
        assert_eq!(buf.read_from(&mut src).unwrap(), 3);
        assert_eq!(buf.filled(), b"xy012");
        assert_eq!(buf.read_from(&mut src).unwrap(), 0);
    }

    #[test]
    fn read_from_retries_interrupted() {
        struct Flaky(bool);
        impl Read for Flaky {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if !self.0 {
                    self.0 = true;
                    return Err(io::ErrorKind::Interrupted.into());
                }
                buf[0] = 7;
                Ok(1)
            }
        }
        let mut buf = TransferBuffer::acquire(4).unwrap();
        assert_eq!(buf.read_from(&mut Flaky(false)).unwrap(), 1);
        assert_eq!(buf.filled(), &[7]);
    }

    #[test]
    fn output_cycle() {
        let mut buf = TransferBuffer::acquire(8).unwrap();
        buf.output_region()[..3].copy_from_slice(b"out");
        buf.commit(3).unwrap();

        let mut head = [0u8; 2];
        buf.drain(&mut head).unwrap();
        assert_eq!(&head, b"ou");
        assert!(buf.drain(&mut [0u8; 4]).is_err());

        let mut sink = Vec::new();
        assert_eq!(buf.drain_to(&mut sink).unwrap(), 3);
        assert_eq!(sink, b"out");

        // A fresh region starts empty.
        let _ = buf.output_region();
        assert!(buf.is_empty());
        assert!(matches!(buf.commit(9), Err(Error::Protocol(_))));
    }
}
