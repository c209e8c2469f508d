// File-level helpers.
//
// `compress_file()` and `decompress_file()` wrap the stream drivers with
// buffered file I/O and use the source file size as the declared length for
// progress reporting. With the `file-io` feature, SHA-256 digests of the
// input and output are computed while the data streams through.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::engine::{CodecEngine, Direction, Format};
use crate::error::{Error, Result};
use crate::stream::{Compressor, Decompressor, Progress, RunStats, StreamOptions};

const BUF_SIZE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()` / `decompress_file()`.
#[derive(Debug, Clone)]
pub struct FileStats {
    /// Input file size in bytes.
    pub input_size: u64,
    /// Output file size in bytes.
    pub output_size: u64,
    /// Driver counters for the run.
    pub run: RunStats,
    /// SHA-256 of the whole input file (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
    /// SHA-256 of the output file (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Compress `src` into `dst` with the engine for `format`.
///
/// `dst` is created or truncated. It is removed again if the run fails.
pub fn compress_file(
    src: &Path,
    dst: &Path,
    format: Format,
    opts: &StreamOptions,
    progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<FileStats> {
    transcode_file(src, dst, format, Direction::Compress, opts, progress)
}

/// Decompress `src` into `dst` with the engine for `format`.
///
/// `dst` is created or truncated. It is removed again if the run fails.
pub fn decompress_file(
    src: &Path,
    dst: &Path,
    format: Format,
    opts: &StreamOptions,
    progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<FileStats> {
    transcode_file(src, dst, format, Direction::Decompress, opts, progress)
}

fn transcode_file(
    src: &Path,
    dst: &Path,
    format: Format,
    direction: Direction,
    opts: &StreamOptions,
    progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<FileStats> {
    let engine = format.engine().ok_or_else(|| {
        Error::InvalidConfiguration(format!("{format} support is not compiled in"))
    })?;

    let input = File::open(src)?;
    if same_file(src, dst) {
        return Err(Error::InvalidArgument(format!(
            "{} is both input and output",
            src.display()
        )));
    }
    let input_size = input.metadata()?.len();
    let output = File::create(dst)?;

    let result = run_files(&*engine, direction, input, output, input_size, opts, progress);
    match &result {
        Ok(stats) => log::info!(
            "{} {direction}: {} -> {} ({} -> {} bytes)",
            engine.name(),
            src.display(),
            dst.display(),
            stats.input_size,
            stats.output_size
        ),
        Err(e) => {
            log::debug!("removing partial output {}: {e}", dst.display());
            let _ = fs::remove_file(dst);
        }
    }
    result
}

/// True when both paths resolve to the same existing file.
pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn run_files(
    engine: &dyn CodecEngine,
    direction: Direction,
    input: File,
    output: File,
    input_size: u64,
    opts: &StreamOptions,
    progress: Option<&mut dyn FnMut(Progress)>,
) -> Result<FileStats> {
    let mut reader = HashingReader::new(BufReader::with_capacity(BUF_SIZE, input));
    let mut writer = HashingWriter::new(BufWriter::with_capacity(BUF_SIZE, output));
    let declared = Some(input_size);

    let run = match (direction, progress) {
        (Direction::Compress, Some(cb)) => Compressor::new(engine, opts.clone())
            .run_with_progress(&mut reader, &mut writer, declared, cb)?,
        (Direction::Compress, None) => {
            Compressor::new(engine, opts.clone()).run(&mut reader, &mut writer, declared)?
        }
        (Direction::Decompress, Some(cb)) => Decompressor::new(engine, opts.clone())
            .run_with_progress(&mut reader, &mut writer, declared, cb)?,
        (Direction::Decompress, None) => {
            Decompressor::new(engine, opts.clone()).run(&mut reader, &mut writer, declared)?
        }
    };

    let input_sha256 = reader.finish()?;
    let (buffered, output_sha256) = writer.finish();
    buffered.into_inner().map_err(|e| e.into_error())?;

    Ok(FileStats {
        input_size,
        output_size: run.bytes_written,
        run,
        input_sha256,
        output_sha256,
    })
}

// ---------------------------------------------------------------------------
// Hashing adapters (digests only with the file-io feature)
// ---------------------------------------------------------------------------

struct HashingReader<R: Read> {
    inner: R,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

impl<R: Read> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        }
    }

    /// Digest of the whole input, including bytes the run did not need.
    #[cfg(feature = "file-io")]
    fn finish(mut self) -> io::Result<Option<[u8; 32]>> {
        io::copy(&mut self, &mut io::sink())?;
        Ok(Some(self.hasher.finalize().into()))
    }

    #[cfg(not(feature = "file-io"))]
    fn finish(self) -> io::Result<Option<[u8; 32]>> {
        Ok(None)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        #[cfg(feature = "file-io")]
        self.hasher.update(&buf[..n]);
        Ok(n)
    }
}

struct HashingWriter<W: Write> {
    inner: W,
    #[cfg(feature = "file-io")]
    hasher: sha2::Sha256,
}

impl<W: Write> HashingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            #[cfg(feature = "file-io")]
            hasher: sha2::Sha256::new(),
        }
    }

    fn finish(self) -> (W, Option<[u8; 32]>) {
        #[cfg(feature = "file-io")]
        let digest = Some(self.hasher.finalize().into());
        #[cfg(not(feature = "file-io"))]
        let digest = None;
        (self.inner, digest)
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        #[cfg(feature = "file-io")]
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Hex rendering of a digest, for logs and JSON output.
pub fn hex_digest(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
