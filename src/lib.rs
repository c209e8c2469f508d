//! Bzflow: chunked streaming compression and decompression in Rust.
//!
//! The crate moves arbitrarily large byte streams through block-oriented
//! codec engines that only accept and emit bounded chunks. Memory per run is
//! bounded by two transfer buffers, whatever the payload size.
//!
//! The crate provides:
//! - The codec engine protocol and built-in engines (`engine`)
//! - The streaming drivers (`stream`)
//! - Filename suffix mapping (`naming`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use bzflow::engine::bz2::Bzip2Engine;
//! use bzflow::stream::{compress_all, decompress_all};
//!
//! let data = b"hello hello hello hello";
//! let packed = compress_all(&Bzip2Engine, data).unwrap();
//! let restored = decompress_all(&Bzip2Engine, &packed).unwrap();
//! assert_eq!(restored, data);
//! ```

pub mod buffer;
pub mod engine;
pub mod error;
pub mod io;
pub mod naming;
pub mod stream;

#[cfg(feature = "cli")]
pub mod cli;

pub use engine::{CodecEngine, EngineError, EngineParams, Format};
pub use error::{Error, Result};
pub use stream::{
    Compressor, Decompressor, Progress, RunStats, StreamOptions, TrailingData, compress_all,
    decompress_all, run_compression, run_decompression,
};
