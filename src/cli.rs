// Command-line front end for bzflow.
//
// `compress` / `decompress` take zero or more input files. With no inputs
// the data flows from stdin to `--output`, or to stdout. Output names are derived from the input
// name via `naming` unless `--output` or `--stdout` is given.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::buffer::DEFAULT_CAPACITY;
use crate::engine::{Direction, EngineParams, Format};
use crate::io::{FileStats, compress_file, decompress_file, hex_digest};
use crate::naming;
use crate::stream::{Compressor, Decompressor, Progress, RunStats, StreamOptions, TrailingData};

const BUF_SIZE: usize = 64 * 1024;
const MAX_BUFFER_SIZE: usize = 1 << 30; // 1 GiB

// ---------------------------------------------------------------------------
// Byte size parsing (supports K, M, G suffixes)
// ---------------------------------------------------------------------------

fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty size string".into());
    }
    let (num_part, multiplier) = match s.as_bytes().last() {
        Some(b'k' | b'K') => (&s[..s.len() - 1], 1024u64),
        Some(b'm' | b'M') => (&s[..s.len() - 1], 1024 * 1024),
        Some(b'g' | b'G') => (&s[..s.len() - 1], 1024 * 1024 * 1024),
        _ => (s, 1u64),
    };
    let num: u64 = num_part
        .trim()
        .parse()
        .map_err(|e| format!("invalid size '{s}': {e}"))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflow: '{s}'"))
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Chunked streaming bzip2/zlib compressor.
#[derive(Parser, Debug)]
#[command(
    name = "bzflow",
    version,
    about = "Chunked streaming bzip2/zlib compressor",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Compress files (or stdin).
    Compress(CodecArgs),
    /// Decompress files (or stdin).
    Decompress(CodecArgs),
    /// Print build/configuration details.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Bzip2,
    Zlib,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Bzip2 => Format::Bzip2,
            FormatArg::Zlib => Format::Zlib,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TrailingArg {
    Ignore,
    Reject,
}

#[derive(Args, Debug)]
struct CodecArgs {
    /// Input files (default: stdin).
    #[arg(value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Output file (single input only).
    #[arg(short = 'o', long, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Write output to stdout.
    #[arg(short = 'c', long)]
    stdout: bool,

    /// Keep input files after a successful run.
    #[arg(short = 'k', long)]
    keep: bool,

    /// Stream format (default: bzip2, or detected from the input suffix).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Block size in 100 KiB units; deflate level for zlib (1-9).
    #[arg(long = "block-size", short = 'b', value_parser = clap::value_parser!(u32).range(1..=9), default_value_t = EngineParams::default().block_size_100k)]
    block_size: u32,

    /// Work factor for highly repetitive input (0-250).
    #[arg(long = "work-factor", value_parser = clap::value_parser!(u32).range(0..=250), default_value_t = 0)]
    work_factor: u32,

    /// Use less memory when decompressing.
    #[arg(short = 's', long)]
    small: bool,

    /// Transfer buffer size (supports K/M/G suffix).
    #[arg(long = "buffer-size", value_parser = parse_byte_size, default_value_t = DEFAULT_CAPACITY as u64)]
    buffer_size: u64,

    /// What to do with data after the end of a compressed stream.
    #[arg(long, value_enum, default_value_t = TrailingArg::Ignore)]
    trailing: TrailingArg,

    /// Print progress to stderr.
    #[arg(long)]
    progress: bool,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Compress,
    Decompress,
    Config,
}

#[derive(Debug)]
struct Options {
    command: Command,
    use_stdout: bool,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    keep: bool,
    progress: bool,
    format: Option<Format>,
    stream: StreamOptions,
    inputs: Vec<PathBuf>,
    output_file: Option<PathBuf>,
}

fn resolve_options(cli: Cli) -> Options {
    let verbose = cli.verbose.min(2);
    let (command, args) = match cli.command {
        Cmd::Compress(args) => (Command::Compress, Some(args)),
        Cmd::Decompress(args) => (Command::Decompress, Some(args)),
        Cmd::Config => (Command::Config, None),
    };

    let mut opts = Options {
        command,
        use_stdout: false,
        force: cli.force,
        quiet: cli.quiet,
        verbose,
        json_output: cli.json_output,
        keep: false,
        progress: false,
        format: None,
        stream: StreamOptions::default(),
        inputs: Vec::new(),
        output_file: None,
    };

    if let Some(args) = args {
        opts.use_stdout = args.stdout;
        opts.keep = args.keep || args.stdout;
        opts.progress = args.progress;
        opts.format = args.format.map(Format::from);
        opts.stream = StreamOptions {
            buffer_size: usize::try_from(args.buffer_size).unwrap_or(usize::MAX),
            params: EngineParams {
                block_size_100k: args.block_size,
                // -vv also turns on per-call engine tracing.
                verbosity: u32::from(verbose.saturating_sub(1)),
                work_factor: args.work_factor,
                small_memory: args.small,
            },
            trailing_data: match args.trailing {
                TrailingArg::Ignore => TrailingData::Ignore,
                TrailingArg::Reject => TrailingData::Reject,
            },
            ..Default::default()
        };
        opts.inputs = args.inputs;
        opts.output_file = args.output;
    }
    opts
}

#[cfg(any(test, feature = "fuzzing"))]
pub fn fuzz_try_parse_args(args: &[String]) {
    let argv: Vec<String> = std::iter::once("bzflow".to_string())
        .chain(args.iter().cloned())
        .collect();
    if let Ok(cli) = Cli::try_parse_from(argv) {
        let _ = resolve_options(cli);
    }
}

// ---------------------------------------------------------------------------
// Config command
// ---------------------------------------------------------------------------

fn cmd_config() -> i32 {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!("bzflow version {version}");

    let bzip2 = cfg!(feature = "bzip2") as u8;
    let zlib = cfg!(feature = "zlib") as u8;
    let file_io = cfg!(feature = "file-io") as u8;
    let parallel = cfg!(feature = "parallel") as u8;
    let defaults = StreamOptions::default();

    eprintln!("FORMAT_BZIP2={bzip2}");
    eprintln!("FORMAT_ZLIB={zlib}");
    eprintln!("FILE_IO={file_io}");
    eprintln!("PARALLEL={parallel}");
    eprintln!("DEFAULT_BUFFER_SIZE={}", defaults.buffer_size);
    eprintln!("DEFAULT_BLOCK_SIZE={}", defaults.params.block_size_100k);
    eprintln!("MAX_BUFFER_SIZE={MAX_BUFFER_SIZE}");
    eprintln!("MAX_CALLS_PER_CHUNK={}", defaults.max_calls_per_chunk);

    0
}

// ---------------------------------------------------------------------------
// Format and output selection
// ---------------------------------------------------------------------------

fn default_format() -> Option<Format> {
    Format::available().into_iter().next()
}

fn pick_format(opts: &Options, input: Option<&Path>) -> Result<Format, String> {
    let detected = match (opts.command, input) {
        (Command::Decompress, Some(path)) => Format::detect(path),
        _ => None,
    };
    let format = opts
        .format
        .or(detected)
        .or_else(default_format)
        .ok_or("no stream format compiled in")?;
    if !Format::available().contains(&format) {
        return Err(format!("{format} support is not compiled in"));
    }
    Ok(format)
}

/// Output path derived from the input name, next to the input.
fn derived_output(input: &Path, direction: Direction, format: Format) -> Result<PathBuf, String> {
    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| format!("{}: cannot derive an output name", input.display()))?;
    let out = match direction {
        Direction::Compress => naming::compressed_name(name, format),
        Direction::Decompress => naming::uncompressed_name(name, format),
    };
    Ok(input.with_file_name(out))
}

fn direction_of(command: Command) -> Direction {
    match command {
        Command::Decompress => Direction::Decompress,
        _ => Direction::Compress,
    }
}

fn print_progress(label: &str, p: Progress) {
    match p.percent() {
        Some(pct) => eprint!("\r{label}: {pct:5.1}%"),
        None => eprint!("\r{label}: {} bytes", p.processed_bytes),
    }
}

// ---------------------------------------------------------------------------
// Stream mode (stdin -> stdout)
// ---------------------------------------------------------------------------

fn cmd_stream(opts: &Options) -> i32 {
    let direction = direction_of(opts.command);
    let format = match pick_format(opts, None) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("bzflow: {e}");
            return 1;
        }
    };
    let Some(engine) = format.engine() else {
        eprintln!("bzflow: {format} support is not compiled in");
        return 1;
    };

    let sink: Box<dyn Write> = match &opts.output_file {
        Some(path) => {
            if path.exists() && !opts.force {
                eprintln!(
                    "bzflow: output file exists, use -f to overwrite: {}",
                    path.display()
                );
                return 1;
            }
            match File::create(path) {
                Ok(f) => Box::new(f),
                Err(e) => {
                    eprintln!("bzflow: {}: {e}", path.display());
                    return 1;
                }
            }
        }
        None => {
            if direction == Direction::Compress && io::stdout().is_terminal() && !opts.force {
                eprintln!("bzflow: refusing to write compressed data to a terminal, use -f to force");
                return 1;
            }
            Box::new(io::stdout().lock())
        }
    };

    let mut reader = BufReader::with_capacity(BUF_SIZE, io::stdin().lock());
    let mut writer = BufWriter::with_capacity(BUF_SIZE, sink);
    let show = opts.progress && !opts.quiet;
    let on_progress = |p: Progress| {
        if show {
            print_progress("stdin", p);
        }
    };

    let result = match direction {
        Direction::Compress => Compressor::new(&*engine, opts.stream.clone())
            .run_with_progress(&mut reader, &mut writer, None, on_progress),
        Direction::Decompress => Decompressor::new(&*engine, opts.stream.clone())
            .run_with_progress(&mut reader, &mut writer, None, on_progress),
    };
    if show {
        eprintln!();
    }

    let flushed = result.and_then(|stats| writer.flush().map(|()| stats).map_err(Into::into));
    let stats = match flushed {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("bzflow: {direction} error: {e}");
            if let Some(path) = &opts.output_file {
                drop(writer);
                let _ = std::fs::remove_file(path);
            }
            return 1;
        }
    };

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "bzflow: {format} {direction}: {} -> {} bytes, {} chunks",
            stats.bytes_read, stats.bytes_written, stats.chunks
        );
    }
    if opts.json_output {
        let json = serde_json::json!({
            "command": direction.to_string(),
            "format": format.name(),
            "stats": run_json(&stats),
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
    }
    0
}

// ---------------------------------------------------------------------------
// File mode
// ---------------------------------------------------------------------------

struct Job {
    input: PathBuf,
    /// `None` means stdout.
    output: Option<PathBuf>,
    format: Format,
}

struct Report {
    job: Job,
    stats: FileStats,
}

fn plan_jobs(opts: &Options) -> Result<Vec<Job>, String> {
    if opts.output_file.is_some() && opts.inputs.len() > 1 {
        return Err("--output needs exactly one input file".into());
    }
    let direction = direction_of(opts.command);
    let mut jobs = Vec::with_capacity(opts.inputs.len());
    for input in &opts.inputs {
        let format = pick_format(opts, Some(input))?;
        let output = if opts.use_stdout {
            None
        } else {
            match &opts.output_file {
                Some(path) => Some(path.clone()),
                None => Some(derived_output(input, direction, format)?),
            }
        };
        if let Some(out) = &output {
            if out == input || crate::io::same_file(out, input) {
                return Err(format!("{}: output would overwrite input", input.display()));
            }
            if out.exists() && !opts.force {
                return Err(format!(
                    "output file exists, use -f to overwrite: {}",
                    out.display()
                ));
            }
        }
        jobs.push(Job {
            input: input.clone(),
            output,
            format,
        });
    }
    Ok(jobs)
}

fn run_job(job: Job, opts: &Options) -> Result<Report, String> {
    let direction = direction_of(opts.command);
    let label = job.input.display().to_string();
    let show = opts.progress && !opts.quiet;
    let mut on_progress = |p: Progress| print_progress(&label, p);
    let progress: Option<&mut dyn FnMut(Progress)> = if show {
        Some(&mut on_progress)
    } else {
        None
    };

    let stats = match &job.output {
        Some(output) => match direction {
            Direction::Compress => {
                compress_file(&job.input, output, job.format, &opts.stream, progress)
            }
            Direction::Decompress => {
                decompress_file(&job.input, output, job.format, &opts.stream, progress)
            }
        },
        None => stream_file_to_stdout(&job, direction, &opts.stream, progress),
    };
    if show {
        eprintln!();
    }
    let stats = stats.map_err(|e| format!("{label}: {e}"))?;

    if !opts.keep && job.output.is_some() {
        if let Err(e) = std::fs::remove_file(&job.input) {
            log::warn!("{label}: could not remove input: {e}");
        }
    }
    Ok(Report { job, stats })
}

fn stream_file_to_stdout(
    job: &Job,
    direction: Direction,
    stream: &StreamOptions,
    progress: Option<&mut dyn FnMut(Progress)>,
) -> crate::Result<FileStats> {
    let engine = job.format.engine().ok_or_else(|| {
        crate::Error::InvalidConfiguration(format!("{} support is not compiled in", job.format))
    })?;
    let file = File::open(&job.input)?;
    let input_size = file.metadata()?.len();
    let mut reader = BufReader::with_capacity(BUF_SIZE, file);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, io::stdout().lock());
    let mut noop = |_: Progress| {};
    let cb: &mut dyn FnMut(Progress) = match progress {
        Some(cb) => cb,
        None => &mut noop,
    };
    let run = match direction {
        Direction::Compress => Compressor::new(&*engine, stream.clone()).run_with_progress(
            &mut reader,
            &mut writer,
            Some(input_size),
            cb,
        )?,
        Direction::Decompress => Decompressor::new(&*engine, stream.clone()).run_with_progress(
            &mut reader,
            &mut writer,
            Some(input_size),
            cb,
        )?,
    };
    writer.flush()?;
    Ok(FileStats {
        input_size,
        output_size: run.bytes_written,
        run,
        input_sha256: None,
        output_sha256: None,
    })
}

#[cfg(feature = "parallel")]
fn run_jobs(jobs: Vec<Job>, opts: &Options) -> Vec<Result<Report, String>> {
    use rayon::prelude::*;
    if jobs.len() > 1 && !opts.use_stdout {
        return jobs.into_par_iter().map(|job| run_job(job, opts)).collect();
    }
    jobs.into_iter().map(|job| run_job(job, opts)).collect()
}

#[cfg(not(feature = "parallel"))]
fn run_jobs(jobs: Vec<Job>, opts: &Options) -> Vec<Result<Report, String>> {
    jobs.into_iter().map(|job| run_job(job, opts)).collect()
}

fn cmd_files(opts: &Options) -> i32 {
    let jobs = match plan_jobs(opts) {
        Ok(jobs) => jobs,
        Err(e) => {
            eprintln!("bzflow: {e}");
            return 1;
        }
    };

    let mut failed = false;
    let mut reports = Vec::new();
    for result in run_jobs(jobs, opts) {
        match result {
            Ok(report) => {
                if opts.verbose > 0 && !opts.quiet {
                    eprintln!(
                        "bzflow: {}: {} -> {} bytes",
                        report.job.input.display(),
                        report.stats.input_size,
                        report.stats.output_size
                    );
                }
                reports.push(report);
            }
            Err(e) => {
                eprintln!("bzflow: {e}");
                failed = true;
            }
        }
    }

    if opts.json_output {
        let files: Vec<_> = reports.iter().map(report_json).collect();
        let json = serde_json::json!({
            "command": direction_of(opts.command).to_string(),
            "files": files,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
    }

    i32::from(failed)
}

fn run_json(stats: &RunStats) -> serde_json::Value {
    serde_json::json!({
        "bytes_read": stats.bytes_read,
        "bytes_written": stats.bytes_written,
        "chunks": stats.chunks,
        "engine_calls": stats.engine_calls,
        "unconsumed_bytes": stats.unconsumed_bytes,
    })
}

fn report_json(report: &Report) -> serde_json::Value {
    serde_json::json!({
        "input": report.job.input.display().to_string(),
        "output": report.job.output.as_ref().map(|p| p.display().to_string()),
        "format": report.job.format.name(),
        "input_size": report.stats.input_size,
        "output_size": report.stats.output_size,
        "input_sha256": report.stats.input_sha256.map(|d| hex_digest(&d)),
        "output_sha256": report.stats.output_sha256.map(|d| hex_digest(&d)),
        "stats": run_json(&report.stats.run),
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main CLI entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    let cli = Cli::parse();
    let mut opts = resolve_options(cli);

    let default_filter = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    if opts.stream.buffer_size == 0 || opts.stream.buffer_size > MAX_BUFFER_SIZE {
        eprintln!(
            "bzflow: --buffer-size: {} is outside 1..={MAX_BUFFER_SIZE}",
            opts.stream.buffer_size
        );
        process::exit(1);
    }

    // Warn if -c overrides output filename.
    if opts.use_stdout && opts.output_file.is_some() {
        if !opts.quiet {
            if let Some(path) = &opts.output_file {
                eprintln!(
                    "bzflow: warning: -c option overrides output filename: {}",
                    path.display()
                );
            }
        }
        opts.output_file = None;
    }

    let exit_code = match opts.command {
        Command::Config => cmd_config(),
        Command::Compress | Command::Decompress if opts.inputs.is_empty() => cmd_stream(&opts),
        Command::Compress | Command::Decompress => cmd_files(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_opts(args: &[&str]) -> Options {
        let argv: Vec<String> = std::iter::once("bzflow".to_string())
            .chain(args.iter().map(|s| s.to_string()))
            .collect();
        let cli = Cli::try_parse_from(argv).expect("cli parse failed");
        resolve_options(cli)
    }

    #[test]
    fn parse_byte_size_suffixes() {
        assert_eq!(parse_byte_size("1").unwrap(), 1);
        assert_eq!(parse_byte_size("2K").unwrap(), 2 * 1024);
        assert_eq!(parse_byte_size("3m").unwrap(), 3 * 1024 * 1024);
        assert_eq!(parse_byte_size("4G").unwrap(), 4 * 1024 * 1024 * 1024);
        assert!(parse_byte_size("").is_err());
        assert!(parse_byte_size("12Q").is_err());
    }

    #[test]
    fn compress_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "compress",
            "--format",
            "zlib",
            "--block-size",
            "9",
            "--work-factor",
            "30",
            "--buffer-size",
            "64K",
            "--keep",
            "a.txt",
            "b.txt",
        ]);
        assert_eq!(opts.command, Command::Compress);
        assert_eq!(opts.format, Some(Format::Zlib));
        assert_eq!(opts.stream.params.block_size_100k, 9);
        assert_eq!(opts.stream.params.work_factor, 30);
        assert_eq!(opts.stream.buffer_size, 64 * 1024);
        assert!(opts.keep);
        assert_eq!(
            opts.inputs,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn decompress_subcommand_maps_correctly() {
        let opts = parse_opts(&[
            "--quiet",
            "decompress",
            "--small",
            "--trailing",
            "reject",
            "-o",
            "out.bin",
            "in.bz2",
        ]);
        assert_eq!(opts.command, Command::Decompress);
        assert!(opts.quiet);
        assert!(opts.stream.params.small_memory);
        assert_eq!(opts.stream.trailing_data, TrailingData::Reject);
        assert_eq!(opts.output_file, Some(PathBuf::from("out.bin")));
        assert_eq!(opts.inputs, vec![PathBuf::from("in.bz2")]);
    }

    #[test]
    fn defaults_match_library_defaults() {
        let opts = parse_opts(&["compress"]);
        let defaults = StreamOptions::default();
        assert_eq!(opts.stream.buffer_size, defaults.buffer_size);
        assert_eq!(opts.stream.params, defaults.params);
        assert_eq!(opts.stream.trailing_data, TrailingData::Ignore);
        assert!(opts.inputs.is_empty());
        assert!(!opts.keep);
    }

    #[test]
    fn stdout_implies_keep() {
        let opts = parse_opts(&["--force", "compress", "--stdout", "in"]);
        assert!(opts.use_stdout);
        assert!(opts.force);
        assert!(opts.keep);
    }

    #[test]
    fn verbose_is_capped_and_enables_tracing() {
        let opts = parse_opts(&["-vvv", "compress", "in"]);
        assert_eq!(opts.verbose, 2);
        assert_eq!(opts.stream.params.verbosity, 1);
        assert_eq!(parse_opts(&["-v", "compress", "in"]).stream.params.verbosity, 0);
    }

    #[test]
    fn out_of_range_block_size_rejected() {
        let argv = ["bzflow", "compress", "--block-size", "10"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn config_command_maps() {
        assert_eq!(parse_opts(&["config"]).command, Command::Config);
    }

    #[test]
    fn derived_output_names() {
        let out = derived_output(Path::new("dir/a.tar"), Direction::Compress, Format::Bzip2);
        assert_eq!(out.unwrap(), PathBuf::from("dir/a.tar.bz2"));
        let out = derived_output(Path::new("dir/a.tbz2"), Direction::Decompress, Format::Bzip2);
        assert_eq!(out.unwrap(), PathBuf::from("dir/a.tar"));
        let out = derived_output(Path::new("x.zz"), Direction::Decompress, Format::Zlib);
        assert_eq!(out.unwrap(), PathBuf::from("x"));
    }

    #[test]
    fn decompress_detects_format_from_suffix() {
        if !Format::available().contains(&Format::Zlib) {
            return;
        }
        let opts = parse_opts(&["decompress", "x.zz"]);
        assert_eq!(pick_format(&opts, Some(Path::new("x.zz"))), Ok(Format::Zlib));
        let forced = parse_opts(&["decompress", "--format", "zlib", "x.bz2"]);
        assert_eq!(pick_format(&forced, Some(Path::new("x.bz2"))), Ok(Format::Zlib));
    }

    #[test]
    fn output_flag_needs_single_input() {
        let opts = parse_opts(&["compress", "-o", "out", "a", "b"]);
        assert!(plan_jobs(&opts).is_err());
    }

    #[test]
    fn fuzz_parse_never_panics() {
        fuzz_try_parse_args(&["compress".into(), "--buffer-size".into(), "9999999G".into()]);
        fuzz_try_parse_args(&["decompress".into(), "--trailing".into(), "maybe".into()]);
    }
}
