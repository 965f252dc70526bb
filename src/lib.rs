//! Annotrack: keyframe interpolation, slicing and merging of annotation
//! tracks.
//!
//! Annotation tools store an object followed through a video as a *track*:
//! a handful of hand-drawn keyframes from which every other frame is
//! derived. Annotrack is the engine behind that representation. It expands
//! tracks into per-frame shapes, cuts annotation sets to frame ranges, and
//! merges the annotations of overlapping job segments into one set.
//!
//! # Modules
//!
//! - [`ir`]: The annotation model (tags, shapes, tracks) and its JSON I/O
//! - [`interpolation`]: Per-frame shapes from keyframes
//! - [`geometry`]: Shape similarity used for matching
//! - [`merge`]: Matching and uniting objects of overlapping segments
//! - [`validation`]: Structural checks and error reporting
//! - [`error`]: Error types for annotrack operations

pub mod error;
pub mod geometry;
pub mod interpolation;
pub mod ir;
pub mod merge;
pub mod validation;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

pub use error::AnnotrackError;

/// The annotrack CLI application.
#[derive(Parser)]
#[command(name = "annotrack")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace). Logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Cut an IR down to an inclusive frame range.
    Slice(SliceArgs),
    /// Merge the IR of the next job segment into a base IR.
    Merge(MergeArgs),
    /// Materialize every track into per-frame shapes.
    Shapes(ShapesArgs),
    /// List all tracks, turning standalone shapes into one-frame tracks.
    Tracks(TracksArgs),
    /// Validate an IR for errors and warnings.
    Validate(ValidateArgs),
}

#[derive(clap::Args)]
struct SliceArgs {
    /// Input IR JSON file.
    input: PathBuf,

    /// First frame to keep.
    #[arg(long)]
    start: u64,

    /// Last frame to keep (inclusive).
    #[arg(long)]
    stop: u64,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct MergeArgs {
    /// IR JSON of the earlier segment.
    base: PathBuf,

    /// IR JSON of the segment being merged in.
    incoming: PathBuf,

    /// First frame of the incoming segment.
    #[arg(long)]
    start_frame: u64,

    /// Number of frames both segments cover.
    #[arg(long, default_value_t = 0)]
    overlap: u64,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ShapesArgs {
    /// Input IR JSON file.
    input: PathBuf,

    /// Frames at or after this one are not materialized.
    #[arg(long)]
    end_frame: u64,

    /// Only report shapes on these frames (comma-separated).
    #[arg(long, value_delimiter = ',')]
    frames: Option<Vec<u64>>,

    /// Frames removed from the timeline (comma-separated).
    #[arg(long, value_delimiter = ',')]
    deleted_frames: Option<Vec<u64>>,

    /// Also report outside shapes between an outside keyframe and the next.
    #[arg(long)]
    include_outside: bool,

    /// Stamp shapes with track ids instead of track positions.
    #[arg(long)]
    server_track_ids: bool,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TracksArgs {
    /// Input IR JSON file.
    input: PathBuf,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Input IR JSON file.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    output: ReportFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Run the annotrack CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), AnnotrackError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Slice(args)) => run_slice(args),
        Some(Commands::Merge(args)) => run_merge(args),
        Some(Commands::Shapes(args)) => run_shapes(args),
        Some(Commands::Tracks(args)) => run_tracks(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("annotrack {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Keyframe interpolation, slicing and merging of annotation tracks.");
            println!();
            println!("Run 'annotrack --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // a host that already installed a subscriber keeps it
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_slice(args: SliceArgs) -> Result<(), AnnotrackError> {
    let ir = ir::io_json::read_ir_json(&args.input)?;
    let sliced = ir.slice(args.start, args.stop)?;
    info!(
        tracks = sliced.tracks.len(),
        shapes = sliced.shapes.len(),
        tags = sliced.tags.len(),
        "sliced"
    );
    emit(args.output.as_deref(), &sliced, ir::io_json::write_ir_json)
}

fn run_merge(args: MergeArgs) -> Result<(), AnnotrackError> {
    let base = ir::io_json::read_ir_json(&args.base)?;
    let incoming = ir::io_json::read_ir_json(&args.incoming)?;
    let merged = base.merge(incoming, args.start_frame, args.overlap)?;
    info!(
        tracks = merged.tracks.len(),
        shapes = merged.shapes.len(),
        tags = merged.tags.len(),
        "merged"
    );
    emit(args.output.as_deref(), &merged, ir::io_json::write_ir_json)
}

fn run_shapes(args: ShapesArgs) -> Result<(), AnnotrackError> {
    let ir = ir::io_json::read_ir_json(&args.input)?;
    let to_set = |frames: Option<Vec<u64>>| frames.map(|f| f.into_iter().collect::<BTreeSet<u64>>());

    let options = ir::ShapeViewOptions {
        end_frame: args.end_frame,
        included_frames: to_set(args.frames),
        include_outside: args.include_outside,
        use_server_track_ids: args.server_track_ids,
        deleted_frames: to_set(args.deleted_frames),
    };
    let shapes = ir.to_shapes(&options)?;
    info!(shapes = shapes.len(), "materialized");
    emit(args.output.as_deref(), shapes.as_slice(), ir::io_json::write_shapes_json)
}

fn run_tracks(args: TracksArgs) -> Result<(), AnnotrackError> {
    let ir = ir::io_json::read_ir_json(&args.input)?;
    let tracks = ir.to_tracks();
    emit(args.output.as_deref(), tracks.as_slice(), ir::io_json::write_tracks_json)
}

/// Writes `value` to `output`, or as pretty JSON to stdout.
fn emit<T>(
    output: Option<&Path>,
    value: &T,
    write: fn(&Path, &T) -> Result<(), AnnotrackError>,
) -> Result<(), AnnotrackError>
where
    T: serde::Serialize + ?Sized,
{
    match output {
        Some(path) => write(path, value),
        None => {
            let json = serde_json::to_string_pretty(value).map_err(|source| {
                AnnotrackError::IrJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", json);
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), AnnotrackError> {
    let ir = ir::io_json::read_ir_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
    };
    let report = validation::validate_ir(&ir, &opts);

    match args.output {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report.to_json_value()).map_err(
                |source| AnnotrackError::IrJsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                },
            )?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", report),
    }

    if report.passes(opts.strict) {
        Ok(())
    } else {
        Err(AnnotrackError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    }
}
