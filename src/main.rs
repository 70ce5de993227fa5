//! CLI entry point for the ground-truth toolkit.
//!
//! Provides commands for comparing ground-truth files, quantizing float
//! vector sets to int8, and exporting truth sets as CSV.

use clap::{
    Parser, Subcommand, ValueEnum,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::{Path, PathBuf};
use std::process;

use gtkit::error::{GtError, GtResult};
use gtkit::export::{ExportSummary, export_groundtruth_csv};
use gtkit::formats::GroundTruth;
use gtkit::io::{ExitCode, JsonResponse, OutputFormat};
use gtkit::overlap::{OverlapReport, compute_report};
use gtkit::quantize::{QuantizeParams, QuantizeSummary, quantize_file};
use tracing_subscriber::EnvFilter;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Ground-truth and binary vector file utilities
#[derive(Parser)]
#[command(
    name = "gtkit",
    version = env!("CARGO_PKG_VERSION"),
    about = "Ground-truth and binary vector file utilities for ANN evaluation",
    long_about = "Compare ranked neighbor lists, quantize float vector sets, and export truth sets.",
    styles = clap_cargo_style()
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Compare two ground-truth files
    #[command(
        about = "Report Overlap@at between two ground-truth files",
        long_about = "Compare two ranked neighbor lists per query and report overlap at each cut-off.",
        after_help = "Examples:\n  gtkit overlap exact_gt.bin ann_gt.bin 0 10 50\n  gtkit overlap exact_gt.bin ann_gt.bin 1\n  gtkit overlap exact_gt.bin ann_gt.bin 0 10 --json\n\nOverlap@K is always reported after the supplied cut-offs."
    )]
    Overlap {
        /// First (reference) ground-truth file
        gt_file1: PathBuf,

        /// Second (candidate) ground-truth file
        gt_file2: PathBuf,

        /// Count same-rank distance ties as matches
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        match_on_distance: u8,

        /// Cut-offs to report before the implicit Overlap@K
        #[arg(num_args = 0..)]
        at: Vec<usize>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Quantize a float vector file to int8
    #[command(
        about = "Rescale an f32 bin file into an i8 bin file",
        allow_negative_numbers = true,
        after_help = "Examples:\n  gtkit quantize base.fbin base.i8bin 0.0 2.0 0\n  gtkit quantize base.fbin base.i8bin -0.5 2.0 1\n\nEach value maps through (x - bias) * 254/scale, clipped to the i8 range.\nWith normalize=1 every row is L2-normalized first."
    )]
    Quantize {
        /// Input f32 bin file
        input: PathBuf,

        /// Output i8 bin file
        output: PathBuf,

        /// Value subtracted before scaling
        bias: f32,

        /// Spread of the input range; output is scaled by 254/scale
        scale: f32,

        /// L2-normalize each row before rescaling
        #[arg(value_parser = clap::value_parser!(u8).range(0..=1))]
        normalize: u8,
    },

    /// Export a ground truth with its vectors as CSV
    #[command(
        name = "export-csv",
        about = "Write a truth set and its vectors as qv:/v: CSV lines",
        after_help = "Examples:\n  gtkit export-csv float gt.bin base.fbin query.fbin truthset.csv\n  gtkit export-csv int8 gt.bin base.i8bin query.i8bin truthset.csv"
    )]
    ExportCsv {
        /// Element type of the base and query files
        #[arg(value_enum)]
        elem_type: ElemType,

        /// Ground-truth file
        gt_file: PathBuf,

        /// Base vector file
        base_file: PathBuf,

        /// Query vector file
        query_file: PathBuf,

        /// Output CSV file
        output: PathBuf,
    },
}

/// Element types the vector bin files can hold.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ElemType {
    Int8,
    Uint8,
    Float,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Overlap {
            gt_file1,
            gt_file2,
            match_on_distance,
            at,
            json,
        } => run_overlap(
            &gt_file1,
            &gt_file2,
            match_on_distance != 0,
            &at,
            OutputFormat::from_json_flag(json),
        ),
        Commands::Quantize {
            input,
            output,
            bias,
            scale,
            normalize,
        } => run_quantize(
            &input,
            &output,
            QuantizeParams {
                bias,
                scale,
                normalize: normalize != 0,
            },
        ),
        Commands::ExportCsv {
            elem_type,
            gt_file,
            base_file,
            query_file,
            output,
        } => run_export(elem_type, &gt_file, &base_file, &query_file, &output),
    };

    process::exit(code.into());
}

fn run_overlap(
    gt_file1: &Path,
    gt_file2: &Path,
    match_on_distance: bool,
    cutoffs: &[usize],
    format: OutputFormat,
) -> ExitCode {
    match try_overlap(gt_file1, gt_file2, match_on_distance, cutoffs) {
        Ok(report) => {
            if format.is_json() {
                let response = JsonResponse::success(&report);
                println!(
                    "{}",
                    serde_json::to_string_pretty(&response).expect("report serializes")
                );
            } else {
                for entry in &report.entries {
                    println!("Overlap@{}  {}", entry.at, entry.score);
                }
            }
            ExitCode::Success
        }
        Err(e) => fail(&e, format),
    }
}

fn try_overlap(
    gt_file1: &Path,
    gt_file2: &Path,
    match_on_distance: bool,
    cutoffs: &[usize],
) -> GtResult<OverlapReport> {
    let gt1 = GroundTruth::load(gt_file1)?;
    let gt2 = GroundTruth::load(gt_file2)?;
    compute_report(&gt1, &gt2, cutoffs, match_on_distance)
}

fn run_quantize(input: &Path, output: &Path, params: QuantizeParams) -> ExitCode {
    match quantize_file(input, output, params) {
        Ok(QuantizeSummary {
            npts,
            ndims,
            blocks,
        }) => {
            println!(
                "Quantized {npts} x {ndims} vectors into {blocks} block(s): {}",
                output.display()
            );
            ExitCode::Success
        }
        Err(e) => fail(&e, OutputFormat::Text),
    }
}

fn run_export(
    elem_type: ElemType,
    gt_file: &Path,
    base_file: &Path,
    query_file: &Path,
    output: &Path,
) -> ExitCode {
    let result = match elem_type {
        ElemType::Int8 => export_groundtruth_csv::<i8>(gt_file, base_file, query_file, output),
        ElemType::Uint8 => export_groundtruth_csv::<u8>(gt_file, base_file, query_file, output),
        ElemType::Float => export_groundtruth_csv::<f32>(gt_file, base_file, query_file, output),
    };

    match result {
        Ok(ExportSummary { nq, k, ndims }) => {
            println!(
                "Wrote truthset CSV for {nq} queries ({k} neighbors, {ndims} dims): {}",
                output.display()
            );
            ExitCode::Success
        }
        Err(e) => fail(&e, OutputFormat::Text),
    }
}

/// Prints one diagnostic to stderr and picks the exit code.
///
/// Failures never write to stdout, so scripts consuming results can treat
/// any stdout line as a result line.
fn fail(error: &GtError, format: OutputFormat) -> ExitCode {
    if format.is_json() {
        let response = JsonResponse::from_error(error);
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&response).expect("error envelope serializes")
        );
    } else {
        eprintln!("Error: {error}");
    }
    ExitCode::from_error(error)
}
