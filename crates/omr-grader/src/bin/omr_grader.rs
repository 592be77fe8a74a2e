use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use omr_grader::{
    GradeRequest, GraderParams, LogObserver, MarkScheme, MarkingOutcome, OmrGrader,
    RecordedDetections,
};

use log::LevelFilter;
#[cfg(not(feature = "tracing"))]
use log::info;
#[cfg(feature = "tracing")]
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Build an answer key from a reference sheet.
    Scheme,
    /// Grade a student sheet against an answer key.
    Script,
}

/// Grade a bubble sheet from recorded detector output.
#[derive(Debug, Parser)]
#[command(name = "omr-grader", version)]
struct Args {
    /// JSON array of detection boxes in working-size pixel coordinates, either
    /// typed boxes or raw `{xyxy, class_id, confidence}` rows.
    #[arg(long)]
    detections: PathBuf,

    /// Number of questions on the test.
    #[arg(long)]
    questions: u32,

    #[arg(long, value_enum, default_value_t = Mode::Script)]
    mode: Mode,

    /// Answer key (required in script mode).
    #[arg(long)]
    scheme: Option<PathBuf>,

    /// Grader config JSON; defaults reproduce the reference sheet.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the outcome here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log geometry for every block.
    #[arg(long, short)]
    verbose: bool,

    /// Emit JSON log lines (tracing builds only).
    #[cfg(feature = "tracing")]
    #[arg(long)]
    json_logs: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = log_level(args.verbose);
    #[cfg(not(feature = "tracing"))]
    {
        if let Err(e) = omr_grader::core::init_with_level(level) {
            eprintln!("warning: logger already installed: {e}");
        }
    }
    #[cfg(feature = "tracing")]
    omr_grader::core::init_tracing(level, args.json_logs);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let params = match &args.config {
        Some(path) => GraderParams::load_json(path)?,
        None => GraderParams::default(),
    };
    let detections = RecordedDetections::load_json(&args.detections)?;
    info!(
        "loaded {} box(es) from {}",
        detections.boxes.len(),
        args.detections.display()
    );

    let boxes = detections.boxes.clone();
    let grader = OmrGrader::new(detections, params)?.with_observer(LogObserver);

    let outcome = match args.mode {
        Mode::Scheme => grader.grade_detections(&boxes, &GradeRequest::scheme(args.questions))?,
        Mode::Script => {
            let path = args
                .scheme
                .as_deref()
                .ok_or("--scheme is required in script mode")?;
            let scheme = MarkScheme::load_json(path)?;
            grader.grade_detections(&boxes, &GradeRequest::script(args.questions, &scheme))?
        }
    };

    write_outcome(args.output.as_deref(), &outcome)
}

fn write_outcome(
    path: Option<&Path>,
    outcome: &MarkingOutcome,
) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            outcome.write_json(path)?;
            info!("wrote outcome JSON to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(outcome)?),
    }
    Ok(())
}
