use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "hvsweep contributors",
    version,
    about = "hvsweep - Parameter-sweep and record-duration sensitivity experiments for HVSR processing of ambient seismic noise.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a processing-parameter sweep over the first recording in a directory.
    Sweep(SweepArgs),
    /// Run a record-duration sweep for every recording in a directory.
    Duration(DurationArgs),
    /// Convert duration reports into relative errors against the longest duration.
    Mape(MapeArgs),
    /// Merge relative-error reports into one table with per-duration summaries.
    Merge(MergeArgs),
}

/// Options shared by the commands that drive the HVSR pipeline.
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Program that runs the HVSR pipeline, overriding `pipeline.program`.
    #[arg(short = 'p', long = "pipeline", value_name = "PROGRAM")]
    pub pipeline_program: Option<String>,

    /// Extra argument passed to the pipeline program. Can be used multiple times.
    #[arg(long = "pipeline-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub pipeline_args: Vec<String>,

    /// Decimal places for peak values in the report.
    #[arg(long, value_name = "INT")]
    pub precision: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S processing.smoothing-bandwidth=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `sweep` subcommand.
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Directory holding the E/N/Z channel files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Path of the CSV report to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Keep only the last SECONDS of the recording before sweeping.
    #[arg(long, value_name = "SECONDS")]
    pub baseline_trim: Option<f64>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Arguments for the `duration` subcommand.
#[derive(Args, Debug)]
pub struct DurationArgs {
    /// Directory holding the E/N/Z channel files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory that receives one `<prefix>_hvsr_peaks.csv` per recording.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Arguments for the `mape` subcommand.
#[derive(Args, Debug)]
pub struct MapeArgs {
    /// Directory holding duration reports.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory that receives the relative-error reports.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output: PathBuf,
}

/// Arguments for the `merge` subcommand.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Directory holding relative-error reports.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Path of the merged CSV; the summary is written beside it.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}
