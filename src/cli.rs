use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::generators::{DEFAULT_MAX_REPEAT, DEFAULT_MAX_VALUE, DEFAULT_MIN_VALUE};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Generate JSON test records with controlled per-field cardinality",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate records from a template
    Generate(GenerateArgs),
    /// Show the fields of a template and their distinct-value targets
    Inspect(InspectArgs),
    /// Store generated records as plain JSON in Parquet and report the sizes
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Template file describing the record layout ('-' for stdin)
    #[arg(short = 'e', long = "example")]
    pub example: PathBuf,
    /// Output file for generated records (stdout if omitted)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Number of records to generate
    #[arg(short = 'n', long = "count")]
    pub count: usize,
    /// Seed for reproducible output (timestamps excepted)
    #[arg(long)]
    pub seed: Option<u64>,
    /// Lower bound for int and float fields
    #[arg(long, default_value_t = DEFAULT_MIN_VALUE, allow_negative_numbers = true)]
    pub min: i64,
    /// Upper bound for int and float fields
    #[arg(long, default_value_t = DEFAULT_MAX_VALUE, allow_negative_numbers = true)]
    pub max: i64,
    /// Maximum repetitions for unbounded regex quantifiers in str patterns
    #[arg(long = "max-repeat", default_value_t = DEFAULT_MAX_REPEAT)]
    pub max_repeat: u32,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Template file describing the record layout ('-' for stdin)
    #[arg(short = 'e', long = "example")]
    pub example: PathBuf,
    /// Record count used to compute distinct-value targets
    #[arg(short = 'n', long = "count")]
    pub count: usize,
    /// Emit the field summary as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Newline-delimited JSON records, e.g. the output of `generate`
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// NDV ratio the records were generated with, recorded in the results
    #[arg(long)]
    pub ndv: f64,
    /// Parquet file to write (defaults to `<input stem>_plain_json.parquet`)
    #[arg(short = 'p', long = "parquet")]
    pub parquet: Option<PathBuf>,
    /// CSV results table to append to (stdout if omitted)
    #[arg(short = 'r', long = "results")]
    pub results: Option<PathBuf>,
}
