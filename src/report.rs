//! Parquet size report for generated records.
//!
//! Encodes a records file as a plain JSON Parquet column, checks that it loads
//! back unchanged, and appends one row of size figures to a CSV results table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::info;
use serde::Serialize;

use crate::{
    cli::ReportArgs,
    codec::{self, PLAIN_JSON_FORMAT, PlainJsonColumn},
    io_utils,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub format: &'static str,
    pub ndv: f64,
    pub num_of_lines: usize,
    pub json_size: u64,
    pub parquet_file_size: u64,
    pub compressed_rate: f64,
}

impl ReportRow {
    /// `json_size` counts every record plus its newline.
    pub fn new<S: AsRef<str>>(ndv: f64, records: &[S], parquet_file_size: u64) -> Self {
        let json_size = records
            .iter()
            .map(|record| record.as_ref().len() as u64 + 1)
            .sum::<u64>();
        let compressed_rate = if parquet_file_size == 0 {
            0.0
        } else {
            round4(json_size as f64 / parquet_file_size as f64)
        };
        Self {
            format: PLAIN_JSON_FORMAT,
            ndv,
            num_of_lines: records.len(),
            json_size,
            parquet_file_size,
            compressed_rate,
        }
    }
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    let records = codec::read_lines(&args.input)?;
    if records.is_empty() {
        bail!("Records file {:?} contains no records", args.input);
    }
    let column = PlainJsonColumn::encode(&records)
        .with_context(|| format!("Encoding records from {:?}", args.input))?;

    let parquet_path = args
        .parquet
        .clone()
        .unwrap_or_else(|| default_parquet_path(&args.input));
    let parquet_file_size = column.flush(&parquet_path)?;
    let loaded = PlainJsonColumn::load(&parquet_path)?;
    if loaded != column {
        bail!(
            "Parquet file {:?} does not load back the {} encoded record(s)",
            parquet_path,
            column.len()
        );
    }

    let row = ReportRow::new(args.ndv, &records, parquet_file_size);
    write_row(args.results.as_deref(), &row)?;
    info!(
        "{} record(s) from {:?}: {} JSON byte(s) -> {} Parquet byte(s) in {:?} (ratio {})",
        row.num_of_lines,
        args.input,
        row.json_size,
        row.parquet_file_size,
        parquet_path,
        row.compressed_rate
    );
    Ok(())
}

/// `<stem>_plain_json.parquet` next to the records file.
pub fn default_parquet_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "records".to_string());
    input.with_file_name(format!("{stem}_{PLAIN_JSON_FORMAT}.parquet"))
}

/// Appends `row` to the results table, writing the header only into a new
/// or empty file.
pub fn write_row(path: Option<&Path>, row: &ReportRow) -> Result<()> {
    let mut writer = io_utils::open_results_writer(path)?;
    writer
        .serialize(row)
        .with_context(|| format!("Writing results to {}", io_utils::describe_output(path)))?;
    writer.flush().context("Flushing results")?;
    Ok(())
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
