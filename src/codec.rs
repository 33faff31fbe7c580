//! Plain JSON records stored as a single Snappy-compressed Parquet column.
//!
//! Each record is parsed once on encode and re-serialized compactly, so the
//! column holds normalized JSON text.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result, anyhow};
use arrow_array::{Array, ArrayRef, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use parquet::{
    arrow::{ArrowWriter, arrow_reader::ParquetRecordBatchReaderBuilder},
    basic::Compression,
    file::properties::WriterProperties,
};
use serde_json::Value;

pub const PLAIN_JSON_FORMAT: &str = "plain_json";
const COLUMN_NAME: &str = "json";

/// Reads newline-delimited records, skipping blank lines.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("Opening records file {path:?}"))?;
    let mut lines = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Reading line {} of {path:?}", idx + 1))?;
        if !line.trim().is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlainJsonColumn {
    values: Vec<Value>,
}

impl PlainJsonColumn {
    pub fn encode<S: AsRef<str>>(records: &[S]) -> Result<Self> {
        let values = records
            .iter()
            .enumerate()
            .map(|(idx, record)| {
                serde_json::from_str(record.as_ref())
                    .with_context(|| format!("Parsing JSON record {}", idx + 1))
            })
            .collect::<Result<Vec<Value>>>()?;
        Ok(Self { values })
    }

    pub fn decode(&self) -> Vec<String> {
        self.values.iter().map(Value::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Writes the column to `path` and returns the size of the Parquet file.
    pub fn flush(&self, path: &Path) -> Result<u64> {
        let schema = Arc::new(Schema::new(vec![Field::new(
            COLUMN_NAME,
            DataType::Utf8,
            false,
        )]));
        let array = StringArray::from(self.decode());
        let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(array) as ArrayRef])
            .context("Building record batch")?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let file =
            File::create(path).with_context(|| format!("Creating Parquet file {path:?}"))?;
        let mut writer = ArrowWriter::try_new(file, schema, Some(props))
            .with_context(|| format!("Opening Parquet writer for {path:?}"))?;
        writer
            .write(&batch)
            .with_context(|| format!("Writing records to {path:?}"))?;
        writer
            .close()
            .with_context(|| format!("Finishing Parquet file {path:?}"))?;

        let metadata =
            std::fs::metadata(path).with_context(|| format!("Reading size of {path:?}"))?;
        Ok(metadata.len())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening Parquet file {path:?}"))?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)
            .with_context(|| format!("Reading Parquet metadata from {path:?}"))?
            .build()
            .with_context(|| format!("Opening Parquet reader for {path:?}"))?;

        let mut values = Vec::new();
        for batch in reader {
            let batch = batch.with_context(|| format!("Reading record batch from {path:?}"))?;
            let column = batch
                .column(0)
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("Column '{COLUMN_NAME}' in {path:?} is not a string column"))?;
            for idx in 0..column.len() {
                let value = serde_json::from_str(column.value(idx)).with_context(|| {
                    format!("Parsing JSON record {} from {path:?}", values.len() + 1)
                })?;
                values.push(value);
            }
        }
        Ok(Self { values })
    }
}
