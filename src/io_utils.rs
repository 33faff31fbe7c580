//! Template input, record output and the results table.
//!
//! The `-` path convention routes through stdin/stdout.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn read_template(path: &Path) -> Result<String> {
    if is_dash(path) {
        let mut source = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut source)
            .context("Reading template from stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Reading template file {path:?}"))
    }
}

pub fn open_output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(BufWriter::new(io::stdout().lock())),
    };
    Ok(writer)
}

/// Opens the CSV results table for appending. Headers are only emitted when
/// the file is new or empty, or when writing to stdout.
pub fn open_results_writer(path: Option<&Path>) -> Result<csv::Writer<Box<dyn Write>>> {
    let (writer, has_headers): (Box<dyn Write>, bool) = match path {
        Some(p) if !is_dash(p) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .with_context(|| format!("Opening results file {p:?}"))?;
            let empty = file
                .metadata()
                .with_context(|| format!("Reading metadata of {p:?}"))?
                .len()
                == 0;
            (Box::new(BufWriter::new(file)), empty)
        }
        _ => (Box::new(io::stdout()), true),
    };

    let mut builder = csv::WriterBuilder::new();
    builder.has_headers(has_headers);
    Ok(builder.from_writer(writer))
}

pub fn describe_output(path: Option<&Path>) -> String {
    match path {
        Some(p) if !is_dash(p) => p.display().to_string(),
        _ => "stdout".to_string(),
    }
}
