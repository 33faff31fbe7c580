//! Field summary for a template.
//!
//! Lists each pooled field with the distinct-value target the pool builder
//! would use for a given record count, as an aligned table or JSON.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    cli::InspectArgs,
    error::GenerateError,
    io_utils,
    pool::distinct_count,
    template::{FieldKind, Template},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: usize,
    pub kind: FieldKind,
    pub ndv_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub distinct: usize,
    pub records: usize,
}

pub fn execute(args: &InspectArgs) -> Result<()> {
    let source = io_utils::read_template(&args.example)?;
    let template = source
        .parse::<Template>()
        .with_context(|| format!("Parsing template {:?}", args.example))?;
    let summaries = summarize(&template, args.count)
        .with_context(|| format!("Checking field ratios in {:?}", args.example))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print!("{}", render_summary(&summaries));
    }
    info!(
        "Template {:?} defines {} pooled field(s) and {} timestamp(s)",
        args.example,
        summaries.len(),
        template.timestamp_count()
    );
    Ok(())
}

pub fn summarize(template: &Template, count: usize) -> Result<Vec<FieldSummary>, GenerateError> {
    template
        .fields()
        .enumerate()
        .map(|(idx, marker)| {
            Ok(FieldSummary {
                field: idx + 1,
                kind: marker.kind,
                ndv_ratio: marker.ndv_ratio,
                pattern: marker.pattern.clone(),
                distinct: distinct_count(marker.ndv_ratio, count)?,
                records: count,
            })
        })
        .collect()
}

pub fn render_summary(summaries: &[FieldSummary]) -> String {
    let headers = ["#", "type", "ratio", "distinct", "records", "pattern"].map(String::from);
    let rows = summaries
        .iter()
        .map(|summary| {
            [
                summary.field.to_string(),
                summary.kind.to_string(),
                summary.ndv_ratio.to_string(),
                summary.distinct.to_string(),
                summary.records.to_string(),
                summary.pattern.clone().unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();

    let mut widths = headers.each_ref().map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    output.push_str(&format_line(&headers, &widths));
    output.push_str(&format_line(&widths.map(|w| "-".repeat(w)), &widths));
    for row in &rows {
        output.push_str(&format_line(row, &widths));
    }
    output
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    format!("{}\n", line.trim_end())
}
