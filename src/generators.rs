//! Type-specific value generators.
//!
//! Every generator renders its value as the JSON text that is spliced into a
//! record: numbers and booleans bare, strings quoted and escaped.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::{
    error::GenerateError,
    template::{FieldKind, FieldMarker},
};

pub const DEFAULT_MIN_VALUE: i64 = 0;
pub const DEFAULT_MAX_VALUE: i64 = 1000;
pub const DEFAULT_MAX_REPEAT: u32 = 100;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Inclusive bounds shared by `int` and `float` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: i64,
    pub max: i64,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_VALUE,
            max: DEFAULT_MAX_VALUE,
        }
    }
}

impl ValueRange {
    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.min >= self.max {
            return Err(GenerateError::configuration(format!(
                "value range minimum {} must be below maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Generator bound to one field, with its pattern compiled up front.
pub enum ValueGenerator {
    Int(ValueRange),
    Float(ValueRange),
    Bool,
    Str(Box<rand_regex::Regex>),
}

impl ValueGenerator {
    pub fn for_field(
        marker: &FieldMarker,
        range: ValueRange,
        max_repeat: u32,
    ) -> Result<Self, GenerateError> {
        match marker.kind {
            FieldKind::Int => Ok(ValueGenerator::Int(range)),
            FieldKind::Float => Ok(ValueGenerator::Float(range)),
            FieldKind::Bool => Ok(ValueGenerator::Bool),
            FieldKind::Str => {
                let pattern = marker.pattern.as_deref().unwrap_or_default();
                compile_pattern(pattern, max_repeat).map(|regex| ValueGenerator::Str(Box::new(regex)))
            }
        }
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> String {
        match self {
            ValueGenerator::Int(range) => generate_int(rng, *range),
            ValueGenerator::Float(range) => generate_float(rng, *range),
            ValueGenerator::Bool => generate_bool(rng),
            ValueGenerator::Str(regex) => generate_str(rng, regex),
        }
    }

    /// Upper bound on distinct values when the domain is small enough to matter.
    pub fn domain_size(&self) -> Option<u64> {
        match self {
            ValueGenerator::Int(range) => Some(range.max.abs_diff(range.min).saturating_add(1)),
            ValueGenerator::Bool => Some(2),
            ValueGenerator::Float(_) | ValueGenerator::Str(_) => None,
        }
    }
}

pub fn compile_pattern(pattern: &str, max_repeat: u32) -> Result<rand_regex::Regex, GenerateError> {
    let regex = rand_regex::Regex::compile(pattern, max_repeat).map_err(|err| {
        GenerateError::Generation {
            pattern: pattern.to_string(),
            message: err.to_string(),
        }
    })?;
    if !regex.is_utf8() {
        return Err(GenerateError::Generation {
            pattern: pattern.to_string(),
            message: "pattern can produce non UTF-8 output".to_string(),
        });
    }
    Ok(regex)
}

pub fn generate_int<R: Rng>(rng: &mut R, range: ValueRange) -> String {
    rng.gen_range(range.min..=range.max).to_string()
}

pub fn generate_float<R: Rng>(rng: &mut R, range: ValueRange) -> String {
    let value: f64 = rng.gen_range(range.min as f64..range.max as f64);
    format_float(value)
}

pub fn generate_bool<R: Rng>(rng: &mut R) -> String {
    rng.gen_bool(0.5).to_string()
}

pub fn generate_str<R: Rng>(rng: &mut R, regex: &rand_regex::Regex) -> String {
    let mut value: String = rng.sample(regex);
    value.retain(|c| c != '\n' && c != '\r');
    quote_json(&value)
}

/// Current UTC instant as a quoted JSON string with microsecond precision.
pub fn generate_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    format!("\"{}\"", instant.format(TIMESTAMP_FORMAT))
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn quote_json(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
