//! Per-field value pools.
//!
//! Each pooled field gets `distinct_count(ratio, count)` generated values which
//! are replicated, topped up and shuffled so the pool holds exactly `count`
//! entries and every distinct value is used at least once.

use std::collections::HashSet;

use log::{debug, warn};
use rand::{Rng, seq::SliceRandom};

use crate::{
    error::GenerateError,
    generators::{DEFAULT_MAX_REPEAT, ValueGenerator, ValueRange},
    template::{FieldMarker, Template},
};

/// Base redraws allowed for one slot before a field is treated as exhausted.
const MAX_REDRAWS: usize = 32;

/// Run parameters passed explicitly to every pool builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateOptions {
    pub count: usize,
    pub range: ValueRange,
    pub max_repeat: u32,
}

impl GenerateOptions {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            range: ValueRange::default(),
            max_repeat: DEFAULT_MAX_REPEAT,
        }
    }

    pub fn with_range(mut self, range: ValueRange) -> Self {
        self.range = range;
        self
    }

    pub fn with_max_repeat(mut self, max_repeat: u32) -> Self {
        self.max_repeat = max_repeat;
        self
    }

    pub fn validate(&self) -> Result<(), GenerateError> {
        if self.count == 0 {
            return Err(GenerateError::configuration(
                "record count must be a positive integer",
            ));
        }
        self.range.validate()
    }
}

/// Number of distinct values a field with `ndv_ratio` gets across `count` records.
pub fn distinct_count(ndv_ratio: f64, count: usize) -> Result<usize, GenerateError> {
    if count == 0 {
        return Err(GenerateError::configuration(
            "record count must be a positive integer",
        ));
    }
    if !ndv_ratio.is_finite() || ndv_ratio < 0.0 {
        return Err(GenerateError::configuration(format!(
            "NDV ratio {ndv_ratio} must be a finite, non-negative number"
        )));
    }
    let distinct = if ndv_ratio == 1.0 {
        count
    } else {
        ((ndv_ratio * count as f64).floor() as usize).saturating_add(1)
    };
    if distinct > count {
        return Err(GenerateError::configuration(format!(
            "NDV ratio {ndv_ratio} requires {distinct} distinct values but only {count} record(s) were requested"
        )));
    }
    Ok(distinct)
}

/// Pools for every pooled field of a template, in template order.
#[derive(Debug, Clone)]
pub struct FieldPools {
    pools: Vec<Vec<String>>,
    count: usize,
}

impl FieldPools {
    /// Builds every pool up front. Sizes and patterns for all fields are
    /// checked before any value is generated.
    pub fn build<R: Rng>(
        template: &Template,
        options: &GenerateOptions,
        rng: &mut R,
    ) -> Result<Self, GenerateError> {
        options.validate()?;
        let plans = template
            .fields()
            .map(|marker| {
                let distinct = distinct_count(marker.ndv_ratio, options.count)?;
                let generator = ValueGenerator::for_field(marker, options.range, options.max_repeat)?;
                Ok((marker, distinct, generator))
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        let mut pools = Vec::with_capacity(plans.len());
        for (field_index, (marker, distinct, generator)) in plans.into_iter().enumerate() {
            debug!(
                "Building pool for field {} ({} ratio {}): {} distinct of {} value(s)",
                field_index + 1,
                marker.kind,
                marker.ndv_ratio,
                distinct,
                options.count
            );
            let values = generate_distinct(&generator, distinct, marker, rng);
            pools.push(expand_to_count(values, options.count, rng));
        }

        Ok(Self {
            pools,
            count: options.count,
        })
    }

    pub fn field_count(&self) -> usize {
        self.pools.len()
    }

    pub fn record_count(&self) -> usize {
        self.count
    }

    pub fn pool(&self, field: usize) -> &[String] {
        &self.pools[field]
    }

    pub fn value(&self, field: usize, index: usize) -> &str {
        &self.pools[field][index]
    }
}

/// Builds a single pool of exactly `options.count` values for `marker`.
pub fn build_pool<R: Rng>(
    marker: &FieldMarker,
    options: &GenerateOptions,
    rng: &mut R,
) -> Result<Vec<String>, GenerateError> {
    options.validate()?;
    let distinct = distinct_count(marker.ndv_ratio, options.count)?;
    let generator = ValueGenerator::for_field(marker, options.range, options.max_repeat)?;
    let values = generate_distinct(&generator, distinct, marker, rng);
    Ok(expand_to_count(values, options.count, rng))
}

/// Generates `distinct` values, redrawing repeats until the field's domain
/// runs out. After that, repeats are kept as drawn.
fn generate_distinct<R: Rng>(
    generator: &ValueGenerator,
    distinct: usize,
    marker: &FieldMarker,
    rng: &mut R,
) -> Vec<String> {
    let domain = generator.domain_size();
    let mut seen = HashSet::with_capacity(distinct);
    let mut values = Vec::with_capacity(distinct);
    let mut exhausted = false;

    while values.len() < distinct {
        let mut candidate = generator.generate(rng);
        if !exhausted {
            let budget = redraw_budget(domain, seen.len());
            let mut redraws = 0;
            while seen.contains(&candidate) && redraws < budget {
                candidate = generator.generate(rng);
                redraws += 1;
            }
            let fresh = seen.insert(candidate.clone());
            exhausted = !fresh || domain.is_some_and(|size| seen.len() as u64 >= size);
            if exhausted && values.len() + 1 < distinct {
                log_exhausted(marker, domain, distinct, seen.len(), distinct - values.len() - 1);
            }
        }
        values.push(candidate);
    }
    values
}

/// Redraws allowed for one slot before the field is treated as exhausted.
///
/// A known domain scales with how much of it is used up. An unknown domain
/// gets `MAX_REDRAWS` redraws per value already seen.
fn redraw_budget(domain: Option<u64>, seen: usize) -> usize {
    match domain {
        Some(size) => {
            let remaining = size.saturating_sub(seen as u64).max(1);
            let scale = usize::try_from(size / remaining).unwrap_or(usize::MAX);
            MAX_REDRAWS.saturating_mul(scale.saturating_add(1))
        }
        None => MAX_REDRAWS.saturating_mul(seen.saturating_add(1)),
    }
}

fn log_exhausted(
    marker: &FieldMarker,
    domain: Option<u64>,
    distinct: usize,
    seen: usize,
    remaining: usize,
) {
    if domain.is_some_and(|size| size < distinct as u64) {
        debug!(
            "Field '{}' (ratio {}) has only {} possible value(s); remaining {} value(s) repeat",
            marker.kind, marker.ndv_ratio, seen, remaining
        );
    } else {
        warn!(
            "Field '{}' (ratio {}) ran out of unique values after {}; remaining {} value(s) may repeat",
            marker.kind, marker.ndv_ratio, seen, remaining
        );
    }
}

/// Replicates and shuffles `distinct` into exactly `count` entries.
fn expand_to_count<R: Rng>(mut distinct: Vec<String>, count: usize, rng: &mut R) -> Vec<String> {
    debug_assert!(!distinct.is_empty() && distinct.len() <= count);
    if distinct.len() == count {
        distinct.shuffle(rng);
        return distinct;
    }
    let copies = count / distinct.len();
    let remainder = count % distinct.len();
    let mut pool = Vec::with_capacity(count);
    for _ in 0..copies {
        pool.extend(distinct.iter().cloned());
    }
    pool.extend(distinct.choose_multiple(rng, remainder).cloned());
    pool.shuffle(rng);
    pool
}
