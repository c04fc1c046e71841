use std::borrow::Borrow;
use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use super::model::{LeadTime, Record};
use crate::error::ScoreError;

// ---------------------------------------------------------------------------
// BaselineIndex – the baseline model's metric per (lead_time, channel)
// ---------------------------------------------------------------------------

/// Baseline metric values keyed by lead time, then channel.
///
/// Built for exactly one `(baseline, metric)` pair. [`normalize`] builds a
/// fresh index on every call; an index is never reused across selections.
#[derive(Debug, Clone)]
pub struct BaselineIndex {
    values: HashMap<LeadTime, HashMap<String, f64>>,
    collisions: usize,
}

impl BaselineIndex {
    /// Scan `records` once, keeping rows of `baseline`. When several rows
    /// share a key the last one wins.
    pub fn build<R: Borrow<Record>>(
        records: &[R],
        baseline: &str,
        metric: &str,
    ) -> Result<Self, ScoreError> {
        let mut values: HashMap<LeadTime, HashMap<String, f64>> = HashMap::new();
        let mut collisions = 0;

        for (index, rec) in records.iter().enumerate() {
            let rec = rec.borrow();
            if rec.model != baseline {
                continue;
            }
            let value = rec.metric(metric, index)?;
            let previous = values
                .entry(rec.lead_time_key())
                .or_default()
                .insert(rec.channel.clone(), value);
            if previous.is_some() {
                collisions += 1;
                debug!(
                    "baseline `{baseline}` has several `{metric}` rows for {} h / {}; keeping the last",
                    rec.lead_time, rec.channel
                );
            }
        }

        Ok(BaselineIndex { values, collisions })
    }

    pub fn get(&self, lead_time: f64, channel: &str) -> Option<f64> {
        self.values
            .get(&LeadTime::new(lead_time))?
            .get(channel)
            .copied()
    }

    /// Number of baseline rows overwritten by a later row with the same key.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Number of distinct `(lead_time, channel)` keys.
    pub fn len(&self) -> usize {
        self.values.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Normalized output
// ---------------------------------------------------------------------------

/// A record together with its score relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedRow<'a> {
    pub record: &'a Record,
    pub score: f64,
}

/// Why a row has no relative score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    /// The baseline has no row at this (lead_time, channel).
    MissingBaseline,
    /// The baseline value is zero.
    ZeroBaseline,
    /// The ratio is NaN or infinite.
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludedRow {
    /// Position of the row in the normalizer's input.
    pub index: usize,
    pub reason: Exclusion,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<'a> {
    /// Scored rows, in input order.
    pub rows: Vec<DerivedRow<'a>>,
    pub excluded: Vec<ExcludedRow>,
    /// Baseline key collisions (see [`BaselineIndex::collisions`]).
    pub collisions: usize,
}

impl Normalized<'_> {
    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }
}

/// Score every row as `value / baseline_value - 1`, where the baseline value
/// is looked up at the row's own `(lead_time, channel)`.
///
/// Rows whose baseline is missing, zero, or yields a non-finite ratio are left
/// out and listed in [`Normalized::excluded`]. A row lacking `metric` aborts
/// the whole computation.
pub fn normalize<'a, R: Borrow<Record>>(
    records: &'a [R],
    baseline: &str,
    metric: &str,
) -> Result<Normalized<'a>, ScoreError> {
    let index = BaselineIndex::build(records, baseline, metric)?;

    let mut rows = Vec::with_capacity(records.len());
    let mut excluded = Vec::new();

    for (i, rec) in records.iter().enumerate() {
        let rec: &'a Record = rec.borrow();
        let value = rec.metric(metric, i)?;

        let reason = match index.get(rec.lead_time, &rec.channel) {
            None => Some(Exclusion::MissingBaseline),
            Some(base) if base == 0.0 => Some(Exclusion::ZeroBaseline),
            Some(base) => {
                let score = value / base - 1.0;
                if score.is_finite() {
                    rows.push(DerivedRow { record: rec, score });
                    None
                } else {
                    Some(Exclusion::NonFinite)
                }
            }
        };
        if let Some(reason) = reason {
            excluded.push(ExcludedRow { index: i, reason });
        }
    }

    if !records.is_empty() && index.is_empty() {
        warn!("baseline `{baseline}` has no `{metric}` rows; every row is excluded");
    } else if !excluded.is_empty() {
        debug!(
            "{} of {} rows have no `{metric}` baseline against `{baseline}`",
            excluded.len(),
            records.len()
        );
    }

    Ok(Normalized {
        rows,
        excluded,
        collisions: index.collisions(),
    })
}
