use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use crate::color::ModelRegistry;
use crate::data::filter::filter_by_channel_indexed;
use crate::data::model::{LeadTime, Record};
use crate::error::ScoreError;

// ---------------------------------------------------------------------------
// Series types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// A named sequence of points, one per plotted line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub points: Vec<Point>,
}

/// Per-model series plus the registry that fixed their order and colours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    pub metric: String,
    pub channel: String,
    pub series: Vec<Series>,
    pub registry: ModelRegistry,
}

impl SeriesSet {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub model: String,
    pub value: f64,
}

/// Models ordered by descending metric value at one lead time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub metric: String,
    pub channel: String,
    /// Hours.
    pub lead_time: f64,
    pub entries: Vec<RankEntry>,
}

impl Ranking {
    pub fn models(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.model.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Lead-time series
// ---------------------------------------------------------------------------

/// One series per model (first-seen order) of `metric` against lead time on
/// `channel`. Points ascend in lead time; if a model has several rows at the
/// same lead time the last one wins.
pub fn build_lead_time_series<R: Borrow<Record>>(
    records: &[R],
    metric: &str,
    channel: &str,
) -> Result<SeriesSet, ScoreError> {
    let mut registry = ModelRegistry::default();
    let mut per_model: Vec<BTreeMap<LeadTime, f64>> = Vec::new();
    for (index, rec) in filter_by_channel_indexed(records, channel) {
        let value = rec.metric(metric, index)?;
        let slot = registry.register(&rec.model);
        if slot == per_model.len() {
            per_model.push(BTreeMap::new());
        }
        if per_model[slot].insert(rec.lead_time_key(), value).is_some() {
            debug!(
                "`{}` has several `{metric}` rows at {} h on {channel}; keeping the last",
                rec.model, rec.lead_time
            );
        }
    }

    let series = registry
        .models()
        .iter()
        .zip(per_model)
        .map(|(model, points)| Series {
            label: model.clone(),
            points: points
                .into_iter()
                .map(|(x, y)| Point { x: x.value(), y })
                .collect(),
        })
        .collect();

    Ok(SeriesSet {
        metric: metric.to_string(),
        channel: channel.to_string(),
        series,
        registry,
    })
}

// ---------------------------------------------------------------------------
// Fixed-lead-time ranking
// ---------------------------------------------------------------------------

/// Rank models by `metric` on `channel` at exactly `lead_time` hours.
///
/// Sorted by descending value whatever the metric's polarity; ties keep the
/// order in which models were first seen. Duplicate rows for a model keep the
/// last value. Non-finite values are left out.
pub fn build_ranking_series<R: Borrow<Record>>(
    records: &[R],
    metric: &str,
    channel: &str,
    lead_time: f64,
) -> Result<Ranking, ScoreError> {
    let key = LeadTime::new(lead_time);

    let mut entries: Vec<RankEntry> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for (index, rec) in filter_by_channel_indexed(records, channel) {
        if rec.lead_time_key() != key {
            continue;
        }
        let value = rec.metric(metric, index)?;
        match positions.get(rec.model.as_str()) {
            Some(&pos) => entries[pos].value = value,
            None => {
                positions.insert(rec.model.as_str(), entries.len());
                entries.push(RankEntry {
                    model: rec.model.clone(),
                    value,
                });
            }
        }
    }

    entries.retain(|e| {
        let keep = e.value.is_finite();
        if !keep {
            debug!("dropping `{}` from the {metric} ranking: value is {}", e.model, e.value);
        }
        keep
    });
    // stable: equal values (0.0 and -0.0 included) stay in first-seen order
    entries.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    Ok(Ranking {
        metric: metric.to_string(),
        channel: channel.to_string(),
        lead_time,
        entries,
    })
}
