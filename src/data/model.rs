use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Column names that identify a record rather than score it.
pub const RESERVED_FIELDS: [&str; 3] = ["model", "channel", "lead_time"];

// ---------------------------------------------------------------------------
// LeadTime – an exactly-compared forecast horizon usable as a map key
// ---------------------------------------------------------------------------

/// Forecast horizon wrapped so it can live in `BTreeMap` / `HashMap` keys.
///
/// Comparison is exact (`f64::total_cmp`), with `-0.0` folded into `0.0`.
/// There is no tolerance: callers must pass lead times encoded the same way
/// the records were ingested.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadTime(f64);

impl LeadTime {
    pub fn new(value: f64) -> Self {
        // -0.0 == 0.0 under IEEE but not under total_cmp
        if value == 0.0 {
            LeadTime(0.0)
        } else {
            LeadTime(value)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for LeadTime {
    fn from(value: f64) -> Self {
        LeadTime::new(value)
    }
}

// -- Manual Eq/Ord so we can put LeadTime in BTreeMap keys --

impl PartialEq for LeadTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for LeadTime {}

impl PartialOrd for LeadTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LeadTime {
    fn cmp(&self, other: &Self) -> Ordering {
        LeadTime::new(self.0).0.total_cmp(&LeadTime::new(other.0).0)
    }
}

impl std::hash::Hash for LeadTime {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        LeadTime::new(self.0).0.to_bits().hash(state);
    }
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unit a lead time is expressed in. Records always store hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadTimeUnit {
    #[default]
    Hours,
    Days,
}

impl LeadTimeUnit {
    /// Convert a lead time in hours into this unit.
    pub fn convert(self, hours: f64) -> f64 {
        match self {
            LeadTimeUnit::Hours => hours,
            LeadTimeUnit::Days => hours / 24.0,
        }
    }

    /// Axis label suffix used by the dashboards.
    pub fn short_label(self) -> &'static str {
        match self {
            LeadTimeUnit::Hours => "h",
            LeadTimeUnit::Days => "days",
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the score table
// ---------------------------------------------------------------------------

/// One row of the score table: a model's skill on a channel at a lead time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub model: String,
    pub channel: String,
    /// Forecast horizon in hours.
    pub lead_time: f64,
    /// Skill-score columns: metric_name → value.
    pub metrics: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(
        model: impl Into<String>,
        channel: impl Into<String>,
        lead_time: f64,
        metrics: impl IntoIterator<Item = (String, f64)>,
    ) -> Self {
        Record {
            model: model.into(),
            channel: channel.into(),
            lead_time,
            metrics: metrics.into_iter().collect(),
        }
    }

    pub fn lead_time_key(&self) -> LeadTime {
        LeadTime::new(self.lead_time)
    }

    /// Look up a metric value; `index` only feeds the error message.
    pub fn metric(&self, name: &str, index: usize) -> Result<f64, ScoreError> {
        self.metrics
            .get(name)
            .copied()
            .ok_or_else(|| ScoreError::UnknownMetric {
                metric: name.to_string(),
                model: self.model.clone(),
                index,
            })
    }
}

// ---------------------------------------------------------------------------
// RecordSet – the complete loaded table
// ---------------------------------------------------------------------------

/// The loaded score table. Never mutated after construction; every view is
/// derived from borrowed records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
    metric_columns: Vec<String>,
}

impl RecordSet {
    /// Metric columns are taken from the records in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut metric_columns: Vec<String> = Vec::new();
        for rec in &records {
            for name in rec.metrics.keys() {
                if !metric_columns.contains(name) {
                    metric_columns.push(name.clone());
                }
            }
        }
        RecordSet::with_metric_columns(records, metric_columns)
    }

    /// Records plus the metric columns of the source table, in column order.
    pub fn with_metric_columns(records: Vec<Record>, metric_columns: Vec<String>) -> Self {
        let metric_columns = metric_columns
            .into_iter()
            .filter(|name| !RESERVED_FIELDS.contains(&name.as_str()))
            .collect();
        RecordSet {
            records,
            metric_columns,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Metric names in source column order, whether or not every record has
    /// a value for them.
    pub fn metric_columns(&self) -> &[String] {
        &self.metric_columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) fn record(model: &str, channel: &str, lead_time: f64, metrics: &[(&str, f64)]) -> Record {
    Record::new(
        model,
        channel,
        lead_time,
        metrics.iter().map(|(k, v)| (k.to_string(), *v)),
    )
}
