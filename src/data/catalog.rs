use std::borrow::Borrow;
use std::collections::BTreeSet;

use serde::Serialize;

use super::model::{LeadTime, Record, RecordSet, RESERVED_FIELDS};

// ---------------------------------------------------------------------------
// Distinct identifiers present in a record set
// ---------------------------------------------------------------------------

/// Sorted, duplicate-free model names.
pub fn unique_models<R: Borrow<Record>>(records: &[R]) -> Vec<String> {
    sorted_unique(records.iter().map(|r| r.borrow().model.as_str()))
}

/// Sorted, duplicate-free channel names.
pub fn unique_channels<R: Borrow<Record>>(records: &[R]) -> Vec<String> {
    sorted_unique(records.iter().map(|r| r.borrow().channel.as_str()))
}

/// Distinct lead times in ascending order (hours).
pub fn unique_lead_times<R: Borrow<Record>>(records: &[R]) -> Vec<f64> {
    records
        .iter()
        .map(|r| r.borrow().lead_time_key())
        .collect::<BTreeSet<LeadTime>>()
        .into_iter()
        .map(LeadTime::value)
        .collect()
}

/// Metric names carried by `sample`, excluding the identifying columns.
///
/// A record without metrics yields an empty list.
pub fn metric_names(sample: &Record) -> Vec<String> {
    sample
        .metrics
        .keys()
        .filter(|name| !RESERVED_FIELDS.contains(&name.as_str()))
        .cloned()
        .collect()
}

fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Catalog – everything a selection UI needs to offer choices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub models: Vec<String>,
    pub channels: Vec<String>,
    /// Source column order for a whole [`RecordSet`], otherwise the keys of
    /// the first record.
    pub metrics: Vec<String>,
    pub lead_times: Vec<f64>,
}

impl Catalog {
    pub fn from_records<R: Borrow<Record>>(records: &[R]) -> Self {
        Catalog {
            models: unique_models(records),
            channels: unique_channels(records),
            metrics: records
                .first()
                .map(|r| metric_names(r.borrow()))
                .unwrap_or_default(),
            lead_times: unique_lead_times(records),
        }
    }

    /// Catalog of a loaded table. Metrics follow the table's column order and
    /// include columns left empty in the first row.
    pub fn from_record_set(set: &RecordSet) -> Self {
        let mut catalog = Catalog::from_records(set.records());
        if !set.is_empty() {
            catalog.metrics = set.metric_columns().to_vec();
        }
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    fn sample() -> Vec<Record> {
        vec![
            record("sfno", "z500", 24.0, &[("rmse", 1.0), ("acc", 0.9)]),
            record("pangu_6", "t850", 6.0, &[("rmse", 2.0), ("acc", 0.8)]),
            record("sfno", "t850", 6.0, &[("rmse", 1.5), ("acc", 0.7)]),
            record("graphcast", "z500", 24.0, &[("rmse", 1.2), ("acc", 0.85)]),
        ]
    }

    #[test]
    fn models_and_channels_are_sorted_and_unique() {
        let records = sample();
        assert_eq!(unique_models(&records), vec!["graphcast", "pangu_6", "sfno"]);
        assert_eq!(unique_channels(&records), vec!["t850", "z500"]);
    }

    #[test]
    fn lead_times_are_ascending_and_unique() {
        assert_eq!(unique_lead_times(&sample()), vec![6.0, 24.0]);
    }

    #[test]
    fn metric_names_skip_reserved_fields() {
        let mut r = record("sfno", "z500", 6.0, &[("rmse", 1.0), ("acc", 0.9)]);
        r.metrics.insert("lead_time".into(), 6.0);
        assert_eq!(metric_names(&r), vec!["acc", "rmse"]);
    }

    #[test]
    fn metric_names_of_bare_record_is_empty() {
        let r = record("sfno", "z500", 6.0, &[]);
        assert!(metric_names(&r).is_empty());
    }

    #[test]
    fn catalog_of_empty_input_is_empty() {
        let records: Vec<Record> = Vec::new();
        let catalog = Catalog::from_records(&records);
        assert!(catalog.is_empty());
        assert!(catalog.metrics.is_empty());
    }

    #[test]
    fn record_set_catalog_uses_column_order() {
        let set = RecordSet::with_metric_columns(
            vec![
                record("sfno", "z500", 6.0, &[("rmse", 1.0)]),
                record("fcn", "z500", 6.0, &[("rmse", 2.0), ("acc", 0.9)]),
            ],
            vec!["rmse".into(), "acc".into()],
        );
        let catalog = Catalog::from_record_set(&set);
        assert_eq!(catalog.metrics, vec!["rmse", "acc"]);
        assert_eq!(catalog.models, vec!["fcn", "sfno"]);
    }

    #[test]
    fn catalog_works_on_filtered_views() {
        let records = sample();
        let view: Vec<&Record> = records.iter().filter(|r| r.channel == "z500").collect();
        let catalog = Catalog::from_records(&view);
        assert_eq!(catalog.models, vec!["graphcast", "sfno"]);
        assert_eq!(catalog.channels, vec!["z500"]);
        assert_eq!(catalog.metrics, vec!["acc", "rmse"]);
    }
}
