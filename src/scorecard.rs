use std::borrow::Borrow;
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::data::catalog::unique_models;
use crate::data::filter::{filter_by_channels, filter_by_lead_times};
use crate::data::model::{LeadTime, LeadTimeUnit, Record};
use crate::data::normalize::normalize;
use crate::error::ScoreError;

/// Channels shown on the scorecard, top to bottom.
pub const DEFAULT_CHANNELS: [&str; 13] = [
    "z850", "t850", "r850", "z500", "t500", "r500", "z200", "t200", "r200", "tcwv", "t2m",
    "u10m", "v10m",
];

/// Lead times shown on the scorecard, in days.
pub const DEFAULT_LEAD_TIMES_DAYS: [f64; 4] = [0.25, 3.0, 7.0, 14.0];

/// Which channels and lead times the scorecard grid covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardLayout {
    pub channels: Vec<String>,
    pub lead_times_days: Vec<f64>,
}

impl Default for ScorecardLayout {
    fn default() -> Self {
        ScorecardLayout {
            channels: DEFAULT_CHANNELS.iter().map(|c| c.to_string()).collect(),
            lead_times_days: DEFAULT_LEAD_TIMES_DAYS.to_vec(),
        }
    }
}

/// One coloured square of the scorecard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCell {
    pub model: String,
    pub channel: String,
    pub lead_time_days: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scorecard {
    pub baseline: String,
    pub metric: String,
    /// Sorted model names that have at least one cell.
    pub models: Vec<String>,
    /// Channels with at least one cell, in layout order.
    pub channels: Vec<String>,
    /// Ascending, in days.
    pub lead_times_days: Vec<f64>,
    pub cells: Vec<ScoreCell>,
    /// Rows dropped for lack of a usable baseline value.
    pub excluded: usize,
}

impl Scorecard {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, model: &str, channel: &str, lead_time_days: f64) -> Option<&ScoreCell> {
        self.cells.iter().find(|c| {
            c.model == model
                && c.channel == channel
                && LeadTime::new(c.lead_time_days) == LeadTime::new(lead_time_days)
        })
    }
}

/// Relative skill of every model against `baseline` on `metric`.
///
/// Scores are computed on the full input first, then the scored rows go
/// through the channel and lead-time selectors (lead times converted to days).
/// The baseline is therefore looked up in hours, the allow-list is matched in
/// days.
pub fn build_scorecard<R: Borrow<Record>>(
    records: &[R],
    baseline: &str,
    metric: &str,
    layout: &ScorecardLayout,
) -> Result<Scorecard, ScoreError> {
    let normalized = normalize(records, baseline, metric)?;

    let scored: Vec<&Record> = normalized.rows.iter().map(|row| row.record).collect();
    let on_channels = filter_by_channels(&scored, &layout.channels);
    let on_grid: HashSet<*const Record> =
        filter_by_lead_times(&on_channels, &layout.lead_times_days, LeadTimeUnit::Days)
            .into_iter()
            .map(|r| r as *const Record)
            .collect();

    let cells: Vec<ScoreCell> = normalized
        .rows
        .iter()
        .filter(|row| on_grid.contains(&(row.record as *const Record)))
        .map(|row| ScoreCell {
            model: row.record.model.clone(),
            channel: row.record.channel.clone(),
            lead_time_days: LeadTimeUnit::Days.convert(row.record.lead_time),
            score: row.score,
        })
        .collect();

    let present_channels: BTreeSet<&str> = cells.iter().map(|c| c.channel.as_str()).collect();
    let channel_order = layout
        .channels
        .iter()
        .filter(|c| present_channels.contains(c.as_str()))
        .cloned()
        .collect();
    let lead_time_order = cells
        .iter()
        .map(|c| LeadTime::new(c.lead_time_days))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(LeadTime::value)
        .collect();
    let models = unique_models(&scored)
        .into_iter()
        .filter(|m| cells.iter().any(|c| &c.model == m))
        .collect();

    Ok(Scorecard {
        baseline: baseline.to_string(),
        metric: metric.to_string(),
        models,
        channels: channel_order,
        lead_times_days: lead_time_order,
        cells,
        excluded: normalized.excluded_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::record;

    fn layout(channels: &[&str], days: &[f64]) -> ScorecardLayout {
        ScorecardLayout {
            channels: channels.iter().map(|c| c.to_string()).collect(),
            lead_times_days: days.to_vec(),
        }
    }

    fn records() -> Vec<Record> {
        vec![
            record("pangu_6", "z500", 6.0, &[("rmse", 2.0)]),
            record("pangu_6", "z500", 72.0, &[("rmse", 4.0)]),
            record("pangu_6", "t850", 6.0, &[("rmse", 1.0)]),
            record("pangu_6", "z500", 12.0, &[("rmse", 3.0)]),
            record("sfno", "z500", 6.0, &[("rmse", 1.0)]),
            record("sfno", "z500", 72.0, &[("rmse", 5.0)]),
            record("sfno", "t850", 6.0, &[("rmse", 1.5)]),
            record("sfno", "z500", 12.0, &[("rmse", 3.3)]),
            record("sfno", "q700", 6.0, &[("rmse", 1.0)]),
        ]
    }

    #[test]
    fn cells_are_in_days_and_filtered_to_layout() {
        let sc = build_scorecard(
            &records(),
            "pangu_6",
            "rmse",
            &layout(&["t850", "z500"], &[0.25, 3.0]),
        )
        .unwrap();

        // 12 h (0.5 days) and q700 fall outside the grid
        assert_eq!(sc.cells.len(), 6);
        assert_eq!(sc.models, vec!["pangu_6", "sfno"]);
        assert_eq!(sc.channels, vec!["t850", "z500"]);
        assert_eq!(sc.lead_times_days, vec![0.25, 3.0]);

        assert_eq!(sc.cell("sfno", "z500", 0.25).unwrap().score, -0.5);
        assert_eq!(sc.cell("sfno", "z500", 3.0).unwrap().score, 0.25);
        assert_eq!(sc.cell("sfno", "t850", 0.25).unwrap().score, 0.5);
        assert_eq!(sc.cell("pangu_6", "z500", 3.0).unwrap().score, 0.0);
        // q700 has no baseline row at all
        assert_eq!(sc.excluded, 1);
    }

    #[test]
    fn grid_agrees_with_row_selectors() {
        let records = records();
        let grid = layout(&["z500", "q700"], &[0.25, 0.5]);
        let sc = build_scorecard(&records, "pangu_6", "rmse", &grid).unwrap();

        let on_channels = filter_by_channels(&records, &grid.channels);
        let selected =
            filter_by_lead_times(&on_channels, &grid.lead_times_days, LeadTimeUnit::Days);
        // q700 is selected but has no baseline, so it never reaches the grid
        let expected: Vec<(&str, &str, f64)> = selected
            .iter()
            .filter(|r| r.channel != "q700")
            .map(|r| (r.model.as_str(), r.channel.as_str(), r.lead_time / 24.0))
            .collect();
        let got: Vec<(&str, &str, f64)> = sc
            .cells
            .iter()
            .map(|c| (c.model.as_str(), c.channel.as_str(), c.lead_time_days))
            .collect();
        assert_eq!(got, expected);
        assert_eq!(sc.lead_times_days, vec![0.25, 0.5]);
    }

    #[test]
    fn default_layout_matches_dashboard() {
        let l = ScorecardLayout::default();
        assert_eq!(l.channels.len(), 13);
        assert_eq!(l.channels[3], "z500");
        assert_eq!(l.lead_times_days, vec![0.25, 3.0, 7.0, 14.0]);
    }

    #[test]
    fn missing_baseline_model_gives_empty_scorecard() {
        let sc =
            build_scorecard(&records(), "graphcast", "rmse", &ScorecardLayout::default()).unwrap();
        assert!(sc.is_empty());
        assert!(sc.models.is_empty());
        assert_eq!(sc.excluded, records().len());
    }

    #[test]
    fn unknown_metric_propagates() {
        let err = build_scorecard(&records(), "pangu_6", "acc", &ScorecardLayout::default())
            .unwrap_err();
        assert!(matches!(err, ScoreError::UnknownMetric { .. }));
    }
}
