use serde::{Deserialize, Serialize};

use crate::data::catalog::Catalog;

// ---------------------------------------------------------------------------
// Selection parameters
// ---------------------------------------------------------------------------

/// Everything a viewer can pick, independent of rendering.
///
/// A plain value owned by the caller: the pipeline reads it and keeps nothing
/// once a view is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    /// Reference model for the scorecard.
    pub baseline: String,
    /// Metric scored on the scorecard; `None` picks the first metric present.
    pub scorecard_metric: Option<String>,
    /// Channel shown by the lead-time and ranking charts.
    pub channel: String,
    /// `None` shows every model; `Some` shows exactly these (possibly none).
    pub models: Option<Vec<String>>,
    pub ranking_metric: String,
    /// Hours, matched exactly.
    pub ranking_lead_time: f64,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            baseline: "pangu_6".to_string(),
            scorecard_metric: None,
            channel: "z500".to_string(),
            models: None,
            ranking_metric: "rmse".to_string(),
            ranking_lead_time: 6.0,
        }
    }
}

impl Selection {
    /// Models to show, given what the data offers.
    pub fn resolved_models(&self, catalog: &Catalog) -> Vec<String> {
        match &self.models {
            None => catalog.models.clone(),
            Some(models) => models.clone(),
        }
    }

    /// Metric for the scorecard, given what the data offers.
    pub fn resolved_scorecard_metric(&self, catalog: &Catalog) -> Option<String> {
        self.scorecard_metric
            .clone()
            .or_else(|| catalog.metrics.first().cloned())
    }

    /// Toggle a single model in the selection.
    pub fn toggle_model(&mut self, catalog: &Catalog, model: &str) {
        let mut selected = self.resolved_models(catalog);
        match selected.iter().position(|m| m == model) {
            Some(pos) => {
                selected.remove(pos);
            }
            None => selected.push(model.to_string()),
        }
        self.models = Some(selected);
    }

    /// Select every model.
    pub fn select_all_models(&mut self) {
        self.models = None;
    }

    /// Deselect every model.
    pub fn select_no_models(&mut self) {
        self.models = Some(Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog {
            models: vec!["graphcast".into(), "pangu_6".into(), "sfno".into()],
            channels: vec!["z500".into()],
            metrics: vec!["acc".into(), "rmse".into()],
            lead_times: vec![6.0],
        }
    }

    #[test]
    fn defaults_follow_the_dashboard() {
        let s = Selection::default();
        assert_eq!(s.baseline, "pangu_6");
        assert_eq!(s.channel, "z500");
        assert_eq!(s.ranking_metric, "rmse");
        assert_eq!(s.ranking_lead_time, 6.0);
        assert_eq!(s.resolved_models(&catalog()).len(), 3);
        assert_eq!(s.resolved_scorecard_metric(&catalog()).as_deref(), Some("acc"));
    }

    #[test]
    fn toggling_removes_then_restores() {
        let cat = catalog();
        let mut s = Selection::default();
        s.toggle_model(&cat, "pangu_6");
        assert_eq!(s.resolved_models(&cat), vec!["graphcast", "sfno"]);
        s.toggle_model(&cat, "pangu_6");
        assert_eq!(s.resolved_models(&cat), vec!["graphcast", "sfno", "pangu_6"]);
    }

    #[test]
    fn select_none_is_not_select_all() {
        let cat = catalog();
        let mut s = Selection::default();
        s.select_no_models();
        assert!(s.resolved_models(&cat).is_empty());
        s.select_all_models();
        assert_eq!(s.resolved_models(&cat), cat.models);
    }

    #[test]
    fn explicit_metric_wins() {
        let s = Selection {
            scorecard_metric: Some("rmse".into()),
            ..Selection::default()
        };
        assert_eq!(s.resolved_scorecard_metric(&catalog()).as_deref(), Some("rmse"));
    }
}
