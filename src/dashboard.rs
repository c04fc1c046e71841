use log::{info, warn};
use serde::Serialize;

use crate::color::DivergingScale;
use crate::data::catalog::Catalog;
use crate::data::filter::filter_by_models;
use crate::data::model::RecordSet;
use crate::error::ScoreError;
use crate::plot::{bar_chart, heatmap, line_chart, AxisLabels, HeatmapInput, PlotInput};
use crate::scorecard::{build_scorecard, ScorecardLayout};
use crate::selection::Selection;
use crate::series::{build_lead_time_series, build_ranking_series};

/// Which part of the page a [`ViewError`] belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Scorecard,
    LeadTime { metric: String },
    Ranking,
}

/// A view that could not be computed. The rest of the page is unaffected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewError {
    #[serde(flatten)]
    pub view: View,
    pub message: String,
    pub error: ScoreError,
}

impl ViewError {
    fn new(view: View, error: ScoreError) -> Self {
        warn!("{view:?} view failed: {error}");
        ViewError {
            view,
            message: error.to_string(),
            error,
        }
    }
}

/// Every view of one page, ready to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub catalog: Catalog,
    /// Models actually shown.
    pub models: Vec<String>,
    /// `None` when the records carry no metric at all or the view failed.
    pub scorecard: Option<HeatmapInput>,
    /// Rows left off the scorecard for lack of a baseline value.
    pub scorecard_excluded: usize,
    /// One chart per metric that could be plotted, in catalog order.
    pub lead_time_charts: Vec<PlotInput>,
    pub ranking: Option<PlotInput>,
    /// Views left out because their computation failed.
    pub errors: Vec<ViewError>,
}

/// Build the scorecard, the lead-time charts and the ranking for `selection`.
///
/// An empty record set yields [`ScoreError::EmptyInput`], which callers treat
/// as "no data" rather than a failure. Any other error is confined to the view
/// that raised it and reported in [`Dashboard::errors`].
pub fn build(
    records: &RecordSet,
    selection: &Selection,
    layout: &ScorecardLayout,
) -> Result<Dashboard, ScoreError> {
    if records.is_empty() {
        return Err(ScoreError::EmptyInput);
    }

    let catalog = Catalog::from_record_set(records);
    let models = selection.resolved_models(&catalog);
    let rows = filter_by_models(records.records(), &models);
    if rows.is_empty() {
        warn!("selection {models:?} matches no records");
    }

    let mut errors = Vec::new();
    let mut scorecard_excluded = 0;
    let scorecard = match selection.resolved_scorecard_metric(&catalog) {
        Some(metric) => match build_scorecard(&rows, &selection.baseline, &metric, layout) {
            Ok(sc) => {
                scorecard_excluded = sc.excluded;
                Some(heatmap(&sc, DivergingScale::default()))
            }
            Err(e) => {
                errors.push(ViewError::new(View::Scorecard, e));
                None
            }
        },
        None => {
            warn!("records carry no metric columns; skipping the scorecard");
            None
        }
    };

    let mut lead_time_charts = Vec::with_capacity(catalog.metrics.len());
    for metric in &catalog.metrics {
        match build_lead_time_series(&rows, metric, &selection.channel) {
            Ok(set) => lead_time_charts.push(line_chart(
                &set,
                AxisLabels::lead_time(metric, &selection.channel),
            )),
            Err(e) => errors.push(ViewError::new(
                View::LeadTime {
                    metric: metric.clone(),
                },
                e,
            )),
        }
    }

    let ranking = match build_ranking_series(
        &rows,
        &selection.ranking_metric,
        &selection.channel,
        selection.ranking_lead_time,
    ) {
        Ok(ranking) => Some(bar_chart(
            &ranking,
            AxisLabels::ranking(&selection.ranking_metric, &selection.channel),
        )),
        Err(e) => {
            errors.push(ViewError::new(View::Ranking, e));
            None
        }
    };

    info!(
        "dashboard: {} of {} records, {} models, {} lead-time charts, {} scorecard rows excluded, {} failed views",
        rows.len(),
        records.len(),
        models.len(),
        lead_time_charts.len(),
        scorecard_excluded,
        errors.len()
    );

    Ok(Dashboard {
        catalog,
        models,
        scorecard,
        scorecard_excluded,
        lead_time_charts,
        ranking,
        errors,
    })
}
