use serde::Serialize;

use crate::color::{to_hex, DivergingScale, ModelRegistry};
use crate::data::model::LeadTimeUnit;
use crate::scorecard::Scorecard;
use crate::series::{Ranking, SeriesSet};

// ---------------------------------------------------------------------------
// Generic plot inputs handed to whatever draws the charts
// ---------------------------------------------------------------------------
//
// Nothing here filters, sorts or computes: the adapters only move data from
// the series types into shapes a plotting surface can consume.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabels {
    pub x: String,
    pub y: String,
}

impl AxisLabels {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        AxisLabels { x: x.into(), y: y.into() }
    }

    /// Lead time on x, `"{metric} of {channel}"` on y.
    pub fn lead_time(metric: &str, channel: &str) -> Self {
        AxisLabels::new(
            format!("Lead Time ({})", LeadTimeUnit::Hours.short_label()),
            format!("{metric} of {channel}"),
        )
    }

    /// Values on x, models on y (horizontal bars).
    pub fn ranking(metric: &str, channel: &str) -> Self {
        AxisLabels::new(format!("{metric} of {channel}"), "Model")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Lines,
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    pub kind: TraceKind,
    /// `#rrggbb`; `None` leaves the choice to the renderer.
    pub color: Option<String>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// Per-point category labels (bar charts).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub text: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotInput {
    pub title: String,
    pub axes: AxisLabels,
    pub traces: Vec<Trace>,
    /// Model colours in registry order; empty when traces are not per model.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub legend: Vec<LegendEntry>,
}

impl PlotInput {
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.x.is_empty())
    }
}

/// One line per series, coloured through the set's registry.
pub fn line_chart(set: &SeriesSet, axes: AxisLabels) -> PlotInput {
    PlotInput {
        title: set.metric.to_uppercase(),
        axes,
        traces: set
            .series
            .iter()
            .map(|s| Trace {
                name: s.label.clone(),
                kind: TraceKind::Lines,
                color: Some(series_color(&set.registry, &s.label)),
                x: s.points.iter().map(|p| p.x).collect(),
                y: s.points.iter().map(|p| p.y).collect(),
                text: Vec::new(),
            })
            .collect(),
        legend: set
            .registry
            .legend_entries()
            .into_iter()
            .map(|(name, color)| LegendEntry {
                name,
                color: to_hex(color),
            })
            .collect(),
    }
}

/// A single horizontal bar trace: values on x, model names as text, bars in
/// ranking order.
pub fn bar_chart(ranking: &Ranking, axes: AxisLabels) -> PlotInput {
    let title = format!(
        "{} at {} {}",
        ranking.metric.to_uppercase(),
        ranking.lead_time,
        if ranking.lead_time == 1.0 { "hour" } else { "hours" }
    );
    PlotInput {
        title,
        axes,
        traces: vec![Trace {
            name: ranking.metric.clone(),
            kind: TraceKind::HorizontalBar,
            color: None,
            x: ranking.entries.iter().map(|e| e.value).collect(),
            y: (0..ranking.entries.len()).map(|i| i as f64).collect(),
            text: ranking.entries.iter().map(|e| e.model.clone()).collect(),
        }],
        legend: Vec::new(),
    }
}

fn series_color(registry: &ModelRegistry, model: &str) -> String {
    to_hex(registry.color_for(model))
}

// ---------------------------------------------------------------------------
// Heatmap (scorecard)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    /// Model.
    pub x: String,
    /// Lead time in days.
    pub y: f64,
    /// Channel: one facet row per channel.
    pub facet: String,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapInput {
    pub title: String,
    pub axes: AxisLabels,
    pub x_categories: Vec<String>,
    pub y_categories: Vec<f64>,
    pub facets: Vec<String>,
    pub scale: DivergingScale,
    pub cells: Vec<HeatCell>,
}

impl HeatmapInput {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub fn heatmap(scorecard: &Scorecard, scale: DivergingScale) -> HeatmapInput {
    HeatmapInput {
        title: format!("{} relative to {}", scorecard.metric, scorecard.baseline),
        axes: AxisLabels::new("model", LeadTimeUnit::Days.short_label()),
        x_categories: scorecard.models.clone(),
        y_categories: scorecard.lead_times_days.clone(),
        facets: scorecard.channels.clone(),
        scale,
        cells: scorecard
            .cells
            .iter()
            .map(|c| HeatCell {
                x: c.model.clone(),
                y: c.lead_time_days,
                facet: c.channel.clone(),
                value: c.score,
                color: to_hex(scale.color_for(c.score)),
            })
            .collect(),
    }
}
