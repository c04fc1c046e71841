use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use serde::Serialize;

use crate::color::DivergingScale;
use crate::config::DashboardConfig;
use crate::dashboard;
use crate::data::catalog::Catalog;
use crate::data::filter::filter_by_models;
use crate::data::loader::{load_file, read_csv};
use crate::data::model::{Record, RecordSet};
use crate::error::ScoreError;
use crate::plot::{bar_chart, heatmap, line_chart, AxisLabels};
use crate::scorecard::build_scorecard;
use crate::series::{build_lead_time_series, build_ranking_series};

#[derive(Parser, Debug)]
#[command(
    name = "skill-scorecard",
    version,
    about = "Compare forecast-model skill scores and emit plot-ready JSON"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List models, channels, metrics and lead times present in the input.
    Catalog(CommonArgs),
    /// Relative-skill heatmap against a baseline model.
    Scorecard(ScorecardArgs),
    /// Metric against lead time, one line per model.
    LeadTime(LeadTimeArgs),
    /// Models ranked by a metric at one lead time.
    Ranking(RankingArgs),
    /// All of the above for one selection.
    Dashboard(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Score table (.csv, .json, .parquet); `-` reads CSV from stdin.
    input: PathBuf,
    /// TOML file with [selection] and [scorecard] tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Comma-separated models to keep (default: all).
    #[arg(long, value_delimiter = ',')]
    models: Option<Vec<String>>,
    /// Channel for lead-time and ranking views.
    #[arg(long)]
    channel: Option<String>,
    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct ScorecardArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    baseline: Option<String>,
    #[arg(long)]
    metric: Option<String>,
}

#[derive(Args, Debug)]
struct LeadTimeArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Only this metric (default: every metric).
    #[arg(long)]
    metric: Option<String>,
}

#[derive(Args, Debug)]
struct RankingArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long)]
    metric: Option<String>,
    /// Lead time in hours, matched exactly.
    #[arg(long)]
    lead_time: Option<f64>,
}

#[derive(Serialize)]
struct NoData {
    status: &'static str,
}

impl Cli {
    pub fn dispatch(self) -> Result<()> {
        match self.command {
            Command::Catalog(args) => catalog(args),
            Command::Scorecard(args) => scorecard(args),
            Command::LeadTime(args) => lead_time(args),
            Command::Ranking(args) => ranking(args),
            Command::Dashboard(args) => full_dashboard(args),
        }
    }
}

/// Loaded input plus the effective configuration.
struct Session {
    records: RecordSet,
    config: DashboardConfig,
    pretty: bool,
}

impl Session {
    fn open(args: CommonArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => DashboardConfig::default(),
        };
        if let Some(models) = args.models {
            config.selection.models = Some(models);
        }
        if let Some(channel) = args.channel {
            config.selection.channel = channel;
        }

        let records = if args.input.as_os_str() == "-" {
            read_csv(csv::Reader::from_reader(std::io::stdin().lock()))
                .context("reading CSV from stdin")?
        } else {
            load_file(&args.input)?
        };

        Ok(Session {
            records,
            config,
            pretty: args.pretty,
        })
    }

    fn catalog(&self) -> Catalog {
        Catalog::from_record_set(&self.records)
    }

    fn selected_rows(&self) -> Vec<&Record> {
        let models = self.config.selection.resolved_models(&self.catalog());
        filter_by_models(self.records.records(), &models)
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if self.pretty {
            serde_json::to_writer_pretty(&mut out, value)?;
        } else {
            serde_json::to_writer(&mut out, value)?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Empty input is a state to report, not a failure.
    fn emit_no_data(&self) -> Result<()> {
        warn!("no data to show");
        self.emit(&NoData { status: "no_data" })
    }
}

fn catalog(args: CommonArgs) -> Result<()> {
    let ctx = Session::open(args)?;
    ctx.emit(&ctx.catalog())
}

fn scorecard(args: ScorecardArgs) -> Result<()> {
    let mut ctx = Session::open(args.common)?;
    if ctx.records.is_empty() {
        return ctx.emit_no_data();
    }
    if let Some(baseline) = args.baseline {
        ctx.config.selection.baseline = baseline;
    }
    let catalog = ctx.catalog();
    let selection = &ctx.config.selection;
    let Some(metric) = args
        .metric
        .or_else(|| selection.resolved_scorecard_metric(&catalog))
    else {
        return ctx.emit_no_data();
    };

    let rows = ctx.selected_rows();
    let sc = build_scorecard(&rows, &selection.baseline, &metric, &ctx.config.scorecard)?;
    ctx.emit(&heatmap(&sc, DivergingScale::default()))
}

fn lead_time(args: LeadTimeArgs) -> Result<()> {
    let ctx = Session::open(args.common)?;
    if ctx.records.is_empty() {
        return ctx.emit_no_data();
    }
    let metrics = match args.metric {
        Some(metric) => vec![metric],
        None => ctx.catalog().metrics,
    };
    let channel = &ctx.config.selection.channel;
    let rows = ctx.selected_rows();

    let charts = metrics
        .iter()
        .map(|metric| {
            let set = build_lead_time_series(&rows, metric, channel)?;
            Ok(line_chart(&set, AxisLabels::lead_time(metric, channel)))
        })
        .collect::<Result<Vec<_>, ScoreError>>()?;
    ctx.emit(&charts)
}

fn ranking(args: RankingArgs) -> Result<()> {
    let ctx = Session::open(args.common)?;
    if ctx.records.is_empty() {
        return ctx.emit_no_data();
    }
    let selection = &ctx.config.selection;
    let metric = args.metric.unwrap_or_else(|| selection.ranking_metric.clone());
    let lead_time = args.lead_time.unwrap_or(selection.ranking_lead_time);

    let rows = ctx.selected_rows();
    let ranking = build_ranking_series(&rows, &metric, &selection.channel, lead_time)?;
    ctx.emit(&bar_chart(&ranking, AxisLabels::ranking(&metric, &selection.channel)))
}

fn full_dashboard(args: CommonArgs) -> Result<()> {
    let ctx = Session::open(args)?;
    match dashboard::build(&ctx.records, &ctx.config.selection, &ctx.config.scorecard) {
        Ok(d) => ctx.emit(&d),
        Err(ScoreError::EmptyInput) => ctx.emit_no_data(),
        Err(e) => Err(e.into()),
    }
}
