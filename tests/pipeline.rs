use std::fs;

use tempfile::tempdir;

use skill_scorecard::config::DashboardConfig;
use skill_scorecard::dashboard;
use skill_scorecard::data::catalog::{unique_channels, unique_models};
use skill_scorecard::data::filter::{filter_by_channel, filter_by_models};
use skill_scorecard::data::loader::load_file;
use skill_scorecard::data::normalize::normalize;
use skill_scorecard::prelude::*;
use skill_scorecard::series::build_ranking_series;

const SCORES: &str = "\
model,channel,lead_time,acc,rmse
pangu_6,z500,6.0,0.99,2.0
sfno,z500,6.0,0.995,1.0
graphcast,z500,6.0,0.997,1.0
pangu_6,z500,72.0,0.9,8.0
sfno,z500,72.0,0.92,6.0
graphcast,z500,72.0,0.93,6.0
pangu_6,t850,6.0,0.98,0.5
sfno,t850,6.0,0.985,0.6
graphcast,t850,168.0,0.7,2.0
";

fn load() -> RecordSet {
    let dir = tempdir().unwrap();
    let path = dir.path().join("medium-range.csv");
    fs::write(&path, SCORES).unwrap();
    load_file(&path).unwrap()
}

#[test]
fn catalog_is_sorted_and_complete() {
    let records = load();
    assert_eq!(unique_models(records.records()), vec!["graphcast", "pangu_6", "sfno"]);
    assert_eq!(unique_channels(records.records()), vec!["t850", "z500"]);
}

#[test]
fn normalizing_leaves_input_untouched() {
    let records = load();
    let before = records.clone();
    let n = normalize(records.records(), "pangu_6", "rmse").unwrap();
    assert_eq!(records, before);

    // graphcast at 168 h has no pangu_6 row
    assert_eq!(n.excluded_count(), 1);
    assert!(n.rows.iter().all(|r| r.score.is_finite()));
}

#[test]
fn selected_models_flow_through_every_view() {
    let records = load();
    let rows = filter_by_models(records.records(), &["sfno", "graphcast"]);
    let z500 = filter_by_channel(&rows, "z500");
    assert_eq!(z500.len(), 4);

    let ranking = build_ranking_series(&rows, "rmse", "z500", 6.0).unwrap();
    // tie at 1.0: sfno comes first in the file
    assert_eq!(ranking.models(), vec!["sfno", "graphcast"]);
}

#[test]
fn dashboard_from_config_file() {
    let dir = tempdir().unwrap();
    let cfg_path = dir.path().join("dashboard.toml");
    fs::write(
        &cfg_path,
        r#"
        [selection]
        scorecard_metric = "rmse"

        [scorecard]
        channels = ["z500", "t850"]
        lead_times_days = [0.25, 3]
        "#,
    )
    .unwrap();
    let cfg = DashboardConfig::load(&cfg_path).unwrap();

    let d = dashboard::build(&load(), &cfg.selection, &cfg.scorecard).unwrap();

    let sc = d.scorecard.as_ref().unwrap();
    assert_eq!(sc.facets, vec!["z500", "t850"]);
    assert_eq!(sc.y_categories, vec![0.25, 3.0]);
    let sfno_z500_3d = sc
        .cells
        .iter()
        .find(|c| c.x == "sfno" && c.facet == "z500" && c.y == 3.0)
        .unwrap();
    assert_eq!(sfno_z500_3d.value, -0.25);
    assert_eq!(d.scorecard_excluded, 1);

    assert_eq!(d.lead_time_charts.len(), 2);
    let ranking = d.ranking.as_ref().unwrap();
    assert_eq!(ranking.traces[0].text, vec!["pangu_6", "sfno", "graphcast"]);
    assert!(d.errors.is_empty());

    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(json["catalog"]["metrics"][1], "rmse");
}

#[test]
fn dashboard_without_ranking_metric_keeps_other_views() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("acc-only.csv");
    fs::write(
        &path,
        "model,channel,lead_time,acc\npangu_6,z500,6.0,0.99\nsfno,z500,6.0,0.995\n",
    )
    .unwrap();
    let records = load_file(&path).unwrap();

    let d = dashboard::build(&records, &Selection::default(), &Default::default()).unwrap();
    assert!(d.scorecard.is_some());
    assert_eq!(d.lead_time_charts.len(), 1);
    assert!(d.ranking.is_none());
    assert_eq!(d.errors.len(), 1);
    assert!(d.errors[0].message.contains("rmse"));
}

#[test]
fn empty_file_reports_no_data() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "model,channel,lead_time,rmse\n").unwrap();
    let records = load_file(&path).unwrap();

    let err = dashboard::build(&records, &Selection::default(), &Default::default()).unwrap_err();
    assert_eq!(err, ScoreError::EmptyInput);
    assert!(Catalog::from_records(records.records()).is_empty());
}
