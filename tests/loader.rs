use std::fs;
use std::sync::Arc;

use arrow::array::{Float32Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use tempfile::tempdir;

use skill_scorecard::data::catalog::Catalog;
use skill_scorecard::data::loader::{load_file, parse_json, read_csv};

const CSV: &str = "\
model,channel,lead_time,acc,rmse
pangu_6,z500,6.0,0.99,20.5
sfno,z500,6.0,0.995,18.0
sfno,t850,12.0,,0.7
";

#[test]
fn csv_rows_become_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.csv");
    fs::write(&path, CSV).unwrap();

    let records = load_file(&path).unwrap();
    assert_eq!(records.len(), 3);

    let first = &records.records()[0];
    assert_eq!(first.model, "pangu_6");
    assert_eq!(first.channel, "z500");
    assert_eq!(first.lead_time, 6.0);
    assert_eq!(first.metrics["rmse"], 20.5);
    assert_eq!(first.metrics.len(), 2);

    // empty acc cell: metric absent, not zero
    let last = &records.records()[2];
    assert!(!last.metrics.contains_key("acc"));
    assert_eq!(last.metrics["rmse"], 0.7);
}

#[test]
fn csv_metric_columns_keep_header_order() {
    let reader = csv::Reader::from_reader(
        "model,channel,lead_time,rmse,acc,bias\nsfno,z500,6.0,1.5,,0.1\n".as_bytes(),
    );
    let records = read_csv(reader).unwrap();
    assert_eq!(records.metric_columns(), ["rmse", "acc", "bias"]);

    // acc is empty in the first row but still offered
    let catalog = Catalog::from_record_set(&records);
    assert_eq!(catalog.metrics, vec!["rmse", "acc", "bias"]);
}

#[test]
fn csv_without_lead_time_column_fails() {
    let reader = csv::Reader::from_reader("model,channel,rmse\na,z500,1\n".as_bytes());
    let err = read_csv(reader).unwrap_err();
    assert!(format!("{err:#}").contains("lead_time"));
}

#[test]
fn csv_non_numeric_metric_fails() {
    let reader =
        csv::Reader::from_reader("model,channel,lead_time,rmse\na,z500,6,high\n".as_bytes());
    let err = read_csv(reader).unwrap_err();
    assert!(format!("{err:#}").contains("rmse"));
}

#[test]
fn csv_with_header_only_is_empty() {
    let reader = csv::Reader::from_reader("model,channel,lead_time,rmse\n".as_bytes());
    assert!(read_csv(reader).unwrap().is_empty());
}

#[test]
fn json_accepts_numbers_and_numeric_strings() {
    let records = parse_json(
        r#"[
            {"model": "sfno", "channel": "z500", "lead_time": 6, "rmse": 1.5, "acc": null},
            {"model": "fcn", "channel": "t850", "lead_time": "12.0", "rmse": "2.5"}
        ]"#,
    )
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records.records()[0].lead_time, 6.0);
    assert!(!records.records()[0].metrics.contains_key("acc"));
    assert_eq!(records.records()[1].lead_time, 12.0);
    assert_eq!(records.records()[1].metrics["rmse"], 2.5);
    assert_eq!(records.metric_columns(), ["rmse", "acc"]);
}

#[test]
fn json_missing_model_fails() {
    let err = parse_json(r#"[{"channel": "z500", "lead_time": 6}]"#).unwrap_err();
    assert!(format!("{err:#}").contains("model"));
}

#[test]
fn parquet_numeric_columns_are_widened() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("model", DataType::Utf8, false),
        Field::new("channel", DataType::Utf8, false),
        Field::new("lead_time", DataType::Int64, false),
        Field::new("rmse", DataType::Float32, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec!["pangu_6", "sfno"])),
            Arc::new(StringArray::from(vec!["z500", "z500"])),
            Arc::new(Int64Array::from(vec![6, 6])),
            Arc::new(Float32Array::from(vec![Some(2.0), None])),
        ],
    )
    .unwrap();
    let file = fs::File::create(&path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let records = load_file(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records.records()[0].lead_time, 6.0);
    assert_eq!(records.records()[0].metrics["rmse"], 2.0);
    assert!(records.records()[1].metrics.is_empty());
    assert_eq!(records.metric_columns(), ["rmse"]);
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.xlsx");
    fs::write(&path, "").unwrap();
    let err = load_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("Unsupported file extension"));
}
