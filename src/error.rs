use serde::Serialize;
use thiserror::Error;

/// Failures of the scoring pipeline.
///
/// Rows without a usable baseline are not errors: they are reported as
/// [`crate::data::normalize::Exclusion`]s and dropped from the output.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreError {
    #[error("record set is empty")]
    EmptyInput,
    #[error("metric `{metric}` missing from record {index} (model `{model}`)")]
    UnknownMetric {
        metric: String,
        model: String,
        index: usize,
    },
}
