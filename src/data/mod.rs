/// Data layer: core types, loading, selection and baseline normalization.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordSet
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ RecordSet │  Vec<Record>, never mutated
///   └──────────┘
///        │
///        ├──────────────► catalog    distinct models / channels / metrics
///        ▼
///   ┌──────────┐
///   │  filter   │  models, channel, lead times → borrowed rows
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  score = value / baseline(lead_time, channel) - 1
///   └───────────┘
/// ```

pub mod catalog;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
