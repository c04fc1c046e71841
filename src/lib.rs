pub mod cli;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod plot;
pub mod scorecard;
pub mod selection;
pub mod series;

pub mod prelude {
    pub use crate::data::catalog::Catalog;
    pub use crate::data::model::{Record, RecordSet};
    pub use crate::error::ScoreError;
    pub use crate::selection::Selection;
}
