pub mod analysis;
pub mod classifier;
pub mod estimator;
pub mod etl;
pub mod grouping;
pub mod loader;
pub mod report;
pub mod simulator;
pub mod stats;
pub mod summary;

pub use crate::domain::model::{AnalysisReport, Dataset};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
