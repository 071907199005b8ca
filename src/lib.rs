pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use app::pipelines::ElasticityPipeline;
pub use core::{
    classifier::Classifier,
    estimator::{estimate_all, estimate_group, fit_log_log},
    etl::{EtlEngine, RunOutcome},
    simulator::RevenueSimulator,
};
pub use domain::model::{
    AnalysisReport, CategoryGroup, DemandClass, ElasticityResult, Observation, RevenueScenario,
};
pub use utils::error::{ElasticityError, EstimationError, Result, SimulationError};
