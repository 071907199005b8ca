use crate::core::analysis::{self, AnalysisSettings};
use crate::core::{loader, report};
use crate::domain::model::{AnalysisReport, Dataset};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;

/// Extract: CSV via storage. Transform: per-category elasticity analysis.
/// Load: report files (and optional ZIP bundle) via storage.
pub struct ElasticityPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ElasticityPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ElasticityPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        tracing::debug!("Reading input from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        loader::parse_observations(
            &data,
            &self.config.columns(),
            self.config.non_positive_policy(),
        )
    }

    async fn transform(&self, data: Dataset) -> Result<AnalysisReport> {
        let settings = AnalysisSettings::from_config(&self.config);
        tracing::debug!("Analysis settings: {:?}", settings);
        analysis::analyze(&data, &settings).await
    }

    async fn load(&self, result: &AnalysisReport) -> Result<String> {
        let files = report::render(result, self.config.output_formats())?;

        for file in &files {
            tracing::debug!("Writing {} ({} bytes)", file.name, file.contents.len());
            self.storage.write_file(file.name, &file.contents).await?;
        }

        if let Some(bundle_name) = self.config.bundle_name() {
            let zip_data = report::bundle(&files)?;
            tracing::debug!("Writing ZIP bundle {} ({} bytes)", bundle_name, zip_data.len());
            self.storage.write_file(bundle_name, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), bundle_name));
        }

        Ok(self.config.output_path().to_string())
    }
}
