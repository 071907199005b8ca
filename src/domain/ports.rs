use crate::domain::model::{AnalysisReport, Dataset, NonPositivePolicy, RevenueConvention};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Column names used to map input headers onto observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub price: String,
    pub sales: String,
    pub category: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            price: "Item_MRP".to_string(),
            sales: "Item_Outlet_Sales".to_string(),
            category: "Item_Type".to_string(),
        }
    }
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn columns(&self) -> ColumnMapping;
    fn min_observations(&self) -> usize;
    fn non_positive_policy(&self) -> NonPositivePolicy;
    fn unit_tolerance(&self) -> f64;
    fn significance_level(&self) -> f64;
    fn price_changes(&self) -> &[f64];
    fn revenue_convention(&self) -> RevenueConvention;
    fn parallel(&self) -> bool;
    fn output_formats(&self) -> &[String];
    /// ZIP archive name when the report files should also be bundled.
    fn bundle_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<AnalysisReport>;
    async fn load(&self, report: &AnalysisReport) -> Result<String>;
}
