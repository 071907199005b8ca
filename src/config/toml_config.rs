use crate::core::analysis::{DEFAULT_MIN_OBSERVATIONS, DEFAULT_PRICE_CHANGES, DEFAULT_SIGNIFICANCE_LEVEL};
use crate::core::estimator::MIN_FIT_OBSERVATIONS;
use crate::core::ConfigProvider;
use crate::domain::model::{NonPositivePolicy, RevenueConvention};
use crate::domain::ports::ColumnMapping;
use crate::utils::error::{ElasticityError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub analysis: AnalysisInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub estimation: EstimationConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub input_path: Option<String>,
    pub price_column: Option<String>,
    pub sales_column: Option<String>,
    pub category_column: Option<String>,
    pub non_positive_policy: Option<NonPositivePolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstimationConfig {
    pub min_observations: Option<usize>,
    pub unit_tolerance: Option<f64>,
    pub significance_level: Option<f64>,
    pub parallel: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub price_changes: Option<Vec<f64>>,
    pub convention: Option<RevenueConvention>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
    pub system_stats: Option<bool>,
}

fn env_var_pattern() -> &'static regex::Regex {
    static PATTERN: OnceLock<regex::Regex> = OnceLock::new();
    PATTERN.get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ElasticityError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ElasticityError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let input = validation::validate_required_field("source.input_path", &self.source.input_path)?;
        validation::validate_path("source.input_path", input)?;
        validation::validate_file_extension("source.input_path", input, &["csv"])?;

        let columns = self.columns();
        validation::validate_non_empty_string("source.price_column", &columns.price)?;
        validation::validate_non_empty_string("source.sales_column", &columns.sales)?;
        validation::validate_non_empty_string("source.category_column", &columns.category)?;

        validation::validate_positive_number(
            "estimation.min_observations",
            self.min_observations(),
            MIN_FIT_OBSERVATIONS,
        )?;
        validation::validate_range("estimation.unit_tolerance", self.unit_tolerance(), 0.0, 1.0)?;
        validation::validate_range(
            "estimation.significance_level",
            self.significance_level(),
            0.0,
            1.0,
        )?;
        validation::validate_price_changes("simulation.price_changes", self.price_changes())?;

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;
        if let Some(bundle) = self.bundle_name() {
            validation::validate_file_extension("load.compression.filename", bundle, &["zip"])?;
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring
            .as_ref()
            .map(|m| m.enabled && m.system_stats.unwrap_or(true))
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        self.source.input_path.as_deref().unwrap_or_default()
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn columns(&self) -> ColumnMapping {
        let defaults = ColumnMapping::default();
        ColumnMapping {
            price: self.source.price_column.clone().unwrap_or(defaults.price),
            sales: self.source.sales_column.clone().unwrap_or(defaults.sales),
            category: self.source.category_column.clone().unwrap_or(defaults.category),
        }
    }

    fn min_observations(&self) -> usize {
        self.estimation.min_observations.unwrap_or(DEFAULT_MIN_OBSERVATIONS)
    }

    fn non_positive_policy(&self) -> NonPositivePolicy {
        self.source.non_positive_policy.unwrap_or_default()
    }

    fn unit_tolerance(&self) -> f64 {
        self.estimation.unit_tolerance.unwrap_or(0.0)
    }

    fn significance_level(&self) -> f64 {
        self.estimation
            .significance_level
            .unwrap_or(DEFAULT_SIGNIFICANCE_LEVEL)
    }

    fn price_changes(&self) -> &[f64] {
        self.simulation
            .price_changes
            .as_deref()
            .unwrap_or(DEFAULT_PRICE_CHANGES)
    }

    fn revenue_convention(&self) -> RevenueConvention {
        self.simulation.convention.unwrap_or_default()
    }

    fn parallel(&self) -> bool {
        self.estimation.parallel.unwrap_or(false)
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
