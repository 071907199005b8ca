use crate::core::analysis::{DEFAULT_MIN_OBSERVATIONS, DEFAULT_SIGNIFICANCE_LEVEL};
use crate::core::estimator::MIN_FIT_OBSERVATIONS;
use crate::domain::model::{NonPositivePolicy, RevenueConvention};
use crate::domain::ports::{ColumnMapping, ConfigProvider};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "price-elasticity")]
#[command(about = "Estimate price elasticity of demand per product category")]
pub struct CliConfig {
    /// CSV file with one row per product
    #[arg(short, long)]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "Item_MRP")]
    pub price_col: String,

    #[arg(long, default_value = "Item_Outlet_Sales")]
    pub sales_col: String,

    #[arg(long, default_value = "Item_Type")]
    pub category_col: String,

    /// Categories with fewer rows are reported as skipped
    #[arg(long, default_value_t = DEFAULT_MIN_OBSERVATIONS)]
    pub min_observations: usize,

    /// Price changes to simulate, in percent (e.g. 5,10,-5)
    #[arg(
        long,
        value_delimiter = ',',
        allow_negative_numbers = true,
        default_value = "5,10,-5"
    )]
    pub price_changes: Vec<f64>,

    /// Half-width of the band around |elasticity| = 1 labelled unit elastic
    #[arg(long, default_value_t = 0.0)]
    pub unit_tolerance: f64,

    #[arg(long, default_value_t = DEFAULT_SIGNIFICANCE_LEVEL)]
    pub significance_level: f64,

    /// drop | propagate
    #[arg(long, default_value = "drop")]
    pub non_positive: NonPositivePolicy,

    /// multiplicative | additive
    #[arg(long, default_value = "multiplicative")]
    pub revenue_convention: RevenueConvention,

    #[arg(long, help = "Fit categories on parallel tasks")]
    pub parallel: bool,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub output_formats: Vec<String>,

    /// Also bundle the report files into this ZIP archive
    #[arg(long)]
    pub bundle: Option<String>,

    /// Print a scenario for this category after the run
    #[arg(long)]
    pub simulate: Option<String>,

    /// Price change for --simulate, in percent
    #[arg(long, default_value_t = 5.0, allow_negative_numbers = true)]
    pub change: f64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn columns(&self) -> ColumnMapping {
        ColumnMapping {
            price: self.price_col.clone(),
            sales: self.sales_col.clone(),
            category: self.category_col.clone(),
        }
    }

    fn min_observations(&self) -> usize {
        self.min_observations
    }

    fn non_positive_policy(&self) -> NonPositivePolicy {
        self.non_positive
    }

    fn unit_tolerance(&self) -> f64 {
        self.unit_tolerance
    }

    fn significance_level(&self) -> f64 {
        self.significance_level
    }

    fn price_changes(&self) -> &[f64] {
        &self.price_changes
    }

    fn revenue_convention(&self) -> RevenueConvention {
        self.revenue_convention
    }

    fn parallel(&self) -> bool {
        self.parallel
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn bundle_name(&self) -> Option<&str> {
        self.bundle.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_string("price_col", &self.price_col)?;
        validation::validate_non_empty_string("sales_col", &self.sales_col)?;
        validation::validate_non_empty_string("category_col", &self.category_col)?;
        validation::validate_positive_number(
            "min_observations",
            self.min_observations,
            MIN_FIT_OBSERVATIONS,
        )?;
        validation::validate_range("unit_tolerance", self.unit_tolerance, 0.0, 1.0)?;
        validation::validate_range("significance_level", self.significance_level, 0.0, 1.0)?;
        validation::validate_price_changes("price_changes", &self.price_changes)?;
        validation::validate_price_changes("change", &[self.change])?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        if let Some(bundle) = &self.bundle {
            validation::validate_file_extension("bundle", bundle, &["zip"])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::try_parse_from(["price-elasticity", "--input", "sales.csv"]).unwrap();

        assert_eq!(config.min_observations, 10);
        assert_eq!(config.price_changes, vec![5.0, 10.0, -5.0]);
        assert_eq!(config.non_positive, NonPositivePolicy::Drop);
        assert_eq!(config.revenue_convention, RevenueConvention::Multiplicative);
        assert_eq!(config.output_formats, vec!["csv", "json"]);
        assert_eq!(config.columns(), ColumnMapping::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let config = CliConfig::try_parse_from([
            "price-elasticity",
            "--input",
            "sales.csv",
            "--price-changes=-10,2.5",
            "--non-positive",
            "propagate",
            "--revenue-convention",
            "additive",
            "--unit-tolerance",
            "0.05",
            "--bundle",
            "report.zip",
        ])
        .unwrap();

        assert_eq!(config.price_changes, vec![-10.0, 2.5]);
        assert_eq!(config.non_positive_policy(), NonPositivePolicy::Propagate);
        assert_eq!(config.revenue_convention(), RevenueConvention::Additive);
        assert_eq!(config.bundle_name(), Some("report.zip"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_failures() {
        let mut config =
            CliConfig::try_parse_from(["price-elasticity", "--input", "sales.csv"]).unwrap();
        config.min_observations = 2;
        assert!(config.validate().is_err());

        config.min_observations = 10;
        config.input = "sales.xlsx".to_string();
        assert!(config.validate().is_err());

        config.input = "sales.csv".to_string();
        config.price_changes = vec![-100.0];
        assert!(config.validate().is_err());
    }
}
