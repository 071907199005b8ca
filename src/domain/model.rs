use crate::utils::error::EstimationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One product row after loading. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub category: String,
    pub price: f64,
    pub sales: f64,
}

impl Observation {
    pub fn new(category: impl Into<String>, price: f64, sales: f64) -> Self {
        Self {
            category: category.into(),
            price,
            sales,
        }
    }
}

/// All observations sharing one category label.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: String,
    pub observations: Vec<Observation>,
}

impl CategoryGroup {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.observations.iter().map(|o| (o.price, o.sales)).collect()
    }
}

/// Output of the extract phase.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub observations: Vec<Observation>,
    pub load_summary: LoadSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub original_size: usize,
    pub cleaned_size: usize,
    pub removed_records: usize,
    pub removal_pct: f64,
}

impl LoadSummary {
    pub fn new(original_size: usize, cleaned_size: usize) -> Self {
        let removed_records = original_size.saturating_sub(cleaned_size);
        let removal_pct = if original_size > 0 {
            removed_records as f64 / original_size as f64 * 100.0
        } else {
            0.0
        };
        Self {
            original_size,
            cleaned_size,
            removed_records,
            removal_pct,
        }
    }
}

/// Per-category log-log OLS fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticityResult {
    pub category: String,
    /// Slope of ln(sales) on ln(price).
    pub elasticity: f64,
    pub intercept: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub r_squared: f64,
    pub sample_size: usize,
    pub avg_price: f64,
    pub median_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub total_sales: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandClass {
    Inelastic,
    UnitElastic,
    Elastic,
}

impl std::fmt::Display for DemandClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DemandClass::Inelastic => "Inelastic",
            DemandClass::UnitElastic => "Unit Elastic",
            DemandClass::Elastic => "Elastic",
        };
        f.write_str(label)
    }
}

/// Finer reporting label on top of [`DemandClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandBand {
    HighlyInelastic,
    Inelastic,
    UnitElastic,
    Elastic,
    HighlyElastic,
}

impl std::fmt::Display for DemandBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DemandBand::HighlyInelastic => "Highly Inelastic",
            DemandBand::Inelastic => "Inelastic",
            DemandBand::UnitElastic => "Unit Elastic",
            DemandBand::Elastic => "Elastic",
            DemandBand::HighlyElastic => "Highly Elastic",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueConvention {
    /// (1 + Δp)(1 + Δq) − 1
    #[default]
    Multiplicative,
    /// Δp + Δq
    Additive,
}

impl std::str::FromStr for RevenueConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "multiplicative" => Ok(RevenueConvention::Multiplicative),
            "additive" => Ok(RevenueConvention::Additive),
            other => Err(format!(
                "unknown revenue convention '{}', expected multiplicative or additive",
                other
            )),
        }
    }
}

/// What the loader does with rows whose price or sales is not strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonPositivePolicy {
    #[default]
    Drop,
    Propagate,
}

impl std::str::FromStr for NonPositivePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "drop" => Ok(NonPositivePolicy::Drop),
            "propagate" => Ok(NonPositivePolicy::Propagate),
            other => Err(format!(
                "unknown non-positive policy '{}', expected drop or propagate",
                other
            )),
        }
    }
}

/// A proposed price change applied to one elasticity. All values are percents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevenueScenario {
    pub elasticity: f64,
    pub price_change_pct: f64,
    pub quantity_change_pct: f64,
    pub revenue_change_pct: f64,
    pub convention: RevenueConvention,
}

/// A scenario anchored to a fitted category, with money figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScenario {
    pub category: String,
    pub current_price: f64,
    pub new_price: f64,
    pub current_total_sales: f64,
    pub estimated_revenue_impact: f64,
    /// New average price falls outside the observed price range.
    pub extrapolated: bool,
    #[serde(flatten)]
    pub scenario: RevenueScenario,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedCategory {
    pub category: String,
    pub reason: EstimationError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedResult {
    #[serde(flatten)]
    pub result: ElasticityResult,
    pub demand_class: DemandClass,
    pub demand_band: DemandBand,
    pub can_increase_price: bool,
    pub significant: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_categories: usize,
    pub inelastic_categories: usize,
    pub elastic_categories: usize,
    pub inelastic_pct: f64,
    pub avg_elasticity: Option<f64>,
    pub significant_results: usize,
    pub avg_r_squared: Option<f64>,
    pub price_sales_correlation: Option<f64>,
    /// Inelastic categories, highest average price first.
    pub pricing_opportunities: Vec<String>,
    /// Elastic categories, most elastic first.
    pub price_sensitive: Vec<String>,
}

/// Everything the transform phase hands to the reporter.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub load_summary: LoadSummary,
    pub summary: SummaryStats,
    pub results: Vec<ClassifiedResult>,
    pub skipped: Vec<SkippedCategory>,
    pub scenarios: Vec<CategoryScenario>,
}

impl AnalysisReport {
    pub fn result_for(&self, category: &str) -> Option<&ClassifiedResult> {
        self.results.iter().find(|r| r.result.category == category)
    }

    /// Results keyed by category label.
    pub fn by_category(&self) -> BTreeMap<&str, &ClassifiedResult> {
        self.results
            .iter()
            .map(|r| (r.result.category.as_str(), r))
            .collect()
    }
}
