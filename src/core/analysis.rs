use crate::core::classifier::Classifier;
use crate::core::estimator::{self, EstimateMap};
use crate::core::grouping;
use crate::core::simulator::RevenueSimulator;
use crate::core::summary;
use crate::domain::model::{
    AnalysisReport, CategoryScenario, ClassifiedResult, Dataset, ElasticityResult,
    RevenueConvention, SkippedCategory,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ElasticityError, Result};

pub const DEFAULT_MIN_OBSERVATIONS: usize = 10;
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;
pub const DEFAULT_PRICE_CHANGES: &[f64] = &[5.0, 10.0, -5.0];

/// Knobs for the transform phase, detached from where they were configured.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub min_observations: usize,
    pub unit_tolerance: f64,
    pub significance_level: f64,
    pub price_changes: Vec<f64>,
    pub revenue_convention: RevenueConvention,
    pub parallel: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            unit_tolerance: 0.0,
            significance_level: DEFAULT_SIGNIFICANCE_LEVEL,
            price_changes: DEFAULT_PRICE_CHANGES.to_vec(),
            revenue_convention: RevenueConvention::Multiplicative,
            parallel: false,
        }
    }
}

impl AnalysisSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            min_observations: config.min_observations(),
            unit_tolerance: config.unit_tolerance(),
            significance_level: config.significance_level(),
            price_changes: config.price_changes().to_vec(),
            revenue_convention: config.revenue_convention(),
            parallel: config.parallel(),
        }
    }

    /// Rejects settings the simulator or classifier cannot work with, so a bad
    /// value surfaces before any category is fitted.
    pub fn validate(&self) -> Result<()> {
        if let Some(change) = self
            .price_changes
            .iter()
            .find(|c| !c.is_finite() || **c <= -100.0)
        {
            return Err(ElasticityError::ValidationError {
                message: format!("price change {change}% must be finite and greater than -100%"),
            });
        }
        if !(self.unit_tolerance >= 0.0 && self.unit_tolerance.is_finite()) {
            return Err(ElasticityError::ValidationError {
                message: format!("unit tolerance {} must be a finite value >= 0", self.unit_tolerance),
            });
        }
        if !(0.0..=1.0).contains(&self.significance_level) {
            return Err(ElasticityError::ValidationError {
                message: format!(
                    "significance level {} must lie between 0 and 1",
                    self.significance_level
                ),
            });
        }
        Ok(())
    }
}

/// Group → estimate → classify → simulate → summarize.
pub async fn analyze(dataset: &Dataset, settings: &AnalysisSettings) -> Result<AnalysisReport> {
    settings.validate()?;

    let groups = grouping::group_by_category(&dataset.observations);
    tracing::info!(
        "🗂️ {} categories across {} observations",
        groups.len(),
        dataset.observations.len()
    );

    let (eligible, mut skipped) = grouping::partition_by_size(groups, settings.min_observations);
    for s in &skipped {
        tracing::warn!("⚠️ {} skipped: {}", s.category, s.reason);
    }

    let estimates = if settings.parallel {
        estimator::estimate_all_parallel(eligible).await?
    } else {
        estimator::estimate_all(&eligible)
    };

    let (results, failed) = split_estimates(estimates);
    skipped.extend(failed);
    skipped.sort_by(|a, b| a.category.cmp(&b.category));

    let classifier = Classifier::new(settings.unit_tolerance);
    let mut classified: Vec<ClassifiedResult> = results
        .into_iter()
        .map(|result| classify(&classifier, result, settings.significance_level))
        .collect();
    // most positive elasticity first, the order the report tables use
    classified.sort_by(|a, b| b.result.elasticity.total_cmp(&a.result.elasticity));

    let scenarios = build_scenarios(&classified, settings)?;
    let summary = summary::summarize(&classified, &dataset.observations);

    Ok(AnalysisReport {
        generated_at: chrono::Utc::now(),
        load_summary: dataset.load_summary.clone(),
        summary,
        results: classified,
        skipped,
        scenarios,
    })
}

fn split_estimates(estimates: EstimateMap) -> (Vec<ElasticityResult>, Vec<SkippedCategory>) {
    let mut results = Vec::new();
    let mut skipped = Vec::new();
    for (category, outcome) in estimates {
        match outcome {
            Ok(result) => results.push(result),
            Err(reason) => skipped.push(SkippedCategory { category, reason }),
        }
    }
    (results, skipped)
}

pub fn classify(
    classifier: &Classifier,
    result: ElasticityResult,
    significance_level: f64,
) -> ClassifiedResult {
    let elasticity = result.elasticity;
    ClassifiedResult {
        demand_class: classifier.classify(elasticity),
        demand_band: classifier.band(elasticity),
        can_increase_price: classifier.can_increase_price(elasticity),
        significant: result.p_value < significance_level,
        result,
    }
}

fn build_scenarios(
    results: &[ClassifiedResult],
    settings: &AnalysisSettings,
) -> Result<Vec<CategoryScenario>> {
    let simulator = RevenueSimulator::new(settings.revenue_convention);
    let mut scenarios = Vec::with_capacity(results.len() * settings.price_changes.len());
    for classified in results {
        for &change in &settings.price_changes {
            let scenario = simulator.simulate_category(&classified.result, change)?;
            if scenario.extrapolated {
                tracing::debug!(
                    "{} at {:+.1}% leaves the observed price range",
                    scenario.category,
                    change
                );
            }
            scenarios.push(scenario);
        }
    }
    Ok(scenarios)
}

/// Ad hoc scenario for one category of a finished report.
pub fn simulate_for(
    report: &AnalysisReport,
    category: &str,
    price_change_pct: f64,
    convention: RevenueConvention,
) -> Result<CategoryScenario> {
    let classified = report
        .result_for(category)
        .ok_or_else(|| ElasticityError::UnknownCategory {
            category: category.to_string(),
        })?;
    Ok(RevenueSimulator::new(convention).simulate_category(&classified.result, price_change_pct)?)
}
