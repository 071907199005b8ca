use crate::core::stats;
use crate::domain::model::{ClassifiedResult, DemandClass, Observation, SummaryStats};

/// Aggregate figures over the fitted categories.
pub fn summarize(
    results: &[ClassifiedResult],
    observations: &[Observation],
) -> SummaryStats {
    let total = results.len();
    let inelastic = results
        .iter()
        .filter(|r| r.demand_class == DemandClass::Inelastic)
        .count();
    let elastic = results
        .iter()
        .filter(|r| r.demand_class == DemandClass::Elastic)
        .count();

    let elasticities: Vec<f64> = results.iter().map(|r| r.result.elasticity).collect();
    let r_squared: Vec<f64> = results.iter().map(|r| r.result.r_squared).collect();

    SummaryStats {
        total_categories: total,
        inelastic_categories: inelastic,
        elastic_categories: elastic,
        inelastic_pct: if total > 0 {
            inelastic as f64 / total as f64 * 100.0
        } else {
            0.0
        },
        avg_elasticity: (total > 0).then(|| stats::mean(&elasticities)),
        significant_results: results.iter().filter(|r| r.significant).count(),
        avg_r_squared: (total > 0).then(|| stats::mean(&r_squared)),
        price_sales_correlation: price_sales_correlation(observations),
        pricing_opportunities: labels(pricing_opportunities(results)),
        price_sensitive: labels(price_sensitive(results)),
    }
}

fn labels(selected: Vec<&ClassifiedResult>) -> Vec<String> {
    selected
        .into_iter()
        .map(|r| r.result.category.clone())
        .collect()
}

/// Pearson correlation of raw price against raw sales across all rows.
pub fn price_sales_correlation(observations: &[Observation]) -> Option<f64> {
    let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
    let sales: Vec<f64> = observations.iter().map(|o| o.sales).collect();
    stats::pearson(&prices, &sales)
}

/// Categories where a price rise is expected to grow revenue, highest
/// average price first.
pub fn pricing_opportunities(results: &[ClassifiedResult]) -> Vec<&ClassifiedResult> {
    let mut selected: Vec<&ClassifiedResult> = results
        .iter()
        .filter(|r| r.demand_class == DemandClass::Inelastic)
        .collect();
    selected.sort_by(|a, b| b.result.avg_price.total_cmp(&a.result.avg_price));
    selected
}

/// Price-sensitive categories, most negative elasticity first.
pub fn price_sensitive(results: &[ClassifiedResult]) -> Vec<&ClassifiedResult> {
    let mut selected: Vec<&ClassifiedResult> = results
        .iter()
        .filter(|r| r.demand_class == DemandClass::Elastic)
        .collect();
    selected.sort_by(|a, b| a.result.elasticity.total_cmp(&b.result.elasticity));
    selected
}
