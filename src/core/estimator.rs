//! Log-log OLS elasticity estimation.
//!
//! Each category is fitted independently with
//! `ln(sales) = β0 + β1·ln(price) + ε`; β1 is the constant price elasticity.
//! Failures are category-local and come back as [`EstimationError`] values in
//! the result map rather than aborting the run.

use crate::core::stats;
use crate::domain::model::{CategoryGroup, ElasticityResult};
use crate::utils::error::{ElasticityError, EstimationError, Result};
use std::collections::BTreeMap;
use tokio::task::JoinSet;

/// Fewest observations for which the slope's standard error is defined.
pub const MIN_FIT_OBSERVATIONS: usize = 3;

pub type EstimateMap = BTreeMap<String, std::result::Result<ElasticityResult, EstimationError>>;

/// Raw regression output for one set of (price, sales) pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLogFit {
    pub slope: f64,
    pub intercept: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub r_squared: f64,
    pub n: usize,
}

/// Fits ln(sales) on ln(price) with an intercept.
pub fn fit_log_log(pairs: &[(f64, f64)]) -> std::result::Result<LogLogFit, EstimationError> {
    for &(price, sales) in pairs {
        if !(price > 0.0) {
            return Err(EstimationError::NonPositiveValue {
                field: "price".to_string(),
                value: price,
            });
        }
        if !(sales > 0.0) {
            return Err(EstimationError::NonPositiveValue {
                field: "sales".to_string(),
                value: sales,
            });
        }
    }

    let n = pairs.len();
    if n < MIN_FIT_OBSERVATIONS {
        return Err(EstimationError::InsufficientData {
            observations: n,
            required: MIN_FIT_OBSERVATIONS,
        });
    }

    let first_price = pairs[0].0;
    if pairs.iter().all(|&(price, _)| price == first_price) {
        return Err(EstimationError::DegenerateInput { price: first_price });
    }

    let xs: Vec<f64> = pairs.iter().map(|&(price, _)| price.ln()).collect();
    let ys: Vec<f64> = pairs.iter().map(|&(_, sales)| sales.ln()).collect();
    let mean_x = stats::mean(&xs);
    // constant sales must give exact zero deviations, not rounding noise
    let first_sales = pairs[0].1;
    let mean_y = if pairs.iter().all(|&(_, sales)| sales == first_sales) {
        ys[0]
    } else {
        stats::mean(&ys)
    };

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    let mut ss_tot = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        ss_xx += dx * dx;
        ss_xy += dx * dy;
        ss_tot += dy * dy;
    }
    if ss_xx == 0.0 {
        // distinct prices can still collapse after ln() when they differ by an ulp
        return Err(EstimationError::DegenerateInput { price: first_price });
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| {
            let residual = y - (intercept + slope * x);
            residual * residual
        })
        .sum();

    let r_squared = if ss_tot > 0.0 {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let df = (n - 2) as f64;
    let std_error = ((ss_res / df) / ss_xx).sqrt();

    let (t_statistic, p_value) = if std_error > 0.0 {
        let t = slope / std_error;
        (t, stats::two_sided_t_p_value(t, df))
    } else if slope == 0.0 {
        (0.0, 1.0)
    } else {
        (slope.signum() * f64::INFINITY, 0.0)
    };

    Ok(LogLogFit {
        slope,
        intercept,
        std_error,
        t_statistic,
        p_value,
        r_squared,
        n,
    })
}

/// Fits one category group and attaches its descriptive price and sales figures.
pub fn estimate_group(
    group: &CategoryGroup,
) -> std::result::Result<ElasticityResult, EstimationError> {
    let fit = fit_log_log(&group.pairs())?;

    let prices: Vec<f64> = group.observations.iter().map(|o| o.price).collect();
    let total_sales = group.observations.iter().map(|o| o.sales).sum();
    let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(ElasticityResult {
        category: group.category.clone(),
        elasticity: fit.slope,
        intercept: fit.intercept,
        std_error: fit.std_error,
        t_statistic: fit.t_statistic,
        p_value: fit.p_value,
        r_squared: fit.r_squared,
        sample_size: fit.n,
        avg_price: stats::mean(&prices),
        median_price: stats::median(&prices),
        min_price,
        max_price,
        total_sales,
    })
}

/// Fits every group in order; the map is sorted by category label.
pub fn estimate_all(groups: &[CategoryGroup]) -> EstimateMap {
    groups
        .iter()
        .map(|group| {
            let outcome = estimate_group(group);
            log_outcome(&group.category, &outcome);
            (group.category.clone(), outcome)
        })
        .collect()
}

/// Same result as [`estimate_all`], with each category fitted on its own
/// blocking task.
pub async fn estimate_all_parallel(groups: Vec<CategoryGroup>) -> Result<EstimateMap> {
    let mut tasks = JoinSet::new();
    for group in groups {
        tasks.spawn_blocking(move || {
            let outcome = estimate_group(&group);
            (group.category, outcome)
        });
    }

    let mut estimates = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (category, outcome) = joined.map_err(|e| ElasticityError::ProcessingError {
            message: format!("estimation task failed: {}", e),
        })?;
        log_outcome(&category, &outcome);
        estimates.insert(category, outcome);
    }
    Ok(estimates)
}

fn log_outcome(category: &str, outcome: &std::result::Result<ElasticityResult, EstimationError>) {
    match outcome {
        Ok(result) => tracing::debug!(
            "📈 {}: β1={:.4} se={:.4} p={:.4} R²={:.4} n={}",
            category,
            result.elasticity,
            result.std_error,
            result.p_value,
            result.r_squared,
            result.sample_size
        ),
        Err(e) => tracing::warn!("⚠️ {} skipped: {}", category, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Observation;

    fn group(category: &str, pairs: &[(f64, f64)]) -> CategoryGroup {
        CategoryGroup {
            category: category.to_string(),
            observations: pairs
                .iter()
                .map(|&(p, s)| Observation::new(category, p, s))
                .collect(),
        }
    }

    #[test]
    fn test_exact_power_law_recovers_exponent() {
        let pairs: Vec<(f64, f64)> = [10.0, 20.0, 40.0, 80.0, 160.0]
            .iter()
            .map(|&p: &f64| (p, 500.0 * p.powf(-1.3)))
            .collect();
        let fit = fit_log_log(&pairs).unwrap();

        assert!((fit.slope + 1.3).abs() < 1e-10);
        assert!((fit.intercept - 500f64.ln()).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.std_error < 1e-6);
        assert!(fit.p_value < 1e-6);
    }

    #[test]
    fn test_hand_computed_fit() {
        // x = ln p = [0, 1, 2], y = ln s = [0, 2, 1]
        let e = std::f64::consts::E;
        let pairs = [(1.0, 1.0), (e, e * e), (e * e, e)];
        let fit = fit_log_log(&pairs).unwrap();

        // slope = Sxy / Sxx = 1 / 2, intercept = 1 - 0.5 = 0.5
        assert!((fit.slope - 0.5).abs() < 1e-12);
        assert!((fit.intercept - 0.5).abs() < 1e-12);
        // residuals [-0.5, 1, -0.5] → SS_res = 1.5, SS_tot = 2
        assert!((fit.r_squared - 0.25).abs() < 1e-12);
        // se = sqrt((1.5 / 1) / 2)
        assert!((fit.std_error - 0.75f64.sqrt()).abs() < 1e-12);
        // df = 1: p = 1 - (2/π)·atan(|t|)
        let t = 0.5 / 0.75f64.sqrt();
        let expected_p = 1.0 - 2.0 / std::f64::consts::PI * t.atan();
        assert!((fit.p_value - expected_p).abs() < 1e-9);
    }

    #[test]
    fn test_two_observations_is_insufficient() {
        let err = fit_log_log(&[(1.0, 5.0), (2.0, 3.0)]).unwrap_err();
        assert_eq!(
            err,
            EstimationError::InsufficientData {
                observations: 2,
                required: 3
            }
        );
    }

    #[test]
    fn test_identical_prices_are_degenerate() {
        let err = fit_log_log(&[(4.5, 5.0), (4.5, 3.0), (4.5, 9.0)]).unwrap_err();
        assert_eq!(err, EstimationError::DegenerateInput { price: 4.5 });
    }

    #[test]
    fn test_non_positive_values_are_rejected() {
        let err = fit_log_log(&[(1.0, 5.0), (0.0, 3.0), (2.0, 9.0)]).unwrap_err();
        assert!(matches!(err, EstimationError::NonPositiveValue { ref field, .. } if field == "price"));

        let err = fit_log_log(&[(1.0, 5.0), (3.0, 0.0), (2.0, 9.0)]).unwrap_err();
        assert!(matches!(err, EstimationError::NonPositiveValue { ref field, .. } if field == "sales"));

        // log-domain check wins over the sample-size check
        let err = fit_log_log(&[(-1.0, 5.0)]).unwrap_err();
        assert_eq!(err.kind(), "NonPositiveValue");
    }

    #[test]
    fn test_constant_sales_has_zero_r_squared() {
        let fit = fit_log_log(&[(1.0, 7.0), (2.0, 7.0), (3.0, 7.0)]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
        assert_eq!(fit.p_value, 1.0);
    }

    #[test]
    fn test_results_are_deterministic_and_bounded() {
        let pairs: Vec<(f64, f64)> = (1..=40)
            .map(|i| {
                let price = 5.0 + i as f64 * 1.7;
                let wobble = 1.0 + 0.3 * (i as f64 * 2.3).sin();
                (price, 900.0 * price.powf(-0.7) * wobble)
            })
            .collect();
        let first = fit_log_log(&pairs).unwrap();
        let second = fit_log_log(&pairs).unwrap();

        assert_eq!(first, second);
        assert!(first.slope.is_finite());
        assert!((0.0..=1.0).contains(&first.r_squared));
        assert!((0.0..=1.0).contains(&first.p_value));
    }

    #[test]
    fn test_estimate_group_descriptives() {
        let g = group("Dairy", &[(10.0, 100.0), (20.0, 60.0), (40.0, 30.0), (30.0, 50.0)]);
        let result = estimate_group(&g).unwrap();

        assert_eq!(result.category, "Dairy");
        assert_eq!(result.sample_size, 4);
        assert_eq!(result.avg_price, 25.0);
        assert_eq!(result.median_price, 25.0);
        assert_eq!(result.min_price, 10.0);
        assert_eq!(result.max_price, 40.0);
        assert_eq!(result.total_sales, 240.0);
        assert!(result.elasticity < 0.0);
    }

    #[test]
    fn test_estimate_all_isolates_failures() {
        let groups = vec![
            group("Breads", &[(2.0, 10.0), (3.0, 8.0), (4.0, 5.0)]),
            group("Alcohol", &[(9.0, 1.0), (9.0, 2.0), (9.0, 3.0)]),
            group("Candy", &[(1.0, 1.0), (2.0, 2.0)]),
        ];
        let estimates = estimate_all(&groups);

        let keys: Vec<&str> = estimates.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Alcohol", "Breads", "Candy"]);
        assert!(estimates["Breads"].is_ok());
        assert_eq!(estimates["Alcohol"].as_ref().unwrap_err().kind(), "DegenerateInput");
        assert_eq!(estimates["Candy"].as_ref().unwrap_err().kind(), "InsufficientData");
    }

    #[tokio::test]
    async fn test_parallel_matches_sequential() {
        let groups: Vec<CategoryGroup> = (0..6)
            .map(|k| {
                let pairs: Vec<(f64, f64)> = (1..=12)
                    .map(|i| {
                        let price = i as f64 * (1.0 + k as f64);
                        (price, 200.0 * price.powf(-0.5 - k as f64 * 0.1) * (1.0 + 0.05 * (i as f64).cos()))
                    })
                    .collect();
                group(&format!("cat-{}", k), &pairs)
            })
            .collect();

        let sequential = estimate_all(&groups);
        let parallel = estimate_all_parallel(groups).await.unwrap();
        assert_eq!(sequential, parallel);
    }
}
