//! Revenue impact of a hypothetical price change.
//!
//! The projection assumes constant elasticity, the simplifying assumption
//! built into the log-log model: the quantity change is β1 × Δp regardless
//! of where on the demand curve the price sits. That only holds locally. For
//! prices outside the range the category was fitted on, the model provides
//! no support and no confidence bound; [`CategoryScenario::extrapolated`]
//! flags those cases.

use crate::domain::model::{CategoryScenario, ElasticityResult, RevenueConvention, RevenueScenario};
use crate::utils::error::SimulationError;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevenueSimulator {
    pub convention: RevenueConvention,
}

impl RevenueSimulator {
    pub fn new(convention: RevenueConvention) -> Self {
        Self { convention }
    }

    /// `price_change_pct` is in percent units, so 5.0 means +5%.
    pub fn simulate(
        &self,
        elasticity: f64,
        price_change_pct: f64,
    ) -> Result<RevenueScenario, SimulationError> {
        if !elasticity.is_finite() {
            return Err(SimulationError::NonFiniteElasticity(elasticity));
        }
        if !price_change_pct.is_finite() || price_change_pct <= -100.0 {
            return Err(SimulationError::InvalidPriceChange(price_change_pct));
        }

        let quantity_change_pct = elasticity * price_change_pct;
        let revenue_change_pct = match self.convention {
            RevenueConvention::Multiplicative => {
                ((1.0 + price_change_pct / 100.0) * (1.0 + quantity_change_pct / 100.0) - 1.0)
                    * 100.0
            }
            RevenueConvention::Additive => price_change_pct + quantity_change_pct,
        };

        Ok(RevenueScenario {
            elasticity,
            price_change_pct,
            quantity_change_pct,
            revenue_change_pct,
            convention: self.convention,
        })
    }

    /// Scenario for a fitted category, priced off its average price and
    /// total sales.
    pub fn simulate_category(
        &self,
        result: &ElasticityResult,
        price_change_pct: f64,
    ) -> Result<CategoryScenario, SimulationError> {
        let scenario = self.simulate(result.elasticity, price_change_pct)?;
        let new_price = result.avg_price * (1.0 + price_change_pct / 100.0);

        Ok(CategoryScenario {
            category: result.category.clone(),
            current_price: result.avg_price,
            new_price,
            current_total_sales: result.total_sales,
            estimated_revenue_impact: result.total_sales * scenario.revenue_change_pct / 100.0,
            extrapolated: new_price < result.min_price || new_price > result.max_price,
            scenario,
        })
    }
}
