use crate::domain::model::{DemandBand, DemandClass};
use serde::{Deserialize, Serialize};

const HIGHLY_INELASTIC_BELOW: f64 = 0.5;
const HIGHLY_ELASTIC_FROM: f64 = 1.5;

/// Labels elasticities by comparing |β1| with 1.
///
/// `unit_tolerance` is the half-width ε of the band around 1.0 reported as
/// unit elastic (|β1| within ε of 1). With the default ε = 0 only an exact
/// 1.0 is unit elastic, which continuous estimates practically never hit, so
/// the label is a reporting convenience rather than a statistical finding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Classifier {
    pub unit_tolerance: f64,
}

impl Classifier {
    pub fn new(unit_tolerance: f64) -> Self {
        Self {
            unit_tolerance: unit_tolerance.abs(),
        }
    }

    pub fn classify(&self, elasticity: f64) -> DemandClass {
        let magnitude = elasticity.abs();
        if (magnitude - 1.0).abs() <= self.unit_tolerance {
            DemandClass::UnitElastic
        } else if magnitude > 1.0 {
            DemandClass::Elastic
        } else {
            DemandClass::Inelastic
        }
    }

    pub fn band(&self, elasticity: f64) -> DemandBand {
        let magnitude = elasticity.abs();
        match self.classify(elasticity) {
            DemandClass::UnitElastic => DemandBand::UnitElastic,
            DemandClass::Inelastic if magnitude < HIGHLY_INELASTIC_BELOW => {
                DemandBand::HighlyInelastic
            }
            DemandClass::Inelastic => DemandBand::Inelastic,
            DemandClass::Elastic if magnitude < HIGHLY_ELASTIC_FROM => DemandBand::Elastic,
            DemandClass::Elastic => DemandBand::HighlyElastic,
        }
    }

    /// A price rise grows revenue unless demand is elastic.
    pub fn can_increase_price(&self, elasticity: f64) -> bool {
        self.classify(elasticity) != DemandClass::Elastic
    }
}
