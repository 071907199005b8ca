use crate::core::estimator::MIN_FIT_OBSERVATIONS;
use crate::domain::model::{CategoryGroup, Observation, SkippedCategory};
use crate::utils::error::EstimationError;
use std::collections::BTreeMap;

/// Partitions observations by exact category label, ordered by label.
pub fn group_by_category(observations: &[Observation]) -> Vec<CategoryGroup> {
    let mut groups: BTreeMap<&str, Vec<Observation>> = BTreeMap::new();
    for observation in observations {
        groups
            .entry(observation.category.as_str())
            .or_default()
            .push(observation.clone());
    }

    groups
        .into_iter()
        .map(|(category, observations)| CategoryGroup {
            category: category.to_string(),
            observations,
        })
        .collect()
}

/// Splits groups into those large enough to fit and those skipped for size.
///
/// The effective threshold never drops below what the estimator itself needs.
/// A small group holding a non-positive value reports that value rather than
/// its size, the same precedence the estimator applies.
pub fn partition_by_size(
    groups: Vec<CategoryGroup>,
    min_observations: usize,
) -> (Vec<CategoryGroup>, Vec<SkippedCategory>) {
    let required = min_observations.max(MIN_FIT_OBSERVATIONS);
    let (eligible, small): (Vec<_>, Vec<_>) =
        groups.into_iter().partition(|g| g.len() >= required);

    let skipped = small
        .into_iter()
        .map(|g| SkippedCategory {
            reason: first_non_positive(&g).unwrap_or(EstimationError::InsufficientData {
                observations: g.len(),
                required,
            }),
            category: g.category,
        })
        .collect();

    (eligible, skipped)
}

fn first_non_positive(group: &CategoryGroup) -> Option<EstimationError> {
    group.observations.iter().find_map(|o| {
        if !(o.price > 0.0) {
            Some(EstimationError::NonPositiveValue {
                field: "price".to_string(),
                value: o.price,
            })
        } else if !(o.sales > 0.0) {
            Some(EstimationError::NonPositiveValue {
                field: "sales".to_string(),
                value: o.sales,
            })
        } else {
            None
        }
    })
}
