use crate::domain::model::{Dataset, LoadSummary, NonPositivePolicy, Observation};
use crate::domain::ports::ColumnMapping;
use crate::utils::error::{ElasticityError, Result};

/// Parses CSV bytes into cleaned observations.
///
/// Rows with a blank category or a missing/non-numeric price or sales cell
/// are dropped. Rows with a non-positive price or sales value are dropped
/// under [`NonPositivePolicy::Drop`] and kept under `Propagate`, where the
/// estimator reports them per category.
pub fn parse_observations(
    data: &[u8],
    columns: &ColumnMapping,
    policy: NonPositivePolicy,
) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let find = |column: &str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| ElasticityError::MissingColumn {
                column: column.to_string(),
            })
    };
    let price_idx = find(&columns.price)?;
    let sales_idx = find(&columns.sales)?;
    let category_idx = find(&columns.category)?;

    let mut original_size = 0;
    let mut observations = Vec::new();

    for row in reader.records() {
        let row = row?;
        original_size += 1;

        let category = row.get(category_idx).unwrap_or_default();
        if category.is_empty() {
            continue;
        }
        let (Some(price), Some(sales)) = (
            parse_number(row.get(price_idx)),
            parse_number(row.get(sales_idx)),
        ) else {
            continue;
        };
        if policy == NonPositivePolicy::Drop && (price <= 0.0 || sales <= 0.0) {
            continue;
        }

        observations.push(Observation::new(category, price, sales));
    }

    let load_summary = LoadSummary::new(original_size, observations.len());
    tracing::debug!(
        "Loaded {} of {} rows ({} removed, {:.1}%)",
        load_summary.cleaned_size,
        load_summary.original_size,
        load_summary.removed_records,
        load_summary.removal_pct
    );

    Ok(Dataset {
        observations,
        load_summary,
    })
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell.filter(|c| !c.is_empty())
        .and_then(|c| c.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Item_Identifier,Item_Type,Item_MRP,Item_Outlet_Sales
FDA15,Dairy,249.8092,3735.138
DRC01,Soft Drinks,48.2692,443.4228
FDN15,Meat,141.618,
FDX07,Fruits and Vegetables,182.095,0
NCD19,Household,53.8614,994.7052
FDP36,Baking Goods,abc,556.6088
FDO10,,57.6588,343.5528
";

    #[test]
    fn test_drop_policy_cleans_rows() {
        let dataset =
            parse_observations(SAMPLE.as_bytes(), &ColumnMapping::default(), NonPositivePolicy::Drop)
                .unwrap();

        assert_eq!(dataset.load_summary.original_size, 7);
        assert_eq!(dataset.load_summary.cleaned_size, 3);
        assert_eq!(dataset.load_summary.removed_records, 4);
        let categories: Vec<&str> = dataset
            .observations
            .iter()
            .map(|o| o.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Dairy", "Soft Drinks", "Household"]);
        assert_eq!(dataset.observations[0].price, 249.8092);
    }

    #[test]
    fn test_propagate_policy_keeps_zero_sales() {
        let dataset = parse_observations(
            SAMPLE.as_bytes(),
            &ColumnMapping::default(),
            NonPositivePolicy::Propagate,
        )
        .unwrap();

        assert_eq!(dataset.load_summary.cleaned_size, 4);
        assert!(dataset
            .observations
            .iter()
            .any(|o| o.category == "Fruits and Vegetables" && o.sales == 0.0));
    }

    #[test]
    fn test_custom_column_mapping() {
        let data = "sku,price,units,segment\nA,2.5,10,toys\nB,3.0,8,toys\n";
        let columns = ColumnMapping {
            price: "price".to_string(),
            sales: "units".to_string(),
            category: "segment".to_string(),
        };
        let dataset = parse_observations(data.as_bytes(), &columns, NonPositivePolicy::Drop).unwrap();
        assert_eq!(dataset.observations.len(), 2);
        assert_eq!(dataset.observations[1], Observation::new("toys", 3.0, 8.0));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let data = "sku,price\nA,2.5\n";
        let err = parse_observations(data.as_bytes(), &ColumnMapping::default(), NonPositivePolicy::Drop)
            .unwrap_err();
        assert!(matches!(err, ElasticityError::MissingColumn { ref column } if column == "Item_MRP"));
    }
}
