use price_elasticity_etl::core::report;
use price_elasticity_etl::domain::model::RevenueConvention;
use price_elasticity_etl::utils::validation::Validate;
use price_elasticity_etl::{ElasticityPipeline, EtlEngine, LocalStorage, TomlConfig};
use tempfile::TempDir;

const SALES: &str = "\
sku,segment,unit_price,units
A1,Beverages,1.50,420
A2,Beverages,1.80,380
A3,Beverages,2.10,330
A4,Beverages,2.60,300
A5,Beverages,3.00,260
B1,Frozen,4.00,90
B2,Frozen,4.00,80
B3,Frozen,4.00,85
B4,Frozen,4.00,95
C1,Produce,2.00,150
C2,Produce,0,140
C3,Produce,2.50,120
C4,Produce,3.00,100
";

fn write_config(dir: &TempDir, input: &str, output: &str) -> std::path::PathBuf {
    let content = format!(
        r#"
[analysis]
name = "store-test"
description = "Column mapping and propagate policy"
version = "0.1"

[source]
input_path = "{input}"
price_column = "unit_price"
sales_column = "units"
category_column = "segment"
non_positive_policy = "propagate"

[estimation]
min_observations = 4

[simulation]
price_changes = [10.0]
convention = "additive"

[load]
output_path = "{output}"
output_formats = ["csv"]
"#
    );
    let path = dir.path().join("elasticity-config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_toml_configured_run() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("sales.csv");
    std::fs::write(&input, SALES).unwrap();
    let output_dir = temp_dir.path().join("report");

    let config_path = write_config(
        &temp_dir,
        input.to_str().unwrap(),
        output_dir.to_str().unwrap(),
    );
    let config = TomlConfig::from_file(&config_path).unwrap();
    assert!(config.validate().is_ok());

    let storage = LocalStorage::new(output_dir.to_str().unwrap().to_string());
    let engine = EtlEngine::new(ElasticityPipeline::new(storage, config));
    let outcome = engine.run().await.unwrap();
    let report = &outcome.report;

    assert_eq!(report.results.len(), 1);
    let beverages = report.result_for("Beverages").unwrap();
    assert!(beverages.result.elasticity < 0.0);
    assert_eq!(beverages.result.sample_size, 5);

    let reasons: Vec<(&str, &str)> = report
        .skipped
        .iter()
        .map(|s| (s.category.as_str(), s.reason.kind()))
        .collect();
    assert_eq!(
        reasons,
        vec![("Frozen", "DegenerateInput"), ("Produce", "NonPositiveValue")]
    );

    assert_eq!(report.scenarios.len(), 1);
    let scenario = &report.scenarios[0].scenario;
    assert_eq!(scenario.convention, RevenueConvention::Additive);
    let expected = 10.0 + beverages.result.elasticity * 10.0;
    assert!((scenario.revenue_change_pct - expected).abs() < 1e-9);

    assert!(output_dir.join(report::RESULTS_CSV).exists());
    assert!(!output_dir.join(report::REPORT_JSON).exists());
}
