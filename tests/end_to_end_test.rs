use price_elasticity_etl::core::report;
use price_elasticity_etl::domain::model::{NonPositivePolicy, RevenueConvention};
use price_elasticity_etl::{CliConfig, DemandClass, ElasticityPipeline, EtlEngine, LocalStorage};
use std::fmt::Write as _;
use tempfile::TempDir;

/// Deterministic generator so the synthetic data is identical on every run.
struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

const GENERATED: [(&str, f64, f64); 3] = [
    ("Dairy", -0.9, 1000.0),
    ("Seafood", -0.4, 400.0),
    ("Snack Foods", -1.6, 9000.0),
];

fn synthetic_csv() -> String {
    let mut rng = Lcg(42);
    let mut csv = String::from("Item_Identifier,Item_Type,Item_MRP,Item_Outlet_Sales\n");
    for (category, elasticity, scale) in GENERATED {
        for i in 0..150 {
            let price = 5.0 + 200.0 * rng.next_f64();
            let noise = 1.0 + 0.2 * (rng.next_f64() - 0.5);
            let sales = scale * price.powf(elasticity) * noise;
            writeln!(csv, "ID{:04},{},{},{}", i, category, price, sales).unwrap();
        }
    }
    // rows the loader has to clean out
    csv.push_str("BAD1,Dairy,,120.5\n");
    csv.push_str("BAD2,Dairy,45.0,0\n");
    csv.push_str("TINY1,Tobacco,12.0,30.0\n");
    csv.push_str("TINY2,Tobacco,14.0,25.0\n");
    csv
}

fn cli_config(input: String, output_path: String) -> CliConfig {
    CliConfig {
        input,
        output_path,
        price_col: "Item_MRP".to_string(),
        sales_col: "Item_Outlet_Sales".to_string(),
        category_col: "Item_Type".to_string(),
        min_observations: 10,
        price_changes: vec![5.0, -5.0],
        unit_tolerance: 0.0,
        significance_level: 0.05,
        non_positive: NonPositivePolicy::Drop,
        revenue_convention: RevenueConvention::Multiplicative,
        parallel: false,
        output_formats: vec!["csv".to_string(), "json".to_string()],
        bundle: Some("elasticity_report.zip".to_string()),
        simulate: None,
        change: 5.0,
        verbose: false,
        monitor: false,
        log_json: false,
    }
}

#[tokio::test]
async fn test_recovers_generated_elasticities() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("retail.csv");
    std::fs::write(&input, synthetic_csv()).unwrap();
    let output_path = temp_dir.path().join("out").to_str().unwrap().to_string();

    let config = cli_config(input.to_str().unwrap().to_string(), output_path.clone());
    let storage = LocalStorage::new(output_path.clone());
    let engine = EtlEngine::new(ElasticityPipeline::new(storage, config));

    let outcome = engine.run().await.unwrap();
    let report = &outcome.report;

    assert_eq!(report.load_summary.original_size, 454);
    assert_eq!(report.load_summary.removed_records, 2);

    for (category, elasticity, _) in GENERATED {
        let fitted = report.result_for(category).unwrap();
        assert!(
            (fitted.result.elasticity - elasticity).abs() < 0.05,
            "{}: fitted {} vs generated {}",
            category,
            fitted.result.elasticity,
            elasticity
        );
        assert!(fitted.significant);
        assert!((0.0..=1.0).contains(&fitted.result.r_squared));
        assert!((0.0..=1.0).contains(&fitted.result.p_value));
    }

    let by_category = report.by_category();
    assert_eq!(by_category["Dairy"].demand_class, DemandClass::Inelastic);
    assert_eq!(by_category["Seafood"].demand_class, DemandClass::Inelastic);
    assert_eq!(by_category["Snack Foods"].demand_class, DemandClass::Elastic);

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].category, "Tobacco");
    assert_eq!(report.skipped[0].reason.kind(), "InsufficientData");

    assert_eq!(report.scenarios.len(), 3 * 2);
    assert_eq!(report.summary.total_categories, 3);
    assert_eq!(report.summary.elastic_categories, 1);

    let opportunities = &report.summary.pricing_opportunities;
    assert_eq!(opportunities.len(), 2);
    assert!(opportunities.contains(&"Dairy".to_string()));
    assert!(opportunities.contains(&"Seafood".to_string()));
    assert_eq!(report.summary.price_sensitive, vec!["Snack Foods"]);
}

#[tokio::test]
async fn test_writes_report_files_and_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("retail.csv");
    std::fs::write(&input, synthetic_csv()).unwrap();
    let output_dir = temp_dir.path().join("out");
    let output_path = output_dir.to_str().unwrap().to_string();

    let config = cli_config(input.to_str().unwrap().to_string(), output_path.clone());
    let storage = LocalStorage::new(output_path.clone());
    let engine = EtlEngine::new(ElasticityPipeline::new(storage, config));
    let outcome = engine.run().await.unwrap();

    assert!(outcome.output_path.ends_with("elasticity_report.zip"));
    for name in [
        report::RESULTS_CSV,
        report::SKIPPED_CSV,
        report::SCENARIOS_CSV,
        report::REPORT_JSON,
        "elasticity_report.zip",
    ] {
        assert!(output_dir.join(name).exists(), "missing {}", name);
    }

    let skipped = std::fs::read_to_string(output_dir.join(report::SKIPPED_CSV)).unwrap();
    assert!(skipped.contains("Tobacco,InsufficientData"));

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output_dir.join(report::REPORT_JSON)).unwrap())
            .unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
    assert!(json["generated_at"].is_string());

    let zip_data = std::fs::read(output_dir.join("elasticity_report.zip")).unwrap();
    let archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&report::RESULTS_CSV));
    assert!(names.contains(&report::REPORT_JSON));
}

#[tokio::test]
async fn test_parallel_run_matches_sequential() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("retail.csv");
    std::fs::write(&input, synthetic_csv()).unwrap();
    let input = input.to_str().unwrap().to_string();

    let mut outcomes = Vec::new();
    for parallel in [false, true] {
        let output_path = temp_dir
            .path()
            .join(format!("out-{}", parallel))
            .to_str()
            .unwrap()
            .to_string();
        let mut config = cli_config(input.clone(), output_path.clone());
        config.parallel = parallel;
        config.bundle = None;
        let engine = EtlEngine::new(ElasticityPipeline::new(LocalStorage::new(output_path), config));
        outcomes.push(engine.run().await.unwrap());
    }

    assert_eq!(outcomes[0].report.results, outcomes[1].report.results);
    assert_eq!(outcomes[0].report.skipped, outcomes[1].report.skipped);
}
