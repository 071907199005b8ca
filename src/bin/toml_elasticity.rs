use anyhow::Context;
use clap::Parser;
use price_elasticity_etl::core::report;
use price_elasticity_etl::core::ConfigProvider;
use price_elasticity_etl::utils::{logger, validation::Validate};
use price_elasticity_etl::{ElasticityPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "toml-elasticity")]
#[command(about = "Price elasticity analysis driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "elasticity-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the input CSV from config
    #[arg(long)]
    input: Option<String>,

    /// Dry run - show what would be analysed without reading data
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    let verbose = args.verbose || config.log_level() == Some("debug");
    logger::init_logger(verbose, args.log_json);

    tracing::info!("🚀 Starting TOML-based elasticity analysis");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(input) = &args.input {
        config.source.input_path = Some(input.clone());
        tracing::info!("🔧 Input overridden to: {}", input);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ElasticityPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            println!("{}", report::console_table(&outcome.report));
            let summary = &outcome.report.summary;
            println!(
                "Inelastic: {}/{} ({:.1}%), significant: {}",
                summary.inelastic_categories,
                summary.total_categories,
                summary.inelastic_pct,
                summary.significant_results
            );
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Analysis: {} v{}",
        config.analysis.name, config.analysis.version
    );
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Min Observations: {}", config.min_observations());
    println!("  Parallel: {}", config.parallel());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 欄位映射分析
    let columns = config.columns();
    println!("🔄 Column Mapping:");
    println!("  price    <- {}", columns.price);
    println!("  sales    <- {}", columns.sales);
    println!("  category <- {}", columns.category);
    println!("  Non-positive rows: {:?}", config.non_positive_policy());

    // 估計設定
    println!();
    println!("🧮 Estimation:");
    println!("  Model: ln(sales) = b0 + b1 * ln(price), OLS per category");
    println!("  Min observations per category: {}", config.min_observations());
    println!("  Significance level: {}", config.significance_level());
    println!("  Unit-elastic tolerance: {}", config.unit_tolerance());

    // 模擬設定
    println!();
    println!("🎯 Simulation:");
    println!("  Price changes: {:?}%", config.price_changes());
    println!("  Revenue convention: {:?}", config.revenue_convention());
    println!("  Assumes constant elasticity; out-of-range prices are flagged");

    // 輸出分析
    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    if let Some(bundle) = config.bundle_name() {
        println!("  Compression: {} (ZIP)", bundle);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
