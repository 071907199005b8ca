use clap::Parser;
use price_elasticity_etl::core::{analysis, report};
use price_elasticity_etl::utils::{logger, validation::Validate};
use price_elasticity_etl::{CliConfig, ElasticityPipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_json);

    tracing::info!("Starting price-elasticity CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let simulate = config.simulate.clone().map(|category| (category, config.change));
    let convention = config.revenue_convention;

    // 創建存儲和管道
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ElasticityPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(outcome) => {
            println!("{}", report::console_table(&outcome.report));
            println!("✅ Analysis completed successfully!");
            println!("📁 Output saved to: {}", outcome.output_path);

            if let Some((category, change)) = simulate {
                match analysis::simulate_for(&outcome.report, &category, change, convention) {
                    Ok(s) => {
                        println!();
                        println!("🎯 {} at {:+.1}% price:", s.category, change);
                        println!("  Price: {:.2} -> {:.2}", s.current_price, s.new_price);
                        println!("  Quantity change: {:+.2}%", s.scenario.quantity_change_pct);
                        println!("  Revenue change: {:+.2}%", s.scenario.revenue_change_pct);
                        println!("  Estimated revenue impact: {:+.2}", s.estimated_revenue_impact);
                        if s.extrapolated {
                            println!("  ⚠️ New price is outside the observed range; projection is unsupported");
                        }
                    }
                    Err(e) => {
                        eprintln!("❌ {}", e.user_friendly_message());
                        eprintln!("💡 {}", e.recovery_suggestion());
                    }
                }
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Analysis failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
