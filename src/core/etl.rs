use crate::core::Pipeline;
use crate::domain::model::AnalysisReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What a completed run hands back to the caller.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: AnalysisReport,
    pub output_path: String,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("Starting elasticity analysis...");
        self.monitor.log_stats("Start");

        // Extract
        tracing::info!("📥 Loading observations...");
        let dataset = self.pipeline.extract().await?;
        let load = &dataset.load_summary;
        tracing::info!(
            "Loaded {} rows, {} kept after cleaning ({} removed, {:.1}%)",
            load.original_size,
            load.cleaned_size,
            load.removed_records,
            load.removal_pct
        );
        self.monitor.log_stats("Extract");

        // Transform
        tracing::info!("🧮 Estimating elasticity by category...");
        let report = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "Fitted {} categories, skipped {}",
            report.results.len(),
            report.skipped.len()
        );
        self.monitor.log_stats("Transform");

        // Load
        tracing::info!("💾 Writing report...");
        let output_path = self.pipeline.load(&report).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunOutcome {
            report,
            output_path,
        })
    }
}
