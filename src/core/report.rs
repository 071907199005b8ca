use crate::domain::model::{AnalysisReport, ClassifiedResult, SkippedCategory};
use crate::utils::error::{ElasticityError, Result};
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const RESULTS_CSV: &str = "elasticity_results.csv";
pub const SKIPPED_CSV: &str = "skipped_categories.csv";
pub const SCENARIOS_CSV: &str = "price_scenarios.csv";
pub const REPORT_JSON: &str = "report.json";

/// A named file produced by the reporter.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub name: &'static str,
    pub contents: Vec<u8>,
}

#[derive(Serialize)]
struct ResultRow<'a> {
    category: &'a str,
    elasticity: f64,
    intercept: f64,
    std_error: f64,
    t_statistic: f64,
    p_value: f64,
    r_squared: f64,
    num_products: usize,
    avg_price: f64,
    median_price: f64,
    min_price: f64,
    max_price: f64,
    total_sales: f64,
    demand_class: String,
    demand_type: String,
    can_increase_price: &'static str,
    significant: bool,
}

impl<'a> From<&'a ClassifiedResult> for ResultRow<'a> {
    fn from(c: &'a ClassifiedResult) -> Self {
        let r = &c.result;
        Self {
            category: &r.category,
            elasticity: r.elasticity,
            intercept: r.intercept,
            std_error: r.std_error,
            t_statistic: r.t_statistic,
            p_value: r.p_value,
            r_squared: r.r_squared,
            num_products: r.sample_size,
            avg_price: r.avg_price,
            median_price: r.median_price,
            min_price: r.min_price,
            max_price: r.max_price,
            total_sales: r.total_sales,
            demand_class: c.demand_class.to_string(),
            demand_type: c.demand_band.to_string(),
            can_increase_price: if c.can_increase_price { "Yes" } else { "No" },
            significant: c.significant,
        }
    }
}

#[derive(Serialize)]
struct SkippedRow<'a> {
    category: &'a str,
    reason: &'static str,
    detail: String,
}

impl<'a> From<&'a SkippedCategory> for SkippedRow<'a> {
    fn from(s: &'a SkippedCategory) -> Self {
        Self {
            category: &s.category,
            reason: s.reason.kind(),
            detail: s.reason.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ScenarioRow<'a> {
    category: &'a str,
    elasticity: f64,
    price_change_pct: f64,
    quantity_change_pct: f64,
    revenue_change_pct: f64,
    current_price: f64,
    new_price: f64,
    current_total_sales: f64,
    estimated_revenue_impact: f64,
    extrapolated: bool,
}

fn write_csv<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ElasticityError::IoError(e.into_error()))
}

pub fn results_csv(report: &AnalysisReport) -> Result<Vec<u8>> {
    write_csv(report.results.iter().map(ResultRow::from))
}

pub fn skipped_csv(report: &AnalysisReport) -> Result<Vec<u8>> {
    write_csv(report.skipped.iter().map(SkippedRow::from))
}

pub fn scenarios_csv(report: &AnalysisReport) -> Result<Vec<u8>> {
    write_csv(report.scenarios.iter().map(|s| ScenarioRow {
        category: &s.category,
        elasticity: s.scenario.elasticity,
        price_change_pct: s.scenario.price_change_pct,
        quantity_change_pct: s.scenario.quantity_change_pct,
        revenue_change_pct: s.scenario.revenue_change_pct,
        current_price: s.current_price,
        new_price: s.new_price,
        current_total_sales: s.current_total_sales,
        estimated_revenue_impact: s.estimated_revenue_impact,
        extrapolated: s.extrapolated,
    }))
}

pub fn report_json(report: &AnalysisReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

/// Renders the files selected by `formats` ("csv", "json").
pub fn render(report: &AnalysisReport, formats: &[String]) -> Result<Vec<ReportFile>> {
    let mut files = Vec::new();
    if formats.iter().any(|f| f == "csv") {
        files.push(ReportFile {
            name: RESULTS_CSV,
            contents: results_csv(report)?,
        });
        files.push(ReportFile {
            name: SKIPPED_CSV,
            contents: skipped_csv(report)?,
        });
        files.push(ReportFile {
            name: SCENARIOS_CSV,
            contents: scenarios_csv(report)?,
        });
    }
    if formats.iter().any(|f| f == "json") {
        files.push(ReportFile {
            name: REPORT_JSON,
            contents: report_json(report)?,
        });
    }
    Ok(files)
}

pub fn bundle(files: &[ReportFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file::<_, ()>(file.name, FileOptions::default())?;
        zip.write_all(&file.contents)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Fixed-width console table of fitted and skipped categories.
pub fn console_table(report: &AnalysisReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<28} {:>10} {:>8} {:>8} {:>6}  {:<17} {}\n",
        "Category", "Elasticity", "p-value", "R²", "n", "Demand", "Raise price?"
    ));
    for c in &report.results {
        let r = &c.result;
        out.push_str(&format!(
            "{:<28} {:>10.4} {:>8.4} {:>8.4} {:>6}  {:<17} {}\n",
            r.category,
            r.elasticity,
            r.p_value,
            r.r_squared,
            r.sample_size,
            c.demand_band.to_string(),
            if c.can_increase_price { "Yes" } else { "No" }
        ));
    }
    let summary = &report.summary;
    if !summary.pricing_opportunities.is_empty() {
        out.push_str(&format!(
            "\nPricing opportunities: {}\n",
            summary.pricing_opportunities.join(", ")
        ));
    }
    if !summary.price_sensitive.is_empty() {
        out.push_str(&format!(
            "Price sensitive: {}\n",
            summary.price_sensitive.join(", ")
        ));
    }
    if !report.skipped.is_empty() {
        out.push_str("\nSkipped categories:\n");
        for s in &report.skipped {
            out.push_str(&format!("  {:<26} {}\n", s.category, s.reason));
        }
    }
    out
}
