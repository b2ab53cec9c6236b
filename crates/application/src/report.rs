use std::fmt::Display;

use chrono::{DateTime, TimeDelta, TimeZone};
use product_inspect_domain::{Counters, ReportFormat, ReportTable, SummaryField};
use rand::Rng;

pub const SAMPLE_LOG_ROWS: usize = 10;
pub const SAMPLE_PRODUCT: &str = "Water Bottle 500ml";
const SAMPLE_SPACING_MINUTES: i64 = 5;
const SAMPLE_ISSUE: &str = "Label misalignment";

/// One synthesized row of the inspection log that reports are built from.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleLogEntry {
    pub date: String,
    pub time: String,
    pub product_id: u32,
    pub product: String,
    pub passed: bool,
    pub issue: String,
    pub confidence: f64,
}

impl SampleLogEntry {
    pub fn status(&self) -> &'static str {
        if self.passed {
            "Passed"
        } else {
            "Failed"
        }
    }

    fn confidence_text(&self) -> String {
        format!("{:.2}", self.confidence)
    }
}

pub fn sample_log<Tz, R>(now: &DateTime<Tz>, rng: &mut R) -> Vec<SampleLogEntry>
where
    Tz: TimeZone,
    Tz::Offset: Display,
    R: Rng,
{
    (0..SAMPLE_LOG_ROWS)
        .map(|index| {
            let at = now.clone() - TimeDelta::minutes(SAMPLE_SPACING_MINUTES * index as i64);
            let passed = index % 3 != 0;
            SampleLogEntry {
                date: at.format("%-m/%-d/%Y").to_string(),
                time: at.format("%-I:%M:%S %p").to_string(),
                product_id: 30 - index as u32,
                product: SAMPLE_PRODUCT.to_string(),
                passed,
                issue: if passed { "-" } else { SAMPLE_ISSUE }.to_string(),
                confidence: 0.8 + rng.gen::<f64>() * 0.2,
            }
        })
        .collect()
}

pub fn build_report<Tz, R>(
    format: ReportFormat,
    counters: &Counters,
    now: &DateTime<Tz>,
    rng: &mut R,
) -> ReportTable
where
    Tz: TimeZone,
    Tz::Offset: Display,
    R: Rng,
{
    let log = sample_log(now, rng);
    let generated_at = now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string();
    match format {
        ReportFormat::Spreadsheet => spreadsheet_table(counters, &log, generated_at),
        ReportFormat::Pdf => pdf_table(counters, &log, generated_at),
    }
}

/// Rows shown by the reports view and `report show`.
pub fn log_preview_table<Tz, R>(counters: &Counters, now: &DateTime<Tz>, rng: &mut R) -> ReportTable
where
    Tz: TimeZone,
    Tz::Offset: Display,
    R: Rng,
{
    let log = sample_log(now, rng);
    ReportTable {
        title: "Detailed Inspection Log".to_string(),
        generated_at: now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
        columns: columns(&[
            "Time",
            "Product ID",
            "Product Type",
            "Status",
            "Issue (if any)",
            "Confidence",
        ]),
        rows: log
            .iter()
            .map(|entry| {
                vec![
                    entry.time.clone(),
                    entry.product_id.to_string(),
                    entry.product.clone(),
                    entry.status().to_string(),
                    entry.issue.clone(),
                    entry.confidence_text(),
                ]
            })
            .collect(),
        summary: vec![
            SummaryField::new("Total Inspected Products", counters.total.to_string()),
            SummaryField::new("Pass Rate", format!("{}%", counters.pass_rate_percent())),
            SummaryField::new("Defect Rate", format!("{}%", counters.defect_rate_percent())),
        ],
    }
}

fn spreadsheet_table(counters: &Counters, log: &[SampleLogEntry], generated_at: String) -> ReportTable {
    ReportTable {
        title: "Inspection Report".to_string(),
        generated_at,
        columns: columns(&[
            "Date",
            "Time",
            "Product ID",
            "Product Type",
            "Status",
            "Issue",
            "Confidence",
        ]),
        rows: log
            .iter()
            .map(|entry| {
                vec![
                    entry.date.clone(),
                    entry.time.clone(),
                    entry.product_id.to_string(),
                    entry.product.clone(),
                    entry.status().to_string(),
                    entry.issue.clone(),
                    entry.confidence_text(),
                ]
            })
            .collect(),
        summary: vec![
            SummaryField::new("Total Inspected", counters.total.to_string()),
            SummaryField::new("Good Products", counters.good.to_string()),
            SummaryField::new("Defective Products", counters.bad.to_string()),
            SummaryField::new("Pass Rate", format!("{}%", counters.pass_rate_percent())),
        ],
    }
}

fn pdf_table(counters: &Counters, log: &[SampleLogEntry], generated_at: String) -> ReportTable {
    ReportTable {
        title: "Product Inspection Report".to_string(),
        generated_at,
        columns: columns(&["Time", "ID", "Product", "Status", "Issue"]),
        rows: log
            .iter()
            .map(|entry| {
                vec![
                    entry.time.clone(),
                    entry.product_id.to_string(),
                    entry.product.clone(),
                    entry.status().to_string(),
                    entry.issue.clone(),
                ]
            })
            .collect(),
        summary: vec![
            SummaryField::new("Total Inspected", counters.total.to_string()),
            SummaryField::new("Pass Rate", format!("{}%", counters.pass_rate_percent())),
            SummaryField::new("Defect Rate", format!("{}%", counters.defect_rate_percent())),
        ],
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
