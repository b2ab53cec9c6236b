use product_inspect_domain::{
    DashboardSummary, Detection, InspectionStatus, Product, ReportTable, TickMetrics,
    UploadReport,
};

pub fn present_dashboard(summary: &DashboardSummary) -> String {
    format!(
        "total={} good={} defective={} pass_rate={}% defect_rate={}% speed={}ms recent={} (good={} defective={})",
        summary.total,
        summary.good,
        summary.bad,
        summary.pass_rate_percent,
        summary.defect_rate_percent,
        summary.speed_ms,
        summary.recent_detections,
        summary.recent_good,
        summary.recent_bad
    )
}

pub fn present_detection_row(detection: &Detection) -> String {
    format!(
        "{}\t{}\t{:.0}%\t{},{}\t{}",
        detection.id,
        detection.classification.as_str(),
        detection.confidence * 100.0,
        detection.region.x,
        detection.region.y,
        detection.timestamp
    )
}

pub fn present_product_row(product: &Product) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        product.id.get(),
        product.name,
        product.product_type,
        product.criteria
    )
}

pub fn present_upload(report: &UploadReport) -> String {
    format!(
        "Successfully uploaded {} {} sample images.",
        report.accepted,
        report.kind.as_str()
    )
}

pub fn present_status(status: &InspectionStatus) -> String {
    format!(
        "inspection active={} camera_ready={}",
        status.active, status.camera_ready
    )
}

pub fn present_metrics(metrics: &TickMetrics) -> String {
    format!(
        "ticks_run={} ticks_idle={} ticks_skipped={} batches={} detections={} last_tick_ms={} p95_tick_ms={}",
        metrics.ticks_run,
        metrics.ticks_idle,
        metrics.ticks_skipped,
        metrics.batches_emitted,
        metrics.detections_emitted,
        optional_ms(metrics.last_tick_ms),
        optional_ms(metrics.p95_tick_ms)
    )
}

/// Renders a report as a plain-text block: title, generation time, a tab-separated grid and the
/// summary lines.
pub fn present_report_table(table: &ReportTable) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + table.summary.len() + 4);
    lines.push(table.title.clone());
    lines.push(format!("Generated: {}", table.generated_at));
    lines.push(table.columns.join("\t"));
    lines.extend(table.rows.iter().map(|row| row.join("\t")));
    lines.push(String::new());
    lines.extend(
        table
            .summary
            .iter()
            .map(|field| format!("{}: {}", field.label, field.value)),
    );
    lines.join("\n")
}

fn optional_ms(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |ms| ms.to_string())
}

#[cfg(test)]
mod tests {
    use product_inspect_domain::{
        Classification, ProductId, Region, SampleKind, SummaryField, TrainingSamples,
    };

    use super::*;

    #[test]
    fn detection_row_shows_percent_confidence() {
        let detection = Detection {
            id: 42,
            region: Region {
                x: 140,
                y: 60,
                width: 100,
                height: 250,
            },
            classification: Classification::Bad,
            confidence: 0.914,
            timestamp: "2026-03-16T10:00:00.000Z".to_string(),
        };

        assert_eq!(
            present_detection_row(&detection),
            "42\tbad\t91%\t140,60\t2026-03-16T10:00:00.000Z"
        );
    }

    #[test]
    fn product_row_is_tab_separated() {
        let product = Product {
            id: ProductId::new(2).expect("valid id"),
            name: "Soda Can".to_string(),
            product_type: "Can".to_string(),
            criteria: "No dents".to_string(),
        };

        assert_eq!(present_product_row(&product), "2\tSoda Can\tCan\tNo dents");
    }

    #[test]
    fn upload_message_names_kind() {
        let report = UploadReport {
            kind: SampleKind::Defective,
            accepted: 3,
            totals: TrainingSamples {
                good: 0,
                defective: 3,
            },
        };

        assert_eq!(
            present_upload(&report),
            "Successfully uploaded 3 defective sample images."
        );
    }

    #[test]
    fn metrics_without_samples_use_placeholders() {
        let line = present_metrics(&TickMetrics::default());

        assert!(line.contains("last_tick_ms=-"));
        assert!(line.contains("p95_tick_ms=-"));
    }

    #[test]
    fn report_table_lists_rows_then_summary() {
        let table = ReportTable {
            title: "Detailed Inspection Log".to_string(),
            generated_at: "3/16/2026, 2:00:00 PM".to_string(),
            columns: vec!["Time".to_string(), "Status".to_string()],
            rows: vec![vec!["2:00:00 PM".to_string(), "Failed".to_string()]],
            summary: vec![SummaryField::new("Pass Rate", "75%")],
        };

        let text = present_report_table(&table);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Detailed Inspection Log");
        assert_eq!(lines[2], "Time\tStatus");
        assert_eq!(lines[3], "2:00:00 PM\tFailed");
        assert_eq!(lines[5], "Pass Rate: 75%");
    }
}
