use std::path::Path;

use product_inspect_application::{ApplicationError, ReportWriter};
use product_inspect_domain::{ReportFormat, ReportTable};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::write_via_part_file;

#[derive(Debug, Default)]
pub struct XlsxReportWriter;

impl ReportWriter for XlsxReportWriter {
    fn format(&self) -> ReportFormat {
        ReportFormat::Spreadsheet
    }

    fn write(&self, table: &ReportTable, destination: &Path) -> Result<(), ApplicationError> {
        write_via_part_file(destination, |part| {
            build_workbook(table)
                .and_then(|mut workbook| workbook.save(part))
                .map_err(|error| error.to_string())
        })
    }
}

fn build_workbook(table: &ReportTable) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(table.title.as_str())?;

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &bold)?;
        worksheet.set_column_width(col as u16, column_width(table, col))?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            write_cell(worksheet, index as u32 + 1, col as u16, value)?;
        }
    }

    // One blank row between the log and the summary block.
    let summary_top = table.rows.len() as u32 + 2;
    worksheet.write_string_with_format(summary_top, 0, "Summary Statistics", &bold)?;
    for (offset, field) in table.summary.iter().enumerate() {
        let row = summary_top + 1 + offset as u32;
        worksheet.write_string(row, 0, field.label.as_str())?;
        write_cell(worksheet, row, 1, &field.value)?;
    }

    Ok(workbook)
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &str) -> Result<(), XlsxError> {
    match value.parse::<f64>() {
        Ok(number) => worksheet.write_number(row, col, number)?,
        Err(_) => worksheet.write_string(row, col, value)?,
    };
    Ok(())
}

fn column_width(table: &ReportTable, col: usize) -> f64 {
    let widest = table
        .rows
        .iter()
        .filter_map(|row| row.get(col))
        .chain(table.columns.get(col))
        .map(|value| value.chars().count())
        .max()
        .unwrap_or(8);
    (widest as f64 + 2.0).max(10.0)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use product_inspect_domain::SummaryField;
    use tempfile::TempDir;

    use super::*;

    fn table(title: &str) -> ReportTable {
        ReportTable {
            title: title.to_string(),
            generated_at: "3/16/2026, 2:00:00 PM".to_string(),
            columns: vec!["Date".to_string(), "Product ID".to_string(), "Status".to_string()],
            rows: vec![
                vec!["3/16/2026".to_string(), "30".to_string(), "Failed".to_string()],
                vec!["3/16/2026".to_string(), "29".to_string(), "Passed".to_string()],
            ],
            summary: vec![
                SummaryField::new("Total Inspected", "12"),
                SummaryField::new("Pass Rate", "75%"),
            ],
        }
    }

    #[test]
    fn writes_workbook_and_removes_part_file() {
        let dir = TempDir::new().expect("tempdir");
        let destination = dir.path().join("reports").join("Inspection_Report_2026-03-16.xlsx");

        XlsxReportWriter
            .write(&table("Inspection Report"), &destination)
            .expect("export should work");

        let bytes = fs::read(&destination).expect("read");
        assert_eq!(&bytes[..2], b"PK");
        let leftovers: Vec<_> = fs::read_dir(destination.parent().expect("parent"))
            .expect("read dir")
            .collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn invalid_sheet_name_fails_without_output() {
        let dir = TempDir::new().expect("tempdir");
        let destination = dir.path().join("report.xlsx");

        let result = XlsxReportWriter.write(&table("Inspection [draft]"), &destination);

        assert!(matches!(result, Err(ApplicationError::Export(_))));
        assert!(!destination.exists());
        assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
    }

    #[test]
    fn column_width_tracks_longest_value() {
        let table = table("Inspection Report");
        assert_eq!(column_width(&table, 1), 12.0);
        assert_eq!(column_width(&table, 2), 10.0);
    }
}
