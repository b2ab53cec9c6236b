#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    Spreadsheet,
    Pdf,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Pdf => "pdf",
        }
    }

    pub fn file_name(self, date: &str) -> String {
        format!("Inspection_Report_{date}.{}", self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryField {
    pub label: String,
    pub value: String,
}

impl SummaryField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Flat table handed to a document writer: header, rows and named summary fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub title: String,
    pub generated_at: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub summary: Vec<SummaryField>,
}
