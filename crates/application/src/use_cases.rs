use std::path::PathBuf;

use product_inspect_domain::{CaptureRequest, ProductDraft, ProductId, ReportFormat, SampleKind};

#[derive(Debug, Clone, Default)]
pub struct BootstrapCommand;

#[derive(Debug, Clone, Default)]
pub struct DashboardQuery;

#[derive(Debug, Clone, Copy)]
pub struct RecentDetectionsQuery {
    pub limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ListProductsQuery;

#[derive(Debug, Clone)]
pub struct AddProductCommand {
    pub draft: ProductDraft,
}

#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub id: ProductId,
    pub draft: ProductDraft,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteProductCommand {
    pub id: ProductId,
    pub confirmed: bool,
}

#[derive(Debug, Clone)]
pub struct UploadSamplesCommand {
    pub kind: SampleKind,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct TrainModelCommand;

#[derive(Debug, Clone, Copy, Default)]
pub struct StartInspectionCommand {
    pub request: CaptureRequest,
}

#[derive(Debug, Clone, Default)]
pub struct StopInspectionCommand;

#[derive(Debug, Clone, Default)]
pub struct PollInspectionCommand;

#[derive(Debug, Clone, Default)]
pub struct InspectionStatusQuery;

#[derive(Debug, Clone, Default)]
pub struct InspectionMetricsQuery;

#[derive(Debug, Clone)]
pub struct ExportReportCommand {
    pub format: ReportFormat,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ReportPreviewQuery;
