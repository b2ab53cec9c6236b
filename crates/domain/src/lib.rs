mod detection;
mod error;
mod frame;
mod inspection;
mod product;
mod report;

pub use detection::{
    Classification, Counters, Detection, DetectionBatch, DetectionHistory, Region,
    RECENT_HISTORY_LIMIT,
};
pub use error::DomainError;
pub use frame::{pack_rgb, unpack_rgb, CaptureRequest, FacingMode, Frame};
pub use inspection::{DashboardSummary, InspectionStatus, TickMetrics};
pub use product::{
    CompanyProfile, Product, ProductDraft, ProductId, SampleKind, TrainingSamples, UploadReport,
};
pub use report::{ReportFormat, ReportTable, SummaryField};
