mod error;
mod ports;
pub mod report;
mod service;
mod store;
mod use_cases;

pub use error::ApplicationError;
pub use ports::{
    CaptureDevice, Clock, Detector, InspectionRunner, OverlaySurface, ReportWriter, SnapshotStore,
};
pub use service::{ApplicationService, TRAINING_MESSAGE};
pub use store::{InspectionStore, COMPANY_KEY, HISTORY_KEY, STATS_KEY};
pub use use_cases::{
    AddProductCommand, BootstrapCommand, DashboardQuery, DeleteProductCommand,
    ExportReportCommand, InspectionMetricsQuery, InspectionStatusQuery, ListProductsQuery,
    PollInspectionCommand, RecentDetectionsQuery, ReportPreviewQuery, StartInspectionCommand,
    StopInspectionCommand, TrainModelCommand, UpdateProductCommand, UploadSamplesCommand,
};
