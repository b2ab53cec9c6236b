pub mod capture;
pub mod detector;
pub mod export;
pub mod fs;
pub mod inspection;
pub mod migrations;
pub mod overlay;
pub mod presenters;
pub mod sqlite;

pub use capture::{ImageFolderCamera, SyntheticCamera};
pub use detector::ColorThresholdDetector;
pub use export::{PdfReportWriter, XlsxReportWriter};
pub use fs::{decode_frame, scan_frame_files, write_png, SystemClock};
pub use inspection::{BackgroundInspectionRunner, TickSchedule};
pub use overlay::{annotate, classification_color, SharedOverlay};
pub use presenters::{
    present_dashboard, present_detection_row, present_metrics, present_product_row,
    present_report_table, present_status, present_upload,
};
pub use sqlite::SqliteSnapshotStore;
