use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use product_inspect_domain::{
    CaptureRequest, Detection, DetectionBatch, Frame, InspectionStatus, ReportFormat, ReportTable,
    TickMetrics,
};

use crate::ApplicationError;

/// Key-value persistence for the three state slices.
pub trait SnapshotStore {
    fn initialize(&self) -> Result<(), ApplicationError>;

    fn load(&self, key: &str) -> Result<Option<String>, ApplicationError>;

    fn save(&self, key: &str, value: &str, updated_at: &str) -> Result<(), ApplicationError>;
}

pub trait CaptureDevice: Send {
    fn start(&mut self, request: &CaptureRequest) -> Result<(), ApplicationError>;

    fn stop(&mut self);

    fn is_ready(&self) -> bool;

    fn grab_frame(&mut self) -> Option<Frame>;
}

pub trait Detector: Send {
    fn classify(&mut self, frame: &Frame, captured_at: &str) -> Vec<Detection>;
}

/// Render target for annotated frames. Ticks are idle while it is detached.
pub trait OverlaySurface: Send + Sync {
    fn is_attached(&self) -> bool;

    fn present(&self, frame: &Frame, detections: &[Detection]);
}

pub trait InspectionRunner {
    fn start(&self, request: CaptureRequest) -> Result<(), ApplicationError>;

    fn stop(&self) -> Result<(), ApplicationError>;

    fn try_receive_batch(&self) -> Result<Option<DetectionBatch>, ApplicationError>;

    fn status(&self) -> InspectionStatus;

    fn metrics(&self) -> Result<TickMetrics, ApplicationError>;
}

pub trait ReportWriter {
    fn format(&self) -> ReportFormat;

    fn write(&self, table: &ReportTable, destination: &Path) -> Result<(), ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn now_timestamp_string(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
