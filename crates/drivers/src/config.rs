use std::path::PathBuf;
use std::time::Duration;

use product_inspect_domain::CaptureRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    Synthetic,
    Folder(PathBuf),
}

impl FrameSource {
    /// `synthetic` selects the built-in conveyor; anything else is read as a frame folder.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("synthetic") {
            Self::Synthetic
        } else {
            Self::Folder(PathBuf::from(value))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Synthetic => "synthetic conveyor".to_string(),
            Self::Folder(path) => format!("image folder {}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub snapshot_path: PathBuf,
    pub report_dir: PathBuf,
    pub tick_interval_ms: u64,
    pub capture: CaptureRequest,
    pub frame_source: FrameSource,
}

impl AppConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("inspection.sqlite3"),
            report_dir: PathBuf::from("reports"),
            tick_interval_ms: 1000,
            capture: CaptureRequest::default(),
            frame_source: FrameSource::Synthetic,
        }
    }
}
