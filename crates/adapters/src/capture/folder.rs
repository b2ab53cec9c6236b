use std::path::{Path, PathBuf};

use product_inspect_application::{ApplicationError, CaptureDevice};
use product_inspect_domain::{CaptureRequest, Frame};
use tracing::{info, warn};

use crate::fs::{decode_frame, scan_frame_files};

/// Replays the image files of a directory as a looping feed.
#[derive(Debug)]
pub struct ImageFolderCamera {
    folder: PathBuf,
    files: Vec<PathBuf>,
    cursor: usize,
    width: u32,
    height: u32,
    ready: bool,
}

impl ImageFolderCamera {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            files: Vec::new(),
            cursor: 0,
            width: 0,
            height: 0,
            ready: false,
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl CaptureDevice for ImageFolderCamera {
    fn start(&mut self, request: &CaptureRequest) -> Result<(), ApplicationError> {
        let files = scan_frame_files(&self.folder)
            .map_err(|error| ApplicationError::CaptureUnavailable(error.to_string()))?;
        if files.is_empty() {
            return Err(ApplicationError::CaptureUnavailable(format!(
                "no image frames found in {}",
                self.folder.display()
            )));
        }
        if request.preferred_width == 0 || request.preferred_height == 0 {
            return Err(ApplicationError::CaptureUnavailable(
                "requested resolution must be non-zero".to_string(),
            ));
        }

        info!(folder = %self.folder.display(), frames = files.len(), "image folder camera started");
        self.files = files;
        self.cursor = 0;
        self.width = request.preferred_width;
        self.height = request.preferred_height;
        self.ready = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.ready = false;
        self.files.clear();
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    /// Skips undecodable files; the feed is lost once every file has failed in a row.
    fn grab_frame(&mut self) -> Option<Frame> {
        if !self.ready {
            return None;
        }
        for _ in 0..self.files.len() {
            let path = &self.files[self.cursor % self.files.len()];
            self.cursor = (self.cursor + 1) % self.files.len();
            match decode_frame(path, self.width, self.height) {
                Ok(frame) => return Some(frame),
                Err(error) => warn!(path = %path.display(), %error, "skipping unreadable frame"),
            }
        }
        warn!(folder = %self.folder.display(), "no readable frames left, capture lost");
        self.ready = false;
        None
    }
}
