mod pdf;
mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

use product_inspect_application::ApplicationError;

pub use pdf::PdfReportWriter;
pub use xlsx::XlsxReportWriter;

fn part_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

/// Builds the document into a sibling `.part` file and renames it into place,
/// so a failed export never leaves a file at `destination`.
fn write_via_part_file(
    destination: &Path,
    build: impl FnOnce(&Path) -> Result<(), String>,
) -> Result<(), ApplicationError> {
    if let Some(parent) = destination.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|error| ApplicationError::Export(error.to_string()))?;
        }
    }

    let part = part_path(destination);
    if let Err(error) = build(&part) {
        let _ = fs::remove_file(&part);
        return Err(ApplicationError::Export(error));
    }
    fs::rename(&part, destination).map_err(|error| {
        let _ = fs::remove_file(&part);
        ApplicationError::Export(error.to_string())
    })
}
