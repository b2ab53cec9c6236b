use std::path::{Path, PathBuf};

use product_inspect_application::ApplicationError;
use walkdir::WalkDir;

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
}

/// Lists decodable frame files under `folder` in path order.
pub fn scan_frame_files(folder: &Path) -> Result<Vec<PathBuf>, ApplicationError> {
    if !folder.is_dir() {
        return Err(ApplicationError::InvalidInput(format!(
            "folder does not exist or is not a directory: {}",
            folder.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(folder).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() || !is_frame_file(entry.path()) {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn only_image_files_are_listed_sorted() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir_all(dir.path().join("line2")).expect("mkdir");
        fs::write(dir.path().join("b.PNG"), b"x").expect("write");
        fs::write(dir.path().join("a.jpg"), b"x").expect("write");
        fs::write(dir.path().join("notes.txt"), b"x").expect("write");
        fs::write(dir.path().join("line2").join("c.jpeg"), b"x").expect("write");

        let files = scan_frame_files(dir.path()).expect("scan");
        let names: Vec<String> = files
            .iter()
            .map(|path| {
                path.strip_prefix(dir.path())
                    .expect("prefix")
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        assert_eq!(names, vec!["a.jpg", "b.PNG", "line2/c.jpeg"]);
    }

    #[test]
    fn missing_folder_is_invalid_input() {
        let result = scan_frame_files(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }
}
