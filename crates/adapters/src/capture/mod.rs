mod folder;
mod synthetic;

pub use folder::ImageFolderCamera;
pub use synthetic::SyntheticCamera;
