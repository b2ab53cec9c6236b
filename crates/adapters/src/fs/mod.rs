mod clock;
mod frames;
mod scanner;

pub use clock::SystemClock;
pub use frames::{decode_frame, write_png};
pub use scanner::{is_frame_file, scan_frame_files};
