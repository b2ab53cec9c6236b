use std::fs;
use std::path::Path;

use image::io::Reader as ImageReader;
use image::{ImageBuffer, ImageFormat, Rgb};
use product_inspect_application::ApplicationError;
use product_inspect_domain::{pack_rgb, unpack_rgb, Frame};

/// Decodes an image file and nearest-neighbour scales it to `width` x `height`.
pub fn decode_frame(path: &Path, width: u32, height: u32) -> Result<Frame, ApplicationError> {
    if width == 0 || height == 0 {
        return Err(ApplicationError::InvalidInput(
            "frame dimensions must be non-zero".to_string(),
        ));
    }

    let image = ImageReader::open(path)
        .map_err(|error| ApplicationError::Io(error.to_string()))?
        .with_guessed_format()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?
        .decode()
        .map_err(|error| ApplicationError::Decode(error.to_string()))?;
    let source = image.to_rgb8();
    let src_width = source.width() as u64;
    let src_height = source.height() as u64;
    if src_width == 0 || src_height == 0 {
        return Err(ApplicationError::Decode(format!(
            "empty image dimensions for {}",
            path.display()
        )));
    }

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height as u64 {
        let src_y = (y * src_height / height as u64) as u32;
        for x in 0..width as u64 {
            let src_x = (x * src_width / width as u64) as u32;
            let [red, green, blue] = source.get_pixel(src_x, src_y).0;
            pixels.push(pack_rgb(red, green, blue));
        }
    }
    Ok(Frame::new(width, height, pixels)?)
}

pub fn write_png(frame: &Frame, path: &Path) -> Result<(), ApplicationError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|error| ApplicationError::Io(error.to_string()))?;
        }
    }

    let image = ImageBuffer::from_fn(frame.width(), frame.height(), |x, y| {
        Rgb(unpack_rgb(frame.pixel(x, y).unwrap_or_default()))
    });
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|error| ApplicationError::Io(error.to_string()))
}
