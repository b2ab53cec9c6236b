use crate::DomainError;

/// Row-major RGB frame with pixels packed as `0x00RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Frame {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, DomainError> {
        let expected = (width as usize).checked_mul(height as usize);
        if expected != Some(pixels.len()) {
            return Err(DomainError::FrameSizeMismatch {
                width,
                height,
                pixels: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, color: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: u32) {
        if x < self.width && y < self.height {
            let index = y as usize * self.width as usize + x as usize;
            self.pixels[index] = color;
        }
    }

    pub fn fill_rect(&mut self, left: u32, top: u32, width: u32, height: u32, color: u32) {
        for y in top..top.saturating_add(height).min(self.height) {
            for x in left..left.saturating_add(width).min(self.width) {
                self.set_pixel(x, y, color);
            }
        }
    }
}

pub fn unpack_rgb(pixel: u32) -> [u8; 3] {
    [
        ((pixel >> 16) & 0xFF) as u8,
        ((pixel >> 8) & 0xFF) as u8,
        (pixel & 0xFF) as u8,
    ]
}

pub fn pack_rgb(red: u8, green: u8, blue: u8) -> u32 {
    ((red as u32) << 16) | ((green as u32) << 8) | (blue as u32)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    Environment,
    User,
}

impl FacingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub preferred_width: u32,
    pub preferred_height: u32,
    pub facing: FacingMode,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            preferred_width: 640,
            preferred_height: 480,
            facing: FacingMode::Environment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_mismatched_pixel_count() {
        let result = Frame::new(4, 4, vec![0; 15]);
        assert!(matches!(
            result,
            Err(DomainError::FrameSizeMismatch {
                width: 4,
                height: 4,
                pixels: 15
            })
        ));
    }

    #[test]
    fn fill_rect_clips_to_frame() {
        let mut frame = Frame::filled(10, 10, 0);
        frame.fill_rect(8, 8, 5, 5, 0xFFFFFF);
        assert_eq!(frame.pixel(9, 9), Some(0xFFFFFF));
        assert_eq!(frame.pixel(7, 7), Some(0));
        assert_eq!(frame.pixel(10, 10), None);
    }

    #[test]
    fn pack_and_unpack_agree() {
        let packed = pack_rgb(10, 20, 200);
        assert_eq!(packed, 0x0A14C8);
        assert_eq!(unpack_rgb(packed), [10, 20, 200]);
    }
}
