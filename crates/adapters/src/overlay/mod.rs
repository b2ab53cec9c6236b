use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use font8x8::UnicodeFonts;
use product_inspect_application::OverlaySurface;
use product_inspect_domain::{Classification, Detection, Frame};

pub const GOOD_COLOR: u32 = 0x00C853;
pub const BAD_COLOR: u32 = 0xD50000;
const LABEL_COLOR: u32 = 0xFFFFFF;
const OUTLINE_WIDTH: u32 = 2;
const LABEL_WIDTH: u32 = 100;
const LABEL_HEIGHT: u32 = 20;

pub fn classification_color(classification: Classification) -> u32 {
    match classification {
        Classification::Good => GOOD_COLOR,
        Classification::Bad => BAD_COLOR,
    }
}

/// Draws the outline and the `ID: <id> (<class>)` bar above the region.
pub fn annotate(frame: &mut Frame, detection: &Detection) {
    let color = classification_color(detection.classification);
    let region = detection.region;
    draw_outline(frame, region.x, region.y, region.width, region.height, color);

    let bar_top = i64::from(region.y) - i64::from(LABEL_HEIGHT);
    fill_clipped(frame, i64::from(region.x), bar_top, LABEL_WIDTH, LABEL_HEIGHT, color);
    let label = format!(
        "ID: {} ({})",
        detection.id,
        detection.classification.as_str()
    );
    draw_text(frame, i64::from(region.x) + 5, bar_top + 6, &label, LABEL_COLOR);
}

fn draw_outline(frame: &mut Frame, left: u32, top: u32, width: u32, height: u32, color: u32) {
    if width == 0 || height == 0 {
        return;
    }
    let thickness = OUTLINE_WIDTH.min(width).min(height);
    frame.fill_rect(left, top, width, thickness, color);
    frame.fill_rect(left, (top + height).saturating_sub(thickness), width, thickness, color);
    frame.fill_rect(left, top, thickness, height, color);
    frame.fill_rect((left + width).saturating_sub(thickness), top, thickness, height, color);
}

fn fill_clipped(frame: &mut Frame, left: i64, top: i64, width: u32, height: u32, color: u32) {
    for y in top.max(0)..top + i64::from(height) {
        for x in left.max(0)..left + i64::from(width) {
            put_pixel(frame, x, y, color);
        }
    }
}

fn draw_text(frame: &mut Frame, x: i64, y: i64, text: &str, color: u32) {
    let mut cursor_x = x;
    for ch in text.chars() {
        let glyph = font8x8::BASIC_FONTS.get(ch).unwrap_or([0; 8]);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if (bits >> col) & 1 == 1 {
                    put_pixel(frame, cursor_x + col, y + row as i64, color);
                }
            }
        }
        cursor_x += 8;
    }
}

fn put_pixel(frame: &mut Frame, x: i64, y: i64, color: u32) {
    if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
        frame.set_pixel(x, y, color);
    }
}

/// Latest annotated frame, shared between the inspection worker and a viewer.
pub struct SharedOverlay {
    attached: AtomicBool,
    latest: Mutex<Option<Frame>>,
}

impl SharedOverlay {
    pub fn new() -> Self {
        Self {
            attached: AtomicBool::new(true),
            latest: Mutex::new(None),
        }
    }

    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }

    pub fn latest(&self) -> Option<Frame> {
        self.latest.lock().ok().and_then(|frame| frame.clone())
    }

    pub fn clear(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = None;
        }
    }
}

impl Default for SharedOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlaySurface for SharedOverlay {
    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn present(&self, frame: &Frame, detections: &[Detection]) {
        let mut annotated = frame.clone();
        for detection in detections {
            annotate(&mut annotated, detection);
        }
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(annotated);
        }
    }
}

#[cfg(test)]
mod tests {
    use product_inspect_domain::Region;

    use super::*;

    fn detection(x: u32, y: u32, classification: Classification) -> Detection {
        Detection {
            id: 7,
            region: Region {
                x,
                y,
                width: 100,
                height: 250,
            },
            classification,
            confidence: 0.9,
            timestamp: "t".to_string(),
        }
    }

    #[test]
    fn outline_and_label_use_class_color() {
        let mut frame = Frame::filled(640, 480, 0);
        annotate(&mut frame, &detection(100, 100, Classification::Bad));

        assert_eq!(frame.pixel(100, 100), Some(BAD_COLOR));
        assert_eq!(frame.pixel(199, 349), Some(BAD_COLOR));
        assert_eq!(frame.pixel(150, 200), Some(0));
        assert_eq!(frame.pixel(180, 82), Some(BAD_COLOR));
        let label_pixels = (80..100)
            .flat_map(|y| (100..200).map(move |x| (x, y)))
            .filter(|(x, y)| frame.pixel(*x, *y) == Some(LABEL_COLOR))
            .count();
        assert!(label_pixels > 0);
    }

    #[test]
    fn label_near_top_edge_is_clipped() {
        let mut frame = Frame::filled(320, 240, 0);
        annotate(&mut frame, &detection(0, 5, Classification::Good));

        assert_eq!(frame.pixel(0, 0), Some(GOOD_COLOR));
        assert_eq!(frame.pixel(50, 5), Some(GOOD_COLOR));
    }

    #[test]
    fn present_keeps_source_frame_untouched() {
        let overlay = SharedOverlay::new();
        let frame = Frame::filled(320, 240, 0x101010);

        overlay.present(&frame, &[detection(20, 40, Classification::Good)]);

        let latest = overlay.latest().expect("annotated frame");
        assert_eq!(latest.pixel(20, 40), Some(GOOD_COLOR));
        assert_eq!(frame.pixel(20, 40), Some(0x101010));
    }

    #[test]
    fn detaching_is_visible_to_the_worker() {
        let overlay = SharedOverlay::new();
        assert!(overlay.is_attached());
        overlay.set_attached(false);
        assert!(!overlay.is_attached());
    }
}
