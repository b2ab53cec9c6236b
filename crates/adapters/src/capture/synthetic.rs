use product_inspect_application::{ApplicationError, CaptureDevice};
use product_inspect_domain::{pack_rgb, CaptureRequest, Frame};
use tracing::info;

const BELT_COLOR: u32 = 0x3C4048;
const BELT_EDGE_COLOR: u32 = 0x202226;
const BOTTLE_COLOR: u32 = 0xC8D2DC;
const CAP_COLOR: u32 = 0x1E3CDC;
const BOTTLE_SPACING: u32 = 180;
const BOTTLE_WIDTH: u32 = 60;
const CAP_WIDTH: u32 = 36;
const CAP_HEIGHT: u32 = 24;

/// Renders a conveyor with blue-capped bottles sliding left to right.
#[derive(Debug)]
pub struct SyntheticCamera {
    available: bool,
    step_px: u32,
    width: u32,
    height: u32,
    offset: u32,
    ready: bool,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            available: true,
            step_px: 24,
            width: 0,
            height: 0,
            offset: 0,
            ready: false,
        }
    }

    /// A camera whose acquisition is always denied.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn with_step(mut self, step_px: u32) -> Self {
        self.step_px = step_px;
        self
    }

    fn render(&self) -> Frame {
        let mut frame = Frame::filled(self.width, self.height, pack_rgb(24, 26, 30));
        let belt_top = self.height / 5;
        let belt_height = self.height.saturating_sub(belt_top * 2);
        frame.fill_rect(0, belt_top, self.width, belt_height, BELT_COLOR);
        frame.fill_rect(0, belt_top, self.width, 4, BELT_EDGE_COLOR);
        frame.fill_rect(0, belt_top + belt_height.saturating_sub(4), self.width, 4, BELT_EDGE_COLOR);

        let cap_top = belt_top + 10;
        let body_top = cap_top + CAP_HEIGHT;
        let body_height = belt_height.saturating_sub(CAP_HEIGHT + 20);
        let mut left = self.offset % BOTTLE_SPACING;
        while left < self.width {
            frame.fill_rect(left, body_top, BOTTLE_WIDTH, body_height, BOTTLE_COLOR);
            frame.fill_rect(
                left + (BOTTLE_WIDTH - CAP_WIDTH) / 2,
                cap_top,
                CAP_WIDTH,
                CAP_HEIGHT,
                CAP_COLOR,
            );
            left += BOTTLE_SPACING;
        }
        frame
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDevice for SyntheticCamera {
    fn start(&mut self, request: &CaptureRequest) -> Result<(), ApplicationError> {
        if !self.available {
            return Err(ApplicationError::CaptureUnavailable(
                "permission denied by synthetic camera".to_string(),
            ));
        }
        if request.preferred_width == 0 || request.preferred_height == 0 {
            return Err(ApplicationError::CaptureUnavailable(
                "requested resolution must be non-zero".to_string(),
            ));
        }
        self.width = request.preferred_width;
        self.height = request.preferred_height;
        self.offset = 0;
        self.ready = true;
        info!(
            width = self.width,
            height = self.height,
            facing = request.facing.as_str(),
            "synthetic camera started"
        );
        Ok(())
    }

    fn stop(&mut self) {
        self.ready = false;
    }

    fn is_ready(&self) -> bool {
        self.ready
    }

    fn grab_frame(&mut self) -> Option<Frame> {
        if !self.ready {
            return None;
        }
        let frame = self.render();
        self.offset = self.offset.wrapping_add(self.step_px);
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use product_inspect_domain::unpack_rgb;

    use super::*;

    fn qualifies(pixel: u32) -> bool {
        let [r, g, b] = unpack_rgb(pixel).map(f32::from);
        b > 120.0 && b > r * 1.5 && b > g * 1.5
    }

    #[test]
    fn frames_match_requested_resolution_and_show_caps() {
        let mut camera = SyntheticCamera::new();
        camera
            .start(&CaptureRequest::default())
            .expect("start should work");

        let frame = camera.grab_frame().expect("frame");

        assert_eq!((frame.width(), frame.height()), (640, 480));
        assert!(frame.pixels().iter().any(|pixel| qualifies(*pixel)));
        assert!(!qualifies(BOTTLE_COLOR));
        assert!(!qualifies(BELT_COLOR));
    }

    #[test]
    fn scene_moves_between_frames() {
        let mut camera = SyntheticCamera::new().with_step(10);
        camera
            .start(&CaptureRequest::default())
            .expect("start should work");

        let first = camera.grab_frame().expect("frame");
        let second = camera.grab_frame().expect("frame");

        assert_ne!(first, second);
    }

    #[test]
    fn unavailable_camera_is_denied_and_not_ready() {
        let mut camera = SyntheticCamera::unavailable();

        let result = camera.start(&CaptureRequest::default());

        assert!(matches!(result, Err(ApplicationError::CaptureUnavailable(_))));
        assert!(!camera.is_ready());
        assert!(camera.grab_frame().is_none());
    }

    #[test]
    fn stop_releases_the_feed() {
        let mut camera = SyntheticCamera::new();
        camera
            .start(&CaptureRequest::default())
            .expect("start should work");
        camera.stop();

        assert!(!camera.is_ready());
        assert!(camera.grab_frame().is_none());
    }
}
