use product_inspect_application::Detector;
use product_inspect_domain::{unpack_rgb, Classification, Detection, Frame, Region};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const SCAN_STRIDE: u32 = 20;
pub const REGION_WIDTH: u32 = 100;
pub const REGION_HEIGHT: u32 = 250;
pub const HIT_SKIP: u32 = 100;
pub const DEDUP_DISTANCE: u32 = 50;
const GOOD_THRESHOLD: f64 = 0.2;

pub fn is_marker_pixel(pixel: u32) -> bool {
    let [red, green, blue] = unpack_rgb(pixel).map(f32::from);
    blue > 120.0 && blue > red * 1.5 && blue > green * 1.5
}

/// Samples the frame on a [`SCAN_STRIDE`] grid and proposes a fixed-size region at every hit.
pub fn propose_regions(frame: &Frame) -> Vec<Region> {
    let mut regions = Vec::new();
    for y in (0..frame.height()).step_by(SCAN_STRIDE as usize) {
        let mut x = 0;
        while x < frame.width() {
            if frame.pixel(x, y).is_some_and(is_marker_pixel) {
                regions.push(Region {
                    x,
                    y,
                    width: REGION_WIDTH,
                    height: REGION_HEIGHT,
                });
                x += HIT_SKIP;
            }
            x += SCAN_STRIDE;
        }
    }
    regions
}

/// Keeps the first region of every horizontal cluster closer than [`DEDUP_DISTANCE`].
pub fn dedupe_regions(regions: &[Region]) -> Vec<Region> {
    let mut accepted: Vec<Region> = Vec::new();
    for region in regions {
        if accepted
            .iter()
            .all(|existing| region.x.abs_diff(existing.x) >= DEDUP_DISTANCE)
        {
            accepted.push(*region);
        }
    }
    accepted
}

/// Color-threshold scan that labels every region pseudo-randomly.
pub struct ColorThresholdDetector {
    rng: StdRng,
}

impl ColorThresholdDetector {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn label(&mut self, region: Region, captured_at: &str) -> Detection {
        let id = self.rng.gen_range(0..100);
        let classification = if self.rng.gen::<f64>() > GOOD_THRESHOLD {
            Classification::Good
        } else {
            Classification::Bad
        };
        let confidence = 0.85 + self.rng.gen::<f64>() * 0.15;
        Detection {
            id,
            region,
            classification,
            confidence: ((confidence * 100.0).round() / 100.0) as f32,
            timestamp: captured_at.to_string(),
        }
    }
}

impl Default for ColorThresholdDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ColorThresholdDetector {
    fn classify(&mut self, frame: &Frame, captured_at: &str) -> Vec<Detection> {
        dedupe_regions(&propose_regions(frame))
            .into_iter()
            .map(|region| self.label(region, captured_at))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use product_inspect_domain::pack_rgb;

    use super::*;

    const BLUE: u32 = 0x1E3CDC;
    const GRAY: u32 = 0x808080;

    fn region(x: u32, y: u32) -> Region {
        Region {
            x,
            y,
            width: REGION_WIDTH,
            height: REGION_HEIGHT,
        }
    }

    #[test]
    fn threshold_requires_dominant_bright_blue() {
        assert!(is_marker_pixel(pack_rgb(30, 60, 220)));
        assert!(!is_marker_pixel(pack_rgb(0, 0, 120)));
        assert!(!is_marker_pixel(pack_rgb(100, 100, 149)));
        assert!(!is_marker_pixel(pack_rgb(200, 210, 220)));
    }

    #[test]
    fn single_block_yields_one_region_at_first_sampled_hit() {
        let mut frame = Frame::filled(640, 480, GRAY);
        frame.fill_rect(205, 107, 30, 30, BLUE);

        let mut detector = ColorThresholdDetector::with_seed(7);
        let detections = detector.classify(&frame, "2026-03-16T10:00:00.000Z");

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].region, region(220, 120));
        assert_eq!(detections[0].timestamp, "2026-03-16T10:00:00.000Z");
    }

    #[test]
    fn hit_skips_the_scan_ahead() {
        let mut frame = Frame::filled(400, 40, GRAY);
        frame.fill_rect(0, 0, 400, 1, BLUE);

        let regions = propose_regions(&frame);
        let xs: Vec<u32> = regions.iter().map(|r| r.x).collect();

        assert_eq!(xs, vec![0, 120, 240, 360]);
        assert!(regions.iter().all(|r| r.y == 0));
    }

    #[test]
    fn blocks_closer_than_dedup_distance_collapse_to_first() {
        let mut frame = Frame::filled(640, 480, GRAY);
        frame.fill_rect(100, 40, 10, 10, BLUE);
        frame.fill_rect(140, 200, 10, 10, BLUE);

        let detections = ColorThresholdDetector::with_seed(1).classify(&frame, "t");

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].region.x, 100);
        assert_eq!(detections[0].region.y, 40);
    }

    #[test]
    fn dedupe_compares_against_every_accepted_region() {
        let regions = vec![region(0, 0), region(60, 0), region(100, 20), region(30, 40)];

        let accepted = dedupe_regions(&regions);

        assert_eq!(accepted, vec![region(0, 0), region(60, 0)]);
    }

    #[test]
    fn frame_without_markers_has_no_detections() {
        let frame = Frame::filled(320, 240, GRAY);
        assert!(ColorThresholdDetector::with_seed(3)
            .classify(&frame, "t")
            .is_empty());
    }

    #[test]
    fn labels_stay_in_range_and_mostly_good() {
        let mut detector = ColorThresholdDetector::with_seed(42);
        let labels: Vec<Detection> = (0..2000)
            .map(|index| detector.label(region(index, 0), "t"))
            .collect();

        assert!(labels.iter().all(|d| d.id < 100));
        assert!(labels
            .iter()
            .all(|d| (0.85..=1.0).contains(&d.confidence)));
        let good = labels
            .iter()
            .filter(|d| d.classification == Classification::Good)
            .count();
        assert!((1450..=1750).contains(&good), "good count {good}");
    }

    #[test]
    fn seeded_detectors_are_deterministic() {
        let mut frame = Frame::filled(640, 480, GRAY);
        frame.fill_rect(20, 20, 20, 20, BLUE);
        frame.fill_rect(300, 20, 20, 20, BLUE);

        let first = ColorThresholdDetector::with_seed(11).classify(&frame, "t");
        let second = ColorThresholdDetector::with_seed(11).classify(&frame, "t");

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
