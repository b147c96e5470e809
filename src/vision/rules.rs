//! Pixel-count classification against HSV color rules.
//!
//! A rule is one or two inclusive HSV ranges plus a pixel-count threshold.
//! Two ranges are needed when the target hue wraps around the top of the
//! hue circle (red). Classification is a pure function of the image and
//! the rule.

use image::{GrayImage, Luma, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::vision::hsv::rgb_to_hsv;

/// An inclusive HSV range on the OpenCV 8-bit scale.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// Whether an HSV pixel falls inside this range, all channels inclusive.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }
}

/// A named classification predicate: one or two HSV ranges and a
/// pixel-count threshold. Bounds are fixed at configuration time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColorRule {
    pub range: HsvRange,
    /// Second range for hue-wraparound colors; a pixel matches the rule
    /// when it falls in either range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_range: Option<HsvRange>,
    /// Strict lower bound on the matching pixel count for "present"
    pub threshold: u32,
}

impl ColorRule {
    pub const fn new(range: HsvRange, threshold: u32) -> Self {
        Self {
            range,
            wrap_range: None,
            threshold,
        }
    }

    pub const fn with_wrap(range: HsvRange, wrap_range: HsvRange, threshold: u32) -> Self {
        Self {
            range,
            wrap_range: Some(wrap_range),
            threshold,
        }
    }

    /// Whether an HSV pixel matches either range of the rule.
    pub fn matches(&self, hsv: [u8; 3]) -> bool {
        self.range.contains(hsv) || self.wrap_range.is_some_and(|r| r.contains(hsv))
    }
}

/// Result of classifying one image against one rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Detection {
    /// Number of pixels matching the rule
    pub count: u32,
    /// Whether the count strictly exceeds the rule threshold
    pub present: bool,
}

/// Classifies an image against a color rule.
///
/// Counts pixels whose HSV value falls inside the rule's range(s); a pixel
/// in both ranges counts once. An empty image yields a zero count rather
/// than an error, so a transient capture glitch degrades to "absent"
/// instead of stopping the loop.
pub fn classify(image: &RgbaImage, rule: &ColorRule) -> Detection {
    let count = image
        .pixels()
        .filter(|p| rule.matches(rgb_to_hsv(p[0], p[1], p[2])))
        .count() as u32;

    Detection {
        count,
        present: count > rule.threshold,
    }
}

/// Builds the binary mask for a rule over an image (255 = match).
///
/// Diagnostic path used by the mask-dump tool; `classify` is equivalent to
/// counting the set pixels of this mask.
pub fn build_mask(image: &RgbaImage, rule: &ColorRule) -> GrayImage {
    let mut mask = GrayImage::new(image.width(), image.height());
    for (x, y, p) in image.enumerate_pixels() {
        if rule.matches(rgb_to_hsv(p[0], p[1], p[2])) {
            mask.put_pixel(x, y, Luma([255u8]));
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]))
    }

    fn red_rule(threshold: u32) -> ColorRule {
        ColorRule::with_wrap(
            HsvRange::new([0, 180, 180], [8, 255, 255]),
            HsvRange::new([170, 180, 180], [180, 255, 255]),
            threshold,
        )
    }

    #[test]
    fn test_solid_match_counts_every_pixel() {
        let rule = ColorRule::new(HsvRange::new([35, 150, 150], [85, 255, 255]), 10);
        let img = solid(8, 8, [0, 255, 0]);
        let det = classify(&img, &rule);
        assert_eq!(det.count, 64);
        assert!(det.present);
    }

    #[test]
    fn test_threshold_is_strict() {
        let rule = ColorRule::new(HsvRange::new([35, 150, 150], [85, 255, 255]), 64);
        let img = solid(8, 8, [0, 255, 0]);
        let det = classify(&img, &rule);
        assert_eq!(det.count, 64);
        assert!(!det.present, "count equal to threshold must not be present");
    }

    #[test]
    fn test_wraparound_pixel_counts_once() {
        // Pure red has hue 0 (first range); near-magenta red has hue ~176
        // (wrap range). Each matching pixel contributes exactly once.
        let rule = red_rule(0);
        let mut img = solid(2, 1, [255, 0, 0]);
        img.put_pixel(1, 0, Rgba([255, 0, 30, 255]));
        let det = classify(&img, &rule);
        assert_eq!(det.count, 2);
    }

    #[test]
    fn test_mask_is_union_of_sub_ranges() {
        let rule = red_rule(0);
        let only_first = ColorRule::new(rule.range, 0);
        let only_wrap = ColorRule::new(rule.wrap_range.unwrap(), 0);

        let mut img = solid(3, 1, [255, 0, 0]); // hue 0
        img.put_pixel(1, 0, Rgba([255, 0, 30, 255])); // hue ~176
        img.put_pixel(2, 0, Rgba([0, 255, 0, 255])); // green, matches neither

        let union = classify(&img, &rule).count;
        let first = classify(&img, &only_first).count;
        let wrap = classify(&img, &only_wrap).count;
        assert_eq!(first, 1);
        assert_eq!(wrap, 1);
        assert_eq!(union, first + wrap);

        let mask = build_mask(&img, &rule);
        let set = mask.pixels().filter(|p| p[0] == 255).count() as u32;
        assert_eq!(set, union);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let rule = red_rule(1);
        let img = solid(16, 16, [255, 0, 0]);
        let first = classify(&img, &rule);
        let second = classify(&img, &rule);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_image_yields_zero_count() {
        let rule = red_rule(0);
        let img = RgbaImage::new(0, 0);
        let det = classify(&img, &rule);
        assert_eq!(det.count, 0);
        assert!(!det.present);
    }
}
