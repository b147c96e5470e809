//! RGB to HSV conversion.
//!
//! Uses the OpenCV 8-bit convention: hue is halved into 0-179 so it fits
//! a byte, saturation and value span 0-255. The calibrated color ranges in
//! the configuration are expressed on the same scale, so conversions here
//! must stay consistent with them.

/// Converts an RGB pixel to HSV on the OpenCV 8-bit scale.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let rf = r as f32 / 255.0;
    let gf = g as f32 / 255.0;
    let bf = b as f32 / 255.0;

    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let value = (max * 255.0).round() as u8;

    let saturation = if max > 0.0 {
        (delta / max * 255.0).round() as u8
    } else {
        0
    };

    let hue = if delta == 0.0 {
        0
    } else {
        let degrees = if max == rf {
            60.0 * ((gf - bf) / delta)
        } else if max == gf {
            60.0 * ((bf - rf) / delta) + 120.0
        } else {
            60.0 * ((rf - gf) / delta) + 240.0
        };
        let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
        ((degrees / 2.0).round() as u16 % 180) as u8
    };

    [hue, saturation, value]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
    }

    #[test]
    fn test_grays_have_zero_saturation() {
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(255, 255, 255), [0, 0, 255]);
        let [h, s, v] = rgb_to_hsv(128, 128, 128);
        assert_eq!((h, s), (0, 0));
        assert_eq!(v, 128);
    }

    #[test]
    fn test_hue_wraps_below_red() {
        // Slightly magenta-ish red lands at the top of the hue circle,
        // not at a negative value.
        let [h, _, _] = rgb_to_hsv(255, 0, 30);
        assert!(h >= 170, "expected wrapped hue near 180, got {h}");
    }

    #[test]
    fn test_hue_stays_in_opencv_range() {
        for &(r, g, b) in &[(255, 0, 1), (1, 0, 255), (200, 10, 180), (13, 200, 77)] {
            let [h, _, _] = rgb_to_hsv(r, g, b);
            assert!(h < 180, "hue {h} out of range for ({r},{g},{b})");
        }
    }
}
