//! Pattern decoding and glaze conflict resolution.
//!
//! The pattern card shows up to five elements. Red and green glaze are
//! mutually exclusive in the game, so when both rules fire the one with
//! the larger pixel count wins; when neither fires the decoder falls back
//! to green so the driver always reacts with one of the two. That
//! fail-open default is a tuned heuristic carried over from calibration,
//! not something the visuals guarantee, so it can silently mask a weak
//! red detection.

use image::RgbaImage;

use crate::config::PatternRules;
use crate::vision::rules::{classify, Detection};

/// The five detectable pattern elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    GreenGlaze,
    RedGlaze,
    BlueSprinkles,
    Grapes,
    Eyes,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::GreenGlaze,
        Element::RedGlaze,
        Element::BlueSprinkles,
        Element::Grapes,
        Element::Eyes,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Element::GreenGlaze => "green_glaze",
            Element::RedGlaze => "red_glaze",
            Element::BlueSprinkles => "blue_sprinkles",
            Element::Grapes => "grapes",
            Element::Eyes => "eyes",
        }
    }
}

/// Raw per-element classification output, produced fresh on every sample.
#[derive(Clone, Copy, Debug)]
pub struct DetectionResult {
    pub green_glaze: Detection,
    pub red_glaze: Detection,
    pub blue_sprinkles: Detection,
    pub grapes: Detection,
    pub eyes: Detection,
}

impl DetectionResult {
    pub fn get(&self, element: Element) -> Detection {
        match element {
            Element::GreenGlaze => self.green_glaze,
            Element::RedGlaze => self.red_glaze,
            Element::BlueSprinkles => self.blue_sprinkles,
            Element::Grapes => self.grapes,
            Element::Eyes => self.eyes,
        }
    }

    /// One-line pixel count summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "red={} green={} blue={} grapes={} eyes={}",
            self.red_glaze.count,
            self.green_glaze.count,
            self.blue_sprinkles.count,
            self.grapes.count,
            self.eyes.count,
        )
    }
}

/// Resolved set of elements to react to; consumed once by the dispatcher.
///
/// Invariant: exactly one of `green_glaze` and `red_glaze` is true.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementSet {
    pub green_glaze: bool,
    pub red_glaze: bool,
    pub blue_sprinkles: bool,
    pub grapes: bool,
    pub eyes: bool,
}

impl ElementSet {
    pub fn contains(&self, element: Element) -> bool {
        match element {
            Element::GreenGlaze => self.green_glaze,
            Element::RedGlaze => self.red_glaze,
            Element::BlueSprinkles => self.blue_sprinkles,
            Element::Grapes => self.grapes,
            Element::Eyes => self.eyes,
        }
    }

    /// Elements to react to, in fixed dispatch order.
    pub fn active(&self) -> Vec<Element> {
        Element::ALL
            .into_iter()
            .filter(|e| self.contains(*e))
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.active().into_iter().map(|e| e.name()).collect()
    }
}

/// Classifies the pattern image against all five rules.
pub fn detect_elements(image: &RgbaImage, rules: &PatternRules) -> DetectionResult {
    DetectionResult {
        green_glaze: classify(image, &rules.green_glaze),
        red_glaze: classify(image, &rules.red_glaze),
        blue_sprinkles: classify(image, &rules.blue_sprinkles),
        grapes: classify(image, &rules.grapes),
        eyes: classify(image, &rules.eyes),
    }
}

/// Resolves the red/green mutual exclusion over a raw detection.
///
/// Both present: the strictly larger pixel count wins, ties go to red.
/// Exactly one present: keep it. Neither: default to green so the driver
/// never stalls on an unreadable glaze.
pub fn resolve(raw: &DetectionResult) -> ElementSet {
    let (green, red) = match (raw.green_glaze.present, raw.red_glaze.present) {
        (true, true) => {
            if raw.green_glaze.count > raw.red_glaze.count {
                log::debug!(
                    "glaze conflict: green wins {} vs {}",
                    raw.green_glaze.count,
                    raw.red_glaze.count
                );
                (true, false)
            } else {
                log::debug!(
                    "glaze conflict: red wins {} vs {}",
                    raw.red_glaze.count,
                    raw.green_glaze.count
                );
                (false, true)
            }
        }
        (true, false) => (true, false),
        (false, true) => (false, true),
        (false, false) => {
            log::debug!("no glaze detected, defaulting to green");
            (true, false)
        }
    };

    ElementSet {
        green_glaze: green,
        red_glaze: red,
        blue_sprinkles: raw.blue_sprinkles.present,
        grapes: raw.grapes.present,
        eyes: raw.eyes.present,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(count: u32, present: bool) -> Detection {
        Detection { count, present }
    }

    fn raw(green: Detection, red: Detection) -> DetectionResult {
        DetectionResult {
            green_glaze: green,
            red_glaze: red,
            blue_sprinkles: detection(0, false),
            grapes: detection(0, false),
            eyes: detection(0, false),
        }
    }

    #[test]
    fn test_both_present_larger_count_wins() {
        let set = resolve(&raw(detection(200, true), detection(300, true)));
        assert!(set.red_glaze);
        assert!(!set.green_glaze);

        let set = resolve(&raw(detection(1400, true), detection(300, true)));
        assert!(set.green_glaze);
        assert!(!set.red_glaze);
    }

    #[test]
    fn test_both_present_tie_goes_to_red() {
        let set = resolve(&raw(detection(250, true), detection(250, true)));
        assert!(set.red_glaze);
        assert!(!set.green_glaze);
    }

    #[test]
    fn test_single_glaze_passes_through() {
        let set = resolve(&raw(detection(1200, true), detection(10, false)));
        assert!(set.green_glaze && !set.red_glaze);

        let set = resolve(&raw(detection(10, false), detection(400, true)));
        assert!(set.red_glaze && !set.green_glaze);
    }

    #[test]
    fn test_neither_defaults_to_green() {
        let set = resolve(&raw(detection(0, false), detection(0, false)));
        assert!(set.green_glaze);
        assert!(!set.red_glaze);
    }

    #[test]
    fn test_exactly_one_glaze_for_all_combinations() {
        for &green in &[false, true] {
            for &red in &[false, true] {
                let set = resolve(&raw(
                    detection(if green { 1100 } else { 5 }, green),
                    detection(if red { 900 } else { 5 }, red),
                ));
                assert!(
                    set.green_glaze ^ set.red_glaze,
                    "green={green} red={red} must resolve to exactly one glaze"
                );
            }
        }
    }

    #[test]
    fn test_other_elements_pass_through_unchanged() {
        let mut r = raw(detection(1200, true), detection(0, false));
        r.blue_sprinkles = detection(150, true);
        r.grapes = detection(12, false);
        r.eyes = detection(90, true);
        let set = resolve(&r);
        assert!(set.blue_sprinkles);
        assert!(!set.grapes);
        assert!(set.eyes);
        assert_eq!(set.names(), vec!["green_glaze", "blue_sprinkles", "eyes"]);
    }
}
