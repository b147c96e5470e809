//! Color-mask dumps and one-shot detection tests.
//!
//! Writes one binary mask image per pattern rule so the HSV ranges can be
//! tuned against a real capture, plus the source image for reference.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use image::RgbaImage;

use crate::capture::{RegionSampler, ScreenSampler};
use crate::config::BotConfig;
use crate::paths;
use crate::vision::pattern::{detect_elements, resolve, Element};
use crate::vision::rules::build_mask;

/// Dumps per-element masks from a capture or an existing image file.
pub fn dump_masks(config: &BotConfig, input: Option<&Path>) -> Result<()> {
    let image = source_image(config, input)?;

    let masks_dir = paths::masks_dir();
    std::fs::create_dir_all(&masks_dir)?;

    image
        .save(masks_dir.join("pattern_source.png"))
        .context("failed to save source image")?;

    println!("{}", "=".repeat(50));
    println!("Generating masks for all elements...");
    println!("{}", "=".repeat(50));

    let mut counts = Vec::new();
    for element in Element::ALL {
        let rule = config.pattern_rules.rule(element);
        let mask = build_mask(&image, rule);
        let count = mask.pixels().filter(|p| p[0] == 255).count() as u32;

        let path = masks_dir.join(format!("mask_{}.png", element.name()));
        mask.save(&path)
            .with_context(|| format!("failed to save {}", path.display()))?;

        let status = if count > 100 {
            "DETECTED"
        } else if count > 20 {
            "WEAK"
        } else {
            "NOT PRESENT"
        };
        println!("{:16} {count:6} pixels - {status}", element.name());
        counts.push((element, count, rule.threshold));
    }

    println!();
    println!("Elements above their real thresholds:");
    for (element, count, threshold) in counts {
        if count > threshold {
            println!("  {} ({count} pixels)", element.name());
        }
    }
    println!();
    println!("Masks saved in {}", masks_dir.display());

    Ok(())
}

/// Captures the pattern region once and prints the decoder verdict.
pub fn run_detection_test(config: &BotConfig) -> Result<()> {
    println!("Testing detection in 3 seconds, switch to the game window...");
    std::thread::sleep(Duration::from_secs(3));

    let mut sampler = ScreenSampler::primary()?;
    let image = sampler.sample(&config.pattern_region)?;

    let capture_path = paths::captures_dir().join("test_capture.png");
    std::fs::create_dir_all(paths::captures_dir())?;
    image.save(&capture_path)?;
    println!("Capture saved to {}", capture_path.display());

    let raw = detect_elements(&image, &config.pattern_rules);
    let resolved = resolve(&raw);

    println!();
    println!("=== Detection Results ===");
    for element in Element::ALL {
        let detection = raw.get(element);
        let mark = if resolved.contains(element) { "+" } else { "-" };
        println!(
            "{mark} {:16} {:6} pixels (raw present: {})",
            element.name(),
            detection.count,
            detection.present
        );
    }

    Ok(())
}

fn source_image(config: &BotConfig, input: Option<&Path>) -> Result<RgbaImage> {
    match input {
        Some(path) => {
            println!("Loading image: {}", path.display());
            let image = image::open(path)
                .with_context(|| format!("could not load image from {}", path.display()))?;
            Ok(image.to_rgba8())
        }
        None => {
            println!("Capturing pattern region in 3 seconds, switch to the game window...");
            std::thread::sleep(Duration::from_secs(3));
            let mut sampler = ScreenSampler::primary()?;
            sampler.sample(&config.pattern_region)
        }
    }
}
