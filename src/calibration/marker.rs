//! Live marker transition monitor.
//!
//! Polls the marker region and logs every present/absent edge with its
//! pixel count, saving the region image at each transition so the white
//! rule and threshold can be verified against the real checkmark.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

use crate::capture::{RegionSampler, ScreenSampler};
use crate::config::BotConfig;
use crate::paths;
use crate::vision::rules::classify;

/// Monitors the marker region until ctrl-c.
pub fn watch_marker(config: &BotConfig) -> Result<()> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .context("failed to set ctrl-c handler")?;
    }

    let captures_dir = paths::captures_dir();
    std::fs::create_dir_all(&captures_dir)?;

    println!("Monitoring marker region, ctrl-c to stop");
    std::thread::sleep(Duration::from_secs(3));

    let mut sampler = ScreenSampler::primary()?;
    let mut previous: Option<bool> = None;

    while !stop.load(Ordering::SeqCst) {
        let image = sampler.sample(&config.marker_region)?;
        let detection = classify(&image, &config.marker_rule);

        if previous != Some(detection.present) {
            let stamp = Local::now();
            let name = if detection.present {
                format!("appeared_{}.png", stamp.format("%H%M%S"))
            } else {
                format!("disappeared_{}.png", stamp.format("%H%M%S"))
            };
            image.save(captures_dir.join(&name))?;

            let word = if detection.present {
                "APPEARED"
            } else {
                "DISAPPEARED"
            };
            println!(
                "[{}] {word} (white: {})",
                stamp.format("%H:%M:%S"),
                detection.count
            );
            previous = Some(detection.present);
        }

        std::thread::sleep(Duration::from_millis(100));
    }

    println!("Stopped");
    Ok(())
}
