//! Cursor-based region coordinate capture.
//!
//! The operator hovers the mouse over two corners of the area of
//! interest; the tool reads the pointer position after a countdown and
//! prints the resulting region for hand-copying into config.json.

use std::time::Duration;

use anyhow::{bail, Result};

use crate::input::EnigoDriver;

/// Guides the operator through capturing a screen region.
pub fn capture_region_coords(label: &str) -> Result<()> {
    let driver = EnigoDriver::new()?;

    println!("=== capture {label} region ===");
    println!();
    println!("1. Move the mouse to the TOP-LEFT corner of the area");
    println!("2. Hold it there until the countdown ends");
    println!("3. Repeat for the BOTTOM-RIGHT corner");
    println!();

    println!("Top-left corner...");
    countdown(3);
    let (x1, y1) = driver.location()?;
    println!("  captured: ({x1}, {y1})");

    println!();
    println!("Bottom-right corner...");
    countdown(3);
    let (x2, y2) = driver.location()?;
    println!("  captured: ({x2}, {y2})");

    let width = x2 - x1;
    let height = y2 - y1;
    if width <= 0 || height <= 0 {
        bail!("bottom-right corner must be below and to the right of top-left");
    }

    println!();
    println!("{}", "=".repeat(60));
    println!("Copy this into config.json:");
    println!("{}", "=".repeat(60));
    println!(
        "\"{label}_region\": {{ \"x\": {x1}, \"y\": {y1}, \"width\": {width}, \"height\": {height} }}"
    );
    println!("{}", "=".repeat(60));

    Ok(())
}

fn countdown(seconds: u32) {
    for remaining in (1..=seconds).rev() {
        println!("  {remaining}...");
        std::thread::sleep(Duration::from_secs(1));
    }
}
