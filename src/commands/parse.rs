//! `parse` subcommand handler.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use cuescript::annotation::{format_timestamp, parse_with_diagnostics, IntervalAction};

/// Parse a notes file and list its annotations.
pub fn handle(file: &Path, json: bool) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let outcome = parse_with_diagnostics(&text);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if outcome.intervals.is_empty() {
        println!("no annotations found");
    }
    for interval in &outcome.intervals {
        let action = match interval.action {
            IntervalAction::None => String::new(),
            IntervalAction::AutoJump => "  -> auto-jump".to_string(),
            IntervalAction::Pause { seconds } => format!("  |  pause {}s", seconds),
        };
        println!(
            "#{:<3} {} - {}  vol {:>3}%  speed {:.2}x{}",
            interval.index + 1,
            format_timestamp(interval.start),
            format_timestamp(interval.end),
            interval.volume,
            interval.speed,
            action
        );
    }

    if !outcome.skipped.is_empty() {
        println!();
        println!("skipped {} candidate(s):", outcome.skipped.len());
        for span in &outcome.skipped {
            println!(
                "  bytes {}..{}: {}: {}",
                span.start, span.end, span.reason, span.text
            );
        }
    }

    Ok(())
}
