//! Text and JSON rendering of the pipeline views.

use std::fmt::Write as _;

use serde::Serialize;
use viz_core::formatting::{format_anchored_clock, format_count, format_hour_minute};
use viz_core::time_utils::format_clock;
use viz_data::aggregator::{OverallView, TimeKind};
use viz_data::one_night::OneNightView;

/// Shown when no export has been imported yet.
pub const NO_DATA: &str = "No data loaded. Pass --file <export> or --fake.";

/// Shown in place of charts when a selection has no nights.
pub const EMPTY_SELECTION: &str = "No sleep data in the selected range.";

pub fn to_json<T: Serialize>(view: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(view)?)
}

pub fn render_overall(view: &OverallView) -> String {
    let mut out = String::new();
    let Some(range) = view.range else {
        return NO_DATA.to_string();
    };
    let _ = writeln!(out, "Nights {} .. {}", range.start, range.end);

    let Some(stats) = view.stats else {
        out.push_str(EMPTY_SELECTION);
        return out;
    };

    let _ = writeln!(out, "Nights recorded: {}", format_count(view.nights.len()));
    let _ = writeln!(
        out,
        "Time in bed:     {} (Q1) / {} (median) / {} (Q3)",
        format_hour_minute(stats.q1),
        format_hour_minute(stats.median),
        format_hour_minute(stats.q3)
    );
    let _ = writeln!(
        out,
        "Median bed time: {}   Median wake time: {}",
        format_anchored_clock(stats.median_bed_offset),
        format_anchored_clock(stats.median_wake_offset)
    );

    out.push('\n');
    let _ = writeln!(out, "{:<12} {:>9} {:>6} {:>6}", "Night", "In bed", "Bed", "Wake");
    for night in &view.nights {
        let _ = writeln!(
            out,
            "{:<12} {:>9} {:>6} {:>6}",
            night.night.to_string(),
            format_hour_minute(night.duration as f64),
            format_clock(&night.bed_time),
            format_clock(&night.wake_time)
        );
    }

    for kind in [TimeKind::BedTime, TimeKind::WakeTime] {
        let bins: Vec<_> = view.histogram.iter().filter(|b| b.kind == kind).collect();
        if bins.is_empty() {
            continue;
        }
        let label = match kind {
            TimeKind::BedTime => "Bed time",
            TimeKind::WakeTime => "Wake up time",
        };
        let _ = writeln!(out, "\n{label}");
        for bin in bins {
            let _ = writeln!(
                out,
                "  {}-{} {}",
                format_anchored_clock(bin.start as f64),
                format_anchored_clock(bin.end as f64),
                "#".repeat(bin.count)
            );
        }
    }

    out.trim_end().to_string()
}

pub fn render_one_night(view: &OneNightView) -> String {
    let Some(night) = view.night else {
        return NO_DATA.to_string();
    };
    let mut out = String::new();
    let _ = writeln!(out, "Night of {night}");
    if view.is_empty() {
        out.push_str(EMPTY_SELECTION);
        return out;
    }

    for band in &view.in_bed {
        let _ = writeln!(
            out,
            "In bed {}-{} ({})",
            format_clock(&band.start),
            format_clock(&band.end),
            format_hour_minute(band.duration as f64)
        );
    }

    if !view.stages.is_empty() {
        out.push_str("\nStages\n");
        for stage in &view.stages {
            let _ = writeln!(
                out,
                "  {:<6} {}-{} ({})",
                stage.stage.label(),
                format_clock(&stage.start),
                format_clock(&stage.end),
                format_hour_minute(stage.duration as f64)
            );
        }
    }

    let (lo, hi) = view.hr_bounds;
    let _ = writeln!(
        out,
        "\nHeart rate: {} samples, axis {}-{} bpm",
        format_count(view.heart_rate.len()),
        lo,
        hi
    );

    out.trim_end().to_string()
}
