//! In-bed duration filtering and per-night aggregation.
//!
//! Feeds the overall sleep view: nightly in-bed totals, their quartiles and
//! the bed-time / wake-time distributions re-based onto the 18:00 anchor.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use viz_core::models::{HealthRecord, NightBucket, NightSummary, SleepInterval, SleepStage};
use viz_core::quantile::{median, quantiles};
use viz_core::{Result, VizError};

/// Intervals shorter than this are sensor noise.
pub const MIN_INTERVAL_SECS: i64 = 5 * 60;

/// Upper bound on histogram bins for the bed/wake distribution.
pub const MAX_HISTOGRAM_BINS: usize = 100;

/// Candidate histogram bin widths in seconds, narrowest first.
const BIN_STEPS: &[i64] = &[60, 120, 300, 600, 900, 1800, 3600, 7200, 10_800, 21_600, 43_200];

const SECONDS_PER_DAY: i64 = 24 * 3600;

// ── Filtering ─────────────────────────────────────────────────────────────────

/// In Bed intervals of at least [`MIN_INTERVAL_SECS`].
pub fn in_bed_intervals(records: &[HealthRecord]) -> Vec<SleepInterval> {
    records
        .iter()
        .filter(|r| r.sleep_stage() == Some(SleepStage::InBed))
        .map(|r| SleepInterval::from_record(r, SleepStage::InBed))
        .filter(|i| i.duration >= MIN_INTERVAL_SECS)
        .collect()
}

/// Earliest and latest night present in `intervals`.
pub fn observed_nights(intervals: &[SleepInterval]) -> Option<(NightBucket, NightBucket)> {
    let min = intervals.iter().map(|i| i.night).min()?;
    let max = intervals.iter().map(|i| i.night).max()?;
    Some((min, max))
}

// ── NightRange ────────────────────────────────────────────────────────────────

/// Inclusive range of nights. `start > end` is a valid, empty range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NightRange {
    pub start: NightBucket,
    pub end: NightBucket,
}

impl NightRange {
    /// Build a range from caller-chosen bounds, each clamped into the observed
    /// span. Missing bounds default to the observed min / max.
    pub fn clamped(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        observed: (NightBucket, NightBucket),
    ) -> Self {
        let (min, max) = observed;
        let clamp = |d: NaiveDate| NightBucket(d).clamp(min, max);
        Self {
            start: start.map(clamp).unwrap_or(min),
            end: end.map(clamp).unwrap_or(max),
        }
    }

    pub fn contains(&self, night: NightBucket) -> bool {
        self.start <= night && night <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Intervals whose night falls inside `range`.
pub fn select_range(intervals: &[SleepInterval], range: &NightRange) -> Vec<SleepInterval> {
    intervals
        .iter()
        .filter(|i| range.contains(i.night))
        .cloned()
        .collect()
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Group intervals by night: total duration, first start, last end.
///
/// Nights are returned in ascending order.
pub fn summarize_nights(intervals: &[SleepInterval]) -> Vec<NightSummary> {
    let mut map: BTreeMap<NightBucket, NightSummary> = BTreeMap::new();

    for interval in intervals {
        map.entry(interval.night)
            .and_modify(|s| {
                s.duration += interval.duration;
                s.bed_time = s.bed_time.min(interval.start);
                s.wake_time = s.wake_time.max(interval.end);
            })
            .or_insert_with(|| NightSummary {
                night: interval.night,
                duration: interval.duration,
                bed_time: interval.start,
                wake_time: interval.end,
            });
    }

    map.into_values().collect()
}

// ── SleepStats ────────────────────────────────────────────────────────────────

/// Summary statistics over a set of nights. All values are seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SleepStats {
    /// 25th percentile of nightly in-bed time.
    pub q1: f64,
    /// Median nightly in-bed time.
    pub median: f64,
    /// 75th percentile of nightly in-bed time.
    pub q3: f64,
    /// Median bed time, as seconds after the night's 18:00 anchor.
    pub median_bed_offset: f64,
    /// Median wake time, as seconds after the night's 18:00 anchor.
    pub median_wake_offset: f64,
}

impl SleepStats {
    /// Fails with [`VizError::EmptySelection`] when `nights` is empty.
    pub fn from_nights(nights: &[NightSummary]) -> Result<Self> {
        let durations: Vec<f64> = nights.iter().map(|n| n.duration as f64).collect();
        let bed: Vec<f64> = nights.iter().map(|n| n.bed_offset() as f64).collect();
        let wake: Vec<f64> = nights.iter().map(|n| n.wake_offset() as f64).collect();

        let q = quantiles(&durations, &[0.25, 0.5, 0.75]).ok_or(VizError::EmptySelection)?;
        Ok(Self {
            q1: q[0],
            median: q[1],
            q3: q[2],
            median_bed_offset: median(&bed).ok_or(VizError::EmptySelection)?,
            median_wake_offset: median(&wake).ok_or(VizError::EmptySelection)?,
        })
    }
}

// ── Bed / wake histogram ──────────────────────────────────────────────────────

/// Which end of the night a histogram bin counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum TimeKind {
    #[serde(rename = "Bed Time")]
    BedTime,
    #[serde(rename = "Wake Up Time")]
    WakeTime,
}

/// One histogram bar: `[start, end)` offsets from the 18:00 anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistogramBin {
    #[serde(rename = "Type")]
    pub kind: TimeKind,
    pub start: i64,
    pub end: i64,
    pub count: usize,
}

/// Bin bed and wake offsets on one shared axis.
///
/// The bin width is the narrowest of a fixed set of clock-friendly steps that
/// keeps the bin count within `max_bins` (at least 2). Bins are aligned to
/// multiples of the width, so the count includes partial bins at both ends.
/// Empty bins are omitted.
pub fn time_histogram(nights: &[NightSummary], max_bins: usize) -> Vec<HistogramBin> {
    let samples: Vec<(TimeKind, i64)> = nights
        .iter()
        .flat_map(|n| {
            [
                (TimeKind::BedTime, n.bed_offset()),
                (TimeKind::WakeTime, n.wake_offset()),
            ]
        })
        .collect();

    let Some(lo) = samples.iter().map(|(_, s)| *s).min() else {
        return Vec::new();
    };
    let hi = samples.iter().map(|(_, s)| *s).max().unwrap_or(lo);

    let max_bins = max_bins.max(2) as i64;
    let width = BIN_STEPS
        .iter()
        .copied()
        .find(|&step| bins_spanned(lo, hi, step) <= max_bins)
        .unwrap_or_else(|| ((hi - lo) / SECONDS_PER_DAY + 1) * SECONDS_PER_DAY);

    let mut counts: BTreeMap<(TimeKind, i64), usize> = BTreeMap::new();
    for (kind, offset) in samples {
        let start = offset.div_euclid(width) * width;
        *counts.entry((kind, start)).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((kind, start), count)| HistogramBin {
            kind,
            start,
            end: start + width,
            count,
        })
        .collect()
}

/// Number of `width`-aligned bins touched between `lo` and `hi` inclusive.
fn bins_spanned(lo: i64, hi: i64, width: i64) -> i64 {
    hi.div_euclid(width) - lo.div_euclid(width) + 1
}

// ── OverallView ───────────────────────────────────────────────────────────────

/// Everything the overall sleep page binds to.
#[derive(Debug, Clone, Serialize)]
pub struct OverallView {
    /// Effective range after clamping; `None` when there is no data at all.
    pub range: Option<NightRange>,
    pub nights: Vec<NightSummary>,
    /// `None` when the range selects zero nights.
    pub stats: Option<SleepStats>,
    pub histogram: Vec<HistogramBin>,
}

impl OverallView {
    /// Select `[start, end]` from filtered In Bed intervals and aggregate.
    ///
    /// An empty selection yields an empty view without stats.
    pub fn build(
        intervals: &[SleepInterval],
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        let Some(observed) = observed_nights(intervals) else {
            return Self {
                range: None,
                nights: Vec::new(),
                stats: None,
                histogram: Vec::new(),
            };
        };

        let range = NightRange::clamped(start, end, observed);
        let nights = summarize_nights(&select_range(intervals, &range));
        let stats = if nights.is_empty() {
            None
        } else {
            SleepStats::from_nights(&nights).ok()
        };
        let histogram = time_histogram(&nights, MAX_HISTOGRAM_BINS);

        Self {
            range: Some(range),
            nights,
            stats,
            histogram,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nights.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
