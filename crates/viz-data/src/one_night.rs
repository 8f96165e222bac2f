//! Single-night view: stage timeline, In Bed band and heart-rate trace.

use chrono::NaiveDate;
use serde::Serialize;
use viz_core::models::{HealthRecord, HeartRatePoint, NightBucket, SleepInterval, SleepStage};
use viz_core::{Result, VizError};

/// Heart-rate axis used when a night has no heart-rate samples.
pub const HR_FALLBACK_BOUNDS: (i64, i64) = (70, 90);

/// Margin added below the lowest and above the highest sample.
pub const HR_AXIS_PADDING: i64 = 5;

/// Everything the one-night page binds to.
#[derive(Debug, Clone, Serialize)]
pub struct OneNightView {
    /// The night actually shown after defaulting and clamping.
    pub night: Option<NightBucket>,
    /// Core / REM / Deep / Awake intervals in input order.
    pub stages: Vec<SleepInterval>,
    pub in_bed: Vec<SleepInterval>,
    pub heart_rate: Vec<HeartRatePoint>,
    pub hr_bounds: (i64, i64),
}

impl OneNightView {
    /// Assemble the view for `date`, defaulting to the latest night.
    ///
    /// A date outside the observed span is clamped to its nearest end. A
    /// night with no records gives empty slices and the fallback axis.
    pub fn build(records: &[HealthRecord], date: Option<NaiveDate>) -> Result<Self> {
        let min = records.iter().map(|r| r.night).min();
        let max = records.iter().map(|r| r.night).max();
        let night = match (min, max) {
            (Some(min), Some(max)) => Some(date.map(NightBucket).unwrap_or(max).clamp(min, max)),
            _ => None,
        };

        let mut stages = Vec::new();
        let mut in_bed = Vec::new();
        let mut heart_rate = Vec::new();

        for record in records.iter().filter(|r| Some(r.night) == night) {
            if record.is_heart_rate() {
                heart_rate.push(HeartRatePoint {
                    time: record.end_date,
                    bpm: parse_bpm(&record.value)?,
                });
                continue;
            }
            match record.sleep_stage() {
                Some(SleepStage::InBed) => {
                    in_bed.push(SleepInterval::from_record(record, SleepStage::InBed))
                }
                Some(stage) => stages.push(SleepInterval::from_record(record, stage)),
                None => {}
            }
        }

        let hr_bounds = heart_rate_bounds(&heart_rate);
        Ok(Self {
            night,
            stages,
            in_bed,
            heart_rate,
            hr_bounds,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty() && self.in_bed.is_empty() && self.heart_rate.is_empty()
    }
}

/// Integer BPM from a heart-rate value; decimals are truncated.
pub fn parse_bpm(value: &str) -> Result<i64> {
    let value = value.trim();
    if let Ok(bpm) = value.parse::<i64>() {
        return Ok(bpm);
    }
    match value.parse::<f64>() {
        Ok(bpm) if bpm.is_finite() => Ok(bpm.trunc() as i64),
        _ => Err(VizError::InvalidValue {
            field: "heart rate",
            value: value.to_string(),
        }),
    }
}

/// `(min - 5, max + 5)` over the samples, or the fallback axis.
pub fn heart_rate_bounds(points: &[HeartRatePoint]) -> (i64, i64) {
    let min = points.iter().map(|p| p.bpm).min();
    let max = points.iter().map(|p| p.bpm).max();
    match (min, max) {
        (Some(min), Some(max)) => (min - HR_AXIS_PADDING, max + HR_AXIS_PADDING),
        _ => HR_FALLBACK_BOUNDS,
    }
}
