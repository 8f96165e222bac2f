//! Raw record normalization.
//!
//! Restricts an export to the sleep-analysis and heart-rate record types,
//! rewrites both timestamp columns to canonical local time, drops exact
//! duplicate rows and attaches each record's sleep night.

use std::collections::HashSet;

use tracing::{debug, warn};
use viz_core::models::{HealthRecord, RawRecord, RecordType};
use viz_core::time_utils::{canonicalize_timestamp, night_bucket, TimestampMode};
use viz_core::Result;

/// Row counts observed during one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub read: usize,
    pub unsupported: usize,
    pub duplicates: usize,
    pub inverted: usize,
    pub kept: usize,
}

/// Normalize a raw table. See [`normalize_with_stats`].
pub fn normalize(raw: &[RawRecord], mode: TimestampMode) -> Result<Vec<HealthRecord>> {
    normalize_with_stats(raw, mode).map(|(records, _)| records)
}

/// Normalize a raw table and report what was dropped.
///
/// Output keeps input order, first occurrence of each duplicate wins.
/// Duplicates are detected after canonicalization, so rows that differ only
/// in sub-second precision or offset annotation collapse into one. Interval
/// rows whose end precedes their start are dropped with a warning. A
/// malformed timestamp on a supported row aborts the pass.
pub fn normalize_with_stats(
    raw: &[RawRecord],
    mode: TimestampMode,
) -> Result<(Vec<HealthRecord>, NormalizeStats)> {
    let mut stats = NormalizeStats {
        read: raw.len(),
        ..Default::default()
    };
    let mut seen: HashSet<HealthRecord> = HashSet::with_capacity(raw.len());
    let mut records = Vec::with_capacity(raw.len());

    for row in raw {
        let record_type = RecordType::parse(&row.record_type);
        if !record_type.is_supported() {
            stats.unsupported += 1;
            continue;
        }

        let start_date = canonicalize_timestamp(&row.start_date, mode)?;
        let end_date = canonicalize_timestamp(&row.end_date, mode)?;
        if end_date < start_date {
            stats.inverted += 1;
            continue;
        }

        let record = HealthRecord {
            record_type,
            value: row.value.clone(),
            start_date,
            end_date,
            source_name: row.source_name.clone(),
            unit: row.unit.clone(),
            night: night_bucket(start_date),
        };

        if seen.insert(record.clone()) {
            records.push(record);
        } else {
            stats.duplicates += 1;
        }
    }

    stats.kept = records.len();
    if stats.inverted > 0 {
        warn!("Dropped {} records ending before they start", stats.inverted);
    }
    debug!(
        "Normalized {} rows: {} kept, {} unsupported, {} duplicates",
        stats.read, stats.kept, stats.unsupported, stats.duplicates
    );
    Ok((records, stats))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
