//! Session cache over the record pipeline.
//!
//! Holds the active [`RecordSource`] plus the normalized records and
//! filtered In Bed intervals derived from it. [`DataManager::import`] is the
//! only way to change the source, and it swaps source and cache together, so
//! a view can never be built from a previous source's data.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use viz_core::models::{HealthRecord, SleepInterval};
use viz_core::time_utils::TimestampMode;
use viz_core::{Result, VizError};
use viz_data::aggregator::{in_bed_intervals, OverallView};
use viz_data::normalizer::{normalize_with_stats, NormalizeStats};
use viz_data::one_night::OneNightView;
use viz_data::source::{RecordSource, SourceKey};

// ── Cache entry ───────────────────────────────────────────────────────────────

/// Everything derived from one source under one timestamp mode.
#[derive(Debug)]
struct CachedData {
    key: SourceKey,
    mode: TimestampMode,
    records: Vec<HealthRecord>,
    in_bed: Vec<SleepInterval>,
    stats: NormalizeStats,
}

impl CachedData {
    fn load(source: &RecordSource, mode: TimestampMode) -> Result<Self> {
        let raw = source.fetch()?;
        let (records, stats) = normalize_with_stats(&raw, mode)?;
        let in_bed = in_bed_intervals(&records);
        tracing::debug!(
            source = %source,
            records = records.len(),
            in_bed = in_bed.len(),
            "pipeline cache populated"
        );
        Ok(Self {
            key: source.key(),
            mode,
            records,
            in_bed,
            stats,
        })
    }

    fn matches(&self, key: &SourceKey, mode: TimestampMode) -> bool {
        &self.key == key && self.mode == mode
    }
}

// ── DataManager ───────────────────────────────────────────────────────────────

/// Active source plus its memoized pipeline output.
///
/// # Example
/// ```no_run
/// use viz_core::time_utils::TimestampMode;
/// use viz_data::source::RecordSource;
/// use viz_runtime::data_manager::DataManager;
///
/// let mut mgr = DataManager::new(TimestampMode::WallClock);
/// mgr.import(RecordSource::file("export.feather")).unwrap();
/// let view = mgr.overall(None, None).unwrap();
/// println!("{} nights", view.nights.len());
/// ```
#[derive(Debug, Default)]
pub struct DataManager {
    source: Option<RecordSource>,
    mode: TimestampMode,
    cache: Option<CachedData>,
    /// When the cache was last populated.
    cache_timestamp: Option<Instant>,
}

impl DataManager {
    pub fn new(mode: TimestampMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Make `source` the active source.
    ///
    /// The new source is loaded before anything is replaced. On failure the
    /// previous source and its cache stay as they were; on success both are
    /// swapped in the same call.
    pub fn import(&mut self, source: RecordSource) -> Result<()> {
        let data = CachedData::load(&source, self.mode)?;
        tracing::info!(source = %source, records = data.records.len(), "source imported");
        self.source = Some(source);
        self.cache = Some(data);
        self.cache_timestamp = Some(Instant::now());
        Ok(())
    }

    /// Change how timestamp offsets are handled. Drops the cache when the
    /// mode actually changes.
    pub fn set_timestamp_mode(&mut self, mode: TimestampMode) {
        if self.mode != mode {
            self.mode = mode;
            self.invalidate_cache();
        }
    }

    /// Discard derived data; the next read recomputes from the source.
    pub fn invalidate_cache(&mut self) {
        self.cache = None;
        self.cache_timestamp = None;
        tracing::debug!("cache invalidated");
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn source(&self) -> Option<&RecordSource> {
        self.source.as_ref()
    }

    pub fn timestamp_mode(&self) -> TimestampMode {
        self.mode
    }

    /// Age of the current cache entry, or `None` if nothing is cached.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache_timestamp.map(|ts| ts.elapsed())
    }

    /// Normalized records of the active source.
    pub fn records(&mut self) -> Result<&[HealthRecord]> {
        Ok(&self.ensure_loaded()?.records)
    }

    /// In Bed intervals that passed the duration filter.
    pub fn in_bed(&mut self) -> Result<&[SleepInterval]> {
        Ok(&self.ensure_loaded()?.in_bed)
    }

    /// Row counts from the last normalization pass.
    pub fn normalize_stats(&mut self) -> Result<NormalizeStats> {
        Ok(self.ensure_loaded()?.stats)
    }

    pub fn overall(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<OverallView> {
        let view = OverallView::build(self.in_bed()?, start, end);
        if view.is_empty() {
            tracing::info!("selected range contains no nights");
        }
        Ok(view)
    }

    pub fn one_night(&mut self, date: Option<NaiveDate>) -> Result<OneNightView> {
        OneNightView::build(self.records()?, date)
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Return cached data for the active source, recomputing on a miss.
    fn ensure_loaded(&mut self) -> Result<&CachedData> {
        let source = self.source.as_ref().ok_or(VizError::NoSource)?;
        let key = source.key();
        let hit = self
            .cache
            .as_ref()
            .is_some_and(|c| c.matches(&key, self.mode));

        if hit {
            tracing::debug!("returning cached pipeline output");
        } else {
            self.cache = Some(CachedData::load(source, self.mode)?);
            self.cache_timestamp = Some(Instant::now());
        }
        self.cache.as_ref().ok_or(VizError::NoSource)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
