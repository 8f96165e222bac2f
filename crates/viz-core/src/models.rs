use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Hour of day at which a new sleep night begins.
pub const NIGHT_BOUNDARY_HOUR: u32 = 18;

/// Record type tag for sleep-stage category samples.
pub const SLEEP_ANALYSIS_TYPE: &str = "HKCategoryTypeIdentifierSleepAnalysis";

/// Record type tag for heart-rate quantity samples.
pub const HEART_RATE_TYPE: &str = "HKQuantityTypeIdentifierHeartRate";

// ── RecordType ────────────────────────────────────────────────────────────────

/// The `type` column of a health export row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    SleepAnalysis,
    HeartRate,
    /// Any other identifier present in the export; dropped by normalization.
    Other(String),
}

impl RecordType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            SLEEP_ANALYSIS_TYPE => Self::SleepAnalysis,
            HEART_RATE_TYPE => Self::HeartRate,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::SleepAnalysis => SLEEP_ANALYSIS_TYPE,
            Self::HeartRate => HEART_RATE_TYPE,
            Self::Other(s) => s,
        }
    }

    /// `true` for the two record types the dashboard consumes.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::SleepAnalysis | Self::HeartRate)
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ── SleepStage ────────────────────────────────────────────────────────────────

/// Sleep-analysis category values, serialized by their display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SleepStage {
    #[serde(rename = "In Bed")]
    InBed,
    #[serde(rename = "Awake")]
    Awake,
    #[serde(rename = "REM")]
    AsleepRem,
    #[serde(rename = "Core")]
    AsleepCore,
    #[serde(rename = "Deep")]
    AsleepDeep,
}

impl SleepStage {
    /// Every stage in chart order (In Bed first, deepest last).
    pub const ALL: [SleepStage; 5] = [
        SleepStage::InBed,
        SleepStage::Awake,
        SleepStage::AsleepRem,
        SleepStage::AsleepCore,
        SleepStage::AsleepDeep,
    ];

    /// Map an export value such as `HKCategoryValueSleepAnalysisAsleepREM`.
    ///
    /// Returns `None` for values outside the five-stage vocabulary
    /// (e.g. `AsleepUnspecified`).
    pub fn from_value(value: &str) -> Option<Self> {
        match value {
            "HKCategoryValueSleepAnalysisInBed" => Some(Self::InBed),
            "HKCategoryValueSleepAnalysisAsleepCore" => Some(Self::AsleepCore),
            "HKCategoryValueSleepAnalysisAsleepREM" => Some(Self::AsleepRem),
            "HKCategoryValueSleepAnalysisAsleepDeep" => Some(Self::AsleepDeep),
            "HKCategoryValueSleepAnalysisAwake" => Some(Self::Awake),
            _ => None,
        }
    }

    /// The raw export value for this stage.
    pub fn export_value(self) -> &'static str {
        match self {
            Self::InBed => "HKCategoryValueSleepAnalysisInBed",
            Self::AsleepCore => "HKCategoryValueSleepAnalysisAsleepCore",
            Self::AsleepRem => "HKCategoryValueSleepAnalysisAsleepREM",
            Self::AsleepDeep => "HKCategoryValueSleepAnalysisAsleepDeep",
            Self::Awake => "HKCategoryValueSleepAnalysisAwake",
        }
    }

    /// Short label used by the charts.
    pub fn label(self) -> &'static str {
        match self {
            Self::InBed => "In Bed",
            Self::AsleepCore => "Core",
            Self::AsleepRem => "REM",
            Self::AsleepDeep => "Deep",
            Self::Awake => "Awake",
        }
    }
}

impl fmt::Display for SleepStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── NightBucket ───────────────────────────────────────────────────────────────

/// One logical sleep night, 18:00 on `date` to 18:00 the next day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NightBucket(pub NaiveDate);

impl NightBucket {
    /// The 18:00 instant this night starts at.
    pub fn anchor(self) -> NaiveDateTime {
        self.0
            .and_time(NaiveTime::from_hms_opt(NIGHT_BOUNDARY_HOUR, 0, 0).unwrap_or_default())
    }
}

impl From<NaiveDate> for NightBucket {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for NightBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One row as read from an export file, every cell still text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(rename = "sourceName", default)]
    pub source_name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    #[serde(rename = "endDate")]
    pub end_date: String,
    pub value: String,
}

/// A normalized observation: canonical local timestamps plus its night.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HealthRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDateTime,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDateTime,
    #[serde(rename = "sourceName")]
    pub source_name: String,
    pub unit: String,
    /// Night bucket derived from `start_date`.
    #[serde(rename = "idx")]
    pub night: NightBucket,
}

impl HealthRecord {
    /// The sleep stage of a sleep-analysis record, if it has a known value.
    pub fn sleep_stage(&self) -> Option<SleepStage> {
        match self.record_type {
            RecordType::SleepAnalysis => SleepStage::from_value(&self.value),
            _ => None,
        }
    }

    pub fn is_heart_rate(&self) -> bool {
        self.record_type == RecordType::HeartRate
    }
}

// ── Derived views ─────────────────────────────────────────────────────────────

/// A sleep-stage record narrowed to what the stage charts need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepInterval {
    #[serde(rename = "type")]
    pub stage: SleepStage,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// `end - start` in whole seconds.
    pub duration: i64,
    pub night: NightBucket,
}

impl SleepInterval {
    pub fn from_record(record: &HealthRecord, stage: SleepStage) -> Self {
        Self {
            stage,
            start: record.start_date,
            end: record.end_date,
            duration: (record.end_date - record.start_date).num_seconds(),
            night: record.night,
        }
    }
}

/// Per-night aggregate of In Bed intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NightSummary {
    #[serde(rename = "idx")]
    pub night: NightBucket,
    /// Total in-bed seconds for the night.
    pub duration: i64,
    /// Earliest interval start.
    pub bed_time: NaiveDateTime,
    /// Latest interval end.
    pub wake_time: NaiveDateTime,
}

impl NightSummary {
    /// Seconds between the night's 18:00 anchor and `bed_time`.
    pub fn bed_offset(&self) -> i64 {
        (self.bed_time - self.night.anchor()).num_seconds()
    }

    /// Seconds between the night's 18:00 anchor and `wake_time`.
    pub fn wake_offset(&self) -> i64 {
        (self.wake_time - self.night.anchor()).num_seconds()
    }
}

/// A heart-rate observation plotted at its end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartRatePoint {
    #[serde(rename = "endDate")]
    pub time: NaiveDateTime,
    #[serde(rename = "value")]
    pub bpm: i64,
}
