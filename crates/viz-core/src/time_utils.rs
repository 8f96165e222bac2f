use std::sync::OnceLock;

use chrono::{Duration, FixedOffset, NaiveDateTime, TimeZone as _, Timelike};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

use crate::error::{Result, VizError};
use crate::models::{NightBucket, NIGHT_BOUNDARY_HOUR};

/// The fixed pattern every timestamp is canonicalized to.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

// ── TimestampMode ─────────────────────────────────────────────────────────────

/// How an embedded UTC offset is treated during canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Drop the offset and keep the printed wall-clock time.
    #[default]
    WallClock,
    /// Convert offset-bearing stamps into this zone before dropping it.
    Convert(Tz),
}

impl TimestampMode {
    /// Resolve a `--timezone` setting.
    ///
    /// * `"wall"` (or empty) → [`TimestampMode::WallClock`]
    /// * `"auto"` → convert into the system timezone
    /// * an IANA name → convert into that zone
    ///
    /// An unrecognised name falls back to wall-clock mode and logs a warning.
    pub fn from_setting(setting: &str) -> Self {
        let name = match setting.trim() {
            "" | "wall" => return Self::WallClock,
            "auto" => get_system_timezone(),
            other => other.to_string(),
        };
        match name.parse::<Tz>() {
            Ok(tz) => Self::Convert(tz),
            Err(_) => {
                warn!(
                    "unrecognised timezone \"{}\", keeping wall-clock timestamps",
                    name
                );
                Self::WallClock
            }
        }
    }
}

// ── Canonicalization ──────────────────────────────────────────────────────────

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(\d{4}-\d{2}-\d{2})[ T](\d{2}:\d{2}:\d{2})(?:\.\d+)?\s*(Z|[+-]\d{2}:?\d{2})?\s*$",
        )
        .expect("regex is valid")
    })
}

/// Parse an offset suffix such as `Z`, `+08:00` or `-0500`.
fn parse_offset(suffix: &str) -> Option<FixedOffset> {
    if suffix == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = if suffix.starts_with('-') { -1 } else { 1 };
    let digits: String = suffix[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Canonicalize a raw export timestamp to a naive local [`NaiveDateTime`].
///
/// Fractional seconds are truncated. The offset suffix, when present, is
/// either discarded or used to convert into the target zone depending on
/// `mode`. Anything that does not look like `YYYY-MM-DD HH:MM:SS` fails with
/// [`VizError::TimestampParse`].
pub fn canonicalize_timestamp(raw: &str, mode: TimestampMode) -> Result<NaiveDateTime> {
    let caps = timestamp_regex()
        .captures(raw)
        .ok_or_else(|| VizError::TimestampParse(raw.to_string()))?;

    let printed = format!("{} {}", &caps[1], &caps[2]);
    let naive = NaiveDateTime::parse_from_str(&printed, CANONICAL_FORMAT)
        .map_err(|_| VizError::TimestampParse(raw.to_string()))?;

    let TimestampMode::Convert(tz) = mode else {
        return Ok(naive);
    };
    let Some(suffix) = caps.get(3) else {
        return Ok(naive);
    };

    let offset =
        parse_offset(suffix.as_str()).ok_or_else(|| VizError::TimestampParse(raw.to_string()))?;
    let local = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| VizError::TimestampParse(raw.to_string()))?;
    Ok(local.with_timezone(&tz).naive_local())
}

// ── Night bucketing ───────────────────────────────────────────────────────────

/// Assign a timestamp to its sleep night.
///
/// At or after 18:00 the night is the same calendar date; before 18:00 it is
/// the previous date.
pub fn night_bucket(ts: NaiveDateTime) -> NightBucket {
    let date = ts.date();
    if ts.hour() >= NIGHT_BOUNDARY_HOUR {
        NightBucket(date)
    } else {
        NightBucket(date - Duration::days(1))
    }
}

/// Format a timestamp as a 24-hour `HH:MM` clock string.
pub fn format_clock(ts: &NaiveDateTime) -> String {
    ts.format("%H:%M").to_string()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, CANONICAL_FORMAT).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NightBucket {
        NightBucket(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    // ── canonicalize_timestamp ───────────────────────────────────────────────

    #[test]
    fn test_canonicalize_plain() {
        let dt = canonicalize_timestamp("2024-01-15 22:30:00", TimestampMode::WallClock).unwrap();
        assert_eq!(dt, ts("2024-01-15 22:30:00"));
    }

    #[test]
    fn test_canonicalize_drops_offset() {
        let dt =
            canonicalize_timestamp("2024-01-15 22:30:00 +0800", TimestampMode::WallClock).unwrap();
        assert_eq!(dt, ts("2024-01-15 22:30:00"));
    }

    #[test]
    fn test_canonicalize_drops_colon_offset_and_t_separator() {
        let dt = canonicalize_timestamp("2024-01-15T22:30:00-05:00", TimestampMode::WallClock)
            .unwrap();
        assert_eq!(dt, ts("2024-01-15 22:30:00"));
    }

    #[test]
    fn test_canonicalize_truncates_fraction() {
        let dt = canonicalize_timestamp("2024-01-15T22:30:59.999999", TimestampMode::WallClock)
            .unwrap();
        assert_eq!(dt, ts("2024-01-15 22:30:59"));
    }

    #[test]
    fn test_canonicalize_z_suffix() {
        let dt =
            canonicalize_timestamp("2024-01-15T22:30:00Z", TimestampMode::WallClock).unwrap();
        assert_eq!(dt, ts("2024-01-15 22:30:00"));
    }

    #[test]
    fn test_canonicalize_convert_mode_shifts_offset_stamps() {
        let mode = TimestampMode::Convert(Tz::UTC);
        let dt = canonicalize_timestamp("2024-01-15 22:30:00 +0800", mode).unwrap();
        assert_eq!(dt, ts("2024-01-15 14:30:00"));
    }

    #[test]
    fn test_canonicalize_convert_mode_keeps_naive_stamps() {
        let mode = TimestampMode::Convert(Tz::Asia__Tokyo);
        let dt = canonicalize_timestamp("2024-01-15 22:30:00", mode).unwrap();
        assert_eq!(dt, ts("2024-01-15 22:30:00"));
    }

    #[test]
    fn test_canonicalize_garbage_fails() {
        let err = canonicalize_timestamp("not-a-date", TimestampMode::WallClock).unwrap_err();
        assert!(matches!(err, VizError::TimestampParse(s) if s == "not-a-date"));
    }

    #[test]
    fn test_canonicalize_invalid_calendar_date_fails() {
        assert!(canonicalize_timestamp("2024-02-31 10:00:00", TimestampMode::WallClock).is_err());
    }

    // ── TimestampMode ────────────────────────────────────────────────────────

    #[test]
    fn test_mode_wall_setting() {
        assert_eq!(TimestampMode::from_setting("wall"), TimestampMode::WallClock);
        assert_eq!(TimestampMode::from_setting(""), TimestampMode::WallClock);
    }

    #[test]
    fn test_mode_named_zone() {
        assert_eq!(
            TimestampMode::from_setting("Europe/Berlin"),
            TimestampMode::Convert(Tz::Europe__Berlin)
        );
    }

    #[test]
    fn test_mode_invalid_zone_falls_back_to_wall_clock() {
        assert_eq!(
            TimestampMode::from_setting("Mars/Olympus"),
            TimestampMode::WallClock
        );
    }

    // ── night_bucket ─────────────────────────────────────────────────────────

    #[test]
    fn test_bucket_just_before_boundary_is_previous_day() {
        assert_eq!(night_bucket(ts("2024-01-01 17:59:00")), date(2023, 12, 31));
    }

    #[test]
    fn test_bucket_at_boundary_is_same_day() {
        assert_eq!(night_bucket(ts("2024-01-01 18:00:00")), date(2024, 1, 1));
    }

    #[test]
    fn test_bucket_midnight_and_morning() {
        assert_eq!(night_bucket(ts("2024-03-01 00:00:00")), date(2024, 2, 29));
        assert_eq!(night_bucket(ts("2024-03-01 06:30:00")), date(2024, 2, 29));
        assert_eq!(night_bucket(ts("2024-03-01 23:59:59")), date(2024, 3, 1));
    }

    #[test]
    fn test_bucket_every_hour_of_day() {
        for hour in 0..24 {
            let t = ts(&format!("2024-06-10 {:02}:15:00", hour));
            let expected = if hour >= 18 {
                date(2024, 6, 10)
            } else {
                date(2024, 6, 9)
            };
            assert_eq!(night_bucket(t), expected, "hour {hour}");
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(&ts("2024-01-01 07:05:59")), "07:05");
    }

    #[test]
    fn test_get_system_timezone_returns_nonempty_string() {
        assert!(!get_system_timezone().is_empty());
    }
}
