use crate::models::NIGHT_BOUNDARY_HOUR;

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Format a duration in seconds as `"<h>h <m>m"`, flooring both parts.
///
/// # Examples
///
/// ```
/// use viz_core::formatting::format_hour_minute;
///
/// assert_eq!(format_hour_minute(28_800.0), "8h 0m");
/// assert_eq!(format_hour_minute(27_059.0), "7h 30m");
/// assert_eq!(format_hour_minute(59.0),     "0h 0m");
/// ```
pub fn format_hour_minute(seconds: f64) -> String {
    let secs = seconds.max(0.0);
    let hours = (secs / 3600.0).floor();
    let minutes = ((secs / 60.0).floor()) % 60.0;
    format!("{:.0}h {:.0}m", hours, minutes)
}

/// Render an offset from the 18:00 night anchor as a wall-clock `HH:MM`.
///
/// Seconds are truncated and the result wraps past midnight.
///
/// # Examples
///
/// ```
/// use viz_core::formatting::format_anchored_clock;
///
/// assert_eq!(format_anchored_clock(0.0),              "18:00");
/// assert_eq!(format_anchored_clock(5.0 * 3600.0),     "23:00");
/// assert_eq!(format_anchored_clock(12.5 * 3600.0),    "06:30");
/// ```
pub fn format_anchored_clock(offset_seconds: f64) -> String {
    let anchor = i64::from(NIGHT_BOUNDARY_HOUR) * 3600;
    let wall = (anchor + offset_seconds.floor() as i64).rem_euclid(SECONDS_PER_DAY);
    format!("{:02}:{:02}", wall / 3600, (wall / 60) % 60)
}

/// Format an integer count with thousands separators.
///
/// # Examples
///
/// ```
/// use viz_core::formatting::format_count;
///
/// assert_eq!(format_count(999),       "999");
/// assert_eq!(format_count(1_234_567), "1,234,567");
/// ```
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── format_hour_minute ───────────────────────────────────────────────────

    #[test]
    fn test_hour_minute_zero() {
        assert_eq!(format_hour_minute(0.0), "0h 0m");
    }

    #[test]
    fn test_hour_minute_floors_fraction() {
        // 7h 29m 59.9s stays at 29 minutes
        assert_eq!(format_hour_minute(26_999.9), "7h 29m");
    }

    #[test]
    fn test_hour_minute_long_night() {
        assert_eq!(format_hour_minute(11.0 * 3600.0 + 5.0 * 60.0), "11h 5m");
    }

    #[test]
    fn test_hour_minute_negative_clamps() {
        assert_eq!(format_hour_minute(-30.0), "0h 0m");
    }

    // ── format_anchored_clock ────────────────────────────────────────────────

    #[test]
    fn test_anchored_clock_before_midnight() {
        assert_eq!(format_anchored_clock(4.0 * 3600.0 + 15.0 * 60.0), "22:15");
    }

    #[test]
    fn test_anchored_clock_wraps_past_midnight() {
        assert_eq!(format_anchored_clock(6.0 * 3600.0), "00:00");
        assert_eq!(format_anchored_clock(13.0 * 3600.0 + 59.0), "07:00");
    }

    #[test]
    fn test_anchored_clock_truncates_seconds() {
        assert_eq!(format_anchored_clock(59.9), "18:00");
    }

    // ── format_count ─────────────────────────────────────────────────────────

    #[test]
    fn test_format_count_groups() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(12_345), "12,345");
    }
}
