//! Timetable time handling.
//!
//! All times are whole seconds since the Unix epoch and all durations are
//! whole seconds. Rendering goes through `chrono` so that logs and journey
//! descriptions show clock times rather than raw integers.

use chrono::DateTime;

/// Seconds since the Unix epoch.
pub type Time = u64;

/// Render a timestamp as a UTC clock time (`HH:MM:SS`).
///
/// Timestamps that do not fit a calendar date are rendered as the raw
/// number of seconds.
///
/// # Examples
///
/// ```
/// use transit_scan::domain::format_clock;
///
/// assert_eq!(format_clock(0), "00:00:00");
/// assert_eq!(format_clock(10 * 3600 + 25 * 60), "10:25:00");
/// ```
pub fn format_clock(time: Time) -> String {
    i64::try_from(time)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| format!("@{time}"))
}

/// Render a duration in seconds as `1h05m`, `12m30s` or `45s`.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let rest = secs % 60;

    if hours > 0 {
        format!("{hours}h{mins:02}m")
    } else if mins > 0 && rest > 0 {
        format!("{mins}m{rest:02}s")
    } else if mins > 0 {
        format!("{mins}m")
    } else {
        format!("{rest}s")
    }
}
