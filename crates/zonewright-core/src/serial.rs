// ── Zone serial numbers ──
//
// Serials follow the `YYYYMMDDnn` convention: the date of the last change
// followed by a two-digit daily sequence.

use chrono::NaiveDate;

/// Render a date as the `YYYYMMDD` serial prefix.
pub fn today_prefix(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Compute the serial to write into a regenerated zone.
///
/// A numeric serial from today is incremented, keeping its width. Anything
/// else (older or future date, empty, garbage) restarts at `<today>00`.
pub fn next_serial(current: &str, today: &str) -> String {
    if current.starts_with(today) {
        if let Some(next) = current.parse::<u64>().ok().and_then(|n| n.checked_add(1)) {
            return format!("{next:0width$}", width = current.len());
        }
    }
    format!("{today}00")
}
