// Formatting helpers for feed rendering

use chrono::{DateTime, Utc};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;

/// Relative label for an event, e.g. "5 minutes ago".
///
/// Counts are rounded to the nearest unit (halves away from zero). From a
/// week on, the absolute date is shown instead ("Jan 9, 2026").
pub fn time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let elapsed = (now - then).num_seconds();

    if elapsed < MINUTE {
        "Just now".to_string()
    } else if elapsed < HOUR {
        plural_ago(elapsed, MINUTE, "minute")
    } else if elapsed < DAY {
        plural_ago(elapsed, HOUR, "hour")
    } else if elapsed < WEEK {
        plural_ago(elapsed, DAY, "day")
    } else {
        then.format("%b %-d, %Y").to_string()
    }
}

fn plural_ago(elapsed: i64, unit: i64, name: &str) -> String {
    let count = (elapsed as f64 / unit as f64).round() as i64;
    if count == 1 {
        format!("1 {} ago", name)
    } else {
        format!("{} {}s ago", count, name)
    }
}

/// Uppercased first character of a username, for the avatar bubble
pub fn avatar_letter(username: &str) -> String {
    username
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "?".to_string())
}
