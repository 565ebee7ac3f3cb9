//! Human-readable durations for finding details.

use chrono::TimeDelta;

const UNITS: [(i64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

/// Render a duration as its two most significant units.
///
/// Rendering starts at the largest non-zero unit among days, hours,
/// minutes and seconds and always includes the next smaller unit, even
/// when it is zero. Sub-second precision is truncated.
///
/// - 5 minutes      → `5m0s`
/// - 26h 30m 10s    → `1d2h`
/// - 45 seconds     → `45s`
/// - zero/negative  → `0s`
pub fn humanize_duration(d: TimeDelta) -> String {
    let mut secs = d.num_seconds();
    if secs <= 0 {
        return "0s".to_string();
    }

    let mut parts = Vec::with_capacity(2);
    for (size, unit) in UNITS {
        let amount = secs / size;
        secs %= size;
        if parts.is_empty() && amount == 0 {
            continue;
        }
        parts.push(format!("{amount}{unit}"));
        if parts.len() == 2 {
            break;
        }
    }

    parts.concat()
}
