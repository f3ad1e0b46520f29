use std::time::Duration;

/// Formats an elapsed time for people: `350ms`, `12.4s`, `2m 5s`, `1h 3m`.
pub fn pretty_duration(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    if millis < 1_000 {
        return format!("{millis}ms");
    }

    // Thresholds apply to the rounded value, so 59.96s is `1m 0s`.
    let tenths = (millis + 50) / 100;
    if tenths < 600 {
        return format!("{}.{}s", tenths / 10, tenths % 10);
    }

    let secs = (millis + 500) / 1_000;
    if secs < 3_600 {
        return format!("{}m {}s", secs / 60, secs % 60);
    }
    format!("{}h {}m", secs / 3_600, (secs % 3_600) / 60)
}
