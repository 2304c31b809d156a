use chrono::{DateTime, Utc};

/// Convert Unix timestamp to DateTime<Utc>
pub fn from_unix_timestamp(timestamp: u64) -> Option<DateTime<Utc>> {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Convert timestamp to human readable format
pub fn format_timestamp(timestamp: u64) -> String {
    match from_unix_timestamp(timestamp) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{}", timestamp),
    }
}

/// Absolute distance in seconds between two Unix timestamps
pub fn time_diff_seconds(a: u64, b: u64) -> u64 {
    a.abs_diff(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00 UTC");
        assert_eq!(format_timestamp(1_700_000_000), "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn test_time_diff_seconds() {
        assert_eq!(time_diff_seconds(100, 130), 30);
        assert_eq!(time_diff_seconds(130, 100), 30);
    }
}
