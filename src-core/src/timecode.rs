//! Millisecond timestamp formatting for time labels and annotation listings.

/// Format a millisecond offset as `HH:MM:SS.mmm`.
pub fn ms_to_timestamp(ms: u64) -> String {
    let millis = ms % 1_000;
    let seconds = (ms / 1_000) % 60;
    let minutes = (ms / 60_000) % 60;
    let hours = ms / 3_600_000;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero() {
        assert_eq!(ms_to_timestamp(0), "00:00:00.000");
    }

    #[test]
    fn test_sub_second() {
        assert_eq!(ms_to_timestamp(42), "00:00:00.042");
    }

    #[test]
    fn test_minutes_and_seconds() {
        assert_eq!(ms_to_timestamp(83_456), "00:01:23.456");
    }

    #[test]
    fn test_hours() {
        assert_eq!(ms_to_timestamp(3_600_000 + 61_000 + 1), "01:01:01.001");
    }
}
