use chrono::{DateTime, Utc};

/// Human-readable span of an incident, e.g.
/// `08:00:00 - 08:05:00 on 11-July-2025`.
///
/// Times are UTC in 24-hour form; the date is taken from `start`.
pub fn format_range(start: &DateTime<Utc>, end: &DateTime<Utc>) -> String {
    format!(
        "{} - {} on {}",
        start.format("%H:%M:%S"),
        end.format("%H:%M:%S"),
        start.format("%-d-%B-%Y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_range() {
        let start = Utc.with_ymd_and_hms(2025, 7, 11, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 7, 11, 8, 5, 30).unwrap();
        assert_eq!(format_range(&start, &end), "08:00:00 - 08:05:30 on 11-July-2025");
    }

    #[test]
    fn test_format_range_across_midnight_uses_start_date() {
        let start = Utc.with_ymd_and_hms(2025, 3, 2, 23, 58, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 3, 0, 3, 0).unwrap();
        assert_eq!(format_range(&start, &end), "23:58:00 - 00:03:00 on 2-March-2025");
    }
}
