use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 (`2024-01-01T10:00:00.000000000Z`) so stored timestamps sort
/// lexicographically. Nanosecond precision: a logout microseconds after its login still sorts after it.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_optional_datetime(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>> {
    match value {
        Some(raw) => parse_datetime(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn to_i64(value: u32) -> i64 {
    i64::from(value)
}

pub fn to_u32(value: i64, field: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{field} contains out-of-range value {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_timestamps_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 9, 59, 59).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1500);

        let a = format_datetime(&earlier);
        let b = format_datetime(&later);

        assert_eq!(a, "2024-03-01T09:59:59.000000000Z");
        assert_eq!(b, "2024-03-01T10:00:00.500000000Z");
        assert!(a < b);
        assert_eq!(parse_datetime(&b, "login_at").unwrap(), later);

        let just_after = later + chrono::Duration::microseconds(400);
        let c = format_datetime(&just_after);
        assert_eq!(c, "2024-03-01T10:00:00.500400000Z");
        assert!(b < c, "sub-millisecond gaps must survive storage");
        assert_eq!(parse_datetime(&c, "logout_at").unwrap(), just_after);
    }

    #[test]
    fn negative_level_is_rejected() {
        assert!(to_u32(-1, "level").is_err());
        assert_eq!(to_u32(42, "level").unwrap(), 42);
    }
}
