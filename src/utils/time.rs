use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Parse a filter bound.
///
/// Accepts a full RFC 3339 instant, or a bare time of day (`HH:MM:SS` or
/// `HH:MM`) which is placed on `reference_date` in UTC.
pub fn parse_instant(input: &str, reference_date: NaiveDate) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }

    // An unescaped '+' in a query string arrives as a space
    if let Some(instant) = restore_plus_offset(input)
        .and_then(|restored| DateTime::parse_from_rfc3339(&restored).ok())
    {
        return Some(instant.with_timezone(&Utc));
    }

    NaiveTime::parse_from_str(input, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(input, "%H:%M"))
        .ok()
        .map(|time| reference_date.and_time(time).and_utc())
}

fn restore_plus_offset(input: &str) -> Option<String> {
    let (head, offset) = input.rsplit_once(' ')?;
    let bytes = offset.as_bytes();
    let is_offset = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    is_offset.then(|| format!("{}+{}", head, offset))
}
