use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current wall-clock time as Unix epoch seconds.
pub fn now_epoch() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Current wall-clock time as an RFC3339/ISO8601 string.
pub fn now_iso8601() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

/// Parse an RFC3339 timestamp (the shape remote hosts report `pushed_at` in)
/// into Unix epoch seconds.
pub fn parse_rfc3339_epoch(raw: &str) -> Option<i64> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .map(|t| t.unix_timestamp())
}
