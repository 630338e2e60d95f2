use chrono::{DateTime, Duration, FixedOffset, Utc};

/// SNAP timestamps are always expressed in Asia/Jakarta civil time (UTC+7)
pub const JAKARTA_OFFSET_SECONDS: i32 = 7 * 3600;

/// SNAP timestamp layout: `YYYY-MM-DDThh:mm:ss+07:00`
pub const SNAP_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

fn jakarta_offset() -> FixedOffset {
    match FixedOffset::east_opt(JAKARTA_OFFSET_SECONDS) {
        Some(offset) => offset,
        None => unreachable!("UTC+7 is a valid offset"),
    }
}

/// Convert UTC timestamp to Asia/Jakarta timezone (UTC+7)
pub fn utc_to_jakarta(utc_time: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc_time.with_timezone(&jakarta_offset())
}

/// Format a UTC instant as a SNAP timestamp
pub fn format_snap_timestamp(utc_time: DateTime<Utc>) -> String {
    utc_to_jakarta(utc_time)
        .format(SNAP_TIMESTAMP_FORMAT)
        .to_string()
}

/// Current time as a SNAP timestamp (X-TIMESTAMP header value)
pub fn snap_timestamp_now() -> String {
    format_snap_timestamp(Utc::now())
}

/// SNAP timestamp `offset` from now, used for expiry/validity fields
pub fn snap_timestamp_after(offset: Duration) -> String {
    format_snap_timestamp(Utc::now() + offset)
}

/// Parse a SNAP (RFC 3339) timestamp back into UTC
pub fn parse_snap_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
