//! Date parameter parsing.

use jiff::{Timestamp, civil::Date, tz::TimeZone};

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD` date taken as UTC
/// midnight.
pub(crate) fn parse_timestamp(value: &str) -> Result<Timestamp, jiff::Error> {
    let value = value.trim();

    value.parse::<Timestamp>().or_else(|timestamp_error| {
        value
            .parse::<Date>()
            .and_then(|date| date.to_zoned(TimeZone::UTC))
            .map(|zoned| zoned.timestamp())
            .map_err(|_date_error| timestamp_error)
    })
}
