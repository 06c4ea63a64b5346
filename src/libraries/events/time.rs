//! Wire timestamp handling

use crate::libraries::helpers::constants::{ENVELOPE_TIME_FORMAT, WIRE_TIME_FORMAT};
use chrono::{NaiveDateTime, ParseResult, Timelike, Utc};

/// [`WIRE_TIME_FORMAT`] with an optional fractional second component
const WIRE_TIME_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Parses a payload timestamp, discarding any sub-second content
pub fn parse_wire_timestamp(raw: &str) -> ParseResult<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(raw, WIRE_TIME_PARSE_FORMAT)?;
    Ok(parsed.with_nanosecond(0).unwrap_or(parsed))
}

/// Formats a timestamp in the payload wire format
pub fn format_wire_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(WIRE_TIME_FORMAT).to_string()
}

/// Current UTC time in the envelope `datetime` format
pub fn envelope_timestamp() -> String {
    Utc::now().format(ENVELOPE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_wire_timestamps() {
        let parsed = parse_wire_timestamp("2024-03-01 10:20:30").unwrap();
        assert_eq!(format_wire_timestamp(parsed), "2024-03-01 10:20:30");
    }

    #[test]
    fn discards_sub_second_content() {
        let parsed = parse_wire_timestamp("2024-03-01 10:20:30.789123").unwrap();
        assert_eq!(parsed.nanosecond(), 0);
        assert_eq!(format_wire_timestamp(parsed), "2024-03-01 10:20:30");
    }

    #[test]
    fn truncation_is_idempotent() {
        for raw in &["2024-03-01 10:20:30", "2024-03-01 10:20:30.5", "2024-03-01 10:20:30.999999"] {
            let once = format_wire_timestamp(parse_wire_timestamp(raw).unwrap());
            let twice = format_wire_timestamp(parse_wire_timestamp(&once).unwrap());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_wire_timestamp("yesterday").is_err());
    }
}
