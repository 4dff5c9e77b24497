//! Label and comparison persistence
//!
//! Timestamps are stored as fixed-width RFC 3339 text (microseconds, `Z`)
//! so lexical order in SQL matches chronological order.

use chrono::{DateTime, SecondsFormat, Utc};
use labeler_common::{Error, Result};

pub mod comparisons;
pub mod labels;

/// Format a timestamp for storage
pub(crate) fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub(crate) fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Corrupt timestamp '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let encoded = encode_timestamp(ts);
        assert_eq!(encoded, "2025-03-04T05:06:07.000000Z");
        assert_eq!(decode_timestamp(&encoded).unwrap(), ts);
    }

    #[test]
    fn test_encoded_timestamps_sort_lexically() {
        let earlier = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let later = earlier + chrono::Duration::milliseconds(1);
        assert!(encode_timestamp(earlier) < encode_timestamp(later));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_timestamp("yesterday").is_err());
    }
}
