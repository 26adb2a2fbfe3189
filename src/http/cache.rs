//! Validator headers
//!
//! `Last-Modified` and `ETag` values derived from a file's modification time.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Format a timestamp as an RFC 1123 HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Raw modification-time token used as the `ETag`
///
/// Seconds since the epoch with microsecond precision, e.g. `784111777.250000`.
/// Times before the epoch collapse to `0.000000`.
pub fn mtime_token(time: SystemTime) -> String {
    let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
    format!(
        "{}.{:06}",
        since_epoch.as_secs(),
        since_epoch.subsec_micros()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_http_date_rfc1123() {
        let time = UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_http_date_pads_day() {
        let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        assert_eq!(http_date(time), "Tue, 14 Nov 2023 22:13:20 GMT");
    }

    #[test]
    fn test_mtime_token() {
        let time = UNIX_EPOCH + Duration::from_millis(784_111_777_250);
        assert_eq!(mtime_token(time), "784111777.250000");
        assert_eq!(mtime_token(UNIX_EPOCH), "0.000000");
    }

    #[test]
    fn test_mtime_token_changes_with_time() {
        let a = UNIX_EPOCH + Duration::from_secs(10);
        let b = a + Duration::from_micros(1);
        assert_ne!(mtime_token(a), mtime_token(b));
    }
}
