pub mod analytics;
pub mod auth;
pub mod contacts;
pub mod error;
pub mod mailer;
pub mod middleware;
pub mod newsletter;
pub mod routes;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

/// Stored timestamps are RFC 3339 text; older SQLite defaults produced
/// "YYYY-MM-DD HH:MM:SS" without a timezone, so fall back to parsing that as
/// naive UTC before giving up.
pub(crate) fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}
