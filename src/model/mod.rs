pub mod activity;
pub mod company;
pub mod payment;
pub mod quote_request;
pub mod role;
pub mod user;

use chrono::{SecondsFormat, Utc};

/// Current UTC time as a fixed-width RFC 3339 string.
///
/// Fixed width keeps lexical order equal to chronological order, which the
/// `created_at` sorts rely on.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
