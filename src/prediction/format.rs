//! Display formatting for prediction records.

use super::PredictionResult;
use chrono::{DateTime, Local, TimeZone};

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.plantcare.example";

/// Formats a timestamp as a long US date with a 12-hour time,
/// e.g. `May 15, 2025 at 08:43 AM`. The timestamp's own offset is kept.
pub fn format_prediction_date<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%B %-d, %Y at %I:%M %p").to_string()
}

/// Same as [`format_prediction_date`], in the machine's local time zone.
pub fn format_prediction_date_local<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String {
    format_prediction_date(&timestamp.with_timezone(&Local))
}

/// Parses an RFC 3339 timestamp and formats it, or `None` if it does not parse.
pub fn format_prediction_date_str(timestamp: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|ts| format_prediction_date(&ts))
}

/// URL of the stored image behind a prediction.
pub fn plant_image_url(prediction: &PredictionResult, base_url: Option<&str>) -> String {
    let base = base_url.unwrap_or(DEFAULT_API_BASE_URL).trim_end_matches('/');
    format!("{}/images/{}", base, prediction.image_path)
}
