//! Prediction records and the helpers used to render them.
//!
//! Classification happens in an external service; this module only reads
//! its records, sections the advice text and maps scores to styling.

mod advice;
mod confidence;
mod format;
mod result;

pub use advice::{
    advice_lines, parse_advice, AdviceLine, AdviceSections, ADDITIONAL_MARKER, PREVENTION_MARKER,
    TREATMENT_MARKER,
};
pub use confidence::{
    confidence_badge_class, confidence_percent, confidence_text_class, ConfidenceLevel,
};
pub use format::{
    format_prediction_date, format_prediction_date_local, format_prediction_date_str,
    plant_image_url, DEFAULT_API_BASE_URL,
};
pub use result::{ObjectId, PredictionResult, StoredDate};
