//! The prediction record returned by the classification service.

use super::{parse_advice, AdviceSections, ConfidenceLevel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Extended-JSON date wrapper (`{"$date": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDate {
    #[serde(rename = "$date")]
    pub date: DateTime<Utc>,
}

/// Extended-JSON object id wrapper (`{"$oid": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectId {
    #[serde(rename = "$oid")]
    pub oid: String,
}

/// A disease classification computed by the external service.
///
/// Treated as opaque apart from the helpers below; this crate never
/// produces real predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub class_id: u32,
    pub class_name: String,
    /// Score in `[0, 1]`.
    pub confidence: f64,
    pub plant_type: String,
    pub condition: String,
    pub display_name: String,
    pub advice: String,
    pub user_id: String,
    pub prediction_id: String,
    pub timestamp: DateTime<Utc>,
    /// Storage reference of the submitted image.
    pub image_path: String,
    pub created_at: StoredDate,
    pub storage_type: String,
    #[serde(rename = "_id")]
    pub id: ObjectId,
}

impl PredictionResult {
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    pub fn advice_sections(&self) -> AdviceSections {
        parse_advice(&self.advice)
    }

    /// Returns true when the classifier reported a healthy plant.
    pub fn is_healthy(&self) -> bool {
        self.class_name.to_ascii_lowercase().ends_with("healthy")
            || self.condition.eq_ignore_ascii_case("healthy")
    }
}
