//! Records exchanged with the PlantCare backend.

use crate::prediction::PredictionResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Envelope used by the profile endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

/// Response body of the image upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
}

impl UserProfile {
    /// "First Last" when both names are set, otherwise the username.
    pub fn display_name(&self) -> String {
        match (non_empty(&self.first_name), non_empty(&self.last_name)) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            _ => self.username.clone(),
        }
    }
}

/// Partial profile sent with an update; absent fields are left to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProfileUpdate {
    /// Starts an update pre-filled with the editable fields of `profile`.
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            username: Some(profile.username.clone()),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            avatar: profile.avatar.clone(),
            cover_image: profile.cover_image.clone(),
            description: profile.description.clone(),
        }
    }
}

/// Which profile picture an upload replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Avatar,
    Cover,
}

impl ImageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Avatar => "avatar",
            ImageKind::Cover => "cover",
        }
    }
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary counters shown on the profile page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub scans: usize,
    /// Scans that found a disease.
    pub detections: usize,
    /// Distinct plant types scanned.
    pub plants: usize,
}

impl ProfileStats {
    pub fn from_history(history: &[PredictionResult]) -> Self {
        let plants: HashSet<&str> = history.iter().map(|p| p.plant_type.as_str()).collect();
        Self {
            scans: history.len(),
            detections: history.iter().filter(|p| !p.is_healthy()).count(),
            plants: plants.len(),
        }
    }
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::mock;
    use chrono::Utc;

    #[test]
    fn test_display_name() {
        let mut profile = mock::sample_profile();
        assert_eq!(profile.display_name(), "John Doe");

        profile.last_name = None;
        assert_eq!(profile.display_name(), "johndoe");

        profile.last_name = Some(String::new());
        assert_eq!(profile.display_name(), "johndoe");
    }

    #[test]
    fn test_update_serializes_only_present_fields() {
        let update = ProfileUpdate {
            username: Some("jane".into()),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"username":"jane"}"#);
    }

    #[test]
    fn test_envelope_round_trip() {
        let body = r#"{"message":"Profile retrieved successfully","data":{"user_id":"u","username":"johndoe","email":"j@example.com","first_name":null,"last_name":null,"avatar":null,"cover_image":null,"description":null}}"#;
        let response: ApiResponse<UserProfile> = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.username, "johndoe");
        assert!(response.data.first_name.is_none());
    }

    #[test]
    fn test_stats_from_history() {
        let now = Utc::now();
        let mut healthy = mock::sample_prediction(now);
        healthy.class_name = "Tomato___healthy".into();
        healthy.condition = "healthy".into();
        let mut pepper = mock::sample_prediction(now);
        pepper.plant_type = "Pepper".into();

        let stats = ProfileStats::from_history(&[mock::sample_prediction(now), healthy, pepper]);
        assert_eq!(
            stats,
            ProfileStats {
                scans: 3,
                detections: 2,
                plants: 2
            }
        );
    }
}
