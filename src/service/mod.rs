//! Backend collaborator.
//!
//! Everything the client needs from the PlantCare backend goes through the
//! [`PlantCareApi`] trait so workflows can be driven by the in-process
//! [`MockPlantCareApi`] or, with the `http` feature, by [`HttpPlantCareApi`].
//!
//! | Operation              | Endpoint                  |
//! |------------------------|---------------------------|
//! | `fetch_profile`        | `GET /user/profile`       |
//! | `update_profile`       | `PUT /user/profile`       |
//! | `upload_profile_image` | `POST /user/upload-image` |
//! | `submit_prediction`    | `POST /predict`           |
//! | `fetch_history`        | `GET /predictions`        |

#[cfg(feature = "http")]
mod http;
pub mod mock;
mod types;

#[cfg(feature = "http")]
pub use http::HttpPlantCareApi;
pub use mock::{MockDelays, MockPlantCareApi};
pub use types::{ApiResponse, ImageKind, ProfileStats, ProfileUpdate, UploadResponse, UserProfile};

use crate::capture::CapturedImage;
use crate::prediction::PredictionResult;
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a [`PlantCareApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// The backend contract the client depends on.
#[async_trait]
pub trait PlantCareApi: Send + Sync {
    /// Fetches the signed-in user's profile.
    async fn fetch_profile(&self) -> Result<UserProfile, ServiceError>;

    /// Applies a partial update and returns the stored profile.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ServiceError>;

    /// Uploads an avatar or cover picture and returns its URL.
    async fn upload_profile_image(
        &self,
        image: &CapturedImage,
        kind: ImageKind,
    ) -> Result<String, ServiceError>;

    /// Submits a still for classification.
    async fn submit_prediction(
        &self,
        image: &CapturedImage,
    ) -> Result<PredictionResult, ServiceError>;

    /// Past predictions of the signed-in user, newest first.
    async fn fetch_history(&self) -> Result<Vec<PredictionResult>, ServiceError>;
}
