//! HTTP backend built on `reqwest`.

use super::{
    ApiResponse, ImageKind, PlantCareApi, ProfileUpdate, ServiceError, UploadResponse,
    UserProfile,
};
use crate::capture::CapturedImage;
use crate::prediction::PredictionResult;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Backend client talking to a live PlantCare API.
#[derive(Clone)]
pub struct HttpPlantCareApi {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpPlantCareApi {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ServiceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn image_part(image: &CapturedImage) -> Result<Part, ServiceError> {
        Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name())
            .mime_str(image.mime_type())
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Backend responded");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Backend request failed");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlantCareApi for HttpPlantCareApi {
    async fn fetch_profile(&self) -> Result<UserProfile, ServiceError> {
        let response: ApiResponse<UserProfile> =
            self.send(self.http.get(self.url("/user/profile"))).await?;
        Ok(response.data)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ServiceError> {
        let response: ApiResponse<UserProfile> = self
            .send(self.http.put(self.url("/user/profile")).json(update))
            .await?;
        Ok(response.data)
    }

    async fn upload_profile_image(
        &self,
        image: &CapturedImage,
        kind: ImageKind,
    ) -> Result<String, ServiceError> {
        let form = Form::new()
            .part("file", Self::image_part(image)?)
            .text("type", kind.as_str());
        let response: UploadResponse = self
            .send(self.http.post(self.url("/user/upload-image")).multipart(form))
            .await?;
        Ok(response.url)
    }

    async fn submit_prediction(
        &self,
        image: &CapturedImage,
    ) -> Result<PredictionResult, ServiceError> {
        let form = Form::new().part("image", Self::image_part(image)?);
        self.send(self.http.post(self.url("/predict")).multipart(form))
            .await
    }

    async fn fetch_history(&self) -> Result<Vec<PredictionResult>, ServiceError> {
        self.send(self.http.get(self.url("/predictions"))).await
    }
}
