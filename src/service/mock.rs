//! In-process backend returning fixed payloads after an artificial delay.

use super::{ImageKind, PlantCareApi, ProfileUpdate, ServiceError, UserProfile};
use crate::capture::CapturedImage;
use crate::prediction::{ObjectId, PredictionResult, StoredDate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

pub const SAMPLE_USER_ID: &str = "69647e40-60d4-4aca-b529-cef0f1ce9270";
const SAMPLE_EMAIL: &str = "john.doe@example.com";
const SAMPLE_USERNAME: &str = "johndoe";

/// Advice text of the sample Septoria leaf spot prediction.
pub const SAMPLE_ADVICE: &str = "TREATMENT:\n**\n\nSeptoria leaf spot is a fungal disease, and early intervention is key to managing it.\n\n*   **Organic/Natural Remedies:**\n\n    *   **Pruning:** Immediately remove and destroy (burn or dispose of in the trash, *not* compost) any leaves showing signs of infection. This is crucial to reduce the fungal load. Prune lower leaves first, as they are often the first to be affected due to soil splash.\n    *   **Baking Soda Spray:** A baking soda solution can help raise the pH on the leaf surface, making it less hospitable to the fungus. Mix 1 tablespoon of baking soda with 1 teaspoon of liquid dish soap (not detergent) in 1 gallon of water. Spray thoroughly, covering all leaf surfaces, including the undersides. Apply every 7-10 days. *Note: Baking soda can sometimes cause leaf burn, so test on a small area first.*\n    *   **Copper Fungicides (Organic Options):** Copper-based fungicides are a common organic treatment. Look for products containing copper octanoate or copper sulfate. Follow the label instructions carefully for mixing and application rates.\n\n*   **Chemical Treatments (If Appropriate):**\n\n    *   **Chlorothalonil:** A broad-spectrum fungicide that is effective against Septoria leaf spot.\n    *   **Mancozeb:** Another broad-spectrum fungicide.\n\n**\n\nPREVENTION:\n**\n\nPrevention is crucial to minimizing the impact of Septoria leaf spot.\n\n*   **Crop Rotation:** Avoid planting tomatoes in the same location year after year.\n*   **Spacing:** Provide adequate spacing between plants for better air circulation.\n\nADDITIONAL INFORMATION:\nNo additional information was provided.";

/// The fixed profile served by the mock.
pub fn sample_profile() -> UserProfile {
    UserProfile {
        user_id: SAMPLE_USER_ID.to_string(),
        username: SAMPLE_USERNAME.to_string(),
        email: SAMPLE_EMAIL.to_string(),
        first_name: Some("John".to_string()),
        last_name: Some("Doe".to_string()),
        avatar: None,
        cover_image: None,
        description: Some(
            "Plant enthusiast and hobbyist gardener. Looking to identify plant diseases and keep my garden healthy."
                .to_string(),
        ),
    }
}

/// The fixed Septoria leaf spot prediction, stamped with `now`.
pub fn sample_prediction(now: DateTime<Utc>) -> PredictionResult {
    PredictionResult {
        class_id: 8,
        class_name: "Tomato___Septoria_leaf_spot".to_string(),
        confidence: 0.5770725011825562,
        plant_type: "Tomato".to_string(),
        condition: "Septoria leaf spot".to_string(),
        display_name: "Tomato - Septoria leaf spot".to_string(),
        advice: SAMPLE_ADVICE.to_string(),
        user_id: SAMPLE_USER_ID.to_string(),
        prediction_id: "48815aa1-9805-4d8c-86b1-fbdfee638407".to_string(),
        timestamp: now,
        image_path: "6825ad254eeef8e8b3a822ce".to_string(),
        created_at: StoredDate { date: now },
        storage_type: "gridfs".to_string(),
        id: ObjectId {
            oid: "6825ad254eeef8e8b3a822d0".to_string(),
        },
    }
}

/// Artificial latency per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockDelays {
    pub fetch_profile: Duration,
    pub update_profile: Duration,
    pub upload_image: Duration,
    pub prediction: Duration,
    pub history: Duration,
}

impl Default for MockDelays {
    fn default() -> Self {
        Self {
            fetch_profile: Duration::from_millis(500),
            update_profile: Duration::from_millis(1000),
            upload_image: Duration::from_millis(1500),
            prediction: Duration::from_millis(3000),
            history: Duration::from_millis(500),
        }
    }
}

impl MockDelays {
    /// No latency at all.
    pub fn none() -> Self {
        Self {
            fetch_profile: Duration::ZERO,
            update_profile: Duration::ZERO,
            upload_image: Duration::ZERO,
            prediction: Duration::ZERO,
            history: Duration::ZERO,
        }
    }
}

/// Mock backend. History starts empty and grows with each prediction served.
pub struct MockPlantCareApi {
    delays: MockDelays,
    rng: Mutex<ChaCha8Rng>,
    offline: AtomicBool,
    history: Mutex<Vec<PredictionResult>>,
}

impl Default for MockPlantCareApi {
    fn default() -> Self {
        Self::new(MockDelays::default())
    }
}

impl MockPlantCareApi {
    pub fn new(delays: MockDelays) -> Self {
        Self {
            delays,
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
            offline: AtomicBool::new(false),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Uses a fixed seed so generated upload URLs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    /// Makes every call fail with [`ServiceError::Unavailable`] while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    async fn simulate(&self, operation: &str, delay: Duration) -> Result<(), ServiceError> {
        debug!(operation, delay_ms = delay.as_millis() as u64, "Simulating backend call");
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ServiceError::Unavailable(format!("{} failed: backend offline", operation)));
        }
        Ok(())
    }

    fn picture_id(&self) -> u32 {
        match self.rng.lock() {
            Ok(mut rng) => rng.next_u32() % 100,
            Err(_) => 0,
        }
    }
}

#[async_trait]
impl PlantCareApi for MockPlantCareApi {
    async fn fetch_profile(&self) -> Result<UserProfile, ServiceError> {
        self.simulate("fetch_profile", self.delays.fetch_profile).await?;
        info!("Profile retrieved successfully");
        Ok(sample_profile())
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ServiceError> {
        self.simulate("update_profile", self.delays.update_profile).await?;

        let field = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        let profile = UserProfile {
            user_id: SAMPLE_USER_ID.to_string(),
            username: field(&update.username).unwrap_or_else(|| SAMPLE_USERNAME.to_string()),
            email: SAMPLE_EMAIL.to_string(),
            first_name: field(&update.first_name),
            last_name: field(&update.last_name),
            avatar: field(&update.avatar),
            cover_image: field(&update.cover_image),
            description: field(&update.description),
        };
        info!(username = %profile.username, "Profile updated successfully");
        Ok(profile)
    }

    async fn upload_profile_image(
        &self,
        image: &CapturedImage,
        kind: ImageKind,
    ) -> Result<String, ServiceError> {
        self.simulate("upload_profile_image", self.delays.upload_image).await?;

        let size = match kind {
            ImageKind::Avatar => "200/200",
            ImageKind::Cover => "1000/300",
        };
        let url = format!("https://picsum.photos/id/{}/{}", self.picture_id(), size);
        info!(kind = %kind, bytes = image.len(), url = %url, "Profile image uploaded");
        Ok(url)
    }

    async fn submit_prediction(
        &self,
        image: &CapturedImage,
    ) -> Result<PredictionResult, ServiceError> {
        self.simulate("submit_prediction", self.delays.prediction).await?;

        let mut prediction = sample_prediction(Utc::now());
        let digest = blake3::hash(image.bytes()).to_hex();
        prediction.image_path = digest.as_str()[..24].to_string();
        info!(
            prediction = %prediction.prediction_id,
            image = %prediction.image_path,
            "Prediction received"
        );
        if let Ok(mut history) = self.history.lock() {
            history.push(prediction.clone());
        }
        Ok(prediction)
    }

    async fn fetch_history(&self) -> Result<Vec<PredictionResult>, ServiceError> {
        self.simulate("fetch_history", self.delays.history).await?;

        let history = self
            .history
            .lock()
            .map(|history| history.iter().rev().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        info!(entries = history.len(), "History retrieved");
        Ok(history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FacingMode, Frame, Resolution};

    fn still() -> CapturedImage {
        let frame = Frame::new(vec![90u8; 8 * 8 * 3], 8, 8, 1);
        CapturedImage::from_frame(frame, Resolution::new(8, 8), FacingMode::Environment, false, 90)
            .unwrap()
    }

    fn api() -> MockPlantCareApi {
        MockPlantCareApi::new(MockDelays::none()).with_seed(7)
    }

    #[tokio::test]
    async fn test_fetch_profile() {
        let profile = api().fetch_profile().await.unwrap();
        assert_eq!(profile.username, "johndoe");
        assert_eq!(profile.email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn test_update_profile_semantics() {
        let update = ProfileUpdate {
            username: Some(String::new()),
            first_name: Some("Jane".into()),
            description: Some(String::new()),
            ..Default::default()
        };
        let profile = api().update_profile(&update).await.unwrap();

        assert_eq!(profile.username, "johndoe");
        assert_eq!(profile.email, "john.doe@example.com");
        assert_eq!(profile.first_name.as_deref(), Some("Jane"));
        assert_eq!(profile.last_name, None);
        assert_eq!(profile.description, None);
    }

    #[tokio::test]
    async fn test_upload_url_shape() {
        let api = api();
        let avatar = api.upload_profile_image(&still(), ImageKind::Avatar).await.unwrap();
        let cover = api.upload_profile_image(&still(), ImageKind::Cover).await.unwrap();

        assert!(avatar.starts_with("https://picsum.photos/id/"));
        assert!(avatar.ends_with("/200/200"));
        assert!(cover.ends_with("/1000/300"));
    }

    #[tokio::test]
    async fn test_seeded_urls_repeat() {
        let a = api().upload_profile_image(&still(), ImageKind::Avatar).await.unwrap();
        let b = api().upload_profile_image(&still(), ImageKind::Avatar).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_prediction_references_image() {
        let image = still();
        let prediction = api().submit_prediction(&image).await.unwrap();

        assert_eq!(prediction.class_name, "Tomato___Septoria_leaf_spot");
        assert_eq!(prediction.image_path.len(), 24);
        assert_eq!(
            prediction.image_path,
            &blake3::hash(image.bytes()).to_hex().as_str()[..24]
        );
        assert_eq!(prediction.created_at.date, prediction.timestamp);
    }

    #[tokio::test]
    async fn test_history_lists_predictions_newest_first() {
        let api = api();
        assert!(api.fetch_history().await.unwrap().is_empty());

        let first = api.submit_prediction(&still()).await.unwrap();
        let other = Frame::new(vec![200u8; 8 * 8 * 3], 8, 8, 1);
        let other =
            CapturedImage::from_frame(other, Resolution::new(8, 8), FacingMode::User, false, 90)
                .unwrap();
        let second = api.submit_prediction(&other).await.unwrap();

        let history = api.fetch_history().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].image_path, second.image_path);
        assert_eq!(history[1].image_path, first.image_path);

        api.set_offline(true);
        assert!(api.fetch_history().await.is_err());
    }

    #[tokio::test]
    async fn test_offline() {
        let api = api();
        api.set_offline(true);
        assert!(matches!(
            api.fetch_profile().await,
            Err(ServiceError::Unavailable(_))
        ));
        api.set_offline(false);
        assert!(api.fetch_profile().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_delay_elapses() {
        let api = MockPlantCareApi::default();
        let started = tokio::time::Instant::now();
        api.fetch_profile().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
