//! Profile page: load, edit, save and picture uploads.

use crate::capture::CapturedImage;
use crate::forms::{validate_profile_image, validate_profile_update, FieldErrors};
use crate::service::{ImageKind, PlantCareApi, ProfileUpdate, UserProfile};
use std::sync::Arc;
use tracing::{info, warn};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load profile. Please try again.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save changes. Please try again.";
pub const IMAGE_UPLOAD_FAILED_MESSAGE: &str = "Failed to upload image. Please try again.";

pub struct ProfileWorkflow {
    api: Arc<dyn PlantCareApi>,
    profile: Option<UserProfile>,
    draft: Option<ProfileUpdate>,
    loading: bool,
    saving: bool,
    error: Option<String>,
    field_errors: FieldErrors,
}

impl ProfileWorkflow {
    pub fn new(api: Arc<dyn PlantCareApi>) -> Self {
        Self {
            api,
            profile: None,
            draft: None,
            loading: false,
            saving: false,
            error: None,
            field_errors: FieldErrors::default(),
        }
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// Pending edits, present while editing.
    pub fn draft(&self) -> Option<&ProfileUpdate> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut ProfileUpdate> {
        self.draft.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    pub async fn load(&mut self) -> Option<&UserProfile> {
        self.loading = true;
        self.error = None;
        let result = self.api.fetch_profile().await;
        self.loading = false;

        match result {
            Ok(profile) => {
                info!(user = %profile.user_id, "Profile loaded");
                self.profile = Some(profile);
                self.profile.as_ref()
            }
            Err(err) => {
                warn!(error = %err, "Failed to load profile");
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
                None
            }
        }
    }

    /// Starts editing from the loaded profile. No-op before a load.
    pub fn begin_edit(&mut self) {
        if let Some(profile) = &self.profile {
            self.draft = Some(ProfileUpdate::from_profile(profile));
            self.field_errors = FieldErrors::default();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.draft = None;
        self.field_errors = FieldErrors::default();
    }

    /// Sends `update`; editing ends only when the backend accepts it.
    pub async fn save(&mut self, update: ProfileUpdate) -> bool {
        if self.profile.is_none() {
            return false;
        }
        if let Err(errors) = validate_profile_update(&update) {
            self.field_errors = errors;
            return false;
        }
        self.field_errors = FieldErrors::default();
        self.error = None;

        self.saving = true;
        let result = self.api.update_profile(&update).await;
        self.saving = false;

        match result {
            Ok(profile) => {
                info!(username = %profile.username, "Profile saved");
                self.profile = Some(profile);
                self.draft = None;
                true
            }
            Err(err) => {
                warn!(error = %err, "Failed to save profile");
                self.draft = Some(update);
                self.error = Some(SAVE_FAILED_MESSAGE.to_string());
                false
            }
        }
    }

    /// Saves the current draft.
    pub async fn save_draft(&mut self) -> bool {
        match self.draft.clone() {
            Some(update) => self.save(update).await,
            None => false,
        }
    }

    /// Uploads an avatar or cover and stores its URL in the draft.
    ///
    /// Editing starts if it had not already.
    pub async fn upload_image(&mut self, kind: ImageKind, image: &CapturedImage) -> Option<String> {
        if let Err(errors) = validate_profile_image(image) {
            self.field_errors = errors;
            return None;
        }
        if self.draft.is_none() {
            self.begin_edit();
        }
        self.error = None;

        match self.api.upload_profile_image(image, kind).await {
            Ok(url) => {
                if let Some(draft) = self.draft.as_mut() {
                    match kind {
                        ImageKind::Avatar => draft.avatar = Some(url.clone()),
                        ImageKind::Cover => draft.cover_image = Some(url.clone()),
                    }
                }
                self.field_errors = FieldErrors::default();
                Some(url)
            }
            Err(err) => {
                warn!(kind = %kind, error = %err, "Profile image upload failed");
                self.error = Some(IMAGE_UPLOAD_FAILED_MESSAGE.to_string());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FacingMode, Frame, Resolution};
    use crate::forms::Field;
    use crate::service::{MockDelays, MockPlantCareApi};

    fn workflow() -> (ProfileWorkflow, Arc<MockPlantCareApi>) {
        let api = Arc::new(MockPlantCareApi::new(MockDelays::none()).with_seed(1));
        let api_dyn: Arc<dyn PlantCareApi> = api.clone();
        (ProfileWorkflow::new(api_dyn), api)
    }

    fn avatar() -> CapturedImage {
        let frame = Frame::new(vec![120u8; 16 * 16 * 3], 16, 16, 1);
        CapturedImage::from_frame(frame, Resolution::new(16, 16), FacingMode::User, true, 90)
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_and_edit() {
        let (mut flow, _) = workflow();
        assert_eq!(flow.load().await.unwrap().display_name(), "John Doe");

        flow.begin_edit();
        assert!(flow.is_editing());
        flow.draft_mut().unwrap().first_name = Some("Jane".into());
        assert!(flow.save_draft().await);

        assert!(!flow.is_editing());
        assert_eq!(flow.profile().unwrap().first_name.as_deref(), Some("Jane"));
    }

    #[tokio::test]
    async fn test_load_failure() {
        let (mut flow, api) = workflow();
        api.set_offline(true);
        assert!(flow.load().await.is_none());
        assert_eq!(flow.error(), Some(LOAD_FAILED_MESSAGE));
        assert!(!flow.is_loading());

        flow.begin_edit();
        assert!(!flow.is_editing());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_editing() {
        let (mut flow, api) = workflow();
        flow.load().await;
        flow.begin_edit();

        api.set_offline(true);
        let update = ProfileUpdate {
            username: Some("gardener".into()),
            ..Default::default()
        };
        assert!(!flow.save(update).await);
        assert!(flow.is_editing());
        assert_eq!(flow.error(), Some(SAVE_FAILED_MESSAGE));
        assert_eq!(flow.profile().unwrap().username, "johndoe");
    }

    #[tokio::test]
    async fn test_save_requires_username() {
        let (mut flow, _) = workflow();
        flow.load().await;
        flow.begin_edit();

        assert!(!flow.save(ProfileUpdate::default()).await);
        assert_eq!(
            flow.field_errors().get(Field::Username),
            Some("Username is required")
        );
        assert!(flow.is_editing());
    }

    #[tokio::test]
    async fn test_cancel_discards_draft() {
        let (mut flow, _) = workflow();
        flow.load().await;
        flow.begin_edit();
        flow.draft_mut().unwrap().description = Some("changed".into());
        flow.cancel_edit();

        assert!(flow.draft().is_none());
        assert_ne!(flow.profile().unwrap().description.as_deref(), Some("changed"));
    }

    #[tokio::test]
    async fn test_upload_fills_draft() {
        let (mut flow, _) = workflow();
        flow.load().await;

        let url = flow.upload_image(ImageKind::Cover, &avatar()).await.unwrap();
        assert!(url.ends_with("/1000/300"));
        assert!(flow.is_editing());
        assert_eq!(flow.draft().unwrap().cover_image.as_deref(), Some(url.as_str()));

        assert!(flow.save_draft().await);
        assert_eq!(flow.profile().unwrap().cover_image.as_deref(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let (mut flow, api) = workflow();
        flow.load().await;
        api.set_offline(true);

        assert!(flow.upload_image(ImageKind::Avatar, &avatar()).await.is_none());
        assert_eq!(flow.error(), Some(IMAGE_UPLOAD_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_save_retry_clears_error() {
        let (mut flow, api) = workflow();
        flow.load().await;
        flow.begin_edit();

        api.set_offline(true);
        assert!(!flow.save_draft().await);
        assert_eq!(flow.error(), Some(SAVE_FAILED_MESSAGE));

        api.set_offline(false);
        assert!(flow.save_draft().await);
        assert!(!flow.is_editing());
        assert_eq!(flow.error(), None);
    }

    #[tokio::test]
    async fn test_upload_retry_clears_error() {
        let (mut flow, api) = workflow();
        flow.load().await;

        api.set_offline(true);
        assert!(flow.upload_image(ImageKind::Avatar, &avatar()).await.is_none());
        assert_eq!(flow.error(), Some(IMAGE_UPLOAD_FAILED_MESSAGE));

        api.set_offline(false);
        assert!(flow.upload_image(ImageKind::Avatar, &avatar()).await.is_some());
        assert_eq!(flow.error(), None);
    }
}
