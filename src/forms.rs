//! Input validation for the sign-in, registration and profile forms.
//!
//! Validation only; no credentials are checked anywhere in this crate.

use crate::capture::CapturedImage;
use crate::service::ProfileUpdate;
use image::ImageFormat;

/// Largest accepted avatar or cover upload.
pub const MAX_PROFILE_IMAGE_BYTES: usize = 1024 * 1024;
/// Shortest accepted password at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Form field an error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    ConfirmPassword,
    Username,
    Image,
}

/// Per-field validation messages, first error per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(Field, &'static str)>,
}

impl FieldErrors {
    fn add(&mut self, field: Field, message: &'static str) {
        if self.get(field).is_none() {
            self.errors.push((field, message));
        }
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().copied()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Email and password sign-in, shared by the user and admin forms.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if self.email.is_empty() {
            errors.add(Field::Email, "Email is required");
        }
        if self.password.is_empty() {
            errors.add(Field::Password, "Password is required");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();

        if self.name.is_empty() {
            errors.add(Field::Name, "Name is required");
        }

        if self.email.is_empty() {
            errors.add(Field::Email, "Email is required");
        } else if !looks_like_email(&self.email) {
            errors.add(Field::Email, "Email is invalid");
        }

        if self.password.is_empty() {
            errors.add(Field::Password, "Password is required");
        } else if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(Field::Password, "Password must be at least 6 characters");
        }

        if self.confirm_password.is_empty() {
            errors.add(Field::ConfirmPassword, "Please confirm your password");
        } else if self.password != self.confirm_password {
            errors.add(Field::ConfirmPassword, "Passwords do not match");
        }

        errors.into_result()
    }
}

/// Checks a profile edit before it is sent.
pub fn validate_profile_update(update: &ProfileUpdate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if update.username.as_deref().map_or(true, |u| u.trim().is_empty()) {
        errors.add(Field::Username, "Username is required");
    }
    errors.into_result()
}

/// Avatar and cover uploads must be JPEG or PNG and at most 1 MB.
pub fn validate_profile_image(image: &CapturedImage) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !matches!(image.format(), ImageFormat::Jpeg | ImageFormat::Png) {
        errors.add(Field::Image, "Image must be a JPG or PNG");
    } else if image.len() > MAX_PROFILE_IMAGE_BYTES {
        errors.add(Field::Image, "Image must be 1MB or smaller");
    }
    errors.into_result()
}

/// Loose shape check: some non-space text, `@`, text, `.`, text.
pub fn looks_like_email(value: &str) -> bool {
    value.split_whitespace().any(|token| {
        token.char_indices().any(|(at, c)| {
            if c != '@' || at == 0 {
                return false;
            }
            let domain = &token[at + 1..];
            domain
                .char_indices()
                .any(|(dot, d)| d == '.' && dot > 0 && dot + 1 < domain.len())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(errors.get(Field::Password), Some("Password is required"));

        let form = LoginForm {
            email: "a@b.co".into(),
            password: "x".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_register_messages() {
        let form = RegisterForm {
            name: String::new(),
            email: "not-an-email".into(),
            password: "abc".into(),
            confirm_password: "abd".into(),
        };
        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::Email), Some("Email is invalid"));
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(errors.get(Field::ConfirmPassword), Some("Passwords do not match"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_register_missing_confirmation() {
        let form = RegisterForm {
            name: "Jo".into(),
            email: "jo@garden.org".into(),
            password: "secret1".into(),
            confirm_password: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.get(Field::ConfirmPassword),
            Some("Please confirm your password")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_register_valid() {
        let form = RegisterForm {
            name: "Jo".into(),
            email: "jo@garden.org".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("john.doe@example.com"));
        assert!(looks_like_email("x a@b.c y"));
        assert!(!looks_like_email("@example.com"));
        assert!(!looks_like_email("john@example"));
        assert!(!looks_like_email("john@.com"));
        assert!(!looks_like_email("john@example."));
        assert!(!looks_like_email("john @example.com"));
    }

    #[test]
    fn test_profile_update_requires_username() {
        let update = ProfileUpdate {
            username: Some("  ".into()),
            ..Default::default()
        };
        let errors = validate_profile_update(&update).unwrap_err();
        assert_eq!(errors.get(Field::Username), Some("Username is required"));
    }

    #[test]
    fn test_profile_image_limits() {
        use crate::capture::{FacingMode, Frame, Resolution};

        let frame = Frame::new(vec![10u8; 4 * 4 * 3], 4, 4, 1);
        let still =
            CapturedImage::from_frame(frame, Resolution::new(4, 4), FacingMode::User, false, 90)
                .unwrap();
        assert!(validate_profile_image(&still).is_ok());

        let mut gif = Vec::new();
        image::DynamicImage::new_rgba8(2, 2)
            .write_to(&mut std::io::Cursor::new(&mut gif), ImageFormat::Gif)
            .unwrap();
        let upload = CapturedImage::from_bytes(gif, Some("anim.gif".into())).unwrap();
        let errors = validate_profile_image(&upload).unwrap_err();
        assert_eq!(errors.get(Field::Image), Some("Image must be a JPG or PNG"));
    }
}
