//! User profile and authentication payloads.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Profile of the authenticated user, as cached in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(rename = "nome")]
    pub name: String,
    /// Institutional email (immutable)
    pub email: String,
    #[serde(rename = "curso", default)]
    pub course: Option<String>,
    #[serde(rename = "periodo", default)]
    pub period: Option<String>,
    /// Free-text interests
    #[serde(rename = "interesses", default)]
    pub interests: Option<String>,
    /// Predefined avatar identifier (e.g. `avatar-3`)
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "senha")]
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters")
    )]
    pub name: String,
    #[validate(
        email(message = "Invalid email"),
        custom(function = "crate::validation::institutional_email")
    )]
    pub email: String,
    #[serde(rename = "senha")]
    #[validate(custom(function = "crate::validation::password_strength"))]
    pub password: String,
    /// Confirmation typed by the user; never sent
    #[serde(skip)]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
    #[serde(rename = "curso")]
    #[validate(custom(function = "crate::validation::known_course"))]
    pub course: String,
    #[serde(rename = "periodo")]
    #[validate(custom(function = "crate::validation::known_period"))]
    pub period: String,
    #[serde(rename = "interesses", skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Fields the user may change on their own profile.
///
/// Absent fields are left untouched by the server.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct ProfileUpdate {
    #[serde(rename = "nome", skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters")
    )]
    pub name: Option<String>,
    #[serde(rename = "curso", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::known_course"))]
    pub course: Option<String>,
    #[serde(rename = "periodo", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "crate::validation::known_period"))]
    pub period: Option<String>,
    #[serde(rename = "interesses", skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.course.is_none()
            && self.period.is_none()
            && self.interests.is_none()
            && self.avatar.is_none()
    }

    /// Apply the changed fields to a cached profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(course) = &self.course {
            profile.course = Some(course.clone());
        }
        if let Some(period) = &self.period {
            profile.period = Some(period.clone());
        }
        if let Some(interests) = &self.interests {
            profile.interests = Some(interests.clone());
        }
        if let Some(avatar) = &self.avatar {
            profile.avatar = Some(avatar.clone());
        }
    }
}

/// Successful login or registration response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(rename = "usuario")]
    pub user: UserProfile,
}

/// Response to a profile update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    #[serde(rename = "usuario")]
    pub user: UserProfile,
}

/// One of the predefined avatars offered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(rename = "nome", alias = "name", default)]
    pub name: Option<String>,
    #[serde(rename = "cor", alias = "color", default)]
    pub color: Option<String>,
}

/// Avatar listing; the server may wrap it or return a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AvatarList {
    Wrapped {
        #[serde(rename = "avatares")]
        avatars: Vec<Avatar>,
    },
    Bare(Vec<Avatar>),
}

impl AvatarList {
    pub fn into_vec(self) -> Vec<Avatar> {
        match self {
            AvatarList::Wrapped { avatars } => avatars,
            AvatarList::Bare(avatars) => avatars,
        }
    }
}
