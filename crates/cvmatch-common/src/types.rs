//! Common types used across CV-Match client components

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for parsing a [`UserRole`] from a string
#[derive(Debug, Error)]
#[error("unknown user role: {0}")]
pub struct RoleParseError(String);

/// Account role assigned to every user
///
/// Roles are owned by the backend; the client only ever compares against
/// them when gating routes and features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Job seeker uploading CVs and applying to positions
    Candidate,
    /// Employer-side account posting and matching positions
    Recruiter,
    /// Internal administration account
    Admin,
}

impl UserRole {
    /// String form as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Candidate => "candidate",
            UserRole::Recruiter => "recruiter",
            UserRole::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(UserRole::Candidate),
            "recruiter" => Ok(UserRole::Recruiter),
            "admin" => Ok(UserRole::Admin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// How the account was created / how the user signs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProviderKind {
    /// Email + password account (requires OTP email verification)
    Email,
    /// Google OAuth account
    Google,
}

/// User profile as returned by the backend
///
/// The client holds a read-mostly cached copy of this; it is only mutated
/// locally through an explicit [`UserProfileUpdate`] or replaced wholesale
/// after a re-fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
    pub email_verified: bool,
    pub auth_provider: AuthProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Shallow patch applied to a cached [`UserProfile`]
///
/// Only fields that are `Some` are written; everything else is left as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserProfileUpdate {
    /// Apply this patch to a profile in place
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(full_name) = &self.full_name {
            profile.full_name = full_name.clone();
        }
        if let Some(role) = self.role {
            profile.role = role;
        }
        if let Some(email_verified) = self.email_verified {
            profile.email_verified = email_verified;
        }
        if let Some(avatar_url) = &self.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
    }

    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
