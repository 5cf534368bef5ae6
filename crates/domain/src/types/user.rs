//! User profile types
//!
//! `UserProfile` is what the backend returns from `/users/me`; `CurrentUser`
//! is the slice of it the client persists for role-based decisions.

use serde::{Deserialize, Serialize};

/// Account role
///
/// Unknown, empty or null roles deserialize as `Guest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Role {
    #[default]
    Guest,
    Student,
    Teacher,
    Admin,
}

crate::impl_wire_name_conversions!(Role {
    Guest => "guest",
    Student => "student",
    Teacher => "teacher",
    Admin => "admin",
});

impl From<String> for Role {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Account state reported in the nested profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

/// Nested profile block of a user record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// ISO date, `YYYY-MM-DD`
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub account_status: AccountStatus,
    #[serde(default)]
    pub joined_date: Option<String>,
}

/// User record as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: Option<i64>,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub preferred_subject: Option<String>,
    #[serde(default)]
    pub profile: Option<Profile>,
}

/// Persisted current user, used for role-gated behaviour
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl CurrentUser {
    /// Placeholder used when the profile could not be fetched after login
    pub fn fallback_student() -> Self {
        Self { role: Role::Student, ..Self::default() }
    }
}

impl From<&UserProfile> for CurrentUser {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            username: Some(profile.username.clone()),
            email: Some(profile.email.clone()),
            role: profile.role,
        }
    }
}
