//! Course catalog, enrollment and progress records

use serde::{Deserialize, Serialize};

use super::user::UserProfile;
use crate::constants::DEFAULT_RECOMMENDATION_COUNT;

/// Course as returned by `/courses`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(alias = "_id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub difficulty_score: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_by: Option<UserProfile>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Course {
    /// Id of the authoring user, when the backend included it
    pub fn author_id(&self) -> Option<i64> {
        self.created_by.as_ref().and_then(|author| author.id)
    }
}

/// Body for creating a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDraft {
    pub title: String,
    pub subject: String,
    pub level: String,
    pub difficulty_score: f64,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Partial course update; unset fields are left untouched by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Enrollment of a user in a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub user: UserProfile,
    pub course: Course,
    pub enrolled_at: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub completed: bool,
}

/// Body for enrolling the current user in a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub course_id: i64,
}

/// Learning progress of a user in a course, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningProgress {
    pub id: i64,
    pub user: UserProfile,
    pub course: Course,
    pub progress: f64,
    #[serde(default)]
    pub last_accessed: String,
}

/// Response of `GET /recommend`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub message: String,
    #[serde(default)]
    pub courses: Vec<Course>,
}

/// Query parameters for `GET /recommend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub top_n: u32,
    pub subject: Option<String>,
    pub level: Option<String>,
}

impl RecommendationQuery {
    pub fn top(top_n: u32) -> Self {
        Self { top_n, subject: None, level: None }
    }

    /// Query pairs in the order they are sent
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("top_n", self.top_n.to_string())];
        if let Some(subject) = &self.subject {
            pairs.push(("subject", subject.clone()));
        }
        if let Some(level) = &self.level {
            pairs.push(("level", level.clone()));
        }
        pairs
    }
}

impl Default for RecommendationQuery {
    fn default() -> Self {
        Self::top(DEFAULT_RECOMMENDATION_COUNT)
    }
}

/// File attached to a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { file_name: file_name.into(), content_type: None, bytes: bytes.into() }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
