use std::path::Path;

use coursehub_domain::{ClientConfig, RetryConfig, StorageConfig};
use coursehub_lib::context::AppContext;
use serde_json::{json, Value};
use tempfile::TempDir;

/// Context bound to a mock server, with storage in a fresh temp directory.
pub struct TestContext {
    pub ctx: AppContext,
    /// Keep temporary directory alive for the lifetime of the context.
    pub temp_dir: TempDir,
}

pub fn test_config(base_url: &str, storage_dir: &Path) -> ClientConfig {
    ClientConfig {
        timeout_secs: 5,
        retry: RetryConfig { retries: 1, retry_delay_ms: 10 },
        storage: StorageConfig { path: storage_dir.join("storage.json") },
        ..ClientConfig::new(base_url)
    }
}

pub async fn setup_test_context(base_url: &str) -> TestContext {
    let temp_dir = tempfile::tempdir().expect("failed to create temporary storage directory");
    let ctx = AppContext::from_config(test_config(base_url, temp_dir.path()))
        .await
        .expect("context should build");
    TestContext { ctx, temp_dir }
}

pub fn user_json(id: i64, email: &str, role: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "username": email.split('@').next().unwrap_or_default(),
        "role": role
    })
}

pub fn course_json(id: i64, title: &str, author_id: i64) -> Value {
    json!({
        "id": id,
        "title": title,
        "subject": "Programming",
        "level": "Beginner",
        "difficulty_score": 2.0,
        "description": "An introduction",
        "created_by": user_json(author_id, "teacher@example.com", "teacher"),
        "created_at": "2025-01-01T00:00:00+00:00",
        "updated_at": "2025-01-02T00:00:00+00:00"
    })
}

pub fn enrollment_json(id: i64, student: Value, course: Value) -> Value {
    json!({
        "id": id,
        "user": student,
        "course": course,
        "enrolled_at": "2025-02-01T00:00:00+00:00",
        "progress": 0.0,
        "completed": false
    })
}

pub fn progress_json(id: i64, student: Value, course: Value, progress: f64) -> Value {
    json!({
        "id": id,
        "user": student,
        "course": course,
        "progress": progress,
        "last_accessed": "2025-03-01T00:00:00+00:00"
    })
}
