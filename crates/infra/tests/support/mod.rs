use std::sync::Arc;
use std::time::Duration;

use coursehub_core::Session;
use coursehub_infra::{ApiClient, HttpClient, MemoryStorage};
use serde_json::{json, Value};

/// Client wired to a mock server with in-memory session storage.
pub struct TestClient {
    pub api: ApiClient,
    pub storage: Arc<MemoryStorage>,
    pub session: Arc<Session>,
}

impl TestClient {
    /// Fast retries so transport-failure tests stay quick.
    pub fn new(base_url: &str) -> Self {
        Self::with_retries(base_url, 3, Duration::from_millis(10))
    }

    pub fn with_retries(base_url: &str, retries: u32, delay: Duration) -> Self {
        Self::from_storage(base_url, Arc::new(MemoryStorage::new()), retries, delay)
    }

    pub fn from_storage(
        base_url: &str,
        storage: Arc<MemoryStorage>,
        retries: u32,
        delay: Duration,
    ) -> Self {
        let session = Arc::new(Session::new(storage.clone(), storage.clone()));
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(5))
            .retries(retries)
            .retry_delay(delay)
            .build()
            .expect("http client should build");
        let api = ApiClient::with_http_client(http, base_url, session.clone())
            .expect("api client should build");
        Self { api, storage, session }
    }
}

pub fn course_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "subject": "Programming",
        "level": "Beginner",
        "difficulty_score": 2.0,
        "description": "An introduction",
        "price": 19.99,
        "image": null,
        "status": "published",
        "created_by": {"id": 9, "email": "teacher@example.com", "username": "teach", "role": "teacher"},
        "created_at": "2025-01-01T00:00:00+00:00",
        "updated_at": "2025-01-02T00:00:00+00:00"
    })
}
