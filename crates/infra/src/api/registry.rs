//! In-flight request de-duplication
//!
//! Concurrent calls with the same key share one pending request. An entry
//! lives exactly as long as its request: it is evicted when the request
//! resolves (before any waiter sees the result) or when every waiter has
//! been dropped. Nothing is cached after completion.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use coursehub_domain::ApiError;
use futures::future::{BoxFuture, FutureExt, Shared, WeakShared};
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

/// Successful response as seen by every waiter
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body; `Null` for empty bodies
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }
}

/// Outcome shared by every waiter of one request
pub type SharedOutcome = Result<Arc<ApiResponse>, ApiError>;

/// Handle to a pending shared request
pub type PendingRequest = Shared<BoxFuture<'static, SharedOutcome>>;

type Entry = (u64, WeakShared<BoxFuture<'static, SharedOutcome>>);

#[derive(Default)]
struct Entries {
    next_generation: u64,
    by_key: HashMap<String, Entry>,
}

/// Registry of requests currently on the wire, keyed by `METHOD:url`
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    inner: Arc<Mutex<Entries>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a request
    pub fn key(method: &reqwest::Method, url: &str) -> String {
        format!("{method}:{url}")
    }

    /// Join the pending request for `key`, or start one with `start`.
    ///
    /// `start` is only called when no live request exists for the key.
    pub fn join_or_start<F>(&self, key: &str, start: F) -> PendingRequest
    where
        F: FnOnce() -> BoxFuture<'static, SharedOutcome>,
    {
        let mut entries = self.inner.lock();

        if let Some(pending) = entries.by_key.get(key).and_then(|(_, weak)| weak.upgrade()) {
            debug!(key, "joining in-flight request");
            return pending;
        }

        entries.next_generation += 1;
        let generation = entries.next_generation;
        let guard = EvictOnDrop {
            entries: Arc::downgrade(&self.inner),
            key: key.to_string(),
            generation,
        };

        let request = start();
        let pending = async move {
            let _guard = guard;
            request.await
        }
        .boxed()
        .shared();

        if let Some(weak) = pending.downgrade() {
            entries.by_key.insert(key.to_string(), (generation, weak));
        }
        debug!(key, generation, "registered in-flight request");

        pending
    }

    /// Number of requests currently in flight
    pub fn len(&self) -> usize {
        self.inner.lock().by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().by_key.contains_key(key)
    }
}

/// Removes the registry entry when the request future finishes or is
/// dropped. The generation check keeps a stale guard from evicting a newer
/// request registered under the same key.
struct EvictOnDrop {
    entries: Weak<Mutex<Entries>>,
    key: String,
    generation: u64,
}

impl Drop for EvictOnDrop {
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            return;
        };
        let mut entries = entries.lock();
        if entries.by_key.get(&self.key).is_some_and(|(generation, _)| *generation == self.generation)
        {
            entries.by_key.remove(&self.key);
            debug!(key = %self.key, "evicted in-flight request");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use tokio::sync::oneshot;

    use super::*;

    fn counted(calls: &Arc<AtomicUsize>, rx: oneshot::Receiver<SharedOutcome>) -> BoxFuture<'static, SharedOutcome> {
        calls.fetch_add(1, Ordering::SeqCst);
        async move {
            rx.await.unwrap_or_else(|_| Err(ApiError::Internal { message: "sender dropped".into() }))
        }
        .boxed()
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_request() {
        let registry = InFlightRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel();
        let mut rx = Some(rx);

        let first = registry.join_or_start("GET:/courses", || counted(&calls, rx.take().unwrap()));
        let second = registry.join_or_start("GET:/courses", || unreachable!("second start"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.contains("GET:/courses"));

        tx.send(Ok(Arc::new(ApiResponse::new(200, json!([1, 2]))))).unwrap();
        let (a, b) = tokio::join!(first, second);

        assert_eq!(a.unwrap(), b.unwrap());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn entry_is_evicted_before_waiters_resume() {
        let registry = InFlightRegistry::new();
        let observed = registry.clone();
        let pending = registry.join_or_start("GET:/x", || {
            async move { Ok(Arc::new(ApiResponse::new(204, Value::Null))) }.boxed()
        });

        pending.await.unwrap();
        assert!(!observed.contains("GET:/x"));
    }

    #[tokio::test]
    async fn failures_are_shared_and_evicted() {
        let registry = InFlightRegistry::new();
        let pending = registry.join_or_start("GET:/missing", || {
            async move { Err(ApiError::from_status(404, "gone", None)) }.boxed()
        });
        let joined = registry.join_or_start("GET:/missing", || unreachable!());

        let (a, b) = tokio::join!(pending, joined);
        assert_eq!(a.unwrap_err().status(), 404);
        assert_eq!(b.unwrap_err().status(), 404);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn completed_request_is_not_reused() {
        let registry = InFlightRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            registry
                .join_or_start("GET:/courses", move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(Arc::new(ApiResponse::new(200, json!([])))) }.boxed()
                })
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropping_every_waiter_evicts_entry() {
        let registry = InFlightRegistry::new();
        let (_tx, rx) = oneshot::channel::<SharedOutcome>();
        let calls = Arc::new(AtomicUsize::new(0));

        let pending = registry.join_or_start("GET:/slow", || counted(&calls, rx));
        assert!(registry.contains("GET:/slow"));

        drop(pending);
        assert!(registry.is_empty());
    }

    #[test]
    fn key_format() {
        assert_eq!(
            InFlightRegistry::key(&reqwest::Method::GET, "http://h/api/courses"),
            "GET:http://h/api/courses"
        );
    }
}
