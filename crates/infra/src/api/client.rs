//! REST API client
//!
//! Every operation goes through [`ApiClient::execute`]: the bearer token is
//! read from the session per attempt, identical concurrent requests share
//! one network call, transport failures are retried by the [`HttpClient`],
//! and non-success responses are normalized into [`ApiError`].

use std::fmt::Display;
use std::sync::Arc;

use coursehub_core::Session;
use coursehub_domain::constants::{
    DASHBOARD_PATH, DEFAULT_UPLOAD_FIELD, RECOMMEND_PATH, UPLOAD_IMAGE_SEGMENT,
};
use coursehub_domain::{
    ApiError, ClientConfig, DashboardResponse, Recommendation, RecommendationQuery, UploadFile,
};
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::registry::{ApiResponse, InFlightRegistry, SharedOutcome};
use crate::errors::api_error;
use crate::http::HttpClient;

/// Request body, rebuilt for every attempt
#[derive(Debug, Clone)]
pub(crate) enum Body {
    Empty,
    Json(Value),
    Multipart { field: String, file: UploadFile },
}

/// One logical request: where it goes and how failures are worded
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) body: Body,
    /// Resource label used in fallback error messages
    pub(crate) resource: String,
    /// Verb used in fallback error messages
    pub(crate) action: &'static str,
}

impl Call {
    pub(crate) fn new(
        method: Method,
        url: Url,
        body: Body,
        resource: impl Into<String>,
        action: &'static str,
    ) -> Self {
        Self { method, url, body, resource: resource.into(), action }
    }

    /// `Failed to {action} {resource}`
    pub(crate) fn failure_message(&self) -> String {
        format!("Failed to {} {}", self.action, self.resource)
    }

    pub(crate) fn request(
        &self,
        client: &ReqwestClient,
        token: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let mut builder = client.request(self.method.clone(), self.url.clone());
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        Ok(match &self.body {
            Body::Empty => builder.header(CONTENT_TYPE, "application/json"),
            Body::Json(value) => builder.json(value),
            Body::Multipart { field, file } => builder.multipart(multipart_form(field, file)?),
        })
    }

    /// Append the request context to an exhausted-retries transport error.
    fn contextualize(&self, err: ApiError) -> ApiError {
        match err {
            ApiError::Transport { message, details } => ApiError::Transport {
                message: format!("{message}: {}", self.failure_message()),
                details,
            },
            other => other,
        }
    }
}

fn multipart_form(field: &str, file: &UploadFile) -> Result<Form, ApiError> {
    let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
    if let Some(content_type) = &file.content_type {
        part = part.mime_str(content_type).map_err(|e| ApiError::Internal {
            message: format!("invalid content type {content_type:?}: {e}"),
        })?;
    }
    Ok(Form::new().part(field.to_string(), part))
}

/// Turn an HTTP response into the shared outcome.
///
/// Empty and 204/205 bodies read as `Null`.
pub(crate) async fn read_response(response: Response, call: &Call) -> SharedOutcome {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| call.contextualize(api_error(e)))?;

    if !status.is_success() {
        let details = serde_json::from_slice::<Value>(&bytes).ok();
        let message = error_message(details.as_ref(), status, call);
        warn!(
            status = status.as_u16(),
            method = %call.method,
            url = %call.url,
            message = %message,
            "request rejected"
        );
        return Err(ApiError::from_status(status.as_u16(), message, details));
    }

    let body = if status == StatusCode::NO_CONTENT
        || status == StatusCode::RESET_CONTENT
        || bytes.iter().all(u8::is_ascii_whitespace)
    {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse {
            status: status.as_u16(),
            message: format!("Failed to parse response: {e}"),
        })?
    };

    Ok(Arc::new(ApiResponse::new(status.as_u16(), body)))
}

/// Backend `message`, then `detail`, then the status reason, then a generic
/// `Failed to {action} {resource}`.
fn error_message(details: Option<&Value>, status: StatusCode, call: &Call) -> String {
    let from_body = |field: &str| {
        details
            .and_then(|d| d.get(field))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    from_body("message")
        .or_else(|| from_body("detail"))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| call.failure_message())
}

/// API client bound to one backend and one session
pub struct ApiClient {
    pub(crate) http: Arc<HttpClient>,
    pub(crate) session: Arc<Session>,
    base_url: Url,
    in_flight: InFlightRegistry,
}

impl ApiClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .retry(config.retry)
            .user_agent(concat!("coursehub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(http, &config.base_url, session)
    }

    /// Create a client around an existing transport
    pub fn with_http_client(
        http: HttpClient,
        base_url: &str,
        session: Arc<Session>,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ApiError::Internal { message: format!("invalid API base URL {base_url:?}: {e}") }
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Internal {
                message: format!("API base URL {base_url} cannot carry paths"),
            });
        }

        Ok(Self { http: Arc::new(http), session, base_url, in_flight: InFlightRegistry::new() })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Requests currently on the wire
    pub fn in_flight(&self) -> &InFlightRegistry {
        &self.in_flight
    }

    /// `{base}/{segment}/{segment}..`; segments may themselves contain `/`.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| ApiError::Internal {
                message: format!("API base URL {} cannot carry paths", self.base_url),
            })?;
            path.pop_if_empty();
            path.extend(segments.iter().flat_map(|s| s.split('/')).filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    /// Run a call through de-duplication and decode the shared body.
    ///
    /// With `cancel`, firing the token drops this caller's interest and
    /// yields [`ApiError::Aborted`]; the network call is abandoned once no
    /// caller is left waiting on it.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        call: Call,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        let key = InFlightRegistry::key(&call.method, call.url.as_str());
        let resource = call.resource.clone();
        let pending = self.in_flight.join_or_start(&key, || self.start(call));

        let response = match cancel {
            Some(token) => tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(key = %key, "request aborted by caller");
                    return Err(ApiError::Aborted);
                }
                outcome = pending => outcome?,
            },
            None => pending.await?,
        };

        T::deserialize(&response.body).map_err(|e| ApiError::InvalidResponse {
            status: response.status,
            message: format!("Unexpected {resource} response: {e}"),
        })
    }

    fn start(&self, call: Call) -> BoxFuture<'static, SharedOutcome> {
        let http = self.http.clone();
        let session = self.session.clone();

        async move {
            let response = http
                .send(|client| call.request(client, session.token().as_deref()))
                .await
                .map_err(|err| call.contextualize(err))?;
            read_response(response, &call).await
        }
        .boxed()
    }

    fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<Body, ApiError> {
        serde_json::to_value(body).map(Body::Json).map_err(|e| ApiError::Internal {
            message: format!("Failed to serialize body: {e}"),
        })
    }

    /// `POST /{resource}`
    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn create<B, T>(&self, resource: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let call = Call::new(
            Method::POST,
            self.endpoint(&[resource])?,
            Self::json_body(body)?,
            resource,
            "create",
        );
        let created = self.execute(call, None).await?;
        info!(resource = %resource, "created");
        Ok(created)
    }

    /// `GET /{resource}`, optionally cancellable
    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn get_all<T: DeserializeOwned>(
        &self,
        resource: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<T>, ApiError> {
        let call =
            Call::new(Method::GET, self.endpoint(&[resource])?, Body::Empty, resource, "fetch");
        let items: Vec<T> = self.execute(call, cancel).await?;
        debug!(resource = %resource, count = items.len(), "fetched list");
        Ok(items)
    }

    /// `GET /{resource}/{id}`
    #[instrument(skip_all, fields(resource = %resource, id = %id))]
    pub async fn get_by_id<T, I>(&self, resource: &str, id: I) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        I: Display,
    {
        let id = id.to_string();
        let call = Call::new(
            Method::GET,
            self.endpoint(&[resource, &id])?,
            Body::Empty,
            format!("{resource} with ID {id}"),
            "fetch",
        );
        self.execute(call, None).await
    }

    /// `GET /{resource}/me`
    #[instrument(skip_all, fields(resource = %resource))]
    pub async fn get_me<T: DeserializeOwned>(&self, resource: &str) -> Result<T, ApiError> {
        let url = self.endpoint(&[resource, "me"])?;
        let call = Call::new(Method::GET, url, Body::Empty, resource, "fetch");
        self.execute(call, None).await
    }

    /// `PUT /{resource}/{id}`
    #[instrument(skip_all, fields(resource = %resource, id = %id))]
    pub async fn update<B, T, I>(&self, resource: &str, id: I, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        I: Display,
    {
        let id = id.to_string();
        let call = Call::new(
            Method::PUT,
            self.endpoint(&[resource, &id])?,
            Self::json_body(body)?,
            format!("{resource} with ID {id}"),
            "update",
        );
        let updated = self.execute(call, None).await?;
        info!(resource = %resource, id = %id, "updated");
        Ok(updated)
    }

    /// `DELETE /{resource}/{id}`; any response body is discarded
    #[instrument(skip_all, fields(resource = %resource, id = %id))]
    pub async fn delete<I>(&self, resource: &str, id: I) -> Result<(), ApiError>
    where
        I: Display,
    {
        let id = id.to_string();
        let call = Call::new(
            Method::DELETE,
            self.endpoint(&[resource, &id])?,
            Body::Empty,
            format!("{resource} with ID {id}"),
            "delete",
        );
        let _: IgnoredAny = self.execute(call, None).await?;
        info!(resource = %resource, id = %id, "deleted");
        Ok(())
    }

    /// `POST /{resource}/{id}/upload-image` as multipart, under `field`
    /// (default `image`). No JSON content type is sent.
    #[instrument(skip_all, fields(resource = %resource, id = %id, file = %file.file_name))]
    pub async fn upload_file<T, I>(
        &self,
        resource: &str,
        id: I,
        file: UploadFile,
        field: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        I: Display,
    {
        let id = id.to_string();
        let call = Call::new(
            Method::POST,
            self.endpoint(&[resource, &id, UPLOAD_IMAGE_SEGMENT])?,
            Body::Multipart { field: field.unwrap_or(DEFAULT_UPLOAD_FIELD).to_string(), file },
            format!("{resource} image with ID {id}"),
            "upload",
        );
        self.execute(call, None).await
    }

    /// `GET /dashboard`
    #[instrument(skip_all)]
    pub async fn get_dashboard(&self) -> Result<DashboardResponse, ApiError> {
        let url = self.endpoint(&[DASHBOARD_PATH])?;
        let call = Call::new(Method::GET, url, Body::Empty, "dashboard", "get");
        self.execute(call, None).await
    }

    /// `GET /recommend?top_n=N[&subject=..][&level=..]`
    #[instrument(skip_all, fields(top_n = query.top_n))]
    pub async fn get_recommended(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Recommendation, ApiError> {
        let mut url = self.endpoint(&[RECOMMEND_PATH])?;
        url.query_pairs_mut().extend_pairs(query.pairs());
        let call = Call::new(Method::GET, url, Body::Empty, "recommended courses", "fetch");
        self.execute(call, None).await
    }
}

/// Generic acknowledgement body (`{"message": ..}`) returned by several
/// endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}
