use std::time::Duration;

use coursehub_domain::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS};
use coursehub_domain::{ApiError, RetryConfig};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::errors::{api_error, is_transport_failure, transport_details};

/// HTTP client with built-in retry and timeout support.
///
/// Only transport failures are retried. Any HTTP response, including 5xx,
/// is handed back to the caller on the first attempt.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    retries: u32,
    retry_delay: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, ApiError> {
        Self::builder().build()
    }

    /// Underlying reqwest client, for building one-off requests
    pub fn raw(&self) -> &ReqwestClient {
        &self.client
    }

    /// Execute a request with retry semantics.
    ///
    /// `build` is invoked once per attempt so that non-clonable bodies
    /// (multipart) and the current bearer token are produced fresh each
    /// time. Retry `n` waits `n * retry_delay` first.
    pub async fn send<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&ReqwestClient) -> Result<RequestBuilder, ApiError>,
    {
        let mut attempt: u32 = 0;

        loop {
            let request = build(&self.client)?.build().map_err(api_error)?;
            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    debug!(
                        attempt = attempt + 1,
                        %method,
                        %url,
                        status = %response.status(),
                        "received HTTP response"
                    );
                    return Ok(response);
                }
                Err(err) if is_transport_failure(&err) => {
                    if attempt < self.retries {
                        attempt += 1;
                        let delay = self.delay_for_attempt(attempt);
                        warn!(
                            retry = attempt,
                            max_retries = self.retries,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            %method,
                            %url,
                            error = %err,
                            "transport failure, retrying"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        continue;
                    }

                    warn!(retries = self.retries, %method, %url, error = %err, "retries exhausted");
                    return Err(ApiError::Transport {
                        message: format!("Network error after {} retries", self.retries),
                        details: Some(transport_details(&err)),
                    });
                }
                Err(err) => {
                    debug!(%method, %url, error = %err, "HTTP request failed");
                    return Err(api_error(err));
                }
            }
        }
    }

    /// Execute a request exactly once, bypassing the retry policy.
    pub async fn send_once(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder.build().map_err(api_error)?;
        debug!(method = %request.method(), url = %request.url(), "sending HTTP request once");
        self.client.execute(request).await.map_err(api_error)
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.retry_delay.saturating_mul(attempt)
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    retries: u32,
    retry_delay: Duration,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            user_agent: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the number of retries after the initial attempt.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Apply a [`RetryConfig`] in one go.
    pub fn retry(self, retry: RetryConfig) -> Self {
        self.retries(retry.retries).retry_delay(retry.retry_delay())
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        let client = builder.build().map_err(|err| ApiError::Internal {
            message: format!("failed to build HTTP client: {err}"),
        })?;

        Ok(HttpClient { client, retries: self.retries, retry_delay: self.retry_delay })
    }
}
