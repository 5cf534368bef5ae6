//! Authentication flows
//!
//! Login stores the issued token and resolves the current user; logout is
//! best effort on the wire but always clears local state.

use coursehub_domain::constants::{LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH, USERS_RESOURCE};
use coursehub_domain::{ApiError, Credentials, CurrentUser, LoginResponse, RegisterRequest};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use super::client::{ApiClient, Body, Call};

impl ApiClient {
    /// `POST /token/pair`, then `GET /users/me`.
    ///
    /// The token is persisted before the profile lookup, so the lookup is
    /// authenticated. If the lookup fails the user is recorded as a student
    /// and the login still succeeds.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        let body = serde_json::to_value(credentials).map_err(|e| ApiError::Internal {
            message: format!("Failed to serialize credentials: {e}"),
        })?;
        let url = self.endpoint(&[LOGIN_PATH])?;
        let call = Call::new(Method::POST, url, Body::Json(body), "authentication", "login");
        let response: LoginResponse = self.execute(call, None).await?;

        if response.access.is_empty() {
            return Err(ApiError::InvalidResponse {
                status: 200,
                message: "Login response carried an empty access token".to_string(),
            });
        }
        self.session.store_token(&response.access).await?;

        let user = match self.get_me::<CurrentUser>(USERS_RESOURCE).await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, status = err.status(), "failed to fetch user details after login");
                CurrentUser::fallback_student()
            }
        };
        let role = user.role;
        self.session.set_current_user(user).await?;

        info!(%role, "login succeeded");
        Ok(response)
    }

    /// `POST /auth/register`
    #[instrument(skip_all, fields(role = %request.role))]
    pub async fn register<T: DeserializeOwned>(
        &self,
        request: &RegisterRequest,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Internal {
            message: format!("Failed to serialize registration: {e}"),
        })?;
        let url = self.endpoint(&[REGISTER_PATH])?;
        let call = Call::new(Method::POST, url, Body::Json(body), "user", "register");
        let registered = self.execute(call, None).await?;
        info!("registration accepted");
        Ok(registered)
    }

    /// `POST /auth/logout`, sent once without retry or de-duplication.
    ///
    /// The server's answer is only logged; the token and current user are
    /// cleared regardless.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&[LOGOUT_PATH])?;
        let call = Call::new(Method::POST, url, Body::Empty, "session", "logout");
        let token = self.session.token();

        match call.request(self.http.raw(), token.as_deref()) {
            Ok(builder) => match self.http.send_once(builder).await {
                Ok(response) if response.status().is_success() => {
                    info!("server session ended");
                }
                Ok(response) => {
                    warn!(status = response.status().as_u16(), "logout rejected by server");
                }
                Err(err) => {
                    warn!(error = %err, "logout request failed");
                }
            },
            Err(err) => warn!(error = %err, "could not build logout request"),
        }

        self.session.clear().await?;
        info!("logged out");
        Ok(())
    }
}
