//! MedStore HTTP client
//!
//! Every call goes through the same pipeline: build a transport request from
//! an [`ApiRequest`] descriptor (attaching the stored bearer token unless the
//! path is an auth endpoint), send it, and on a 401 run at most one
//! refresh-and-retry before surfacing the failure to the caller.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod request;
pub mod users;

use std::time::Duration;

use medstore_core::SessionContext;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::types::{ApiEnvelope, RefreshRequest};
use config::ClientConfig;
use error::ClientError;
use request::{ApiRequest, RequestBody, is_auth_endpoint, multipart_form};

/// Token-refresh endpoint, relative to the base URL.
const REFRESH_PATH: &str = "/auth/refresh";

/// Whether a dispatch has already been retried after a refresh. One retry
/// maximum per original request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

/// MedStore API client
#[derive(Clone, Debug)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl StoreClient {
    /// Create a new client with default configuration and a fresh in-memory
    /// session.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> StoreClientBuilder {
        StoreClientBuilder::default()
    }

    /// Create a client from configuration, sharing an existing session.
    pub fn from_config(config: &ClientConfig, session: SessionContext) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(config.base_url.clone())
            .timeout(config.timeout)
            .session(session)
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session holding this client's credentials.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Send a descriptor through the full pipeline: header interception,
    /// dispatch, and at most one refresh-and-retry on 401. Responses come
    /// back as-is; nothing here maps statuses to errors.
    pub async fn dispatch(&self, request: &ApiRequest) -> Result<Response, ClientError> {
        let mut attempt = Attempt::First;
        let mut retry_token: Option<String> = None;
        loop {
            let response = self
                .materialize(request, retry_token.as_deref())?
                .send()
                .await?;

            if response.status() != StatusCode::UNAUTHORIZED
                || attempt == Attempt::Retried
                || is_auth_endpoint(request.path())
            {
                return Ok(response);
            }
            let Some(refresh_token) = self.session.refresh_token() else {
                return Ok(response);
            };

            debug!(path = request.path(), "access token rejected, refreshing");
            match self.refresh_access_token(&refresh_token).await {
                Ok(access_token) => {
                    self.session.store_access_token(&access_token);
                    retry_token = Some(access_token);
                    attempt = Attempt::Retried;
                }
                Err(error) => {
                    // The caller sees the original 401. Credentials stay in
                    // the store; logout is a caller-level decision.
                    warn!(path = request.path(), error = %error, "token refresh failed");
                    return Ok(response);
                }
            }
        }
    }

    /// Dispatch a descriptor and decode the JSON response body.
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        let response = self.dispatch(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Dispatch a descriptor and unwrap the standard `{code, message, data}`
    /// envelope.
    pub(crate) async fn execute_enveloped<T: serde::de::DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, ClientError> {
        let envelope: ApiEnvelope<T> = self.execute(request).await?;
        envelope.into_data().ok_or_else(|| {
            ClientError::UnexpectedResponse(format!("{} returned an empty envelope", request.path()))
        })
    }

    /// Build a transport request from a descriptor. `retry_token` replaces
    /// the stored access token on the post-refresh retry.
    fn materialize(
        &self,
        request: &ApiRequest,
        retry_token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut builder = self.client.request(request.method().clone(), url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }

        let mut headers = HeaderMap::new();
        if let Some(content_type) = request.explicit_content_type() {
            if let Ok(value) = HeaderValue::from_str(content_type) {
                headers.insert(CONTENT_TYPE, value);
            }
        }
        let token = retry_token
            .map(str::to_owned)
            .or_else(|| self.session.access_token());
        apply_session_headers(
            &mut headers,
            token.as_deref(),
            request.path(),
            request.is_multipart(),
        );
        builder = builder.headers(headers);

        match request.body() {
            RequestBody::Empty => {}
            RequestBody::Json(value) => builder = builder.json(value),
            RequestBody::Multipart(fields) => builder = builder.multipart(multipart_form(fields)?),
        }
        Ok(builder)
    }

    /// Trade the stored refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest {
            refresh_token: refresh_token.to_owned(),
        })?;
        // Direct send: the refresh path is an auth endpoint, so materialize
        // attaches no bearer token and a 401 here cannot recurse.
        let response = self.materialize(&request, None)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(ClientError::from_status(status, message));
        }

        let body: serde_json::Value = response.json().await?;
        extract_access_token(&body)
            .map(str::to_owned)
            .ok_or_else(|| {
                ClientError::UnexpectedResponse("refresh response carries no access token".into())
            })
    }
}

/// Amend outgoing headers per the session contract: insert (never append)
/// the bearer token on non-auth paths, and drop any explicit `Content-Type`
/// from multipart requests so the transport generates the boundary. Inserting
/// keeps the amendment idempotent; this stage never fails the request.
fn apply_session_headers(
    headers: &mut HeaderMap,
    access_token: Option<&str>,
    path: &str,
    multipart: bool,
) {
    if let Some(token) = access_token {
        if !is_auth_endpoint(path) {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("stored access token is not a valid header value, skipping"),
            }
        }
    }
    if multipart {
        headers.remove(CONTENT_TYPE);
    }
}

/// Pull the new access token out of either refresh-response shape the
/// backend emits: `{data: {accessToken}}` or `{accessToken}`.
fn extract_access_token(body: &serde_json::Value) -> Option<&str> {
    body.pointer("/data/accessToken")
        .or_else(|| body.get("accessToken"))
        .and_then(serde_json::Value::as_str)
}

/// Builder for StoreClient
#[derive(Default)]
pub struct StoreClientBuilder {
    base_url: Option<String>,
    session: Option<SessionContext>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl StoreClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Share an existing session instead of a fresh in-memory one.
    pub fn session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<StoreClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(ClientConfig::DEFAULT_TIMEOUT))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| "medstore-client/0.1.0".to_owned()),
            )
            .build()?;

        Ok(StoreClient {
            client,
            base_url,
            session: self.session.unwrap_or_else(SessionContext::in_memory),
        })
    }
}
