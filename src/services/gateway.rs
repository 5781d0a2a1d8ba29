use std::sync::Arc;

use anyhow::Context;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Settings;
use crate::schemas::HealthStatus;
use crate::services::session::SessionProvider;

mod admin;
mod student;
mod teacher;

pub use admin::AdminApi;
pub use student::StudentApi;
pub use teacher::TeacherApi;

pub(crate) const NO_TOKEN_MESSAGE: &str = "No authentication token available. Please log in again.";
pub(crate) const NETWORK_MESSAGE: &str =
    "Cannot connect to the server. Please make sure the backend is running.";
const EMPTY_BODY_MESSAGE: &str = "Server returned empty response";
const INVALID_JSON_MESSAGE: &str = "Server returned invalid JSON response";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Network(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    MalformedResponse(String),
}

impl GatewayError {
    pub fn unauthenticated() -> Self {
        Self::Unauthenticated(NO_TOKEN_MESSAGE.to_string())
    }

    pub fn network() -> Self {
        Self::Network(NETWORK_MESSAGE.to_string())
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the caller's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
            || matches!(self, Self::Server { status: 401, .. })
    }
}

/// The single HTTP client used by every dashboard. Built once by the
/// composition root and shared by reference.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionProvider>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

enum Body {
    Json,
    AllowEmpty,
}

impl HttpGateway {
    pub fn from_settings(
        settings: &Settings,
        session: Arc<dyn SessionProvider>,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(settings.api().connect_timeout())
            .timeout(settings.api().request_timeout())
            .build()
            .context("Failed to build API HTTP client")?;

        Ok(Self::new(client, &settings.api().base_url, session))
    }

    pub fn new(client: Client, base_url: &str, session: Arc<dyn SessionProvider>) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string(), session }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Unauthenticated liveness probe.
    pub async fn check_health(&self) -> Result<HealthStatus, GatewayError> {
        let builder = self.client.get(self.url("/api/health"));
        let outcome = self.execute(builder, Body::Json).await;
        self.finish(&Method::GET, "/api/health", outcome)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.call(Method::GET, path, |builder| builder, Body::Json).await
    }

    pub(crate) async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, GatewayError> {
        self.call(Method::GET, path, |builder| builder.query(query), Body::Json).await
    }

    pub(crate) async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError>
    where
        B: serde::Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.call(method, path, |builder| builder.json(body), Body::Json).await
    }

    /// Write whose reply body is ignored. An empty 2xx body is accepted.
    pub(crate) async fn send_ack<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), GatewayError>
    where
        B: serde::Serialize + ?Sized + Sync,
    {
        let _: Value = self
            .call(
                method,
                path,
                |builder| match body {
                    Some(body) => builder.json(body),
                    None => builder,
                },
                Body::AllowEmpty,
            )
            .await?;
        Ok(())
    }

    async fn call<T, F>(
        &self,
        method: Method,
        path: &str,
        build: F,
        body: Body,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let outcome = match self.bearer().await {
            Ok(token) => {
                let builder =
                    build(self.client.request(method.clone(), self.url(path)).bearer_auth(token));
                self.execute(builder, body).await
            }
            Err(err) => Err(err),
        };
        self.finish(&method, path, outcome)
    }

    async fn bearer(&self) -> Result<String, GatewayError> {
        let session = self.session.current_session().await.ok_or_else(GatewayError::unauthenticated)?;
        if session.access_token().is_empty()
            || session.is_expired(time::OffsetDateTime::now_utc())
        {
            return Err(GatewayError::unauthenticated());
        }
        Ok(session.access_token().to_string())
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: Body,
    ) -> Result<T, GatewayError> {
        let response = builder.send().await.map_err(|err| {
            tracing::debug!(error = %err, "API transport failure");
            GatewayError::network()
        })?;
        let status = response.status();
        let raw = response.text().await.map_err(|err| {
            tracing::debug!(error = %err, "Failed to read API response body");
            GatewayError::network()
        })?;

        decode_response(status, &raw, body)
    }

    fn finish<T>(
        &self,
        method: &Method,
        path: &str,
        outcome: Result<T, GatewayError>,
    ) -> Result<T, GatewayError> {
        let label = match &outcome {
            Ok(_) => "ok",
            Err(GatewayError::Unauthenticated(_)) => "unauthenticated",
            Err(GatewayError::Network(_)) => "network",
            Err(GatewayError::Server { .. }) => "server",
            Err(GatewayError::MalformedResponse(_)) => "malformed",
        };
        metrics::counter!(
            "gateway_requests_total",
            "method" => method.as_str().to_string(),
            "outcome" => label
        )
        .increment(1);

        if let Err(err) = &outcome {
            tracing::error!(method = %method, path, status = ?err.status(), error = %err, "API request failed");
        }
        outcome
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    raw: &str,
    body: Body,
) -> Result<T, GatewayError> {
    let trimmed = raw.trim();

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(trimmed)
            .ok()
            .and_then(|payload| extract_error_message(&payload))
            .unwrap_or_else(|| format!("Server error: {}", status.as_u16()));
        return Err(GatewayError::server(status.as_u16(), message));
    }

    if trimmed.is_empty() {
        return match body {
            Body::AllowEmpty => serde_json::from_value(Value::Null)
                .map_err(|_| GatewayError::MalformedResponse(EMPTY_BODY_MESSAGE.to_string())),
            Body::Json => Err(GatewayError::MalformedResponse(EMPTY_BODY_MESSAGE.to_string())),
        };
    }

    let payload: Value = serde_json::from_str(trimmed)
        .map_err(|_| GatewayError::MalformedResponse(INVALID_JSON_MESSAGE.to_string()))?;
    serde_json::from_value(payload).map_err(|err| {
        tracing::debug!(error = %err, "API response did not match the expected shape");
        GatewayError::MalformedResponse(format!("Unexpected response shape: {err}"))
    })
}

fn extract_error_message(payload: &Value) -> Option<String> {
    ["error", "message", "detail"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
