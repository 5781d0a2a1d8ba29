use std::future::Future;

use async_trait::async_trait;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::RwLock;

use crate::core::config::IdentitySettings;

/// An authenticated session as handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
    expires_at: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    #[serde(default)]
    exp: Option<i64>,
}

impl Session {
    pub fn new(access_token: impl Into<String>, expires_at: Option<OffsetDateTime>) -> Self {
        Self { access_token: access_token.into(), expires_at }
    }

    /// Builds a session from a bearer token, taking the expiry from the
    /// token's `exp` claim. The signature is not checked here; the backend
    /// verifies it on every request.
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        let expires_at = read_expiry(&access_token);
        Self { access_token, expires_at }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn expires_within(&self, window: Duration, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now + window)
    }
}

fn read_expiry(token: &str) -> Option<OffsetDateTime> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims.exp.and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok())
}

/// Source of the current session. Asked before every authenticated request so
/// a refreshed token is picked up without rebuilding the gateway.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Option<Session>;
}

/// Session holder for the command-line client: seeded from configuration and
/// replaced or cleared explicitly.
#[derive(Debug, Default)]
pub struct StaticSession {
    inner: RwLock<Option<Session>>,
}

impl StaticSession {
    pub fn new(session: Option<Session>) -> Self {
        Self { inner: RwLock::new(session) }
    }

    pub fn from_settings(identity: &IdentitySettings) -> Self {
        let session = identity.access_token.as_deref().filter(|token| !token.is_empty()).map(|token| {
            match identity
                .access_token_expires_at
                .and_then(|exp| OffsetDateTime::from_unix_timestamp(exp).ok())
            {
                Some(expires_at) => Session::new(token, Some(expires_at)),
                None => Session::from_access_token(token),
            }
        });
        Self::new(session)
    }

    pub async fn replace(&self, session: Session) {
        *self.inner.write().await = Some(session);
    }

    pub async fn sign_out(&self) {
        self.inner.write().await.take();
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";
pub const SESSION_EXPIRING_MESSAGE: &str = "Your session will expire soon. Please save your work.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Valid,
    ExpiringSoon,
    Expired,
}

impl SessionCheck {
    pub fn message(self) -> Option<&'static str> {
        match self {
            Self::Valid => None,
            Self::ExpiringSoon => Some(SESSION_EXPIRING_MESSAGE),
            Self::Expired => Some(SESSION_EXPIRED_MESSAGE),
        }
    }
}

/// A missing session counts as expired.
pub async fn check_session(
    provider: &dyn SessionProvider,
    warning: Duration,
    now: OffsetDateTime,
) -> SessionCheck {
    match provider.current_session().await {
        None => SessionCheck::Expired,
        Some(session) if session.is_expired(now) => SessionCheck::Expired,
        Some(session) if session.expires_within(warning, now) => SessionCheck::ExpiringSoon,
        Some(_) => SessionCheck::Valid,
    }
}

/// Checks the session every `every` until it expires or `shutdown`
/// resolves. Returns the last check, `Valid` when stopped by shutdown.
pub async fn monitor_session<F>(
    provider: &dyn SessionProvider,
    every: std::time::Duration,
    warning: Duration,
    shutdown: F,
) -> SessionCheck
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(every);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => return SessionCheck::Valid,
            _ = ticker.tick() => {}
        }

        let check = check_session(provider, warning, OffsetDateTime::now_utc()).await;
        match check {
            SessionCheck::Valid => tracing::debug!("Session still valid"),
            SessionCheck::ExpiringSoon => tracing::warn!("Session will expire soon"),
            SessionCheck::Expired => {
                tracing::error!("Session expired; sign in again to continue");
                return check;
            }
        }
    }
}
