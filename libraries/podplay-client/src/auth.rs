//! Credential injection and session state.
//!
//! The token lives in an [`AuthContext`] shared by everything that talks to
//! the API. Each request attaches it through the [`AuthStrategy`] picked when
//! the client is built; there is no process-wide header state. Login, logout
//! and expiry are published to subscribers instead of being polled.

use crate::error::{ClientError, Result};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

/// Buffered session events per subscriber.
const EVENT_CAPACITY: usize = 16;

/// Attaches a token to an outgoing request.
pub trait AuthStrategy: Send + Sync + std::fmt::Debug {
    fn apply(&self, request: RequestBuilder, token: &str) -> RequestBuilder;
}

/// `Authorization: Bearer <token>`
#[derive(Debug, Clone, Copy, Default)]
pub struct BearerAuth;

impl AuthStrategy for BearerAuth {
    fn apply(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request.bearer_auth(token)
    }
}

/// `<header>: <token>` for backends that read the raw token from a custom
/// header.
#[derive(Debug, Clone)]
pub struct HeaderTokenAuth {
    header: HeaderName,
}

impl HeaderTokenAuth {
    pub fn new(header: &str) -> Result<Self> {
        let header = HeaderName::from_bytes(header.trim().as_bytes())
            .map_err(|e| ClientError::Config(format!("invalid auth header '{header}': {e}")))?;
        Ok(Self { header })
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl AuthStrategy for HeaderTokenAuth {
    fn apply(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        match HeaderValue::from_str(token) {
            Ok(value) => request.header(self.header.clone(), value),
            Err(e) => {
                warn!(header = %self.header, error = %e, "Token is not a valid header value, sending without it");
                request
            }
        }
    }
}

/// Auth header style, as configured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthHeaderStyle {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// Raw token in a custom header
    Custom { header: String },
}

impl AuthHeaderStyle {
    /// `bearer` (any case) or `authorization` selects bearer auth, anything
    /// else names a custom header.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("bearer") || value.eq_ignore_ascii_case(AUTHORIZATION.as_str())
        {
            Self::Bearer
        } else {
            Self::Custom {
                header: value.to_string(),
            }
        }
    }

    pub fn strategy(&self) -> Result<Box<dyn AuthStrategy>> {
        match self {
            Self::Bearer => Ok(Box::new(BearerAuth)),
            Self::Custom { header } => Ok(Box::new(HeaderTokenAuth::new(header)?)),
        }
    }
}

/// Published on login, logout and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: String },
    LoggedOut,
    /// The server rejected the stored token
    Expired,
}

/// Latest session status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Anonymous,
    /// `user_id` is unknown for sessions restored from a stored token
    Authenticated { user_id: Option<String> },
    Expired,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// Shared authentication state.
#[derive(Debug)]
pub struct AuthContext {
    token: RwLock<Option<String>>,
    events: broadcast::Sender<SessionEvent>,
    status: watch::Sender<SessionStatus>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    /// Signed-out context.
    pub fn new() -> Self {
        Self::build(None, SessionStatus::Anonymous)
    }

    /// Context restored from a stored token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::build(
            Some(token.into()),
            SessionStatus::Authenticated { user_id: None },
        )
    }

    fn build(token: Option<String>, status: SessionStatus) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (status, _) = watch::channel(status);
        Self {
            token: RwLock::new(token),
            events,
            status,
        }
    }

    /// Current token, if signed in.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// Receive login/logout/expiry events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Watch the session status.
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Latest session status.
    pub fn current(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    pub(crate) async fn sign_in(&self, token: String, user_id: String) {
        *self.token.write().await = Some(token);
        self.status.send_replace(SessionStatus::Authenticated {
            user_id: Some(user_id.clone()),
        });
        info!(user_id = %user_id, "Signed in");
        self.publish(SessionEvent::LoggedIn { user_id });
    }

    /// Drop the token and notify subscribers.
    pub async fn sign_out(&self) {
        let had_token = self.token.write().await.take().is_some();
        self.status.send_replace(SessionStatus::Anonymous);
        if had_token {
            info!("Signed out");
            self.publish(SessionEvent::LoggedOut);
        }
    }

    /// Invalidate `rejected` after the server refused it.
    ///
    /// Nothing happens if the held token has changed since, so a late 401
    /// for an old token cannot end a newer session. Only the first rejection
    /// of a given token is published.
    pub(crate) async fn expire(&self, rejected: &str) {
        let mut token = self.token.write().await;
        if token.as_deref() != Some(rejected) {
            debug!("Ignoring rejection of a token no longer held");
            return;
        }

        *token = None;
        drop(token);

        warn!("Session expired");
        self.status.send_replace(SessionStatus::Expired);
        self.publish(SessionEvent::Expired);
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine
        if self.events.send(event).is_err() {
            debug!("No session subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_style_parse() {
        assert_eq!(AuthHeaderStyle::parse("bearer"), AuthHeaderStyle::Bearer);
        assert_eq!(AuthHeaderStyle::parse(" Bearer "), AuthHeaderStyle::Bearer);
        assert_eq!(AuthHeaderStyle::parse("Authorization"), AuthHeaderStyle::Bearer);
        assert_eq!(
            AuthHeaderStyle::parse("x-auth-token"),
            AuthHeaderStyle::Custom {
                header: "x-auth-token".into()
            }
        );
    }

    #[test]
    fn test_invalid_custom_header_rejected() {
        let style = AuthHeaderStyle::Custom {
            header: "bad header".into(),
        };
        assert!(matches!(style.strategy(), Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_sign_in_and_out_publish_events() {
        let context = AuthContext::new();
        let mut events = context.subscribe();

        context.sign_in("tok".into(), "u1".into()).await;
        assert_eq!(context.token().await.as_deref(), Some("tok"));
        assert_eq!(
            context.current(),
            SessionStatus::Authenticated {
                user_id: Some("u1".into())
            }
        );

        context.sign_out().await;
        assert!(!context.is_authenticated().await);

        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn {
                user_id: "u1".into()
            }
        );
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn test_expire_publishes_once() {
        let context = AuthContext::with_token("stale");
        let mut events = context.subscribe();
        assert!(context.current().is_authenticated());

        context.expire("stale").await;
        context.expire("stale").await;

        assert_eq!(context.current(), SessionStatus::Expired);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_expire_ignores_replaced_token() {
        let context = AuthContext::with_token("old");
        context.sign_in("fresh".into(), "u1".into()).await;
        let mut events = context.subscribe();

        context.expire("old").await;

        assert_eq!(context.token().await.as_deref(), Some("fresh"));
        assert!(context.current().is_authenticated());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_watch_sees_latest_status() {
        let context = AuthContext::new();
        let mut status = context.watch();

        context.sign_in("tok".into(), "u1".into()).await;
        status.changed().await.unwrap();
        assert!(status.borrow().is_authenticated());
    }
}
