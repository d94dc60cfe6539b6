//! Podcast API client.

use crate::auth::{AuthContext, AuthStrategy};
use crate::error::{ClientError, Result};
use crate::types::{
    ApiConfig, Category, ListEnvelope, LoginRequest, LoginResponse, ObjectEnvelope, Page, Podcast,
    ProfileUpdate, UserProfile,
};
use podplay_core::PodcastId;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Whether a request carries the stored token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Sent with the token when signed in
    Optional,
    /// Fails with `AuthRequired` when signed out
    Required,
}

/// A request with credentials resolved.
struct Prepared {
    request: RequestBuilder,
    /// Token the request was sent with
    token: Option<String>,
}

impl Prepared {
    fn map(self, f: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Self {
        Self {
            request: f(self.request),
            token: self.token,
        }
    }
}

/// Client for the podcast API.
///
/// # Example
///
/// ```ignore
/// use podplay_client::{ApiConfig, PodcastClient};
///
/// let client = PodcastClient::new(ApiConfig::new("https://api.example.com/api"))?;
///
/// let login = client.login("ada@example.com", "secret").await?;
/// println!("Signed in as {}", login.user.name);
///
/// let page = client.podcasts(1, 20).await?;
/// println!("{} of {} podcasts", page.items.len(), page.pagination.total);
/// ```
#[derive(Debug)]
pub struct PodcastClient {
    http: Client,
    base_url: String,
    strategy: Box<dyn AuthStrategy>,
    auth: Arc<AuthContext>,
}

impl PodcastClient {
    /// Create a new signed-out client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        Self::with_auth_context(config, Arc::new(AuthContext::new()))
    }

    /// Create a client sharing an existing auth context.
    pub fn with_auth_context(config: ApiConfig, auth: Arc<AuthContext>) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let strategy = config.auth_header.strategy()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(format!("Podplay/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            strategy,
            auth,
        })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared authentication state.
    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    // ===== Authentication =====

    /// Sign in with email and password.
    ///
    /// On success the token is stored and `SessionEvent::LoggedIn` published.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let url = self.url("auth/login");
        debug!(url = %url, email = %email, "Attempting login");

        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(&url).json(&request).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(email = %email, "Login failed: invalid credentials");
            return Err(ClientError::InvalidCredentials);
        }

        let login: LoginResponse = self
            .parse::<ObjectEnvelope<LoginResponse>>(response, None)
            .await?
            .into_inner();

        self.auth
            .sign_in(login.token.clone(), login.user.id.clone())
            .await;
        Ok(login)
    }

    /// Sign out.
    ///
    /// The server is told first when a token is held; that call is best-effort
    /// and the local session is cleared regardless.
    pub async fn logout(&self) {
        if let Some(token) = self.auth.token().await {
            let request = self
                .strategy
                .apply(self.http.post(self.url("auth/logout")), &token);
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    debug!(status = %response.status(), "Server-side logout rejected");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Server-side logout failed"),
            }
        }
        self.auth.sign_out().await;
    }

    /// Get the signed-in user's profile.
    pub async fn profile(&self) -> Result<UserProfile> {
        self.get_object("users/profile", Access::Required).await
    }

    /// Update the signed-in user's profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile> {
        let request = self
            .prepare(Method::PUT, "users/profile", Access::Required)
            .await?
            .map(|r| r.json(update));
        let profile = self
            .send::<ObjectEnvelope<UserProfile>>(request)
            .await?
            .into_inner();

        info!(user_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    // ===== Catalog =====

    /// List podcasts.
    pub async fn podcasts(&self, page: u32, limit: u32) -> Result<Page<Podcast>> {
        self.get_page("podcasts", &[], page, limit).await
    }

    /// Search podcasts by free text.
    ///
    /// A blank query returns an empty page without a request.
    pub async fn search_podcasts(&self, query: &str, page: u32, limit: u32) -> Result<Page<Podcast>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Page::empty(page, limit));
        }
        self.get_page("podcasts", &[("search", query)], page, limit)
            .await
    }

    /// Get one podcast.
    pub async fn podcast(&self, id: &PodcastId) -> Result<Podcast> {
        self.get_object(&format!("podcasts/{}", id.as_str()), Access::Optional)
            .await
    }

    /// List categories.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let request = self
            .prepare(Method::GET, "categories", Access::Optional)
            .await?;
        let envelope: ListEnvelope<Category> = self.send(request).await?;
        Ok(envelope.into_items())
    }

    /// Get one category.
    pub async fn category(&self, id: &str) -> Result<Category> {
        self.get_object(&format!("categories/{id}"), Access::Optional)
            .await
    }

    /// List podcasts in a category.
    pub async fn category_podcasts(
        &self,
        category_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<Page<Podcast>> {
        self.get_page("podcasts", &[("category", category_id)], page, limit)
            .await
    }

    // ===== Request plumbing =====

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn prepare(&self, method: Method, path: &str, access: Access) -> Result<Prepared> {
        let request = self.http.request(method, self.url(path));
        match (self.auth.token().await, access) {
            (Some(token), _) => Ok(Prepared {
                request: self.strategy.apply(request, &token),
                token: Some(token),
            }),
            (None, Access::Optional) => Ok(Prepared {
                request,
                token: None,
            }),
            (None, Access::Required) => Err(ClientError::AuthRequired),
        }
    }

    async fn get_page(
        &self,
        path: &str,
        filters: &[(&str, &str)],
        page: u32,
        limit: u32,
    ) -> Result<Page<Podcast>> {
        let request = self
            .prepare(Method::GET, path, Access::Optional)
            .await?
            .map(|r| r.query(filters).query(&[("page", page), ("limit", limit)]));

        let envelope: ListEnvelope<Podcast> = self.send(request).await?;
        Ok(envelope.into_page(page, limit))
    }

    async fn get_object<T: DeserializeOwned>(&self, path: &str, access: Access) -> Result<T> {
        let request = self.prepare(Method::GET, path, access).await?;
        let envelope: ObjectEnvelope<T> = self.send(request).await?;
        Ok(envelope.into_inner())
    }

    async fn send<T: DeserializeOwned>(&self, prepared: Prepared) -> Result<T> {
        let response = prepared.request.send().await.map_err(|e| {
            if e.is_timeout() {
                debug!(error = %e, "Request timed out");
            }
            ClientError::Network(e)
        })?;
        self.parse(response, prepared.token.as_deref()).await
    }

    /// Translate a response into a value or a `ClientError`.
    ///
    /// A 401 on a request that carried a token invalidates that token.
    async fn parse<T: DeserializeOwned>(
        &self,
        response: Response,
        sent_token: Option<&str>,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            return serde_json::from_str(&body).map_err(|e| {
                ClientError::Parse(format!("{} (status {})", e, status.as_u16()))
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = sent_token {
                self.auth.expire(token).await;
                return Err(ClientError::SessionExpired);
            }
            return Err(ClientError::AuthRequired);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body, status);
        warn!(status = status.as_u16(), message = %message, "Request failed");
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
    }

    let url = Url::parse(trimmed).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Message from a JSON `message`/`error` field, the raw body, or the status
/// reason.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for field in ["message", "error"] {
            if let Some(message) = value.get(field).and_then(serde_json::Value::as_str) {
                return message.to_string();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
