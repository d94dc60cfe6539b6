//! Podplay API Client
//!
//! HTTP client library for the podcast backend.
//!
//! # Features
//!
//! - **Authentication**: email/password login, token injected per request by
//!   a configurable strategy, login/logout/expiry published to subscribers
//! - **Catalog**: podcasts, search, categories, with pagination
//! - **Profile**: read and update the signed-in user's profile
//! - **Search gate**: debounced, latest-wins type-ahead search
//!
//! # Example
//!
//! ```ignore
//! use podplay_client::{ApiConfig, PodcastClient, SearchGate, SessionEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PodcastClient::new(ApiConfig::new("https://api.example.com/api"))?;
//!
//!     // React to expiry instead of polling
//!     let mut events = client.auth().subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             if event == SessionEvent::Expired {
//!                 // route to the login screen
//!             }
//!         }
//!     });
//!
//!     client.login("ada@example.com", "secret").await?;
//!
//!     let gate = SearchGate::default();
//!     if let Some(page) = gate.search(&client, "rust", 1, 20).await {
//!         println!("{} results", page?.items.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod client;
mod error;
mod search;
mod types;

pub use auth::{
    AuthContext, AuthHeaderStyle, AuthStrategy, BearerAuth, HeaderTokenAuth, SessionEvent,
    SessionStatus,
};
pub use client::PodcastClient;
pub use error::{ClientError, Result};
pub use search::{SearchGate, DEFAULT_DEBOUNCE};
pub use types::{
    ApiConfig, Category, LoginRequest, LoginResponse, Page, Pagination, Podcast, ProfileUpdate,
    UserProfile,
};
