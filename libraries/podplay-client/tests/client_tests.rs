//! Tests for the podcast API client against a mock server.

use podplay_client::{
    ApiConfig, AuthContext, AuthHeaderStyle, ClientError, PodcastClient, ProfileUpdate,
    SearchGate, SessionEvent, SessionStatus,
};
use podplay_core::PodcastId;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PodcastClient {
    PodcastClient::new(ApiConfig::new(server.uri())).expect("valid url")
}

fn signed_in_client(server: &MockServer, token: &str) -> PodcastClient {
    PodcastClient::with_auth_context(
        ApiConfig::new(server.uri()),
        Arc::new(AuthContext::with_token(token)),
    )
    .expect("valid url")
}

fn podcast_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "author": "Host",
        "thumbnailUrl": format!("https://img.example.com/{id}.png"),
        "audioUrl": format!("https://cdn.example.com/{id}.mp3")
    })
}

// =============================================================================
// Authentication
// =============================================================================

mod authentication {
    use super::*;

    #[tokio::test]
    async fn test_login_success_stores_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "ada@example.com", "password": "secret"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "tok-123",
                "user": {"id": 1, "name": "Ada", "email": "ada@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "1", "name": "Ada", "email": "ada@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut events = client.auth().subscribe();

        let login = client.login("ada@example.com", "secret").await.unwrap();
        assert_eq!(login.token, "tok-123");
        assert_eq!(login.user.id, "1");

        assert_eq!(
            events.recv().await.unwrap(),
            SessionEvent::LoggedIn {
                user_id: "1".into()
            }
        );
        assert!(client.auth().current().is_authenticated());

        let profile = client.profile().await.unwrap();
        assert_eq!(profile.name, "Ada");
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut events = client.auth().subscribe();

        let err = client.login("ada@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidCredentials));
        assert!(!client.auth().is_authenticated().await);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_profile_requires_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.profile().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthRequired));
        assert!(err.requires_login());
    }

    #[tokio::test]
    async fn test_rejected_token_expires_session() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = signed_in_client(&server, "stale");
        let mut events = client.auth().subscribe();

        let err = client.profile().await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Expired);
        assert_eq!(client.auth().current(), SessionStatus::Expired);
        assert!(client.auth().token().await.is_none());

        // Signed out now: no further request is attempted
        assert!(matches!(
            client.profile().await.unwrap_err(),
            ClientError::AuthRequired
        ));
    }

    #[tokio::test]
    async fn test_custom_header_strategy() {
        let server = MockServer::start().await;

        // Must never be hit: the token goes in the custom header only
        Mock::given(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(418))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/profile"))
            .and(header("x-auth-token", "tok-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 9, "name": "Grace", "email": "grace@example.com", "avatar_url": "https://a/9.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ApiConfig::new(server.uri()).with_auth_header(AuthHeaderStyle::Custom {
            header: "x-auth-token".into(),
        });
        let client =
            PodcastClient::with_auth_context(config, Arc::new(AuthContext::with_token("tok-9")))
                .unwrap();

        let profile = client.profile().await.unwrap();
        assert_eq!(profile.id, "9");
        assert_eq!(profile.avatar_url.as_deref(), Some("https://a/9.png"));
    }

    #[tokio::test]
    async fn test_logout_notifies_server_and_subscribers() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = signed_in_client(&server, "tok");
        let mut events = client.auth().subscribe();

        client.logout().await;

        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedOut);
        assert_eq!(client.auth().current(), SessionStatus::Anonymous);
    }

    #[tokio::test]
    async fn test_logout_clears_session_when_server_fails() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = signed_in_client(&server, "tok");
        client.logout().await;
        assert!(!client.auth().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_update_profile() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/users/profile"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"name": "Ada L."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "1", "name": "Ada L.", "email": "ada@example.com"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = signed_in_client(&server, "tok");
        let update = ProfileUpdate {
            name: Some("Ada L.".into()),
            ..Default::default()
        };

        let profile = client.update_profile(&update).await.unwrap();
        assert_eq!(profile.name, "Ada L.");
    }
}

// =============================================================================
// Catalog
// =============================================================================

mod catalog {
    use super::*;

    #[tokio::test]
    async fn test_podcasts_with_pagination() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [podcast_json("3", "Three"), podcast_json("4", "Four")],
                "pagination": {"page": 2, "limit": 2, "total": 7, "totalPages": 4}
            })))
            .mount(&server)
            .await;

        let page = client_for(&server).podcasts(2, 2).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].id.as_str(), "3");
        assert_eq!(page.pagination.total, 7);
        assert_eq!(page.pagination.total_pages, 4);
        assert!(page.pagination.has_next());
    }

    #[tokio::test]
    async fn test_podcasts_bare_array() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([podcast_json("1", "One"), {"id": 2, "title": "Two"}])),
            )
            .mount(&server)
            .await;

        let page = client_for(&server).podcasts(1, 20).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].id.as_str(), "2");
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.pagination.page, 1);
        assert!(!page.pagination.has_next());
    }

    #[tokio::test]
    async fn test_search_sends_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(query_param("search", "rust"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [podcast_json("r1", "Rustacean")]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .search_podcasts("  rust ", 1, 20)
            .await
            .unwrap();
        assert_eq!(page.items[0].title, "Rustacean");
    }

    #[tokio::test]
    async fn test_blank_search_skips_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .search_podcasts("   ", 1, 20)
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_podcast_by_id() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts/42"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": podcast_json("42", "Answer")})),
            )
            .mount(&server)
            .await;

        let podcast = client_for(&server)
            .podcast(&PodcastId::new("42"))
            .await
            .unwrap();
        assert_eq!(podcast.title, "Answer");
        assert_eq!(
            podcast.audio_url.as_deref(),
            Some("https://cdn.example.com/42.mp3")
        );
    }

    #[tokio::test]
    async fn test_categories() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"id": 1, "name": "Tech"}, {"id": 2, "name": "News"}]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/categories/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": 1, "name": "Tech", "description": "Gadgets"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        let categories = client.categories().await.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].name, "News");

        let category = client.category("1").await.unwrap();
        assert_eq!(category.description.as_deref(), Some("Gadgets"));
    }

    #[tokio::test]
    async fn test_category_podcasts() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(query_param("category", "5"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [podcast_json("c1", "In category")]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let page = client_for(&server)
            .category_podcasts("5", 1, 10)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_sends_token_when_signed_in() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let page = signed_in_client(&server, "tok").podcasts(1, 20).await.unwrap();
        assert!(page.items.is_empty());
    }
}

// =============================================================================
// Error Translation
// =============================================================================

mod errors {
    use super::*;

    #[tokio::test]
    async fn test_server_error_message_from_json() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Podcast not found"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .podcast(&PodcastId::new("missing"))
            .await
            .unwrap_err();

        match err {
            ClientError::Server { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Podcast not found");
            }
            other => panic!("Expected Server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_plain_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).categories().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Server { status: 503, ref message } if message == "maintenance"
        ));
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).podcasts(1, 20).await.unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on port 1
        let client = PodcastClient::new(ApiConfig {
            connect_timeout: Duration::from_secs(2),
            ..ApiConfig::new("http://127.0.0.1:1")
        })
        .unwrap();

        let err = client.podcasts(1, 20).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let client = PodcastClient::new(ApiConfig {
            timeout: Duration::from_millis(200),
            ..ApiConfig::new(server.uri())
        })
        .unwrap();

        let err = client.categories().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}

// =============================================================================
// Debounced Search
// =============================================================================

mod debounced_search {
    use super::*;

    #[tokio::test]
    async fn test_only_latest_search_reaches_server() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(query_param("search", "rust"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [podcast_json("r1", "Rustacean")]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/podcasts"))
            .and(query_param("search", "ru"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let client = Arc::new(client_for(&server));
        let gate = SearchGate::new(Duration::from_millis(50));

        let first = tokio::spawn({
            let (client, gate) = (Arc::clone(&client), gate.clone());
            async move { gate.search(&client, "ru", 1, 20).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = gate.search(&client, "rust", 1, 20).await;

        assert!(first.await.unwrap().is_none());
        let page = second.expect("latest search").unwrap();
        assert_eq!(page.items[0].id.as_str(), "r1");
    }
}
