use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::auth;
use crate::handlers;
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let write_limit =
        || middleware::from_fn_with_state(state.clone(), auth::rate_limit::rate_limit_writes);

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz));

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::users::me))
        // Entries
        .route(
            "/api/entries",
            get(handlers::entries::list_entries)
                .merge(post(handlers::entries::create_entry).layer(write_limit())),
        )
        .route(
            "/api/entries/:id",
            get(handlers::entries::get_entry)
                .put(handlers::entries::update_entry)
                .delete(handlers::entries::delete_entry),
        )
        // Collections
        .route(
            "/api/collections",
            get(handlers::collections::list_collections)
                .merge(post(handlers::collections::create_collection).layer(write_limit())),
        )
        .route(
            "/api/collections/:id",
            delete(handlers::collections::delete_collection),
        )
        // Drafts
        .route(
            "/api/drafts",
            get(handlers::drafts::get_draft).put(handlers::drafts::save_draft),
        )
        // Analytics
        .route("/api/analytics", get(handlers::analytics::get_analytics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::sign_test_token;
    use crate::auth::rate_limit::RateLimitState;
    use crate::config::Config;
    use crate::db::testing::{FailingStore, StuckDraftStore};
    use crate::db::{JournalStore, MemoryJournalStore};
    use crate::services::mood_image::{MoodImageLookup, NoImageLookup};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Remembers every query and answers with a URL derived from it.
    #[derive(Default)]
    struct RecordingLookup {
        queries: Mutex<Vec<String>>,
    }

    impl RecordingLookup {
        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MoodImageLookup for RecordingLookup {
        async fn lookup(&self, query: &str) -> Option<String> {
            self.queries.lock().unwrap().push(query.to_string());
            Some(format!("https://img.example/{}", query.replace(' ', "+")))
        }
    }

    fn build_app(store: Arc<dyn JournalStore>, mood_images: Arc<dyn MoodImageLookup>) -> Router {
        let config = Config::for_tests();
        let rate_limiter =
            RateLimitState::new(config.rate_limit_max_requests, config.rate_limit_window_secs);
        router(AppState {
            store,
            config: Arc::new(config),
            rate_limiter,
            mood_images,
        })
    }

    fn app_with_store(store: Arc<dyn JournalStore>) -> Router {
        build_app(store, Arc::new(NoImageLookup))
    }

    fn app() -> Router {
        app_with_store(Arc::new(MemoryJournalStore::new()))
    }

    fn token(sub: &str) -> String {
        sign_test_token(sub, &Config::for_tests().jwt_secret, 300)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app();
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _) = send(&app, "GET", "/readyz", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = app();
        let (status, body) = send(&app, "GET", "/api/analytics", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 401);

        let (status, _) = send(&app, "GET", "/api/entries", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_analytics_before_provisioning_is_tagged_failure() {
        let app = app();
        let t = token("user_new");
        let (status, body) = send(&app, "GET", "/api/analytics", Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": false, "error": "User not found"}));
    }

    #[tokio::test]
    async fn test_journal_flow() {
        let app = app();
        let t = token("user_1");

        let (status, me) = send(&app, "GET", "/api/me", Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["name"], "Test Writer");

        let (status, collection) = send(
            &app,
            "POST",
            "/api/collections",
            Some(&t),
            Some(json!({"name": "Travel", "description": "Trips"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let collection_id = collection["id"].as_str().unwrap().to_string();

        let (status, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({
                "title": "Lisbon",
                "content": "Sunny all day",
                "mood": "HAPPY",
                "collection_id": collection_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entry["mood"], "happy");
        assert_eq!(entry["mood_score"], 8);

        send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({"title": "Home", "content": "Quiet", "mood": "neutral"})),
        )
        .await;

        let uri = format!("/api/entries?collection_id={}", collection_id);
        let (status, listed) = send(&app, "GET", &uri, Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["success"], true);
        let entries = listed["data"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["collection"]["name"], "Travel");
        assert_eq!(entries[0]["mood_data"]["label"], "Happy");

        let (_, loose) = send(
            &app,
            "GET",
            "/api/entries?collection_id=unorganized",
            Some(&t),
            None,
        )
        .await;
        assert_eq!(loose["data"]["entries"].as_array().unwrap().len(), 1);

        let (status, analytics) =
            send(&app, "GET", "/api/analytics?period=7d", Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(analytics["success"], true);
        let stats = &analytics["data"]["stats"];
        assert_eq!(stats["total_entries"], 2);
        assert_eq!(stats["average_score"], 6.5);
        assert_eq!(stats["most_frequent_mood"], "happy");
        assert_eq!(stats["daily_average"], 0.3);
        assert_eq!(analytics["data"]["entries"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_mood_rejected() {
        let app = app();
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({"title": "x", "content": "y", "mood": "meh"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "Invalid mood");
    }

    #[tokio::test]
    async fn test_entries_are_private() {
        let app = app();
        let alice = token("alice");
        let bob = token("bob");
        send(&app, "GET", "/api/me", Some(&alice), None).await;
        send(&app, "GET", "/api/me", Some(&bob), None).await;

        let (_, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&alice),
            Some(json!({"title": "Secret", "content": "Only mine", "mood": "sad"})),
        )
        .await;
        let uri = format!("/api/entries/{}", entry["id"].as_str().unwrap());

        let (status, body) = send(&app, "GET", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Entry not found");

        let (status, _) = send(&app, "DELETE", &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, analytics) = send(&app, "GET", "/api/analytics", Some(&bob), None).await;
        assert_eq!(analytics["data"]["stats"]["total_entries"], 0);

        let (status, _) = send(&app, "GET", &uri, Some(&alice), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_update_entry_changes_mood_score() {
        let app = app();
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let (_, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({"title": "Day", "content": "Long", "mood": "tired"})),
        )
        .await;
        let uri = format!("/api/entries/{}", entry["id"].as_str().unwrap());

        let (status, updated) = send(
            &app,
            "PUT",
            &uri,
            Some(&t),
            Some(json!({"title": "Day", "content": "Better now", "mood": "grateful"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["mood"], "grateful");
        assert_eq!(updated["mood_score"], 9);
        assert_eq!(updated["content"], "Better now");
    }

    #[tokio::test]
    async fn test_draft_is_cleared_by_new_entry() {
        let app = app();
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let (_, empty) = send(&app, "GET", "/api/drafts", Some(&t), None).await;
        assert_eq!(empty, json!({"success": true, "data": null}));

        let (_, saved) = send(
            &app,
            "PUT",
            "/api/drafts",
            Some(&t),
            Some(json!({"title": "Half", "content": "a thought"})),
        )
        .await;
        assert_eq!(saved["success"], true);
        assert_eq!(saved["data"]["title"], "Half");

        send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({"title": "Whole", "content": "a thought", "mood": "content"})),
        )
        .await;

        let (_, after) = send(&app, "GET", "/api/drafts", Some(&t), None).await;
        assert_eq!(after["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_collection_delete_and_not_found() {
        let app = app();
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let (_, collection) = send(
            &app,
            "POST",
            "/api/collections",
            Some(&t),
            Some(json!({"name": "Dreams"})),
        )
        .await;
        let uri = format!("/api/collections/{}", collection["id"].as_str().unwrap());

        let (status, body) = send(&app, "DELETE", &uri, Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        let (status, body) = send(&app, "DELETE", &uri, Some(&t), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Collection not found");
    }

    #[tokio::test]
    async fn test_create_collection_is_rate_limited() {
        let app = app();
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let limit = Config::for_tests().rate_limit_max_requests;
        for i in 0..limit {
            let (status, _) = send(
                &app,
                "POST",
                "/api/collections",
                Some(&t),
                Some(json!({"name": format!("c{}", i)})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            "POST",
            "/api/collections",
            Some(&t),
            Some(json!({"name": "one too many"})),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            body["error"]["message"],
            "Too many requests. Please try again later."
        );

        // Reads are not limited
        let (status, _) = send(&app, "GET", "/api/collections", Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_in_band() {
        let app = app_with_store(Arc::new(FailingStore::default()));
        let t = token("user_1");

        let (status, body) = send(&app, "GET", "/api/entries", Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], sqlx::Error::PoolTimedOut.to_string());

        let (status, body) = send(&app, "GET", "/api/me", Some(&t), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);

        let (status, body) = send(&app, "GET", "/api/collections", Some(&t), None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal server error");

        let (status, _) = send(&app, "GET", "/readyz", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_collection_id_lists_nothing() {
        let app = app();
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        for title in ["One", "Two"] {
            send(
                &app,
                "POST",
                "/api/entries",
                Some(&t),
                Some(json!({"title": title, "content": "text", "mood": "peaceful"})),
            )
            .await;
        }

        let (_, all) = send(&app, "GET", "/api/entries", Some(&t), None).await;
        assert_eq!(all["data"]["entries"].as_array().unwrap().len(), 2);

        let (status, body) = send(
            &app,
            "GET",
            "/api/entries?collection_id=not-a-real-collection",
            Some(&t),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "data": {"entries": []}}));

        let uri = format!("/api/entries?collection_id={}", uuid::Uuid::new_v4());
        let (_, body) = send(&app, "GET", &uri, Some(&t), None).await;
        assert_eq!(body["data"]["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_mood_image_follows_mood_changes() {
        let images = Arc::new(RecordingLookup::default());
        let app = build_app(Arc::new(MemoryJournalStore::new()), images.clone());
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let happy = crate::models::mood::mood_by_id("happy").unwrap();
        let (status, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({"title": "Beach", "content": "Waves", "mood": "happy"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let original_url = entry["mood_image_url"].as_str().unwrap().to_string();
        assert_eq!(images.queries(), vec![happy.image_query.to_string()]);

        let uri = format!("/api/entries/{}", entry["id"].as_str().unwrap());

        // Same mood: the stored illustration is kept even with a new phrase
        let (status, updated) = send(
            &app,
            "PUT",
            &uri,
            Some(&t),
            Some(json!({
                "title": "Beach",
                "content": "Waves, later",
                "mood": "happy",
                "mood_query": "ocean sunset",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["mood_image_url"], original_url.as_str());
        assert_eq!(images.queries().len(), 1);

        // New mood: the client phrase wins over the mood's default query
        let (status, updated) = send(
            &app,
            "PUT",
            &uri,
            Some(&t),
            Some(json!({
                "title": "Beach",
                "content": "Storm rolled in",
                "mood": "anxious",
                "mood_query": "dark clouds",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["mood_image_url"], "https://img.example/dark+clouds");
        assert_eq!(images.queries().last().map(String::as_str), Some("dark clouds"));

        // New mood without a phrase falls back to the catalog query
        let sad = crate::models::mood::mood_by_id("sad").unwrap();
        send(
            &app,
            "PUT",
            &uri,
            Some(&t),
            Some(json!({"title": "Beach", "content": "Gone", "mood": "sad"})),
        )
        .await;
        assert_eq!(images.queries().last().map(String::as_str), Some(sad.image_query));
        assert_eq!(images.queries().len(), 3);
    }

    #[tokio::test]
    async fn test_create_entry_uses_client_image_phrase() {
        let images = Arc::new(RecordingLookup::default());
        let app = build_app(Arc::new(MemoryJournalStore::new()), images.clone());
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let (_, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({
                "title": "Hike",
                "content": "Summit",
                "mood": "excited",
                "mood_query": "mountain peak",
            })),
        )
        .await;
        assert_eq!(images.queries(), vec!["mountain peak".to_string()]);
        assert_eq!(entry["mood_image_url"], "https://img.example/mountain+peak");
    }

    #[tokio::test]
    async fn test_entry_cannot_be_filed_in_another_users_collection() {
        let app = app();
        let alice = token("alice");
        let bob = token("bob");
        send(&app, "GET", "/api/me", Some(&alice), None).await;
        send(&app, "GET", "/api/me", Some(&bob), None).await;

        let (_, collection) = send(
            &app,
            "POST",
            "/api/collections",
            Some(&alice),
            Some(json!({"name": "Alice only"})),
        )
        .await;
        let collection_id = collection["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&bob),
            Some(json!({
                "title": "Intruder",
                "content": "x",
                "mood": "angry",
                "collection_id": collection_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Collection not found");

        let (_, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&bob),
            Some(json!({"title": "Mine", "content": "x", "mood": "angry"})),
        )
        .await;
        let uri = format!("/api/entries/{}", entry["id"].as_str().unwrap());

        let (status, body) = send(
            &app,
            "PUT",
            &uri,
            Some(&bob),
            Some(json!({
                "title": "Mine",
                "content": "x",
                "mood": "angry",
                "collection_id": collection_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "Collection not found");

        let uri = format!("/api/entries?collection_id={}", collection_id);
        let (_, listed) = send(&app, "GET", &uri, Some(&alice), None).await;
        assert_eq!(listed["data"]["entries"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_entry_is_returned_when_draft_cleanup_fails() {
        let app = app_with_store(Arc::new(StuckDraftStore::default()));
        let t = token("user_1");
        send(&app, "GET", "/api/me", Some(&t), None).await;

        let (status, entry) = send(
            &app,
            "POST",
            "/api/entries",
            Some(&t),
            Some(json!({"title": "Kept", "content": "saved", "mood": "hopeful"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entry["title"], "Kept");

        let (_, listed) = send(&app, "GET", "/api/entries", Some(&t), None).await;
        assert_eq!(listed["data"]["entries"].as_array().unwrap().len(), 1);
    }
}
