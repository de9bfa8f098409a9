//! Route definitions

use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route(
            "/search",
            get(handlers::search_get).post(handlers::search_post),
        )
        .route("/health", get(handlers::health))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    if state.settings.server.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::documents::Document;
    use crate::results::SearchResult;
    use crate::search::testing::{FakeAggregator, FakeFetcher, FakeModels};
    use crate::search::Gateway;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn results() -> Vec<SearchResult> {
        vec![
            SearchResult::new("https://docs.rs/tokio", "tokio").with_content("Async runtime"),
            SearchResult::new("https://example.com/spam", "spam"),
            SearchResult::new("https://tokio.rs", "Tokio").with_score(3.5),
        ]
    }

    fn app_with(settings: Settings, aggregator: Arc<FakeAggregator>) -> Router {
        let gateway = Gateway::new(
            settings.gateway.clone(),
            aggregator,
            Arc::new(FakeFetcher::with_documents(vec![Document::new(
                "https://docs.rs/tokio",
                "full page",
            )])),
            Arc::new(FakeModels::replying(Vec::new())),
        );
        create_router(AppState::from_parts(settings, gateway))
    }

    fn app(aggregator: Arc<FakeAggregator>) -> Router {
        app_with(Settings::default(), aggregator)
    }

    fn keyed_app() -> Router {
        let mut settings = Settings::default();
        settings.server.api_key = Some("secret".to_string());
        app_with(settings, Arc::new(FakeAggregator::with_results(results())))
    }

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_post_missing_query() {
        let aggregator = Arc::new(FakeAggregator::with_results(results()));
        let (status, body) = send(app(aggregator.clone()), post(r#"{"max_results": 3}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameter: query");
        assert_eq!(body["message"], "The query parameter is required");
        assert!(aggregator.calls().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_query() {
        let aggregator = Arc::new(FakeAggregator::with_results(results()));
        let (status, body) = send(app(aggregator), get("/search?max_results=3")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameter: query");
    }

    #[tokio::test]
    async fn test_post_malformed_body() {
        let aggregator = Arc::new(FakeAggregator::with_results(results()));
        let (status, body) = send(app(aggregator), post(r#"{"query": "#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_post_search() {
        let aggregator = Arc::new(FakeAggregator::with_results(results()));
        let request = json!({
            "query": "tokio",
            "exclude_domains": ["example.com"],
            "include_raw_content": true,
            "language": "de"
        });
        let (status, body) = send(app(aggregator.clone()), post(&request.to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], "tokio");
        let results = body["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["raw_content"], "full page");
        assert_eq!(results[1]["score"], 3.5);
        assert_eq!(results[1]["content"], "Tokio");
        assert!(results[1].get("raw_content").is_none());
        assert!(body.get("answer").is_none());
        assert_eq!(body["metadata"]["language"], "de");
        assert!(body["response_time"].is_number());

        assert_eq!(aggregator.calls()[0].1.language, "de");
    }

    #[tokio::test]
    async fn test_get_search() {
        let aggregator = Arc::new(FakeAggregator::with_results(results()));
        let uri = "/search?query=tokio&include_domains=docs.rs,tokio.rs&engines=brave,%20qwant\
                   &max_results=abc&time_range=month&include_images=true";
        let (status, body) = send(app(aggregator.clone()), get(uri)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"].as_array().unwrap().len(), 3);
        assert_eq!(body["images"], json!([]));
        assert_eq!(body["metadata"]["time_range"], "month");
        assert_eq!(body["metadata"]["engines_used"], json!(["brave", "qwant"]));

        let (query, options) = aggregator.calls().remove(0);
        assert_eq!(query, "tokio (site:docs.rs OR site:tokio.rs)");
        assert_eq!(options.engines, vec!["brave", "qwant"]);
    }

    #[tokio::test]
    async fn test_get_invalid_depth() {
        let aggregator = Arc::new(FakeAggregator::with_results(results()));
        let (status, body) = send(app(aggregator), get("/search?query=a&search_depth=deep")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid request");
    }

    #[tokio::test]
    async fn test_aggregator_failure() {
        let aggregator = Arc::new(FakeAggregator::failing());
        let (status, body) = send(app(aggregator), post(r#"{"query": "tokio"}"#)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
        assert!(body["response_time"].is_number());
    }

    #[tokio::test]
    async fn test_api_key_required() {
        let (status, body) = send(keyed_app(), post(r#"{"query": "tokio"}"#)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _) = send(
            keyed_app(),
            post(r#"{"query": "tokio", "api_key": "wrong"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_query_checked_before_api_key() {
        let (status, body) = send(keyed_app(), get("/search?max_results=3")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameter: query");

        let (status, body) = send(keyed_app(), post(r#"{"query": "  "}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameter: query");
    }

    #[tokio::test]
    async fn test_api_key_accepted() {
        let (status, _) = send(
            keyed_app(),
            post(r#"{"query": "tokio", "api_key": "secret"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .uri("/search?query=tokio")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(keyed_app(), request).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health() {
        let aggregator = Arc::new(FakeAggregator::with_results(Vec::new()));
        let (status, body) = send(app(aggregator), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], crate::VERSION);
    }
}
