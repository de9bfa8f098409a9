//! SearXNG JSON API client

use super::traits::*;
use crate::config::SearxngSettings;
use crate::network::{HttpClient, HttpRequest};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Client for a SearXNG instance with the JSON output format enabled
pub struct SearxngClient {
    client: HttpClient,
    base_url: String,
    timeout: Duration,
}

impl SearxngClient {
    pub fn new(client: HttpClient, settings: &SearxngSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: settings.timeout(),
        }
    }

    fn build_request(&self, query: &str, options: &AggregatorOptions) -> HttpRequest {
        let mut request = HttpRequest::get(format!("{}/search", self.base_url))
            .param("q", query)
            .param("format", "json")
            .param("pageno", "1")
            .param("language", options.language.as_str())
            .param("safesearch", options.safesearch.as_str())
            .timeout(self.timeout);

        if !options.engines.is_empty() {
            request = request.param("engines", options.engines.join(","));
        }
        if !options.categories.is_empty() {
            request = request.param("categories", options.categories.join(","));
        }
        if let Some(range) = options.time_range {
            request = request.param("time_range", range.as_str());
        }

        request
    }
}

#[async_trait]
impl SearchAggregator for SearxngClient {
    fn name(&self) -> &str {
        "searxng"
    }

    async fn search(
        &self,
        query: &str,
        options: &AggregatorOptions,
    ) -> Result<AggregatorResponse, AggregatorError> {
        let request = self.build_request(query, options);

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| AggregatorError::Request(format!("{:#}", e)))?;

        if !response.is_success() {
            return Err(AggregatorError::Status {
                status: response.status,
                body: response.excerpt(),
            });
        }

        let parsed: AggregatorResponse = response.json()?;
        debug!(
            "SearXNG returned {} results for '{}'",
            parsed.results.len(),
            query
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::TimeRange;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SearxngClient {
        let settings = SearxngSettings {
            base_url: format!("{}/", server.uri()),
            request_timeout: 5.0,
        };
        SearxngClient::new(HttpClient::new().unwrap(), &settings)
    }

    fn options() -> AggregatorOptions {
        AggregatorOptions {
            language: "en".to_string(),
            engines: vec!["google".to_string(), "bing".to_string()],
            time_range: Some(TimeRange::Week),
            safesearch: "2".to_string(),
            categories: vec!["general".to_string()],
        }
    }

    #[tokio::test]
    async fn test_search_sends_options() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "query": "rust",
            "results": [
                {"title": "Rust", "url": "https://www.rust-lang.org/", "content": "lang", "score": 2.0},
                {"title": "Docs", "url": "https://docs.rs/", "content": "crates"}
            ],
            "suggestions": ["rust book"]
        });
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust after:2024-01-01"))
            .and(query_param("format", "json"))
            .and(query_param("language", "en"))
            .and(query_param("engines", "google,bing"))
            .and(query_param("categories", "general"))
            .and(query_param("safesearch", "2"))
            .and(query_param("time_range", "week"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .search("rust after:2024-01-01", &options())
            .await
            .unwrap();

        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].score, Some(2.0));
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search("rust", &options())
            .await
            .unwrap_err();
        match err {
            AggregatorError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "Too Many Requests");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_search_html_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>format disabled</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search("rust", &options())
            .await
            .unwrap_err();
        assert!(matches!(err, AggregatorError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_instance() {
        let settings = SearxngSettings {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout: 2.0,
        };
        let client = SearxngClient::new(HttpClient::new().unwrap(), &settings);
        let err = client.search("rust", &options()).await.unwrap_err();
        assert!(matches!(err, AggregatorError::Request(_)));
    }
}
