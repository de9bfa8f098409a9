//! HTTP client shared by the aggregator, document fetcher and LLM clients

use super::request::{HttpMethod, HttpRequest, HttpResponse, RequestKind};
use super::user_agent::{accept_html, accept_json, accept_language, generate_user_agent};
use crate::config::OutgoingSettings;
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP client wrapper with gateway-specific defaults
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    default_timeout: Duration,
    user_agent: String,
    extra_headers: HashMap<String, String>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(&OutgoingSettings::default())
    }

    /// Create a new HTTP client with custom settings
    pub fn with_settings(settings: &OutgoingSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(settings.timeout())
            .pool_max_idle_per_host(settings.pool_maxsize)
            .gzip(true)
            .brotli(true);

        if !settings.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ref proxy_url) = settings.proxies.all {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        } else {
            if let Some(ref http) = settings.proxies.http {
                builder = builder.proxy(reqwest::Proxy::http(http)?);
            }
            if let Some(ref https) = settings.proxies.https {
                builder = builder.proxy(reqwest::Proxy::https(https)?);
            }
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            default_timeout: settings.timeout(),
            user_agent: generate_user_agent(),
            extra_headers: settings.extra_headers.clone(),
        })
    }

    /// Execute a request. Non-2xx statuses are returned, not turned into errors.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut req_builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        req_builder = req_builder
            .timeout(request.timeout.unwrap_or(self.default_timeout))
            .headers(self.headers_for(&request)?);

        if !request.params.is_empty() {
            req_builder = req_builder.query(&request.params);
        }

        if let Some(ref json) = request.body {
            req_builder = req_builder.json(json);
        }

        let response = req_builder.send().await?;

        Self::parse_response(response).await
    }

    /// Default headers for the request kind, then configured extras, then
    /// the request's own headers. Later entries replace earlier ones.
    fn headers_for(&self, request: &HttpRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let defaults: &[(&str, &str)] = match request.kind {
            RequestKind::Api => &[("Accept", accept_json())],
            RequestKind::Page => &[
                ("Accept", accept_html()),
                ("DNT", "1"),
                ("Upgrade-Insecure-Requests", "1"),
            ],
        };
        for (key, value) in defaults {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_str(&self.user_agent)?,
        );
        if request.kind == RequestKind::Page {
            headers.insert(
                reqwest::header::ACCEPT_LANGUAGE,
                HeaderValue::from_str(&accept_language("en"))?,
            );
        }

        for (key, value) in self.extra_headers.iter().chain(request.headers.iter()) {
            headers.insert(
                HeaderName::from_bytes(key.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        Ok(headers)
    }

    /// Parse response into HttpResponse
    async fn parse_response(response: Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let url = response.url().to_string();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.as_str().to_string(), v.to_string());
            }
        }

        let text = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            text,
            url,
        })
    }

}
