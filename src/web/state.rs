//! Application state shared across handlers

use crate::aggregator::SearxngClient;
use crate::config::Settings;
use crate::documents::HttpDocumentFetcher;
use crate::error::GatewayError;
use crate::llm::ProviderRegistry;
use crate::network::HttpClient;
use crate::search::Gateway;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Search gateway
    pub gateway: Arc<Gateway>,
}

impl AppState {
    /// Create application state backed by SearXNG, HTTP page fetching and
    /// the configured LLM providers
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;

        let aggregator = SearxngClient::new(client.clone(), &settings.searxng);
        let fetcher = HttpDocumentFetcher::new(client.clone(), settings.documents.clone());
        let models = ProviderRegistry::new(client, &settings.llm);
        info!(
            "Using SearXNG at {} with {} LLM providers ({})",
            settings.searxng.base_url,
            models.len(),
            models.names().join(", ")
        );

        let gateway = Gateway::new(
            settings.gateway.clone(),
            Arc::new(aggregator),
            Arc::new(fetcher),
            Arc::new(models),
        );

        Ok(Self::from_parts(settings, gateway))
    }

    /// Create application state around an existing gateway
    pub fn from_parts(settings: Settings, gateway: Gateway) -> Self {
        Self {
            settings: Arc::new(settings),
            gateway: Arc::new(gateway),
        }
    }

    /// Check the caller's API key against `server.api_key`.
    ///
    /// The key may come from the request itself or a bearer token. Always
    /// succeeds when no key is configured.
    pub fn authorize(&self, headers: &HeaderMap, supplied: Option<&str>) -> Result<(), GatewayError> {
        let Some(expected) = self.settings.server.api_key.as_deref() else {
            return Ok(());
        };

        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        if supplied == Some(expected) || bearer == Some(expected) {
            Ok(())
        } else {
            Err(GatewayError::Unauthorized)
        }
    }
}
