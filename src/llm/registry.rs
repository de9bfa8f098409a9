//! Provider registry for LLM models

use super::openai::OpenAiCompatibleModel;
use super::traits::*;
use crate::config::{LlmSettings, ProviderConfig};
use crate::network::HttpClient;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Registry of configured OpenAI-compatible providers
pub struct ProviderRegistry {
    client: HttpClient,
    /// Providers by id
    providers: HashMap<String, ProviderConfig>,
    timeout: Duration,
}

impl ProviderRegistry {
    /// Create a registry from settings
    pub fn new(client: HttpClient, settings: &LlmSettings) -> Self {
        let providers = settings
            .providers
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();

        Self {
            client,
            providers,
            timeout: settings.timeout(),
        }
    }

    /// Get all provider ids
    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    /// Get number of configured providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

#[async_trait]
impl ModelLoader for ProviderRegistry {
    async fn load(&self, provider: &str, model: &str) -> Result<Box<dyn ChatModel>, LlmError> {
        let config = self
            .providers
            .get(provider)
            .ok_or_else(|| LlmError::UnknownProvider(provider.to_string()))?;

        let api_key = config.resolve_api_key();
        if config.requires_key && api_key.is_none() {
            return Err(LlmError::MissingApiKey(provider.to_string()));
        }

        debug!("Loaded model {}/{}", provider, model);
        Ok(Box::new(OpenAiCompatibleModel::new(
            self.client.clone(),
            provider,
            model,
            &config.base_url,
            api_key,
            self.timeout,
        )))
    }
}
