//! Settings structures for the search gateway

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_GATEWAY_TIMEOUT: f64 = 60.0;
const DEFAULT_SEARXNG_TIMEOUT: f64 = 30.0;
const DEFAULT_OUTGOING_TIMEOUT: f64 = 30.0;
const DEFAULT_DOCUMENT_TIMEOUT: f64 = 15.0;
const DEFAULT_LLM_TIMEOUT: f64 = 120.0;

/// Convert configured seconds to a `Duration`.
///
/// Negative, NaN and out-of-range values use `fallback` instead.
pub fn seconds(value: f64, fallback: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or_else(|_| Duration::from_secs_f64(fallback))
}

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub gateway: GatewaySettings,
    pub searxng: SearxngSettings,
    pub outgoing: OutgoingSettings,
    pub documents: DocumentSettings,
    pub llm: LlmSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparsable numeric values are ignored and the current value is kept.
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GATEWAY_DEBUG") {
            self.general.debug = val.parse().unwrap_or(false);
        }
        if let Some(val) = lookup("GATEWAY_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = lookup("GATEWAY_BIND_ADDRESS") {
            self.server.bind_address = val;
        }
        if let Some(val) = lookup("GATEWAY_API_KEY") {
            if !val.is_empty() {
                self.server.api_key = Some(val);
            }
        }
        if let Some(val) = lookup("SEARXNG_API_URL") {
            self.searxng.base_url = val;
        }
        if let Some(val) = lookup("GATEWAY_MAX_RESULTS") {
            if let Ok(max) = val.parse() {
                self.gateway.max_results = max;
            }
        }
        if let Some(val) = lookup("GATEWAY_DEFAULT_LANGUAGE") {
            self.gateway.default_language = val;
        }
        if let Some(val) = lookup("GATEWAY_ANSWER_CONTEXT") {
            if let Ok(size) = val.parse() {
                self.gateway.answer_context_size = size;
            }
        }
        if let Some(val) = lookup("GATEWAY_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.gateway.timeout = timeout;
            }
        }
    }
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Enable debug logging
    pub debug: bool,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Server port
    pub port: u16,
    /// Bind address
    pub bind_address: String,
    /// API key required from callers; `None` disables the check
    pub api_key: Option<String>,
    /// Allow cross-origin requests
    pub cors: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_address: "127.0.0.1".to_string(),
            api_key: None,
            cors: true,
        }
    }
}

/// Defaults applied to every search request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Hard ceiling on the number of results returned
    pub max_results: usize,
    /// Result count when the request does not specify one
    pub default_results: usize,
    pub default_language: String,
    /// `basic` or `advanced`
    pub default_search_depth: String,
    /// Number of results fed to the LLM as answer context
    pub answer_context_size: usize,
    pub default_engines: Vec<String>,
    pub default_categories: Vec<String>,
    /// Safe search level: 0 = off, 1 = moderate, 2 = strict
    pub default_safesearch: u8,
    /// Raw content fetch timeout in seconds
    pub timeout: f64,
    /// Upper bound for a per-request timeout
    pub max_timeout: f64,
    /// Maximum number of image URLs in a response
    pub max_images: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            max_results: 50,
            default_results: 10,
            default_language: "en".to_string(),
            default_search_depth: "basic".to_string(),
            answer_context_size: 5,
            default_engines: vec![
                "google".to_string(),
                "bing".to_string(),
                "duckduckgo".to_string(),
            ],
            default_categories: vec!["general".to_string()],
            default_safesearch: 2,
            timeout: DEFAULT_GATEWAY_TIMEOUT,
            max_timeout: 120.0,
            max_images: 10,
        }
    }
}

/// Upstream SearXNG instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearxngSettings {
    /// Base URL, without the `/search` path
    pub base_url: String,
    /// Request timeout in seconds
    pub request_timeout: f64,
}

impl Default for SearxngSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout: DEFAULT_SEARXNG_TIMEOUT,
        }
    }
}

impl SearxngSettings {
    pub fn timeout(&self) -> Duration {
        seconds(self.request_timeout, DEFAULT_SEARXNG_TIMEOUT)
    }
}

/// Outgoing request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutgoingSettings {
    /// Default request timeout in seconds
    pub request_timeout: f64,
    /// Pool max idle connections per host
    pub pool_maxsize: usize,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send on every request
    pub extra_headers: HashMap<String, String>,
}

impl Default for OutgoingSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_OUTGOING_TIMEOUT,
            pool_maxsize: 20,
            verify_ssl: true,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

impl OutgoingSettings {
    pub fn timeout(&self) -> Duration {
        seconds(self.request_timeout, DEFAULT_OUTGOING_TIMEOUT)
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Full-page document fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Pages larger than this are truncated before extraction
    pub max_content_bytes: usize,
    /// Per-page timeout in seconds
    pub request_timeout: f64,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            max_content_bytes: 2 * 1024 * 1024,
            request_timeout: DEFAULT_DOCUMENT_TIMEOUT,
        }
    }
}

impl DocumentSettings {
    pub fn timeout(&self) -> Duration {
        seconds(self.request_timeout, DEFAULT_DOCUMENT_TIMEOUT)
    }
}

/// LLM providers available for answer synthesis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub providers: Vec<ProviderConfig>,
    /// Per-call timeout in seconds
    pub request_timeout: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            request_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }
}

impl LlmSettings {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        seconds(self.request_timeout, DEFAULT_LLM_TIMEOUT)
    }
}

/// An OpenAI-compatible completion provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Identifier used in `llm_provider`
    pub id: String,
    /// Base URL of the OpenAI-compatible API, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Inline API key
    pub api_key: Option<String>,
    /// Environment variable to read the API key from
    pub api_key_env: Option<String>,
    /// Whether the provider refuses requests without a key
    pub requires_key: bool,
}

impl ProviderConfig {
    /// Resolve the API key, preferring the inline value
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|k| !k.is_empty())
            })
    }
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            id: "openai".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: Some("OPENAI_API_KEY".to_string()),
            requires_key: true,
            ..Default::default()
        },
        ProviderConfig {
            id: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: Some("GROQ_API_KEY".to_string()),
            requires_key: true,
            ..Default::default()
        },
        ProviderConfig {
            id: "openrouter".to_string(),
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: Some("OPENROUTER_API_KEY".to_string()),
            requires_key: true,
            ..Default::default()
        },
        ProviderConfig {
            id: "ollama".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            requires_key: false,
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.gateway.max_results, 50);
        assert_eq!(settings.gateway.default_results, 10);
        assert_eq!(settings.gateway.default_engines.len(), 3);
        assert!(settings.llm.providers.iter().any(|p| p.id == "ollama"));
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = r#"
gateway:
  max_results: 20
  default_language: de
searxng:
  base_url: http://searx.internal:8888
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.gateway.max_results, 20);
        assert_eq!(settings.gateway.default_language, "de");
        assert_eq!(settings.gateway.default_results, 10);
        assert_eq!(settings.searxng.base_url, "http://searx.internal:8888");
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_merge_overrides() {
        let mut settings = Settings::default();
        let env: HashMap<&str, &str> = [
            ("GATEWAY_MAX_RESULTS", "25"),
            ("GATEWAY_DEFAULT_LANGUAGE", "fr"),
            ("GATEWAY_ANSWER_CONTEXT", "3"),
            ("GATEWAY_TIMEOUT", "not-a-number"),
            ("SEARXNG_API_URL", "http://127.0.0.1:9000"),
            ("GATEWAY_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        settings.merge_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.gateway.max_results, 25);
        assert_eq!(settings.gateway.default_language, "fr");
        assert_eq!(settings.gateway.answer_context_size, 3);
        assert_eq!(settings.gateway.timeout, 60.0);
        assert_eq!(settings.searxng.base_url, "http://127.0.0.1:9000");
        assert_eq!(settings.server.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_invalid_timeouts_fall_back() {
        let yaml = r#"
searxng:
  request_timeout: -1
outgoing:
  request_timeout: .nan
documents:
  request_timeout: 1.0e300
llm:
  request_timeout: 0.5
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.searxng.timeout(), Duration::from_secs(30));
        assert_eq!(settings.outgoing.timeout(), Duration::from_secs(30));
        assert_eq!(settings.documents.timeout(), Duration::from_secs(15));
        assert_eq!(settings.llm.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_provider_inline_key_wins() {
        let provider = ProviderConfig {
            id: "custom".to_string(),
            api_key: Some("inline".to_string()),
            api_key_env: Some("SEARCH_GATEWAY_TEST_UNSET_KEY".to_string()),
            ..Default::default()
        };
        assert_eq!(provider.resolve_api_key().as_deref(), Some("inline"));
    }
}
