//! HTTP document fetcher

use super::extract::{title, truncate_bytes, visible_text, normalize};
use super::splitter::split_text;
use super::{Document, DocumentFetcher, FetchError};
use crate::config::DocumentSettings;
use crate::network::{HttpClient, HttpRequest};
use async_trait::async_trait;
use futures::future::join_all;
use scraper::Html;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Fetches pages over HTTP and returns their visible text in chunks
pub struct HttpDocumentFetcher {
    client: HttpClient,
    settings: DocumentSettings,
}

impl HttpDocumentFetcher {
    pub fn new(client: HttpClient, settings: DocumentSettings) -> Self {
        Self { client, settings }
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<Document>, FetchError> {
        let request = HttpRequest::get(url)
            .page()
            .timeout(self.settings.timeout());

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                message: format!("{:#}", e),
            })?;

        if !response.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        let content_type = response.content_type().unwrap_or_else(|| "text/html".to_string());
        let body = truncate_bytes(&response.text, self.settings.max_content_bytes);

        let (page_title, text) = match content_type.as_str() {
            "text/html" | "application/xhtml+xml" => {
                let document = Html::parse_document(body);
                (title(&document), visible_text(&document))
            }
            "text/plain" | "text/markdown" => (None, normalize(body)),
            other => {
                return Err(FetchError::Unsupported {
                    url: url.to_string(),
                    content_type: other.to_string(),
                })
            }
        };

        let page_title = page_title.unwrap_or_default();
        Ok(split_text(&text, self.settings.chunk_size)
            .into_iter()
            .map(|chunk| Document {
                url: url.to_string(),
                title: page_title.clone(),
                content: chunk,
            })
            .collect())
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, urls: &[String]) -> Result<Vec<Document>, FetchError> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = urls.iter().filter(|u| seen.insert(u.as_str())).collect();

        let outcomes = join_all(unique.iter().map(|url| self.fetch_one(url))).await;

        let mut documents = Vec::new();
        let mut failures = 0usize;
        for outcome in outcomes {
            match outcome {
                Ok(docs) => documents.extend(docs),
                Err(e) => {
                    failures += 1;
                    debug!("Skipping document: {}", e);
                }
            }
        }

        if failures > 0 {
            warn!("Failed to fetch {} of {} documents", failures, unique.len());
        }

        Ok(documents)
    }
}
