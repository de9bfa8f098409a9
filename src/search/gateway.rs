//! Search request orchestration

use super::answer::{synthesize, Synthesis};
use super::models::*;
use crate::aggregator::{AggregatorOptions, SearchAggregator};
use crate::config::GatewaySettings;
use crate::documents::{merge_by_url, DocumentFetcher};
use crate::error::{GatewayError, TimedError};
use crate::llm::ModelLoader;
use crate::query::{augment_query, describe, resolve_time_constraint};
use crate::results::{collect_images, exclude_domains, shape, ShapedResult};
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

/// Translates search requests into aggregator, fetcher and LLM calls
pub struct Gateway {
    settings: GatewaySettings,
    aggregator: Arc<dyn SearchAggregator>,
    fetcher: Arc<dyn DocumentFetcher>,
    models: Arc<dyn ModelLoader>,
}

impl Gateway {
    pub fn new(
        settings: GatewaySettings,
        aggregator: Arc<dyn SearchAggregator>,
        fetcher: Arc<dyn DocumentFetcher>,
        models: Arc<dyn ModelLoader>,
    ) -> Self {
        Self {
            settings,
            aggregator,
            fetcher,
            models,
        }
    }

    /// Run a search request
    pub async fn handle(&self, request: SearchRequest) -> Result<SearchResponse, TimedError> {
        self.handle_on(request, Utc::now().date_naive()).await
    }

    /// Run a search request with relative dates computed from `today`
    pub async fn handle_on(
        &self,
        request: SearchRequest,
        today: NaiveDate,
    ) -> Result<SearchResponse, TimedError> {
        let span = info_span!("search", request_id = %Uuid::new_v4());
        async move {
            let started = Instant::now();
            let request = request
                .resolve(&self.settings)
                .map_err(TimedError::from)?;
            self.execute(request, today, started).await
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        request: ResolvedRequest,
        today: NaiveDate,
        started: Instant,
    ) -> Result<SearchResponse, TimedError> {
        info!(
            query = %request.query,
            max_results = request.max_results,
            depth = ?request.search_depth,
            language = %request.language,
            "Search request"
        );

        // Time window and site filters go into the query text
        let constraint = resolve_time_constraint(&request.time_filter, today);
        let query_text = augment_query(&request.query, constraint.as_ref(), &request.include_domains);

        let options = AggregatorOptions {
            language: request.language.clone(),
            engines: request.engines.clone(),
            time_range: constraint.as_ref().and_then(|c| c.aggregator_time_range()),
            safesearch: request.safesearch.as_param(),
            categories: request.categories.clone(),
        };

        // Aggregator failure fails the whole request
        debug!(aggregator = self.aggregator.name(), query = %query_text, "Querying aggregator");
        let response = self
            .aggregator
            .search(&query_text, &options)
            .await
            .map_err(|e| GatewayError::from(e).with_elapsed(elapsed(started)))?;

        // Exclusions apply before truncation
        let mut results = exclude_domains(response.results, &request.exclude_domains);
        results.truncate(request.max_results);

        // Enrichment and answer generation degrade to nothing on failure
        let raw_content = if request.include_raw_content && !results.is_empty() {
            let urls = results.iter().map(|r| r.url.clone()).collect();
            self.fetch_raw_content(urls, request.timeout).await
        } else {
            HashMap::new()
        };

        let results = shape(results, &raw_content, request.include_raw_content);

        let (answer, follow_up_questions, llm_used) = match self.answer(&request, &results).await {
            Some(synthesis) => (
                Some(synthesis.answer),
                synthesis.follow_up_questions,
                Some(synthesis.llm_used),
            ),
            None => (None, None, None),
        };

        let images = request
            .include_images
            .then(|| collect_images(&results, self.settings.max_images));

        info!(
            results = results.len(),
            answered = answer.is_some(),
            "Search completed"
        );

        Ok(SearchResponse {
            query: request.query,
            answer,
            follow_up_questions,
            images,
            results,
            response_time: elapsed(started),
            metadata: ResponseMetadata {
                time_range: describe(constraint.as_ref()),
                language: request.language,
                engines_used: request.engines,
                llm_used,
            },
        })
    }

    /// Fetch page content, giving up after `limit`.
    ///
    /// The fetch runs on its own task; on timeout the handle is dropped and
    /// whatever it produces later is discarded.
    async fn fetch_raw_content(&self, urls: Vec<String>, limit: Duration) -> HashMap<String, String> {
        let fetcher = Arc::clone(&self.fetcher);
        let task = tokio::spawn(
            async move { fetcher.fetch(&urls).await }.instrument(Span::current()),
        );

        match timeout(limit, task).await {
            Ok(Ok(Ok(documents))) => {
                debug!("Fetched {} documents", documents.len());
                merge_by_url(documents)
            }
            Ok(Ok(Err(e))) => {
                warn!("Raw content fetch failed: {}", e);
                HashMap::new()
            }
            Ok(Err(e)) => {
                error!("Raw content fetch task failed: {}", e);
                HashMap::new()
            }
            Err(_) => {
                warn!("Raw content fetch timed out after {:?}", limit);
                HashMap::new()
            }
        }
    }

    async fn answer(&self, request: &ResolvedRequest, results: &[ShapedResult]) -> Option<Synthesis> {
        if !request.include_answer
            || request.search_depth != SearchDepth::Advanced
            || results.is_empty()
        {
            return None;
        }

        let Some(selection) = request.llm.as_ref() else {
            warn!("Answer requested without llm_provider and llm_model; skipping");
            return None;
        };

        match synthesize(
            self.models.as_ref(),
            selection,
            &request.query,
            results,
            request.answer_context_size,
            request.answer_max_tokens,
            &request.generation,
        )
        .await
        {
            Ok(synthesis) => Some(synthesis),
            Err(e) => {
                error!(
                    "Answer generation with {}/{} failed: {}",
                    selection.provider, selection.model, e
                );
                None
            }
        }
    }
}

/// Seconds since `started`, millisecond precision
fn elapsed(started: Instant) -> f64 {
    (started.elapsed().as_secs_f64() * 1000.0).round() / 1000.0
}
