//! In-memory collaborators for gateway tests

use crate::aggregator::{AggregatorError, AggregatorOptions, AggregatorResponse, SearchAggregator};
use crate::documents::{Document, DocumentFetcher, FetchError};
use crate::llm::{ChatModel, Completion, GenerationConfig, LlmError, ModelLoader};
use crate::results::SearchResult;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Records every call and replies with fixed results or an error
pub struct FakeAggregator {
    results: Vec<SearchResult>,
    fail: bool,
    calls: Mutex<Vec<(String, AggregatorOptions)>>,
}

impl FakeAggregator {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::with_results(Vec::new())
        }
    }

    pub fn calls(&self) -> Vec<(String, AggregatorOptions)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> String {
        self.calls().last().map(|(q, _)| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchAggregator for FakeAggregator {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(
        &self,
        query: &str,
        options: &AggregatorOptions,
    ) -> Result<AggregatorResponse, AggregatorError> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), options.clone()));
        if self.fail {
            return Err(AggregatorError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(AggregatorResponse::with_results(self.results.clone()))
    }
}

enum FetchMode {
    Documents(Vec<Document>),
    Fail,
    Never,
}

pub struct FakeFetcher {
    mode: FetchMode,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self::new(FetchMode::Documents(documents))
    }

    pub fn failing() -> Self {
        Self::new(FetchMode::Fail)
    }

    /// A fetch that never completes
    pub fn never() -> Self {
        Self::new(FetchMode::Never)
    }

    fn new(mode: FetchMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn fetch(&self, _urls: &[String]) -> Result<Vec<Document>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            FetchMode::Documents(docs) => Ok(docs.clone()),
            FetchMode::Fail => Err(FetchError::Other("boom".to_string())),
            FetchMode::Never => std::future::pending().await,
        }
    }
}

#[derive(Default)]
struct ModelState {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    configs: Mutex<Vec<GenerationConfig>>,
}

/// Loads a scripted model; replies are consumed in order
pub struct FakeModels {
    state: Arc<ModelState>,
    fail_load: bool,
    loads: AtomicUsize,
}

impl FakeModels {
    pub fn replying(replies: Vec<Result<String, LlmError>>) -> Self {
        let state = ModelState {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        };
        Self {
            state: Arc::new(state),
            fail_load: false,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::replying(Vec::new())
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.state.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.state.prompts.lock().unwrap().clone()
    }

    pub fn configs(&self) -> Vec<GenerationConfig> {
        self.state.configs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelLoader for FakeModels {
    async fn load(&self, provider: &str, model: &str) -> Result<Box<dyn ChatModel>, LlmError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_load {
            return Err(LlmError::UnknownProvider(provider.to_string()));
        }
        Ok(Box::new(FakeModel {
            id: format!("{}/{}", provider, model),
            state: Arc::clone(&self.state),
        }))
    }
}

struct FakeModel {
    id: String,
    state: Arc<ModelState>,
}

#[async_trait]
impl ChatModel for FakeModel {
    fn id(&self) -> String {
        self.id.clone()
    }

    async fn invoke(&self, prompt: &str, config: &GenerationConfig) -> Result<Completion, LlmError> {
        self.state.prompts.lock().unwrap().push(prompt.to_string());
        self.state.configs.lock().unwrap().push(config.clone());
        let content = self
            .state
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))?;
        Ok(Completion { content })
    }
}
