//! LLM client module
//!
//! Loads chat models from configured OpenAI-compatible providers. Generation
//! parameters are passed per invocation through [`GenerationConfig`].

mod openai;
mod registry;
mod traits;

pub use openai::OpenAiCompatibleModel;
pub use registry::ProviderRegistry;
pub use traits::*;
