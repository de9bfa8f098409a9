//! LLM answer and follow-up question synthesis

use super::models::LlmSelection;
use crate::llm::{GenerationConfig, LlmError, ModelLoader};
use crate::results::ShapedResult;
use tracing::{debug, warn};

/// Maximum number of follow-up questions returned
pub const MAX_FOLLOW_UPS: usize = 3;

/// A synthesized answer
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub answer: String,
    /// `None` when the follow-up invocation failed
    pub follow_up_questions: Option<Vec<String>>,
    /// `provider/model`
    pub llm_used: String,
}

/// Render the first `size` results as numbered context blocks
pub fn build_context(results: &[ShapedResult], size: usize) -> String {
    results
        .iter()
        .take(size)
        .enumerate()
        .map(|(i, r)| format!("[{}] {}\n{}", i + 1, r.title, r.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn answer_prompt(query: &str, context: &str, max_tokens: Option<u32>) -> String {
    let mut prompt = format!(
        "Based on the following search results, provide a concise and accurate answer to the question: \"{}\"\n\n\
         Search Results:\n{}\n\n\
         Provide a clear, factual answer based solely on the information above. \
         If the information is insufficient, say so.",
        query, context
    );
    if let Some(tokens) = max_tokens {
        prompt.push_str(&format!(" Keep the answer under {} tokens.", tokens));
    }
    prompt
}

pub fn follow_up_prompt(query: &str, answer: &str) -> String {
    format!(
        "Based on the question \"{}\" and the answer provided, suggest {} relevant follow-up \
         questions a user might ask. Return only the questions, one per line, without numbering.\n\n\
         Answer:\n{}",
        query, MAX_FOLLOW_UPS, answer
    )
}

/// One question per non-blank line, at most [`MAX_FOLLOW_UPS`]
pub fn parse_follow_ups(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_FOLLOW_UPS)
        .map(str::to_string)
        .collect()
}

/// Generate an answer and follow-up questions from the top results.
///
/// Load and answer failures are returned; a follow-up failure only drops
/// the follow-up questions.
pub async fn synthesize(
    models: &dyn ModelLoader,
    selection: &LlmSelection,
    query: &str,
    results: &[ShapedResult],
    context_size: usize,
    max_tokens: Option<u32>,
    config: &GenerationConfig,
) -> Result<Synthesis, LlmError> {
    let model = models.load(&selection.provider, &selection.model).await?;

    let context = build_context(results, context_size);
    let answer = model
        .invoke(&answer_prompt(query, &context, max_tokens), config)
        .await?
        .content;
    debug!("Answer generated by {} ({} chars)", model.id(), answer.len());

    let follow_up_questions = match model
        .invoke(&follow_up_prompt(query, &answer), config)
        .await
    {
        Ok(completion) => Some(parse_follow_ups(&completion.content)),
        Err(e) => {
            warn!("Follow-up generation failed: {}", e);
            None
        }
    };

    Ok(Synthesis {
        answer,
        follow_up_questions,
        llm_used: format!("{}/{}", selection.provider, selection.model),
    })
}
