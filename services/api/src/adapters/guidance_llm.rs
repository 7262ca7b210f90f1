//! services/api/src/adapters/guidance_llm.rs
//!
//! This module contains the adapter for the guidance LLM (the AI layer).
//! It implements the `GuidanceService` port from the `core` crate.
//!
//! The model is asked for JSON only. Its answer is parsed strictly: a payload that does
//! not match the schema, or that names a chapter outside 1..=114, is rejected as a whole.

const QUERY_INSTRUCTIONS: &str = r#"You are Hakeem AI, a spiritual guide using the Quran.
Your task is to map a user's feeling or life situation to 3 specific, relevant Quranic verses.
Do not invent verses.
Select verses that offer comfort, guidance, or wisdom related to the input.
Provide a short "reasoning" (max 2 sentences) explaining why this verse fits the situation contextually.

Respond with a JSON array and nothing else. Each element must be an object with exactly these fields:
- "surahNumber": integer, the number of the Surah (1-114)
- "ayahNumber": integer, the number of the Ayah
- "reasoning": string, brief explanation of relevance
If no verse fits, respond with []."#;

const DAILY_INSTRUCTIONS: &str = r#"Select a single, impactful verse from the Quran suitable for a "Daily Wisdom" or "Verse of the Day".
It should be general advice, comforting, or motivating for a modern believer.

Respond with a single JSON object and nothing else, with exactly these fields:
- "surahNumber": integer (1-114)
- "ayahNumber": integer
- "reasoning": string, a short reflection on this verse"#;

const DAILY_PROMPT: &str = "Give me one verse for today's reflection.";

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use hakeem_core::{
    domain::{Reference, Suggestion},
    ports::{GuidanceService, PortError, PortResult},
};
use serde::Deserialize;
use tracing::{debug, error};

//=========================================================================================
// Payload Schema
//=========================================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct VersePayload {
    surah_number: i64,
    ayah_number: i64,
    reasoning: String,
}

impl VersePayload {
    fn into_suggestion(self) -> PortResult<Suggestion> {
        let reference = Reference::new(self.surah_number, self.ayah_number)
            .map_err(|e| PortError::Malformed(e.to_string()))?;
        Ok(Suggestion::new(reference, self.reasoning.trim()))
    }
}

/// Removes markdown code fences the model sometimes wraps its JSON in.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses the answer to a query into an ordered suggestion list.
pub fn parse_suggestions(text: &str) -> PortResult<Vec<Suggestion>> {
    let cleaned = strip_fences(text);
    let payload: Vec<VersePayload> =
        serde_json::from_str(&cleaned).map_err(|e| PortError::Malformed(e.to_string()))?;
    payload
        .into_iter()
        .map(VersePayload::into_suggestion)
        .collect()
}

/// Parses the daily answer. An empty answer or `null` means the model picked nothing.
pub fn parse_daily(text: &str) -> PortResult<Option<Suggestion>> {
    let cleaned = strip_fences(text);
    if cleaned.is_empty() {
        return Ok(None);
    }
    let payload: Option<VersePayload> =
        serde_json::from_str(&cleaned).map_err(|e| PortError::Malformed(e.to_string()))?;
    payload.map(VersePayload::into_suggestion).transpose()
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `GuidanceService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiGuidanceAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGuidanceAdapter {
    /// Creates a new `OpenAiGuidanceAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Sends one system + user exchange and returns the text of the first choice.
    async fn complete(&self, instructions: &str, input: &str) -> PortResult<Option<String>> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instructions)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(input)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| {
                error!("Guidance LLM request failed: {}", e);
                PortError::Unexpected(e.to_string())
            })?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

//=========================================================================================
// `GuidanceService` Trait Implementation
//=========================================================================================

#[async_trait]
impl GuidanceService for OpenAiGuidanceAdapter {
    async fn suggest_for_query(&self, text: &str) -> PortResult<Vec<Suggestion>> {
        let answer = self.complete(QUERY_INSTRUCTIONS, text).await?.ok_or_else(|| {
            PortError::Malformed("Guidance LLM response contained no text content.".to_string())
        })?;
        debug!("Guidance LLM answered: {}", answer);

        parse_suggestions(&answer).map_err(|e| {
            error!("Rejected guidance payload: {}", e);
            e
        })
    }

    async fn suggest_for_today(&self) -> PortResult<Option<Suggestion>> {
        match self.complete(DAILY_INSTRUCTIONS, DAILY_PROMPT).await? {
            Some(answer) => parse_daily(&answer),
            None => Ok(None),
        }
    }
}
