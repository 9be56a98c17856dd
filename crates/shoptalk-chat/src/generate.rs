//! Generation collaborator adapters.
//!
//! A specialist calls the generator exactly once per request, after
//! retrieval, with the specialist instruction, the user query, the
//! conversation history, and the rendered evidence blob. `HttpGenerator`
//! calls an OpenAI-compatible `/chat/completions` endpoint; `EchoGenerator`
//! is a deterministic offline implementation for tests and local runs.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use shoptalk_core::config::GenerationConfig;
use shoptalk_core::error::ShoptalkError;
use shoptalk_core::types::{Message, Role};

/// Answer shown when retrieval produced no evidence. The generator still
/// runs so the reply is phrased, persisted, and returned like any other.
pub const NOT_FOUND_ANSWER: &str =
    "I could not find any matching information for that. Could you rephrase or ask about something else?";

/// Produces a grounded natural-language answer.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer to `query` grounded in `evidence`.
    ///
    /// `evidence` may be empty; the generated answer must then state that
    /// nothing relevant was found rather than inventing facts.
    async fn generate(
        &self,
        instruction: &str,
        query: &str,
        history: &[Message],
        evidence: &str,
    ) -> Result<String, ShoptalkError>;
}

// ---------------------------------------------------------------------------
// HttpGenerator - remote OpenAI-compatible chat completion endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Generator backed by a remote OpenAI-compatible API.
///
/// Sends `POST {base_url}/chat/completions` with the instruction and
/// evidence folded into the system message and the conversation history
/// replayed as chat turns.
pub struct HttpGenerator {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for HttpGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGenerator")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpGenerator {
    /// Create a generator from the generation section of the configuration.
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn system_prompt(instruction: &str, evidence: &str) -> String {
        if evidence.is_empty() {
            format!(
                "{}\n\nNo matching information was found for this question. \
                 Tell the customer that nothing relevant was found and invite \
                 them to rephrase. Do not invent facts.",
                instruction
            )
        } else {
            format!(
                "{}\n\nAnswer using only the numbered evidence below.\n\n{}",
                instruction, evidence
            )
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(
        &self,
        instruction: &str,
        query: &str,
        history: &[Message],
        evidence: &str,
    ) -> Result<String, ShoptalkError> {
        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": Self::system_prompt(instruction, evidence),
        })];
        for message in history {
            let role = match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            messages.push(serde_json::json!({
                "role": role,
                "content": message.content,
            }));
        }
        messages.push(serde_json::json!({ "role": "user", "content": query }));

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": messages,
            }))
            .send()
            .await
            .map_err(|e| ShoptalkError::Generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ShoptalkError::Generation(format!(
                "Endpoint returned {}",
                response.status()
            )));
        }

        let body: ChatCompletionsResponse = response
            .json()
            .await
            .map_err(|e| ShoptalkError::Generation(format!("Invalid response body: {}", e)))?;

        let answer = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ShoptalkError::Generation("Response contained no choices".to_string()))?;

        debug!(model = %self.model, chars = answer.len(), "Generated answer");
        Ok(answer)
    }
}

// ---------------------------------------------------------------------------
// EchoGenerator - deterministic offline generation
// ---------------------------------------------------------------------------

/// Deterministic generator for tests and offline runs.
///
/// Echoes the retrieved evidence back as the answer, or the standard
/// not-found message when the evidence is empty.
#[derive(Debug, Clone, Default)]
pub struct EchoGenerator;

impl EchoGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generator for EchoGenerator {
    async fn generate(
        &self,
        _instruction: &str,
        query: &str,
        _history: &[Message],
        evidence: &str,
    ) -> Result<String, ShoptalkError> {
        if evidence.is_empty() {
            return Ok(NOT_FOUND_ANSWER.to_string());
        }
        Ok(format!(
            "Regarding \"{}\", here is what I found:\n\n{}",
            query.trim(),
            evidence
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_generator_includes_evidence() {
        let generator = EchoGenerator::new();
        let answer = generator
            .generate(
                "You answer product questions.",
                "What is the price?",
                &[],
                "0).\nNokia 3210 4G costs 1,590,000 VND",
            )
            .await
            .unwrap();
        assert!(answer.contains("1,590,000"));
        assert!(answer.contains("What is the price?"));
    }

    #[tokio::test]
    async fn test_echo_generator_empty_evidence_gives_not_found() {
        let generator = EchoGenerator::new();
        let answer = generator
            .generate("instruction", "unknown thing?", &[], "")
            .await
            .unwrap();
        assert_eq!(answer, NOT_FOUND_ANSWER);
    }

    #[tokio::test]
    async fn test_echo_generator_deterministic() {
        let generator = EchoGenerator::new();
        let a = generator
            .generate("i", "q", &[], "evidence")
            .await
            .unwrap();
        let b = generator
            .generate("i", "q", &[], "evidence")
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_system_prompt_with_evidence() {
        let prompt = HttpGenerator::system_prompt("Base instruction.", "0).\nsome fact");
        assert!(prompt.starts_with("Base instruction."));
        assert!(prompt.contains("some fact"));
        assert!(prompt.contains("numbered evidence"));
    }

    #[test]
    fn test_system_prompt_without_evidence() {
        let prompt = HttpGenerator::system_prompt("Base instruction.", "");
        assert!(prompt.contains("nothing relevant was found"));
        assert!(!prompt.contains("numbered evidence"));
    }

    #[test]
    fn test_http_generator_from_config() {
        let config = GenerationConfig {
            provider: "http".to_string(),
            base_url: "https://example.test/v1/".to_string(),
            api_key: "key".to_string(),
            model: "test-model".to_string(),
        };
        let generator = HttpGenerator::new(&config);
        assert!(format!("{:?}", generator).contains("https://example.test/v1"));
    }
}
