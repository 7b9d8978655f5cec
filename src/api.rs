//! Freeform AI HTTP client: OpenAI-compatible chat/completions and
//! Anthropic-compatible messages, both over `reqwest::blocking`.
//!
//! The teacher forces every AI call through a JSON tool-calling schema
//! (`Tool`/`Function`/`FunctionParameters`) to extract structured fields. This
//! crate's AI calls produce plain text instead — a conventional-commit title
//! line, or a `TITLE:`/`BODY:`-marked block — so the tool-schema plumbing is
//! dropped in favor of a plain system/user prompt and a text response.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
   cancel::CancellationToken,
   classify,
   config::FlowConfig,
   error::{FlowError, Result},
   retry::{self, Attempt},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiMode {
   ChatCompletions,
   AnthropicMessages,
}

fn resolve_mode(config: &FlowConfig, model: &str) -> ApiMode {
   if config.api_base_url.contains("anthropic.com") || model.starts_with("claude") {
      ApiMode::AnthropicMessages
   } else {
      ApiMode::ChatCompletions
   }
}

fn build_client(config: &FlowConfig) -> reqwest::blocking::Client {
   reqwest::blocking::Client::builder()
      .timeout(Duration::from_secs(config.request_timeout_secs))
      .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
      .build()
      .expect("failed to build HTTP client")
}

fn anthropic_messages_url(base_url: &str) -> String {
   let trimmed = base_url.trim_end_matches('/');
   if trimmed.ends_with("/v1") { format!("{trimmed}/messages") } else { format!("{trimmed}/v1/messages") }
}

fn response_snippet(body: &str, limit: usize) -> String {
   if body.is_empty() {
      return "<empty response body>".to_string();
   }
   let mut snippet = body.trim().to_string();
   if snippet.len() > limit {
      snippet.truncate(limit);
      snippet.push_str("...");
   }
   snippet
}

#[derive(Debug, Serialize)]
struct ChatMessage {
   role:    String,
   content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
   model:       String,
   max_tokens:  u32,
   temperature: f32,
   messages:    Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
   message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
   #[serde(default)]
   content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
   #[serde(default)]
   choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest {
   model:       String,
   max_tokens:  u32,
   temperature: f32,
   #[serde(skip_serializing_if = "Option::is_none")]
   system:      Option<String>,
   messages:    Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
   role:    String,
   content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
   #[serde(rename = "type")]
   block_type: String,
   #[serde(default)]
   text:       String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
   #[serde(default)]
   content: Vec<AnthropicContentBlock>,
}

/// A single freeform AI completion. Retries on network/timeout/5xx/empty
/// responses via the shared retry engine (spec.md §4.3); any other failure is
/// surfaced immediately as `FlowError::AiError`.
pub fn complete(
   config: &FlowConfig,
   cancel: &CancellationToken,
   model: &str,
   system: &str,
   user: &str,
) -> Result<String> {
   let retry_config = config.retry_config();
   let mode = resolve_mode(config, model);
   let client = build_client(config);

   let outcome = retry::run(
      &retry_config,
      cancel,
      |_k| match dispatch(&client, config, mode, model, system, user) {
         Ok(text) if text.trim().is_empty() => Attempt::Retryable(FlowError::AiEmptyResponse),
         Ok(text) => Attempt::Success(text),
         Err(err) if err.is_canceled() => Attempt::Fatal(err),
         Err(err @ (FlowError::Other(_) | FlowError::Http(_))) => {
            let msg = err.to_string();
            let kind = classify::classify(&msg);
            if matches!(kind, crate::types::ErrorKind::Network | crate::types::ErrorKind::Timeout) {
               Attempt::Retryable(err)
            } else {
               Attempt::Fatal(FlowError::AiError(msg))
            }
         },
         Err(err) => Attempt::Fatal(err),
      },
      None,
   );

   match outcome {
      Ok(result) => Ok(result.value),
      Err(FlowError::RetryExhausted { source, .. }) => Err(FlowError::AiError(source.to_string())),
      Err(e) => Err(e),
   }
}

fn dispatch(
   client: &reqwest::blocking::Client,
   config: &FlowConfig,
   mode: ApiMode,
   model: &str,
   system: &str,
   user: &str,
) -> Result<String> {
   match mode {
      ApiMode::ChatCompletions => chat_completions_call(client, config, model, system, user),
      ApiMode::AnthropicMessages => anthropic_messages_call(client, config, model, system, user),
   }
}

fn chat_completions_call(
   client: &reqwest::blocking::Client,
   config: &FlowConfig,
   model: &str,
   system: &str,
   user: &str,
) -> Result<String> {
   let request = ChatRequest {
      model:       model.to_string(),
      max_tokens:  1024,
      temperature: config.temperature,
      messages:    vec![
         ChatMessage { role: "system".to_string(), content: system.to_string() },
         ChatMessage { role: "user".to_string(), content: user.to_string() },
      ],
   };

   let mut builder = client.post(format!("{}/chat/completions", config.api_base_url)).header("content-type", "application/json");
   if let Some(api_key) = &config.api_key {
      builder = builder.header("Authorization", format!("Bearer {api_key}"));
   }

   let response = builder.json(&request).send().map_err(FlowError::from)?;
   let status = response.status();
   let body = response.text().map_err(FlowError::from)?;

   if !status.is_success() {
      return Err(FlowError::Other(format!("api error {status}: {}", response_snippet(&body, 500))));
   }

   let parsed: ChatResponse = serde_json::from_str(&body)
      .map_err(|e| FlowError::Other(format!("malformed chat completion response: {e}: {}", response_snippet(&body, 500))))?;

   Ok(parsed.choices.into_iter().next().and_then(|c| c.message.content).unwrap_or_default())
}

fn anthropic_messages_call(
   client: &reqwest::blocking::Client,
   config: &FlowConfig,
   model: &str,
   system: &str,
   user: &str,
) -> Result<String> {
   let request = AnthropicRequest {
      model:       model.to_string(),
      max_tokens:  1024,
      temperature: config.temperature,
      system:      Some(system.to_string()).filter(|s| !s.is_empty()),
      messages:    vec![AnthropicMessage { role: "user".to_string(), content: user.to_string() }],
   };

   let mut builder = client
      .post(anthropic_messages_url(&config.api_base_url))
      .header("content-type", "application/json")
      .header("anthropic-version", "2023-06-01");
   if let Some(api_key) = &config.api_key {
      builder = builder.header("x-api-key", api_key);
   }

   let response = builder.json(&request).send().map_err(FlowError::from)?;
   let status = response.status();
   let body = response.text().map_err(FlowError::from)?;

   if !status.is_success() {
      return Err(FlowError::Other(format!("api error {status}: {}", response_snippet(&body, 500))));
   }

   let parsed: AnthropicResponse = serde_json::from_str(&body)
      .map_err(|e| FlowError::Other(format!("malformed anthropic messages response: {e}: {}", response_snippet(&body, 500))))?;

   Ok(
      parsed
         .content
         .into_iter()
         .filter(|block| block.block_type == "text")
         .map(|block| block.text)
         .collect::<Vec<_>>()
         .join("\n"),
   )
}

/// Parses a `TITLE:`/`BODY:`-marked freeform response used by the PR
/// Description Generator. Returns `None` if either marker is missing.
pub fn parse_title_body(text: &str) -> Option<(String, String)> {
   let title_idx = text.find("TITLE:")?;
   let body_idx = text.find("BODY:")?;
   if body_idx < title_idx {
      return None;
   }
   let title = text[title_idx + "TITLE:".len()..body_idx].trim().to_string();
   let body = text[body_idx + "BODY:".len()..].trim().to_string();
   if title.is_empty() || body.is_empty() {
      return None;
   }
   Some((title, body))
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_resolve_mode_claude_model_uses_anthropic() {
      let config = FlowConfig::default();
      assert_eq!(resolve_mode(&config, "claude-sonnet-4.5"), ApiMode::AnthropicMessages);
   }

   #[test]
   fn test_resolve_mode_other_model_uses_chat_completions() {
      let config = FlowConfig::default();
      assert_eq!(resolve_mode(&config, "gpt-4o"), ApiMode::ChatCompletions);
   }

   #[test]
   fn test_parse_title_body_extracts_both_sections() {
      let text = "TITLE: feat(api): add retries\nBODY:\n## Summary\nAdds retry support.\n";
      let (title, body) = parse_title_body(text).unwrap();
      assert_eq!(title, "feat(api): add retries");
      assert!(body.contains("Adds retry support."));
   }

   #[test]
   fn test_parse_title_body_missing_marker_returns_none() {
      assert!(parse_title_body("just some text").is_none());
   }
}
