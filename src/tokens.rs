//! Token counting with cascading fallback.
//!
//! Attempts token counting in order:
//! 1. API `count_tokens` (Anthropic-compatible endpoints)
//! 2. tiktoken (OpenAI/GPT models)
//! 3. Character estimate (4 chars ≈ 1 token)
//!
//! The crate has no async runtime, so this is fully synchronous on
//! `reqwest::blocking::Client` — unlike the teacher, which had an `async fn
//! count()` built on `reqwest::Client` despite carrying no tokio dependency.

use std::fmt;

use tiktoken_rs::{CoreBPE, get_bpe_from_model};

use crate::config::FlowConfig;

pub fn create_token_counter(config: &FlowConfig) -> TokenCounter {
   TokenCounter::new(&config.api_base_url, config.api_key.as_deref(), &config.analysis_model)
}

pub struct TokenCounter {
   client:       reqwest::blocking::Client,
   api_base_url: String,
   api_key:      Option<String>,
   model:        String,
   tiktoken:     Option<CoreBPE>,
}

impl fmt::Debug for TokenCounter {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("TokenCounter")
         .field("model", &self.model)
         .field("has_tiktoken", &self.tiktoken.is_some())
         .finish_non_exhaustive()
   }
}

impl TokenCounter {
   pub fn new(api_base_url: &str, api_key: Option<&str>, model: &str) -> Self {
      Self {
         client:       reqwest::blocking::Client::new(),
         api_base_url: api_base_url.to_string(),
         api_key:      api_key.map(String::from),
         model:        model.to_string(),
         tiktoken:     get_bpe_from_model(model).ok(),
      }
   }

   /// Tries API `count_tokens` first, then tiktoken, then 4-char estimate.
   pub fn count(&self, text: &str) -> usize {
      if let Some(count) = self.try_api_count(text) {
         return count;
      }
      self.count_local(text)
   }

   /// tiktoken or char estimate, skipping the network round-trip.
   pub fn count_local(&self, text: &str) -> usize {
      if let Some(ref encoder) = self.tiktoken { encoder.encode_with_special_tokens(text).len() } else { text.len() / 4 }
   }

   fn try_api_count(&self, text: &str) -> Option<usize> {
      let api_key = self.api_key.as_ref()?;

      if self.api_base_url.contains("openai.com") {
         return None;
      }

      let resp = self
         .client
         .post(format!("{}/messages/count_tokens", self.api_base_url))
         .header("x-api-key", api_key)
         .header("anthropic-version", "2023-06-01")
         .header("content-type", "application/json")
         .json(&serde_json::json!({
             "model": self.model,
             "messages": [{"role": "user", "content": text}]
         }))
         .send()
         .ok()?;

      let body: serde_json::Value = resp.json().ok()?;
      body["input_tokens"].as_u64().map(|n| n as usize)
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_char_estimate_without_tiktoken_or_api_key() {
      let counter = TokenCounter { client: reqwest::blocking::Client::new(), api_base_url: String::new(), api_key: None, model: "nonexistent-model".to_string(), tiktoken: None };
      assert_eq!(counter.count_local("abcdefgh"), 2);
   }

   #[test]
   fn test_openai_base_url_skips_api_count() {
      let counter = TokenCounter::new("https://api.openai.com/v1", Some("sk-test"), "gpt-4");
      assert!(counter.try_api_count("hello").is_none());
   }
}
