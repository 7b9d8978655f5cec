use std::{
   path::{Path, PathBuf},
   time::Duration,
};

use serde::Deserialize;

use crate::{
   error::{FlowError, Result},
   types::RetryConfig,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
   pub api_base_url: String,

   /// Overridden by `FLOWGIT_API_KEY`.
   pub api_key: Option<String>,

   pub request_timeout_secs: u64,
   pub connect_timeout_secs: u64,

   /// Retry defaults shared by push, PR creation, and AI calls.
   pub max_retries:        u32,
   pub initial_backoff_ms: u64,
   pub max_backoff_ms:     u64,
   pub backoff_multiplier: f64,
   pub retry_jitter:       f64,

   /// CI Watch Service defaults, seconds.
   pub ci_poll_interval_secs:       u64,
   pub ci_overall_timeout_secs:    u64,
   pub ci_grace_period_secs:       u64,
   pub ci_grace_poll_interval_secs: u64,

   /// Glob-style check-name patterns (trailing `*` = prefix match) that must
   /// be present for CI Watch to consider the run covered. Empty means no
   /// filtering.
   pub ci_required_checks: Vec<String>,

   pub temperature:       f32,
   pub analysis_model:    String,
   pub summary_model:     String,
   pub pr_describe_model: String,

   pub max_diff_length: usize,
   pub max_diff_tokens: usize,

   pub excluded_files:          Vec<String>,
   pub low_priority_extensions: Vec<String>,

   /// Smart Commit Pipeline knobs.
   pub wide_change_threshold: f32,
   pub min_group_size:        usize,

   #[serde(default = "default_gpg_sign")]
   pub gpg_sign: bool,

   #[serde(default = "default_merge_method")]
   pub default_merge_method: String,
}

const fn default_gpg_sign() -> bool {
   false
}

fn default_merge_method() -> String {
   "squash".to_string()
}

impl Default for FlowConfig {
   fn default() -> Self {
      Self {
         api_base_url:                "http://localhost:4000".to_string(),
         api_key:                     None,
         request_timeout_secs:        120,
         connect_timeout_secs:        30,
         max_retries:                 3,
         initial_backoff_ms:          500,
         max_backoff_ms:              10_000,
         backoff_multiplier:          2.0,
         retry_jitter:                0.1,
         ci_poll_interval_secs:       15,
         ci_overall_timeout_secs:     30 * 60,
         ci_grace_period_secs:        2 * 60,
         ci_grace_poll_interval_secs: 10,
         ci_required_checks:          Vec::new(),
         temperature:                 0.2,
         analysis_model:              "claude-sonnet-4.5".to_string(),
         summary_model:               "claude-haiku-4-5".to_string(),
         pr_describe_model:           "claude-sonnet-4.5".to_string(),
         max_diff_length:             100_000,
         max_diff_tokens:             25_000,
         excluded_files:              vec![
            "Cargo.lock".to_string(),
            "package-lock.json".to_string(),
            "yarn.lock".to_string(),
            "pnpm-lock.yaml".to_string(),
            "composer.lock".to_string(),
            "Gemfile.lock".to_string(),
            "poetry.lock".to_string(),
            "flake.lock".to_string(),
            ".gitignore".to_string(),
         ],
         low_priority_extensions:     vec![
            ".lock".to_string(),
            ".sum".to_string(),
            ".toml".to_string(),
            ".yaml".to_string(),
            ".yml".to_string(),
            ".json".to_string(),
            ".md".to_string(),
            ".txt".to_string(),
            ".log".to_string(),
         ],
         wide_change_threshold:       0.50,
         min_group_size:              1,
         gpg_sign:                    default_gpg_sign(),
         default_merge_method:        default_merge_method(),
      }
   }
}

impl FlowConfig {
   /// Loads from `FLOWGIT_CONFIG`, else `~/.config/flowgit/config.toml`, else
   /// defaults. `FLOWGIT_API_URL`/`FLOWGIT_API_KEY` always override whatever
   /// was loaded.
   pub fn load() -> Result<Self> {
      let config_path = if let Ok(custom_path) = std::env::var("FLOWGIT_CONFIG") {
         PathBuf::from(custom_path)
      } else {
         Self::default_config_path().unwrap_or_default()
      };

      let mut config = if config_path.exists() { Self::from_file(&config_path)? } else { Self::default() };
      Self::apply_env_overrides(&mut config);
      Ok(config)
   }

   fn apply_env_overrides(config: &mut Self) {
      if let Ok(api_url) = std::env::var("FLOWGIT_API_URL") {
         config.api_base_url = api_url;
      }
      if let Ok(api_key) = std::env::var("FLOWGIT_API_KEY") {
         config.api_key = Some(api_key);
      }
   }

   pub fn from_file(path: &Path) -> Result<Self> {
      let contents = std::fs::read_to_string(path)?;
      let mut config: Self = toml::from_str(&contents).map_err(|e| FlowError::Other(format!("failed to parse config: {e}")))?;
      Self::apply_env_overrides(&mut config);
      Ok(config)
   }

   pub fn default_config_path() -> Result<PathBuf> {
      if let Ok(home) = std::env::var("HOME") {
         return Ok(PathBuf::from(home).join(".config/flowgit/config.toml"));
      }
      if let Ok(home) = std::env::var("USERPROFILE") {
         return Ok(PathBuf::from(home).join(".config/flowgit/config.toml"));
      }
      Err(FlowError::Other("no home directory found (tried HOME and USERPROFILE)".to_string()))
   }

   pub fn retry_config(&self) -> RetryConfig {
      RetryConfig {
         max_attempts:  self.max_retries,
         initial_delay: Duration::from_millis(self.initial_backoff_ms),
         max_delay:     Duration::from_millis(self.max_backoff_ms),
         multiplier:    self.backoff_multiplier,
         jitter:        self.retry_jitter,
      }
   }

   pub fn ci_watch_config(&self) -> crate::ci::CiWatchConfig {
      crate::ci::CiWatchConfig {
         poll_interval:       Duration::from_secs(self.ci_poll_interval_secs),
         overall_timeout:     Duration::from_secs(self.ci_overall_timeout_secs),
         grace_period:        Duration::from_secs(self.ci_grace_period_secs),
         grace_poll_interval: Duration::from_secs(self.ci_grace_poll_interval_secs),
         required_checks:     self.ci_required_checks.clone(),
      }
   }
}

/// Valid past-tense verbs for generated commit summaries and PR titles.
pub const PAST_TENSE_VERBS: &[&str] = &[
   "added",
   "fixed",
   "updated",
   "refactored",
   "removed",
   "replaced",
   "improved",
   "implemented",
   "migrated",
   "renamed",
   "moved",
   "merged",
   "split",
   "extracted",
   "restructured",
   "reorganized",
   "consolidated",
   "simplified",
   "optimized",
   "documented",
   "tested",
   "changed",
   "introduced",
   "deprecated",
   "deleted",
   "corrected",
   "enhanced",
   "reverted",
];

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_default_config_has_sane_retry_and_ci_values() {
      let config = FlowConfig::default();
      assert_eq!(config.max_retries, 3);
      assert!(config.ci_grace_period_secs < config.ci_overall_timeout_secs);
   }

   #[test]
   fn test_retry_config_conversion_matches_fields() {
      let config = FlowConfig::default();
      let retry = config.retry_config();
      assert_eq!(retry.max_attempts, config.max_retries);
      assert_eq!(retry.multiplier, config.backoff_multiplier);
   }

   #[test]
   fn test_env_override_applies_api_url() {
      std::env::set_var("FLOWGIT_API_URL", "https://example.test");
      let mut config = FlowConfig::default();
      FlowConfig::apply_env_overrides(&mut config);
      assert_eq!(config.api_base_url, "https://example.test");
      std::env::remove_var("FLOWGIT_API_URL");
   }
}
