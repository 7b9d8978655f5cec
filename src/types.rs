use std::{fmt, time::Duration};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, Result};

// === Conventional-commit primitives (shared by Smart Commit and PR Description) ===

/// Type-safe commit type with validation against the fixed enumeration.
#[derive(Clone, PartialEq, Eq)]
pub struct CommitType(String);

impl CommitType {
   const VALID_TYPES: &'static [&'static str] = &[
      "feat", "fix", "refactor", "docs", "test", "chore", "style", "perf", "build", "ci", "revert",
   ];

   pub fn new(s: impl Into<String>) -> Result<Self> {
      let s = s.into();
      let normalized = s.to_lowercase();

      if !Self::VALID_TYPES.contains(&normalized.as_str()) {
         return Err(FlowError::Other(format!(
            "invalid commit type '{}'. Must be one of: {}",
            s,
            Self::VALID_TYPES.join(", ")
         )));
      }

      Ok(Self(normalized))
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }
}

impl fmt::Display for CommitType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}", self.0)
   }
}

impl fmt::Debug for CommitType {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("CommitType").field(&self.0).finish()
   }
}

impl Serialize for CommitType {
   fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
   where
      S: serde::Serializer,
   {
      self.0.serialize(serializer)
   }
}

impl<'de> Deserialize<'de> for CommitType {
   fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
   where
      D: serde::Deserializer<'de>,
   {
      let s = String::deserialize(deserializer)?;
      Self::new(s).map_err(serde::de::Error::custom)
   }
}

/// Type-safe scope for conventional commits: up to two `/`-separated lowercase segments.
#[derive(Clone, PartialEq, Eq)]
pub struct Scope(String);

impl Scope {
   pub fn new(s: impl Into<String>) -> Result<Self> {
      let s = s.into();
      let segments: Vec<&str> = s.split('/').collect();

      if segments.len() > 2 {
         return Err(FlowError::Other(format!(
            "scope has {} segments, max 2 allowed",
            segments.len()
         )));
      }

      for segment in &segments {
         if segment.is_empty() {
            return Err(FlowError::Other("scope contains empty segment".to_string()));
         }
         if !segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
         {
            return Err(FlowError::Other(format!("invalid characters in scope segment: {segment}")));
         }
      }

      Ok(Self(s))
   }

   pub fn as_str(&self) -> &str {
      &self.0
   }
}

impl fmt::Display for Scope {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}", self.0)
   }
}

impl fmt::Debug for Scope {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_tuple("Scope").field(&self.0).finish()
   }
}

/// Validates a candidate first line against `<type>(<scope>)?: <description>`.
///
/// Returns the parsed type/scope/description on success. Used by both the
/// Smart Commit Pipeline's AI-acceptance check and PR Description validation.
pub fn parse_conventional_title(line: &str) -> Option<(CommitType, Option<Scope>, String)> {
   let line = line.trim();
   let colon = line.find(": ")?;
   let (head, rest) = line.split_at(colon);
   let desc = rest[2..].trim();
   if desc.is_empty() {
      return None;
   }

   let (type_part, scope_part) = if let Some(open) = head.find('(') {
      if !head.ends_with(')') {
         return None;
      }
      (&head[..open], Some(&head[open + 1..head.len() - 1]))
   } else {
      (head, None)
   };

   let commit_type = CommitType::new(type_part).ok()?;
   let scope = match scope_part {
      Some(s) if !s.is_empty() => Some(Scope::new(s).ok()?),
      _ => None,
   };

   Some((commit_type, scope, desc.to_string()))
}

/// Resolve model name from short aliases to full provider model names.
pub fn resolve_model_name(name: &str) -> String {
   match name {
      "sonnet" | "s" => "claude-sonnet-4.5",
      "opus" | "o" => "claude-opus-4.5",
      "haiku" | "h" => "claude-haiku-4-5",
      "gpt5" | "g5" => "gpt-5",
      "gpt5-mini" => "gpt-5-mini",
      "gemini" | "g2.5" => "gemini-2.5-pro",
      "flash" => "gemini-2.5-flash",
      _ => name,
   }
   .to_string()
}

/// Per-type guidance surfaced to the AI message generator's prompt.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TypeConfig {
   pub description:     String,
   #[serde(default)]
   pub diff_indicators: Vec<String>,
   #[serde(default)]
   pub file_patterns:   Vec<String>,
}

/// Default commit-type guidance table. Order defines the priority a model should
/// consider types in when two plausibly apply.
pub fn default_types() -> IndexMap<String, TypeConfig> {
   IndexMap::from([
      ("feat".to_string(), TypeConfig {
         description: "New public API surface OR user-observable capability change".to_string(),
         diff_indicators: vec!["pub fn".to_string(), "pub struct".to_string()],
         file_patterns: vec![],
      }),
      ("fix".to_string(), TypeConfig {
         description: "Fixes incorrect behavior (bugs, crashes, wrong outputs)".to_string(),
         diff_indicators: vec!["unwrap() -> ?".to_string(), "bounds check".to_string()],
         file_patterns: vec![],
      }),
      ("refactor".to_string(), TypeConfig {
         description: "Internal restructuring with provably unchanged behavior".to_string(),
         diff_indicators: vec!["rename".to_string(), "extract".to_string()],
         file_patterns: vec![],
      }),
      ("docs".to_string(), TypeConfig {
         description:     "Documentation only changes".to_string(),
         diff_indicators: vec![],
         file_patterns:   vec!["*.md".to_string()],
      }),
      ("test".to_string(), TypeConfig {
         description:     "Adding or modifying tests".to_string(),
         diff_indicators: vec![],
         file_patterns:   vec!["*_test.rs".to_string(), "tests/".to_string()],
      }),
      ("chore".to_string(), TypeConfig {
         description:     "Maintenance tasks, dependencies, tooling".to_string(),
         diff_indicators: vec![],
         file_patterns:   vec![".gitignore".to_string(), "*.lock".to_string()],
      }),
      ("build".to_string(), TypeConfig {
         description:     "Build system, dependency changes".to_string(),
         diff_indicators: vec![],
         file_patterns:   vec!["Cargo.toml".to_string(), "package.json".to_string()],
      }),
      ("ci".to_string(), TypeConfig {
         description:     "CI/CD configuration".to_string(),
         diff_indicators: vec![],
         file_patterns:   vec![".github/workflows/".to_string()],
      }),
   ])
}

/// Scope candidate with confidence metadata, as derived by the scope analyzer.
#[derive(Debug, Clone)]
pub struct ScopeCandidate {
   pub path:       String,
   pub percentage: f32,
   pub confidence: f32,
}

// === Working tree data model (spec.md §3) ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
   Added,
   Modified,
   Deleted,
   Renamed,
   Copied,
   Untracked,
   Unmerged,
}

/// A single file-level change. `old_path` is set only for renames/copies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
   pub path:        String,
   pub old_path:    Option<String>,
   pub change_type: ChangeType,
}

impl FileChange {
   pub fn new(path: impl Into<String>, change_type: ChangeType) -> Self {
      Self { path: path.into(), old_path: None, change_type }
   }
}

/// Full working-tree status as parsed from porcelain output.
///
/// Invariant: a path may appear in both `staged` and `unstaged` (partial stage)
/// but each list contains it at most once; an untracked path appears only in
/// `untracked`.
#[derive(Debug, Clone, Default)]
pub struct WorkingTreeStatus {
   pub branch:    String,
   pub ahead:     u32,
   pub behind:    u32,
   pub staged:    Vec<FileChange>,
   pub unstaged:  Vec<FileChange>,
   pub untracked: Vec<FileChange>,
}

impl WorkingTreeStatus {
   /// All distinct paths across staged, unstaged, and untracked, in first-seen order.
   pub fn all_paths(&self) -> Vec<&str> {
      let mut seen = std::collections::HashSet::new();
      let mut out = Vec::new();
      for change in self.staged.iter().chain(&self.unstaged).chain(&self.untracked) {
         if seen.insert(change.path.as_str()) {
            out.push(change.path.as_str());
         }
      }
      out
   }
}

/// A coherent set of changes destined for one commit.
///
/// Invariant: every `FileChange` in `changes` shares the derived `package`.
#[derive(Debug, Clone)]
pub struct FileGroup {
   pub package:     String,
   pub changes:     Vec<FileChange>,
   pub commit_type: CommitType,
   pub message:     Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarbageReason {
   EnvFile,
   Credentials,
   BuildOutput,
   EditorTemp,
   CoverageArtifact,
}

impl GarbageReason {
   pub const fn as_str(self) -> &'static str {
      match self {
         Self::EnvFile => "env-file",
         Self::Credentials => "credentials",
         Self::BuildOutput => "build-output",
         Self::EditorTemp => "editor-temp",
         Self::CoverageArtifact => "coverage-artifact",
      }
   }
}

/// Garbage-detection verdict for a single path.
#[derive(Debug, Clone, Copy)]
pub struct GarbageVerdict {
   pub is_garbage: bool,
   pub reason:     Option<GarbageReason>,
}

impl GarbageVerdict {
   pub const CLEAN: Self = Self { is_garbage: false, reason: None };

   pub const fn flagged(reason: GarbageReason) -> Self {
      Self { is_garbage: true, reason: Some(reason) }
   }
}

// === Retry Engine data model (spec.md §3, §4.3) ===

/// Bounded-attempt exponential-backoff configuration.
///
/// Invariant: computed delay for attempt *k* is `min(initial * multiplier^(k-1),
/// max_delay)`, optionally scaled by a multiplicative jitter factor in `[1-j, 1+j]`.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
   pub max_attempts:  u32,
   pub initial_delay: Duration,
   pub max_delay:     Duration,
   pub multiplier:    f64,
   pub jitter:        f64,
}

impl Default for RetryConfig {
   fn default() -> Self {
      Self {
         max_attempts:  3,
         initial_delay: Duration::from_millis(500),
         max_delay:     Duration::from_secs(10),
         multiplier:    2.0,
         jitter:        0.1,
      }
   }
}

// === Error Classifier output (spec.md §3, §4.2) ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
   None,
   Auth,
   Network,
   Timeout,
   RateLimit,
   NotFound,
   NonFastForward,
   NoChecksYet,
   Other,
}

impl ErrorKind {
   /// Whether this kind should be retried by a generic caller (push/CI-watch use
   /// their own, narrower predicates on top of this).
   pub const fn is_transient(self) -> bool {
      matches!(self, Self::Network | Self::Timeout | Self::RateLimit)
   }
}

// === Push Service outcome (spec.md §3, §4.5) ===

/// Successful push result. Failures are surfaced as `FlowError` instead of a
/// parallel failure variant, since Rust's `Result` already encodes that axis.
#[derive(Debug, Clone)]
pub struct PushOutcome {
   pub attempts: u32,
   pub upstream: Option<String>,
}

// === PR Creation Service outcome (spec.md §3, §4.7) ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
   Open,
   Draft,
}

#[derive(Debug, Clone)]
pub struct PrCreationOutcome {
   pub number:   u64,
   pub url:      String,
   pub state:    PrState,
   pub attempts: u32,
}

// === CI Watch Service data model (spec.md §3, §4.8) ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckBucket {
   Pass,
   Fail,
   Pending,
   Cancel,
   Skipping,
   Unknown,
}

impl CheckBucket {
   pub fn from_str(s: &str) -> Self {
      match s.to_lowercase().as_str() {
         "pass" | "success" => Self::Pass,
         "fail" | "failure" => Self::Fail,
         "pending" | "in_progress" | "queued" => Self::Pending,
         "cancel" | "cancelled" | "canceled" => Self::Cancel,
         "skipping" | "skipped" | "neutral" => Self::Skipping,
         _ => Self::Unknown,
      }
   }
}

#[derive(Debug, Clone)]
pub struct CheckResult {
   pub name:       String,
   pub workflow:   Option<String>,
   pub bucket:     CheckBucket,
   pub state:      String,
   pub started_at: Option<String>,
   pub completed_at: Option<String>,
   pub link:       Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiStatus {
   Success,
   Failure,
   Timeout,
   FetchError,
   Pending,
}

#[derive(Debug)]
pub struct CiWatchResult {
   pub status:  CiStatus,
   pub checks:  Vec<CheckResult>,
   pub elapsed: Duration,
   pub error:   Option<FlowError>,
}

// === PR Description Generator data model (spec.md §3, §4.10) ===

#[derive(Debug, Clone)]
pub struct PrDescription {
   pub title:       String,
   pub body:        String,
   pub commit_type: CommitType,
   pub scope:       Option<Scope>,
}

impl PrDescription {
   /// Validate contract: non-empty title matching the conventional-commits
   /// pattern, non-empty body containing the three required sections.
   pub fn validate(&self) -> Result<()> {
      if self.title.trim().is_empty() {
         return Err(FlowError::AiInvalidFormat);
      }
      if parse_conventional_title(&self.title).is_none() {
         return Err(FlowError::AiInvalidFormat);
      }
      if self.body.trim().is_empty() {
         return Err(FlowError::AiInvalidFormat);
      }
      let lower = self.body.to_lowercase();
      for heading in ["## summary", "## changes", "## test plan"] {
         if !lower.contains(heading) {
            return Err(FlowError::AiInvalidFormat);
         }
      }
      Ok(())
   }
}
