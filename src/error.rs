use thiserror::Error;

/// Closed enumeration of category sentinels surfaced to callers (see §6).
///
/// Every wrapped error preserves its underlying cause via `#[source]` so standard
/// error-unwrapping idioms (`std::error::Error::source`) still reach it.
#[derive(Debug, Error)]
pub enum FlowError {
   #[error("value must not be empty: {0}")]
   EmptyValue(String),

   #[error("not a git repository: {0}")]
   NotGitRepo(String),

   #[error("branch already exists: {0}")]
   BranchExists(String),

   #[error("operation failed: {0}")]
   OperationFailed(String),

   #[error("operation canceled")]
   OperationCanceled,

   #[error("push authentication failed after {attempts} attempt(s)")]
   PushAuthFailed { attempts: u32 },

   #[error("push failed due to network/timeout after {attempts} attempt(s)")]
   PushNetworkFailed { attempts: u32 },

   #[error("push rejected (non-fast-forward): {0}")]
   PushNonFastForward(String),

   #[error("push failed: {0}")]
   PushOther(String),

   #[error("platform authentication failed")]
   PlatformAuthFailed,

   #[error("platform rate limited")]
   PlatformRateLimited,

   #[error("platform operation failed: {0}")]
   PlatformOperation(String),

   #[error("pull request not found: {0}")]
   PrNotFound(String),

   #[error("pull request creation failed: {0}")]
   PrCreationFailed(String),

   #[error("pull request merge failed: {0}")]
   PrMergeFailed(String),

   #[error("pull request review not allowed: {0}")]
   PrReviewNotAllowed(String),

   #[error("CI checks failed")]
   CiFailed,

   #[error("CI watch timed out after {elapsed_secs}s")]
   CiTimeout { elapsed_secs: u64 },

   #[error("required CI check not found: {0}")]
   CiCheckNotFound(String),

   #[error("rebase conflict: {0}")]
   RebaseConflict(String),

   #[error("AI generation error: {0}")]
   AiError(String),

   #[error("AI returned an empty response")]
   AiEmptyResponse,

   #[error("AI response did not match the expected format")]
   AiInvalidFormat,

   #[error("worktree not found: {0}")]
   WorktreeNotFound(String),

   #[error("retry exhausted after {attempts} attempt(s): {source}")]
   RetryExhausted {
      attempts: u32,
      #[source]
      source:   Box<Self>,
   },

   #[error("IO error: {0}")]
   Io(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   Json(#[from] serde_json::Error),

   #[error("HTTP error: {0}")]
   Http(#[from] reqwest::Error),

   #[error("{0}")]
   Other(String),
}

impl FlowError {
   /// True for the cancellation sentinel specifically — callers (and the retry
   /// engine) must never re-wrap this one, per §5 and §7.
   pub const fn is_canceled(&self) -> bool {
      matches!(self, Self::OperationCanceled)
   }
}

pub type Result<T> = std::result::Result<T, FlowError>;
