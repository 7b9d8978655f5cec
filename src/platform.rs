//! Thin typed wrapper over the hosted-platform CLI (`gh`). Each operation
//! builds an argument vector, invokes the Command Executor, and returns
//! parsed output or a classified error. See spec.md §4.6, §6.
//!
//! Grounded on vibe-kanban's `GitCli` argument-vector-building style, adapted
//! for `gh` instead of `git`.

use serde::Deserialize;

use crate::{
   cancel::CancellationToken,
   classify,
   error::{FlowError, Result},
   exec,
   types::{CheckBucket, CheckResult},
};

pub struct PlatformRunner {
   dir: std::path::PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
   Squash,
   Merge,
   Rebase,
}

impl MergeMethod {
   /// Unknown method strings fall back to squash, per spec.md §4.6.
   pub fn parse(s: &str) -> Self {
      match s.to_lowercase().as_str() {
         "merge" => Self::Merge,
         "rebase" => Self::Rebase,
         _ => Self::Squash,
      }
   }

   const fn flag(self) -> &'static str {
      match self {
         Self::Squash => "--squash",
         Self::Merge => "--merge",
         Self::Rebase => "--rebase",
      }
   }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewEvent {
   Approve,
   RequestChanges,
   Comment,
}

impl ReviewEvent {
   const fn flag(self) -> &'static str {
      match self {
         Self::Approve => "--approve",
         Self::RequestChanges => "--request-changes",
         Self::Comment => "--comment",
      }
   }
}

#[derive(Debug, Deserialize)]
struct RawCheck {
   name:       String,
   workflow:   Option<String>,
   bucket:     String,
   state:      String,
   #[serde(rename = "startedAt")]
   started_at: Option<String>,
   #[serde(rename = "completedAt")]
   completed_at: Option<String>,
   link:       Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PrStatus {
   pub number:              u64,
   pub state:               String,
   pub mergeable:           Option<String>,
   #[serde(rename = "statusCheckRollup")]
   pub status_check_rollup: Option<Vec<RollupEntry>>,
}

#[derive(Debug, Deserialize)]
pub struct RollupEntry {
   pub conclusion: Option<String>,
   pub status:     Option<String>,
}

impl PlatformRunner {
   pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
      Self { dir: dir.into() }
   }

   fn run(&self, args: &[&str], cancel: &CancellationToken) -> Result<String> {
      exec::run_text("gh", args, &self.dir, cancel)
   }

   fn classified(&self, args: &[&str], cancel: &CancellationToken) -> Result<String> {
      match self.run(args, cancel) {
         Ok(out) => Ok(out),
         Err(FlowError::OperationFailed(msg)) => Err(self.classify_platform_error(msg)),
         Err(e) => Err(e),
      }
   }

   fn classify_platform_error(&self, msg: String) -> FlowError {
      match classify::classify(&msg) {
         crate::types::ErrorKind::Auth => FlowError::PlatformAuthFailed,
         crate::types::ErrorKind::RateLimit => FlowError::PlatformRateLimited,
         crate::types::ErrorKind::NotFound => FlowError::PrNotFound(msg),
         _ => FlowError::PlatformOperation(msg),
      }
   }

   /// `pr create --title … --body … --base … --head … [--draft]`; returns raw
   /// stdout for the caller to scan for a PR URL.
   pub fn create_pr(
      &self,
      title: &str,
      body: &str,
      base: &str,
      head: &str,
      draft: bool,
      cancel: &CancellationToken,
   ) -> Result<String> {
      let mut args = vec!["pr", "create", "--title", title, "--body", body, "--base", base, "--head", head];
      if draft {
         args.push("--draft");
      }
      self.classified(&args, cancel)
   }

   /// `pr view <n> --json number,state,mergeable,statusCheckRollup`.
   pub fn pr_status(&self, number: u64, cancel: &CancellationToken) -> Result<PrStatus> {
      let n = number.to_string();
      let out = self.classified(
         &["pr", "view", &n, "--json", "number,state,mergeable,statusCheckRollup"],
         cancel,
      )?;
      serde_json::from_str(&out).map_err(|_| FlowError::PlatformOperation("malformed pr view JSON".to_string()))
   }

   /// `pr checks <n>`. A "no checks reported" failure is surfaced as the raw
   /// `OperationFailed` so the CI Watch Service's adapter can recognize it as
   /// `no-checks-yet`; every other failure is classified normally.
   pub fn list_checks(&self, number: u64, cancel: &CancellationToken) -> Result<Vec<CheckResult>> {
      let n = number.to_string();
      let raw = self.run(&["pr", "checks", &n, "--json", "name,workflow,bucket,state,startedAt,completedAt,link"], cancel);
      let out = match raw {
         Ok(out) => out,
         Err(FlowError::OperationFailed(msg)) if classify::is_no_checks_yet(&msg) => {
            return Err(FlowError::OperationFailed(msg));
         },
         Err(FlowError::OperationFailed(msg)) => return Err(self.classify_platform_error(msg)),
         Err(e) => return Err(e),
      };

      if out.trim().is_empty() {
         return Ok(Vec::new());
      }

      let raw_checks: Vec<RawCheck> = serde_json::from_str(&out)
         .map_err(|_| FlowError::PlatformOperation("malformed pr checks JSON".to_string()))?;
      Ok(
         raw_checks
            .into_iter()
            .map(|c| CheckResult {
               name:         c.name,
               workflow:     c.workflow,
               bucket:       CheckBucket::from_str(&c.bucket),
               state:        c.state,
               started_at:   c.started_at,
               completed_at: c.completed_at,
               link:         c.link,
            })
            .collect(),
      )
   }

   /// `pr ready --undo <n>`. Idempotent over "already a draft", "already
   /// merged", "closed" — all return success.
   pub fn convert_to_draft(&self, number: u64, cancel: &CancellationToken) -> Result<()> {
      let n = number.to_string();
      match self.run(&["pr", "ready", "--undo", &n], cancel) {
         Ok(_) => Ok(()),
         Err(FlowError::OperationFailed(msg)) if is_idempotent_noop(&msg) => Ok(()),
         Err(FlowError::OperationFailed(msg)) => Err(self.classify_platform_error(msg)),
         Err(e) => Err(e),
      }
   }

   /// `pr merge <n> (--squash|--merge|--rebase) [--admin] --delete-branch=false`.
   pub fn merge(&self, number: u64, method: MergeMethod, admin: bool, cancel: &CancellationToken) -> Result<()> {
      let n = number.to_string();
      let mut args = vec!["pr", "merge", &n, method.flag()];
      if admin {
         args.push("--admin");
      }
      args.push("--delete-branch=false");
      self.classified(&args, cancel)?;
      Ok(())
   }

   /// `pr review <n> (--approve|--request-changes|--comment) [--body …]`.
   /// "cannot review own PR" is a distinct sentinel.
   pub fn review(&self, number: u64, event: ReviewEvent, body: Option<&str>, cancel: &CancellationToken) -> Result<()> {
      let n = number.to_string();
      let mut args = vec!["pr", "review", &n, event.flag()];
      if let Some(body) = body {
         args.push("--body");
         args.push(body);
      }
      match self.run(&args, cancel) {
         Ok(_) => Ok(()),
         Err(FlowError::OperationFailed(msg)) if msg.to_lowercase().contains("cannot review own pr") => {
            Err(FlowError::PrReviewNotAllowed(msg))
         },
         Err(FlowError::OperationFailed(msg)) => Err(self.classify_platform_error(msg)),
         Err(e) => Err(e),
      }
   }

   /// `pr comment <n> --body …`; requires non-empty body.
   pub fn comment(&self, number: u64, body: &str, cancel: &CancellationToken) -> Result<()> {
      if body.trim().is_empty() {
         return Err(FlowError::EmptyValue("comment body".to_string()));
      }
      let n = number.to_string();
      self.classified(&["pr", "comment", &n, "--body", body], cancel)?;
      Ok(())
   }
}

fn is_idempotent_noop(msg: &str) -> bool {
   let lower = msg.to_lowercase();
   lower.contains("already a draft") || lower.contains("already merged") || lower.contains("closed")
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_merge_method_unknown_falls_back_to_squash() {
      assert_eq!(MergeMethod::parse("bogus"), MergeMethod::Squash);
      assert_eq!(MergeMethod::parse("rebase"), MergeMethod::Rebase);
      assert_eq!(MergeMethod::parse("MERGE"), MergeMethod::Merge);
   }

   #[test]
   fn test_is_idempotent_noop() {
      assert!(is_idempotent_noop("pull request is already a draft"));
      assert!(is_idempotent_noop("PR #4 is closed"));
      assert!(!is_idempotent_noop("some unrelated error"));
   }

   #[test]
   fn test_comment_rejects_empty_body() {
      let runner = PlatformRunner::new(".");
      let cancel = CancellationToken::new();
      let result = runner.comment(1, "   ", &cancel);
      assert!(matches!(result, Err(FlowError::EmptyValue(_))));
   }
}
