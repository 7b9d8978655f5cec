//! Push state machine: validate → confirm → attempt-loop → outcome.
//! See spec.md §4.5.

use crate::{
   cancel::CancellationToken,
   classify,
   error::{FlowError, Result},
   git::GitRunner,
   retry::{self, Attempt},
   types::{ErrorKind, PushOutcome, RetryConfig},
};

pub struct PushOptions<'a> {
   pub remote:             &'a str,
   pub branch:             &'a str,
   pub set_upstream:       bool,
   pub confirm_before_push: bool,
   pub confirm:            Option<&'a mut dyn FnMut(&str, &str) -> Result<bool>>,
   pub progress:           Option<&'a mut dyn FnMut(&str)>,
   pub retry_config:       RetryConfig,
}

pub fn push(runner: &GitRunner, cancel: &CancellationToken, mut opts: PushOptions<'_>) -> Result<PushOutcome> {
   // validate
   let remote = if opts.remote.is_empty() { "origin" } else { opts.remote };
   if opts.branch.is_empty() {
      return Err(FlowError::EmptyValue("branch".to_string()));
   }

   // confirm
   if opts.confirm_before_push
      && let Some(confirm) = opts.confirm.as_deref_mut()
   {
      if !confirm(remote, opts.branch)? {
         return Err(FlowError::OperationCanceled);
      }
   }

   // attempt-loop
   let config = opts.retry_config;
   let mut last_kind = ErrorKind::None;
   let progress = opts.progress.as_deref_mut();
   let mut progress = progress;

   let result = retry::run(
      &config,
      cancel,
      |k| {
         if let Some(p) = progress.as_deref_mut() {
            p(&format!("Push attempt {k}/{}...", config.max_attempts));
         }
         match runner.push(remote, opts.branch, opts.set_upstream, cancel) {
            Ok(()) => {
               if let Some(p) = progress.as_deref_mut() {
                  p("Push completed successfully");
               }
               Attempt::Success(())
            },
            Err(err) if err.is_canceled() => Attempt::Fatal(err),
            Err(FlowError::OperationFailed(msg)) => {
               let kind = classify::classify(&msg);
               last_kind = kind;
               if matches!(kind, ErrorKind::Network | ErrorKind::Timeout) {
                  Attempt::Retryable(FlowError::OperationFailed(msg))
               } else {
                  Attempt::Fatal(build_outcome_error(kind, msg, k))
               }
            },
            Err(err) => Attempt::Fatal(err),
         }
      },
      None,
   );

   match result {
      Ok(outcome) => {
         let upstream = opts.set_upstream.then(|| format!("{remote}/{}", opts.branch));
         Ok(PushOutcome { attempts: outcome.attempts, upstream })
      },
      Err(FlowError::RetryExhausted { attempts, source }) => {
         Err(build_outcome_error(last_kind, source.to_string(), attempts))
      },
      Err(e) => Err(e),
   }
}

fn build_outcome_error(kind: ErrorKind, message: String, attempts: u32) -> FlowError {
   match kind {
      ErrorKind::Auth => FlowError::PushAuthFailed { attempts },
      ErrorKind::Network | ErrorKind::Timeout => FlowError::PushNetworkFailed { attempts },
      ErrorKind::NonFastForward => FlowError::PushNonFastForward(message),
      _ => FlowError::PushOther(message),
   }
}

#[cfg(test)]
mod tests {
   use std::time::Duration;

   use super::*;

   fn retry_cfg() -> RetryConfig {
      RetryConfig {
         max_attempts:  3,
         initial_delay: Duration::from_millis(1),
         max_delay:     Duration::from_millis(5),
         multiplier:    2.0,
         jitter:        0.0,
      }
   }

   #[test]
   fn test_validate_rejects_empty_branch() {
      let runner = GitRunner::new(".");
      let cancel = CancellationToken::new();
      let opts = PushOptions {
         remote: "origin",
         branch: "",
         set_upstream: false,
         confirm_before_push: false,
         confirm: None,
         progress: None,
         retry_config: retry_cfg(),
      };
      let result = push(&runner, &cancel, opts);
      assert!(matches!(result, Err(FlowError::EmptyValue(_))));
   }

   #[test]
   fn test_confirm_denied_surfaces_canceled_without_invoking_runner() {
      let runner = GitRunner::new(".");
      let cancel = CancellationToken::new();
      let mut confirm = |_remote: &str, _branch: &str| Ok(false);
      let opts = PushOptions {
         remote: "origin",
         branch: "main",
         set_upstream: false,
         confirm_before_push: true,
         confirm: Some(&mut confirm),
         progress: None,
         retry_config: retry_cfg(),
      };
      let result = push(&runner, &cancel, opts);
      assert!(matches!(result, Err(FlowError::OperationCanceled)));
   }

   #[test]
   fn test_confirm_true_but_no_callback_proceeds() {
      // With confirm_before_push=true and no callback, the push should still be
      // attempted (and fail for an unrelated reason: not a real repo/remote).
      let runner = GitRunner::new(std::env::temp_dir());
      let cancel = CancellationToken::new();
      let opts = PushOptions {
         remote: "origin",
         branch: "this-branch-does-not-exist-xyz",
         set_upstream: false,
         confirm_before_push: true,
         confirm: None,
         progress: None,
         retry_config: RetryConfig { max_attempts: 1, ..retry_cfg() },
      };
      let result = push(&runner, &cancel, opts);
      assert!(!matches!(result, Err(FlowError::OperationCanceled)));
   }
}
