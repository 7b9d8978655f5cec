//! PR Creation Service state machine: validate → attempt-loop → outcome.
//! See spec.md §4.7.

use crate::{
   cancel::CancellationToken,
   classify,
   error::{FlowError, Result},
   platform::PlatformRunner,
   retry::{self, Attempt},
   types::{ErrorKind, PrCreationOutcome, PrState, RetryConfig},
};

pub struct PrCreateOptions<'a> {
   pub title:        &'a str,
   pub body:         &'a str,
   pub base:         &'a str,
   pub head:         &'a str,
   pub draft:        bool,
   pub retry_config: RetryConfig,
   pub progress:     Option<&'a mut dyn FnMut(&str)>,
}

pub fn create(
   platform: &PlatformRunner,
   cancel: &CancellationToken,
   mut opts: PrCreateOptions<'_>,
) -> Result<PrCreationOutcome> {
   // validate
   if opts.title.trim().is_empty() {
      return Err(FlowError::EmptyValue("pr title".to_string()));
   }
   if opts.body.trim().is_empty() {
      return Err(FlowError::EmptyValue("pr body".to_string()));
   }
   if opts.head.trim().is_empty() {
      return Err(FlowError::EmptyValue("pr head branch".to_string()));
   }
   let base = if opts.base.is_empty() { "main" } else { opts.base };

   let config = opts.retry_config;
   let progress = opts.progress.as_deref_mut();
   let mut progress = progress;

   let result = retry::run(
      &config,
      cancel,
      |k| {
         if let Some(p) = progress.as_deref_mut() {
            p(&format!("Creating PR, attempt {k}/{}...", config.max_attempts));
         }
         match platform.create_pr(opts.title, opts.body, base, opts.head, opts.draft, cancel) {
            Ok(stdout) => match extract_pr_number(&stdout) {
               Some((number, url)) => Attempt::Success((number, url)),
               // Unparseable output classifies as "other" per spec.md §4.7, which
               // the retry predicate treats as potentially transient.
               None => Attempt::Retryable(FlowError::PrCreationFailed(format!(
                  "could not parse PR number from gh output: {stdout}"
               ))),
            },
            Err(err) if err.is_canceled() => Attempt::Fatal(err),
            Err(FlowError::PlatformRateLimited) => Attempt::Retryable(FlowError::PlatformRateLimited),
            Err(err @ FlowError::PlatformOperation(_)) => {
               let kind = classify::classify(&err.to_string());
               if matches!(kind, ErrorKind::Auth | ErrorKind::NotFound) {
                  Attempt::Fatal(FlowError::PrCreationFailed(err.to_string()))
               } else {
                  // Network, timeout, and unclassified "other" errors are all
                  // treated as potentially transient.
                  Attempt::Retryable(err)
               }
            },
            Err(err) => Attempt::Fatal(err),
         }
      },
      None,
   );

   match result {
      Ok(outcome) => {
         let (number, url) = outcome.value;
         let state = if opts.draft { PrState::Draft } else { PrState::Open };
         Ok(PrCreationOutcome { number, url, state, attempts: outcome.attempts })
      },
      Err(FlowError::RetryExhausted { attempts, source }) => {
         Err(FlowError::PrCreationFailed(format!("exhausted {attempts} attempts: {source}")))
      },
      Err(e) => Err(e),
   }
}

/// `gh pr create` prints the PR URL as its last non-empty stdout line; the
/// number is the trailing path segment.
fn extract_pr_number(stdout: &str) -> Option<(u64, String)> {
   let url = stdout
      .lines()
      .rev()
      .map(str::trim)
      .find(|line| line.starts_with("http"))?
      .to_string();
   let number: u64 = url.rsplit('/').next()?.parse().ok()?;
   Some((number, url))
}
