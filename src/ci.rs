//! CI Watch Service: a two-phase poll loop (grace period, then main polling)
//! over the Platform Runner's check list, with graceful degradation — a
//! timeout or a persistent fetch error is returned as an `Ok(CiWatchResult)`
//! rather than an `Err`, so callers always get a final report. See spec.md
//! §4.8.

use std::time::{Duration, Instant};

use crate::{
   cancel::CancellationToken,
   classify,
   error::{FlowError, Result},
   platform::{PlatformRunner, PrStatus},
   retry::{self, Attempt},
   types::{CheckBucket, CheckResult, CiStatus, CiWatchResult, ErrorKind, RetryConfig},
};

#[derive(Debug, Clone)]
pub struct CiWatchConfig {
   pub poll_interval:       Duration,
   pub overall_timeout:     Duration,
   pub grace_period:        Duration,
   pub grace_poll_interval: Duration,
   /// Glob-style patterns (trailing `*` = prefix match, otherwise exact)
   /// a check name must match to count toward the reduction. Empty means
   /// every check counts.
   pub required_checks:     Vec<String>,
}

impl Default for CiWatchConfig {
   fn default() -> Self {
      Self {
         poll_interval:       Duration::from_secs(15),
         overall_timeout:     Duration::from_secs(30 * 60),
         grace_period:        Duration::from_secs(2 * 60),
         grace_poll_interval: Duration::from_secs(10),
         required_checks:     Vec::new(),
      }
   }
}

/// The small internal retry wrapped around every checks fetch (spec.md §4.8
/// Phase A/B): rate-limit, network, and timeout are retried; everything else
/// — including the special `no-checks-yet` signal, which the caller handles
/// itself — surfaces after a single attempt.
const FETCH_RETRY: RetryConfig =
   RetryConfig { max_attempts: 3, initial_delay: Duration::from_millis(250), max_delay: Duration::from_secs(2), multiplier: 2.0, jitter: 0.1 };

fn fetch_checks(platform: &PlatformRunner, cancel: &CancellationToken, number: u64) -> Result<Vec<CheckResult>> {
   let outcome = retry::run(
      &FETCH_RETRY,
      cancel,
      |_k| match platform.list_checks(number, cancel) {
         Ok(checks) => Attempt::Success(checks),
         Err(err) if err.is_canceled() => Attempt::Fatal(err),
         Err(err @ FlowError::OperationFailed(ref msg)) if classify::is_no_checks_yet(msg) => Attempt::Fatal(err),
         Err(FlowError::PlatformRateLimited) => Attempt::Retryable(FlowError::PlatformRateLimited),
         Err(err @ FlowError::PlatformOperation(_)) => {
            let kind = classify::classify(&err.to_string());
            if matches!(kind, ErrorKind::Network | ErrorKind::Timeout) {
               Attempt::Retryable(err)
            } else {
               Attempt::Fatal(err)
            }
         },
         Err(err) => Attempt::Fatal(err),
      },
      None,
   )?;
   Ok(outcome.value)
}

/// Spec.md §4.8 Phase B step 2: when the checks fetch is persistently
/// unavailable, derive a coarse overall status from `pr view`'s status-check
/// rollup instead of giving up outright.
fn fallback_status(platform: &PlatformRunner, cancel: &CancellationToken, number: u64) -> Result<CiStatus> {
   let status = platform.pr_status(number, cancel)?;
   Ok(status_from_rollup(&status))
}

fn status_from_rollup(status: &PrStatus) -> CiStatus {
   if status.state.eq_ignore_ascii_case("merged") {
      return CiStatus::Success;
   }

   let Some(entries) = status.status_check_rollup.as_ref() else {
      return CiStatus::Success;
   };
   if entries.is_empty() {
      return CiStatus::Success;
   }

   let mut pending = false;
   for entry in entries {
      let conclusion = entry.conclusion.as_deref().unwrap_or_default();
      let state = entry.status.as_deref().unwrap_or_default();
      if conclusion.eq_ignore_ascii_case("failure") || conclusion.eq_ignore_ascii_case("cancelled") || conclusion.eq_ignore_ascii_case("timed_out") {
         return CiStatus::Failure;
      }
      if conclusion.is_empty() && !state.eq_ignore_ascii_case("completed") {
         pending = true;
      }
   }
   if pending { CiStatus::Pending } else { CiStatus::Success }
}

/// Whether `name` matches `pattern` (trailing `*` = prefix match, otherwise
/// exact match), per spec.md §4.8 Options.
fn matches_required(name: &str, pattern: &str) -> bool {
   pattern.strip_suffix('*').map_or(name == pattern, |prefix| name.starts_with(prefix))
}

/// Filters `checks` down to the ones matching `required`. An empty
/// `required` list passes everything through.
fn filter_required(checks: &[CheckResult], required: &[String]) -> Vec<CheckResult> {
   if required.is_empty() {
      return checks.to_vec();
   }
   checks.iter().filter(|c| required.iter().any(|p| matches_required(&c.name, p))).cloned().collect()
}

pub fn watch(
   platform: &PlatformRunner,
   cancel: &CancellationToken,
   number: u64,
   config: &CiWatchConfig,
   mut progress: Option<&mut dyn FnMut(&str)>,
) -> Result<CiWatchResult> {
   let start = Instant::now();

   // Phase 1: grace period. "No checks reported yet" is expected right after
   // a PR opens — keep polling at the (shorter) grace interval until checks
   // appear or the grace period elapses.
   let checks = loop {
      cancel.check()?;
      match fetch_checks(platform, cancel, number) {
         Ok(checks) if !checks.is_empty() => break checks,
         Ok(_empty) => {},
         Err(FlowError::OperationFailed(msg)) if classify::is_no_checks_yet(&msg) => {},
         Err(err) if err.is_canceled() => return Err(err),
         Err(FlowError::RetryExhausted { source, .. }) => return Ok(degrade_to_fallback(platform, cancel, number, start, *source)),
         Err(err) => {
            return Ok(CiWatchResult { status: CiStatus::FetchError, checks: Vec::new(), elapsed: start.elapsed(), error: Some(err) });
         },
      }

      if start.elapsed() >= config.grace_period {
         // No checks ever showed up within the grace period: treat as
         // success-with-nothing-to-report rather than a failure.
         return Ok(CiWatchResult { status: CiStatus::Success, checks: Vec::new(), elapsed: start.elapsed(), error: None });
      }

      if let Some(p) = progress.as_deref_mut() {
         p("Waiting for checks to be reported...");
      }
      cancel.sleep(config.grace_poll_interval)?;
   };

   // Phase 2: main polling loop over the known check set.
   let mut checks = checks;
   loop {
      cancel.check()?;

      if checks.is_empty() {
         // No CI configured after all.
         return Ok(CiWatchResult { status: CiStatus::Success, checks: Vec::new(), elapsed: start.elapsed(), error: None });
      }

      let filtered = filter_required(&checks, &config.required_checks);
      if filtered.is_empty() && !config.required_checks.is_empty() {
         return Ok(CiWatchResult {
            status:  CiStatus::Failure,
            checks:  Vec::new(),
            elapsed: start.elapsed(),
            error:   Some(FlowError::CiCheckNotFound(config.required_checks.join(", "))),
         });
      }

      if let Some(p) = progress.as_deref_mut() {
         let pending = filtered.iter().filter(|c| c.bucket == CheckBucket::Pending).count();
         p(&format!("Waiting on {pending} pending check(s)..."));
      }

      if all_terminal(&filtered) {
         let status = if filtered.iter().all(|c| c.bucket == CheckBucket::Pass || c.bucket == CheckBucket::Skipping) {
            CiStatus::Success
         } else {
            CiStatus::Failure
         };
         return Ok(CiWatchResult { status, checks: filtered, elapsed: start.elapsed(), error: None });
      }

      if start.elapsed() >= config.overall_timeout {
         return Ok(CiWatchResult {
            status:  CiStatus::Timeout,
            checks:  filtered,
            elapsed: start.elapsed(),
            error:   Some(FlowError::CiTimeout { elapsed_secs: start.elapsed().as_secs() }),
         });
      }

      cancel.sleep(config.poll_interval)?;

      match fetch_checks(platform, cancel, number) {
         Ok(fresh) => checks = fresh,
         Err(FlowError::OperationFailed(msg)) if classify::is_no_checks_yet(&msg) => {},
         Err(err) if err.is_canceled() => return Err(err),
         Err(FlowError::RetryExhausted { source, .. }) => return Ok(degrade_to_fallback(platform, cancel, number, start, *source)),
         Err(err) => {
            return Ok(CiWatchResult { status: CiStatus::FetchError, checks, elapsed: start.elapsed(), error: Some(err) });
         },
      }
   }
}

/// Spec.md §4.8 Phase B step 2: a persistently unreachable checks fetch
/// falls back to the `pr view` rollup before the service gives up and
/// surfaces `fetch-error`.
fn degrade_to_fallback(platform: &PlatformRunner, cancel: &CancellationToken, number: u64, start: Instant, fetch_err: FlowError) -> CiWatchResult {
   match fallback_status(platform, cancel, number) {
      Ok(status) => CiWatchResult { status, checks: Vec::new(), elapsed: start.elapsed(), error: None },
      Err(_) => CiWatchResult { status: CiStatus::FetchError, checks: Vec::new(), elapsed: start.elapsed(), error: Some(fetch_err) },
   }
}

fn all_terminal(checks: &[CheckResult]) -> bool {
   checks.iter().all(|c| matches!(c.bucket, CheckBucket::Pass | CheckBucket::Fail | CheckBucket::Cancel | CheckBucket::Skipping))
}

#[cfg(test)]
mod tests {
   use super::*;

   fn check(bucket: CheckBucket) -> CheckResult {
      CheckResult {
         name:         "build".to_string(),
         workflow:     Some("ci".to_string()),
         bucket,
         state:        "COMPLETED".to_string(),
         started_at:   None,
         completed_at: None,
         link:         None,
      }
   }

   fn named_check(name: &str, bucket: CheckBucket) -> CheckResult {
      CheckResult { name: name.to_string(), ..check(bucket) }
   }

   #[test]
   fn test_all_terminal_true_when_all_pass() {
      let checks = vec![check(CheckBucket::Pass), check(CheckBucket::Skipping)];
      assert!(all_terminal(&checks));
   }

   #[test]
   fn test_all_terminal_false_with_pending() {
      let checks = vec![check(CheckBucket::Pass), check(CheckBucket::Pending)];
      assert!(!all_terminal(&checks));
   }

   #[test]
   fn test_all_terminal_true_with_failure() {
      let checks = vec![check(CheckBucket::Fail)];
      assert!(all_terminal(&checks));
   }

   #[test]
   fn test_default_config_orders_grace_before_overall_timeout() {
      let config = CiWatchConfig::default();
      assert!(config.grace_period < config.overall_timeout);
      assert!(config.grace_poll_interval < config.poll_interval || config.grace_poll_interval == config.poll_interval);
   }

   #[test]
   fn test_matches_required_exact() {
      assert!(matches_required("build", "build"));
      assert!(!matches_required("build", "test"));
   }

   #[test]
   fn test_matches_required_prefix() {
      assert!(matches_required("lint/clippy", "lint/*"));
      assert!(!matches_required("build", "lint/*"));
   }

   #[test]
   fn test_filter_required_empty_passes_everything() {
      let checks = vec![named_check("build", CheckBucket::Pass), named_check("lint", CheckBucket::Pending)];
      let filtered = filter_required(&checks, &[]);
      assert_eq!(filtered.len(), 2);
   }

   #[test]
   fn test_filter_required_keeps_only_matching() {
      let checks = vec![named_check("build", CheckBucket::Pass), named_check("lint", CheckBucket::Pending)];
      let filtered = filter_required(&checks, &["build".to_string()]);
      assert_eq!(filtered.len(), 1);
      assert_eq!(filtered[0].name, "build");
   }

   #[test]
   fn test_status_from_rollup_merged_is_success() {
      let status = PrStatus { number: 1, state: "MERGED".to_string(), mergeable: None, status_check_rollup: None };
      assert_eq!(status_from_rollup(&status), CiStatus::Success);
   }

   #[test]
   fn test_status_from_rollup_failure_conclusion() {
      use crate::platform::RollupEntry;
      let status = PrStatus {
         number:              1,
         state:               "OPEN".to_string(),
         mergeable:           None,
         status_check_rollup: Some(vec![RollupEntry { conclusion: Some("FAILURE".to_string()), status: Some("COMPLETED".to_string()) }]),
      };
      assert_eq!(status_from_rollup(&status), CiStatus::Failure);
   }
}
