//! Generic bounded-attempt retry loop with exponential backoff, jitter, and
//! cancellation-aware sleep.
//!
//! Grounded on the teacher's `api::retry_api_call` (attempt-count loop +
//! `eprintln!` backoff warnings via `style::warning`), generalized per the
//! full contract: max-delay cap, predicate-driven retry-vs-surface, and an
//! abortable sleep through `cancel::CancellationToken` instead of
//! `thread::sleep`.

use std::time::Duration;

use rand::Rng;

use crate::{
   cancel::CancellationToken,
   error::{FlowError, Result},
   types::RetryConfig,
};

/// Outcome of one attempt function invocation.
pub enum Attempt<T> {
   Success(T),
   Retryable(FlowError),
   Fatal(FlowError),
}

/// Compute the delay before attempt `k+1` (1-indexed `k`), per the contract in
/// spec.md §4.3: `min(initial * multiplier^(k-1), max_delay)`.
pub fn delay_for_attempt(config: &RetryConfig, k: u32) -> Duration {
   let exp = config.multiplier.powi((k - 1) as i32);
   let millis = (config.initial_delay.as_secs_f64() * exp * 1000.0).max(0.0);
   let capped = millis.min(config.max_delay.as_millis() as f64);
   Duration::from_millis(capped as u64)
}

fn apply_jitter(delay: Duration, jitter: f64) -> Duration {
   if jitter <= 0.0 {
      return delay;
   }
   let factor = rand::rng().random_range((1.0 - jitter)..=(1.0 + jitter));
   Duration::from_secs_f64((delay.as_secs_f64() * factor).max(0.0))
}

/// Result of a completed retry loop: attempt count actually executed, in
/// addition to the caller's `Result<T>`.
pub struct RetryOutcome<T> {
   pub value:    T,
   pub attempts: u32,
}

/// Run `attempt_fn` up to `config.max_attempts` times. `attempt_fn` classifies
/// its own outcome via `Attempt`; `on_retry_wait`, if given, is invoked once
/// per wait with `(upcoming_attempt, delay)`.
pub fn run<T>(
   config: &RetryConfig,
   cancel: &CancellationToken,
   mut attempt_fn: impl FnMut(u32) -> Attempt<T>,
   mut on_retry_wait: Option<&mut dyn FnMut(u32, Duration)>,
) -> Result<RetryOutcome<T>> {
   let mut last_error = FlowError::Other("retry loop ran zero attempts".to_string());

   for k in 1..=config.max_attempts {
      cancel.check()?;

      match attempt_fn(k) {
         Attempt::Success(value) => return Ok(RetryOutcome { value, attempts: k }),
         Attempt::Fatal(err) => return Err(err),
         Attempt::Retryable(err) => {
            if err.is_canceled() {
               return Err(err);
            }
            last_error = err;
         },
      }

      if k == config.max_attempts {
         break;
      }

      let delay = apply_jitter(delay_for_attempt(config, k), config.jitter);
      if let Some(hook) = on_retry_wait.as_deref_mut() {
         hook(k + 1, delay);
      }
      cancel.sleep(delay)?;
   }

   Err(FlowError::RetryExhausted { attempts: config.max_attempts, source: Box::new(last_error) })
}

#[cfg(test)]
mod tests {
   use super::*;

   fn cfg(max_attempts: u32, initial_ms: u64, max_ms: u64, multiplier: f64) -> RetryConfig {
      RetryConfig {
         max_attempts,
         initial_delay: Duration::from_millis(initial_ms),
         max_delay: Duration::from_millis(max_ms),
         multiplier,
         jitter: 0.0,
      }
   }

   #[test]
   fn test_delay_grows_and_caps() {
      let config = cfg(5, 10, 100, 2.0);
      assert_eq!(delay_for_attempt(&config, 1), Duration::from_millis(10));
      assert_eq!(delay_for_attempt(&config, 2), Duration::from_millis(20));
      assert_eq!(delay_for_attempt(&config, 3), Duration::from_millis(40));
      assert_eq!(delay_for_attempt(&config, 4), Duration::from_millis(80));
      assert_eq!(delay_for_attempt(&config, 5), Duration::from_millis(100)); // capped
   }

   #[test]
   fn test_constant_multiplier_one() {
      let config = cfg(4, 50, 1000, 1.0);
      assert_eq!(delay_for_attempt(&config, 1), Duration::from_millis(50));
      assert_eq!(delay_for_attempt(&config, 3), Duration::from_millis(50));
   }

   #[test]
   fn test_succeeds_first_attempt_without_waiting() {
      let config = cfg(3, 5, 50, 2.0);
      let cancel = CancellationToken::new();
      let mut calls = 0;
      let result = run(&config, &cancel, |_k| {
         calls += 1;
         Attempt::Success(42)
      }, None);
      let outcome = result.unwrap();
      assert_eq!(outcome.value, 42);
      assert_eq!(outcome.attempts, 1);
      assert_eq!(calls, 1);
   }

   #[test]
   fn test_fatal_error_never_retries() {
      let config = cfg(5, 1, 10, 2.0);
      let cancel = CancellationToken::new();
      let mut calls = 0;
      let result: Result<RetryOutcome<()>> = run(&config, &cancel, |_k| {
         calls += 1;
         Attempt::Fatal(FlowError::Other("nope".to_string()))
      }, None);
      assert!(result.is_err());
      assert_eq!(calls, 1);
   }

   #[test]
   fn test_retryable_exhausts_after_max_attempts() {
      let config = cfg(3, 1, 5, 2.0);
      let cancel = CancellationToken::new();
      let mut calls = 0;
      let result: Result<RetryOutcome<()>> = run(&config, &cancel, |_k| {
         calls += 1;
         Attempt::Retryable(FlowError::Other("transient".to_string()))
      }, None);
      assert!(matches!(result, Err(FlowError::RetryExhausted { attempts: 3, .. })));
      assert_eq!(calls, 3);
   }

   #[test]
   fn test_retryable_then_success() {
      let config = cfg(4, 1, 5, 2.0);
      let cancel = CancellationToken::new();
      let mut calls = 0;
      let result = run(&config, &cancel, |_k| {
         calls += 1;
         if calls < 3 { Attempt::Retryable(FlowError::Other("x".to_string())) } else { Attempt::Success("ok") }
      }, None);
      let outcome = result.unwrap();
      assert_eq!(outcome.attempts, 3);
      assert_eq!(outcome.value, "ok");
   }

   #[test]
   fn test_cancellation_between_attempts_short_circuits() {
      let config = cfg(5, 1, 5, 2.0);
      let cancel = CancellationToken::new();
      cancel.cancel();
      let result: Result<RetryOutcome<()>> =
         run(&config, &cancel, |_k| Attempt::Success(()), None);
      assert!(matches!(result, Err(FlowError::OperationCanceled)));
   }

   #[test]
   fn test_on_retry_wait_hook_invoked_with_upcoming_attempt() {
      let config = cfg(3, 1, 5, 2.0);
      let cancel = CancellationToken::new();
      let mut seen = Vec::new();
      let mut hook = |attempt: u32, _delay: Duration| seen.push(attempt);
      let result: Result<RetryOutcome<()>> = run(
         &config,
         &cancel,
         |_k| Attempt::Retryable(FlowError::Other("x".to_string())),
         Some(&mut hook),
      );
      assert!(result.is_err());
      assert_eq!(seen, vec![2, 3]);
   }
}
