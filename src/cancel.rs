//! Cooperative cancellation primitive threaded through every suspension point
//! (subprocess wait, retry sleep, poll sleep) per the concurrency model.
//!
//! The teacher has no async runtime; this mirrors its `style::with_spinner`
//! cooperative background-thread pattern rather than introducing one.

use std::{
   sync::{Arc, Condvar, Mutex},
   time::{Duration, Instant},
};

use crate::error::{FlowError, Result};

#[derive(Clone, Default)]
pub struct CancellationToken {
   inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancellationToken {
   pub fn new() -> Self {
      Self::default()
   }

   /// Signal cancellation. Idempotent.
   pub fn cancel(&self) {
      let (lock, cvar) = &*self.inner;
      let mut canceled = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
      *canceled = true;
      cvar.notify_all();
   }

   pub fn is_canceled(&self) -> bool {
      let (lock, _) = &*self.inner;
      *lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
   }

   /// Fail fast with `OperationCanceled` if cancellation has already fired.
   pub fn check(&self) -> Result<()> {
      if self.is_canceled() { Err(FlowError::OperationCanceled) } else { Ok(()) }
   }

   /// Sleep for `duration`, waking early (and returning an error) if canceled.
   /// This is the abortable-sleep suspension point used by the retry engine and
   /// the CI-watch poll loop.
   pub fn sleep(&self, duration: Duration) -> Result<()> {
      let (lock, cvar) = &*self.inner;
      let deadline = Instant::now() + duration;
      let mut canceled = lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
      loop {
         if *canceled {
            return Err(FlowError::OperationCanceled);
         }
         let now = Instant::now();
         if now >= deadline {
            return Ok(());
         }
         let (guard, timeout) = cvar
            .wait_timeout(canceled, deadline - now)
            .unwrap_or_else(std::sync::PoisonError::into_inner);
         canceled = guard;
         if timeout.timed_out() && !*canceled {
            return Ok(());
         }
      }
   }
}

#[cfg(test)]
mod tests {
   use std::{thread, time::Duration};

   use super::*;

   #[test]
   fn test_sleep_completes_without_cancellation() {
      let token = CancellationToken::new();
      let start = Instant::now();
      assert!(token.sleep(Duration::from_millis(20)).is_ok());
      assert!(start.elapsed() >= Duration::from_millis(20));
   }

   #[test]
   fn test_cancel_aborts_sleep_immediately() {
      let token = CancellationToken::new();
      let waiter = token.clone();
      let handle = thread::spawn(move || waiter.sleep(Duration::from_secs(5)));
      thread::sleep(Duration::from_millis(10));
      token.cancel();
      let result = handle.join().unwrap();
      assert!(matches!(result, Err(FlowError::OperationCanceled)));
   }

   #[test]
   fn test_check_reflects_cancellation_state() {
      let token = CancellationToken::new();
      assert!(token.check().is_ok());
      token.cancel();
      assert!(token.check().is_err());
      assert!(token.is_canceled());
   }
}
