//! Background stats provider (spec.md §5 point 2): a debounced cache of
//! working-tree statistics refreshed on its own thread. Readers never block;
//! `snapshot()` returns whatever was last computed, possibly kicking off a
//! background refresh if the debounce window has elapsed.
//!
//! This is the only long-lived shared state in the CORE. Modeled on the
//! teacher's `Arc<parking_lot::Mutex<_>>` sharing idiom (`rewrite.rs`'s
//! rayon-driven bulk commit pass), here guarding one cached snapshot behind a
//! single background thread instead of a parallel computation's results.

use std::{
   path::PathBuf,
   sync::Arc,
   time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::{cancel::CancellationToken, error::Result, git::GitRunner, types::WorkingTreeStatus};

/// Cached view of the working tree's shape, recomputed in the background.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkingTreeStats {
   pub branch:          String,
   pub ahead:           u32,
   pub behind:          u32,
   pub staged_count:    usize,
   pub unstaged_count:  usize,
   pub untracked_count: usize,
}

impl From<&WorkingTreeStatus> for WorkingTreeStats {
   fn from(status: &WorkingTreeStatus) -> Self {
      Self {
         branch:          status.branch.clone(),
         ahead:           status.ahead,
         behind:          status.behind,
         staged_count:    status.staged.len(),
         unstaged_count:  status.unstaged.len(),
         untracked_count: status.untracked.len(),
      }
   }
}

struct Shared {
   snapshot:       WorkingTreeStats,
   last_refreshed: Option<Instant>,
   refreshing:     bool,
}

/// Debounced, non-blocking stats cache for one repository directory. Cheap
/// to `Clone` — the inner state is `Arc`-backed, so every clone observes the
/// same cache and the same in-flight refresh.
#[derive(Clone)]
pub struct StatsProvider {
   dir:      PathBuf,
   debounce: Duration,
   shared:   Arc<Mutex<Shared>>,
}

impl StatsProvider {
   pub fn new(dir: impl Into<PathBuf>, debounce: Duration) -> Self {
      Self { dir: dir.into(), debounce, shared: Arc::new(Mutex::new(Shared { snapshot: WorkingTreeStats::default(), last_refreshed: None, refreshing: false })) }
   }

   /// Returns the last cached snapshot without blocking on git I/O. If the
   /// debounce window has elapsed and no refresh is already running, starts
   /// one in the background; its result lands in time for a later call.
   pub fn snapshot(&self) -> WorkingTreeStats {
      let should_refresh = {
         let mut shared = self.shared.lock();
         let due = shared.last_refreshed.is_none_or(|at| at.elapsed() >= self.debounce);
         if due && !shared.refreshing {
            shared.refreshing = true;
            true
         } else {
            false
         }
      };

      if should_refresh {
         self.spawn_refresh();
      }

      self.shared.lock().snapshot.clone()
   }

   /// Forces an immediate synchronous refresh, bypassing the debounce
   /// window. Used right after a commit or push when the caller needs an
   /// up-to-date snapshot rather than whatever is cached.
   pub fn refresh_now(&self, cancel: &CancellationToken) -> Result<WorkingTreeStats> {
      let git = GitRunner::new(&self.dir);
      let status = git.status(cancel)?;
      let stats = WorkingTreeStats::from(&status);

      let mut shared = self.shared.lock();
      shared.snapshot = stats.clone();
      shared.last_refreshed = Some(Instant::now());
      shared.refreshing = false;

      Ok(stats)
   }

   pub fn is_refreshing(&self) -> bool {
      self.shared.lock().refreshing
   }

   fn spawn_refresh(&self) {
      let dir = self.dir.clone();
      let shared = Arc::clone(&self.shared);

      std::thread::spawn(move || {
         let git = GitRunner::new(dir);
         let cancel = CancellationToken::new();
         let result = git.status(&cancel);

         let mut shared = shared.lock();
         if let Ok(status) = result {
            shared.snapshot = WorkingTreeStats::from(&status);
         }
         shared.last_refreshed = Some(Instant::now());
         shared.refreshing = false;
      });
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::types::{ChangeType, FileChange};

   #[test]
   fn test_stats_from_status_counts_each_bucket() {
      let status = WorkingTreeStatus {
         branch:    "main".to_string(),
         ahead:     1,
         behind:    0,
         staged:    vec![FileChange::new("a.rs", ChangeType::Modified)],
         unstaged:  vec![FileChange::new("b.rs", ChangeType::Modified), FileChange::new("c.rs", ChangeType::Deleted)],
         untracked: vec![FileChange::new("d.rs", ChangeType::Untracked)],
      };
      let stats = WorkingTreeStats::from(&status);
      assert_eq!(stats.branch, "main");
      assert_eq!(stats.staged_count, 1);
      assert_eq!(stats.unstaged_count, 2);
      assert_eq!(stats.untracked_count, 1);
   }

   #[test]
   fn test_snapshot_before_any_refresh_is_default() {
      let provider = StatsProvider::new("/tmp/does-not-matter", Duration::from_secs(60));
      let snapshot = provider.snapshot();
      assert_eq!(snapshot, WorkingTreeStats::default());
   }

   #[test]
   fn test_snapshot_triggers_at_most_one_concurrent_refresh() {
      let provider = StatsProvider::new("/tmp/does-not-matter", Duration::from_secs(60));
      provider.snapshot();
      // Second call within the same instant must not flip refreshing back on
      // if the first refresh already claimed it; this just asserts the call
      // doesn't panic or deadlock when invoked back-to-back.
      provider.snapshot();
   }
}
