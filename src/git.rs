//! Typed operations over the local `git` binary, built on the Command
//! Executor. Parses porcelain output defensively per spec.md §9: too-short
//! lines are skipped silently, a missing branch section never raises, and
//! ahead/behind numerics fall back to 0 on parse error.

use std::path::{Path, PathBuf};

use crate::{
   cancel::CancellationToken,
   error::{FlowError, Result},
   exec,
   types::{ChangeType, FileChange, WorkingTreeStatus},
};

pub struct GitRunner {
   dir: PathBuf,
}

impl GitRunner {
   pub fn new(dir: impl Into<PathBuf>) -> Self {
      Self { dir: dir.into() }
   }

   fn run(&self, args: &[&str], cancel: &CancellationToken) -> Result<String> {
      exec::run_text("git", args, &self.dir, cancel)
   }

   fn run_raw(&self, args: &[&str], cancel: &CancellationToken) -> Result<Vec<u8>> {
      exec::run("git", args, &self.dir, cancel)
   }

   pub fn dir(&self) -> &Path {
      &self.dir
   }

   /// `rev-parse --show-toplevel`; used to validate the CORE is rooted in a
   /// working directory at all.
   pub fn is_git_repo(&self, cancel: &CancellationToken) -> bool {
      self.run(&["rev-parse", "--git-dir"], cancel).is_ok()
   }

   /// Status: returns a `WorkingTreeStatus` parsed from porcelain format.
   pub fn status(&self, cancel: &CancellationToken) -> Result<WorkingTreeStatus> {
      let out = self.run(&["status", "--porcelain", "--branch"], cancel)?;
      Ok(parse_porcelain_status(&out))
   }

   /// Add(paths): stages exactly the given paths, or all changes when paths
   /// is empty.
   pub fn add(&self, paths: &[String], cancel: &CancellationToken) -> Result<()> {
      if paths.is_empty() {
         self.run(&["add", "-A"], cancel)?;
      } else {
         let mut args = vec!["add", "--"];
         args.extend(paths.iter().map(String::as_str));
         self.run(&args, cancel)?;
      }
      Ok(())
   }

   /// Commit(message): requires non-empty message; normalizes whitespace via
   /// `--cleanup=strip`.
   pub fn commit(&self, message: &str, cancel: &CancellationToken) -> Result<()> {
      if message.trim().is_empty() {
         return Err(FlowError::EmptyValue("commit message".to_string()));
      }
      self.run(&["commit", "-m", message, "--cleanup=strip"], cancel)?;
      Ok(())
   }

   /// Push(remote, branch, set-upstream). Never retries internally — the
   /// Push Service owns retry.
   pub fn push(
      &self,
      remote: &str,
      branch: &str,
      set_upstream: bool,
      cancel: &CancellationToken,
   ) -> Result<()> {
      let mut args = vec!["push"];
      if set_upstream {
         args.push("--set-upstream");
      }
      args.push(remote);
      args.push(branch);
      self.run(&args, cancel)?;
      Ok(())
   }

   /// `rev-parse HEAD`; used by the Smart Commit Pipeline to record the hash
   /// of a commit it just made.
   pub fn head_hash(&self, cancel: &CancellationToken) -> Result<String> {
      self.run(&["rev-parse", "HEAD"], cancel)
   }

   /// CurrentBranch: fails with `operation-failed` if HEAD is detached
   /// (abbrev-ref yields the literal "HEAD").
   pub fn current_branch(&self, cancel: &CancellationToken) -> Result<String> {
      let branch = self.run(&["rev-parse", "--abbrev-ref", "HEAD"], cancel)?;
      if branch == "HEAD" {
         return Err(FlowError::OperationFailed("HEAD is detached".to_string()));
      }
      Ok(branch)
   }

   /// CreateBranch(name, base): fails with `branch-exists` if a matching head
   /// ref already exists; otherwise creates and checks out.
   pub fn create_branch(&self, name: &str, base: Option<&str>, cancel: &CancellationToken) -> Result<()> {
      if self.branch_exists(name, cancel)? {
         return Err(FlowError::BranchExists(name.to_string()));
      }
      let mut args = vec!["checkout", "-b", name];
      if let Some(base) = base {
         args.push(base);
      }
      self.run(&args, cancel)?;
      Ok(())
   }

   /// BranchExists(name): true iff the head ref verifies; the expected "not a
   /// valid ref" failure is treated as false rather than an error.
   pub fn branch_exists(&self, name: &str, cancel: &CancellationToken) -> Result<bool> {
      let refname = format!("refs/heads/{name}");
      match self.run(&["show-ref", "--verify", &refname], cancel) {
         Ok(_) => Ok(true),
         Err(FlowError::OperationFailed(msg)) if is_not_a_valid_ref(&msg) => Ok(false),
         Err(e) => Err(e),
      }
   }

   pub fn diff(&self, cached: bool, cancel: &CancellationToken) -> Result<String> {
      let mut args = vec!["diff"];
      if cached {
         args.push("--cached");
      }
      self.run(&args, cancel)
   }

   /// `diff --stat`; used by the PR Description Generator's prompt context.
   pub fn diff_stat(&self, cached: bool, cancel: &CancellationToken) -> Result<String> {
      let mut args = vec!["diff", "--stat"];
      if cached {
         args.push("--cached");
      }
      self.run(&args, cancel)
   }

   /// Stat and unified diff of `HEAD` against `<base>`'s merge base, used by
   /// the PR Description Generator's prompt context.
   pub fn diff_range(&self, base: &str, cancel: &CancellationToken) -> Result<(String, String)> {
      let range = format!("{base}...HEAD");
      let stat = self.run(&["diff", "--stat", &range], cancel)?;
      let diff = self.run(&["diff", &range], cancel)?;
      Ok((stat, diff))
   }

   pub fn fetch(&self, remote: Option<&str>, cancel: &CancellationToken) -> Result<()> {
      let remote = remote.unwrap_or("origin");
      self.run(&["fetch", remote], cancel)?;
      Ok(())
   }

   /// Rebase(onto): distinguishes conflict from other errors by substring.
   pub fn rebase(&self, onto: &str, cancel: &CancellationToken) -> Result<()> {
      match self.run(&["rebase", onto], cancel) {
         Ok(_) => Ok(()),
         Err(FlowError::OperationFailed(msg)) if is_rebase_conflict(&msg) => {
            Err(FlowError::RebaseConflict(msg))
         },
         Err(e) => Err(e),
      }
   }

   /// RebaseAbort: idempotent — "no rebase in progress" becomes success.
   pub fn rebase_abort(&self, cancel: &CancellationToken) -> Result<()> {
      match self.run(&["rebase", "--abort"], cancel) {
         Ok(_) => Ok(()),
         Err(FlowError::OperationFailed(msg)) if msg.to_lowercase().contains("no rebase in progress") => {
            Ok(())
         },
         Err(e) => Err(e),
      }
   }

   /// Reset: resets HEAD; "not a valid ref" in a history-less repo is treated
   /// as success.
   pub fn reset(&self, cancel: &CancellationToken) -> Result<()> {
      match self.run(&["reset", "HEAD"], cancel) {
         Ok(_) => Ok(()),
         Err(FlowError::OperationFailed(msg)) if is_not_a_valid_ref(&msg) => Ok(()),
         Err(e) => Err(e),
      }
   }

   /// `worktree list --porcelain`; used by the Smart Commit Pipeline to
   /// reject operations against a linked worktree that no longer exists.
   pub fn worktree_list(&self, cancel: &CancellationToken) -> Result<Vec<PathBuf>> {
      let raw = self.run_raw(&["worktree", "list", "--porcelain"], cancel)?;
      let text = String::from_utf8_lossy(&raw);
      Ok(
         text
            .lines()
            .filter_map(|line| line.strip_prefix("worktree "))
            .map(PathBuf::from)
            .collect(),
      )
   }
}

fn is_not_a_valid_ref(msg: &str) -> bool {
   let lower = msg.to_lowercase();
   lower.contains("not a valid ref") || lower.contains("exit code 1")
}

fn is_rebase_conflict(msg: &str) -> bool {
   let lower = msg.to_lowercase();
   lower.contains("conflict") || lower.contains("could not apply")
}

/// Parses `git status --porcelain --branch` output.
///
/// Recognizes a `## <branch>[...<remote>[ [ahead N[, behind M]]]]` line,
/// `XY <path>` / `XY <old> -> <new>` entry lines, and the `??` untracked
/// marker. Lines shorter than the minimum valid entry are skipped silently.
pub fn parse_porcelain_status(output: &str) -> WorkingTreeStatus {
   let mut status = WorkingTreeStatus::default();

   for line in output.lines() {
      if let Some(branch_line) = line.strip_prefix("## ") {
         parse_branch_line(branch_line, &mut status);
         continue;
      }

      if line.len() < 4 {
         continue;
      }

      let xy = &line[0..2];
      let rest = &line[3..];

      let (path, old_path) = if let Some(idx) = rest.find(" -> ") {
         (rest[idx + 4..].to_string(), Some(rest[..idx].to_string()))
      } else {
         (rest.to_string(), None)
      };

      if xy == "??" {
         status.untracked.push(FileChange::new(path, ChangeType::Untracked));
         continue;
      }

      let staged_code = xy.as_bytes()[0] as char;
      let unstaged_code = xy.as_bytes()[1] as char;

      if staged_code != ' ' && staged_code != '?' {
         let mut change = FileChange::new(path.clone(), change_type_for(staged_code));
         change.old_path = old_path.clone();
         status.staged.push(change);
      }
      if unstaged_code != ' ' && unstaged_code != '?' {
         let mut change = FileChange::new(path, change_type_for(unstaged_code));
         change.old_path = old_path;
         status.unstaged.push(change);
      }
   }

   status
}

fn change_type_for(code: char) -> ChangeType {
   match code {
      'A' => ChangeType::Added,
      'D' => ChangeType::Deleted,
      'R' => ChangeType::Renamed,
      'C' => ChangeType::Copied,
      'U' => ChangeType::Unmerged,
      _ => ChangeType::Modified,
   }
}

fn parse_branch_line(line: &str, status: &mut WorkingTreeStatus) {
   // e.g. "main...origin/main [ahead 2, behind 1]" or just "main"
   let (head, tracking) = match line.find("...") {
      Some(idx) => (&line[..idx], Some(&line[idx + 3..])),
      None => (line, None),
   };
   status.branch = head.to_string();

   let Some(tracking) = tracking else { return };
   let Some(open) = tracking.find('[') else { return };
   let Some(close) = tracking.find(']') else { return };
   if close <= open {
      return;
   }
   let inner = &tracking[open + 1..close];
   for part in inner.split(", ") {
      let part = part.trim();
      if let Some(n) = part.strip_prefix("ahead ") {
         status.ahead = n.trim().parse().unwrap_or(0);
      } else if let Some(n) = part.strip_prefix("behind ") {
         status.behind = n.trim().parse().unwrap_or(0);
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_parse_branch_line_with_ahead_behind() {
      let status = parse_porcelain_status("## main...origin/main [ahead 2, behind 1]\n");
      assert_eq!(status.branch, "main");
      assert_eq!(status.ahead, 2);
      assert_eq!(status.behind, 1);
   }

   #[test]
   fn test_parse_branch_line_no_tracking() {
      let status = parse_porcelain_status("## main\n");
      assert_eq!(status.branch, "main");
      assert_eq!(status.ahead, 0);
      assert_eq!(status.behind, 0);
   }

   #[test]
   fn test_parse_missing_branch_section_never_raises() {
      let status = parse_porcelain_status(" M src/main.rs\n");
      assert_eq!(status.branch, "");
      assert_eq!(status.unstaged.len(), 1);
   }

   #[test]
   fn test_parse_staged_and_unstaged_and_untracked() {
      let output = "## main\nM  staged_only.rs\n M unstaged_only.rs\nMM both.rs\n?? new_file.rs\n";
      let status = parse_porcelain_status(output);
      assert_eq!(status.staged.len(), 2);
      assert_eq!(status.unstaged.len(), 2);
      assert_eq!(status.untracked.len(), 1);
      assert_eq!(status.untracked[0].path, "new_file.rs");
   }

   #[test]
   fn test_parse_rename_embeds_old_and_new_path() {
      let output = "## main\nR  old_name.rs -> new_name.rs\n";
      let status = parse_porcelain_status(output);
      assert_eq!(status.staged.len(), 1);
      assert_eq!(status.staged[0].path, "new_name.rs");
      assert_eq!(status.staged[0].old_path.as_deref(), Some("old_name.rs"));
      assert_eq!(status.staged[0].change_type, ChangeType::Renamed);
   }

   #[test]
   fn test_parse_too_short_lines_skipped() {
      let output = "## main\nMM\nx\n";
      let status = parse_porcelain_status(output);
      assert!(status.staged.is_empty());
      assert!(status.unstaged.is_empty());
   }

   #[test]
   fn test_parse_ahead_behind_malformed_falls_back_to_zero() {
      let status = parse_porcelain_status("## main...origin/main [ahead oops]\n");
      assert_eq!(status.ahead, 0);
   }

   #[test]
   fn test_is_not_a_valid_ref_matches() {
      assert!(is_not_a_valid_ref("fatal: main is not a valid ref"));
      assert!(!is_not_a_valid_ref("fatal: something else"));
   }

   #[test]
   fn test_is_rebase_conflict_matches() {
      assert!(is_rebase_conflict("CONFLICT (content): merge conflict in src/main.rs"));
      assert!(!is_rebase_conflict("unrelated failure"));
   }
}
