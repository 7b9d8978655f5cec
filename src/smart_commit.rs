//! Smart Commit Pipeline: status -> garbage partition -> group -> per-group
//! message generation -> commit -> artifact. See spec.md §4.9.
//!
//! 1. Analyze: collect staged + unstaged + untracked via `GitRunner::status`.
//! 2. Classify every path through the garbage detector; garbage is excluded
//!    from commits unless the caller opts in.
//! 3. Group the remaining files into `FileGroup`s keyed by derived package
//!    directory (single-commit mode collapses everything into one group).
//! 4. For each group, generate a commit message: a pre-supplied message is
//!    used verbatim, otherwise the AI is asked for a conventional-commit
//!    title plus body, retried a bounded number of times, falling back to a
//!    deterministic template built from the change types when AI is disabled
//!    or never converges.
//! 5. Commit each group (`Add` then `Commit`); dry-run mode skips both and
//!    records a `(dry-run)` pseudo-hash instead.
//! 6. Render a markdown summary artifact over every commit made, plus the
//!    excluded garbage.

use std::collections::BTreeMap;

use crate::{
   analysis::derive_package,
   api,
   cancel::CancellationToken,
   config::FlowConfig,
   error::{FlowError, Result},
   garbage,
   git::GitRunner,
   normalization::{format_commit_message, post_process_commit_message},
   templates::{self, ArtifactCommit},
   types::{ChangeType, CommitType, FileChange, FileGroup, GarbageReason, Scope, WorkingTreeStatus, parse_conventional_title},
};

const MAX_MESSAGE_RETRIES: u32 = 2;

const AI_SYSTEM_PROMPT: &str = "You write git commit messages for a single coherent change. \
Respond with exactly:\n\nTITLE: <type>(<scope>): <description>\nBODY:\n<bullet list of individual \
changes, one per line, each starting with '-'>\n\nUse a past-tense verb in the description. Do not \
add any text before TITLE: or after the last bullet.";

/// Caller-supplied knobs for one pipeline run.
pub struct SmartCommitOptions<'a> {
   pub include_garbage:    bool,
   pub skip_garbage_check: bool,
   pub single_commit:      bool,
   pub dry_run:            bool,
   pub ai_enabled:         bool,
   pub task_id:            String,
   pub template:           String,
   pub timestamp:          String,
   pub progress:           Option<&'a mut dyn FnMut(&str)>,
}

/// One commit the pipeline produced.
pub struct CommitRecord {
   pub hash:    String,
   pub message: String,
   pub files:   Vec<String>,
}

pub struct SmartCommitReport {
   pub commits:  Vec<CommitRecord>,
   pub garbage:  Vec<(String, GarbageReason)>,
   pub artifact: String,
}

/// Runs the full pipeline against the repository's current working tree.
pub fn run(git: &GitRunner, config: &FlowConfig, cancel: &CancellationToken, mut options: SmartCommitOptions<'_>) -> Result<SmartCommitReport> {
   let status = git.status(cancel)?;
   let changes = collect_changes(&status);

   if changes.is_empty() {
      let artifact = templates::render_artifact(&options.task_id, &options.template, &options.timestamp, &[], &[])?;
      return Ok(SmartCommitReport { commits: Vec::new(), garbage: Vec::new(), artifact });
   }

   let (clean, garbage_list) = garbage::partition(&changes);

   let working_set = if options.include_garbage {
      changes
   } else {
      if !garbage_list.is_empty() && !options.skip_garbage_check {
         let described = garbage_list.iter().map(|(change, reason)| format!("{} ({})", change.path, reason.as_str())).collect::<Vec<_>>().join(", ");
         return Err(FlowError::OperationFailed(format!(
            "{} garbage file(s) present: {described} (pass include-garbage to commit them or skip-garbage-check to proceed anyway)",
            garbage_list.len()
         )));
      }
      clean
   };

   if working_set.is_empty() {
      let garbage_paths: Vec<String> = garbage_list.iter().map(|(change, _)| change.path.clone()).collect();
      let artifact = templates::render_artifact(&options.task_id, &options.template, &options.timestamp, &[], &garbage_paths)?;
      return Ok(SmartCommitReport { commits: Vec::new(), garbage: garbage_list.into_iter().map(|(change, reason)| (change.path, reason)).collect(), artifact });
   }

   let groups = group_changes(&working_set, config, options.single_commit);

   let mut commits = Vec::with_capacity(groups.len());
   for group in groups {
      if let Some(progress) = options.progress.as_deref_mut() {
         progress(&format!("committing '{}' ({} file(s))", group.package, group.changes.len()));
      }

      let paths: Vec<String> = group.changes.iter().map(|change| change.path.clone()).collect();

      if !options.dry_run {
         git.add(&paths, cancel)?;
      }

      let diff = if options.dry_run { None } else { Some(git.diff(true, cancel)?) };
      let message = generate_message(config, cancel, &group, diff.as_deref(), options.ai_enabled)?;

      let hash = if options.dry_run {
         "(dry-run)".to_string()
      } else {
         git.commit(&message, cancel)?;
         git.head_hash(cancel)?
      };

      commits.push(CommitRecord { hash, message, files: paths });
   }

   let artifact_commits: Vec<ArtifactCommit> =
      commits.iter().map(|commit| ArtifactCommit { hash: commit.hash.clone(), message: commit.message.clone(), files: commit.files.clone() }).collect();
   let garbage_paths: Vec<String> = garbage_list.iter().map(|(change, _)| change.path.clone()).collect();
   let artifact = templates::render_artifact(&options.task_id, &options.template, &options.timestamp, &artifact_commits, &garbage_paths)?;

   Ok(SmartCommitReport { commits, garbage: garbage_list.into_iter().map(|(change, reason)| (change.path, reason)).collect(), artifact })
}

/// Merges staged/unstaged/untracked into one list, in `all_paths()` order,
/// preferring the staged entry for a path's change-type when present.
fn collect_changes(status: &WorkingTreeStatus) -> Vec<FileChange> {
   status
      .all_paths()
      .into_iter()
      .filter_map(|path| status.staged.iter().chain(&status.unstaged).chain(&status.untracked).find(|change| change.path == path).cloned())
      .collect()
}

/// Buckets changes into `FileGroup`s. Groups under `min_group_size` are
/// folded into one catch-all `misc` group rather than producing a commit per
/// file.
pub(crate) fn group_changes(changes: &[FileChange], config: &FlowConfig, single_commit: bool) -> Vec<FileGroup> {
   if single_commit {
      let commit_type = nominal_commit_type(changes);
      return vec![FileGroup { package: "root".to_string(), changes: changes.to_vec(), commit_type, message: None }];
   }

   let mut by_package: BTreeMap<String, Vec<FileChange>> = BTreeMap::new();
   for change in changes {
      by_package.entry(derive_package(&change.path)).or_default().push(change.clone());
   }

   let mut groups: Vec<FileGroup> = Vec::new();
   let mut misc: Vec<FileChange> = Vec::new();

   for (package, package_changes) in by_package {
      if config.min_group_size > 1 && package_changes.len() < config.min_group_size {
         misc.extend(package_changes);
      } else {
         let commit_type = nominal_commit_type(&package_changes);
         groups.push(FileGroup { package, changes: package_changes, commit_type, message: None });
      }
   }

   if !misc.is_empty() {
      let commit_type = nominal_commit_type(&misc);
      groups.push(FileGroup { package: "misc".to_string(), changes: misc, commit_type, message: None });
   }

   groups
}

fn nominal_commit_type(changes: &[FileChange]) -> CommitType {
   if changes.iter().all(|change| is_test_path(&change.path)) {
      return CommitType::new("test").expect("test is a valid commit type");
   }
   if changes.iter().all(|change| is_docs_path(&change.path)) {
      return CommitType::new("docs").expect("docs is a valid commit type");
   }
   CommitType::new("feat").expect("feat is a valid commit type")
}

fn is_test_path(path: &str) -> bool {
   let lower = path.to_lowercase();
   lower.contains("/test") || lower.starts_with("test") || lower.contains("_test.") || lower.contains(".test.")
}

fn is_docs_path(path: &str) -> bool {
   let lower = path.to_lowercase();
   let is_doc_extension = std::path::Path::new(&lower).extension().and_then(|ext| ext.to_str()).is_some_and(|ext| matches!(ext, "md" | "mdx" | "rst" | "adoc"));
   is_doc_extension || lower.contains("/docs/") || lower.contains("readme")
}

/// Generates a group's commit message: verbatim if pre-supplied, else AI
/// with a bounded retry, else a deterministic fallback template.
fn generate_message(config: &FlowConfig, cancel: &CancellationToken, group: &FileGroup, diff: Option<&str>, ai_enabled: bool) -> Result<String> {
   if let Some(message) = &group.message {
      return Ok(message.clone());
   }

   if ai_enabled {
      let prompt = build_message_prompt(group, diff);

      for _attempt in 0..=MAX_MESSAGE_RETRIES {
         let response = api::complete(config, cancel, &config.summary_model, AI_SYSTEM_PROMPT, &prompt)?;

         let Some((title, body_text)) = api::parse_title_body(&response) else {
            continue;
         };
         let Some((commit_type, scope, desc)) = parse_conventional_title(&title) else {
            continue;
         };

         let mut summary = desc;
         let mut body: Vec<String> = body_text.lines().map(|line| line.trim().trim_start_matches('-').trim().to_string()).filter(|line| !line.is_empty()).collect();
         post_process_commit_message(&mut summary, &mut body, commit_type.as_str(), config.max_diff_tokens);

         return Ok(format_commit_message(&commit_type, scope.as_ref(), &summary, &body));
      }
   }

   Ok(fallback_message(group))
}

fn build_message_prompt(group: &FileGroup, diff: Option<&str>) -> String {
   let files: Vec<String> = group.changes.iter().map(|change| format!("{:?} {}", change.change_type, change.path)).collect();
   let mut prompt = format!("Package: {}\nNominal type: {}\nFiles:\n{}\n", group.package, group.commit_type, files.join("\n"));

   if let Some(diff) = diff {
      let truncated = if diff.len() > 4000 { format!("{}\n...(truncated)", &diff[..4000]) } else { diff.to_string() };
      prompt.push_str(&format!("\nDiff:\n```diff\n{truncated}\n```\n"));
   }

   prompt
}

/// Deterministic message used when AI is disabled or never converges on a
/// valid title within `MAX_MESSAGE_RETRIES` attempts.
fn fallback_message(group: &FileGroup) -> String {
   let scope = sanitize_scope(&group.package).and_then(|scope| Scope::new(scope).ok());
   let verb = dominant_verb(&group.changes);

   let subject = if group.changes.len() == 1 {
      std::path::Path::new(&group.changes[0].path).file_name().and_then(|name| name.to_str()).map(str::to_string).unwrap_or_else(|| group.changes[0].path.clone())
   } else {
      format!("{} files", group.changes.len())
   };

   let summary = format!("{verb} {subject}");
   let body: Vec<String> = group.changes.iter().map(|change| change.path.clone()).collect();
   format_commit_message(&group.commit_type, scope.as_ref(), &summary, &body)
}

fn sanitize_scope(package: &str) -> Option<String> {
   if package.is_empty() || package == "root" {
      return None;
   }
   let lowered = package.to_lowercase().replace([' ', '.'], "-");
   if lowered.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' || c == '/') { Some(lowered) } else { None }
}

fn dominant_verb(changes: &[FileChange]) -> &'static str {
   if changes.iter().all(|change| matches!(change.change_type, ChangeType::Added | ChangeType::Untracked | ChangeType::Copied)) {
      return "added";
   }
   if changes.iter().all(|change| matches!(change.change_type, ChangeType::Deleted)) {
      return "removed";
   }
   if changes.iter().all(|change| matches!(change.change_type, ChangeType::Renamed)) {
      return "renamed";
   }
   "updated"
}
