//! Thin `clap`-derive CLI: one subcommand per top-level library operation,
//! wiring `GitRunner`/`PlatformRunner` against the Smart Commit Pipeline,
//! Push Service, PR Creation Service, CI Watch Service, and PR Description
//! Generator.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flowgit::{
   FlowConfig, FlowError, Result,
   cancel::CancellationToken,
   ci,
   git::GitRunner,
   platform::{MergeMethod, PlatformRunner, ReviewEvent},
   pr::{self, PrCreateOptions},
   pr_description,
   push::{self, PushOptions},
   repo::RepoMetadata,
   smart_commit::{self, SmartCommitOptions},
   style,
   types::{CiStatus, PrState},
};

#[derive(Parser)]
#[command(
   name = "flowgit",
   version,
   about = "Drives git and gh through commit, push, PR, and CI-watch workflows with AI-assisted messages"
)]
struct Cli {
   /// Repository directory (defaults to the current directory).
   #[arg(long, global = true)]
   dir: Option<PathBuf>,

   #[command(subcommand)]
   command: Command,
}

#[derive(Subcommand)]
enum Command {
   /// Group and commit the working tree via the Smart Commit Pipeline.
   Commit {
      /// Commit garbage-classified files instead of excluding them.
      #[arg(long)]
      include_garbage: bool,
      /// Proceed even if garbage files are present, without committing them.
      #[arg(long)]
      skip_garbage_check: bool,
      /// Collapse every change into a single commit instead of grouping by package.
      #[arg(long)]
      single_commit: bool,
      /// Show what would be committed without staging or committing anything.
      #[arg(long)]
      dry_run: bool,
      /// Use deterministic template messages instead of asking the AI.
      #[arg(long)]
      no_ai: bool,
      #[arg(long, default_value = "flowgit")]
      task_id: String,
      #[arg(long, default_value = "default")]
      template: String,
   },
   /// Push the current (or given) branch, retrying transient failures.
   Push {
      #[arg(long, default_value = "origin")]
      remote: String,
      /// Branch to push; defaults to the current branch.
      branch: Option<String>,
      #[arg(long)]
      set_upstream: bool,
      /// Skip the confirmation prompt.
      #[arg(long)]
      yes: bool,
   },
   /// Pull request operations.
   Pr {
      #[command(subcommand)]
      action: PrCommand,
   },
   /// Full pipeline: commit, push, open a PR, and watch CI to completion.
   Ship {
      #[arg(long, default_value = "main")]
      base: String,
      #[arg(long)]
      draft: bool,
      #[arg(long)]
      no_ai: bool,
      #[arg(long)]
      dry_run: bool,
   },
}

#[derive(Subcommand)]
enum PrCommand {
   /// Create a pull request for the current branch.
   Create {
      #[arg(long, default_value = "main")]
      base: String,
      #[arg(long)]
      draft: bool,
      #[arg(long)]
      no_ai: bool,
   },
   /// Poll a pull request's CI checks until they settle or time out.
   Watch { number: u64 },
   /// Generate a PR description from the working branch's diff and print it.
   Describe {
      #[arg(long, default_value = "main")]
      base: String,
   },
   /// Convert an open pull request back to a draft. Idempotent.
   Ready { number: u64 },
   /// Merge a pull request.
   Merge {
      number: u64,
      /// Merge method; falls back to the configured default when omitted.
      #[arg(long)]
      method: Option<String>,
      /// Bypass branch protection required-review rules.
      #[arg(long)]
      admin: bool,
   },
   /// Approve, request changes on, or comment-review a pull request.
   Review {
      number: u64,
      #[arg(long, value_enum)]
      event: ReviewEventArg,
      #[arg(long)]
      body: Option<String>,
   },
   /// Add a comment to a pull request.
   Comment { number: u64, body: String },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ReviewEventArg {
   Approve,
   RequestChanges,
   Comment,
}

impl From<ReviewEventArg> for ReviewEvent {
   fn from(value: ReviewEventArg) -> Self {
      match value {
         ReviewEventArg::Approve => Self::Approve,
         ReviewEventArg::RequestChanges => Self::RequestChanges,
         ReviewEventArg::Comment => Self::Comment,
      }
   }
}

fn main() -> Result<()> {
   let cli = Cli::parse();
   let dir = cli.dir.unwrap_or_else(|| PathBuf::from("."));
   let cancel = CancellationToken::new();
   let git = GitRunner::new(&dir);

   if !git.is_git_repo(&cancel) {
      return Err(FlowError::NotGitRepo(dir.display().to_string()));
   }

   let config = FlowConfig::load()?;

   match cli.command {
      Command::Commit { include_garbage, skip_garbage_check, single_commit, dry_run, no_ai, task_id, template } => {
         cmd_commit(&git, &config, &cancel, include_garbage, skip_garbage_check, single_commit, dry_run, no_ai, &task_id, &template)
      },
      Command::Push { remote, branch, set_upstream, yes } => cmd_push(&git, &config, &cancel, &remote, branch.as_deref(), set_upstream, yes),
      Command::Pr { action } => cmd_pr(&git, &config, &cancel, &dir, action),
      Command::Ship { base, draft, no_ai, dry_run } => cmd_ship(&git, &config, &cancel, &dir, &base, draft, no_ai, dry_run),
   }
}

#[allow(clippy::too_many_arguments, reason = "mirrors SmartCommitOptions' field count")]
fn cmd_commit(
   git: &GitRunner,
   config: &FlowConfig,
   cancel: &CancellationToken,
   include_garbage: bool,
   skip_garbage_check: bool,
   single_commit: bool,
   dry_run: bool,
   no_ai: bool,
   task_id: &str,
   template: &str,
) -> Result<()> {
   let timestamp = chrono::Utc::now().to_rfc3339();
   let mut progress = |msg: &str| style::print_info(msg);

   let options = SmartCommitOptions {
      include_garbage,
      skip_garbage_check,
      single_commit,
      dry_run,
      ai_enabled: !no_ai && config.api_key.is_some(),
      task_id: task_id.to_string(),
      template: template.to_string(),
      timestamp,
      progress: Some(&mut progress),
   };

   let report = smart_commit::run(git, config, cancel, options)?;

   if report.commits.is_empty() {
      println!("{}", style::warning("Nothing to commit."));
   } else {
      for commit in &report.commits {
         println!("{} {} ({} file(s))", style::success(style::icons::SUCCESS), commit.message.lines().next().unwrap_or(&commit.message), commit.files.len());
         println!("  {}", style::dim(&commit.hash));
      }
   }

   if !report.garbage.is_empty() {
      println!("\n{}", style::warning(&format!("Excluded {} garbage file(s):", report.garbage.len())));
      for (path, reason) in &report.garbage {
         println!("  {} ({})", style::dim(path), reason.as_str());
      }
   }

   println!("\n{}", report.artifact);
   Ok(())
}

fn cmd_push(git: &GitRunner, config: &FlowConfig, cancel: &CancellationToken, remote: &str, branch: Option<&str>, set_upstream: bool, yes: bool) -> Result<()> {
   let branch = match branch {
      Some(b) => b.to_string(),
      None => git.current_branch(cancel)?,
   };

   let mut confirm = |remote: &str, branch: &str| -> Result<bool> {
      if yes {
         return Ok(true);
      }
      print!("Push {branch} to {remote}? [y/N] ");
      std::io::Write::flush(&mut std::io::stdout()).ok();
      let mut line = String::new();
      std::io::stdin().read_line(&mut line)?;
      Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
   };
   let mut progress = |msg: &str| style::print_info(msg);

   let options = PushOptions {
      remote,
      branch: &branch,
      set_upstream,
      confirm_before_push: true,
      confirm: Some(&mut confirm),
      progress: Some(&mut progress),
      retry_config: config.retry_config(),
   };

   let outcome = push::push(git, cancel, options)?;
   println!("{} pushed {branch} to {remote} after {} attempt(s)", style::success(style::icons::SUCCESS), outcome.attempts);
   if let Some(upstream) = outcome.upstream {
      println!("  tracking {}", style::dim(&upstream));
   }
   Ok(())
}

fn cmd_pr(git: &GitRunner, config: &FlowConfig, cancel: &CancellationToken, dir: &std::path::Path, action: PrCommand) -> Result<()> {
   let platform = PlatformRunner::new(dir);

   match action {
      PrCommand::Create { base, draft, no_ai } => {
         let outcome = run_pr_create(git, &platform, config, cancel, dir, &base, draft, no_ai)?;
         print_pr_created(&outcome);
         Ok(())
      },
      PrCommand::Watch { number } => {
         let result = run_pr_watch(&platform, config, cancel, number)?;
         print_ci_result(&result);
         if result.status == CiStatus::Failure {
            return Err(FlowError::CiFailed);
         }
         Ok(())
      },
      PrCommand::Describe { base } => {
         let description = run_pr_describe(git, config, cancel, dir, &base)?;
         println!("{}\n\n{}", description.title, description.body);
         Ok(())
      },
      PrCommand::Ready { number } => {
         platform.convert_to_draft(number, cancel)?;
         println!("{} PR #{number} converted to draft", style::success(style::icons::SUCCESS));
         Ok(())
      },
      PrCommand::Merge { number, method, admin } => {
         let method = method.unwrap_or_else(|| config.default_merge_method.clone());
         platform.merge(number, MergeMethod::parse(&method), admin, cancel)?;
         println!("{} PR #{number} merged", style::success(style::icons::SUCCESS));
         Ok(())
      },
      PrCommand::Review { number, event, body } => {
         platform.review(number, event.into(), body.as_deref(), cancel)?;
         println!("{} PR #{number} reviewed", style::success(style::icons::SUCCESS));
         Ok(())
      },
      PrCommand::Comment { number, body } => {
         platform.comment(number, &body, cancel)?;
         println!("{} commented on PR #{number}", style::success(style::icons::SUCCESS));
         Ok(())
      },
   }
}

#[allow(clippy::too_many_arguments, reason = "thin wiring over PrCreateOptions' field count")]
fn run_pr_create(
   git: &GitRunner,
   platform: &PlatformRunner,
   config: &FlowConfig,
   cancel: &CancellationToken,
   dir: &std::path::Path,
   base: &str,
   draft: bool,
   no_ai: bool,
) -> Result<flowgit::types::PrCreationOutcome> {
   let head = git.current_branch(cancel)?;
   let description = run_description(git, config, cancel, Some(dir), base, no_ai)?;
   let mut progress = |msg: &str| style::print_info(msg);

   let opts = PrCreateOptions {
      title: &description.title,
      body: &description.body,
      base,
      head: &head,
      draft,
      retry_config: config.retry_config(),
      progress: Some(&mut progress),
   };
   pr::create(platform, cancel, opts)
}

fn run_pr_watch(platform: &PlatformRunner, config: &FlowConfig, cancel: &CancellationToken, number: u64) -> Result<flowgit::types::CiWatchResult> {
   let mut progress = |msg: &str| style::print_info(msg);
   ci::watch(platform, cancel, number, &config.ci_watch_config(), Some(&mut progress))
}

fn run_pr_describe(git: &GitRunner, config: &FlowConfig, cancel: &CancellationToken, dir: &std::path::Path, base: &str) -> Result<flowgit::types::PrDescription> {
   run_description(git, config, cancel, Some(dir), base, false)
}

fn run_description(
   git: &GitRunner,
   config: &FlowConfig,
   cancel: &CancellationToken,
   repo_dir: Option<&std::path::Path>,
   base: &str,
   no_ai: bool,
) -> Result<flowgit::types::PrDescription> {
   let (stat, diff) = git.diff_range(base, cancel)?;
   let repo_context = repo_dir.and_then(|dir| RepoMetadata::detect(dir).format_for_prompt());

   if no_ai || config.api_key.is_none() {
      return Ok(fallback_description(&stat));
   }

   pr_description::generate(config, cancel, &stat, &diff, None, repo_context.as_deref())
}

fn fallback_description(stat: &str) -> flowgit::types::PrDescription {
   flowgit::types::PrDescription {
      title:       "chore: update changed files".to_string(),
      body:        format!("## Summary\nUpdated files based on the branch diff.\n\n## Changes\n```\n{}\n```\n\n## Test Plan\nManual review of the diff.", stat.trim()),
      commit_type: flowgit::types::CommitType::new("chore").expect("chore is always a valid commit type"),
      scope:       None,
   }
}

#[allow(clippy::too_many_arguments, reason = "thin wiring over the full pipeline's option set")]
fn cmd_ship(git: &GitRunner, config: &FlowConfig, cancel: &CancellationToken, dir: &std::path::Path, base: &str, draft: bool, no_ai: bool, dry_run: bool) -> Result<()> {
   let timestamp = chrono::Utc::now().to_rfc3339();
   let mut progress = |msg: &str| style::print_info(msg);

   let options = SmartCommitOptions {
      include_garbage: false,
      skip_garbage_check: false,
      single_commit: false,
      dry_run,
      ai_enabled: !no_ai && config.api_key.is_some(),
      task_id: "ship".to_string(),
      template: "default".to_string(),
      timestamp,
      progress: Some(&mut progress),
   };
   let report = smart_commit::run(git, config, cancel, options)?;
   println!("{} committed {} group(s)", style::success(style::icons::SUCCESS), report.commits.len());

   if dry_run {
      println!("{}", style::warning("dry-run: stopping before push/PR."));
      return Ok(());
   }

   let branch = git.current_branch(cancel)?;
   let mut push_progress = |msg: &str| style::print_info(msg);
   let push_opts = PushOptions {
      remote: "origin",
      branch: &branch,
      set_upstream: true,
      confirm_before_push: false,
      confirm: None,
      progress: Some(&mut push_progress),
      retry_config: config.retry_config(),
   };
   let push_outcome = push::push(git, cancel, push_opts)?;
   println!("{} pushed {branch} after {} attempt(s)", style::success(style::icons::SUCCESS), push_outcome.attempts);

   let platform = PlatformRunner::new(dir);
   let pr_outcome = run_pr_create(git, &platform, config, cancel, dir, base, draft, no_ai)?;
   print_pr_created(&pr_outcome);

   let ci_result = run_pr_watch(&platform, config, cancel, pr_outcome.number)?;
   print_ci_result(&ci_result);

   if ci_result.status == CiStatus::Failure {
      return Err(FlowError::CiFailed);
   }
   Ok(())
}

fn print_pr_created(outcome: &flowgit::types::PrCreationOutcome) {
   let state = if outcome.state == PrState::Draft { "draft" } else { "open" };
   println!("{} PR #{} ({state}): {}", style::success(style::icons::SUCCESS), outcome.number, outcome.url);
}

fn print_ci_result(result: &flowgit::types::CiWatchResult) {
   match result.status {
      CiStatus::Success => println!("{} checks passed ({} check(s))", style::success(style::icons::SUCCESS), result.checks.len()),
      CiStatus::Failure => println!("{} checks failed", style::error(style::icons::ERROR)),
      CiStatus::Timeout => println!("{} timed out waiting for checks", style::warning(style::icons::WARNING)),
      CiStatus::FetchError => println!("{} could not fetch check status: {}", style::warning(style::icons::WARNING), result.error.as_ref().map(ToString::to_string).unwrap_or_default()),
      CiStatus::Pending => println!("{} checks still pending", style::icons::INFO),
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_fallback_description_is_valid() {
      let description = fallback_description("src/main.rs | 2 +-");
      assert!(description.validate().is_ok());
   }
}
