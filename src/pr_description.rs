//! PR Description Generator: prompts the AI for a `TITLE:`/`BODY:`-marked
//! block, parses and validates it against `PrDescription::validate`, retrying
//! a bounded number of times before falling back to a deterministic
//! description built from the diff stat. See spec.md §4.10.

use crate::{
   api,
   cancel::CancellationToken,
   config::FlowConfig,
   error::{FlowError, Result},
   types::{CommitType, PrDescription, Scope},
};

const MAX_FORMAT_RETRIES: u32 = 2;

const SYSTEM_PROMPT: &str = "You write pull request descriptions. Respond with exactly two \
sections, in this order and with these literal markers:\n\nTITLE: <a conventional-commit-style \
title, e.g. 'feat(scope): add thing'>\nBODY:\n## Summary\n<one or two sentences>\n\n## Changes\n<a \
short bullet list>\n\n## Test Plan\n<how this was or should be verified>\n\nDo not add any text \
before TITLE: or after the Test Plan section.";

pub fn generate(
   config: &FlowConfig,
   cancel: &CancellationToken,
   stat: &str,
   diff: &str,
   suggested_scope: Option<&str>,
   repo_context: Option<&str>,
) -> Result<PrDescription> {
   let user_prompt = build_user_prompt(stat, diff, suggested_scope, repo_context);

   for _attempt in 0..=MAX_FORMAT_RETRIES {
      let response = api::complete(config, cancel, &config.pr_describe_model, SYSTEM_PROMPT, &user_prompt)?;

      let Some((title, body)) = api::parse_title_body(&response) else {
         continue;
      };

      let Some((commit_type, scope, _desc)) = crate::types::parse_conventional_title(&title) else {
         continue;
      };

      let description = PrDescription { title, body, commit_type, scope };
      if description.validate().is_ok() {
         return Ok(description);
      }
   }

   Ok(fallback(stat, suggested_scope))
}

fn build_user_prompt(stat: &str, diff: &str, suggested_scope: Option<&str>, repo_context: Option<&str>) -> String {
   let mut prompt = format!("DIFF STAT:\n```\n{stat}\n```\n\nDIFF:\n```diff\n{diff}\n```\n");
   if let Some(scope) = suggested_scope {
      prompt.push_str(&format!("\nSuggested scope: {scope}\n"));
   }
   if let Some(context) = repo_context {
      prompt.push_str(&format!("\n{context}\n"));
   }
   prompt
}

/// Deterministic description used when the AI response never converges on a
/// valid `TITLE:`/`BODY:` block within `MAX_FORMAT_RETRIES` attempts.
fn fallback(stat: &str, suggested_scope: Option<&str>) -> PrDescription {
   let scope = suggested_scope.and_then(|s| Scope::new(s).ok());
   let commit_type = CommitType::new("chore").expect("chore is always a valid commit type");
   let title = match &scope {
      Some(s) => format!("chore({s}): update changed files"),
      None => "chore: update changed files".to_string(),
   };
   let body = format!(
      "## Summary\nUpdated files based on the working tree diff.\n\n## Changes\n```\n{}\n```\n\n## Test Plan\nManual review of the diff.",
      stat.trim()
   );
   PrDescription { title, body, commit_type, scope }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_fallback_produces_valid_description() {
      let description = fallback("src/main.rs | 2 +-", Some("core"));
      assert!(description.validate().is_ok());
      assert!(description.title.starts_with("chore(core):"));
   }

   #[test]
   fn test_fallback_without_scope_still_valid() {
      let description = fallback("README.md | 1 +", None);
      assert!(description.validate().is_ok());
      assert_eq!(description.title, "chore: update changed files");
   }

   #[test]
   fn test_fallback_is_never_an_ai_error() {
      let description = fallback("", None);
      assert!(matches!(description.validate(), Ok(()) | Err(FlowError::AiInvalidFormat)));
      assert!(description.validate().is_ok());
   }
}
