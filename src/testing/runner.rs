//! Replayed-transcript test runner for the garbage detector and the
//! smart-commit grouping logic.
//!
//! The Smart Commit Pipeline's own `run()` talks to a real `git` binary and
//! (optionally) a real AI endpoint; neither belongs in a fixture replay. This
//! runner instead drives the two pure-logic stages directly — `garbage::partition`
//! and `smart_commit::group_changes` — against a frozen `Vec<FileChange>`,
//! so a fixture captured from a real repository's working tree can be
//! replayed without either dependency.

use super::fixture::{Fixture, Golden, GoldenGroup, discover_fixtures};
use crate::{config::FlowConfig, error::Result, garbage, smart_commit::group_changes};

/// Result of running a single fixture.
#[derive(Debug)]
pub struct RunResult {
   pub name:          String,
   pub comparison:    Option<super::compare::CompareResult>,
   pub garbage_paths: Vec<String>,
   pub groups:        Vec<GoldenGroup>,
   pub error:         Option<String>,
}

/// Test runner configuration.
pub struct TestRunner {
   pub fixtures_dir: std::path::PathBuf,
   pub config:       FlowConfig,
   pub filter:       Option<String>,
}

impl TestRunner {
   pub fn new(fixtures_dir: impl Into<std::path::PathBuf>, config: FlowConfig) -> Self {
      Self { fixtures_dir: fixtures_dir.into(), config, filter: None }
   }

   pub fn with_filter(mut self, filter: Option<String>) -> Self {
      self.filter = filter;
      self
   }

   pub fn run_all(&self) -> Result<Vec<RunResult>> {
      let fixture_names = discover_fixtures(&self.fixtures_dir)?;
      let mut results = Vec::new();

      for name in fixture_names {
         if let Some(pattern) = &self.filter
            && !name.contains(pattern)
         {
            continue;
         }
         results.push(self.run_fixture(&name));
      }

      Ok(results)
   }

   pub fn run_fixture(&self, name: &str) -> RunResult {
      match self.run_fixture_inner(name) {
         Ok(result) => result,
         Err(e) => RunResult { name: name.to_string(), comparison: None, garbage_paths: vec![], groups: vec![], error: Some(e.to_string()) },
      }
   }

   fn run_fixture_inner(&self, name: &str) -> Result<RunResult> {
      let fixture = Fixture::load(&self.fixtures_dir, name)?;

      let (clean, garbage) = garbage::partition(&fixture.input.changes);
      let garbage_paths: Vec<String> = garbage.into_iter().map(|(change, _)| change.path).collect();

      let groups = group_changes(&clean, &self.config, false);
      let groups: Vec<GoldenGroup> = groups
         .into_iter()
         .map(|g| GoldenGroup { package: g.package, commit_type: g.commit_type.as_str().to_string(), file_count: g.changes.len() })
         .collect();

      let comparison = fixture.golden.as_ref().map(|g| super::compare::compare_run(g, &garbage_paths, &groups));

      Ok(RunResult { name: name.to_string(), comparison, garbage_paths, groups, error: None })
   }

   pub fn update_all(&self) -> Result<Vec<String>> {
      let fixture_names = discover_fixtures(&self.fixtures_dir)?;
      let mut updated = Vec::new();

      for name in fixture_names {
         if let Some(pattern) = &self.filter
            && !name.contains(pattern)
         {
            continue;
         }
         self.update_fixture(&name)?;
         updated.push(name);
      }

      Ok(updated)
   }

   pub fn update_fixture(&self, name: &str) -> Result<()> {
      let result = self.run_fixture(name);

      if let Some(err) = result.error {
         return Err(crate::error::FlowError::Other(format!("failed to run fixture '{name}': {err}")));
      }

      let mut fixture = Fixture::load(&self.fixtures_dir, name)?;
      fixture.update_golden(Golden { garbage_paths: result.garbage_paths, groups: result.groups });
      fixture.save(&self.fixtures_dir)?;

      Ok(())
   }
}

/// Summary of a test run.
#[derive(Debug, Default)]
pub struct TestSummary {
   pub total:     usize,
   pub passed:    usize,
   pub failed:    usize,
   pub no_golden: usize,
   pub errors:    usize,
}

impl TestSummary {
   pub fn from_results(results: &[RunResult]) -> Self {
      let mut summary = Self { total: results.len(), ..Default::default() };

      for result in results {
         if result.error.is_some() {
            summary.errors += 1;
         } else if let Some(cmp) = &result.comparison {
            if cmp.passed {
               summary.passed += 1;
            } else {
               summary.failed += 1;
            }
         } else {
            summary.no_golden += 1;
         }
      }

      summary
   }

   pub const fn all_passed(&self) -> bool {
      self.failed == 0 && self.errors == 0
   }
}

#[cfg(test)]
mod tests {
   use super::*;
   use crate::types::{ChangeType, FileChange};

   fn changes() -> Vec<FileChange> {
      vec![
         FileChange::new(".env", ChangeType::Modified),
         FileChange::new("api/handler.rs", ChangeType::Modified),
         FileChange::new("api/router.rs", ChangeType::Added),
      ]
   }

   #[test]
   fn test_run_fixture_inner_partitions_and_groups() {
      let dir = std::env::temp_dir().join(format!("flowgit-fixture-test-{}", std::process::id()));
      std::fs::create_dir_all(dir.join("sample/input")).unwrap();
      std::fs::write(
         dir.join("sample/meta.toml"),
         "source_repo = \"sample\"\nsource_commit = \"deadbeef\"\ndescription = \"sample\"\ncaptured_at = \"2026-01-01\"\n",
      )
      .unwrap();
      let input = super::super::fixture::FixtureInput { changes: changes() };
      std::fs::write(dir.join("sample/input/changes.toml"), toml::to_string_pretty(&input).unwrap()).unwrap();

      let runner = TestRunner::new(&dir, FlowConfig::default());
      let result = runner.run_fixture("sample");
      assert!(result.error.is_none());
      assert_eq!(result.garbage_paths, vec![".env".to_string()]);
      assert_eq!(result.groups.len(), 1);
      assert_eq!(result.groups[0].file_count, 2);

      std::fs::remove_dir_all(&dir).ok();
   }
}
