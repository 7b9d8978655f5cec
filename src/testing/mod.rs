//! Replayed-transcript test harness for the garbage detector and the
//! smart-commit grouping logic.
//!
//! Provides fixture-based golden testing for the two pure-logic stages of
//! the Smart Commit Pipeline that would otherwise require a real git
//! checkout to exercise.
//!
//! # Directory Structure
//!
//! ```text
//! tests/fixtures/
//! ├── manifest.toml                 # Fixture registry
//! ├── wasm-merge-with-garbage/
//! │   ├── meta.toml                 # Fixture metadata
//! │   ├── input/
//! │   │   └── changes.toml          # Frozen FileChange list
//! │   └── golden/
//! │       └── golden.toml           # Expected garbage paths + groups
//! └── ...
//! ```

mod compare;
pub mod fixture;
mod report;
mod runner;

use std::path::Path;

pub use compare::{CompareResult, compare_run};
pub use fixture::{Fixture, FixtureEntry, FixtureInput, FixtureMeta, Golden, GoldenGroup, Manifest, discover_fixtures};
pub use report::generate_html_report;
pub use runner::{RunResult, TestRunner, TestSummary};

use crate::error::Result;

/// Default fixtures directory relative to crate root.
pub const FIXTURES_DIR: &str = "tests/fixtures";

/// Get the fixtures directory path.
pub fn fixtures_dir() -> std::path::PathBuf {
   if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
      return Path::new(&manifest_dir).join(FIXTURES_DIR);
   }
   Path::new(FIXTURES_DIR).to_path_buf()
}

/// List all available fixtures.
pub fn list_fixtures() -> Result<Vec<String>> {
   let manifest = Manifest::load(&fixtures_dir())?;
   Ok(manifest.fixtures.into_keys().collect())
}
