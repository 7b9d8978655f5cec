//! Fixture types and I/O operations.
//!
//! A fixture freezes a `Vec<FileChange>` (standing in for a live working-tree
//! status) plus the golden garbage/grouping verdict it should produce,
//! so the garbage detector and the smart-commit grouping logic can be
//! exercised without a real git checkout.

use std::{collections::HashMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
   error::{FlowError, Result},
   types::FileChange,
};

/// Manifest listing all fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
   #[serde(default)]
   pub fixtures: HashMap<String, FixtureEntry>,
}

/// Entry in the manifest for a single fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureEntry {
   pub description: String,
   #[serde(default)]
   pub tags: Vec<String>,
}

impl Manifest {
   pub fn load(fixtures_dir: &Path) -> Result<Self> {
      let path = fixtures_dir.join("manifest.toml");
      if !path.exists() {
         return Ok(Self { fixtures: HashMap::new() });
      }
      let content = fs::read_to_string(&path)?;
      toml::from_str(&content).map_err(|e| FlowError::Other(format!("failed to parse manifest.toml: {e}")))
   }

   pub fn save(&self, fixtures_dir: &Path) -> Result<()> {
      let path = fixtures_dir.join("manifest.toml");
      let content = toml::to_string_pretty(self).map_err(|e| FlowError::Other(format!("failed to serialize manifest: {e}")))?;
      fs::write(&path, content)?;
      Ok(())
   }

   pub fn add(&mut self, name: String, entry: FixtureEntry) {
      self.fixtures.insert(name, entry);
   }
}

/// Metadata for a fixture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureMeta {
   /// Source repository this transcript was captured from.
   pub source_repo:   String,
   pub source_commit: String,
   pub description:   String,
   pub captured_at:   String,
   #[serde(default)]
   pub tags: Vec<String>,
}

/// Input data for a fixture: the frozen set of changed paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureInput {
   pub changes: Vec<FileChange>,
}

/// Summary of one expected commit group, independent of `CommitType`'s
/// internal validation so golden files stay plain data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenGroup {
   pub package:     String,
   pub commit_type: String,
   pub file_count:  usize,
}

/// Golden (expected) output: which paths are garbage, and how the rest group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Golden {
   #[serde(default)]
   pub garbage_paths: Vec<String>,
   #[serde(default)]
   pub groups: Vec<GoldenGroup>,
}

/// A complete fixture with all data.
#[derive(Debug, Clone)]
pub struct Fixture {
   pub name:   String,
   pub meta:   FixtureMeta,
   pub input:  FixtureInput,
   pub golden: Option<Golden>,
}

impl Fixture {
   pub fn load(fixtures_dir: &Path, name: &str) -> Result<Self> {
      let fixture_dir = fixtures_dir.join(name);
      if !fixture_dir.exists() {
         return Err(FlowError::Other(format!("fixture '{name}' not found at {}", fixture_dir.display())));
      }

      let meta_path = fixture_dir.join("meta.toml");
      let meta: FixtureMeta = if meta_path.exists() {
         let content = fs::read_to_string(&meta_path)?;
         toml::from_str(&content).map_err(|e| FlowError::Other(format!("failed to parse {}: {e}", meta_path.display())))?
      } else {
         return Err(FlowError::Other(format!("fixture '{name}' missing meta.toml")));
      };

      let input_path = fixture_dir.join("input").join("changes.toml");
      let input: FixtureInput = {
         let content = fs::read_to_string(&input_path).map_err(|e| FlowError::Other(format!("failed to read {}: {e}", input_path.display())))?;
         toml::from_str(&content).map_err(|e| FlowError::Other(format!("failed to parse {}: {e}", input_path.display())))?
      };

      let golden_path = fixture_dir.join("golden").join("golden.toml");
      let golden = if golden_path.exists() {
         let content = fs::read_to_string(&golden_path)?;
         Some(toml::from_str(&content).map_err(|e| FlowError::Other(format!("failed to parse {}: {e}", golden_path.display())))?)
      } else {
         None
      };

      Ok(Self { name: name.to_string(), meta, input, golden })
   }

   pub fn save(&self, fixtures_dir: &Path) -> Result<()> {
      let fixture_dir = fixtures_dir.join(&self.name);
      let input_dir = fixture_dir.join("input");
      let golden_dir = fixture_dir.join("golden");
      fs::create_dir_all(&input_dir)?;
      fs::create_dir_all(&golden_dir)?;

      let meta_content = toml::to_string_pretty(&self.meta).map_err(|e| FlowError::Other(format!("failed to serialize meta: {e}")))?;
      fs::write(fixture_dir.join("meta.toml"), meta_content)?;

      let input_content = toml::to_string_pretty(&self.input).map_err(|e| FlowError::Other(format!("failed to serialize input: {e}")))?;
      fs::write(input_dir.join("changes.toml"), input_content)?;

      if let Some(golden) = &self.golden {
         let golden_content = toml::to_string_pretty(golden).map_err(|e| FlowError::Other(format!("failed to serialize golden: {e}")))?;
         fs::write(golden_dir.join("golden.toml"), golden_content)?;
      }

      Ok(())
   }

   pub fn update_golden(&mut self, golden: Golden) {
      self.golden = Some(golden);
   }
}

/// Discover all fixtures in a directory.
pub fn discover_fixtures(fixtures_dir: &Path) -> Result<Vec<String>> {
   let mut fixtures = Vec::new();

   if !fixtures_dir.exists() {
      return Ok(fixtures);
   }

   for entry in fs::read_dir(fixtures_dir)? {
      let entry = entry?;
      let path = entry.path();

      if !path.is_dir() {
         continue;
      }

      if path.join("meta.toml").exists()
         && let Some(name) = path.file_name().and_then(|n| n.to_str())
      {
         fixtures.push(name.to_string());
      }
   }

   fixtures.sort();
   Ok(fixtures)
}
