//! Garbage file detector used by the Smart Commit Pipeline before grouping
//! changes into commits. See spec.md §4.9.

use crate::types::{FileChange, GarbageReason, GarbageVerdict};

const ENV_PATTERNS: &[&str] = &[".env", ".env.local", ".env.production", ".env.development"];
const CREDENTIAL_PATTERNS: &[&str] =
   &["id_rsa", "id_ed25519", ".pem", ".pfx", ".p12", "credentials.json", ".npmrc", ".netrc", "secrets.yaml", "secrets.yml"];
const BUILD_OUTPUT_DIRS: &[&str] = &["target/", "node_modules/", "dist/", "build/", ".next/", "__pycache__/"];
const EDITOR_TEMP_SUFFIXES: &[&str] = &["~", ".swp", ".swo", ".DS_Store"];
const COVERAGE_PATTERNS: &[&str] = &["coverage/", "lcov.info", ".nyc_output/", "htmlcov/"];

/// Classifies a single changed path. Earlier categories take priority over
/// later ones when a path happens to match more than one.
pub fn classify(change: &FileChange) -> GarbageVerdict {
   let path = change.path.to_lowercase();
   let name = std::path::Path::new(&path).file_name().and_then(|n| n.to_str()).unwrap_or(&path);

   if ENV_PATTERNS.iter().any(|p| name == *p) {
      return GarbageVerdict::flagged(GarbageReason::EnvFile);
   }
   if CREDENTIAL_PATTERNS.iter().any(|p| name == *p || name.ends_with(p)) {
      return GarbageVerdict::flagged(GarbageReason::Credentials);
   }
   if BUILD_OUTPUT_DIRS.iter().any(|dir| path.contains(dir)) {
      return GarbageVerdict::flagged(GarbageReason::BuildOutput);
   }
   if EDITOR_TEMP_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
      return GarbageVerdict::flagged(GarbageReason::EditorTemp);
   }
   if COVERAGE_PATTERNS.iter().any(|p| path.contains(p)) {
      return GarbageVerdict::flagged(GarbageReason::CoverageArtifact);
   }

   GarbageVerdict::CLEAN
}

/// Partitions changes into (clean, garbage) while preserving order.
pub fn partition(changes: &[FileChange]) -> (Vec<FileChange>, Vec<(FileChange, GarbageReason)>) {
   let mut clean = Vec::new();
   let mut garbage = Vec::new();
   for change in changes {
      match classify(change).reason {
         Some(reason) => garbage.push((change.clone(), reason)),
         None => clean.push(change.clone()),
      }
   }
   (clean, garbage)
}
