//! Comparison logic for fixture testing.

use super::fixture::{Golden, GoldenGroup};

/// Result of comparing actual garbage/grouping output to golden.
#[derive(Debug, Clone)]
pub struct CompareResult {
   pub garbage_match: bool,
   pub groups_match:  bool,
   pub passed:        bool,
   pub summary:       String,
}

/// Compare actual garbage paths and groups against a golden fixture.
///
/// Garbage-path mismatches are a hard failure; group mismatches are reported
/// but don't fail on their own, since grouping is sensitive to
/// `min_group_size` tuning that a fixture may not have pinned down yet.
pub fn compare_run(golden: &Golden, garbage_paths: &[String], groups: &[GoldenGroup]) -> CompareResult {
   let mut golden_garbage = golden.garbage_paths.clone();
   let mut actual_garbage = garbage_paths.to_vec();
   golden_garbage.sort();
   actual_garbage.sort();
   let garbage_match = golden_garbage == actual_garbage;

   let mut golden_groups = golden.groups.clone();
   let mut actual_groups = groups.to_vec();
   golden_groups.sort_by(|a, b| a.package.cmp(&b.package));
   actual_groups.sort_by(|a, b| a.package.cmp(&b.package));
   let groups_match = golden_groups == actual_groups;

   let passed = garbage_match;

   let summary = if garbage_match && groups_match {
      format!("✓ {} garbage, {} group(s)", garbage_paths.len(), groups.len())
   } else if garbage_match {
      format!("≈ garbage ok, groups differ: {} golden vs {} actual", golden.groups.len(), groups.len())
   } else {
      format!("✗ garbage: {} golden vs {} actual", golden.garbage_paths.len(), garbage_paths.len())
   };

   CompareResult { garbage_match, groups_match, passed, summary }
}

#[cfg(test)]
mod tests {
   use super::*;

   fn group(package: &str, commit_type: &str, file_count: usize) -> GoldenGroup {
      GoldenGroup { package: package.to_string(), commit_type: commit_type.to_string(), file_count }
   }

   #[test]
   fn test_compare_exact_match() {
      let golden = Golden { garbage_paths: vec![".env".to_string()], groups: vec![group("api", "feat", 2)] };
      let result = compare_run(&golden, &[".env".to_string()], &[group("api", "feat", 2)]);
      assert!(result.passed);
      assert!(result.garbage_match);
      assert!(result.groups_match);
   }

   #[test]
   fn test_compare_garbage_mismatch_fails() {
      let golden = Golden { garbage_paths: vec![".env".to_string()], groups: vec![] };
      let result = compare_run(&golden, &[], &[]);
      assert!(!result.passed);
      assert!(!result.garbage_match);
   }

   #[test]
   fn test_compare_group_mismatch_is_not_fatal() {
      let golden = Golden { garbage_paths: vec![], groups: vec![group("api", "feat", 2)] };
      let result = compare_run(&golden, &[], &[group("api", "fix", 2)]);
      assert!(result.passed);
      assert!(!result.groups_match);
   }

   #[test]
   fn test_compare_ignores_order() {
      let golden = Golden { garbage_paths: vec!["a".to_string(), "b".to_string()], groups: vec![] };
      let result = compare_run(&golden, &["b".to_string(), "a".to_string()], &[]);
      assert!(result.garbage_match);
   }
}
