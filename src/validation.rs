//! Small lexical helpers shared by the normalizer and the Smart Commit
//! Pipeline's type-heuristic and sanity-check logic.

use crate::types::CommitType;

/// Common code file extensions, used to tell a style/refactor commit apart
/// from one that only touched prose or config.
const CODE_EXTENSIONS: &[&str] = &[
   // Systems programming
   "rs", "c", "cpp", "cc", "cxx", "h", "hpp", "hxx", "zig", "nim", "v",
   // JVM languages
   "java", "kt", "kts", "scala", "groovy", "clj", "cljs",
   // .NET languages
   "cs", "fs", "vb",
   // Web/scripting
   "js", "ts", "jsx", "tsx", "mjs", "cjs", "vue", "svelte",
   // Python ecosystem
   "py", "pyx", "pxd", "pyi",
   // Ruby
   "rb", "rake", "gemspec",
   // PHP
   "php",
   // Go
   "go",
   // Swift/Objective-C
   "swift", "m", "mm",
   // Lua
   "lua",
   // Shell
   "sh", "bash", "zsh", "fish",
   // Perl
   "pl", "pm",
   // Haskell/ML family
   "hs", "lhs", "ml", "mli", "elm", "ex", "exs", "erl", "hrl",
   // Lisp family
   "lisp", "cl", "el", "scm", "rkt",
   // Julia
   "jl",
   // R
   "r",
   // Dart/Flutter
   "dart",
   // Crystal
   "cr",
   // D
   "d",
   // Fortran
   "f", "f90", "f95", "f03", "f08",
   // Ada
   "ada", "adb", "ads",
   // Cobol
   "cob", "cbl",
   // Assembly
   "asm", "s",
   // SQL (stored procs)
   "sql", "plsql",
   // Prolog
   "pro",
   // OCaml/ReasonML
   "re", "rei",
   // Nix
   "nix",
   // Terraform/HCL
   "tf", "hcl",
   // Solidity/blockchain
   "sol", "move", "cairo",
];

pub fn is_code_extension(ext: &str) -> bool {
   CODE_EXTENSIONS.iter().any(|&e| e.eq_ignore_ascii_case(ext))
}

/// Check if word is past-tense verb using morphology + common irregulars
pub fn is_past_tense_verb(word: &str) -> bool {
   if word.ends_with("ed") {
      const BLOCKLIST: &[&str] = &["hundred", "thousand", "red", "bed", "wed", "shed"];
      return !BLOCKLIST.contains(&word);
   }

   if word.len() >= 4 && word.ends_with('d') {
      let before_d = &word[word.len() - 2..word.len() - 1];
      if "aeiou".contains(before_d) {
         const D_BLOCKLIST: &[&str] = &[
            "and", "bad", "bid", "god", "had", "kid", "lad", "mad", "mid", "mud", "nod", "odd",
            "old", "pad", "raid", "said", "sad", "should", "would", "could",
         ];
         return !D_BLOCKLIST.contains(&word);
      }
   }

   const IRREGULAR: &[&str] = &[
      "made", "built", "ran", "wrote", "took", "gave", "found", "kept", "left", "felt", "meant",
      "sent", "spent", "lost", "held", "told", "sold", "stood", "understood", "became", "began",
      "brought", "bought", "caught", "taught", "thought", "fought", "sought", "chose", "came",
      "did", "got", "had", "knew", "met", "put", "read", "saw", "said", "set", "sat", "cut", "let",
      "hit", "hurt", "shut", "split", "spread", "bet", "cast", "cost", "quit",
   ];

   IRREGULAR.contains(&word)
}

/// Checks whether a commit's declared type looks consistent with the files
/// it actually touches, returning a human-readable warning if not. Used by
/// the Smart Commit Pipeline to surface a progress message without failing
/// the commit outright.
pub fn check_type_scope_consistency(commit_type: &CommitType, stat: &str) -> Option<String> {
   let paths: Vec<&str> = stat.lines().map(|line| line.split('\t').next().unwrap_or(line).trim()).collect();

   match commit_type.as_str() {
      "docs" => {
         let has_docs = paths.iter().any(|path| {
            let is_doc_file = std::path::Path::new(path)
               .extension()
               .and_then(|ext| ext.to_str())
               .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "md" | "mdx" | "adoc" | "asciidoc" | "rst" | "txt" | "org" | "tex" | "pod"));
            is_doc_file || path.to_lowercase().contains("/docs/") || path.to_lowercase().contains("readme")
         });
         (!has_docs).then(|| "commit type 'docs' but no documentation files changed".to_string())
      },
      "test" => {
         let has_test = paths.iter().any(|path| {
            let lower = path.to_lowercase();
            lower.contains("/test") || lower.contains("_test.") || lower.contains(".test.")
         });
         (!has_test).then(|| "commit type 'test' but no test files changed".to_string())
      },
      "style" => {
         let has_code = paths.iter().any(|path| {
            std::path::Path::new(path).extension().is_some_and(|ext| is_code_extension(ext.to_str().unwrap_or("")))
         });
         has_code.then(|| "commit type 'style' but code files changed (verify no logic changes)".to_string())
      },
      "ci" => {
         let has_ci = paths.iter().any(|path| {
            let lower = path.to_lowercase();
            lower.contains(".github/workflows") || lower.contains(".gitlab-ci") || lower.contains("jenkinsfile")
         });
         (!has_ci).then(|| "commit type 'ci' but no CI configuration files changed".to_string())
      },
      "build" => {
         let has_build = paths.iter().any(|path| {
            let lower = path.to_lowercase();
            lower.contains("cargo.toml") || lower.contains("package.json") || lower.contains("makefile") || lower.contains("build.")
         });
         (!has_build).then(|| "commit type 'build' but no build files (Cargo.toml, package.json) changed".to_string())
      },
      _ => None,
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_is_past_tense_verb_regular() {
      assert!(is_past_tense_verb("added"));
      assert!(is_past_tense_verb("fixed"));
      assert!(!is_past_tense_verb("add"));
   }

   #[test]
   fn test_is_past_tense_verb_blocklist() {
      assert!(!is_past_tense_verb("bed"));
      assert!(!is_past_tense_verb("hundred"));
   }

   #[test]
   fn test_is_past_tense_verb_irregular() {
      assert!(is_past_tense_verb("made"));
      assert!(is_past_tense_verb("built"));
      assert!(!is_past_tense_verb("make"));
   }

   #[test]
   fn test_is_code_extension() {
      assert!(is_code_extension("rs"));
      assert!(is_code_extension("RS"));
      assert!(!is_code_extension("md"));
   }

   #[test]
   fn test_check_type_scope_consistency_docs_mismatch() {
      let warning = check_type_scope_consistency(&CommitType::new("docs").unwrap(), "10\t2\tsrc/main.rs");
      assert!(warning.is_some());
   }

   #[test]
   fn test_check_type_scope_consistency_docs_match() {
      let warning = check_type_scope_consistency(&CommitType::new("docs").unwrap(), "10\t2\tREADME.md");
      assert!(warning.is_none());
   }

   #[test]
   fn test_check_type_scope_consistency_feat_never_warns() {
      let warning = check_type_scope_consistency(&CommitType::new("feat").unwrap(), "10\t2\tsrc/main.rs");
      assert!(warning.is_none());
   }
}
