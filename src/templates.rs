//! Markdown artifact rendering for the Smart Commit Pipeline (spec.md §4.9
//! stage 5), built on embedded Tera templates with a user-override directory.
//!
//! The teacher used this same embedded-plus-override Tera setup to render AI
//! prompts. This crate's AI prompts are inline strings instead (see
//! `api.rs`/`pr_description.rs`/`smart_commit.rs`), so only the markdown
//! artifact template survives here.

use std::{
   path::{Path, PathBuf},
   sync::LazyLock,
};

use parking_lot::Mutex;
use rust_embed::RustEmbed;
use tera::{Context, Tera};

use crate::error::{FlowError, Result};

#[derive(RustEmbed)]
#[folder = "prompts/"]
struct Prompts;

static TERA: LazyLock<Mutex<Tera>> = LazyLock::new(|| {
   let mut tera = Tera::default();

   if let Some(dir) = user_templates_dir() {
      if let Err(e) = register_directory_templates(&mut tera, &dir.join("artifact"), "artifact") {
         eprintln!("Warning: {e}");
      }
   }

   for file in Prompts::iter() {
      if tera.get_template_names().any(|name| name == file.as_ref()) {
         continue;
      }
      if let Some(embedded) = Prompts::get(file.as_ref()) {
         match std::str::from_utf8(embedded.data.as_ref()) {
            Ok(content) => {
               if let Err(e) = tera.add_raw_template(file.as_ref(), content) {
                  eprintln!("Warning: failed to register embedded template {}: {e}", file.as_ref());
               }
            },
            Err(e) => eprintln!("Warning: embedded template {} is not valid UTF-8: {e}", file.as_ref()),
         }
      }
   }

   tera.autoescape_on(vec![]);
   Mutex::new(tera)
});

fn user_templates_dir() -> Option<PathBuf> {
   std::env::var("HOME")
      .or_else(|_| std::env::var("USERPROFILE"))
      .ok()
      .map(|home| PathBuf::from(home).join(".config/flowgit/templates"))
}

fn register_directory_templates(tera: &mut Tera, directory: &Path, category: &str) -> Result<()> {
   if !directory.exists() {
      return Ok(());
   }

   for entry in std::fs::read_dir(directory)
      .map_err(|e| FlowError::Other(format!("failed to read {category} templates directory {}: {e}", directory.display())))?
   {
      let entry = match entry {
         Ok(entry) => entry,
         Err(e) => {
            eprintln!("Warning: failed to iterate template entry in {}: {e}", directory.display());
            continue;
         },
      };

      let path = entry.path();
      if path.extension().and_then(|s| s.to_str()) != Some("tera") {
         continue;
      }

      let template_name = format!("{category}/{}", path.file_name().and_then(|s| s.to_str()).unwrap_or_default());
      if let Err(e) = tera.add_template_file(&path, Some(&template_name)) {
         eprintln!("Warning: failed to load template file {}: {e}", path.display());
      }
   }

   Ok(())
}

/// One rendered commit entry for the artifact template.
#[derive(serde::Serialize)]
pub struct ArtifactCommit {
   pub hash:    String,
   pub message: String,
   pub files:   Vec<String>,
}

/// Renders the Smart Commit Pipeline's markdown summary artifact.
pub fn render_artifact(
   task_id: &str,
   template: &str,
   timestamp: &str,
   commits: &[ArtifactCommit],
   garbage: &[String],
) -> Result<String> {
   let mut context = Context::new();
   context.insert("task_id", task_id);
   context.insert("template", template);
   context.insert("timestamp", timestamp);
   context.insert("commits", commits);
   context.insert("garbage", garbage);

   let mut tera = TERA.lock();
   tera
      .render("artifact/summary.md.tera", &context)
      .map_err(|e| FlowError::Other(format!("failed to render artifact template: {e}")))
}
