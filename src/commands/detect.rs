//! `xliff-sync detect` - list markdown sources changed between two refs

use crate::core::context::RunContext;
use crate::core::error::SyncResult;
use crate::pipeline::detect::ChangeDetector;

pub fn run_detect(ctx: &RunContext, before: String, after: String, json: bool) -> SyncResult<()> {
  let config = &ctx.config;
  let detection = ChangeDetector::new(&ctx.git, &config.docs, config.detect.initial_push).detect(Some(&before), &after)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&detection)?);
    return Ok(());
  }

  if detection.files.is_empty() {
    println!("✅ No files in {} changed", config.docs.dir.display());
    return Ok(());
  }

  println!("🔍 {} changed file(s):", detection.files.len());
  for file in &detection.files {
    println!("  - {}", file.path.display());
  }
  Ok(())
}
