//! `xliff-sync update` - regenerate xliff files for the given markdown files
//!
//! Only rewrites the working tree; nothing is committed or pushed.

use crate::core::context::RunContext;
use crate::core::error::{ResultExt, SyncError, SyncResult};
use crate::pipeline::detect::ChangedFile;
use crate::pipeline::update::{CommandRegenerator, SyncUpdater};
use std::path::{Path, PathBuf};

pub fn run_update(ctx: &RunContext, files: Vec<PathBuf>) -> SyncResult<()> {
  let root = ctx.root();
  let cwd = std::env::current_dir().context("Failed to get current directory")?;
  let changed = files
    .iter()
    .map(|file| relative_to_root(root, &cwd, file).map(|path| ChangedFile { path }))
    .collect::<SyncResult<Vec<_>>>()?;

  let regenerator = CommandRegenerator::new(&ctx.config.regenerate, root);
  let outcomes = SyncUpdater::new(root, &ctx.config.docs, &regenerator, false).update(&changed)?;

  let regenerated = outcomes.iter().filter(|o| o.is_regenerated()).count();
  println!("\n✅ {} of {} xliff file(s) regenerated", regenerated, outcomes.len());
  Ok(())
}

/// Turn a command-line path (relative to `cwd`, or absolute) into a path
/// relative to the repository root
///
/// Both sides are canonicalized, so a root reached through a symlink still
/// matches.
fn relative_to_root(root: &Path, cwd: &Path, file: &Path) -> SyncResult<PathBuf> {
  let absolute = cwd.join(file);
  let resolved = absolute
    .canonicalize()
    .with_context(|| format!("Cannot find {}", absolute.display()))?;
  let root = root
    .canonicalize()
    .with_context(|| format!("Cannot resolve repository root {}", root.display()))?;

  resolved.strip_prefix(&root).map(Path::to_path_buf).map_err(|_| {
    SyncError::with_help(
      format!("{} is outside the repository", file.display()),
      format!("Pass markdown files inside {}", root.display()),
    )
  })
}
