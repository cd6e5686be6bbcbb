//! `xliff-sync init` - write a default configuration file

use crate::core::config::SyncConfig;
use crate::core::error::{ConfigError, SyncError, SyncResult};
use crate::core::vcs::SystemGit;
use std::path::Path;

pub fn run_init(repo: &Path, force: bool) -> SyncResult<()> {
  let git = SystemGit::open(repo)?;
  let root = git.work_tree();

  if let Some(existing) = SyncConfig::find_config_path(root)
    && !force
  {
    return Err(SyncError::Config(ConfigError::AlreadyExists { path: existing }));
  }

  let path = SyncConfig::default().save(root)?;
  println!("✅ Wrote {}", path.display());
  println!("   Defaults match the NVDA user documentation layout; edit as needed.");
  Ok(())
}
