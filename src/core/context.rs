//! Run context - build once, pass everywhere
//!
//! ```text
//! main.rs:
//!   RunContext::build() -> &RunContext
//!   |
//!   v
//! commands/*.rs, pipeline stages:
//!   fn execute(ctx: &RunContext)
//! ```
//!
//! Configuration and credentials are read exactly once here; no stage looks
//! at the environment on its own.

use crate::core::config::{Credentials, SyncConfig};
use crate::core::error::SyncResult;
use crate::core::vcs::SystemGit;
use std::path::Path;

pub struct RunContext {
  /// Repository handle (working tree root is the base for every relative path)
  pub git: SystemGit,

  /// xliff-sync.toml, or defaults
  pub config: SyncConfig,

  /// Secrets read from the environment
  pub credentials: Credentials,
}

impl RunContext {
  /// Open the repository containing `repo_path` and load config + credentials
  pub fn build(repo_path: &Path) -> SyncResult<Self> {
    let git = SystemGit::open(repo_path)?;
    let config = SyncConfig::load(git.work_tree())?;
    let credentials = Credentials::from_env(&config);

    Ok(Self {
      git,
      config,
      credentials,
    })
  }

  /// Build from already-loaded parts
  #[cfg(test)]
  pub fn from_parts(git: SystemGit, config: SyncConfig, credentials: Credentials) -> Self {
    Self {
      git,
      config,
      credentials,
    }
  }

  /// Repository root
  pub fn root(&self) -> &Path {
    self.git.work_tree()
  }
}
