//! Commit Publisher: one commit per changed artifact, then push
//!
//! Nothing is rolled back on failure: commits made before a failed commit
//! or push stay in the local checkout and are reported by SHA.

use crate::core::config::{Credentials, DocsConfig, GitConfig};
use crate::core::error::{GitError, SyncError, SyncResult, ValidationError};
use crate::core::ssh::SshIdentity;
use crate::core::vcs::SystemGit;
use crate::utils;
use serde::Serialize;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedFile {
  pub path: PathBuf,
  pub sha: String,
}

/// Proof that new commits reached the remote
///
/// Only a successful push creates one, and the Upload Dispatcher requires
/// it, so uploads cannot run after a failed push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushedState {
  base: String,
  head: String,
}

impl PushedState {
  /// Commit the checkout was at before publishing
  pub fn base(&self) -> &str {
    &self.base
  }

  /// Commit that was pushed
  pub fn head(&self) -> &str {
    &self.head
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishOutcome {
  pub commits: Vec<CommittedFile>,
  /// None when there was nothing to commit
  pub pushed: Option<PushedState>,
}

pub struct CommitPublisher<'a> {
  git: &'a SystemGit,
  docs: &'a DocsConfig,
  git_config: &'a GitConfig,
  credentials: &'a Credentials,
  quiet: bool,
}

impl<'a> CommitPublisher<'a> {
  pub fn new(
    git: &'a SystemGit,
    docs: &'a DocsConfig,
    git_config: &'a GitConfig,
    credentials: &'a Credentials,
    quiet: bool,
  ) -> Self {
    Self {
      git,
      docs,
      git_config,
      credentials,
      quiet,
    }
  }

  /// Commit every artifact that differs from HEAD and push the result
  pub fn publish(&self) -> SyncResult<PublishOutcome> {
    let base = self.git.head_commit()?;
    let changed = self.git.diff_worktree_names(&self.docs.xliff_pathspec())?;

    if changed.is_empty() {
      if !self.quiet {
        println!("   ✅ No xliff files changed, nothing to commit");
      }
      return Ok(PublishOutcome {
        commits: Vec::new(),
        pushed: None,
      });
    }

    // Push credentials are resolved before anything is committed
    let identity = self.ssh_identity()?;

    self
      .git
      .set_identity(&self.git_config.user_name, &self.git_config.user_email)?;

    let mut commits: Vec<CommittedFile> = Vec::with_capacity(changed.len());
    for path in changed {
      let message = commit_message(&path);
      let result = self
        .git
        .add(&path)
        .and_then(|_| self.git.commit_path(&path, &message));

      match result {
        Ok(sha) => {
          if !self.quiet {
            println!("   📦 {} ({})", message, &sha[..8.min(sha.len())]);
          }
          commits.push(CommittedFile { path, sha });
        }
        Err(err) => {
          return Err(SyncError::Git(GitError::CommitFailed {
            file: path,
            committed: commits.into_iter().map(|c| c.sha).collect(),
            reason: err.to_string(),
          }));
        }
      }
    }

    let head = self.git.head_commit()?;
    let unpublished = || commits.iter().map(|c| c.sha.clone()).collect::<Vec<_>>();

    let ssh_command: Option<OsString> = identity.as_ref().map(SshIdentity::git_ssh_command);
    let envs: Vec<(&str, &std::ffi::OsStr)> = ssh_command
      .as_deref()
      .map(|cmd| vec![("GIT_SSH_COMMAND", cmd)])
      .unwrap_or_default();

    if !self.quiet {
      println!("   Pushing to '{}/{}'...", self.git_config.remote, self.git_config.branch);
    }
    self
      .git
      .push_head(&self.git_config.remote, &self.git_config.branch, &envs)
      .map_err(|err| match err {
        SyncError::Git(GitError::PushFailed {
          remote, branch, reason, ..
        }) => SyncError::Git(GitError::PushFailed {
          remote,
          branch,
          reason,
          unpublished: unpublished(),
        }),
        other => other,
      })?;

    if !self.quiet {
      println!("   ✅ Pushed {} commit(s)", commits.len());
    }

    Ok(PublishOutcome {
      commits,
      pushed: Some(PushedState { base, head }),
    })
  }

  /// Install the deploy key, if one was supplied
  ///
  /// Without a deploy key the push relies on whatever credentials the
  /// checkout already has (local remotes, credential helpers).
  fn ssh_identity(&self) -> SyncResult<Option<SshIdentity>> {
    let Some(key) = self.credentials.deploy_key.as_ref() else {
      log::debug!("no deploy key supplied, pushing with ambient credentials");
      return Ok(None);
    };

    let host = match &self.git_config.ssh_host {
      Some(host) => host.clone(),
      None => {
        let url = self.git.remote_url(&self.git_config.remote)?.ok_or_else(|| {
          SyncError::with_help(
            format!("Remote '{}' is not configured", self.git_config.remote),
            "Set [git].remote in xliff-sync.toml to an existing remote",
          )
        })?;
        if utils::is_local_path(&url) {
          log::debug!("remote {} is a local path, deploy key not needed", url);
          return Ok(None);
        }
        utils::ssh_host_from_url(&url).ok_or_else(|| {
          SyncError::Validation(ValidationError::SshKey {
            message: format!("cannot derive an SSH host from remote URL '{}'; set [git].ssh_host", url),
          })
        })?
      }
    };

    SshIdentity::install(key, &host).map(Some)
  }
}

/// Commit message for one artifact
pub fn commit_message(path: &std::path::Path) -> String {
  format!("Update {}", utils::path_to_git_format(path))
}
