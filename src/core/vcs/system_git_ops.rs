//! Diffing, staging, committing and pushing for SystemGit

use super::system_git::SystemGit;
use crate::core::error::{GitError, SyncError, SyncResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

impl SystemGit {
  /// Paths matching `pathspec` that differ between two commits, in diff order
  pub fn diff_names(&self, from: &str, to: &str, pathspec: &str) -> SyncResult<Vec<PathBuf>> {
    let stdout = self.run(["diff", "--name-only", "--no-renames", from, to, "--", pathspec])?;
    Ok(parse_name_list(&stdout))
  }

  /// Paths matching `pathspec` whose working-tree content differs from HEAD
  pub fn diff_worktree_names(&self, pathspec: &str) -> SyncResult<Vec<PathBuf>> {
    let stdout = self.run(["diff", "--name-only", "--no-renames", "HEAD", "--", pathspec])?;
    Ok(parse_name_list(&stdout))
  }

  /// Whether a single path differs between two commits
  pub fn path_changed_between(&self, from: &str, to: &str, path: &Path) -> SyncResult<bool> {
    let output = self.output(
      &[
        OsStr::new("diff"),
        OsStr::new("--quiet"),
        OsStr::new(from),
        OsStr::new(to),
        OsStr::new("--"),
        path.as_os_str(),
      ],
      &[],
    )?;

    // --quiet: 0 = no change, 1 = changed, anything else = error
    match output.status.code() {
      Some(0) => Ok(false),
      Some(1) => Ok(true),
      _ => Err(SyncError::Git(GitError::CommandFailed {
        command: format!("git diff --quiet {} {} -- {}", from, to, path.display()),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      })),
    }
  }

  /// Set the committer identity in the repository config
  pub fn set_identity(&self, name: &str, email: &str) -> SyncResult<()> {
    self.run(["config", "user.name", name])?;
    self.run(["config", "user.email", email])?;
    Ok(())
  }

  /// Stage a single path
  pub fn add(&self, path: &Path) -> SyncResult<()> {
    self.run([OsStr::new("add"), OsStr::new("--"), path.as_os_str()])?;
    Ok(())
  }

  /// Commit only the given path, returning the new commit SHA
  pub fn commit_path(&self, path: &Path, message: &str) -> SyncResult<String> {
    self.run([
      OsStr::new("commit"),
      OsStr::new("--no-verify"),
      OsStr::new("-m"),
      OsStr::new(message),
      OsStr::new("--"),
      path.as_os_str(),
    ])?;
    self.head_commit()
  }

  /// Get remote URL
  pub fn remote_url(&self, name: &str) -> SyncResult<Option<String>> {
    let output = self.output(&["remote", "get-url", name], &[])?;
    if !output.status.success() {
      return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
  }

  /// Push HEAD to `remote/branch`
  ///
  /// `envs` is passed through to git only for this call, which is how a
  /// transient SSH identity is applied.
  pub fn push_head(&self, remote: &str, branch: &str, envs: &[(&str, &OsStr)]) -> SyncResult<()> {
    let refspec = format!("HEAD:refs/heads/{}", branch);
    let output = self.output(&["push", remote, refspec.as_str()], envs)?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(SyncError::Git(GitError::PushFailed {
        remote: remote.to_string(),
        branch: branch.to_string(),
        reason: stderr.trim().to_string(),
        unpublished: vec![],
      }));
    }

    Ok(())
  }
}

fn parse_name_list(stdout: &str) -> Vec<PathBuf> {
  stdout
    .lines()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(PathBuf::from)
    .collect()
}
