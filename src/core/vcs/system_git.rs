//! System git backend
//!
//! Every operation shells out to the `git` binary with an isolated
//! environment and returns a typed result; callers never build command
//! strings themselves.

use crate::core::error::{GitError, SyncError, SyncResult, ResultExt};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using system git
pub struct SystemGit {
  /// Working tree root
  pub(crate) work_tree: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to find the working tree root.
  pub fn open(path: &Path) -> SyncResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(SyncError::Git(GitError::RepoNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(SyncError::message(format!("Failed to open git repository: {}", stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);

    Ok(Self {
      work_tree: PathBuf::from(stdout.trim()),
    })
  }

  /// Working tree root (absolute)
  pub fn work_tree(&self) -> &Path {
    &self.work_tree
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> SyncResult<String> {
    self.resolve_commit("HEAD")
  }

  /// Resolve any ref or SHA to a full commit SHA
  pub fn resolve_commit(&self, reference: &str) -> SyncResult<String> {
    let spec = format!("{}^{{commit}}", reference);
    let output = self
      .git_cmd()
      .args(["rev-parse", "--verify", "--quiet", &spec])
      .output()
      .context("Failed to run git rev-parse")?;

    if !output.status.success() {
      return Err(SyncError::Git(GitError::UnresolvedRef {
        reference: reference.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Run a git command and return stdout, mapping a non-zero exit to `GitError::CommandFailed`
  pub(crate) fn run<I, S>(&self, args: I) -> SyncResult<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    let args: Vec<S> = args.into_iter().collect();
    let output = self.output(&args, &[])?;
    Self::check(&args, output)
  }

  /// Run a git command with extra environment variables (e.g. GIT_SSH_COMMAND)
  pub(crate) fn output<S: AsRef<OsStr>>(&self, args: &[S], envs: &[(&str, &OsStr)]) -> SyncResult<Output> {
    let mut cmd = self.git_cmd();
    cmd.args(args);
    for (key, value) in envs {
      cmd.env(key, value);
    }
    log::debug!("git {}", describe(args));
    cmd
      .output()
      .with_context(|| format!("Failed to execute git {}", describe(args)))
  }

  pub(crate) fn check<S: AsRef<OsStr>>(args: &[S], output: Output) -> SyncResult<String> {
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      log::debug!("git {} exited with {}", describe(args), output.status);
      return Err(SyncError::Git(GitError::CommandFailed {
        command: format!("git {}", describe(args)),
        stderr: stderr.trim().to_string(),
      }));
    }
    Ok(String::from_utf8(output.stdout)?)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to the work tree
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.work_tree);

    // Isolated environment (don't trust ambient GIT_* variables)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

fn describe<S: AsRef<OsStr>>(args: &[S]) -> String {
  args
    .iter()
    .map(|a| a.as_ref().to_string_lossy().into_owned())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Whether a "before" ref means "no prior state" (absent or GitHub's all-zero SHA)
pub fn is_null_ref(reference: &str) -> bool {
  let trimmed = reference.trim();
  trimmed.is_empty() || trimmed.chars().all(|c| c == '0')
}
