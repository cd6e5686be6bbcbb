//! Change Detector: which English markdown sources did this push touch?

use crate::core::config::{DocsConfig, InitialPushPolicy};
use crate::core::error::{GitError, SyncError, SyncResult};
use crate::core::vcs::{SystemGit, is_null_ref};
use serde::Serialize;
use std::path::PathBuf;

/// A modified markdown document, relative to the repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangedFile {
  pub path: PathBuf,
}

/// Result of change detection over a resolved commit range
#[derive(Debug, Clone, Serialize)]
pub struct Detection {
  /// Resolved "before" commit; None when the push has no prior state
  pub before: Option<String>,
  /// Resolved "after" commit
  pub after: String,
  /// Changed sources in diff order
  pub files: Vec<ChangedFile>,
}

pub struct ChangeDetector<'a> {
  git: &'a SystemGit,
  docs: &'a DocsConfig,
  initial_push: InitialPushPolicy,
}

impl<'a> ChangeDetector<'a> {
  pub fn new(git: &'a SystemGit, docs: &'a DocsConfig, initial_push: InitialPushPolicy) -> Self {
    Self {
      git,
      docs,
      initial_push,
    }
  }

  /// Markdown files under the docs dir modified between `before` and `after`
  ///
  /// Both refs are resolved before anything else happens; an unresolvable
  /// ref fails the run. An absent or all-zero `before` is handled by the
  /// configured initial-push policy.
  pub fn detect(&self, before: Option<&str>, after: &str) -> SyncResult<Detection> {
    let after_sha = self.git.resolve_commit(after)?;

    let before = before.unwrap_or("");
    if is_null_ref(before) {
      return match self.initial_push {
        InitialPushPolicy::Fail => Err(SyncError::Git(GitError::NoPriorState {
          reference: before.to_string(),
        })),
        InitialPushPolicy::Empty => {
          log::debug!("no prior state for push, treating as no changes");
          Ok(Detection {
            before: None,
            after: after_sha,
            files: Vec::new(),
          })
        }
      };
    }

    let before_sha = self.git.resolve_commit(before)?;
    let files = self
      .git
      .diff_names(&before_sha, &after_sha, &self.docs.markdown_pathspec())?
      .into_iter()
      .map(|path| ChangedFile { path })
      .collect();

    Ok(Detection {
      before: Some(before_sha),
      after: after_sha,
      files,
    })
  }
}
