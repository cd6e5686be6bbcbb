//! Upload Dispatcher: send modified well-known artifacts to the translation service
//!
//! Targets are handled independently: every target is attempted, and the
//! stage fails afterwards if any of them failed. Pushed commits are never
//! rolled back because of an upload failure.

use crate::core::config::{DocsConfig, UploadTarget};
use crate::core::error::{SyncError, SyncResult, UploadFailure};
use crate::core::vcs::SystemGit;
use crate::pipeline::publish::PushedState;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Client side of the translation-management service
pub trait TranslationService {
  /// Replace the source file `file_id` with the content at `path`
  fn upload_source_file(&self, file_id: u64, path: &Path) -> SyncResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadOutcome {
  Uploaded { file_id: u64, path: PathBuf },
  NotModified { file_id: u64, path: PathBuf },
  Failed { file_id: u64, path: PathBuf, reason: String },
}

pub struct UploadDispatcher<'a> {
  git: &'a SystemGit,
  docs: &'a DocsConfig,
  targets: &'a [UploadTarget],
  service: &'a dyn TranslationService,
  quiet: bool,
}

impl<'a> UploadDispatcher<'a> {
  pub fn new(
    git: &'a SystemGit,
    docs: &'a DocsConfig,
    targets: &'a [UploadTarget],
    service: &'a dyn TranslationService,
    quiet: bool,
  ) -> Self {
    Self {
      git,
      docs,
      targets,
      service,
      quiet,
    }
  }

  /// Upload every target the successful push modified
  pub fn dispatch(&self, pushed: &PushedState) -> SyncResult<Vec<UploadOutcome>> {
    self.dispatch_range(pushed.base(), pushed.head())
  }

  /// Upload every target modified between `base` and `head`
  ///
  /// Used directly only by the manual `upload` command, where the operator
  /// vouches that `head` is already published.
  pub fn dispatch_range(&self, base: &str, head: &str) -> SyncResult<Vec<UploadOutcome>> {
    let mut outcomes = Vec::with_capacity(self.targets.len());

    for target in self.targets {
      let path = self.docs.dir.join(&target.file_name);
      let outcome = self.dispatch_one(target, path, base, head);

      if !self.quiet {
        match &outcome {
          UploadOutcome::Uploaded { file_id, path } => {
            println!("   📤 Uploaded {} (file {})", path.display(), file_id)
          }
          UploadOutcome::NotModified { path, .. } => println!("   ⏭️  {} not modified, not uploading", path.display()),
          UploadOutcome::Failed { path, reason, .. } => {
            eprintln!("   ❌ Upload of {} failed: {}", path.display(), reason)
          }
        }
      }
      outcomes.push(outcome);
    }

    let failures: Vec<UploadFailure> = outcomes
      .iter()
      .filter_map(|o| match o {
        UploadOutcome::Failed { file_id, path, reason } => Some(UploadFailure {
          file_id: *file_id,
          path: path.clone(),
          reason: reason.clone(),
        }),
        _ => None,
      })
      .collect();

    if !failures.is_empty() {
      return Err(SyncError::Upload { failures });
    }

    Ok(outcomes)
  }

  fn dispatch_one(&self, target: &UploadTarget, path: PathBuf, base: &str, head: &str) -> UploadOutcome {
    let file_id = target.file_id;

    let modified = match self.git.path_changed_between(base, head, &path) {
      Ok(modified) => modified,
      Err(err) => {
        return UploadOutcome::Failed {
          file_id,
          path,
          reason: err.to_string(),
        };
      }
    };

    if !modified {
      return UploadOutcome::NotModified { file_id, path };
    }

    let abs = self.git.work_tree().join(&path);
    match self.service.upload_source_file(file_id, &abs) {
      Ok(()) => UploadOutcome::Uploaded { file_id, path },
      Err(err) => UploadOutcome::Failed {
        file_id,
        path,
        reason: err.to_string(),
      },
    }
  }
}
