//! Linear four-stage pipeline: detect -> update -> publish -> upload
//!
//! Each stage either succeeds or ends the run; nothing loops back or retries.

use crate::core::context::RunContext;
use crate::core::error::{SyncError, SyncResult};
use crate::core::plan::{Operation, Plan};
use crate::pipeline::detect::{ChangeDetector, Detection};
use crate::pipeline::publish::{CommitPublisher, PublishOutcome, commit_message};
use crate::pipeline::update::{SyncUpdater, UpdateOutcome, XliffRegenerator};
use crate::pipeline::upload::{TranslationService, UploadDispatcher, UploadOutcome};
use crate::utils;
use serde::Serialize;

/// Everything a run did, in stage order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub plan: Plan,
  pub updates: Vec<UpdateOutcome>,
  pub publish: Option<PublishOutcome>,
  pub uploads: Vec<UploadOutcome>,
}

impl RunReport {
  pub fn commit_count(&self) -> usize {
    self.publish.as_ref().map(|p| p.commits.len()).unwrap_or(0)
  }

  pub fn upload_count(&self) -> usize {
    self
      .uploads
      .iter()
      .filter(|u| matches!(u, UploadOutcome::Uploaded { .. }))
      .count()
  }
}

pub struct Pipeline<'a> {
  ctx: &'a RunContext,
  regenerator: &'a dyn XliffRegenerator,
  service: &'a dyn TranslationService,
  quiet: bool,
}

impl<'a> Pipeline<'a> {
  pub fn new(
    ctx: &'a RunContext,
    regenerator: &'a dyn XliffRegenerator,
    service: &'a dyn TranslationService,
    quiet: bool,
  ) -> Self {
    Self {
      ctx,
      regenerator,
      service,
      quiet,
    }
  }

  /// Stage 1 only
  pub fn detect(&self, before: Option<&str>, after: &str) -> SyncResult<Detection> {
    let config = &self.ctx.config;
    ChangeDetector::new(&self.ctx.git, &config.docs, config.detect.initial_push).detect(before, after)
  }

  /// Build the plan for a detection without touching anything
  pub fn plan(&self, detection: &Detection) -> Plan {
    let config = &self.ctx.config;
    let mut plan = Plan::new(detection.before.clone(), detection.after.clone());
    let mut regenerated = Vec::new();

    for file in &detection.files {
      let xliff = config.docs.xliff_path_for(&file.path);
      let markdown = utils::path_to_git_format(&file.path);
      let xliff_str = utils::path_to_git_format(&xliff);
      if self.ctx.root().join(&xliff).is_file() {
        plan.add_operation(Operation::Regenerate {
          markdown,
          xliff: xliff_str,
        });
        regenerated.push(xliff);
      } else {
        plan.add_operation(Operation::SkipMissingXliff {
          markdown,
          xliff: xliff_str,
        });
      }
    }

    if regenerated.is_empty() {
      return plan;
    }

    for xliff in &regenerated {
      plan.add_operation(Operation::CommitFile {
        path: utils::path_to_git_format(xliff),
        message: commit_message(xliff),
      });
    }

    plan.add_operation(Operation::Push {
      remote: config.git.remote.clone(),
      branch: config.git.branch.clone(),
    });

    for target in &config.translation.targets {
      let path = config.docs.dir.join(&target.file_name);
      if regenerated.contains(&path) {
        plan.add_operation(Operation::Upload {
          file_id: target.file_id,
          path: utils::path_to_git_format(&path),
        });
      }
    }

    plan
  }

  /// Detect and plan, then execute every stage in order
  pub fn run(&self, before: Option<&str>, after: &str) -> SyncResult<RunReport> {
    let config = &self.ctx.config;
    let git = &self.ctx.git;

    let detection = self.detect(before, after)?;
    let plan = self.plan(&detection);

    // Regeneration reads the working tree, so it must be the pushed commit
    let head = git.head_commit()?;
    if head != detection.after {
      return Err(SyncError::with_help(
        format!("Checkout is at {} but --after resolves to {}", head, detection.after),
        "Check out the pushed commit before running, or omit --after",
      ));
    }

    if !self.quiet {
      println!(
        "🔍 {} changed documentation source(s) since {}",
        detection.files.len(),
        detection.before.as_deref().unwrap_or("(no prior state)")
      );
    }

    if detection.files.is_empty() {
      return Ok(RunReport {
        plan,
        updates: Vec::new(),
        publish: None,
        uploads: Vec::new(),
      });
    }

    let updates = SyncUpdater::new(self.ctx.root(), &config.docs, self.regenerator, self.quiet).update(&detection.files)?;

    let publish = CommitPublisher::new(git, &config.docs, &config.git, &self.ctx.credentials, self.quiet).publish()?;

    let uploads = match publish.pushed.as_ref() {
      Some(pushed) => {
        UploadDispatcher::new(git, &config.docs, &config.translation.targets, self.service, self.quiet)
          .dispatch(pushed)?
      }
      None => Vec::new(),
    };

    Ok(RunReport {
      plan,
      updates,
      publish: Some(publish),
      uploads,
    })
  }
}
