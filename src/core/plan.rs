//! Plans for reviewable, dry-run-first pipeline runs
//!
//! A run first produces a `Plan` from read-only git queries, then either
//! prints it (dry-run, the default) or executes the pipeline.
//!
//! - **Dry-run mode**: show what will happen without doing it
//! - **Idempotency**: same refs + same tree -> same plan id
//! - **Auditability**: plans are JSON-serializable for CI logs
//!
//! Commit and upload entries are conditional: a commit only happens when
//! regeneration actually changed the artifact, and an upload only when that
//! commit touched an upload target.

use crate::core::error::SyncResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of the operations)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// Operation a run would perform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
  /// Regenerate an existing artifact from its markdown source
  Regenerate { markdown: String, xliff: String },

  /// Changed markdown without an artifact; nothing happens
  SkipMissingXliff { markdown: String, xliff: String },

  /// One commit for one artifact (only if regeneration changed it)
  CommitFile { path: String, message: String },

  /// Push the new commits
  Push { remote: String, branch: String },

  /// Upload an artifact (only if the push modified it)
  Upload { file_id: u64, path: String },
}

impl Operation {
  pub fn is_mutating(&self) -> bool {
    !matches!(self, Operation::SkipMissingXliff { .. })
  }
}

/// A plan represents the sequence of operations a run would perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  pub id: PlanId,

  /// When the plan was built (not part of the id)
  pub created_at: DateTime<Utc>,

  /// Resolved "before" commit, or None when there is no prior state
  pub before: Option<String>,

  /// Resolved "after" commit
  pub after: String,

  /// Operations to perform (in order)
  pub operations: Vec<Operation>,
}

impl Plan {
  /// Create a new empty plan
  pub fn new(before: Option<String>, after: impl Into<String>) -> Self {
    let mut plan = Self {
      id: PlanId::from_contents(&[]),
      created_at: Utc::now(),
      before,
      after: after.into(),
      operations: Vec::new(),
    };
    plan.recompute_id();
    plan
  }

  /// Add an operation to the plan
  pub fn add_operation(&mut self, operation: Operation) {
    self.operations.push(operation);
    self.recompute_id();
  }

  /// Recompute plan ID from refs and operations
  fn recompute_id(&mut self) {
    let json = serde_json::to_vec(&(&self.before, &self.after, &self.operations)).unwrap_or_default();
    self.id = PlanId::from_contents(&json);
  }

  /// Serialize to JSON
  pub fn to_json(&self) -> SyncResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// Whether executing this plan could change anything
  pub fn has_work(&self) -> bool {
    self.operations.iter().any(Operation::is_mutating)
  }

  pub fn count<F>(&self, pred: F) -> usize
  where
    F: Fn(&Operation) -> bool,
  {
    self.operations.iter().filter(|op| pred(op)).count()
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📋 Plan: xliff sync ({})\n", self.id));
    output.push_str(&format!(
      "   Range: {}..{}\n",
      self.before.as_deref().map(short_sha).unwrap_or("(none)"),
      short_sha(&self.after)
    ));

    if self.operations.is_empty() {
      output.push_str("\n   Nothing to do: no documentation sources changed\n");
      return output;
    }

    output.push_str(&format!("\n   Operations ({}):\n", self.operations.len()));

    for (i, op) in self.operations.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, operation_to_string(op)));
    }

    if self.has_work() {
      output.push_str("\n   Commit and upload steps run only for artifacts that actually change.\n");
      output.push_str("   Re-run with --apply to execute.\n");
    }

    output
  }
}

fn short_sha(sha: &str) -> &str {
  &sha[..8.min(sha.len())]
}

/// Convert operation to human-readable string
fn operation_to_string(op: &Operation) -> String {
  match op {
    Operation::Regenerate { markdown, xliff } => format!("Regenerate {} from {}", xliff, markdown),
    Operation::SkipMissingXliff { markdown, xliff } => {
      format!("Skip {} (no {})", markdown, xliff)
    }
    Operation::CommitFile { message, .. } => format!("Commit \"{}\"", message),
    Operation::Push { remote, branch } => format!("Push to {}/{}", remote, branch),
    Operation::Upload { file_id, path } => format!("Upload {} as file {}", path, file_id),
  }
}
