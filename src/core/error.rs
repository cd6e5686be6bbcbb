//! Error types for xliff-sync with contextual messages and exit codes
//!
//! Every pipeline stage returns `SyncResult<T>`. Errors carry an exit code so
//! a CI job can tell a misconfiguration apart from a failed push, and most
//! carry a help line printed under the message.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for xliff-sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, regeneration, network, I/O)
  System = 2,
  /// Validation failure (SSH key, unresolvable state)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for xliff-sync
#[derive(Debug)]
pub enum SyncError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Validation errors (SSH key, credentials)
  Validation(ValidationError),

  /// External regeneration procedure failed for one artifact
  Regenerate {
    xliff: PathBuf,
    markdown: PathBuf,
    reason: String,
  },

  /// One or more upload targets failed
  Upload { failures: Vec<UploadFailure> },

  /// HTTP transport errors
  Http(reqwest::Error),

  /// I/O errors
  Io(io::Error),

  /// Any other error with a line of context in front of it
  ///
  /// Keeps the inner error's exit code and help.
  Context { context: String, source: Box<SyncError> },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

/// A single failed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
  pub file_id: u64,
  pub path: PathBuf,
  pub reason: String,
}

impl SyncError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    SyncError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    SyncError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      SyncError::Message { message, context, help } => SyncError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      other => SyncError::Context {
        context: ctx_str,
        source: Box::new(other),
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      SyncError::Config(_) => ExitCode::User,
      SyncError::Git(GitError::NoPriorState { .. }) => ExitCode::Validation,
      SyncError::Git(_) => ExitCode::System,
      SyncError::Validation(_) => ExitCode::Validation,
      SyncError::Regenerate { .. } => ExitCode::System,
      SyncError::Upload { .. } => ExitCode::System,
      SyncError::Http(_) => ExitCode::System,
      SyncError::Io(_) => ExitCode::System,
      SyncError::Context { source, .. } => source.exit_code(),
      SyncError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      SyncError::Config(e) => e.help_message(),
      SyncError::Git(e) => e.help_message(),
      SyncError::Validation(e) => e.help_message(),
      SyncError::Regenerate { .. } => Some(
        "No commits were made. Fix the regeneration command (see [regenerate] in xliff-sync.toml) and re-run."
          .to_string(),
      ),
      SyncError::Upload { .. } => Some(
        "Commits were already pushed. Re-run the failed uploads with `xliff-sync upload --since <after>`, \
         where <after> is the commit checked out before the sync commits (the run's --after)."
          .to_string(),
      ),
      SyncError::Context { source, .. } => source.help_message(),
      SyncError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for SyncError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SyncError::Config(e) => write!(f, "{}", e),
      SyncError::Git(e) => write!(f, "{}", e),
      SyncError::Validation(e) => write!(f, "{}", e),
      SyncError::Regenerate {
        xliff,
        markdown,
        reason,
      } => write!(
        f,
        "Failed to regenerate {} from {}: {}",
        xliff.display(),
        markdown.display(),
        reason
      ),
      SyncError::Upload { failures } => {
        write!(f, "{} upload(s) failed:", failures.len())?;
        for failure in failures {
          write!(
            f,
            "\n  - {} (file id {}): {}",
            failure.path.display(),
            failure.file_id,
            failure.reason
          )?;
        }
        Ok(())
      }
      SyncError::Http(e) => write!(f, "HTTP error: {}", e),
      SyncError::Io(e) => write!(f, "I/O error: {}", e),
      SyncError::Context { context, source } => write!(f, "{}: {}", context, source),
      SyncError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for SyncError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      SyncError::Io(e) => Some(e),
      SyncError::Http(e) => Some(e),
      SyncError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for SyncError {
  fn from(err: io::Error) -> Self {
    SyncError::Io(err)
  }
}

impl From<String> for SyncError {
  fn from(msg: String) -> Self {
    SyncError::message(msg)
  }
}

impl From<&str> for SyncError {
  fn from(msg: &str) -> Self {
    SyncError::message(msg)
  }
}

impl From<reqwest::Error> for SyncError {
  fn from(err: reqwest::Error) -> Self {
    SyncError::Http(err)
  }
}

impl From<toml_edit::de::Error> for SyncError {
  fn from(err: toml_edit::de::Error) -> Self {
    SyncError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for SyncError {
  fn from(err: toml_edit::ser::Error) -> Self {
    SyncError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for SyncError {
  fn from(err: serde_json::Error) -> Self {
    SyncError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for SyncError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    SyncError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<tempfile::PersistError> for SyncError {
  fn from(err: tempfile::PersistError) -> Self {
    SyncError::Io(err.error)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file exists but could not be parsed
  Invalid { path: PathBuf, reason: String },

  /// Missing required field or environment variable
  MissingField { field: String },

  /// init refused to overwrite an existing file
  AlreadyExists { path: PathBuf },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { .. } => Some("Run `xliff-sync init` in a scratch directory to see a valid config.".to_string()),
      ConfigError::MissingField { field } => Some(format!(
        "Set {} in the environment or in xliff-sync.toml before running with --apply.",
        field
      )),
      ConfigError::AlreadyExists { .. } => Some("Remove or edit the existing file instead.".to_string()),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required configuration: {}", field)
      }
      ConfigError::AlreadyExists { path } => {
        write!(f, "Configuration already exists: {}", path.display())
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// A ref could not be resolved to a commit
  UnresolvedRef { reference: String },

  /// The "before" ref is absent or all-zero and policy is to fail fast
  NoPriorState { reference: String },

  /// Commit failed after some files were already committed
  CommitFailed {
    file: PathBuf,
    committed: Vec<String>,
    reason: String,
  },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
    unpublished: Vec<String>,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, unpublished, .. } => {
        let mut help = format!(
          "{} local commit(s) were left unpublished; nothing was uploaded.",
          unpublished.len()
        );
        if reason.contains("non-fast-forward") || reason.contains("fetch first") {
          help.push_str(" The remote moved on; re-run the job on the newer push.");
        } else if reason.contains("Permission denied") || reason.contains("403") {
          help.push_str(" Check that the deploy key has write access to the repository.");
        }
        Some(help)
      }
      GitError::CommitFailed { committed, .. } if !committed.is_empty() => Some(format!(
        "{} commit(s) were created before the failure and left in place.",
        committed.len()
      )),
      GitError::RepoNotFound { path } => Some(format!(
        "Run inside a git checkout or pass --repo (tried: {})",
        path.display()
      )),
      GitError::UnresolvedRef { .. } => {
        Some("Make sure the checkout has full history (e.g. fetch-depth: 0).".to_string())
      }
      GitError::NoPriorState { .. } => Some(
        "This looks like the first push to the branch. Set `initial_push = \"empty\"` under [detect] to treat it as having no changes."
          .to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::UnresolvedRef { reference } => {
        write!(f, "Cannot resolve '{}' to a commit", reference)
      }
      GitError::NoPriorState { reference } => {
        write!(f, "No prior commit to diff against (before = '{}')", reference)
      }
      GitError::CommitFailed { file, reason, .. } => {
        write!(f, "Failed to commit {}: {}", file.display(), reason)
      }
      GitError::PushFailed {
        remote, branch, reason, ..
      } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason)
      }
    }
  }
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Deploy key could not be installed or the host key could not be registered
  SshKey { message: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::SshKey { .. } => Some(
        "Check that the deploy key secret holds a full private key and that ssh-keyscan can reach the host."
          .to_string(),
      ),
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::SshKey { message } => {
        write!(f, "SSH identity setup failed: {}", message)
      }
    }
  }
}

/// Result type alias for xliff-sync
pub type SyncResult<T> = Result<T, SyncError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> SyncResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> SyncResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<SyncError>,
{
  fn context(self, ctx: impl Into<String>) -> SyncResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> SyncResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &SyncError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
