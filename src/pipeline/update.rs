//! Sync Updater: regenerate existing interchange artifacts from changed sources
//!
//! Each artifact is rewritten through a temp file in the same directory and
//! renamed over the original, so a reader never sees a half-written xliff.
//! The first regeneration failure stops the whole stage.

use crate::core::config::{DocsConfig, RegenerateConfig};
use crate::core::error::{SyncError, SyncResult, ResultExt};
use crate::pipeline::detect::ChangedFile;
use crate::ui::progress::FileProgress;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// The external procedure that rebuilds an xliff from markdown
///
/// Implementations must keep the translation-unit ids of `existing_xliff`
/// for every segment that still exists in `markdown`, and write the result
/// to `output`.
pub trait XliffRegenerator {
  fn regenerate(&self, existing_xliff: &Path, markdown: &Path, output: &Path) -> SyncResult<()>;
}

/// What happened to one changed source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
  /// The artifact was rewritten with new content
  Regenerated { markdown: PathBuf, xliff: PathBuf },
  /// Regeneration produced byte-identical output; the artifact was left alone
  Unchanged { markdown: PathBuf, xliff: PathBuf },
  /// No artifact exists for this source
  Skipped { markdown: PathBuf, xliff: PathBuf },
}

impl UpdateOutcome {
  pub fn is_regenerated(&self) -> bool {
    matches!(self, UpdateOutcome::Regenerated { .. })
  }
}

pub struct SyncUpdater<'a> {
  root: &'a Path,
  docs: &'a DocsConfig,
  regenerator: &'a dyn XliffRegenerator,
  quiet: bool,
}

impl<'a> SyncUpdater<'a> {
  pub fn new(root: &'a Path, docs: &'a DocsConfig, regenerator: &'a dyn XliffRegenerator, quiet: bool) -> Self {
    Self {
      root,
      docs,
      regenerator,
      quiet,
    }
  }

  /// Regenerate every changed source that already has an artifact
  pub fn update(&self, changed: &[ChangedFile]) -> SyncResult<Vec<UpdateOutcome>> {
    let mut outcomes = Vec::with_capacity(changed.len());
    let mut progress = (!self.quiet && changed.len() > 1).then(|| FileProgress::new(changed.len(), "Regenerating"));

    for file in changed {
      let outcome = self.update_one(&file.path)?;
      if !self.quiet {
        match &outcome {
          UpdateOutcome::Regenerated { xliff, .. } => println!("   📝 Regenerated {}", xliff.display()),
          UpdateOutcome::Unchanged { xliff, .. } => println!("   ✅ {} already up to date", xliff.display()),
          UpdateOutcome::Skipped { markdown, .. } => println!(
            "   ⏭️  Ignoring {} as it does not have a corresponding xliff file",
            markdown.display()
          ),
        }
      }
      outcomes.push(outcome);
      if let Some(bar) = progress.as_mut() {
        bar.inc();
      }
    }

    Ok(outcomes)
  }

  fn update_one(&self, markdown: &Path) -> SyncResult<UpdateOutcome> {
    let xliff = self.docs.xliff_path_for(markdown);
    let abs_xliff = self.root.join(&xliff);

    if !abs_xliff.is_file() {
      log::debug!("skipping {}: {} does not exist", markdown.display(), xliff.display());
      return Ok(UpdateOutcome::Skipped {
        markdown: markdown.to_path_buf(),
        xliff,
      });
    }

    let dir = abs_xliff.parent().unwrap_or(self.root);
    let file_name = abs_xliff
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_default();

    // Removed automatically on drop if we bail out before persisting
    let temp = tempfile::Builder::new()
      .prefix(&format!(".{}.", file_name))
      .suffix(".tmp")
      .tempfile_in(dir)
      .with_context(|| format!("Failed to create temp file next to {}", xliff.display()))?;

    self
      .regenerator
      .regenerate(&abs_xliff, &self.root.join(markdown), temp.path())?;

    let new_content = fs::read(temp.path()).context("Failed to read regenerated xliff")?;
    if new_content.is_empty() {
      return Err(SyncError::Regenerate {
        xliff: xliff.clone(),
        markdown: markdown.to_path_buf(),
        reason: "regeneration produced an empty file".to_string(),
      });
    }

    let old_content = fs::read(&abs_xliff).with_context(|| format!("Failed to read {}", xliff.display()))?;
    if new_content == old_content {
      return Ok(UpdateOutcome::Unchanged {
        markdown: markdown.to_path_buf(),
        xliff,
      });
    }

    // temp files are created 0600; keep the artifact's original mode
    let permissions = fs::metadata(&abs_xliff)?.permissions();
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(&abs_xliff)?;

    Ok(UpdateOutcome::Regenerated {
      markdown: markdown.to_path_buf(),
      xliff,
    })
  }
}

/// Runs the configured regeneration command
///
/// The command is an argv template; `{xliff}`, `{markdown}` and `{output}`
/// are replaced with absolute paths and the repository root is the working
/// directory.
pub struct CommandRegenerator {
  command: Vec<String>,
  cwd: PathBuf,
  timeout: Duration,
}

impl CommandRegenerator {
  pub fn new(config: &RegenerateConfig, cwd: &Path) -> Self {
    Self {
      command: config.command.clone(),
      cwd: cwd.to_path_buf(),
      timeout: Duration::from_secs(config.timeout_secs),
    }
  }

  fn render_args(&self, existing_xliff: &Path, markdown: &Path, output: &Path) -> Vec<String> {
    let xliff = existing_xliff.to_string_lossy();
    let markdown = markdown.to_string_lossy();
    let output = output.to_string_lossy();
    self
      .command
      .iter()
      .map(|arg| {
        arg
          .replace("{xliff}", &xliff)
          .replace("{markdown}", &markdown)
          .replace("{output}", &output)
      })
      .collect()
  }

  fn wait_with_timeout(&self, child: &mut std::process::Child) -> SyncResult<Option<ExitStatus>> {
    let started = Instant::now();
    loop {
      if let Some(status) = child.try_wait()? {
        return Ok(Some(status));
      }
      if started.elapsed() >= self.timeout {
        let _ = child.kill();
        let _ = child.wait();
        return Ok(None);
      }
      thread::sleep(Duration::from_millis(25));
    }
  }
}

impl XliffRegenerator for CommandRegenerator {
  fn regenerate(&self, existing_xliff: &Path, markdown: &Path, output: &Path) -> SyncResult<()> {
    let args = self.render_args(existing_xliff, markdown, output);
    let (program, rest) = args
      .split_first()
      .ok_or_else(|| SyncError::message("regenerate.command is empty"))?;

    let fail = |reason: String| SyncError::Regenerate {
      xliff: existing_xliff.to_path_buf(),
      markdown: markdown.to_path_buf(),
      reason,
    };

    // Captured through files so a chatty script can't fill a pipe while we poll
    let mut stdout = tempfile::tempfile().context("Failed to create capture file")?;
    let mut stderr = tempfile::tempfile().context("Failed to create capture file")?;

    log::debug!("regenerate: {}", args.join(" "));
    let mut child = Command::new(program)
      .args(rest)
      .current_dir(&self.cwd)
      .stdin(Stdio::null())
      .stdout(Stdio::from(stdout.try_clone()?))
      .stderr(Stdio::from(stderr.try_clone()?))
      .spawn()
      .map_err(|e| fail(format!("failed to start '{}': {}", program, e)))?;

    let status = self.wait_with_timeout(&mut child)?;

    let out_text = read_capture(&mut stdout);
    if !out_text.trim().is_empty() {
      log::debug!("regenerate stdout:\n{}", out_text.trim_end());
    }

    match status {
      None => Err(fail(format!("timed out after {}s", self.timeout.as_secs()))),
      Some(status) if !status.success() => {
        let err_text = read_capture(&mut stderr);
        let detail = err_text.trim();
        Err(fail(if detail.is_empty() {
          format!("exited with {}", status)
        } else {
          format!("exited with {}: {}", status, detail)
        }))
      }
      Some(_) => Ok(()),
    }
  }
}

fn read_capture(file: &mut File) -> String {
  let mut text = String::new();
  if file.seek(SeekFrom::Start(0)).is_ok() {
    let _ = file.read_to_string(&mut text);
  }
  text
}
