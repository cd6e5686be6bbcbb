//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stand-in for the markdown -> xliff tool: keeps the first line of the
/// existing xliff (its unit id) and appends the markdown text.
const REGENERATE_SCRIPT: &str = r#"{ head -n 1 "$1"; cat "$2"; } > "$3""#;

/// A documentation repository with a bare "origin" to push to
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
  pub remote: PathBuf,
  /// Commit after the docs were seeded
  pub base: String,
}

impl TestWorkspace {
  /// Repository with userGuide, changes and devGuide sources and their xliff files
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("nvda");
    let remote = root.path().join("origin.git");
    std::fs::create_dir_all(&path)?;

    git(root.path(), &["init", "--bare", "--initial-branch=beta", "origin.git"])?;
    git(&path, &["init", "--initial-branch=beta"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", &remote.to_string_lossy()])?;

    let workspace = Self {
      _root: root,
      path,
      remote,
      base: String::new(),
    };

    for (name, id) in [("userGuide", 18), ("changes", 20), ("devGuide", 0)] {
      workspace.write(&format!("user_docs/en/{}.md", name), &format!("# {} v1\n", name))?;
      workspace.write(
        &format!("user_docs/en/{}.xliff", name),
        &format!("<unit id=\"{}-{}\">\n# {} v1\n", name, id, name),
      )?;
    }
    workspace.write("xliff-sync.toml", &config_toml(&["sh", "-c", REGENERATE_SCRIPT]))?;
    let base = workspace.commit("Seed user documentation")?;
    git(&workspace.path, &["push", "origin", "HEAD:refs/heads/beta"])?;

    Ok(Self { base, ..workspace })
  }

  /// Replace the regeneration command in xliff-sync.toml (not committed)
  pub fn set_regenerate_script(&self, script: &str) -> Result<()> {
    self.write("xliff-sync.toml", &config_toml(&["sh", "-c", script]))
  }

  pub fn write(&self, rel: &str, content: &str) -> Result<()> {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&file, content).with_context(|| format!("Failed to write {}", rel))?;
    Ok(())
  }

  pub fn read_file(&self, rel: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(rel))?)
  }

  pub fn file_exists(&self, rel: &str) -> bool {
    self.path.join(rel).exists()
  }

  /// Stage everything and commit, returning the new SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Commit subjects after `base`, oldest first
  pub fn subjects_since(&self, base: &str) -> Result<Vec<String>> {
    let output = git(&self.path, &["log", "--reverse", "--format=%s", &format!("{}..HEAD", base)])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// SHA of the remote's beta branch
  pub fn remote_head(&self) -> Result<String> {
    let output = git(&self.remote, &["rev-parse", "refs/heads/beta"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Porcelain status, ignoring the untracked config tweaks tests make
  pub fn status(&self) -> Result<String> {
    let output = git(&self.path, &["status", "--porcelain", "--", "user_docs"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

/// xliff-sync.toml with a given regeneration command
///
/// Uploads go to a closed local port so no test ever reaches Crowdin.
fn config_toml(command: &[&str]) -> String {
  let command = command
    .iter()
    .map(|arg| format!("{:?}", arg))
    .collect::<Vec<_>>()
    .join(", ");
  format!(
    r#"[regenerate]
command = [{}, "sh", "{{xliff}}", "{{markdown}}", "{{output}}"]
timeout_secs = 30

[translation]
api_url = "http://127.0.0.1:9/api/v2"
timeout_secs = 5
"#,
    command
  )
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run xliff-sync without checking the exit status
///
/// Deploy key and Crowdin credentials are cleared so the host environment
/// can't leak into a test; `envs` adds them back per test.
pub fn xliff_sync_output(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_xliff-sync");

  let mut cmd = Command::new(bin);
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("DEPLOY_KEY")
    .env_remove("crowdinProjectID")
    .env_remove("crowdinAuthToken")
    .env_remove("RUST_LOG");
  for (key, value) in envs {
    cmd.env(key, value);
  }
  cmd.output().context("Failed to run xliff-sync")
}

/// Run xliff-sync and require success
pub fn run_xliff_sync(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = xliff_sync_output(cwd, args, &[])?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "xliff-sync command failed: xliff-sync {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).into_owned()
}
