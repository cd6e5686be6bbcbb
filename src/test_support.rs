//! Throwaway git repositories for unit tests

use crate::core::vcs::SystemGit;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A git repository in a temp dir with one initial commit on `main`
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
  remotes: Vec<TempDir>,
}

/// A bare repository acting as a push remote
pub struct BareRemote {
  pub path: PathBuf,
}

impl TestRepo {
  pub fn new() -> Self {
    let root = TempDir::new().expect("create temp dir");
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"]);
    git(&path, &["config", "user.name", "Test User"]);
    git(&path, &["config", "user.email", "test@example.com"]);
    git(&path, &["config", "commit.gpgsign", "false"]);
    fs::write(path.join("README.md"), "# docs\n").expect("write README");
    git(&path, &["add", "."]);
    git(&path, &["commit", "-m", "Initial commit"]);

    Self {
      _root: root,
      path,
      remotes: Vec::new(),
    }
  }

  pub fn git(&self) -> SystemGit {
    SystemGit::open(&self.path).expect("open test repo")
  }

  pub fn write(&self, rel: &str, content: &str) {
    let file = self.path.join(rel);
    if let Some(parent) = file.parent() {
      fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(file, content).expect("write file");
  }

  pub fn read(&self, rel: &str) -> String {
    fs::read_to_string(self.path.join(rel)).expect("read file")
  }

  pub fn exists(&self, rel: &str) -> bool {
    self.path.join(rel).exists()
  }

  /// Stage everything and commit, returning the new HEAD
  pub fn commit_all(&self, message: &str) -> String {
    git(&self.path, &["add", "-A"]);
    git(&self.path, &["commit", "-m", message]);
    self.head()
  }

  pub fn head(&self) -> String {
    git(&self.path, &["rev-parse", "HEAD"]).trim().to_string()
  }

  pub fn subjects_since(&self, base: &str) -> Vec<String> {
    git(&self.path, &["log", "--reverse", "--format=%s", &format!("{}..HEAD", base)])
      .lines()
      .map(String::from)
      .collect()
  }

  pub fn add_bare_remote(&mut self, name: &str) -> BareRemote {
    let dir = TempDir::new().expect("create remote dir");
    let remote_path = dir.path().join("remote.git");
    git(dir.path(), &["init", "--bare", "remote.git"]);
    git(&self.path, &["remote", "add", name, &remote_path.display().to_string()]);
    self.remotes.push(dir);
    BareRemote { path: remote_path }
  }
}

impl BareRemote {
  pub fn rev_parse(&self, reference: &str) -> String {
    git(&self.path, &["rev-parse", reference]).trim().to_string()
  }

  pub fn has_ref(&self, reference: &str) -> bool {
    Command::new("git")
      .current_dir(&self.path)
      .args(["rev-parse", "--verify", "--quiet", reference])
      .output()
      .map(|o| o.status.success())
      .unwrap_or(false)
  }
}

/// Run git in `cwd`, panicking on failure
pub fn git(cwd: &Path, args: &[&str]) -> String {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .expect("run git");
  assert!(
    output.status.success(),
    "git {} failed: {}",
    args.join(" "),
    String::from_utf8_lossy(&output.stderr)
  );
  String::from_utf8_lossy(&output.stdout).into_owned()
}
