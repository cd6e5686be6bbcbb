//! Transient SSH identity for pushing with a deploy key
//!
//! The key and a private known_hosts file live in a temp dir that is removed
//! when the identity is dropped. Nothing is written under `~/.ssh`.

use crate::core::config::Secret;
use crate::core::error::{SyncError, SyncResult, ResultExt, ValidationError};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub struct SshIdentity {
  _dir: TempDir,
  key_path: PathBuf,
  known_hosts: PathBuf,
}

impl SshIdentity {
  /// Install `key` and register `host`'s public key via ssh-keyscan
  pub fn install(key: &Secret, host: &str) -> SyncResult<Self> {
    log::debug!("ssh-keyscan {}", host);
    let output = Command::new("ssh-keyscan")
      .args(["-T", "15", host])
      .output()
      .map_err(|e| ssh_error(format!("failed to run ssh-keyscan: {}", e)))?;

    let host_keys = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() || host_keys.trim().is_empty() {
      return Err(ssh_error(format!(
        "ssh-keyscan returned no keys for '{}': {}",
        host,
        String::from_utf8_lossy(&output.stderr).trim()
      )));
    }

    Self::with_known_hosts(key, &host_keys)
  }

  /// Install `key` with a known_hosts file holding `host_keys`
  pub fn with_known_hosts(key: &Secret, host_keys: &str) -> SyncResult<Self> {
    let material = key.expose().trim();
    if !material.starts_with("-----BEGIN") || !material.contains("PRIVATE KEY-----") {
      return Err(ssh_error("deploy key does not look like a PEM/OpenSSH private key"));
    }

    let dir = TempDir::new().context("Failed to create temp dir for SSH identity")?;
    let key_path = dir.path().join("deploy_key");
    let known_hosts = dir.path().join("known_hosts");

    // ssh rejects keys without a trailing newline
    write_private(&key_path, &format!("{}\n", material))?;
    fs::write(&known_hosts, host_keys).context("Failed to write known_hosts")?;

    Ok(Self {
      _dir: dir,
      key_path,
      known_hosts,
    })
  }

  /// Value for GIT_SSH_COMMAND
  pub fn git_ssh_command(&self) -> OsString {
    OsString::from(format!(
      "ssh -i {} -o IdentitiesOnly=yes -o UserKnownHostsFile={} -o StrictHostKeyChecking=yes",
      shell_quote(&self.key_path),
      shell_quote(&self.known_hosts)
    ))
  }
}

fn ssh_error(message: impl Into<String>) -> SyncError {
  SyncError::Validation(ValidationError::SshKey {
    message: message.into(),
  })
}

#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> SyncResult<()> {
  use std::io::Write;
  use std::os::unix::fs::OpenOptionsExt;

  let mut file = fs::OpenOptions::new()
    .write(true)
    .create_new(true)
    .mode(0o600)
    .open(path)
    .context("Failed to create deploy key file")?;
  file.write_all(content.as_bytes()).context("Failed to write deploy key")?;
  Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> SyncResult<()> {
  fs::write(path, content).context("Failed to write deploy key")?;
  Ok(())
}

fn shell_quote(path: &Path) -> String {
  let raw = crate::utils::path_to_git_format(path);
  format!("'{}'", raw.replace('\'', r"'\''"))
}
