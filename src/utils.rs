//! Utility functions for path and remote URL handling

use std::path::Path;

/// Check if a remote is a local filesystem path (not a remote URL)
///
/// Returns true for:
/// - Absolute paths on Unix: /path/to/repo
/// - Absolute paths on Windows: C:\path\to\repo or C:/path/to/repo
/// - Relative paths: ./path or ../path
/// - file:// URLs
///
/// Returns false for:
/// - SSH URLs: git@github.com:user/repo.git
/// - HTTPS URLs: <https://github.com/user/repo.git>
pub fn is_local_path(path: &str) -> bool {
  let p = Path::new(path);

  if path.starts_with("./") || path.starts_with("../") || path.starts_with("file://") {
    return true;
  }

  // Windows drive letter must be checked before the URL check since it contains ':'
  if path.len() >= 3 {
    let bytes = path.as_bytes();
    if bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && (bytes[2] == b'\\' || bytes[2] == b'/') {
      return true;
    }
  }

  if path.starts_with('/') && !path.contains("://") && !path.contains('@') {
    return true;
  }

  if p.is_absolute() {
    return true;
  }

  false
}

/// Extract the host from an SSH-style remote URL
///
/// Handles scp-like syntax (`git@github.com:org/repo.git`) and
/// `ssh://[user@]host[:port]/path`. Returns None for local paths and HTTP(S).
pub fn ssh_host_from_url(url: &str) -> Option<String> {
  if is_local_path(url) {
    return None;
  }

  if let Some(rest) = url.strip_prefix("ssh://") {
    let authority = rest.split('/').next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = host_port.split(':').next()?;
    return (!host.is_empty()).then(|| host.to_string());
  }

  if url.contains("://") {
    return None;
  }

  // scp-like: [user@]host:path
  let (before_colon, _) = url.split_once(':')?;
  let host = before_colon.rsplit('@').next()?;
  (!host.is_empty()).then(|| host.to_string())
}

/// Convert a path to Git format (always forward slashes)
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
