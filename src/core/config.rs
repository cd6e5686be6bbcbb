use crate::core::error::{ConfigError, SyncError, SyncResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for xliff-sync
/// Searched in order: xliff-sync.toml, .xliff-sync.toml, .config/xliff-sync.toml
///
/// Every section is optional; the defaults reproduce the documentation
/// workflow this tool was written for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
  #[serde(default)]
  pub docs: DocsConfig,
  #[serde(default)]
  pub detect: DetectConfig,
  #[serde(default)]
  pub regenerate: RegenerateConfig,
  #[serde(default)]
  pub git: GitConfig,
  #[serde(default)]
  pub translation: TranslationConfig,
  #[serde(default)]
  pub credentials: CredentialsConfig,
}

/// Where the English documentation sources live
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
  /// Directory holding both markdown sources and their xliff files
  #[serde(default = "default_docs_dir")]
  pub dir: PathBuf,
  #[serde(default = "default_markdown_ext")]
  pub markdown_ext: String,
  #[serde(default = "default_xliff_ext")]
  pub xliff_ext: String,
}

fn default_docs_dir() -> PathBuf {
  PathBuf::from("user_docs/en")
}

fn default_markdown_ext() -> String {
  "md".to_string()
}

fn default_xliff_ext() -> String {
  "xliff".to_string()
}

impl Default for DocsConfig {
  fn default() -> Self {
    Self {
      dir: default_docs_dir(),
      markdown_ext: default_markdown_ext(),
      xliff_ext: default_xliff_ext(),
    }
  }
}

impl DocsConfig {
  /// Pathspec matching markdown files directly inside `dir`
  pub fn markdown_pathspec(&self) -> String {
    self.pathspec_for(&self.markdown_ext)
  }

  /// Pathspec matching xliff files directly inside `dir`
  pub fn xliff_pathspec(&self) -> String {
    self.pathspec_for(&self.xliff_ext)
  }

  fn pathspec_for(&self, ext: &str) -> String {
    // :(glob) keeps `*` from crossing directory boundaries
    format!(
      ":(glob){}/*.{}",
      crate::utils::path_to_git_format(&self.dir).trim_end_matches('/'),
      ext
    )
  }

  /// The interchange artifact path paired with a markdown source
  pub fn xliff_path_for(&self, markdown: &Path) -> PathBuf {
    markdown.with_extension(&self.xliff_ext)
  }
}

/// What to do when the "before" ref is absent or all-zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitialPushPolicy {
  /// Abort the run
  #[default]
  Fail,
  /// Treat the push as changing nothing
  Empty,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectConfig {
  #[serde(default)]
  pub initial_push: InitialPushPolicy,
}

/// External regeneration procedure
///
/// `command` is an argv template; `{xliff}`, `{markdown}` and `{output}` are
/// substituted per file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateConfig {
  #[serde(default = "default_regenerate_command")]
  pub command: Vec<String>,
  #[serde(default = "default_regenerate_timeout")]
  pub timeout_secs: u64,
}

fn default_regenerate_command() -> Vec<String> {
  [
    "python",
    "user_docs/markdownTranslate.py",
    "updateXliff",
    "-x",
    "{xliff}",
    "-m",
    "{markdown}",
    "-o",
    "{output}",
  ]
  .iter()
  .map(|s| s.to_string())
  .collect()
}

fn default_regenerate_timeout() -> u64 {
  300
}

impl Default for RegenerateConfig {
  fn default() -> Self {
    Self {
      command: default_regenerate_command(),
      timeout_secs: default_regenerate_timeout(),
    }
  }
}

impl RegenerateConfig {
  pub fn validate(&self) -> SyncResult<()> {
    if self.command.is_empty() {
      return Err(SyncError::Config(ConfigError::MissingField {
        field: "regenerate.command".to_string(),
      }));
    }
    if !self.command.iter().any(|arg| arg.contains("{output}")) {
      return Err(SyncError::with_help(
        "regenerate.command never mentions {output}",
        "The regeneration command must write to the {output} placeholder so the result can be swapped in atomically",
      ));
    }
    if self.timeout_secs == 0 {
      return Err(SyncError::message("regenerate.timeout_secs must be greater than zero"));
    }
    Ok(())
  }
}

/// Commit identity and push destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
  #[serde(default = "default_remote")]
  pub remote: String,
  #[serde(default = "default_branch")]
  pub branch: String,
  #[serde(default = "default_user_name")]
  pub user_name: String,
  #[serde(default = "default_user_email")]
  pub user_email: String,
  /// Host to register with ssh-keyscan (default: taken from the remote URL)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ssh_host: Option<String>,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_branch() -> String {
  "beta".to_string()
}

fn default_user_name() -> String {
  "github-actions".to_string()
}

fn default_user_email() -> String {
  "github-actions@github.com".to_string()
}

impl Default for GitConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      branch: default_branch(),
      user_name: default_user_name(),
      user_email: default_user_email(),
      ssh_host: None,
    }
  }
}

/// A fixed mapping from artifact file name to translation-service file id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTarget {
  pub file_name: String,
  pub file_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
  #[serde(default = "default_api_url")]
  pub api_url: String,
  #[serde(default = "default_api_timeout")]
  pub timeout_secs: u64,
  /// Environment variable holding the project id
  #[serde(default = "default_project_id_env")]
  pub project_id_env: String,
  /// Environment variable holding the API token
  #[serde(default = "default_token_env")]
  pub token_env: String,
  #[serde(default = "default_targets")]
  pub targets: Vec<UploadTarget>,
}

fn default_api_url() -> String {
  "https://api.crowdin.com/api/v2".to_string()
}

fn default_api_timeout() -> u64 {
  60
}

fn default_project_id_env() -> String {
  "crowdinProjectID".to_string()
}

fn default_token_env() -> String {
  "crowdinAuthToken".to_string()
}

fn default_targets() -> Vec<UploadTarget> {
  vec![
    UploadTarget {
      file_name: "userGuide.xliff".to_string(),
      file_id: 18,
    },
    UploadTarget {
      file_name: "changes.xliff".to_string(),
      file_id: 20,
    },
  ]
}

impl Default for TranslationConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      timeout_secs: default_api_timeout(),
      project_id_env: default_project_id_env(),
      token_env: default_token_env(),
      targets: default_targets(),
    }
  }
}

impl TranslationConfig {
  pub fn validate(&self, xliff_ext: &str) -> SyncResult<()> {
    let suffix = format!(".{}", xliff_ext);
    for (i, target) in self.targets.iter().enumerate() {
      if !target.file_name.ends_with(&suffix) || target.file_name.contains('/') {
        return Err(SyncError::with_help(
          format!("Upload target '{}' is not a bare {} file name", target.file_name, suffix),
          "Targets name files inside [docs].dir, e.g. file_name = \"userGuide.xliff\"",
        ));
      }
      if self.targets[..i]
        .iter()
        .any(|t| t.file_id == target.file_id || t.file_name == target.file_name)
      {
        return Err(SyncError::message(format!(
          "Duplicate upload target: {} (file id {})",
          target.file_name, target.file_id
        )));
      }
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
  /// Environment variable holding the deploy private key
  #[serde(default = "default_deploy_key_env")]
  pub deploy_key_env: String,
}

fn default_deploy_key_env() -> String {
  "DEPLOY_KEY".to_string()
}

impl Default for CredentialsConfig {
  fn default() -> Self {
    Self {
      deploy_key_env: default_deploy_key_env(),
    }
  }
}

impl SyncConfig {
  pub const FILE_NAME: &'static str = "xliff-sync.toml";

  /// Find config file in search order: xliff-sync.toml, .xliff-sync.toml, .config/xliff-sync.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join(Self::FILE_NAME),
      path.join(".xliff-sync.toml"),
      path.join(".config").join(Self::FILE_NAME),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the repository root, falling back to defaults when no file exists
  pub fn load(path: &Path) -> SyncResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      log::debug!("no config file under {}, using defaults", path.display());
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: SyncConfig = toml_edit::de::from_str(&content).map_err(|e| {
      SyncError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    log::debug!("loaded config from {}", config_path.display());
    Ok(config)
  }

  pub fn validate(&self) -> SyncResult<()> {
    if self.docs.markdown_ext == self.docs.xliff_ext {
      return Err(SyncError::message("docs.markdown_ext and docs.xliff_ext must differ"));
    }
    self.regenerate.validate()?;
    self.translation.validate(&self.docs.xliff_ext)?;
    Ok(())
  }

  /// Save config to xliff-sync.toml (default location)
  pub fn save(&self, path: &Path) -> SyncResult<PathBuf> {
    let config_path = path.join(Self::FILE_NAME);
    let content = toml_edit::ser::to_string_pretty(self).context("Failed to serialize config to TOML")?;
    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    Ok(config_path)
  }
}

/// A credential value that never prints itself
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("Secret(***)")
  }
}

impl fmt::Display for Secret {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("***")
  }
}

/// Secrets and ids read once from the environment
#[derive(Debug, Clone, Default)]
pub struct Credentials {
  pub deploy_key: Option<Secret>,
  pub project_id: Option<String>,
  pub api_token: Option<Secret>,
}

impl Credentials {
  /// Read credentials from the process environment
  pub fn from_env(config: &SyncConfig) -> Self {
    Self::from_lookup(config, |name| std::env::var(name).ok())
  }

  /// Read credentials through an arbitrary lookup (empty values count as unset)
  pub fn from_lookup<F>(config: &SyncConfig, lookup: F) -> Self
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    Self {
      deploy_key: get(&config.credentials.deploy_key_env).map(Secret::new),
      project_id: get(&config.translation.project_id_env).map(|v| v.trim().to_string()),
      api_token: get(&config.translation.token_env).map(Secret::new),
    }
  }
}
