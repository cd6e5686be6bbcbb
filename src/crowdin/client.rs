use crate::core::config::{Secret, Credentials, TranslationConfig};
use crate::core::error::{ConfigError, SyncError, SyncResult, ResultExt};
use crate::pipeline::upload::TranslationService;
use reqwest::blocking::{Client, Response};
use reqwest::header;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Crowdin client for updating source files
pub struct CrowdinClient {
  /// HTTP client for API requests
  http: Client,
  /// API base URL, without trailing slash
  api_url: String,
  /// Project id (None until configured)
  project_id: Option<String>,
  /// Personal access token (None until configured)
  token: Option<Secret>,
  project_id_env: String,
  token_env: String,
}

/// `{"data": ...}` envelope used by every Crowdin response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  data: T,
}

#[derive(Debug, Deserialize)]
struct Storage {
  id: u64,
  #[serde(rename = "fileName", default)]
  file_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct UpdateFileRequest {
  #[serde(rename = "storageId")]
  storage_id: u64,
}

/// Error bodies come in two shapes: `{"error": {...}}` and `{"errors": [...]}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
  #[serde(default)]
  error: Option<ErrorDetail>,
  #[serde(default)]
  errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
  message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
  error: ErrorItemInner,
}

#[derive(Debug, Deserialize)]
struct ErrorItemInner {
  key: String,
  #[serde(default)]
  errors: Vec<ErrorDetail>,
}

impl CrowdinClient {
  /// Build a client from config and credentials
  ///
  /// Missing credentials are not an error here; they only fail an actual
  /// upload, so runs that upload nothing don't need them.
  pub fn new(config: &TranslationConfig, credentials: &Credentials) -> SyncResult<Self> {
    let http = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("xliff-sync/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      api_url: config.api_url.trim_end_matches('/').to_string(),
      project_id: credentials.project_id.clone(),
      token: credentials.api_token.clone(),
      project_id_env: config.project_id_env.clone(),
      token_env: config.token_env.clone(),
    })
  }

  fn storages_url(&self) -> String {
    format!("{}/storages", self.api_url)
  }

  fn file_url(&self, project_id: &str, file_id: u64) -> String {
    format!("{}/projects/{}/files/{}", self.api_url, project_id, file_id)
  }

  fn require(&self) -> SyncResult<(&str, &Secret)> {
    let project_id = self.project_id.as_deref().ok_or_else(|| {
      SyncError::Config(ConfigError::MissingField {
        field: self.project_id_env.clone(),
      })
    })?;
    let token = self.token.as_ref().ok_or_else(|| {
      SyncError::Config(ConfigError::MissingField {
        field: self.token_env.clone(),
      })
    })?;
    Ok((project_id, token))
  }

  /// Upload raw bytes to storage, returning the storage id
  fn add_storage(&self, token: &Secret, file_name: &str, content: Vec<u8>) -> SyncResult<u64> {
    log::debug!("POST {} ({} bytes, {})", self.storages_url(), content.len(), file_name);
    let response = self
      .http
      .post(self.storages_url())
      .bearer_auth(token.expose())
      .header("Crowdin-API-FileName", file_name)
      .header(header::CONTENT_TYPE, "application/octet-stream")
      .body(content)
      .send()?;

    let body = check_status(response, "add storage")?;
    let storage: Envelope<Storage> = serde_json::from_str(&body).context("Unexpected add-storage response")?;
    log::debug!(
      "storage {} created for {}",
      storage.data.id,
      storage.data.file_name.as_deref().unwrap_or(file_name)
    );
    Ok(storage.data.id)
  }

  /// Point an existing source file at a storage
  fn update_file(&self, token: &Secret, project_id: &str, file_id: u64, storage_id: u64) -> SyncResult<()> {
    let url = self.file_url(project_id, file_id);
    log::debug!("PUT {} (storage {})", url, storage_id);
    let response = self
      .http
      .put(url)
      .bearer_auth(token.expose())
      .json(&UpdateFileRequest { storage_id })
      .send()?;

    check_status(response, "update file")?;
    Ok(())
  }
}

impl TranslationService for CrowdinClient {
  fn upload_source_file(&self, file_id: u64, path: &Path) -> SyncResult<()> {
    let (project_id, token) = self.require()?;

    let file_name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .ok_or_else(|| SyncError::message(format!("Not a file path: {}", path.display())))?;
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let storage_id = self.add_storage(token, &file_name, content)?;
    self.update_file(token, project_id, file_id, storage_id)
  }
}

/// Return the body on success, or an error naming the call and Crowdin's message
fn check_status(response: Response, call: &str) -> SyncResult<String> {
  let status = response.status();
  let body = response.text()?;
  if status.is_success() {
    return Ok(body);
  }
  Err(SyncError::message(format!(
    "Crowdin {} failed with HTTP {}: {}",
    call,
    status.as_u16(),
    error_text(&body)
  )))
}

fn error_text(body: &str) -> String {
  match serde_json::from_str::<ErrorBody>(body) {
    Ok(ErrorBody { error: Some(detail), .. }) => detail.message,
    Ok(ErrorBody { errors, .. }) if !errors.is_empty() => errors
      .iter()
      .map(|item| {
        let messages: Vec<&str> = item.error.errors.iter().map(|d| d.message.as_str()).collect();
        format!("{}: {}", item.error.key, messages.join(", "))
      })
      .collect::<Vec<_>>()
      .join("; "),
    _ => body.chars().take(200).collect(),
  }
}
