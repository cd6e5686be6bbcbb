//! Tests for the `detect` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_detect_lists_only_top_level_markdown() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/userGuide.md", "# userGuide v2\n")?;
  workspace.write("user_docs/en/images/notes.md", "nested\n")?;
  workspace.write("user_docs/fr/userGuide.md", "# guide\n")?;
  workspace.write("user_docs/en/userGuide.xliff", "<unit id=\"x\">\n")?;
  workspace.commit("Mixed edits")?;

  let output = run_xliff_sync(&workspace.path, &["detect", "--before", &workspace.base, "--json"])?;
  let detection: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  let files: Vec<&str> = detection["files"]
    .as_array()
    .expect("files array")
    .iter()
    .filter_map(|f| f["path"].as_str())
    .collect();
  assert_eq!(files, vec!["user_docs/en/userGuide.md"]);

  Ok(())
}

#[test]
fn test_detect_reports_nothing_for_code_only_push() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("source/nvda.pyw", "pass\n")?;
  workspace.commit("Code change")?;

  let output = run_xliff_sync(&workspace.path, &["detect", "--before", &workspace.base])?;
  assert!(stdout(&output).contains("No files in user_docs/en changed"));

  Ok(())
}

#[test]
fn test_detect_from_another_directory_with_repo_flag() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/changes.md", "# changes v2\n")?;
  workspace.commit("Edit changes")?;

  let elsewhere = tempfile::TempDir::new()?;
  let repo = workspace.path.to_string_lossy().into_owned();
  let output = run_xliff_sync(
    elsewhere.path(),
    &["--repo", &repo, "detect", "--before", &workspace.base],
  )?;
  assert!(stdout(&output).contains("user_docs/en/changes.md"));

  Ok(())
}
