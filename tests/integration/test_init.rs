//! Tests for the `init` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_init_writes_default_config() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  git(temp.path(), &["init"])?;

  run_xliff_sync(temp.path(), &["init"])?;

  let config = std::fs::read_to_string(temp.path().join("xliff-sync.toml"))?;
  assert!(config.contains("[regenerate]"));
  assert!(config.contains("updateXliff"));
  assert!(config.contains("userGuide.xliff"));
  assert!(config.contains("crowdinAuthToken"));

  Ok(())
}

#[test]
fn test_init_refuses_to_overwrite() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let before = workspace.read_file("xliff-sync.toml")?;

  let output = xliff_sync_output(&workspace.path, &["init"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert_eq!(workspace.read_file("xliff-sync.toml")?, before);

  run_xliff_sync(&workspace.path, &["init", "--force"])?;
  assert!(workspace.read_file("xliff-sync.toml")?.contains("updateXliff"));

  Ok(())
}

#[test]
fn test_init_outside_repository_fails() -> Result<()> {
  let temp = tempfile::TempDir::new()?;
  let output = xliff_sync_output(temp.path(), &["init"], &[])?;
  assert!(!output.status.success());
  Ok(())
}
