//! Tests for the `update` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_update_rewrites_working_tree_only() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/changes.md", "# changes v2\n")?;
  let head = workspace.commit("Edit changes")?;

  run_xliff_sync(&workspace.path, &["update", "user_docs/en/changes.md"])?;

  assert_eq!(
    workspace.read_file("user_docs/en/changes.xliff")?,
    "<unit id=\"changes-20\">\n# changes v2\n"
  );
  assert_eq!(workspace.head()?, head);
  assert_eq!(workspace.status()?, "M user_docs/en/changes.xliff");

  Ok(())
}

#[test]
fn test_update_skips_markdown_without_xliff() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/newFeature.md", "# new\n")?;

  let output = run_xliff_sync(&workspace.path, &["update", "user_docs/en/newFeature.md"])?;

  assert!(stdout(&output).contains("0 of 1"));
  assert!(!workspace.file_exists("user_docs/en/newFeature.xliff"));

  Ok(())
}

#[test]
fn test_update_paths_are_relative_to_the_current_directory() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/userGuide.md", "# userGuide v2\n")?;

  let docs_dir = workspace.path.join("user_docs/en");
  run_xliff_sync(&docs_dir, &["update", "userGuide.md"])?;

  assert_eq!(
    workspace.read_file("user_docs/en/userGuide.xliff")?,
    "<unit id=\"userGuide-18\">\n# userGuide v2\n"
  );

  Ok(())
}

#[test]
fn test_update_with_repo_flag_resolves_paths_from_caller() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/changes.md", "# changes v2\n")?;

  let parent = workspace.path.parent().expect("workspace has a parent");
  run_xliff_sync(parent, &["--repo", "nvda", "update", "nvda/user_docs/en/changes.md"])?;

  assert_eq!(
    workspace.read_file("user_docs/en/changes.xliff")?,
    "<unit id=\"changes-20\">\n# changes v2\n"
  );

  Ok(())
}
