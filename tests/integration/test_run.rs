//! Tests for the `run` command

use crate::helpers::*;
use anyhow::Result;

#[test]
fn test_dry_run_prints_plan_and_changes_nothing() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/userGuide.md", "# userGuide v2\n")?;
  let head = workspace.commit("Edit user guide")?;

  let output = run_xliff_sync(&workspace.path, &["run", "--before", &workspace.base])?;
  let out = stdout(&output);

  assert!(out.contains("DRY-RUN"));
  assert!(out.contains("Regenerate user_docs/en/userGuide.xliff"));
  assert!(out.contains("Upload user_docs/en/userGuide.xliff as file 18"));
  assert_eq!(workspace.head()?, head);
  assert_eq!(workspace.status()?, "");
  assert_eq!(workspace.remote_head()?, workspace.base);

  Ok(())
}

#[test]
fn test_dry_run_json_plan() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/changes.md", "# changes v2\n")?;
  workspace.commit("Edit changes")?;

  let output = run_xliff_sync(&workspace.path, &["run", "--before", &workspace.base, "--json"])?;
  let plan: serde_json::Value = serde_json::from_str(&stdout(&output))?;

  let ops = plan["operations"].as_array().expect("operations array");
  let types: Vec<&str> = ops.iter().filter_map(|op| op["type"].as_str()).collect();
  assert_eq!(types, vec!["regenerate", "commit_file", "push", "upload"]);
  assert_eq!(ops[3]["file_id"], 20);

  Ok(())
}

#[test]
fn test_new_markdown_without_xliff_succeeds_quietly() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/newFeature.md", "# new\n")?;
  let head = workspace.commit("Add new feature doc")?;
  git(&workspace.path, &["push", "origin", "HEAD:refs/heads/beta"])?;

  let output = run_xliff_sync(&workspace.path, &["run", "--before", &workspace.base, "--apply"])?;

  assert!(stdout(&output).contains("does not have a corresponding xliff file"));
  assert_eq!(workspace.head()?, head, "no commits");
  assert!(!workspace.file_exists("user_docs/en/newFeature.xliff"));
  assert_eq!(workspace.remote_head()?, head);

  Ok(())
}

#[test]
fn test_non_target_xliff_is_committed_and_pushed_without_upload() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/devGuide.md", "# devGuide v2\n")?;
  let edit = workspace.commit("Edit dev guide")?;

  let output = run_xliff_sync(&workspace.path, &["run", "--before", &workspace.base, "--apply"])?;

  assert_eq!(workspace.subjects_since(&edit)?, vec!["Update user_docs/en/devGuide.xliff"]);
  assert_eq!(workspace.remote_head()?, workspace.head()?);
  assert_eq!(
    workspace.read_file("user_docs/en/devGuide.xliff")?,
    "<unit id=\"devGuide-0\">\n# devGuide v2\n"
  );
  assert!(!stdout(&output).contains("📤 Uploaded"));

  Ok(())
}

#[test]
fn test_user_guide_is_pushed_before_upload_is_attempted() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/userGuide.md", "# userGuide v2\n")?;
  let edit = workspace.commit("Edit user guide")?;

  // The configured Crowdin endpoint is unreachable, so the upload fails
  let output = xliff_sync_output(
    &workspace.path,
    &["run", "--before", &workspace.base, "--apply"],
    &[("crowdinProjectID", "1"), ("crowdinAuthToken", "token")],
  )?;

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("userGuide.xliff"));
  assert_eq!(workspace.subjects_since(&edit)?, vec!["Update user_docs/en/userGuide.xliff"]);
  assert_eq!(workspace.remote_head()?, workspace.head()?, "push happened first");

  Ok(())
}

#[test]
fn test_regeneration_failure_makes_no_commits() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/userGuide.md", "# userGuide v2\n")?;
  let head = workspace.commit("Edit user guide")?;
  workspace.set_regenerate_script("echo 'markdown parse error' >&2; exit 1")?;

  let output = xliff_sync_output(&workspace.path, &["run", "--before", &workspace.base, "--apply"], &[])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("markdown parse error"));
  assert_eq!(workspace.head()?, head);
  assert_eq!(workspace.status()?, "", "xliff left untouched");
  assert_eq!(workspace.remote_head()?, workspace.base);

  Ok(())
}

#[test]
fn test_rerun_after_sync_is_a_no_op() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  workspace.write("user_docs/en/devGuide.md", "# devGuide v2\n")?;
  workspace.commit("Edit dev guide")?;

  run_xliff_sync(&workspace.path, &["run", "--before", &workspace.base, "--apply"])?;
  let synced = workspace.head()?;

  run_xliff_sync(&workspace.path, &["run", "--before", &workspace.base, "--apply"])?;
  assert_eq!(workspace.head()?, synced);

  Ok(())
}

#[test]
fn test_first_push_fails_by_default() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let zeros = "0".repeat(40);

  let output = xliff_sync_output(&workspace.path, &["run", "--before", &zeros, "--apply"], &[])?;
  assert_eq!(output.status.code(), Some(3));

  Ok(())
}

#[test]
fn test_unknown_before_ref_is_rejected() -> Result<()> {
  let workspace = TestWorkspace::new()?;

  let output = xliff_sync_output(&workspace.path, &["run", "--before", "no-such-ref"], &[])?;
  assert!(!output.status.success());
  assert!(stderr(&output).contains("no-such-ref"));

  Ok(())
}
