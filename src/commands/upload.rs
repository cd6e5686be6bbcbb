//! `xliff-sync upload` - upload well-known xliff files modified since a ref
//!
//! For re-running the upload stage by hand after a push whose uploads
//! failed. The caller is responsible for HEAD already being published.

use crate::core::context::RunContext;
use crate::core::error::SyncResult;
use crate::crowdin::CrowdinClient;
use crate::pipeline::upload::{UploadDispatcher, UploadOutcome};

pub fn run_upload(ctx: &RunContext, since: String) -> SyncResult<()> {
  let base = ctx.git.resolve_commit(&since)?;
  let head = ctx.git.head_commit()?;
  let client = CrowdinClient::new(&ctx.config.translation, &ctx.credentials)?;

  println!("📤 Uploading xliff files modified since {}", since);
  let outcomes = UploadDispatcher::new(
    &ctx.git,
    &ctx.config.docs,
    &ctx.config.translation.targets,
    &client,
    false,
  )
  .dispatch_range(&base, &head)?;

  let uploaded = outcomes
    .iter()
    .filter(|o| matches!(o, UploadOutcome::Uploaded { .. }))
    .count();
  println!("\n✅ {} file(s) uploaded", uploaded);
  Ok(())
}
