//! `xliff-sync run` - detect, regenerate, commit, push, upload

use crate::core::context::RunContext;
use crate::core::error::SyncResult;
use crate::core::plan::Operation;
use crate::crowdin::CrowdinClient;
use crate::pipeline::runner::Pipeline;
use crate::pipeline::update::CommandRegenerator;

pub fn run_pipeline(ctx: &RunContext, before: String, after: String, apply: bool, json: bool) -> SyncResult<()> {
  let regenerator = CommandRegenerator::new(&ctx.config.regenerate, ctx.root());
  let client = CrowdinClient::new(&ctx.config.translation, &ctx.credentials)?;
  let pipeline = Pipeline::new(ctx, &regenerator, &client, json);

  if !apply {
    let detection = pipeline.detect(Some(&before), &after)?;
    let plan = pipeline.plan(&detection);
    if json {
      println!("{}", plan.to_json()?);
    } else {
      println!("🔍 DRY-RUN MODE - No changes will be made\n");
      println!("{}", plan.to_human_readable());
      if plan.has_work() {
        let regenerations = plan.count(|op| matches!(op, Operation::Regenerate { .. }));
        let uploads = plan.count(|op| matches!(op, Operation::Upload { .. }));
        println!(
          "   At most {} regeneration(s) and {} upload(s)\n",
          regenerations, uploads
        );
        println!("✋ To execute this plan, run:");
        println!("   xliff-sync run --before {} --after {} --apply", before, after);
      }
    }
    return Ok(());
  }

  if !json {
    println!("🚀 APPLY MODE - Syncing xliff files\n");
  }

  let report = pipeline.run(Some(&before), &after)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    println!(
      "\n✅ Done: {} commit(s), {} upload(s)",
      report.commit_count(),
      report.upload_count()
    );
  }

  Ok(())
}
