mod commands;
mod core;
mod crowdin;
mod pipeline;
mod ui;
mod utils;

#[cfg(test)]
mod test_support;

use clap::{Parser, Subcommand};
use crate::core::error::{SyncError, print_error};
use std::path::PathBuf;

/// Keep translation interchange (xliff) files in sync with the user documentation
#[derive(Parser)]
#[command(name = "xliff-sync")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Repository to operate on (default: current directory)
  #[arg(long, global = true, value_name = "PATH")]
  repo: Option<PathBuf>,

  /// Log subprocess and HTTP activity (RUST_LOG overrides)
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the full pipeline for a push: detect, regenerate, commit, push, upload
  Run {
    /// Commit before the push (all zeros for a newly created branch)
    #[arg(long)]
    before: String,
    /// Commit after the push; must be the checked-out commit with --apply
    #[arg(long, default_value = commands::DEFAULT_AFTER)]
    after: String,
    /// Actually perform the sync (default: dry-run mode showing plan)
    #[arg(long)]
    apply: bool,
    /// Output plan (or run report with --apply) in JSON format
    #[arg(long)]
    json: bool,
  },

  /// List documentation sources changed between two commits
  Detect {
    /// Commit before the push
    #[arg(long)]
    before: String,
    /// Commit after the push
    #[arg(long, default_value = commands::DEFAULT_AFTER)]
    after: String,
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Regenerate the xliff files of the given markdown files (no commit)
  Update {
    /// Markdown files (relative to the current directory)
    #[arg(required = true)]
    files: Vec<PathBuf>,
  },

  /// Upload well-known xliff files modified since a commit
  Upload {
    /// Base commit; only files changed between it and HEAD are uploaded
    #[arg(long)]
    since: String,
  },

  /// Write a default xliff-sync.toml to the repository root
  Init {
    /// Overwrite an existing configuration file
    #[arg(long)]
    force: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  let heading = anstyle::Style::new()
    .bold()
    .underline()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow)));
  let failure = anstyle::Style::new()
    .bold()
    .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red)));

  clap::builder::Styles::styled()
    .usage(heading)
    .header(heading)
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(failure)
    .error(failure)
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
    .format_timestamp(None)
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let repo = match cli.repo {
    Some(path) => path,
    None => match std::env::current_dir() {
      Ok(dir) => dir,
      Err(e) => handle_error(SyncError::from(e).context("Failed to get current directory")),
    },
  };

  // init runs before a config exists (or while the existing one is broken)
  if let Commands::Init { force } = cli.command {
    if let Err(err) = commands::run_init(&repo, force) {
      handle_error(err);
    }
    return;
  }

  let ctx = match crate::core::context::RunContext::build(&repo) {
    Ok(ctx) => ctx,
    Err(err) => handle_error(err),
  };

  let result = match cli.command {
    Commands::Run {
      before,
      after,
      apply,
      json,
    } => commands::run_pipeline(&ctx, before, after, apply, json),
    Commands::Detect { before, after, json } => commands::run_detect(&ctx, before, after, json),
    Commands::Update { files } => commands::run_update(&ctx, files),
    Commands::Upload { since } => commands::run_upload(&ctx, since),
    Commands::Init { .. } => Ok(()),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: SyncError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
