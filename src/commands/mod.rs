//! CLI commands for xliff-sync
//!
//! - **run**: the full pipeline (dry-run plan by default, `--apply` executes)
//! - **detect**: list changed documentation sources between two refs
//! - **update**: regenerate the xliff for explicit markdown files
//! - **upload**: re-send modified well-known xliff files to Crowdin
//! - **init**: write a default xliff-sync.toml
//!
//! Everything except `init` takes `&RunContext`, built once in main.

pub mod detect;
pub mod init;
pub mod run;
pub mod update;
pub mod upload;

pub use detect::run_detect;
pub use init::run_init;
pub use run::run_pipeline;
pub use update::run_update;
pub use upload::run_upload;

/// Default `--after`: the commit the checkout is at
pub const DEFAULT_AFTER: &str = "HEAD";
