//! Core building blocks shared by every pipeline stage
//!
//! - **config**: xliff-sync.toml parsing, defaults and credentials
//! - **context**: the run context passed by reference to each stage
//! - **error**: error types with contextual help messages and exit codes
//! - **plan**: dry-run plans and their serialization
//! - **ssh**: transient deploy-key identity for pushing
//! - **vcs**: git operations (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod ssh;
pub mod vcs;
