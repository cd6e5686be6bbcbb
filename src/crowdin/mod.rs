//! Crowdin API v2 client
//!
//! Only the two calls needed to replace a source file are implemented:
//! add a storage (raw upload), then point the existing file at it.

mod client;

pub use client::CrowdinClient;
