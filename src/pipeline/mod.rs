//! The four pipeline stages and the runner that chains them
//!
//! ```text
//! detect (git diff) -> update (regenerate xliff) -> publish (commit + push) -> upload (Crowdin)
//! ```

pub mod detect;
pub mod publish;
pub mod runner;
pub mod update;
pub mod upload;
