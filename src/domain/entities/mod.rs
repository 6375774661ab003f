//! Domain Entities
//!
//! Core business objects: rules, the manifest that orders them, and the
//! result of running them.

mod manifest;
mod run_result;
mod sync_rule;

pub use manifest::Manifest;
pub use run_result::{RuleOutcome, RuleStatus, RunResult, RunStatus};
pub use sync_rule::SyncRule;
