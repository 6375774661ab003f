//! Release Module
//!
//! Remote update, service restart and health verification.
//!
//! ## Structure
//!
//! - `options` - `ReleaseOptions` and the remote command lines
//! - `use_case` - `ReleaseTrigger` and its `HealthStatus` result

mod options;
mod use_case;

pub use options::ReleaseOptions;
pub use use_case::{HealthStatus, ReleaseTrigger};

#[cfg(test)]
mod tests;
