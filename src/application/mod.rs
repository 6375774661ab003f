//! Application Layer
//!
//! Use cases that orchestrate domain logic through ports.
//!
//! ## Use Cases
//!
//! - `SyncEngine` - push/pull the rules of a manifest
//! - `ReleaseTrigger` - update, restart and health-check the remote service

pub mod release;
pub mod sync;

pub use release::{HealthStatus, ReleaseOptions, ReleaseTrigger};
pub use sync::{SyncEngine, SyncOptions};
