//! courier - manifest-driven file sync and release over SSH
//!
//! courier keeps a deployment's configuration files, secrets and small
//! state directories in step between a developer machine and one remote
//! host. A TOML manifest lists what moves in which direction; `deploy`
//! then fast-forwards the remote checkout, restarts the systemd unit and
//! waits until it reports healthy.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{HealthStatus, ReleaseOptions, ReleaseTrigger, SyncEngine, SyncOptions};
pub use config::Config;
pub use domain::entities::{Manifest, RunResult, SyncRule};
pub use domain::services::ManifestResolver;
pub use error::{ConfigError, DeployError, TransportError, ValidationError};
pub use infrastructure::SshTransport;
