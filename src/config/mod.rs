//! Configuration module for courier
//!
//! All settings that used to be hardcoded in deploy scripts (host, paths,
//! service name) live here and are passed explicitly into each component.

mod loader;
mod types;

pub use loader::{discover, with_env_overrides, ConfigWarning, LoadedConfig};
pub use types::{
    AuthKind, Config, ManifestConfig, ReleaseConfig, TargetConfig, TransferMethod,
    TransportConfig, CONFIG_FILE_NAME, DEFAULT_MANIFEST,
};
