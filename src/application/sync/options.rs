//! Sync Options

use std::time::Duration;

/// Options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Budget for each single copy
    pub timeout: Duration,
    /// Record every matching rule as planned without touching the transport
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
