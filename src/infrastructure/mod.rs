//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `transport/` - ssh + rsync/scp transport
//! - `repositories/` - manifest loading from disk
//! - `events/` - console and NDJSON event sinks
//! - `logging` - tracing subscriber setup

pub mod events;
pub mod logging;
pub mod repositories;
pub mod transport;

pub use events::{ConsoleEventSink, JsonEventSink};
pub use repositories::FsManifestRepository;
pub use transport::{CopyPrograms, SshSettings, SshTransport};
