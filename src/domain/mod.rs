//! Domain Layer
//!
//! Pure logic for manifests, sync runs and releases, without I/O.
//!
//! ## Structure
//!
//! - `entities/` - SyncRule, Manifest, RunResult
//! - `value_objects/` - Direction, EntryKind, PathFilters, RemoteTarget
//! - `services/` - ManifestResolver, shell quoting
//! - `ports/` - Transport and RunEventSink interfaces
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
