//! Sync Module
//!
//! Push/pull execution of manifest rules.
//!
//! ## Usage
//!
//! ```ignore
//! use courier::application::sync::{SyncEngine, SyncOptions};
//!
//! let engine = SyncEngine::new(transport, SyncOptions::default());
//! let result = engine.run(&manifest, &target, Direction::Push);
//! ```

mod options;
mod use_case;

pub use options::SyncOptions;
pub use use_case::SyncEngine;
