//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod direction;
mod path_filters;
mod remote_target;

pub use direction::{Direction, EntryKind};
pub use path_filters::{FilterError, PathFilters, PathMatcher};
pub use remote_target::{AuthMethod, RemoteTarget};
