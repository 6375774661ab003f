//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod run_events;
pub mod transport;

pub use run_events::{NoopEventSink, RunEvent, RunEventSink};
pub use transport::{CommandOutput, CopyRequest, Transport, TransportError};
