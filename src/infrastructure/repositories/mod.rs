//! Repository Implementations

mod manifest;

pub use manifest::FsManifestRepository;
