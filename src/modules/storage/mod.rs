//! Storage module for uploaded media blobs
//!
//! Provides a local-disk store: write bytes to a path, read bytes back,
//! delete idempotently. Anything beyond that is outside this service.

mod media_store;

pub use media_store::MediaStore;
