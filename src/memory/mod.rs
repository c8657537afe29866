// src/memory/mod.rs
//! Physical storage behind a buffer: heap vectors and direct (off-heap) regions

pub(crate) mod direct;
pub(crate) mod storage;
pub mod window;

pub use storage::StorageKind;
pub(crate) use storage::Storage;
pub use window::{Access, ByteWindow};
