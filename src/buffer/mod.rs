// src/buffer/mod.rs
//! Buffer cursor, composites, component iteration and byte cursors

pub mod component;
pub mod core;
pub mod cursor;
pub(crate) mod composite;
pub(crate) mod ops;
pub(crate) mod segments;
pub mod transfer;

pub use self::core::Buffer;
pub use component::{
    ReadableComponent, ReadableComponents, Traversal, WritableComponent, WritableComponents,
};
pub use cursor::ByteCursor;
pub use transfer::Transfer;
