// src/lib.rs
//! # Segmented Buffer Library
//!
//! Owned byte buffers with independent reader and writer offsets, backed by
//! heap or direct (off-heap) storage, that can be stitched together into
//! composites and handed to bulk I/O code one contiguous window at a time.
//!
//! Features:
//! - Reader/writer cursor with big-endian typed accessors and by-need growth
//! - Direct storage with stable native addresses for vectored or DMA-style I/O
//! - Composite buffers presenting several regions as one address space
//! - Zero-copy component iteration that commits partial consumption at once
//! - Forward and reverse byte cursors that ignore region seams
//! - Single-owner transfer between threads, checked at compile time
//! - Secure memory zeroing using `zeroize` crate (compiler-resistant)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod buffer;
pub mod error;
pub mod memory;

// Re-export main types
pub use allocator::{AllocatorConfig, BufferAllocator, GrowthPolicy};
pub use buffer::{
    Buffer, ByteCursor, ReadableComponent, ReadableComponents, Transfer, Traversal,
    WritableComponent, WritableComponents,
};
pub use error::{BufferError, Result, ResultExt};
pub use memory::{Access, ByteWindow, StorageKind};

/// Commonly used imports.
pub mod prelude {
    pub use crate::allocator::{AllocatorConfig, BufferAllocator, GrowthPolicy};
    pub use crate::buffer::{Buffer, ByteCursor, Transfer, Traversal};
    pub use crate::error::{BufferError, Result, ResultExt};
    pub use crate::memory::{ByteWindow, StorageKind};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::ops::ControlFlow;

    #[test]
    fn test_basic_buffer() {
        let mut buf = BufferAllocator::on_heap().allocate(1024).unwrap();
        buf.write_u32(42).unwrap();
        buf.write_u8(0xFF).unwrap();

        assert_eq!(buf.read_u32().unwrap(), 42);
        assert_eq!(buf.read_u8().unwrap(), 0xFF);
        assert_eq!(buf.readable_bytes(), 0);
    }

    #[test]
    fn test_network_packet() {
        let alloc = BufferAllocator::new(AllocatorConfig::network());
        let mut header = alloc.allocate(8).unwrap();
        header.write_u32(0xDEAD_BEEF).unwrap().write_u32(5).unwrap();
        let body = alloc.copy_of(b"hello").unwrap();
        let mut packet = alloc
            .compose([header.send().unwrap(), body.send().unwrap()])
            .unwrap();

        let mut windows = 0;
        let mut total = 0;
        packet
            .for_each_readable(0, |_, c| {
                windows += 1;
                total += c.readable_bytes();
                assert_ne!(c.readable_native_address(), 0);
                ControlFlow::Continue(())
            })
            .unwrap();
        assert_eq!(windows, 2);
        assert_eq!(total, 13);

        assert_eq!(packet.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(packet.read_u32().unwrap(), 5);
        let mut body = [0u8; 5];
        packet.read_bytes(&mut body).unwrap();
        assert_eq!(&body, b"hello");
    }

    #[test]
    fn test_delimiter_scan() {
        let buf = BufferAllocator::off_heap().copy_of(b"key=value").unwrap();
        let at = buf
            .open_cursor()
            .unwrap()
            .find(|&(_, b)| b == b'=')
            .map(|(i, _)| i);
        assert_eq!(at, Some(3));
    }

    #[test]
    fn test_transfer_and_release() {
        let mut buf = BufferAllocator::off_heap().allocate(64).unwrap();
        buf.write_bytes(b"secret").unwrap();
        let mut received = std::thread::spawn(move || buf.send().unwrap())
            .join()
            .unwrap()
            .receive();
        assert_eq!(received.readable_bytes(), 6);
        received.close().unwrap();
        assert!(!received.is_accessible());
    }
}
