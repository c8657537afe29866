// src/allocator/mod.rs
//! Buffer allocation.
//!
//! A [`BufferAllocator`] hands out owned buffers backed by heap or direct
//! storage, according to its [`AllocatorConfig`]. The same configuration is
//! stamped on every buffer it creates and governs how that buffer grows.
//!
//! # Example
//!
//! ```rust
//! use segbuf::prelude::*;
//!
//! let alloc = BufferAllocator::new(AllocatorConfig::network());
//! let mut header = alloc.allocate(4)?;
//! header.write_u32(0xCAFE_BABE)?;
//! let payload = alloc.copy_of(b"payload")?;
//!
//! let mut packet = alloc.compose([header.send()?, payload.send()?])?;
//! assert_eq!(packet.readable_bytes(), 11);
//! assert_eq!(packet.read_u32()?, 0xCAFE_BABE);
//! # Ok::<(), segbuf::BufferError>(())
//! ```

pub mod config;

pub use config::{AllocatorConfig, BUF_MAX_SIZE, GrowthPolicy};

use crate::buffer::{Buffer, Transfer};
use crate::error::{BufferError, Result};
use crate::memory::{Storage, StorageKind};

/// Creates buffers of one storage kind.
///
/// Cheap to copy around; holds no storage of its own.
#[derive(Debug, Clone, Default)]
pub struct BufferAllocator {
    config: AllocatorConfig,
}

impl BufferAllocator {
    /// Creates an allocator with the given configuration.
    pub fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// Allocator for heap-backed buffers.
    pub fn on_heap() -> Self {
        Self::new(AllocatorConfig::on_heap())
    }

    /// Allocator for direct (off-heap) buffers with stable native addresses.
    pub fn off_heap() -> Self {
        Self::new(AllocatorConfig::off_heap())
    }

    /// This allocator's configuration.
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Storage kind of the buffers this allocator creates.
    pub fn kind(&self) -> StorageKind {
        self.config.kind
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if size > self.config.max_capacity {
            return Err(BufferError::SizeTooBig {
                requested: size,
                max: self.config.max_capacity,
            });
        }
        Ok(())
    }

    /// Allocates a zeroed buffer of `size` bytes with both offsets at `0`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::SizeTooBig`] above the configured maximum, or
    /// [`BufferError::Growth`] if the storage cannot be obtained.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let buf = BufferAllocator::off_heap().allocate(256)?;
    /// assert_eq!(buf.capacity(), 256);
    /// assert_eq!(buf.writable_bytes(), 256);
    /// assert!(buf.is_direct());
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn allocate(&self, size: usize) -> Result<Buffer> {
        self.check_size(size)?;
        let storage = Storage::allocate(self.config.kind, size)?;
        tracing::trace!(size, kind = ?self.config.kind, "buffer allocated");
        Ok(Buffer::from_storage(storage, self.config))
    }

    /// Allocates a buffer holding a copy of `bytes`, all of them readable.
    pub fn copy_of(&self, bytes: &[u8]) -> Result<Buffer> {
        let mut buf = self.allocate(bytes.len())?;
        buf.write_bytes(bytes)?;
        Ok(buf)
    }

    /// Builds a composite from buffers handed over by their owners, in order.
    ///
    /// The composite's offsets come from the constituents' own offsets, and
    /// it grows with this allocator's configuration. An empty list gives an
    /// empty composite.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Composition`] if the constituents' written or
    /// read prefixes leave a gap, or [`BufferError::SizeTooBig`] if their
    /// total capacity passes the configured maximum.
    pub fn compose<I>(&self, parts: I) -> Result<Buffer>
    where
        I: IntoIterator<Item = Transfer>,
    {
        let parts: Vec<Buffer> = parts.into_iter().map(Transfer::receive).collect();
        let total = parts
            .iter()
            .try_fold(0usize, |sum, part| sum.checked_add(part.capacity()))
            .unwrap_or(usize::MAX);
        self.check_size(total)?;
        Buffer::compose_parts(self.config, parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_kinds() {
        let heap = BufferAllocator::on_heap().allocate(16).unwrap();
        assert!(!heap.is_direct());
        assert_eq!(heap.config().kind, StorageKind::OnHeap);

        let direct = BufferAllocator::off_heap().allocate(16).unwrap();
        assert!(direct.is_direct());
        assert!(!direct.is_composite());
    }

    #[test]
    fn test_allocate_zero_sized() {
        let buf = BufferAllocator::off_heap().allocate(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.writable_bytes(), 0);
    }

    #[test]
    fn test_allocate_over_max() {
        let alloc = BufferAllocator::new(AllocatorConfig::default().with_max_capacity(32));
        assert_eq!(
            alloc.allocate(33).unwrap_err(),
            BufferError::SizeTooBig {
                requested: 33,
                max: 32
            }
        );
        assert!(alloc.allocate(32).is_ok());
    }

    #[test]
    fn test_copy_of() {
        let mut buf = BufferAllocator::on_heap().copy_of(b"abc").unwrap();
        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.writer_offset(), 3);
        assert_eq!(buf.read_u8().unwrap(), b'a');
    }

    #[test]
    fn test_compose_over_max() {
        let small = BufferAllocator::new(AllocatorConfig::default().with_max_capacity(8));
        let heap = BufferAllocator::on_heap();
        let a = heap.allocate(6).unwrap().send().unwrap();
        let b = heap.allocate(6).unwrap().send().unwrap();
        assert!(matches!(
            small.compose([a, b]),
            Err(BufferError::SizeTooBig { requested: 12, max: 8 })
        ));
    }

    #[test]
    fn test_compose_uses_allocator_config_for_growth() {
        let heap = BufferAllocator::on_heap();
        let direct = BufferAllocator::off_heap();
        let part = heap.allocate(2).unwrap().send().unwrap();
        let mut buf = direct.compose([part]).unwrap();
        buf.write_u32(1).unwrap();
        assert_eq!(buf.count_components(), 2);
        assert_eq!(buf.config().kind, StorageKind::OffHeap);
    }
}
