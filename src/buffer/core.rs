// src/buffer/core.rs
//! Core buffer structure: offsets, capacity, growth and lifecycle
//!
//! This module provides the fundamental [`Buffer`] type. A buffer is a
//! logically contiguous address space backed by one storage region, or by
//! several when it is a composite. All storage is securely zeroed when it is
//! released.

use super::segments::Segments;
use crate::allocator::AllocatorConfig;
use crate::error::{BufferError, Result};
use crate::memory::{Storage, StorageKind};

/// A byte buffer with independent reader and writer offsets.
///
/// `0 <= reader_offset() <= writer_offset() <= capacity()` holds after
/// every call, including failed ones. Reads consume
/// `reader_offset()..writer_offset()`, writes fill
/// `writer_offset()..capacity()` and grow the buffer when it is full.
///
/// A buffer has exactly one owner. Hand it to another thread with
/// [`send`](Self::send), release it early with [`close`](Self::close), or
/// let it drop.
///
/// # Examples
///
/// ```
/// use segbuf::BufferAllocator;
/// # use segbuf::BufferError;
///
/// let mut buf = BufferAllocator::on_heap().allocate(16)?;
/// buf.write_u32(42)?.write_bytes(b"hello")?;
/// assert_eq!(buf.readable_bytes(), 9);
/// assert_eq!(buf.read_u32()?, 42);
/// # Ok::<(), BufferError>(())
/// ```
pub struct Buffer {
    pub(crate) segments: Segments,
    pub(crate) roff: usize,
    pub(crate) woff: usize,
    pub(crate) composite: bool,
    pub(crate) closed: bool,
    pub(crate) config: AllocatorConfig,
}

impl Buffer {
    pub(crate) fn from_storage(storage: Storage, config: AllocatorConfig) -> Self {
        Self::from_segments(Segments::single(storage), 0, 0, false, config)
    }

    pub(crate) fn from_segments(
        segments: Segments,
        roff: usize,
        woff: usize,
        composite: bool,
        config: AllocatorConfig,
    ) -> Self {
        debug_assert!(roff <= woff && woff <= segments.capacity());
        Self {
            segments,
            roff,
            woff,
            composite,
            closed: false,
            config,
        }
    }

    /// Returns the total capacity of the buffer, `0` once closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let buf = BufferAllocator::on_heap().allocate(1024)?;
    /// assert_eq!(buf.capacity(), 1024);
    /// # Ok::<(), BufferError>(())
    /// ```
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.segments.capacity()
    }

    /// Offset of the next byte to read.
    #[inline(always)]
    pub fn reader_offset(&self) -> usize {
        self.roff
    }

    /// Offset of the next byte to write.
    #[inline(always)]
    pub fn writer_offset(&self) -> usize {
        self.woff
    }

    /// Number of bytes between the reader and writer offsets.
    #[inline(always)]
    pub fn readable_bytes(&self) -> usize {
        self.woff - self.roff
    }

    /// Number of bytes between the writer offset and the capacity.
    #[inline(always)]
    pub fn writable_bytes(&self) -> usize {
        self.capacity() - self.woff
    }

    /// Returns `true` if every storage region is direct (off-heap).
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// assert!(BufferAllocator::off_heap().allocate(8)?.is_direct());
    /// assert!(!BufferAllocator::on_heap().allocate(8)?.is_direct());
    /// # Ok::<(), BufferError>(())
    /// ```
    #[inline]
    pub fn is_direct(&self) -> bool {
        self.segments.is_direct()
    }

    /// Returns `true` if the buffer aggregates separately allocated regions.
    #[inline]
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Returns `false` once the buffer has been closed.
    #[inline]
    pub fn is_accessible(&self) -> bool {
        !self.closed
    }

    /// Configuration used when this buffer grows.
    #[inline]
    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    #[inline(always)]
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.closed {
            return Err(BufferError::Closed);
        }
        Ok(())
    }

    /// Checks that `offset..offset + length` lies within the capacity.
    #[inline]
    pub(crate) fn check_range(&self, offset: usize, length: usize) -> Result<()> {
        match offset.checked_add(length) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(BufferError::OutOfBounds {
                offset,
                length,
                capacity: self.capacity(),
            }),
        }
    }

    #[inline]
    pub(crate) fn check_readable(&self, requested: usize) -> Result<()> {
        if requested > self.readable_bytes() {
            return Err(BufferError::InsufficientData {
                requested,
                available: self.readable_bytes(),
            });
        }
        Ok(())
    }

    /// Moves the reader offset.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidOffset`] if `offset` exceeds the writer offset.
    pub fn set_reader_offset(&mut self, offset: usize) -> Result<&mut Self> {
        self.ensure_live()?;
        if offset > self.woff {
            return Err(BufferError::InvalidOffset {
                offset,
                min: 0,
                max: self.woff,
            });
        }
        self.roff = offset;
        Ok(self)
    }

    /// Moves the writer offset.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InvalidOffset`] if `offset` is below the reader
    /// offset or above the capacity.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(16)?;
    /// buf.fill(0xA5)?.set_writer_offset(16)?;
    /// assert_eq!(buf.read_u64()?, 0xA5A5_A5A5_A5A5_A5A5);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn set_writer_offset(&mut self, offset: usize) -> Result<&mut Self> {
        self.ensure_live()?;
        if offset < self.roff || offset > self.capacity() {
            return Err(BufferError::InvalidOffset {
                offset,
                min: self.roff,
                max: self.capacity(),
            });
        }
        self.woff = offset;
        Ok(self)
    }

    /// Advances the reader offset by `count` without reading.
    pub fn skip_readable(&mut self, count: usize) -> Result<&mut Self> {
        self.ensure_live()?;
        self.check_readable(count)?;
        self.roff += count;
        Ok(self)
    }

    /// Advances the writer offset by `count` without writing.
    pub fn skip_writable(&mut self, count: usize) -> Result<&mut Self> {
        self.ensure_live()?;
        self.check_range(self.woff, count)?;
        self.woff += count;
        Ok(self)
    }

    /// Sets both offsets to zero. Contents are left as they are.
    pub fn reset_offsets(&mut self) -> Result<&mut Self> {
        self.ensure_live()?;
        self.roff = 0;
        self.woff = 0;
        Ok(self)
    }

    /// Overwrites every byte in `0..capacity()` with `value`.
    ///
    /// Offsets are not moved.
    pub fn fill(&mut self, value: u8) -> Result<&mut Self> {
        self.ensure_live()?;
        self.segments.fill(value);
        Ok(self)
    }

    /// Makes sure at least `size` bytes are writable, growing if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::SizeTooBig`] if the required capacity exceeds
    /// the configured maximum, or [`BufferError::Growth`] if storage could
    /// not be obtained. The buffer is unchanged on error.
    pub fn ensure_writable(&mut self, size: usize) -> Result<&mut Self> {
        self.ensure_live()?;
        if self.writable_bytes() < size {
            let required = self
                .woff
                .checked_add(size)
                .ok_or(BufferError::SizeTooBig {
                    requested: usize::MAX,
                    max: self.config.max_capacity,
                })?;
            self.grow(required)?;
        }
        Ok(self)
    }

    /// Expands capacity to at least `required`.
    ///
    /// A single-region buffer moves to a new region and copies its bytes
    /// over; a composite appends a region. Either way the old state stays
    /// intact until the new storage exists.
    fn grow(&mut self, required: usize) -> Result<()> {
        let current = self.capacity();
        let max = self.config.max_capacity;
        if required > max {
            tracing::warn!(required, max, "buffer growth exceeds maximum capacity");
            return Err(BufferError::SizeTooBig {
                requested: required,
                max,
            });
        }

        let target = self.config.growth.next_capacity(current, required, max);
        if self.composite {
            let storage = Storage::allocate(self.config.kind, target - current)
                .inspect_err(|e| tracing::warn!(target, error = %e, "composite growth failed"))?;
            self.segments.push(storage);
        } else {
            let kind = self.segments.leading_kind().unwrap_or(self.config.kind);
            let mut storage = Storage::allocate(kind, target)
                .inspect_err(|e| tracing::warn!(target, error = %e, "buffer growth failed"))?;
            self.segments.read_at(0, &mut storage.as_mut_slice()[..current]);
            self.segments = Segments::single(storage);
        }

        tracing::trace!(from = current, to = target, composite = self.composite, "buffer grown");
        Ok(())
    }

    /// Moves the readable bytes to the start of the buffer, making room at
    /// the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(8)?;
    /// buf.write_u32(0x0102_0304)?.read_u16()?;
    /// buf.compact()?;
    /// assert_eq!(buf.reader_offset(), 0);
    /// assert_eq!(buf.writer_offset(), 2);
    /// assert_eq!(buf.read_u16()?, 0x0304);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn compact(&mut self) -> Result<&mut Self> {
        self.ensure_live()?;
        let len = self.readable_bytes();
        self.segments.copy_within(self.roff, 0, len);
        self.roff = 0;
        self.woff = len;
        Ok(self)
    }

    /// Copies the readable bytes into a new, independently owned buffer.
    ///
    /// The copy is a single region (never composite), direct only if this
    /// buffer is direct, and has its writer offset at the end of the copied
    /// bytes. This buffer's offsets are unchanged.
    pub fn copy(&self) -> Result<Buffer> {
        self.copy_range(self.roff, self.readable_bytes())
    }

    /// Copies `offset..offset + length` into a new, independently owned buffer.
    pub fn copy_range(&self, offset: usize, length: usize) -> Result<Buffer> {
        self.ensure_live()?;
        self.check_range(offset, length)?;
        let kind = if self.is_direct() {
            StorageKind::OffHeap
        } else {
            StorageKind::OnHeap
        };
        let mut storage = Storage::allocate(kind, length)?;
        self.segments.read_at(offset, storage.as_mut_slice());
        let config = AllocatorConfig { kind, ..self.config };
        let mut copy = Buffer::from_storage(storage, config);
        copy.woff = length;
        Ok(copy)
    }

    /// Securely zeros all storage and resets both offsets.
    ///
    /// Uses compiler-resistant zeroing via the [`zeroize`] crate.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(16)?;
    /// buf.write_bytes(b"sensitive data")?;
    /// buf.burn()?;
    /// assert_eq!(buf.readable_bytes(), 0);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn burn(&mut self) -> Result<&mut Self> {
        self.ensure_live()?;
        self.segments.zeroize();
        self.roff = 0;
        self.woff = 0;
        Ok(self)
    }

    /// Releases the storage now instead of at drop.
    ///
    /// Released storage is zeroed before it goes back to the system. Every
    /// later operation fails with [`BufferError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::DoubleClose`] if the buffer was already closed.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::{BufferAllocator, BufferError};
    ///
    /// let mut buf = BufferAllocator::off_heap().allocate(8)?;
    /// buf.close()?;
    /// assert_eq!(buf.write_u8(1).unwrap_err(), BufferError::Closed);
    /// assert_eq!(buf.close().unwrap_err(), BufferError::DoubleClose);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(BufferError::DoubleClose);
        }
        let capacity = self.capacity();
        self.segments.clear();
        self.roff = 0;
        self.woff = 0;
        self.closed = true;
        tracing::trace!(capacity, "buffer closed");
        Ok(())
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("reader_offset", &self.roff)
            .field("writer_offset", &self.woff)
            .field("capacity", &self.capacity())
            .field("components", &self.segments.count())
            .field("composite", &self.composite)
            .field("closed", &self.closed)
            .finish()
    }
}
