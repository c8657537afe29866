// src/buffer/component.rs
//! Zero-copy component access for vectored and native I/O
//!
//! A component is a window over one contiguous storage region covering part
//! of a buffer's readable or writable bytes. Components never straddle two
//! regions, so a composite yields at least one component per region that
//! contributes bytes.
//!
//! Skipping bytes on a component commits them straight to the owning buffer:
//! the reader (or writer) offset advances by the skipped count before the
//! skip call returns. Components borrow the buffer, so it cannot grow or
//! be closed while one is alive.

use super::core::Buffer;
use crate::error::{BufferError, Result};
use crate::memory::{Access, ByteWindow, Storage};
use std::ops::ControlFlow;

/// Outcome of a `for_each_*` traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every component was visited; holds the number visited
    Completed(usize),
    /// The visitor returned [`ControlFlow::Break`]; holds the number visited,
    /// including the one that stopped
    Stopped(usize),
}

impl Traversal {
    /// Number of components the visitor saw.
    pub fn visited(&self) -> usize {
        match *self {
            Self::Completed(n) | Self::Stopped(n) => n,
        }
    }

    /// Returns `true` if the visitor ended the traversal early.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

/// A readable window over one storage region.
pub struct ReadableComponent<'a> {
    storage: &'a Storage,
    start: usize,
    end: usize,
    limit: usize,
    reader: &'a mut usize,
}

impl ReadableComponent<'_> {
    /// Bytes left in this window.
    #[inline]
    pub fn readable_bytes(&self) -> usize {
        self.end - self.start
    }

    /// The remaining bytes of this window.
    #[inline]
    pub fn readable_slice(&self) -> &[u8] {
        &self.storage.as_slice()[self.start..self.end]
    }

    /// Native address of the first remaining byte, `0` for heap storage.
    #[inline]
    pub fn readable_native_address(&self) -> usize {
        self.storage.address_at(self.start)
    }

    /// Describes the remaining bytes as a read-only window.
    #[inline]
    pub fn readable_window(&self) -> ByteWindow {
        self.storage
            .window(self.start, self.readable_bytes(), Access::ReadOnly)
    }

    /// Marks `count` bytes of this window as read.
    ///
    /// The buffer's reader offset advances by `count` immediately.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if `count` exceeds the bytes
    /// left in this window or the buffer's readable bytes.
    pub fn skip_readable(&mut self, count: usize) -> Result<()> {
        let available = self.readable_bytes().min(self.limit - *self.reader);
        if count > available {
            return Err(BufferError::InsufficientData {
                requested: count,
                available,
            });
        }
        self.start += count;
        *self.reader += count;
        Ok(())
    }
}

/// A writable window over one storage region.
pub struct WritableComponent<'a> {
    storage: &'a mut Storage,
    start: usize,
    end: usize,
    limit: usize,
    writer: &'a mut usize,
}

impl WritableComponent<'_> {
    /// Bytes left in this window.
    #[inline]
    pub fn writable_bytes(&self) -> usize {
        self.end - self.start
    }

    /// The remaining bytes of this window, for filling in place.
    #[inline]
    pub fn writable_slice(&mut self) -> &mut [u8] {
        &mut self.storage.as_mut_slice()[self.start..self.end]
    }

    /// Native address of the first remaining byte, `0` for heap storage.
    #[inline]
    pub fn writable_native_address(&self) -> usize {
        self.storage.address_at(self.start)
    }

    /// Describes the remaining bytes as a read-write window.
    #[inline]
    pub fn writable_window(&self) -> ByteWindow {
        self.storage
            .window(self.start, self.writable_bytes(), Access::ReadWrite)
    }

    /// Marks `count` bytes of this window as written.
    ///
    /// The buffer's writer offset advances by `count` immediately. Bytes
    /// become readable in offset order, so skipping in a later window while
    /// an earlier one is untouched exposes the earlier bytes first.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] if `count` exceeds the bytes left
    /// in this window or the buffer's writable bytes.
    pub fn skip_writable(&mut self, count: usize) -> Result<()> {
        if count > self.writable_bytes().min(self.limit - *self.writer) {
            return Err(BufferError::OutOfBounds {
                offset: *self.writer,
                length: count,
                capacity: self.limit,
            });
        }
        self.start += count;
        *self.writer += count;
        Ok(())
    }
}

/// Steps through the readable components of a buffer.
///
/// This is a lending iterator: each component borrows the iterator, so only
/// one is alive at a time.
pub struct ReadableComponents<'a> {
    parts: &'a [Storage],
    ends: &'a [usize],
    index: usize,
    next: usize,
    limit: usize,
    reader: &'a mut usize,
}

impl ReadableComponents<'_> {
    /// Produces the next readable window, or `None` when the region is covered.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<ReadableComponent<'_>> {
        if self.next >= self.limit {
            return None;
        }
        while self.ends[self.index] <= self.next {
            self.index += 1;
        }
        let region_start = if self.index == 0 { 0 } else { self.ends[self.index - 1] };
        let end = self.ends[self.index].min(self.limit);
        let component = ReadableComponent {
            storage: &self.parts[self.index],
            start: self.next - region_start,
            end: end - region_start,
            limit: self.limit,
            reader: &mut *self.reader,
        };
        self.next = end;
        self.index += 1;
        Some(component)
    }
}

/// Steps through the writable components of a buffer.
///
/// This is a lending iterator: each component borrows the iterator, so only
/// one is alive at a time.
pub struct WritableComponents<'a> {
    parts: &'a mut [Storage],
    ends: &'a [usize],
    index: usize,
    next: usize,
    limit: usize,
    writer: &'a mut usize,
}

impl WritableComponents<'_> {
    /// Produces the next writable window, or `None` when the region is covered.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<WritableComponent<'_>> {
        if self.next >= self.limit {
            return None;
        }
        while self.ends[self.index] <= self.next {
            self.index += 1;
        }
        let region_start = if self.index == 0 { 0 } else { self.ends[self.index - 1] };
        let end = self.ends[self.index];
        let component = WritableComponent {
            storage: &mut self.parts[self.index],
            start: self.next - region_start,
            end: end - region_start,
            limit: self.limit,
            writer: &mut *self.writer,
        };
        self.next = end;
        self.index += 1;
        Some(component)
    }
}

impl Buffer {
    /// Number of storage regions behind this buffer.
    pub fn count_components(&self) -> usize {
        self.segments.count()
    }

    /// Number of components needed to cover the readable bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(8)?;
    /// assert_eq!(buf.count_readable_components(), 0);
    /// assert_eq!(buf.count_writable_components(), 1);
    /// buf.write_u64(42)?;
    /// assert_eq!(buf.count_readable_components(), 1);
    /// assert_eq!(buf.count_writable_components(), 0);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn count_readable_components(&self) -> usize {
        if self.readable_bytes() == 0 {
            return 0;
        }
        self.segments.locate(self.woff - 1) - self.segments.locate(self.roff) + 1
    }

    /// Number of components needed to cover the writable bytes.
    pub fn count_writable_components(&self) -> usize {
        if self.writable_bytes() == 0 {
            return 0;
        }
        self.segments.locate(self.capacity() - 1) - self.segments.locate(self.woff) + 1
    }

    /// Starts a stepped walk over the readable components.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().copy_of(b"hello")?;
    /// let mut components = buf.readable_components()?;
    /// while let Some(mut component) = components.next() {
    ///     assert_eq!(component.readable_slice(), b"hello");
    ///     component.skip_readable(2)?;
    /// }
    /// assert_eq!(buf.reader_offset(), 2);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn readable_components(&mut self) -> Result<ReadableComponents<'_>> {
        self.ensure_live()?;
        let (next, limit) = (self.roff, self.woff);
        let (parts, ends) = self.segments.split();
        Ok(ReadableComponents {
            parts,
            ends,
            index: 0,
            next,
            limit,
            reader: &mut self.roff,
        })
    }

    /// Starts a stepped walk over the writable components.
    pub fn writable_components(&mut self) -> Result<WritableComponents<'_>> {
        self.ensure_live()?;
        let next = self.woff;
        let limit = self.segments.capacity();
        let (parts, ends) = self.segments.split_mut();
        Ok(WritableComponents {
            parts,
            ends,
            index: 0,
            next,
            limit,
            writer: &mut self.woff,
        })
    }

    /// Calls `visitor` with each readable component in storage order.
    ///
    /// The first component is passed `initial_index`, the next
    /// `initial_index + 1`, and so on. Returning [`ControlFlow::Break`] ends
    /// the walk.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::{BufferAllocator, Traversal};
    /// use std::ops::ControlFlow;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::off_heap().allocate(8)?;
    /// buf.write_u32(0x0102_0304)?;
    /// let outcome = buf.for_each_readable(0, |_, component| {
    ///     assert_ne!(component.readable_native_address(), 0);
    ///     component.skip_readable(1).unwrap();
    ///     ControlFlow::Continue(())
    /// })?;
    /// assert_eq!(outcome, Traversal::Completed(1));
    /// assert_eq!(buf.read_u8()?, 0x02);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn for_each_readable<F>(&mut self, initial_index: usize, mut visitor: F) -> Result<Traversal>
    where
        F: FnMut(usize, &mut ReadableComponent<'_>) -> ControlFlow<()>,
    {
        let mut components = self.readable_components()?;
        let mut visited = 0;
        while let Some(mut component) = components.next() {
            let index = initial_index + visited;
            visited += 1;
            if visitor(index, &mut component).is_break() {
                return Ok(Traversal::Stopped(visited));
            }
        }
        Ok(Traversal::Completed(visited))
    }

    /// Calls `visitor` with each writable component in storage order.
    ///
    /// Indexing and early exit work as in
    /// [`for_each_readable`](Self::for_each_readable).
    pub fn for_each_writable<F>(&mut self, initial_index: usize, mut visitor: F) -> Result<Traversal>
    where
        F: FnMut(usize, &mut WritableComponent<'_>) -> ControlFlow<()>,
    {
        let mut components = self.writable_components()?;
        let mut visited = 0;
        while let Some(mut component) = components.next() {
            let index = initial_index + visited;
            visited += 1;
            if visitor(index, &mut component).is_break() {
                return Ok(Traversal::Stopped(visited));
            }
        }
        Ok(Traversal::Completed(visited))
    }
}
