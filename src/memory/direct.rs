// src/memory/direct.rs
//! Direct (off-heap) memory regions obtained straight from the global allocator

use crate::error::{BufferError, Result};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ptr::NonNull;
use zeroize::Zeroize;

/// Alignment of every direct region; wide enough for any primitive access.
const DIRECT_ALIGN: usize = 8;

/// A fixed-size, zero-initialised block of memory outside any `Vec`.
///
/// The block's address never changes for its lifetime, which is what lets
/// components hand it to vectored I/O. Contents are zeroed before the memory
/// goes back to the allocator.
pub(crate) struct DirectRegion {
    ptr: NonNull<u8>,
    len: usize,
}

// SAFETY: DirectRegion owns its memory exclusively; nothing else aliases `ptr`.
unsafe impl Send for DirectRegion {}
// SAFETY: shared access only hands out `&[u8]`, mutation requires `&mut self`.
unsafe impl Sync for DirectRegion {}

impl DirectRegion {
    /// Allocates `len` zeroed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Growth`] if the layout is invalid or the system
    /// allocator returns null.
    pub(crate) fn allocate(len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len: 0,
            });
        }

        let layout = Self::layout(len)?;
        // SAFETY: layout has non-zero size and a power-of-two alignment.
        let ptr = unsafe { alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or_else(|| BufferError::Growth {
            requested: len,
            reason: "direct allocation returned null".to_string(),
        })?;

        Ok(Self { ptr, len })
    }

    fn layout(len: usize) -> Result<Layout> {
        Layout::from_size_align(len, DIRECT_ALIGN).map_err(|e| BufferError::Growth {
            requested: len,
            reason: e.to_string(),
        })
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Process address of the first byte.
    #[inline(always)]
    pub(crate) fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for `len` initialised bytes (zeroed at
        // allocation) and dangling-but-aligned when `len == 0`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and `&mut self` guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for DirectRegion {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        self.as_mut_slice().zeroize();
        // Layout was valid when this region was allocated with the same len.
        if let Ok(layout) = Self::layout(self.len) {
            // SAFETY: ptr was allocated with this layout in `allocate`.
            unsafe { dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}
