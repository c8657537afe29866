// src/memory/window.rs
//! Byte windows: address, length and access mode of one contiguous span

/// Whether a window may be written through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Bytes may only be read
    ReadOnly,
    /// Bytes may be read and written
    ReadWrite,
}

/// A contiguous span of bytes inside one storage region.
///
/// `address` is the process address of the first byte for direct storage and
/// `0` for heap storage, which has no stable address (the allocation may move
/// when the buffer grows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteWindow {
    address: usize,
    len: usize,
    access: Access,
}

impl ByteWindow {
    pub(crate) fn new(address: usize, len: usize, access: Access) -> Self {
        Self {
            address,
            len,
            access,
        }
    }

    /// Native address of the first byte, or `0` for heap storage.
    #[inline]
    pub fn address(&self) -> usize {
        self.address
    }

    /// Number of bytes in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the window spans no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Access mode of the window.
    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Returns `true` if the window has a stable native address.
    #[inline]
    pub fn is_native(&self) -> bool {
        self.address != 0
    }
}
