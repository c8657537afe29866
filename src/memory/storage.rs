// src/memory/storage.rs
//! The storage capability set shared by every buffer

use super::direct::DirectRegion;
use super::window::{Access, ByteWindow};
use crate::error::{BufferError, Result};
use zeroize::Zeroize;

/// Where a buffer's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageKind {
    /// A heap `Vec<u8>`; no stable native address
    #[default]
    OnHeap,
    /// Memory outside any `Vec`, addressable by a raw process address
    OffHeap,
}

/// One physical storage region.
///
/// All cursor and component logic is written against this enum, so a buffer
/// can mix heap and direct regions freely. Contents are wiped on drop.
pub(crate) enum Storage {
    Heap(Vec<u8>),
    Direct(DirectRegion),
}

impl Storage {
    /// Allocates `len` zeroed bytes of the given kind.
    pub(crate) fn allocate(kind: StorageKind, len: usize) -> Result<Self> {
        match kind {
            StorageKind::OnHeap => {
                let mut data = Vec::new();
                data.try_reserve_exact(len)
                    .map_err(|e| BufferError::Growth {
                        requested: len,
                        reason: e.to_string(),
                    })?;
                data.resize(len, 0);
                Ok(Self::Heap(data))
            }
            StorageKind::OffHeap => DirectRegion::allocate(len).map(Self::Direct),
        }
    }

    #[inline(always)]
    pub(crate) fn kind(&self) -> StorageKind {
        match self {
            Self::Heap(_) => StorageKind::OnHeap,
            Self::Direct(_) => StorageKind::OffHeap,
        }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Heap(data) => data.len(),
            Self::Direct(region) => region.len(),
        }
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Self::Heap(data) => data.as_slice(),
            Self::Direct(region) => region.as_slice(),
        }
    }

    #[inline(always)]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Self::Heap(data) => data.as_mut_slice(),
            Self::Direct(region) => region.as_mut_slice(),
        }
    }

    /// Native address of byte `offset`, or `0` for heap storage.
    #[inline]
    pub(crate) fn address_at(&self, offset: usize) -> usize {
        match self {
            Self::Heap(_) => 0,
            Self::Direct(region) => region.address() + offset,
        }
    }

    /// Describes `len` bytes starting at `offset`.
    #[inline]
    pub(crate) fn window(&self, offset: usize, len: usize, access: Access) -> ByteWindow {
        ByteWindow::new(self.address_at(offset), len, access)
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        // Direct regions wipe themselves before deallocating.
        if let Self::Heap(data) = self {
            data.as_mut_slice().zeroize();
        }
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("kind", &self.kind())
            .field("len", &self.len())
            .finish()
    }
}
