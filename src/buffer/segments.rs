// src/buffer/segments.rs
//! Ordered storage regions forming one logical address space

use crate::memory::{Storage, StorageKind};
use zeroize::Zeroize;

/// The storage regions behind a buffer, with cumulative end offsets.
///
/// Region `i` covers logical offsets `start_of(i)..ends[i]`. Regions are
/// never empty, so every logical offset below `capacity()` maps to exactly
/// one region. The kinds of dropped empty regions are still recorded for
/// `is_direct`.
#[derive(Debug, Default)]
pub(crate) struct Segments {
    parts: Vec<Storage>,
    ends: Vec<usize>,
    has_heap: bool,
    has_direct: bool,
}

impl Segments {
    pub(crate) fn single(storage: Storage) -> Self {
        let mut segments = Self::default();
        segments.push(storage);
        segments
    }

    /// Appends a region at the end of the address space. Empty regions are
    /// dropped.
    pub(crate) fn push(&mut self, storage: Storage) {
        self.note_kind(storage.kind());
        if storage.len() == 0 {
            return;
        }
        let end = self.capacity() + storage.len();
        self.parts.push(storage);
        self.ends.push(end);
    }

    fn note_kind(&mut self, kind: StorageKind) {
        match kind {
            StorageKind::OnHeap => self.has_heap = true,
            StorageKind::OffHeap => self.has_direct = true,
        }
    }

    /// Appends every region of `other`, keeping its recorded kinds.
    pub(crate) fn absorb(&mut self, other: Segments) {
        self.has_heap |= other.has_heap;
        self.has_direct |= other.has_direct;
        for storage in other.parts {
            self.push(storage);
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    #[inline(always)]
    pub(crate) fn count(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub(crate) fn start_of(&self, index: usize) -> usize {
        if index == 0 { 0 } else { self.ends[index - 1] }
    }

    /// Index of the region holding logical `offset`. Offsets at or past the
    /// capacity map to `count()`.
    #[inline]
    pub(crate) fn locate(&self, offset: usize) -> usize {
        self.ends.partition_point(|&end| end <= offset)
    }

    #[cfg(test)]
    pub(crate) fn storage(&self, index: usize) -> &Storage {
        &self.parts[index]
    }

    /// Regions and end offsets, borrowed separately so iterators can hold
    /// mutable region access next to the offset table.
    pub(crate) fn split_mut(&mut self) -> (&mut [Storage], &[usize]) {
        (&mut self.parts, &self.ends)
    }

    pub(crate) fn split(&self) -> (&[Storage], &[usize]) {
        (&self.parts, &self.ends)
    }

    /// Returns `true` if at least one region was pushed and all were direct,
    /// empty ones included.
    pub(crate) fn is_direct(&self) -> bool {
        self.has_direct && !self.has_heap
    }

    /// Kind of the first region, if any.
    pub(crate) fn leading_kind(&self) -> Option<StorageKind> {
        self.parts.first().map(Storage::kind)
    }

    /// Calls `f` with each contiguous slice covering `offset..offset + len`.
    ///
    /// Caller guarantees the range is within `capacity()`.
    pub(crate) fn for_each_chunk(&self, offset: usize, len: usize, mut f: impl FnMut(&[u8])) {
        let mut pos = offset;
        let end = offset + len;
        let mut index = self.locate(pos);
        while pos < end {
            let start = self.start_of(index);
            let part = self.parts[index].as_slice();
            let inner = pos - start;
            let n = (part.len() - inner).min(end - pos);
            f(&part[inner..inner + n]);
            pos += n;
            index += 1;
        }
    }

    /// Copies `dst.len()` bytes starting at logical `offset` into `dst`.
    pub(crate) fn read_at(&self, offset: usize, dst: &mut [u8]) {
        let mut done = 0;
        self.for_each_chunk(offset, dst.len(), |chunk| {
            dst[done..done + chunk.len()].copy_from_slice(chunk);
            done += chunk.len();
        });
    }

    /// Copies `src` into the logical range starting at `offset`.
    ///
    /// Caller guarantees the range is within `capacity()`.
    pub(crate) fn write_at(&mut self, offset: usize, src: &[u8]) {
        let mut pos = offset;
        let mut done = 0;
        let mut index = self.locate(pos);
        while done < src.len() {
            let start = self.start_of(index);
            let part = self.parts[index].as_mut_slice();
            let inner = pos - start;
            let n = (part.len() - inner).min(src.len() - done);
            part[inner..inner + n].copy_from_slice(&src[done..done + n]);
            done += n;
            pos += n;
            index += 1;
        }
    }

    #[cfg(test)]
    pub(crate) fn byte_at(&self, offset: usize) -> u8 {
        let index = self.locate(offset);
        self.parts[index].as_slice()[offset - self.start_of(index)]
    }

    /// Contiguous bytes of the region holding `offset`, with the region's
    /// logical start.
    pub(crate) fn region_at(&self, offset: usize) -> (usize, &[u8]) {
        let index = self.locate(offset);
        (self.start_of(index), self.parts[index].as_slice())
    }

    pub(crate) fn fill(&mut self, value: u8) {
        for part in &mut self.parts {
            part.as_mut_slice().fill(value);
        }
    }

    /// Wipes every region with compiler-resistant zeroing.
    pub(crate) fn zeroize(&mut self) {
        for part in &mut self.parts {
            part.as_mut_slice().zeroize();
        }
    }

    /// Moves `len` bytes from `src` to `dst` (ranges may overlap).
    pub(crate) fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        if len == 0 || src == dst {
            return;
        }
        if self.parts.len() == 1 {
            self.parts[0]
                .as_mut_slice()
                .copy_within(src..src + len, dst);
            return;
        }
        let mut scratch = vec![0u8; len];
        self.read_at(src, &mut scratch);
        self.write_at(dst, &scratch);
    }

    /// Releases every region, leaving an empty address space.
    pub(crate) fn clear(&mut self) {
        self.parts.clear();
        self.ends.clear();
        self.has_heap = false;
        self.has_direct = false;
    }

    pub(crate) fn into_parts(self) -> Vec<Storage> {
        self.parts
    }
}
