// src/buffer/composite.rs
//! Composite buffers: several owned buffers presented as one
//!
//! A composite's capacity is the sum of its constituents' capacities, laid
//! out in order with no gaps. Its offsets are derived from the constituents'
//! offsets when they are absorbed, which only works if the written (and read)
//! prefix of the composite is contiguous: every constituent before one that
//! is partially written must be full, and every constituent after it must be
//! unwritten.

use super::core::Buffer;
use super::segments::Segments;
use crate::allocator::AllocatorConfig;
use crate::error::{BufferError, Result};

/// Accumulates one offset across constituents, rejecting gaps.
struct OffsetScan {
    total: usize,
    open: bool,
    what: &'static str,
}

impl OffsetScan {
    fn new(what: &'static str) -> Self {
        Self {
            total: 0,
            open: true,
            what,
        }
    }

    fn add(&mut self, offset: usize, capacity: usize, index: usize) -> Result<()> {
        if self.open {
            self.total += offset;
            self.open = offset == capacity;
        } else if offset > 0 {
            return Err(BufferError::Composition(format!(
                "constituent {} has a {} offset after a partially filled constituent",
                index, self.what
            )));
        }
        Ok(())
    }
}

impl Buffer {
    /// Builds a composite from owned constituents, in order.
    pub(crate) fn compose_parts(config: AllocatorConfig, parts: Vec<Buffer>) -> Result<Buffer> {
        let mut readers = OffsetScan::new("reader");
        let mut writers = OffsetScan::new("writer");
        for (index, part) in parts.iter().enumerate() {
            if part.closed {
                return Err(BufferError::Composition(format!(
                    "constituent {} is closed",
                    index
                )));
            }
            readers.add(part.roff, part.capacity(), index)?;
            writers.add(part.woff, part.capacity(), index)?;
        }

        let count = parts.len();
        let mut segments = Segments::default();
        for part in parts {
            segments.absorb(part.segments);
        }

        tracing::trace!(
            constituents = count,
            capacity = segments.capacity(),
            reader_offset = readers.total,
            writer_offset = writers.total,
            "composite buffer built"
        );
        Ok(Buffer::from_segments(
            segments,
            readers.total,
            writers.total,
            true,
            config,
        ))
    }

    /// Appends `extension` to the end of this buffer, making it a composite.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Composition`] if the extension has been written
    /// (or read) while this buffer's writer (or reader) offset is short of
    /// its capacity, since the written region would then have a gap.
    /// Returns [`BufferError::SizeTooBig`] if the combined capacity passes
    /// the configured maximum. This buffer is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let alloc = BufferAllocator::on_heap();
    /// let mut buf = alloc.copy_of(&[1, 2])?;
    /// buf.extend_with(alloc.copy_of(&[3, 4])?.send()?)?;
    /// assert!(buf.is_composite());
    /// assert_eq!(buf.read_u32()?, 0x0102_0304);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn extend_with(&mut self, extension: crate::buffer::Transfer) -> Result<&mut Self> {
        self.ensure_live()?;
        let extension = extension.receive();
        let capacity = self.capacity();
        if extension.woff > 0 && self.woff != capacity {
            return Err(BufferError::Composition(
                "extension is written but this buffer's writer offset is short of its capacity"
                    .to_string(),
            ));
        }
        if extension.roff > 0 && self.roff != capacity {
            return Err(BufferError::Composition(
                "extension is read but this buffer's reader offset is short of its capacity"
                    .to_string(),
            ));
        }

        let total = capacity
            .checked_add(extension.capacity())
            .unwrap_or(usize::MAX);
        if total > self.config.max_capacity {
            tracing::warn!(total, max = self.config.max_capacity, "extension exceeds maximum capacity");
            return Err(BufferError::SizeTooBig {
                requested: total,
                max: self.config.max_capacity,
            });
        }

        self.roff += extension.roff;
        self.woff += extension.woff;
        self.segments.absorb(extension.segments);
        self.composite = true;
        tracing::trace!(capacity = self.capacity(), "buffer extended");
        Ok(self)
    }

    /// Splits this buffer into one owned buffer per storage region.
    ///
    /// Each part gets the slice of this buffer's offsets that falls inside
    /// it. A non-composite buffer comes back as a single part.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let alloc = BufferAllocator::on_heap();
    /// let a = alloc.allocate(4)?;
    /// let b = alloc.allocate(4)?;
    /// let mut composite = alloc.compose([a.send()?, b.send()?])?;
    /// composite.write_bytes(&[1, 2, 3, 4, 5, 6])?;
    ///
    /// let parts = composite.decompose()?;
    /// assert_eq!(parts.len(), 2);
    /// assert_eq!(parts[0].readable_bytes(), 4);
    /// assert_eq!(parts[1].readable_bytes(), 2);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn decompose(self) -> Result<Vec<Buffer>> {
        self.ensure_live()?;
        if !self.composite {
            return Ok(vec![self]);
        }

        let Buffer {
            segments,
            roff,
            woff,
            config,
            ..
        } = self;
        let mut start = 0;
        let mut parts = Vec::with_capacity(segments.count());
        for storage in segments.into_parts() {
            let len = storage.len();
            let part_config = AllocatorConfig {
                kind: storage.kind(),
                ..config
            };
            let mut part = Buffer::from_storage(storage, part_config);
            part.woff = woff.saturating_sub(start).min(len);
            part.roff = roff.saturating_sub(start).min(len);
            start += len;
            parts.push(part);
        }
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;
    use crate::allocator::{AllocatorConfig, BufferAllocator};
    use crate::error::BufferError;

    #[test]
    fn test_compose_sums_capacity() {
        let heap = BufferAllocator::on_heap();
        let direct = BufferAllocator::off_heap();
        let a = heap.allocate(3).unwrap();
        let b = direct.allocate(5).unwrap();
        let buf = heap.compose([a.send().unwrap(), b.send().unwrap()]).unwrap();
        assert!(buf.is_composite());
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.count_components(), 2);
        assert!(!buf.is_direct());
    }

    #[test]
    fn test_compose_picks_up_offsets() {
        let alloc = BufferAllocator::on_heap();
        let mut a = alloc.allocate(4).unwrap();
        a.write_u32(0x0102_0304).unwrap().read_u8().unwrap();
        let mut b = alloc.allocate(4).unwrap();
        b.write_u16(0x0506).unwrap();
        let mut buf = alloc.compose([a.send().unwrap(), b.send().unwrap()]).unwrap();
        assert_eq!(buf.writer_offset(), 6);
        assert_eq!(buf.reader_offset(), 1);
        let mut out = [0u8; 5];
        buf.read_bytes(&mut out).unwrap();
        assert_eq!(out, [2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_compose_rejects_gaps() {
        let alloc = BufferAllocator::on_heap();
        let mut a = alloc.allocate(4).unwrap();
        a.write_u8(1).unwrap();
        let mut b = alloc.allocate(4).unwrap();
        b.write_u8(2).unwrap();
        let result = alloc.compose([a.send().unwrap(), b.send().unwrap()]);
        assert!(matches!(result, Err(BufferError::Composition(_))));
    }

    #[test]
    fn test_compose_closed_constituent_fails() {
        let alloc = BufferAllocator::on_heap();
        let open = alloc.allocate(4).unwrap();
        let mut closed = alloc.allocate(4).unwrap();
        closed.close().unwrap();
        let result = Buffer::compose_parts(*alloc.config(), vec![open, closed]);
        assert!(matches!(result, Err(BufferError::Composition(_))));
    }

    #[test]
    fn test_compose_nothing() {
        let buf = BufferAllocator::off_heap()
            .compose(std::iter::empty())
            .unwrap();
        assert_eq!(buf.capacity(), 0);
        assert!(buf.is_composite());
        assert!(!buf.is_direct());
    }

    #[test]
    fn test_composite_grows_by_appending() {
        let alloc = BufferAllocator::off_heap();
        let a = alloc.allocate(4).unwrap();
        let mut buf = alloc.compose([a.send().unwrap()]).unwrap();
        buf.write_bytes(&[7u8; 10]).unwrap();
        assert!(buf.capacity() >= 10);
        assert_eq!(buf.count_components(), 2);
        assert!(buf.is_direct());
        let mut out = [0u8; 10];
        buf.read_bytes(&mut out).unwrap();
        assert_eq!(out, [7u8; 10]);
    }

    #[test]
    fn test_extend_with_rejects_gap() {
        let alloc = BufferAllocator::on_heap();
        let mut buf = alloc.allocate(4).unwrap();
        buf.write_u8(1).unwrap();
        let ext = alloc.copy_of(&[9]).unwrap();
        assert!(matches!(
            buf.extend_with(ext.send().unwrap()),
            Err(BufferError::Composition(_))
        ));
        assert_eq!(buf.capacity(), 4);
        assert!(!buf.is_composite());
    }

    #[test]
    fn test_extend_with_unwritten() {
        let alloc = BufferAllocator::on_heap();
        let mut buf = alloc.allocate(4).unwrap();
        buf.write_u8(1).unwrap();
        buf.extend_with(alloc.allocate(4).unwrap().send().unwrap())
            .unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.writer_offset(), 1);
        assert_eq!(buf.count_components(), 2);
    }

    #[test]
    fn test_extend_with_respects_max_capacity() {
        let alloc = BufferAllocator::new(AllocatorConfig::on_heap().with_max_capacity(6));
        let mut buf = alloc.allocate(4).unwrap();
        let ext = BufferAllocator::on_heap().allocate(4).unwrap();
        assert_eq!(
            buf.extend_with(ext.send().unwrap()).unwrap_err(),
            BufferError::SizeTooBig {
                requested: 8,
                max: 6
            }
        );
        assert_eq!(buf.capacity(), 4);
        assert!(!buf.is_composite());

        buf.extend_with(alloc.allocate(2).unwrap().send().unwrap())
            .unwrap();
        assert_eq!(buf.capacity(), 6);
    }

    #[test]
    fn test_compose_empty_direct_parts_stays_direct() {
        let direct = BufferAllocator::off_heap();
        let parts = [direct.allocate(0).unwrap(), direct.allocate(0).unwrap()];
        let buf = direct
            .compose(parts.map(|p| p.send().unwrap()))
            .unwrap();
        assert_eq!(buf.capacity(), 0);
        assert!(buf.is_direct());

        let mut buf = direct.allocate(4).unwrap();
        buf.extend_with(BufferAllocator::on_heap().allocate(0).unwrap().send().unwrap())
            .unwrap();
        assert!(!buf.is_direct());
    }

    #[test]
    fn test_decompose_redistributes_offsets() {
        let alloc = BufferAllocator::on_heap();
        let parts = [4usize, 4, 4]
            .iter()
            .map(|&n| alloc.allocate(n).unwrap().send().unwrap())
            .collect::<Vec<_>>();
        let mut buf = alloc.compose(parts).unwrap();
        buf.write_bytes(&[0u8; 9]).unwrap();
        buf.skip_readable(5).unwrap();

        let parts = buf.decompose().unwrap();
        let offsets: Vec<_> = parts
            .iter()
            .map(|p| (p.reader_offset(), p.writer_offset()))
            .collect();
        assert_eq!(offsets, vec![(4, 4), (1, 4), (0, 1)]);
        assert!(parts.iter().all(|p| !p.is_composite()));
    }

    #[test]
    fn test_decompose_simple_buffer() {
        let buf = BufferAllocator::on_heap().allocate(4).unwrap();
        let parts = buf.decompose().unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].capacity(), 4);
    }

    #[test]
    fn test_copy_of_composite_is_contiguous() {
        let heap = BufferAllocator::on_heap();
        let direct = BufferAllocator::off_heap();
        let a = direct.allocate(4).unwrap();
        let b = direct.allocate(4).unwrap();
        let mut buf = heap.compose([a.send().unwrap(), b.send().unwrap()]).unwrap();
        buf.write_u64(0x0102_0304_0506_0708).unwrap();
        let copy = buf.copy().unwrap();
        assert!(!copy.is_composite());
        assert!(copy.is_direct());
        assert_eq!(copy.count_components(), 1);
        assert_eq!(copy.get_u64(0).unwrap(), 0x0102_0304_0506_0708);
    }
}
