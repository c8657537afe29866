// src/buffer/cursor.rs
//! Byte-wise forward and reverse cursors

use super::core::Buffer;
use super::segments::Segments;
use crate::error::{BufferError, Result};

/// Walks a range of a buffer one byte at a time without copying it.
///
/// Yields `(index, byte)` pairs. A forward cursor counts `index` up from `0`;
/// a reverse cursor counts it down to `0`. Region seams inside a composite are
/// invisible. Cursors borrow the buffer and never move its offsets.
///
/// # Examples
///
/// ```
/// use segbuf::BufferAllocator;
/// # use segbuf::BufferError;
///
/// let buf = BufferAllocator::on_heap().copy_of(b"a,b")?;
/// let comma = buf.open_cursor()?.find(|&(_, byte)| byte == b',');
/// assert_eq!(comma, Some((1, b',')));
///
/// let bytes: Vec<_> = buf.open_reverse_cursor()?.collect();
/// assert_eq!(bytes, vec![(2, b'b'), (1, b','), (0, b'a')]);
/// # Ok::<(), BufferError>(())
/// ```
pub struct ByteCursor<'a> {
    segments: &'a Segments,
    region: &'a [u8],
    region_start: usize,
    offset: usize,
    left: usize,
    len: usize,
    reverse: bool,
}

impl<'a> ByteCursor<'a> {
    fn forward(segments: &'a Segments, from: usize, len: usize) -> Self {
        Self {
            segments,
            region: &[],
            region_start: 0,
            offset: from,
            left: len,
            len,
            reverse: false,
        }
    }

    fn backward(segments: &'a Segments, from: usize, len: usize) -> Self {
        Self {
            reverse: true,
            ..Self::forward(segments, from, len)
        }
    }

    /// Bytes not yet produced.
    #[inline]
    pub fn bytes_left(&self) -> usize {
        self.left
    }

    /// Buffer offset of the next byte this cursor will produce.
    ///
    /// Only meaningful while [`bytes_left`](Self::bytes_left) is non-zero.
    #[inline]
    pub fn current_offset(&self) -> usize {
        self.offset
    }

    /// Returns `true` if this cursor walks toward lower offsets.
    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    #[inline]
    fn load(&mut self, offset: usize) -> u8 {
        let inside = offset >= self.region_start && offset - self.region_start < self.region.len();
        if !inside {
            let (start, region) = self.segments.region_at(offset);
            self.region_start = start;
            self.region = region;
        }
        self.region[offset - self.region_start]
    }
}

impl Iterator for ByteCursor<'_> {
    type Item = (usize, u8);

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 {
            return None;
        }
        let offset = self.offset;
        let byte = self.load(offset);
        self.left -= 1;
        let index = if self.reverse {
            // Stays put on the last byte so offset 0 never underflows.
            self.offset = offset.saturating_sub(1);
            self.left
        } else {
            self.offset = offset + 1;
            self.len - self.left - 1
        };
        Some((index, byte))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.left, Some(self.left))
    }
}

impl ExactSizeIterator for ByteCursor<'_> {}

impl std::fmt::Debug for ByteCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteCursor")
            .field("offset", &self.offset)
            .field("bytes_left", &self.left)
            .field("reverse", &self.reverse)
            .finish()
    }
}

impl Buffer {
    /// Opens a forward cursor over the readable bytes.
    pub fn open_cursor(&self) -> Result<ByteCursor<'_>> {
        self.open_cursor_at(self.roff, self.readable_bytes())
    }

    /// Opens a forward cursor over `from..from + len`.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] if the range passes the capacity.
    pub fn open_cursor_at(&self, from: usize, len: usize) -> Result<ByteCursor<'_>> {
        self.ensure_live()?;
        self.check_range(from, len)?;
        Ok(ByteCursor::forward(&self.segments, from, len))
    }

    /// Opens a reverse cursor over the readable bytes, starting from the last.
    pub fn open_reverse_cursor(&self) -> Result<ByteCursor<'_>> {
        self.ensure_live()?;
        let len = self.readable_bytes();
        Ok(ByteCursor::backward(
            &self.segments,
            self.woff.saturating_sub(1),
            len,
        ))
    }

    /// Opens a reverse cursor producing `len` bytes downward from `from`
    /// (inclusive).
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] unless `from` is inside the
    /// buffer and at least `len - 1`.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let buf = BufferAllocator::on_heap().copy_of(&[1, 2, 3, 4])?;
    /// let bytes: Vec<u8> = buf.open_reverse_cursor_at(2, 2)?.map(|(_, b)| b).collect();
    /// assert_eq!(bytes, vec![3, 2]);
    /// assert!(buf.open_reverse_cursor_at(1, 3).is_err());
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn open_reverse_cursor_at(&self, from: usize, len: usize) -> Result<ByteCursor<'_>> {
        self.ensure_live()?;
        if len > 0 && (from >= self.capacity() || len > from + 1) {
            return Err(BufferError::OutOfBounds {
                offset: (from + 1).saturating_sub(len),
                length: len,
                capacity: self.capacity(),
            });
        }
        Ok(ByteCursor::backward(&self.segments, from, len))
    }
}

#[cfg(test)]
mod tests {
    use crate::allocator::BufferAllocator;
    use crate::buffer::Buffer;
    use crate::error::BufferError;

    fn split_composite(bytes: &[u8], at: usize) -> Buffer {
        let heap = BufferAllocator::on_heap();
        let direct = BufferAllocator::off_heap();
        let a = heap.copy_of(&bytes[..at]).unwrap();
        let b = direct.copy_of(&bytes[at..]).unwrap();
        heap.compose([a.send().unwrap(), b.send().unwrap()]).unwrap()
    }

    #[test]
    fn test_forward_indices_and_bytes() {
        let mut buf = BufferAllocator::on_heap().copy_of(&[10, 20, 30, 40]).unwrap();
        buf.read_u8().unwrap();
        let mut cursor = buf.open_cursor().unwrap();
        assert_eq!(cursor.len(), 3);
        assert_eq!(cursor.current_offset(), 1);
        assert_eq!(cursor.next(), Some((0, 20)));
        assert_eq!(cursor.bytes_left(), 2);
        assert_eq!(cursor.current_offset(), 2);
        assert_eq!(cursor.collect::<Vec<_>>(), vec![(1, 30), (2, 40)]);
        assert_eq!(buf.reader_offset(), 1);
    }

    #[test]
    fn test_reverse_indices_and_bytes() {
        let buf = BufferAllocator::off_heap().copy_of(&[1, 2, 3]).unwrap();
        let cursor = buf.open_reverse_cursor().unwrap();
        assert!(cursor.is_reverse());
        assert_eq!(cursor.current_offset(), 2);
        assert_eq!(cursor.collect::<Vec<_>>(), vec![(2, 3), (1, 2), (0, 1)]);
    }

    #[test]
    fn test_empty_cursors() {
        let buf = BufferAllocator::on_heap().allocate(4).unwrap();
        assert_eq!(buf.open_cursor().unwrap().next(), None);
        assert_eq!(buf.open_reverse_cursor().unwrap().next(), None);
        assert_eq!(buf.open_reverse_cursor_at(0, 0).unwrap().len(), 0);
    }

    #[test]
    fn test_cursors_cross_seams() {
        let bytes: Vec<u8> = (0..12).collect();
        for at in 1..12 {
            let buf = split_composite(&bytes, at);
            let forward: Vec<u8> = buf.open_cursor().unwrap().map(|(_, b)| b).collect();
            assert_eq!(forward, bytes);
            let reverse: Vec<u8> = buf.open_reverse_cursor().unwrap().map(|(_, b)| b).collect();
            let mut expected = bytes.clone();
            expected.reverse();
            assert_eq!(reverse, expected);
        }
    }

    #[test]
    fn test_cursor_at_bounds() {
        let buf = BufferAllocator::on_heap().copy_of(&[1, 2, 3, 4]).unwrap();
        let window: Vec<_> = buf.open_cursor_at(1, 2).unwrap().collect();
        assert_eq!(window, vec![(0, 2), (1, 3)]);
        assert!(matches!(
            buf.open_cursor_at(3, 2),
            Err(BufferError::OutOfBounds { .. })
        ));
        assert!(buf.open_reverse_cursor_at(4, 1).is_err());
        assert!(buf.open_reverse_cursor_at(3, 4).is_ok());
        assert!(buf.open_reverse_cursor_at(3, 5).is_err());
    }

    #[test]
    fn test_closed_buffer_rejects_cursor() {
        let mut buf = BufferAllocator::on_heap().allocate(4).unwrap();
        buf.close().unwrap();
        assert_eq!(buf.open_cursor().unwrap_err(), BufferError::Closed);
        assert_eq!(buf.open_reverse_cursor().unwrap_err(), BufferError::Closed);
    }
}
