// src/buffer/ops.rs
//! Buffer read/write operations
//!
//! Relative accessors (`read_*`/`write_*`) move the reader or writer offset;
//! absolute accessors (`get_*`/`set_*`) take an index and leave offsets alone.
//! Multi-byte values are big-endian.

use super::core::Buffer;
use crate::error::{BufferError, Result};
use bytes::{Buf, BufMut};

impl Buffer {
    /// Reads `dst.len()` bytes at the reader offset and advances it.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::InsufficientData`] if fewer than `dst.len()`
    /// bytes are readable. Nothing is consumed in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(8)?;
    /// buf.write_u64(0x0102_0304_0506_0708)?;
    /// buf.read_u8()?;
    /// buf.read_u8()?;
    /// let mut array = [0u8; 4];
    /// buf.read_bytes(&mut array[1..3])?;
    /// assert_eq!(array, [0, 3, 4, 0]);
    /// assert_eq!(buf.reader_offset(), 4);
    /// # Ok::<(), BufferError>(())
    /// ```
    #[inline]
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<&mut Self> {
        self.ensure_live()?;
        self.check_readable(dst.len())?;
        self.segments.read_at(self.roff, dst);
        self.roff += dst.len();
        Ok(self)
    }

    /// Writes all of `src` at the writer offset, growing the buffer if it
    /// does not fit.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(8)?;
    /// buf.write_bytes(b"0123456789ABCDEF")?;
    /// assert!(buf.capacity() >= 16);
    /// assert_eq!(buf.writer_offset(), 16);
    /// # Ok::<(), BufferError>(())
    /// ```
    #[inline]
    pub fn write_bytes(&mut self, src: &[u8]) -> Result<&mut Self> {
        self.ensure_writable(src.len())?;
        self.segments.write_at(self.woff, src);
        self.woff += src.len();
        Ok(self)
    }

    /// Moves every readable byte of `src` into this buffer, growing it if
    /// needed. Both buffers' offsets advance by the number of bytes moved.
    pub fn write_buffer(&mut self, src: &mut Buffer) -> Result<&mut Self> {
        src.ensure_live()?;
        let len = src.readable_bytes();
        self.ensure_writable(len)?;
        let mut pos = self.woff;
        src.segments.for_each_chunk(src.roff, len, |chunk| {
            self.segments.write_at(pos, chunk);
            pos += chunk.len();
        });
        self.woff += len;
        src.roff += len;
        Ok(self)
    }

    /// Moves as many readable bytes as `dest` has writable space for,
    /// without growing `dest`. Returns the number of bytes moved.
    pub fn read_into_buffer(&mut self, dest: &mut Buffer) -> Result<usize> {
        self.ensure_live()?;
        dest.ensure_live()?;
        let len = self.readable_bytes().min(dest.writable_bytes());
        let mut pos = dest.woff;
        self.segments.for_each_chunk(self.roff, len, |chunk| {
            dest.segments.write_at(pos, chunk);
            pos += chunk.len();
        });
        dest.woff += len;
        self.roff += len;
        Ok(len)
    }

    /// Drains `src` into this buffer, growing it if needed.
    ///
    /// `src` is advanced to its end, the way a positioned byte cursor is
    /// consumed.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::off_heap().allocate(8)?;
    /// buf.write_u8(1)?;
    /// let mut source: &[u8] = &[2, 3, 4, 5, 6, 7];
    /// buf.write_from_buf(&mut source)?;
    /// assert!(source.is_empty());
    /// assert_eq!(buf.writer_offset(), 7);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn write_from_buf<B: Buf>(&mut self, src: &mut B) -> Result<&mut Self> {
        self.ensure_writable(src.remaining())?;
        while src.has_remaining() {
            let chunk = src.chunk();
            let len = chunk.len();
            self.segments.write_at(self.woff, chunk);
            self.woff += len;
            src.advance(len);
        }
        Ok(self)
    }

    /// Moves readable bytes into `dst` until either side runs out. Returns
    /// the number of bytes moved.
    pub fn read_into_buf<B: BufMut>(&mut self, dst: &mut B) -> Result<usize> {
        self.ensure_live()?;
        let len = self.readable_bytes().min(dst.remaining_mut());
        self.segments
            .for_each_chunk(self.roff, len, |chunk| dst.put_slice(chunk));
        self.roff += len;
        Ok(len)
    }

    /// Copies `length` bytes starting at `src_index` into
    /// `dst[dst_index..dst_index + length]`.
    ///
    /// Offsets of this buffer are ignored and left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::OutOfBounds`] if either range falls outside
    /// its buffer.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::on_heap().allocate(8)?;
    /// buf.write_u64(0x0102_0304_0506_0708)?;
    /// let mut array = [0u8; 6];
    /// buf.copy_into(1, &mut array, 1, 3)?;
    /// assert_eq!(array, [0, 2, 3, 4, 0, 0]);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn copy_into(
        &self,
        src_index: usize,
        dst: &mut [u8],
        dst_index: usize,
        length: usize,
    ) -> Result<()> {
        self.ensure_live()?;
        self.check_range(src_index, length)?;
        let end = match dst_index.checked_add(length) {
            Some(end) if end <= dst.len() => end,
            _ => {
                return Err(BufferError::OutOfBounds {
                    offset: dst_index,
                    length,
                    capacity: dst.len(),
                });
            }
        };
        self.segments.read_at(src_index, &mut dst[dst_index..end]);
        Ok(())
    }

    /// Copies `length` bytes starting at `src_index` into `dest` at
    /// `dst_index`. Offsets of both buffers are left untouched.
    pub fn copy_into_buffer(
        &self,
        src_index: usize,
        dest: &mut Buffer,
        dst_index: usize,
        length: usize,
    ) -> Result<()> {
        self.ensure_live()?;
        dest.ensure_live()?;
        self.check_range(src_index, length)?;
        dest.check_range(dst_index, length)?;
        let mut pos = dst_index;
        self.segments.for_each_chunk(src_index, length, |chunk| {
            dest.segments.write_at(pos, chunk);
            pos += chunk.len();
        });
        Ok(())
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut raw = [0u8; N];
        self.read_bytes(&mut raw)?;
        Ok(raw)
    }

    #[inline]
    fn get_array<const N: usize>(&self, index: usize) -> Result<[u8; N]> {
        self.ensure_live()?;
        self.check_range(index, N)?;
        let mut raw = [0u8; N];
        self.segments.read_at(index, &mut raw);
        Ok(raw)
    }

    #[inline]
    fn set_array(&mut self, index: usize, raw: &[u8]) -> Result<&mut Self> {
        self.ensure_live()?;
        self.check_range(index, raw.len())?;
        self.segments.write_at(index, raw);
        Ok(self)
    }
}

macro_rules! primitive_accessors {
    ($($ty:ty => $read:ident, $write:ident, $get:ident, $set:ident;)*) => {
        impl Buffer {
            $(
                #[doc = concat!("Reads a big-endian `", stringify!($ty), "` and advances the reader offset.")]
                #[inline]
                pub fn $read(&mut self) -> Result<$ty> {
                    Ok(<$ty>::from_be_bytes(self.read_array()?))
                }

                #[doc = concat!("Writes a big-endian `", stringify!($ty), "`, growing the buffer if it is full.")]
                #[inline]
                pub fn $write(&mut self, val: $ty) -> Result<&mut Self> {
                    self.write_bytes(&val.to_be_bytes())
                }

                #[doc = concat!("Reads a big-endian `", stringify!($ty), "` at `index` without moving offsets.")]
                #[inline]
                pub fn $get(&self, index: usize) -> Result<$ty> {
                    Ok(<$ty>::from_be_bytes(self.get_array(index)?))
                }

                #[doc = concat!("Writes a big-endian `", stringify!($ty), "` at `index` without moving offsets.")]
                #[inline]
                pub fn $set(&mut self, index: usize, val: $ty) -> Result<&mut Self> {
                    self.set_array(index, &val.to_be_bytes())
                }
            )*
        }
    };
}

primitive_accessors! {
    u8 => read_u8, write_u8, get_u8, set_u8;
    i8 => read_i8, write_i8, get_i8, set_i8;
    u16 => read_u16, write_u16, get_u16, set_u16;
    i16 => read_i16, write_i16, get_i16, set_i16;
    u32 => read_u32, write_u32, get_u32, set_u32;
    i32 => read_i32, write_i32, get_i32, set_i32;
    u64 => read_u64, write_u64, get_u64, set_u64;
    i64 => read_i64, write_i64, get_i64, set_i64;
    f32 => read_f32, write_f32, get_f32, set_f32;
    f64 => read_f64, write_f64, get_f64, set_f64;
}

impl Buffer {
    /// Reads a boolean (0 = false, non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Writes a boolean as a single byte.
    #[inline]
    pub fn write_bool(&mut self, val: bool) -> Result<&mut Self> {
        self.write_u8(val as u8)
    }
}

impl std::io::Read for Buffer {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let len = self.readable_bytes().min(buf.len());
        self.read_bytes(&mut buf[..len])?;
        Ok(len)
    }
}

impl std::io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::allocator::BufferAllocator;
    use crate::error::BufferError;
    use std::io::{Read, Write};

    #[test]
    fn test_write_read_primitives() {
        let mut buf = BufferAllocator::on_heap().allocate(64).unwrap();
        buf.write_u8(0xFF)
            .unwrap()
            .write_i16(-2)
            .unwrap()
            .write_u32(0x1234_5678)
            .unwrap()
            .write_i64(-42)
            .unwrap()
            .write_f64(1.5)
            .unwrap()
            .write_bool(true)
            .unwrap();

        assert_eq!(buf.read_u8().unwrap(), 0xFF);
        assert_eq!(buf.read_i16().unwrap(), -2);
        assert_eq!(buf.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(buf.read_i64().unwrap(), -42);
        assert_eq!(buf.read_f64().unwrap(), 1.5);
        assert!(buf.read_bool().unwrap());
        assert_eq!(buf.readable_bytes(), 0);
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = BufferAllocator::on_heap().allocate(4).unwrap();
        buf.write_u32(0x0102_0304).unwrap();
        assert_eq!(buf.get_u8(0).unwrap(), 0x01);
        assert_eq!(buf.get_u8(3).unwrap(), 0x04);
        assert_eq!(buf.get_u16(1).unwrap(), 0x0203);
    }

    #[test]
    fn test_read_insufficient_data() {
        let mut buf = BufferAllocator::on_heap().allocate(8).unwrap();
        buf.write_u16(7).unwrap();
        assert_eq!(
            buf.read_u32().unwrap_err(),
            BufferError::InsufficientData {
                requested: 4,
                available: 2
            }
        );
        assert_eq!(buf.reader_offset(), 0);
        assert_eq!(buf.read_u16().unwrap(), 7);
    }

    #[test]
    fn test_set_get_leave_offsets() {
        let mut buf = BufferAllocator::off_heap().allocate(8).unwrap();
        buf.set_i32(4, -7).unwrap();
        assert_eq!(buf.get_i32(4).unwrap(), -7);
        assert_eq!(buf.writer_offset(), 0);
        assert!(matches!(
            buf.get_u32(5),
            Err(BufferError::OutOfBounds { offset: 5, .. })
        ));
        assert!(buf.set_u16(7, 1).is_err());
    }

    #[test]
    fn test_write_bytes_grows() {
        let mut buf = BufferAllocator::on_heap().allocate(8).unwrap();
        buf.write_u8(1).unwrap();
        buf.write_bytes(&[2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(buf.writer_offset(), 7);
        assert_eq!(buf.capacity(), 8);
        buf.write_bytes(&[8, 9]).unwrap();
        assert!(buf.capacity() >= 9);
        let mut out = [0u8; 9];
        buf.read_bytes(&mut out).unwrap();
        assert_eq!(out, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_write_buffer_drains_source() {
        let alloc = BufferAllocator::on_heap();
        let mut src = alloc.copy_of(b"0123456789ABCDEF").unwrap();
        let mut dst = alloc.allocate(8).unwrap();
        dst.write_u8(1).unwrap().read_u8().unwrap();
        dst.write_buffer(&mut src).unwrap();
        assert_eq!(src.readable_bytes(), 0);
        assert!(dst.capacity() >= 17);
        let mut out = [0u8; 16];
        dst.read_bytes(&mut out).unwrap();
        assert_eq!(&out, b"0123456789ABCDEF");
    }

    #[test]
    fn test_read_into_buffer_stops_at_capacity() {
        let alloc = BufferAllocator::off_heap();
        let mut src = alloc.copy_of(&[1, 2, 3, 4, 5, 6]).unwrap();
        let mut dst = alloc.allocate(4).unwrap();
        assert_eq!(src.read_into_buffer(&mut dst).unwrap(), 4);
        assert_eq!(src.readable_bytes(), 2);
        assert_eq!(dst.writable_bytes(), 0);
        assert_eq!(dst.capacity(), 4);
        assert_eq!(dst.read_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn test_read_into_buf_min_of_both() {
        let mut buf = BufferAllocator::on_heap().allocate(8).unwrap();
        buf.write_u64(0x0102_0304_0506_0708).unwrap();
        buf.read_u16().unwrap();
        let mut dest = [0u8; 4];
        let mut cursor = &mut dest[..];
        assert_eq!(buf.read_into_buf(&mut cursor).unwrap(), 4);
        assert!(cursor.is_empty());
        assert_eq!(dest, [3, 4, 5, 6]);
        assert_eq!(buf.reader_offset(), 6);
        assert_eq!(buf.writer_offset(), 8);
    }

    #[test]
    fn test_copy_into_bounds() {
        let mut buf = BufferAllocator::on_heap().allocate(8).unwrap();
        buf.write_u64(1).unwrap();
        let mut dst = [0u8; 4];
        assert!(matches!(
            buf.copy_into(6, &mut dst, 0, 3),
            Err(BufferError::OutOfBounds { .. })
        ));
        assert!(matches!(
            buf.copy_into(0, &mut dst, 2, 3),
            Err(BufferError::OutOfBounds { capacity: 4, .. })
        ));
        assert_eq!(dst, [0; 4]);
    }

    #[test]
    fn test_copy_into_buffer_keeps_offsets() {
        let alloc = BufferAllocator::on_heap();
        let src = alloc.copy_of(&[9, 8, 7, 6]).unwrap();
        let mut dst = alloc.allocate(6).unwrap();
        src.copy_into_buffer(1, &mut dst, 2, 3).unwrap();
        assert_eq!(dst.writer_offset(), 0);
        assert_eq!(src.reader_offset(), 0);
        assert_eq!(dst.get_u8(2).unwrap(), 8);
        assert_eq!(dst.get_u8(4).unwrap(), 6);
        assert_eq!(dst.get_u8(5).unwrap(), 0);
    }

    #[test]
    fn test_io_traits() {
        let mut buf = BufferAllocator::on_heap().allocate(2).unwrap();
        buf.write_all(b"hello world").unwrap();
        let mut out = String::new();
        buf.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }
}
