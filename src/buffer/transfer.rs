// src/buffer/transfer.rs
//! Ownership transfer tokens

use super::core::Buffer;
use crate::error::Result;

/// A buffer in transit between owners.
///
/// Created by [`Buffer::send`], which consumes the sending binding, and
/// redeemed exactly once by [`receive`](Self::receive), possibly on another
/// thread. Capacity, offsets and contents survive the trip unchanged. A token
/// dropped without being received releases the buffer.
#[must_use = "a transfer releases its buffer unless it is received"]
#[derive(Debug)]
pub struct Transfer {
    buffer: Buffer,
}

impl Transfer {
    /// Redeems the token for a live buffer.
    pub fn receive(self) -> Buffer {
        tracing::trace!(
            capacity = self.buffer.capacity(),
            composite = self.buffer.is_composite(),
            "buffer received"
        );
        self.buffer
    }

    /// Returns `true` if the buffer in transit is a composite.
    pub fn is_composite(&self) -> bool {
        self.buffer.is_composite()
    }
}

impl Buffer {
    /// Gives up ownership of this buffer, producing a token another context
    /// can [`receive`](Transfer::receive).
    ///
    /// The sending binding is consumed, so using it afterwards does not
    /// compile:
    ///
    /// ```compile_fail
    /// # fn main() -> segbuf::Result<()> {
    /// let mut buf = segbuf::BufferAllocator::on_heap().allocate(8)?;
    /// let token = buf.send()?;
    /// buf.write_u8(1)?;
    /// # drop(token);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`BufferError::Closed`](crate::BufferError::Closed) if the
    /// buffer was closed; a released buffer cannot change hands.
    ///
    /// # Examples
    ///
    /// ```
    /// use segbuf::BufferAllocator;
    /// # use segbuf::BufferError;
    ///
    /// let mut buf = BufferAllocator::off_heap().allocate(8)?;
    /// buf.write_u32(7)?;
    /// let token = buf.send()?;
    ///
    /// let handle = std::thread::spawn(move || {
    ///     let mut buf = token.receive();
    ///     buf.read_u32()
    /// });
    /// assert_eq!(handle.join().unwrap()?, 7);
    /// # Ok::<(), BufferError>(())
    /// ```
    pub fn send(self) -> Result<Transfer> {
        self.ensure_live()?;
        tracing::trace!(
            capacity = self.capacity(),
            reader_offset = self.roff,
            writer_offset = self.woff,
            "buffer sent"
        );
        Ok(Transfer { buffer: self })
    }
}
