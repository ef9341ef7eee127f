//! Bounds-checked read cursor over an encoded buffer

use bach_primitives::U256;

use crate::error::{AbiError, Result};
use crate::WORD_SIZE;

/// Forward cursor with explicit repositioning.
///
/// Every read is checked against the buffer before any slice is taken, so
/// untrusted offsets and lengths fail with [`AbiError::OutOfBounds`].
#[derive(Debug, Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Bytes between the position and the end of the buffer
    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move to `position`, which may be at most the buffer end
    pub(crate) fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(self.out_of_bounds(position, 0));
        }
        self.position = position;
        Ok(())
    }

    /// Restore a position previously returned by [`Cursor::position`]
    pub(crate) fn restore(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| self.out_of_bounds(self.position, len))?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    pub(crate) fn read_word(&mut self) -> Result<[u8; WORD_SIZE]> {
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(self.read_bytes(WORD_SIZE)?);
        Ok(word)
    }

    pub(crate) fn read_u256(&mut self) -> Result<U256> {
        Ok(U256::from_big_endian(&self.read_word()?))
    }

    /// Read a word holding an offset or length
    pub(crate) fn read_usize(&mut self) -> Result<usize> {
        let value = self.read_u256()?;
        if value.bits() > 64 {
            return Err(AbiError::OffsetOverflow(value));
        }
        usize::try_from(value.low_u64()).map_err(|_| AbiError::OffsetOverflow(value))
    }

    fn out_of_bounds(&self, position: usize, len: usize) -> AbiError {
        AbiError::OutOfBounds {
            position,
            len,
            size: self.data.len(),
        }
    }
}
