//! This module contains a byte patcher

use thiserror::Error;
use tracing::{debug, info};

use super::{Patched, Patcher};
use crate::code::x86;

/// Errors when checking the byte at a patch offset
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ByteError {
    /// The byte is neither the original nor the replacement value
    #[error("Expected byte 0x{expected:02X} at offset 0x{offset:X}, but found 0x{found:02X}")]
    Mismatch {
        /// Offset of the patch
        offset: usize,
        /// Original byte the patcher expects before patching
        expected: u8,
        /// Byte actually found at `offset`
        found: u8,
    },
    /// The buffer ends before the patch offset
    #[error("Offset 0x{offset:X} is past the end of the file ({len} bytes)")]
    OutOfBounds {
        /// Offset of the patch
        offset: usize,
        /// Length of the buffer
        len: usize,
    },
}

/// State of the byte at a patch offset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteState {
    /// The original byte is present
    Original,
    /// The replacement byte is already present
    Patched,
}

/// Patcher for replacing a single known byte at a fixed offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BytePatcher {
    /// Offset of the patch
    offset: usize,
    /// Byte expected at `offset` before patching
    original: u8,
    /// Byte written to `offset`
    replacement: u8,
}
impl BytePatcher {
    /// Creates a new [`BytePatcher`]
    pub const fn new(offset: usize, original: u8, replacement: u8) -> Self {
        Self {
            offset,
            original,
            replacement,
        }
    }

    /// Offset of the patched byte
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte expected before patching
    pub fn original(&self) -> u8 {
        self.original
    }

    /// Byte present after patching
    pub fn replacement(&self) -> u8 {
        self.replacement
    }

    /// Checks the byte at the patch offset without modifying anything
    pub fn inspect(&self, buffer: &[u8]) -> Result<ByteState, ByteError> {
        let found = *buffer.get(self.offset).ok_or(ByteError::OutOfBounds {
            offset: self.offset,
            len: buffer.len(),
        })?;
        debug!(offset = self.offset, found, "read byte at patch offset");

        // the replacement is checked first so a patch with equal bytes counts as applied
        if found == self.replacement {
            Ok(ByteState::Patched)
        } else if found == self.original {
            Ok(ByteState::Original)
        } else {
            Err(ByteError::Mismatch {
                offset: self.offset,
                expected: self.original,
                found,
            })
        }
    }
}
impl Patcher for BytePatcher {
    type Error = ByteError;

    fn patch(&self, buffer: &mut [u8]) -> Result<Patched, Self::Error> {
        match self.inspect(buffer)? {
            ByteState::Patched => Ok(Patched::AlreadyApplied),
            ByteState::Original => {
                info!(
                    instruction = x86::describe(buffer, self.offset).as_deref(),
                    "patching byte at offset 0x{:X}: 0x{:02X} -> 0x{:02X}",
                    self.offset,
                    self.original,
                    self.replacement
                );
                // `inspect` already bounds checked the offset
                buffer[self.offset] = self.replacement;
                debug!(
                    instruction = x86::describe(buffer, self.offset).as_deref(),
                    "patched instruction"
                );
                Ok(Patched::Applied)
            }
        }
    }
}
