//! # Patch
//!
//! This module covers patchers, which are used to overwrite known locations in a loaded binary

pub mod byte;
pub mod file;

/// Result of a successful patch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Patched {
    /// The buffer was modified and needs to be written back
    Applied,
    /// The buffer already contained the patch and was left alone
    AlreadyApplied,
}
impl Patched {
    /// Whether the buffer was changed by the patch
    pub fn modified(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// All patchers check the buffer before touching it and only report success when the buffer ends up patched
///
/// Implementations must leave the buffer unmodified whenever they return an error or [`Patched::AlreadyApplied`].
pub trait Patcher {
    /// Error type that can occur when patching.
    type Error;

    /// Patches `buffer` in place.
    fn patch(&self, buffer: &mut [u8]) -> Result<Patched, Self::Error>;
}
