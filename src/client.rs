//! # Client
//!
//! Known patches for the Tibia client

use crate::code::x86::{JLE_SHORT, JMP_SHORT};
use crate::patcher::byte::BytePatcher;

/// File offset of the single-instance check in the Tibia 7.70 client
pub const TIBIA_770_MULTICLIENT_OFFSET: usize = 0xa9d5c;

/// Turns the `jle` guarding the single-instance check of the Tibia 7.70 client into a `jmp`, allowing multiple clients to run at once.
///
/// Only valid for the 7.70 `Tibia.exe`; any other build is rejected by the byte check.
pub const TIBIA_770_MULTICLIENT: BytePatcher =
    BytePatcher::new(TIBIA_770_MULTICLIENT_OFFSET, JLE_SHORT, JMP_SHORT);
