//! # Code
//!
//! Helpers for the machine code found at patch locations

pub mod x86;
