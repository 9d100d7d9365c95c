//! # dwranges-core
//!
//! Shared value types for the dwranges decoders: byte order, DWARF
//! format class, and the address ranges handed back to callers.

pub mod arch;
pub mod range;

pub use arch::{max_address, DwarfFormat, Endianness};
pub use range::{ranges_min, Range, RangeList};
