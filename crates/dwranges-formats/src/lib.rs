//! # dwranges-formats
//!
//! Decoders for the DWARF sections that describe non-contiguous address
//! ranges:
//! - `.debug_ranges` (DWARF 2-4)
//! - `.debug_rnglists` (DWARF 5), including `DW_FORM_rnglistx` indexing
//! - `.debug_addr` lookups for indexed range list entries
//!
//! All decoders borrow the section bytes and bounds-check every read.

pub mod dwarf;
pub mod error;

pub use dwarf::{
    AddressRangeList, AddressTable, DebugRangesParser, ListOffset, RangeListConfig,
    RangeListsParser, SectionKind, UnitDescriptor,
};
pub use dwranges_core::{ranges_min, Range, RangeList};
pub use error::ParseError;
