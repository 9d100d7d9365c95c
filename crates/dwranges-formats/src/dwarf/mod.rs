//! DWARF range list parsing.
//!
//! Debug info entries that cover more than one contiguous address range
//! (functions split by the optimizer, lexical blocks, compilation units)
//! carry a `DW_AT_ranges` attribute pointing into a range list section:
//!
//! - `.debug_ranges` - DWARF 2-4 address-pair lists
//! - `.debug_rnglists` - DWARF 5 tagged lists, grouped into units with
//!   optional offset arrays
//! - `.debug_addr` - address table referenced by DWARF 5 indexed entries
//!
//! # Example
//!
//! ```ignore
//! use dwranges_formats::dwarf::{AddressRangeList, ListOffset, RangeListConfig};
//!
//! let rnglists = elf.section_data(".debug_rnglists")?;
//! let ranges = AddressRangeList::new(rnglists, RangeListConfig::debug_rnglists())?;
//!
//! // DW_AT_ranges (DW_FORM_rnglistx) with DW_AT_rnglists_base = 0x0c
//! let list = ranges.range_list(
//!     ListOffset::Indexed { unit_base: 0x0c, index: 3 },
//!     cu_low_pc,
//!     None,
//! )?;
//! ```

pub mod addr_table;
pub mod config;
pub mod header;
mod leb128;
pub mod range_list;
pub mod ranges;
pub mod reader;
pub mod rnglists;

pub use addr_table::{AddressTable, AddressTableHeader};
pub use config::{RangeListConfig, SectionKind};
pub use header::{UnitDescriptor, UnitTable};
pub use leb128::decode_uleb128;
pub use range_list::{AddressRangeList, ListOffset};
pub use ranges::DebugRangesParser;
pub use reader::{ByteReader, ReadError};
pub use rnglists::{DwRle, RangeListEntries, RangeListEntry, RangeListsParser};
