//! Range list decoder configuration.

use dwranges_core::Endianness;

use super::addr_table::AddressTable;

/// Which range list encoding a section uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionKind {
    /// `.debug_ranges` (DWARF 2-4): fixed-width address pairs.
    #[default]
    DebugRanges,
    /// `.debug_rnglists` (DWARF 5): unit headers and tagged entries.
    DebugRngLists,
}

impl SectionKind {
    /// Parses a section kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().trim_start_matches('.') {
            "debug_ranges" | "debug-ranges" | "ranges" | "dwarf4" | "4" => Some(Self::DebugRanges),
            "debug_rnglists" | "debug-rnglists" | "rnglists" | "dwarf5" | "5" => {
                Some(Self::DebugRngLists)
            }
            _ => None,
        }
    }

    /// Returns the ELF section name for this kind.
    pub fn section_name(&self) -> &'static str {
        match self {
            Self::DebugRanges => ".debug_ranges",
            Self::DebugRngLists => ".debug_rnglists",
        }
    }
}

/// Configuration for [`AddressRangeList`](super::AddressRangeList).
#[derive(Debug, Clone, Copy)]
pub struct RangeListConfig<'a> {
    /// Encoding of the section.
    pub kind: SectionKind,
    /// Byte order of the section and the address table.
    pub endianness: Endianness,
    /// Address width for `.debug_ranges`. `.debug_rnglists` units carry
    /// their own address size and ignore this.
    pub address_size: u8,
    /// `.debug_addr` contents, needed only for indexed entries.
    pub address_table: Option<AddressTable<'a>>,
}

impl Default for RangeListConfig<'_> {
    fn default() -> Self {
        Self {
            kind: SectionKind::default(),
            endianness: Endianness::Little,
            address_size: 8,
            address_table: None,
        }
    }
}

impl<'a> RangeListConfig<'a> {
    /// Configuration for a `.debug_ranges` section with the given width.
    pub fn debug_ranges(address_size: u8) -> Self {
        Self {
            kind: SectionKind::DebugRanges,
            address_size,
            ..Self::default()
        }
    }

    /// Configuration for a `.debug_rnglists` section.
    pub fn debug_rnglists() -> Self {
        Self {
            kind: SectionKind::DebugRngLists,
            ..Self::default()
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_address_size(mut self, address_size: u8) -> Self {
        self.address_size = address_size;
        self
    }

    pub fn with_address_table(mut self, table: AddressTable<'a>) -> Self {
        self.address_table = Some(table);
        self
    }
}
