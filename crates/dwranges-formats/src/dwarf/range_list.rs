//! Range list decoding entry point.
//!
//! [`AddressRangeList`] wraps one range list section and decodes lists at
//! offsets taken from `DW_AT_ranges` attributes. `.debug_ranges` lists are
//! addressed by section offset only. `.debug_rnglists` lists are addressed
//! either by section offset (`DW_FORM_sec_offset`) or by an index into a
//! unit's offset array (`DW_FORM_rnglistx`).

use dwranges_core::{max_address, ranges_min, Range, RangeList};
use tracing::debug;

use super::config::{RangeListConfig, SectionKind};
use super::header::{UnitDescriptor, UnitTable};
use super::ranges::DebugRangesParser;
use super::rnglists::RangeListsParser;
use crate::ParseError;

/// How a `DW_AT_ranges` attribute refers to its list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOffset {
    /// Byte offset from the start of the section.
    Direct(u64),
    /// Index into the offset array of the unit registered at `unit_base`.
    Indexed { unit_base: u64, index: u64 },
}

impl From<u64> for ListOffset {
    fn from(offset: u64) -> Self {
        Self::Direct(offset)
    }
}

/// Decoder for the range lists of one section.
///
/// Unit headers are scanned once by [`AddressRangeList::new`]. After that
/// the decoder is read-only and can be shared between threads.
#[derive(Debug, Clone)]
pub struct AddressRangeList<'a> {
    data: &'a [u8],
    config: RangeListConfig<'a>,
    units: UnitTable,
}

impl<'a> AddressRangeList<'a> {
    /// Create a decoder over `data`.
    ///
    /// For `.debug_rnglists` every unit header is parsed here, and a
    /// malformed header fails construction. For `.debug_ranges` the
    /// configured address size must be 4 or 8.
    pub fn new(data: &'a [u8], config: RangeListConfig<'a>) -> Result<Self, ParseError> {
        let units = match config.kind {
            SectionKind::DebugRanges => {
                if max_address(config.address_size).is_none() {
                    return Err(ParseError::InvalidAddressWidth {
                        width: config.address_size,
                    });
                }
                UnitTable::default()
            }
            SectionKind::DebugRngLists => UnitTable::scan(data, config.endianness)?,
        };

        debug!(
            section = config.kind.section_name(),
            size = data.len(),
            units = units.len(),
            "loaded range list section"
        );

        Ok(Self {
            data,
            config,
            units,
        })
    }

    pub fn kind(&self) -> SectionKind {
        self.config.kind
    }

    /// Returns true if the section uses the DWARF5 encoding.
    pub fn is_dwarf5(&self) -> bool {
        self.config.kind == SectionKind::DebugRngLists
    }

    /// Units found in a `.debug_rnglists` section, in section order.
    pub fn units(&self) -> impl Iterator<Item = &UnitDescriptor> {
        self.units.iter()
    }

    /// The unit registered at `base_offset`.
    pub fn unit(&self, base_offset: u64) -> Option<&UnitDescriptor> {
        self.units.get(base_offset)
    }

    /// Map a `DW_FORM_rnglistx` index to a section offset.
    pub fn resolve_indexed_list_offset(&self, unit_base: u64, index: u64) -> Result<u64, ParseError> {
        if !self.is_dwarf5() {
            return Err(ParseError::IndexedAccessOnLegacySection);
        }
        self.units.resolve_indexed_list_offset(unit_base, index)
    }

    /// Decode one range list, appending its ranges to `output`.
    ///
    /// `base` is the initial base address, normally the `DW_AT_low_pc` of
    /// the owning compilation unit. `addr_base` is the unit's
    /// `DW_AT_addr_base`; it is ignored for `.debug_ranges` and treated as
    /// 0 when absent.
    ///
    /// On error, ranges already appended to `output` are partial.
    pub fn read_range_list(
        &self,
        offset: ListOffset,
        base: u64,
        output: &mut RangeList,
        addr_base: Option<u64>,
    ) -> Result<(), ParseError> {
        match (self.config.kind, offset) {
            (SectionKind::DebugRanges, ListOffset::Direct(offset)) => {
                DebugRangesParser::new(self.data, self.config.address_size, self.config.endianness)?
                    .read_range_list(to_usize(offset)?, base, output)
            }
            (SectionKind::DebugRanges, ListOffset::Indexed { .. }) => {
                Err(ParseError::IndexedAccessOnLegacySection)
            }
            (SectionKind::DebugRngLists, ListOffset::Direct(offset)) => {
                self.read_rnglist(offset, base, output, addr_base)
            }
            (SectionKind::DebugRngLists, ListOffset::Indexed { unit_base, index }) => {
                let offset = self.units.resolve_indexed_list_offset(unit_base, index)?;
                self.read_rnglist(offset, base, output, addr_base)
            }
        }
    }

    /// Decode one range list into a new list.
    pub fn range_list(
        &self,
        offset: ListOffset,
        base: u64,
        addr_base: Option<u64>,
    ) -> Result<RangeList, ParseError> {
        let mut ranges = Vec::new();
        self.read_range_list(offset, base, &mut ranges, addr_base)?;
        Ok(ranges)
    }

    /// Returns the lowest start address in `ranges`, or 0 if there are none.
    pub fn ranges_min(ranges: &[Range]) -> u64 {
        ranges_min(ranges)
    }

    fn read_rnglist(
        &self,
        offset: u64,
        base: u64,
        output: &mut RangeList,
        addr_base: Option<u64>,
    ) -> Result<(), ParseError> {
        let unit = self
            .units
            .containing(offset)
            .ok_or(ParseError::OffsetOutsideUnits { offset })?;

        // A list never runs past its unit into the next header
        let unit_end = to_usize(unit.end_offset)?.min(self.data.len());
        let unit_data = &self.data[..unit_end];

        let mut parser =
            RangeListsParser::new(unit_data, unit.address_size).with_endianness(self.config.endianness);
        if let Some(table) = self.config.address_table {
            parser = parser.with_address_table(table);
        }
        parser.read_range_list(to_usize(offset)?, base, addr_base.unwrap_or(0), output)
    }
}

fn to_usize(offset: u64) -> Result<usize, ParseError> {
    usize::try_from(offset).map_err(|_| ParseError::TruncatedRangeList { offset })
}
