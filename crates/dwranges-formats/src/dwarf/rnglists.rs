//! DWARF5 .debug_rnglists section support.
//!
//! The .debug_rnglists section contains range lists that describe non-contiguous
//! address ranges. This replaces the DWARF4 .debug_ranges section with a more
//! compact representation.
//!
//! # Range List Entries (RLE)
//!
//! Each entry starts with a 1-byte operator:
//! - `DW_RLE_end_of_list` (0x00): End of list
//! - `DW_RLE_base_addressx` (0x01): Set base address via the address table
//! - `DW_RLE_startx_endx` (0x02): Range via start/end indices
//! - `DW_RLE_startx_length` (0x03): Range via start index + length
//! - `DW_RLE_offset_pair` (0x04): Offset pair from base
//! - `DW_RLE_base_address` (0x05): Set base address directly
//! - `DW_RLE_start_end` (0x06): Range via start/end addresses
//! - `DW_RLE_start_length` (0x07): Range via start address + length
//!
//! There is no way to skip an entry of unknown kind, so one ends decoding
//! of the list with an error.

use dwranges_core::{Endianness, Range, RangeList};
use tracing::trace;

use super::addr_table::AddressTable;
use super::reader::{ByteReader, ReadError};
use crate::ParseError;

/// Range list entry operators (DWARF5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DwRle {
    EndOfList = 0x00,
    BaseAddressx = 0x01,
    StartxEndx = 0x02,
    StartxLength = 0x03,
    OffsetPair = 0x04,
    BaseAddress = 0x05,
    StartEnd = 0x06,
    StartLength = 0x07,
}

impl TryFrom<u8> for DwRle {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(DwRle::EndOfList),
            0x01 => Ok(DwRle::BaseAddressx),
            0x02 => Ok(DwRle::StartxEndx),
            0x03 => Ok(DwRle::StartxLength),
            0x04 => Ok(DwRle::OffsetPair),
            0x05 => Ok(DwRle::BaseAddress),
            0x06 => Ok(DwRle::StartEnd),
            0x07 => Ok(DwRle::StartLength),
            other => Err(other),
        }
    }
}

/// A decoded range list entry, before base addresses and the address table
/// are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeListEntry {
    /// `DW_RLE_end_of_list`
    EndOfList,
    /// `DW_RLE_base_addressx`: byte offset into the address section.
    BaseAddressx { index: u64 },
    /// `DW_RLE_startx_endx`: two address table indices.
    StartxEndx { start: u64, end: u64 },
    /// `DW_RLE_startx_length`: address table index and length.
    StartxLength { start: u64, length: u64 },
    /// `DW_RLE_offset_pair`: offsets from the base address.
    OffsetPair { start: u64, end: u64 },
    /// `DW_RLE_base_address`
    BaseAddress { address: u64 },
    /// `DW_RLE_start_end`: absolute addresses.
    StartEnd { start: u64, end: u64 },
    /// `DW_RLE_start_length`
    StartLength { start: u64, length: u64 },
}

impl RangeListEntry {
    /// Read one entry at the reader's position.
    pub fn parse(reader: &mut ByteReader<'_>, address_size: u8) -> Result<Self, ParseError> {
        let offset = reader.position();
        let kind = reader.read_u8().map_err(list_error)?;
        let kind = DwRle::try_from(kind).map_err(|kind| ParseError::UnsupportedEntryKind {
            offset: offset as u64,
            kind,
        })?;

        let entry = match kind {
            DwRle::EndOfList => Self::EndOfList,
            DwRle::BaseAddressx => Self::BaseAddressx {
                index: read_uleb(reader)?,
            },
            DwRle::StartxEndx => Self::StartxEndx {
                start: read_uleb(reader)?,
                end: read_uleb(reader)?,
            },
            DwRle::StartxLength => Self::StartxLength {
                start: read_uleb(reader)?,
                length: read_uleb(reader)?,
            },
            DwRle::OffsetPair => Self::OffsetPair {
                start: read_uleb(reader)?,
                end: read_uleb(reader)?,
            },
            DwRle::BaseAddress => Self::BaseAddress {
                address: read_addr(reader, address_size)?,
            },
            DwRle::StartEnd => Self::StartEnd {
                start: read_addr(reader, address_size)?,
                end: read_addr(reader, address_size)?,
            },
            DwRle::StartLength => Self::StartLength {
                start: read_addr(reader, address_size)?,
                length: read_uleb(reader)?,
            },
        };

        Ok(entry)
    }

    /// The operator this entry was encoded with.
    pub fn kind(&self) -> DwRle {
        match self {
            Self::EndOfList => DwRle::EndOfList,
            Self::BaseAddressx { .. } => DwRle::BaseAddressx,
            Self::StartxEndx { .. } => DwRle::StartxEndx,
            Self::StartxLength { .. } => DwRle::StartxLength,
            Self::OffsetPair { .. } => DwRle::OffsetPair,
            Self::BaseAddress { .. } => DwRle::BaseAddress,
            Self::StartEnd { .. } => DwRle::StartEnd,
            Self::StartLength { .. } => DwRle::StartLength,
        }
    }
}

fn read_uleb(reader: &mut ByteReader<'_>) -> Result<u64, ParseError> {
    reader.read_uleb128().map_err(list_error)
}

fn read_addr(reader: &mut ByteReader<'_>, address_size: u8) -> Result<u64, ParseError> {
    reader.read_address(address_size).map_err(list_error)
}

/// Map a primary-buffer read failure to a list error.
fn list_error(e: ReadError) -> ParseError {
    match e {
        ReadError::Leb128Overflow { offset } => ParseError::InvalidLeb128 {
            offset: offset as u64,
        },
        ReadError::UnsupportedWidth { width } => ParseError::InvalidAddressWidth { width },
        other => ParseError::truncated_list(other.offset()),
    }
}

/// Parser for DWARF5 range lists.
#[derive(Debug, Clone, Copy)]
pub struct RangeListsParser<'a> {
    data: &'a [u8],
    address_size: u8,
    endianness: Endianness,
    addr_table: Option<AddressTable<'a>>,
}

impl<'a> RangeListsParser<'a> {
    /// Create a new range lists parser.
    ///
    /// `address_size` is the address size of the unit the lists belong to.
    pub fn new(data: &'a [u8], address_size: u8) -> Self {
        Self {
            data,
            address_size,
            endianness: Endianness::Little,
            addr_table: None,
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Attach the address table used by the indexed entry kinds.
    pub fn with_address_table(mut self, table: AddressTable<'a>) -> Self {
        self.addr_table = Some(table);
        self
    }

    /// Decode the list at `offset`, appending its ranges to `output`.
    ///
    /// # Arguments
    /// * `offset` - Offset within the section to start parsing.
    /// * `base_address` - Initial base address for offset pairs.
    /// * `addr_base` - Start of this unit's slots in the address table
    ///   (`DW_AT_addr_base`), used by `startx_*` entries.
    ///
    /// On error, ranges already appended are partial.
    pub fn read_range_list(
        &self,
        offset: usize,
        base_address: u64,
        addr_base: u64,
        output: &mut RangeList,
    ) -> Result<(), ParseError> {
        let mut reader = ByteReader::at(self.data, offset, self.endianness);
        let mut base = base_address;

        loop {
            let entry_offset = reader.position();
            let entry = RangeListEntry::parse(&mut reader, self.address_size)?;
            trace!(offset = entry_offset, ?entry, "range list entry");

            let range = match entry {
                RangeListEntry::EndOfList => break,
                RangeListEntry::BaseAddressx { index } => {
                    base = self.table()?.read_at(index)?;
                    None
                }
                RangeListEntry::StartxEndx { start, end } => {
                    let table = self.table()?;
                    let start = table.address(addr_base, start)?;
                    let end = table.address(addr_base, end)?;
                    Some(Range::new(start, end))
                }
                RangeListEntry::StartxLength { start, length } => {
                    let start = self.table()?.address(addr_base, start)?;
                    let start = base.wrapping_add(start);
                    Some(Range::new(start, start.wrapping_add(length)))
                }
                RangeListEntry::OffsetPair { start, end } => Some(Range::new(
                    start.wrapping_add(base),
                    end.wrapping_add(base),
                )),
                RangeListEntry::BaseAddress { address } => {
                    base = address;
                    None
                }
                RangeListEntry::StartEnd { start, end } => Some(Range::new(start, end)),
                RangeListEntry::StartLength { start, length } => {
                    let start = base.wrapping_add(start);
                    Some(Range::new(start, start.wrapping_add(length)))
                }
            };

            if let Some(range) = range.filter(|r| !r.is_empty()) {
                output.push(range);
            }
        }

        Ok(())
    }

    /// Decode the list at `offset` into a new list.
    pub fn parse_range_list(&self, offset: usize, base_address: u64, addr_base: u64) -> Result<RangeList, ParseError> {
        let mut ranges = Vec::new();
        self.read_range_list(offset, base_address, addr_base, &mut ranges)?;
        Ok(ranges)
    }

    /// Iterate over the raw entries of the list at `offset`.
    ///
    /// Iteration stops after `DW_RLE_end_of_list` or the first error.
    pub fn entries(&self, offset: usize) -> RangeListEntries<'a> {
        RangeListEntries {
            reader: ByteReader::at(self.data, offset, self.endianness),
            address_size: self.address_size,
            done: false,
        }
    }

    fn table(&self) -> Result<&AddressTable<'a>, ParseError> {
        self.addr_table
            .as_ref()
            .ok_or(ParseError::AddressTableOverrun { offset: 0, size: 0 })
    }
}

/// Iterator over the raw entries of one range list.
#[derive(Debug, Clone)]
pub struct RangeListEntries<'a> {
    reader: ByteReader<'a>,
    address_size: u8,
    done: bool,
}

impl Iterator for RangeListEntries<'_> {
    type Item = Result<(usize, RangeListEntry), ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.reader.position();
        let entry = RangeListEntry::parse(&mut self.reader, self.address_size);
        self.done = !matches!(entry, Ok(e) if e != RangeListEntry::EndOfList);
        Some(entry.map(|e| (offset, e)))
    }
}
