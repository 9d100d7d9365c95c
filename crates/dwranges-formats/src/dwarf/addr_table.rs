//! DWARF5 .debug_addr section support.
//!
//! The .debug_addr section holds the addresses that `DW_RLE_startx_*` and
//! `DW_RLE_base_addressx` entries refer to indirectly. Lookups are done in
//! place against the borrowed section bytes; nothing is copied.
//!
//! # Section Format (DWARF5)
//!
//! ```text
//! Header:
//!   unit_length: 4 bytes (or 12 for 64-bit DWARF)
//!   version: 2 bytes (must be 5)
//!   address_size: 1 byte
//!   segment_selector_size: 1 byte
//!
//! Body:
//!   address[0]: address_size bytes (index 0)   <- DW_AT_addr_base
//!   address[1]: address_size bytes (index 1)
//!   ...
//! ```

use dwranges_core::{DwarfFormat, Endianness};

use super::reader::{ByteReader, ReadError};
use crate::ParseError;

/// Borrowed view of an address table.
///
/// The address size here is the table's own and is kept apart from the
/// address size of the range list unit that refers to it.
#[derive(Debug, Clone, Copy)]
pub struct AddressTable<'a> {
    data: &'a [u8],
    address_size: u8,
    endianness: Endianness,
}

impl<'a> AddressTable<'a> {
    /// Wrap raw `.debug_addr` bytes.
    pub fn new(data: &'a [u8], address_size: u8, endianness: Endianness) -> Result<Self, ParseError> {
        if address_size != 4 && address_size != 8 {
            return Err(ParseError::InvalidAddressWidth {
                width: address_size,
            });
        }
        Ok(Self {
            data,
            address_size,
            endianness,
        })
    }

    /// Address size in bytes of each table slot.
    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    /// Size of the underlying section in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the table has no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read the address stored at byte offset `offset`.
    pub fn read_at(&self, offset: u64) -> Result<u64, ParseError> {
        let overrun = ParseError::AddressTableOverrun {
            offset,
            size: self.data.len(),
        };
        let pos = usize::try_from(offset).map_err(|_| overrun.clone())?;
        ByteReader::at(self.data, pos, self.endianness)
            .read_address(self.address_size)
            .map_err(|_| overrun)
    }

    /// Read slot `index` of the table starting at byte offset `addr_base`.
    pub fn address(&self, addr_base: u64, index: u64) -> Result<u64, ParseError> {
        let offset = index
            .checked_mul(u64::from(self.address_size))
            .and_then(|scaled| scaled.checked_add(addr_base))
            .ok_or(ParseError::AddressTableOverrun {
                offset: u64::MAX,
                size: self.data.len(),
            })?;
        self.read_at(offset)
    }
}

/// Parsed header of one .debug_addr contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressTableHeader {
    /// 32-bit or 64-bit DWARF.
    pub format: DwarfFormat,
    /// Length of the contribution after the initial length field.
    pub unit_length: u64,
    /// DWARF version (must be 5).
    pub version: u16,
    /// Address size in bytes.
    pub address_size: u8,
    /// Segment selector size (read, not interpreted).
    pub segment_selector_size: u8,
    /// Offset of the first address slot, i.e. the `DW_AT_addr_base` value.
    pub addr_base: u64,
}

impl AddressTableHeader {
    /// Parse the header of the contribution starting at `offset`.
    pub fn parse(data: &[u8], offset: usize, endianness: Endianness) -> Result<Self, ParseError> {
        let mut reader = ByteReader::at(data, offset, endianness);
        let header_error = |e: ReadError| match e {
            ReadError::ReservedInitialLength { offset, .. } => {
                ParseError::corrupt(offset, "reserved initial length")
            }
            _ => ParseError::TruncatedHeader {
                offset: offset as u64,
                needed: 8,
                available: data.len().saturating_sub(offset),
            },
        };

        let (unit_length, format) = reader.read_initial_length().map_err(header_error)?;
        let version = reader.read_u16().map_err(header_error)?;
        let address_size = reader.read_u8().map_err(header_error)?;
        let segment_selector_size = reader.read_u8().map_err(header_error)?;

        if version != 5 {
            return Err(ParseError::UnsupportedVersion {
                offset: offset as u64,
                version,
            });
        }

        if address_size != 4 && address_size != 8 {
            return Err(ParseError::InvalidAddressWidth {
                width: address_size,
            });
        }

        Ok(Self {
            format,
            unit_length,
            version,
            address_size,
            segment_selector_size,
            addr_base: reader.position() as u64,
        })
    }
}
