//! DWARF5 .debug_rnglists unit headers.
//!
//! A .debug_rnglists section is a sequence of contributions, each starting
//! with a header and an optional offset array:
//!
//! ```text
//! unit_length: 4 bytes (or 12 for 64-bit DWARF)
//! version: 2 bytes (must be 5)
//! address_size: 1 byte
//! segment_selector_size: 1 byte
//! offset_entry_count: 4 bytes
//! offsets[offset_entry_count]: 4/8 bytes each   <- DW_AT_rnglists_base
//! range lists ...
//! ```
//!
//! Units are registered under their base offset, the position right after
//! `offset_entry_count`. `DW_FORM_rnglistx` indices and the offsets stored
//! in the array are both relative to that position.

use std::collections::BTreeMap;

use dwranges_core::{DwarfFormat, Endianness};
use tracing::{debug, warn};

use super::reader::{ByteReader, ReadError};
use crate::ParseError;

/// Size of the header fields that follow the initial length.
const HEADER_FIELDS_SIZE: u64 = 8;

/// One unit header of a .debug_rnglists section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitDescriptor {
    /// Offset of the initial length field.
    pub unit_offset: u64,
    /// Unit length, excluding the initial length field.
    pub unit_length: u64,
    /// 32-bit or 64-bit DWARF.
    pub format: DwarfFormat,
    /// DWARF version (always 5).
    pub version: u16,
    /// Address size in bytes (4 or 8).
    pub address_size: u8,
    /// Segment selector size (read, not interpreted).
    pub segment_selector_size: u8,
    /// Number of entries in the offset array.
    pub offset_entry_count: u32,
    /// Offsets of the unit's range lists, relative to `base_offset`.
    pub offsets: Vec<u64>,
    /// Position immediately after the header.
    pub base_offset: u64,
    /// End of the unit, clamped to the section size.
    pub end_offset: u64,
}

impl UnitDescriptor {
    /// Returns true if `offset` falls inside this unit's payload.
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.base_offset && offset < self.end_offset
    }

    /// Byte offset of list `index` from the offset array.
    pub fn list_offset(&self, index: u64) -> Result<u64, ParseError> {
        if self.offset_entry_count == 0 {
            return Err(ParseError::IllegalIndexedAccess {
                unit_base: self.base_offset,
            });
        }

        let entry = usize::try_from(index)
            .ok()
            .and_then(|i| self.offsets.get(i))
            .ok_or(ParseError::IndexOutOfRange {
                unit_base: self.base_offset,
                index,
                count: self.offset_entry_count,
            })?;

        Ok(self.base_offset.wrapping_add(*entry))
    }
}

/// Units of a .debug_rnglists section keyed by base offset.
#[derive(Debug, Clone, Default)]
pub struct UnitTable {
    units: BTreeMap<u64, UnitDescriptor>,
}

impl UnitTable {
    /// Scan every unit header in `data`.
    ///
    /// Any malformed header fails the whole scan.
    pub fn scan(data: &[u8], endianness: Endianness) -> Result<Self, ParseError> {
        let mut units = BTreeMap::new();
        let mut pos = 0usize;

        while pos < data.len() {
            let unit = parse_unit(data, pos, endianness)?;
            debug!(
                unit_offset = unit.unit_offset,
                base_offset = unit.base_offset,
                address_size = unit.address_size,
                offset_entry_count = unit.offset_entry_count,
                "registered range list unit"
            );

            let next = unit
                .unit_offset
                .saturating_add(unit.format.initial_length_size() as u64)
                .saturating_add(unit.unit_length);
            if next > data.len() as u64 {
                warn!(
                    unit_offset = unit.unit_offset,
                    declared_end = next,
                    section_size = data.len(),
                    "range list unit extends past end of section"
                );
            }

            units.insert(unit.base_offset, unit);
            pos = usize::try_from(next).unwrap_or(usize::MAX);
        }

        Ok(Self { units })
    }

    /// Number of registered units.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Look up the unit registered at `base_offset`.
    pub fn get(&self, base_offset: u64) -> Option<&UnitDescriptor> {
        self.units.get(&base_offset)
    }

    /// Iterate over units in section order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitDescriptor> {
        self.units.values()
    }

    /// Find the unit whose payload contains `offset`.
    pub fn containing(&self, offset: u64) -> Option<&UnitDescriptor> {
        self.units
            .range(..=offset)
            .next_back()
            .map(|(_, unit)| unit)
            .filter(|unit| unit.contains(offset))
    }

    /// Map a `DW_FORM_rnglistx` index to a section offset.
    ///
    /// `unit_base` is the unit's base offset (`DW_AT_rnglists_base`).
    pub fn resolve_indexed_list_offset(&self, unit_base: u64, index: u64) -> Result<u64, ParseError> {
        self.get(unit_base)
            .ok_or(ParseError::UnknownUnit { unit_base })?
            .list_offset(index)
    }
}

fn parse_unit(data: &[u8], start: usize, endianness: Endianness) -> Result<UnitDescriptor, ParseError> {
    let mut reader = ByteReader::at(data, start, endianness);
    let truncated = |e: ReadError| match e {
        ReadError::ReservedInitialLength { offset, .. } => {
            ParseError::corrupt(offset, "reserved initial length")
        }
        ReadError::UnexpectedEof {
            offset,
            needed,
            available,
        } => ParseError::TruncatedHeader {
            offset: offset as u64,
            needed,
            available,
        },
        _ => ParseError::corrupt(e.offset(), "malformed header field"),
    };

    let (unit_length, format) = reader.read_initial_length().map_err(truncated)?;
    if reader.remaining() < HEADER_FIELDS_SIZE as usize {
        return Err(ParseError::TruncatedHeader {
            offset: start as u64,
            needed: format.initial_length_size() + HEADER_FIELDS_SIZE as usize,
            available: data.len() - start,
        });
    }
    if unit_length < HEADER_FIELDS_SIZE {
        return Err(ParseError::corrupt(start, "unit length shorter than header"));
    }

    let version = reader.read_u16().map_err(truncated)?;
    if version != 5 {
        return Err(ParseError::UnsupportedVersion {
            offset: start as u64,
            version,
        });
    }

    let address_size = reader.read_u8().map_err(truncated)?;
    if address_size != 4 && address_size != 8 {
        return Err(ParseError::InvalidAddressWidth {
            width: address_size,
        });
    }
    let segment_selector_size = reader.read_u8().map_err(truncated)?;
    let offset_entry_count = reader.read_u32().map_err(truncated)?;
    let base_offset = reader.position() as u64;

    let array_size = u64::from(offset_entry_count) * format.offset_size() as u64;
    if array_size > unit_length - HEADER_FIELDS_SIZE {
        return Err(ParseError::corrupt(start, "offset array exceeds unit length"));
    }

    let capacity = (offset_entry_count as usize).min(reader.remaining() / format.offset_size());
    let mut offsets = Vec::with_capacity(capacity);
    for _ in 0..offset_entry_count {
        offsets.push(reader.read_offset(format).map_err(truncated)?);
    }

    let end_offset = (start as u64)
        .saturating_add(format.initial_length_size() as u64)
        .saturating_add(unit_length)
        .min(data.len() as u64);

    Ok(UnitDescriptor {
        unit_offset: start as u64,
        unit_length,
        format,
        version,
        address_size,
        segment_selector_size,
        offset_entry_count,
        offsets,
        base_offset,
        end_offset,
    })
}
