//! DWARF 2-4 .debug_ranges section support.
//!
//! Each list is a sequence of fixed-width `(start, end)` address pairs:
//! - `(max_address, addr)` selects `addr` as the new base address
//! - `(0, 0)` ends the list
//! - anything else is a range relative to the current base address

use dwranges_core::{max_address, Endianness, Range, RangeList};
use tracing::trace;

use super::reader::ByteReader;
use crate::ParseError;

/// Parser for legacy address-pair range lists.
#[derive(Debug, Clone, Copy)]
pub struct DebugRangesParser<'a> {
    data: &'a [u8],
    address_size: u8,
    endianness: Endianness,
    largest_address: u64,
}

impl<'a> DebugRangesParser<'a> {
    /// Create a parser for `.debug_ranges` data with the given address width.
    pub fn new(data: &'a [u8], address_size: u8, endianness: Endianness) -> Result<Self, ParseError> {
        let largest_address = max_address(address_size).ok_or(ParseError::InvalidAddressWidth {
            width: address_size,
        })?;
        Ok(Self {
            data,
            address_size,
            endianness,
            largest_address,
        })
    }

    pub fn address_size(&self) -> u8 {
        self.address_size
    }

    /// Decode the list at `offset`, appending its ranges to `output`.
    ///
    /// On error, ranges already appended are partial.
    pub fn read_range_list(&self, offset: usize, base_address: u64, output: &mut RangeList) -> Result<(), ParseError> {
        let width = self.address_size;
        let mut reader = ByteReader::at(self.data, offset, self.endianness);
        let mut base = base_address;

        loop {
            let pos = reader.position();
            if reader.remaining() < 2 * width as usize {
                return Err(ParseError::truncated_list(pos));
            }
            let start = reader
                .read_address(width)
                .map_err(|_| ParseError::truncated_list(pos))?;
            let end = reader
                .read_address(width)
                .map_err(|_| ParseError::truncated_list(pos))?;

            if start == self.largest_address {
                trace!(offset = pos, base = end, "base address selection");
                base = end;
            } else if start == 0 && end == 0 {
                break;
            } else if start != end {
                output.push(Range::new(start.wrapping_add(base), end.wrapping_add(base)));
            }
        }

        Ok(())
    }

    /// Decode the list at `offset` into a new list.
    pub fn parse_range_list(&self, offset: usize, base_address: u64) -> Result<RangeList, ParseError> {
        let mut ranges = Vec::new();
        self.read_range_list(offset, base_address, &mut ranges)?;
        Ok(ranges)
    }
}
