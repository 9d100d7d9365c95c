//! Bounds-checked cursor over section data.
//!
//! Every read checks the remaining length and advances the cursor only on
//! success, so a failed read leaves the position at the start of the value
//! that could not be read.

use dwranges_core::{DwarfFormat, Endianness};
use thiserror::Error;

use super::leb128::decode_uleb128;

/// Initial length value that introduces the 64-bit DWARF format.
const DWARF64_ESCAPE: u32 = 0xffff_ffff;

/// Lowest initial length value reserved by the DWARF standard.
const RESERVED_LENGTH_START: u32 = 0xffff_fff0;

/// Error raised by a primitive read.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// Not enough bytes left for the value.
    #[error("unexpected end of data at offset {offset:#x}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// ULEB128 value wider than 64 bits.
    #[error("ULEB128 overflow at offset {offset:#x}")]
    Leb128Overflow { offset: usize },

    /// Initial length in the reserved range `0xfffffff0..=0xfffffffe`.
    #[error("reserved initial length {value:#x} at offset {offset:#x}")]
    ReservedInitialLength { offset: usize, value: u32 },

    /// Width that is not 1, 2, 4 or 8 bytes.
    #[error("unsupported value width {width}")]
    UnsupportedWidth { width: u8 },
}

impl ReadError {
    /// Returns the byte offset the failing read started at.
    pub fn offset(&self) -> usize {
        match *self {
            Self::UnexpectedEof { offset, .. }
            | Self::Leb128Overflow { offset }
            | Self::ReservedInitialLength { offset, .. } => offset,
            Self::UnsupportedWidth { .. } => 0,
        }
    }

    fn rebase(self, base: usize) -> Self {
        match self {
            Self::UnexpectedEof {
                offset,
                needed,
                available,
            } => Self::UnexpectedEof {
                offset: base + offset,
                needed,
                available,
            },
            Self::Leb128Overflow { offset } => Self::Leb128Overflow {
                offset: base + offset,
            },
            other => other,
        }
    }
}

/// Endian-aware reader over a borrowed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
    endianness: Endianness,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8], endianness: Endianness) -> Self {
        Self::at(data, 0, endianness)
    }

    /// Create a reader positioned at `offset`.
    ///
    /// The offset may lie past the end of `data`; reads then fail.
    pub fn at(data: &'a [u8], offset: usize, endianness: Endianness) -> Self {
        Self {
            data,
            pos: offset,
            endianness,
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Current byte position within the underlying slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns true if no bytes are left.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let bytes = self
            .pos
            .checked_add(len)
            .and_then(|end| self.data.get(self.pos..end))
            .ok_or(ReadError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            })?;
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ReadError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, ReadError> {
        let bytes = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => u16::from_le_bytes(bytes),
            Endianness::Big => u16::from_be_bytes(bytes),
        })
    }

    pub fn read_u32(&mut self) -> Result<u32, ReadError> {
        let bytes = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => u32::from_le_bytes(bytes),
            Endianness::Big => u32::from_be_bytes(bytes),
        })
    }

    pub fn read_u64(&mut self) -> Result<u64, ReadError> {
        let bytes = self.read_array()?;
        Ok(match self.endianness {
            Endianness::Little => u64::from_le_bytes(bytes),
            Endianness::Big => u64::from_be_bytes(bytes),
        })
    }

    /// Read an unsigned value of `width` bytes (1, 2, 4 or 8).
    pub fn read_address(&mut self, width: u8) -> Result<u64, ReadError> {
        match width {
            1 => self.read_u8().map(u64::from),
            2 => self.read_u16().map(u64::from),
            4 => self.read_u32().map(u64::from),
            8 => self.read_u64(),
            _ => Err(ReadError::UnsupportedWidth { width }),
        }
    }

    /// Read a section offset sized for `format`.
    pub fn read_offset(&mut self, format: DwarfFormat) -> Result<u64, ReadError> {
        match format {
            DwarfFormat::Dwarf32 => self.read_u32().map(u64::from),
            DwarfFormat::Dwarf64 => self.read_u64(),
        }
    }

    /// Read an unsigned LEB128 value.
    pub fn read_uleb128(&mut self) -> Result<u64, ReadError> {
        let start = self.pos.min(self.data.len());
        let (value, len) = decode_uleb128(&self.data[start..]).map_err(|e| e.rebase(self.pos))?;
        self.pos += len;
        Ok(value)
    }

    /// Read a unit's initial length field.
    ///
    /// Returns the unit length (excluding the field itself) and the format
    /// class the field selects.
    pub fn read_initial_length(&mut self) -> Result<(u64, DwarfFormat), ReadError> {
        let start = self.pos;
        let value = self.read_u32()?;
        if value == DWARF64_ESCAPE {
            match self.read_u64() {
                Ok(length) => Ok((length, DwarfFormat::Dwarf64)),
                Err(e) => {
                    self.pos = start;
                    Err(e)
                }
            }
        } else if value >= RESERVED_LENGTH_START {
            self.pos = start;
            Err(ReadError::ReservedInitialLength {
                offset: start,
                value,
            })
        } else {
            Ok((u64::from(value), DwarfFormat::Dwarf32))
        }
    }
}
