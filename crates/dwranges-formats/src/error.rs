//! Error types for range list decoding.

use thiserror::Error;

/// Error type for range list section parsing and decoding.
///
/// Offsets are byte positions within the section buffer the error was
/// raised for. When a decode call fails, ranges it appended to the output
/// list before the failure are partial and must not be trusted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A unit header ran past the end of the section.
    #[error("truncated unit header at offset {offset:#x}: needed {needed} bytes, {available} available")]
    TruncatedHeader {
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// A unit header carried a version other than 5.
    #[error("unsupported range list version {version} in unit at offset {offset:#x}")]
    UnsupportedVersion { offset: u64, version: u16 },

    /// An address width other than 4 or 8 bytes.
    #[error("invalid address width {width}: must be 4 or 8")]
    InvalidAddressWidth { width: u8 },

    /// A unit header is internally inconsistent.
    #[error("corrupt range list section at offset {offset:#x}: {reason}")]
    CorruptSection { offset: u64, reason: &'static str },

    /// A range list ran past the end of the section.
    #[error("truncated range list at offset {offset:#x}")]
    TruncatedRangeList { offset: u64 },

    /// An indirect address lookup fell outside the address table.
    #[error("address table read at offset {offset:#x} overruns the table ({size} bytes)")]
    AddressTableOverrun { offset: u64, size: usize },

    /// An entry kind byte that is not a known `DW_RLE_*` value.
    #[error("unsupported range list entry kind {kind:#04x} at offset {offset:#x}")]
    UnsupportedEntryKind { offset: u64, kind: u8 },

    /// A ULEB128 value that does not fit in 64 bits.
    #[error("invalid ULEB128 value at offset {offset:#x}")]
    InvalidLeb128 { offset: u64 },

    /// Index-based access into a unit whose offset array is empty.
    #[error("indexed range list access into unit at {unit_base:#x}, which has no offset entries")]
    IllegalIndexedAccess { unit_base: u64 },

    /// An index past the end of a unit's offset array.
    #[error("range list index {index} out of range for unit at {unit_base:#x} ({count} entries)")]
    IndexOutOfRange {
        unit_base: u64,
        index: u64,
        count: u32,
    },

    /// No unit is registered at the given base offset.
    #[error("no range list unit registered at base offset {unit_base:#x}")]
    UnknownUnit { unit_base: u64 },

    /// A direct offset that does not fall inside any unit's payload.
    #[error("range list offset {offset:#x} is not inside any unit")]
    OffsetOutsideUnits { offset: u64 },

    /// Index-based access requested on a legacy `.debug_ranges` section.
    #[error("indexed range list access is not supported for .debug_ranges")]
    IndexedAccessOnLegacySection,
}

impl ParseError {
    /// Creates a new TruncatedRangeList error.
    pub fn truncated_list(offset: usize) -> Self {
        Self::TruncatedRangeList {
            offset: offset as u64,
        }
    }

    /// Creates a new CorruptSection error.
    pub fn corrupt(offset: usize, reason: &'static str) -> Self {
        Self::CorruptSection {
            offset: offset as u64,
            reason,
        }
    }

    /// Returns true if this error was raised while scanning unit headers.
    ///
    /// Header errors invalidate the whole section. All other errors are
    /// scoped to a single range list.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            Self::TruncatedHeader { .. }
                | Self::UnsupportedVersion { .. }
                | Self::CorruptSection { .. }
        )
    }
}
