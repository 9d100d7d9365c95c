//! Byte order and DWARF format identification.

/// Byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Returns the name of this byte order.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Little => "little",
            Self::Big => "big",
        }
    }
}

/// DWARF format class, selected by the unit's initial length field.
///
/// The 32-bit format uses a 4-byte initial length and 4-byte section
/// offsets. The 64-bit format is introduced by the `0xffff_ffff` escape,
/// followed by an 8-byte length, and uses 8-byte section offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DwarfFormat {
    #[default]
    Dwarf32,
    Dwarf64,
}

impl DwarfFormat {
    /// Size in bytes of a section offset in this format.
    pub fn offset_size(&self) -> usize {
        match self {
            Self::Dwarf32 => 4,
            Self::Dwarf64 => 8,
        }
    }

    /// Size in bytes of the initial length field in this format.
    pub fn initial_length_size(&self) -> usize {
        match self {
            Self::Dwarf32 => 4,
            Self::Dwarf64 => 12,
        }
    }

    /// Returns whether this is the 64-bit format.
    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::Dwarf64)
    }
}

/// Returns the all-ones address for an address width in bytes.
///
/// Widths other than 4 and 8 have no defined sentinel.
pub fn max_address(width: u8) -> Option<u64> {
    match width {
        4 => Some(u64::from(u32::MAX)),
        8 => Some(u64::MAX),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sizes() {
        assert_eq!(DwarfFormat::Dwarf32.offset_size(), 4);
        assert_eq!(DwarfFormat::Dwarf32.initial_length_size(), 4);
        assert_eq!(DwarfFormat::Dwarf64.offset_size(), 8);
        assert_eq!(DwarfFormat::Dwarf64.initial_length_size(), 12);
    }

    #[test]
    fn test_max_address() {
        assert_eq!(max_address(4), Some(0xffff_ffff));
        assert_eq!(max_address(8), Some(0xffff_ffff_ffff_ffff));
        assert_eq!(max_address(2), None);
    }
}
