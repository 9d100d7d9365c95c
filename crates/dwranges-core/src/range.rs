//! Address range value types.

/// A half-open address interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Start address of the range.
    pub start: u64,
    /// End address of the range (exclusive).
    pub end: u64,
}

impl Range {
    /// Create a new address range.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Returns true if this range contains the given address.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.start && addr < self.end
    }

    /// Returns the size of this range.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the range covers no addresses.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<(u64, u64)> for Range {
    fn from((start, end): (u64, u64)) -> Self {
        Self::new(start, end)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

/// Ranges in the order they were encountered in the section.
pub type RangeList = Vec<Range>;

/// Returns the lowest start address in `ranges`, or 0 if there are none.
pub fn ranges_min(ranges: &[Range]) -> u64 {
    ranges.iter().map(|r| r.start).min().unwrap_or(0)
}
