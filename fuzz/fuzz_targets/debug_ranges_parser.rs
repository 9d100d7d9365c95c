#![no_main]

use libfuzzer_sys::fuzz_target;
use dwranges_formats::dwarf::{AddressRangeList, ListOffset, RangeListConfig};

fuzz_target!(|data: &[u8]| {
    for width in [4u8, 8] {
        let Ok(list) = AddressRangeList::new(data, RangeListConfig::debug_ranges(width)) else {
            continue;
        };

        // Try every pair-aligned offset - should never panic
        let step = usize::from(width) * 2;
        for offset in (0..data.len()).step_by(step).take(64) {
            if let Ok(ranges) = list.range_list(ListOffset::Direct(offset as u64), 0, None) {
                for range in &ranges {
                    assert_ne!(range.start, range.end);
                }
            }
        }
    }
});
