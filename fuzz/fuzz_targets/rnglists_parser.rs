#![no_main]

use libfuzzer_sys::fuzz_target;
use dwranges_formats::dwarf::{AddressRangeList, ListOffset, RangeListConfig};

fuzz_target!(|data: &[u8]| {
    // Scan headers - should never panic
    let Ok(list) = AddressRangeList::new(data, RangeListConfig::debug_rnglists()) else {
        return;
    };

    for unit in list.units() {
        // Decode from the start of every unit payload
        let _ = list.range_list(ListOffset::Direct(unit.base_offset), 0, None);

        // And through every entry of its offset array
        for index in 0..u64::from(unit.offset_entry_count).min(64) {
            let offset = ListOffset::Indexed {
                unit_base: unit.base_offset,
                index,
            };
            let _ = list.range_list(offset, 0, None);
        }
    }
});
