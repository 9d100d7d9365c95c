#![no_main]

use arbitrary::Arbitrary;
use dwranges_core::Endianness;
use dwranges_formats::dwarf::{AddressRangeList, AddressTable, ListOffset, RangeListConfig};
use libfuzzer_sys::fuzz_target;

/// Structured .debug_rnglists unit for targeted fuzzing
#[derive(Debug, Arbitrary)]
struct FuzzedUnit {
    dwarf64: bool,
    big_endian: bool,
    address_size: u8,
    segment_selector_size: u8,
    offsets: Vec<u32>,
    entries: Vec<FuzzedEntry>,
    // Length adjustment applied to the declared unit length
    length_delta: i8,
    addresses: Vec<u64>,
    addr_base: u8,
    base: u64,
}

#[derive(Debug, Arbitrary)]
enum FuzzedEntry {
    BaseAddressx(u16),
    StartxEndx(u8, u8),
    StartxLength(u8, u16),
    OffsetPair(u16, u16),
    BaseAddress(u64),
    StartEnd(u64, u64),
    StartLength(u64, u16),
    Raw(u8),
}

fn uleb(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

impl FuzzedUnit {
    fn endianness(&self) -> Endianness {
        if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    fn put(&self, value: u64, width: usize, out: &mut Vec<u8>) {
        let bytes = match self.endianness() {
            Endianness::Little => value.to_le_bytes(),
            Endianness::Big => value.to_be_bytes(),
        };
        match self.endianness() {
            Endianness::Little => out.extend_from_slice(&bytes[..width]),
            Endianness::Big => out.extend_from_slice(&bytes[8 - width..]),
        }
    }

    fn address_width(&self) -> usize {
        if self.address_size >= 8 { 8 } else { 4 }
    }

    fn payload(&self) -> Vec<u8> {
        let width = self.address_width();
        let mut out = Vec::new();
        for entry in &self.entries {
            match *entry {
                FuzzedEntry::BaseAddressx(i) => {
                    out.push(0x01);
                    uleb(u64::from(i), &mut out);
                }
                FuzzedEntry::StartxEndx(s, e) => {
                    out.push(0x02);
                    uleb(u64::from(s), &mut out);
                    uleb(u64::from(e), &mut out);
                }
                FuzzedEntry::StartxLength(s, l) => {
                    out.push(0x03);
                    uleb(u64::from(s), &mut out);
                    uleb(u64::from(l), &mut out);
                }
                FuzzedEntry::OffsetPair(s, e) => {
                    out.push(0x04);
                    uleb(u64::from(s), &mut out);
                    uleb(u64::from(e), &mut out);
                }
                FuzzedEntry::BaseAddress(a) => {
                    out.push(0x05);
                    self.put(a, width, &mut out);
                }
                FuzzedEntry::StartEnd(s, e) => {
                    out.push(0x06);
                    self.put(s, width, &mut out);
                    self.put(e, width, &mut out);
                }
                FuzzedEntry::StartLength(s, l) => {
                    out.push(0x07);
                    self.put(s, width, &mut out);
                    uleb(u64::from(l), &mut out);
                }
                FuzzedEntry::Raw(byte) => out.push(byte),
            }
        }
        out.push(0x00);
        out
    }

    fn to_bytes(&self) -> Vec<u8> {
        let offset_width = if self.dwarf64 { 8 } else { 4 };
        let offsets = &self.offsets[..self.offsets.len().min(32)];
        let payload = self.payload();
        let length = (8 + offsets.len() * offset_width + payload.len()) as i64
            + i64::from(self.length_delta);
        let length = length.max(0) as u64;

        let mut out = Vec::new();
        if self.dwarf64 {
            self.put(0xffff_ffff, 4, &mut out);
            self.put(length, 8, &mut out);
        } else {
            self.put(length, 4, &mut out);
        }
        self.put(5, 2, &mut out);
        out.push(self.address_size);
        out.push(self.segment_selector_size);
        self.put(offsets.len() as u64, 4, &mut out);
        for off in offsets {
            self.put(u64::from(*off), offset_width, &mut out);
        }
        out.extend_from_slice(&payload);
        out
    }

    fn address_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for addr in self.addresses.iter().take(64) {
            self.put(*addr, 8, &mut out);
        }
        out
    }
}

fuzz_target!(|unit: FuzzedUnit| {
    let data = unit.to_bytes();
    let addrs = unit.address_bytes();
    let Ok(table) = AddressTable::new(&addrs, 8, unit.endianness()) else {
        return;
    };

    let config = RangeListConfig::debug_rnglists()
        .with_endianness(unit.endianness())
        .with_address_table(table);

    // Malformed headers must be rejected, never panic
    let Ok(list) = AddressRangeList::new(&data, config) else {
        return;
    };

    let addr_base = Some(u64::from(unit.addr_base));
    for unit_desc in list.units() {
        let direct = ListOffset::Direct(unit_desc.base_offset);
        if let Ok(ranges) = list.range_list(direct, unit.base, addr_base) {
            for range in &ranges {
                assert_ne!(range.start, range.end);
            }
        }

        for index in 0..u64::from(unit_desc.offset_entry_count) {
            let indexed = ListOffset::Indexed {
                unit_base: unit_desc.base_offset,
                index,
            };
            let _ = list.range_list(indexed, unit.base, addr_base);
        }
    }
});
