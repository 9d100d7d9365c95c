//! LEB128 (Little Endian Base 128) decoding.
//!
//! DWARF uses LEB128 for variable-length integers. This encoding uses
//! 7 bits per byte, with the high bit indicating continuation.

use super::reader::ReadError;

/// Decode an unsigned LEB128 value from bytes.
/// Returns the value and the number of bytes consumed.
///
/// Error offsets are relative to the start of `data`.
pub fn decode_uleb128(data: &[u8]) -> Result<(u64, usize), ReadError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut index = 0;

    loop {
        let Some(&byte) = data.get(index) else {
            return Err(ReadError::UnexpectedEof {
                offset: 0,
                needed: index + 1,
                available: data.len(),
            });
        };
        index += 1;

        let low_bits = u64::from(byte & 0x7F);

        // Bits that would be shifted out of a u64 must be zero
        if shift >= 64 || (shift == 63 && low_bits > 1) {
            if low_bits != 0 {
                return Err(ReadError::Leb128Overflow { offset: 0 });
            }
        } else {
            result |= low_bits << shift;
        }
        shift = shift.saturating_add(7);

        if byte & 0x80 == 0 {
            break;
        }
    }

    Ok((result, index))
}
