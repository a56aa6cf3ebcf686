//! SDMA header word codec.
//!
//! ```text
//! opcode:8 @ 0 | sub-opcode:8 @ 8 | opcode-specific:16 @ 16
//! ```

/// Opcode number (low byte).
#[inline]
pub fn opcode(header: u32) -> u32 {
    header & 0xFF
}

/// Sub-opcode number.
#[inline]
pub fn sub_opcode(header: u32) -> u32 {
    (header >> 8) & 0xFF
}

/// Composes a header for `(opcode, sub_opcode)` with `extra` in the
/// opcode-specific top half.
#[inline]
pub fn encode(opcode: u32, sub_opcode: u32, extra: u32) -> u32 {
    (extra & 0xFFFF) << 16 | (sub_opcode & 0xFF) << 8 | (opcode & 0xFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        for op in [0u32, 1, 8, 14, 0xFF] {
            for sub in [0u32, 1, 5] {
                let h = encode(op, sub, 0x1234);
                assert_eq!(opcode(h), op);
                assert_eq!(sub_opcode(h), sub);
                assert_eq!(h >> 16, 0x1234);
            }
        }
    }
}
