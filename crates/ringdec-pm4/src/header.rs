//! PM4 header word codec.
//!
//! Layout (hardware ABI, bit-exact):
//!
//! ```text
//! type:2 @ 30 | count:14 @ 16 | opcode:8 @ 8 (type 3)
//!                             | base-offset:16 @ 0 (type 0)
//! ```
//!
//! The payload word count is `((header >> 16) + 1) & 0x3FFF` for type-0 and
//! type-3 packets; type-2 packets are a bare filler word.

/// Two-bit packet type tag.
#[inline]
pub fn pkt_type(header: u32) -> u32 {
    header >> 30
}

/// Declared payload word count (type 0 and type 3).
#[inline]
pub fn count(header: u32) -> u32 {
    ((header >> 16) + 1) & 0x3FFF
}

/// Type-3 opcode number.
#[inline]
pub fn opcode(header: u32) -> u32 {
    (header >> 8) & 0xFF
}

/// Type-0 register block base dword offset.
#[inline]
pub fn pkt0_base(header: u32) -> u32 {
    header & 0xFFFF
}

/// Composes a type-0 header writing `count` registers starting at `base`.
#[inline]
pub fn encode_type0(base: u32, count: u32) -> u32 {
    (count.wrapping_sub(1) & 0x3FFF) << 16 | (base & 0xFFFF)
}

/// The single-word type-2 filler.
#[inline]
pub fn encode_type2() -> u32 {
    2 << 30
}

/// Composes a type-3 header for `opcode` with `count` payload words.
#[inline]
pub fn encode_type3(opcode: u32, count: u32) -> u32 {
    3 << 30 | (count.wrapping_sub(1) & 0x3FFF) << 16 | (opcode & 0xFF) << 8
}
