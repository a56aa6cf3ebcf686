//! Declarative per-opcode field tables.
//!
//! The original decoders open-coded every bit shift inside large per-family
//! switches; here each opcode's plain bitfields are a `&[FieldSpec]` slice
//! (name, word, bit range, version gates, radix) consumed by one generic
//! emission loop. Fields needing more than a bit slice — 64-bit address
//! assembly, register-name resolution, shader detection — stay in small
//! per-opcode hooks in the family crates.

use thiserror::Error;

use crate::sink::{Radix, Sink};
use crate::stream::Token;
use crate::version::VersionContext;

/// One named bit range of an opcode's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Payload word index (the header is not part of the payload).
    pub word: u16,
    /// Bit range `[lo, hi)` within the word.
    pub lo: u8,
    pub hi: u8,
    /// Minimum owning-IP `(maj, min)` this field exists at.
    pub since: Option<(u32, u32)>,
    /// Owning-IP `(maj, min)` this field was removed (or renamed) at.
    pub until: Option<(u32, u32)>,
    pub radix: Radix,
}

impl FieldSpec {
    /// Is this field present for the resolved hardware generation?
    pub fn applies(&self, ver: &VersionContext) -> bool {
        if let Some((maj, min)) = self.since {
            if !ver.at_least(maj, min) {
                return false;
            }
        }
        if let Some((maj, min)) = self.until {
            if ver.at_least(maj, min) {
                return false;
            }
        }
        true
    }
}

/// A version-independent field.
pub const fn field(name: &'static str, word: u16, lo: u8, hi: u8, radix: Radix) -> FieldSpec {
    FieldSpec {
        name,
        word,
        lo,
        hi,
        since: None,
        until: None,
        radix,
    }
}

/// A field introduced at IP `maj.min`.
pub const fn field_since(
    name: &'static str,
    word: u16,
    lo: u8,
    hi: u8,
    radix: Radix,
    maj: u32,
    min: u32,
) -> FieldSpec {
    FieldSpec {
        name,
        word,
        lo,
        hi,
        since: Some((maj, min)),
        until: None,
        radix,
    }
}

/// A field removed (or renamed) at IP `maj.min`.
pub const fn field_until(
    name: &'static str,
    word: u16,
    lo: u8,
    hi: u8,
    radix: Radix,
    maj: u32,
    min: u32,
) -> FieldSpec {
    FieldSpec {
        name,
        word,
        lo,
        hi,
        since: None,
        until: Some((maj, min)),
        radix,
    }
}

/// Extracts bit range `[lo, hi)` from a word.
#[inline]
pub fn bits(word: u32, lo: u8, hi: u8) -> u32 {
    debug_assert!(lo < hi && hi <= 32);
    let width = hi - lo;
    let mask = if width >= 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    };
    (word >> lo) & mask
}

/// Assembles a 64-bit value from low/high words.
#[inline]
pub fn pair64(lo: u32, hi: u32) -> u64 {
    (u64::from(hi) << 32) | u64::from(lo)
}

/// Label for the compare-function encoding shared by the wait/poll packets
/// of every engine family.
pub fn compare_function(value: u32) -> Option<&'static str> {
    match value {
        0 => Some("always"),
        1 => Some("<"),
        2 => Some("<="),
        3 => Some("=="),
        4 => Some("!="),
        5 => Some(">="),
        6 => Some(">"),
        _ => None,
    }
}

/// A field table referenced a payload word the token does not have.
///
/// Per the error policy this marks the token invalid and suppresses its
/// remaining decode; it never aborts the stream (the video-codec families
/// excepted, see their decoders).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("field {name} needs payload word {word}, token has {have}")]
pub struct EmitOverrun {
    pub name: &'static str,
    pub word: u16,
    pub have: usize,
}

/// Runs the generic emission loop for `table` over `token`'s payload.
///
/// `addr` is the address of the token's header word; each field is reported
/// at the address of the payload word it was sliced from. Fields gated out
/// by `ver` are skipped without touching the payload.
pub fn emit_fields(
    table: &[FieldSpec],
    token: &Token,
    ver: &VersionContext,
    addr: u64,
    vmid: u32,
    sink: &mut dyn Sink,
) -> Result<(), EmitOverrun> {
    for spec in table {
        if !spec.applies(ver) {
            continue;
        }
        let word = *token
            .words
            .get(usize::from(spec.word))
            .ok_or(EmitOverrun {
                name: spec.name,
                word: spec.word,
                have: token.words.len(),
            })?;
        let value = u64::from(bits(word, spec.lo, spec.hi));
        let field_addr = addr + 4 * (1 + u64::from(spec.word));
        sink.add_field(field_addr, vmid, spec.name, value, None, spec.radix);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::PacketType;
    use crate::test_utils::{Event, RecordingSink};
    use crate::version::{ChipFamily, IpTriple};
    use pretty_assertions::assert_eq;

    fn ver(maj: u32, min: u32) -> VersionContext {
        VersionContext::new(ChipFamily::Gfx10, IpTriple::new(maj, min, 0))
    }

    #[test]
    fn bit_slicing() {
        assert_eq!(bits(0xC000_1000, 30, 32), 3);
        assert_eq!(bits(0xC000_1000, 8, 16), 0x10);
        assert_eq!(bits(0xFFFF_FFFF, 0, 32), 0xFFFF_FFFF);
        assert_eq!(bits(0b1010_0100, 2, 6), 0b1001);
    }

    #[test]
    fn version_gating() {
        let f = field_since("GCR_CNTL", 0, 0, 19, Radix::Hex, 10, 0);
        assert!(f.applies(&ver(10, 0)));
        assert!(f.applies(&ver(11, 0)));
        assert!(!f.applies(&ver(9, 4)));

        let old = field_until("TC_ACTION_ENA", 0, 17, 18, Radix::Dec, 10, 0);
        assert!(old.applies(&ver(9, 0)));
        assert!(!old.applies(&ver(10, 0)));
    }

    #[test]
    fn overrun_reports_missing_word() {
        let table = [field("A", 0, 0, 8, Radix::Dec), field("B", 3, 0, 8, Radix::Dec)];
        let mut token = Token::new(PacketType::Type3, 0x10, 0xC000_1000, 0);
        token.words = vec![0xAB];

        let mut sink = RecordingSink::default();
        let err = emit_fields(&table, &token, &ver(10, 0), 0, 0, &mut sink).unwrap_err();
        assert_eq!(err.word, 3);
        assert_eq!(err.have, 1);
        // The in-bounds field before the overrun was still emitted.
        assert_eq!(
            sink.events,
            vec![Event::Field {
                addr: 4,
                vmid: 0,
                name: "A".into(),
                value: 0xAB,
                text: None,
                radix: Radix::Dec,
            }]
        );
    }
}
