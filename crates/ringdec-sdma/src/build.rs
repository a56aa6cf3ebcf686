//! SDMA stream builder.

use ringdec_core::{bits, fetch_words, Family, PacketType, Stream, Token, VersionContext, VmMemory};
use tracing::{debug, warn};

use crate::decode::ib_target;
use crate::header;
use crate::opcode::{self, SdmaOpcode};

/// Payload length in words for `(op, sub)`, not counting the header.
///
/// `rest` is the input remaining after the header, needed for the two
/// variable-length packets: `NOP` padding lives in the header's top half,
/// and linear `WRITE` declares its trailing data count in the third payload
/// word. A linear `WRITE` too short to even hold its count word yields a
/// length past `rest`, so the caller drops it as truncated.
///
/// Returns `None` for an opcode whose length is unknowable; the stream has
/// to end there.
fn payload_len(header: u32, rest: &[u32], ver: &VersionContext) -> Option<usize> {
    let op = SdmaOpcode::from_raw(header::opcode(header));
    let sub = header::sub_opcode(header);
    match (op, sub) {
        (SdmaOpcode::Nop, _) => Some(bits(header, 16, 30) as usize),
        (SdmaOpcode::Copy, opcode::COPY_LINEAR) => Some(6),
        (SdmaOpcode::Copy, opcode::COPY_TILED) => Some(11),
        (SdmaOpcode::Copy, opcode::COPY_LINEAR_SUB_WINDOW) => Some(12),
        (SdmaOpcode::Copy, opcode::COPY_T2T) => Some(14),
        (SdmaOpcode::Write, opcode::WRITE_LINEAR) => match rest.get(2) {
            Some(&count_word) => Some(3 + bits(count_word, 0, 20) as usize + 1),
            None => Some(rest.len() + 1),
        },
        (SdmaOpcode::Write, opcode::WRITE_TILED) => Some(9),
        (SdmaOpcode::Indirect, _) => Some(5),
        (SdmaOpcode::Fence, _) => Some(3),
        (SdmaOpcode::Trap, _) => Some(1),
        (SdmaOpcode::Sem, _) => Some(2),
        (SdmaOpcode::PollRegmem, _) => Some(5),
        (SdmaOpcode::CondExe, _) => Some(4),
        (SdmaOpcode::Atomic, _) => Some(7),
        (SdmaOpcode::ConstFill, _) => Some(4),
        (SdmaOpcode::Timestamp, _) => Some(2),
        (SdmaOpcode::SrbmWrite, _) => Some(2),
        (SdmaOpcode::PreExe, _) => Some(1),
        (SdmaOpcode::GcrReq, _) if ver.at_least(5, 0) => Some(4),
        (SdmaOpcode::GcrReq, _) => None,
        (SdmaOpcode::Copy | SdmaOpcode::Write, _) => None,
        (SdmaOpcode::Unknown(_), _) => None,
    }
}

/// Builds a token stream from a raw SDMA word slice.
///
/// Packet lengths come from the per-(opcode, sub-opcode) table; a header
/// whose length cannot be determined ends the stream (everything after it
/// would be misframed). `ver` is the SDMA IP version, which gates which
/// opcodes exist at all. Indirect-buffer references are resolved eagerly
/// when `mem` is supplied, as in the graphics family.
pub fn build_stream(
    words: &[u32],
    vmid: u32,
    ver: &VersionContext,
    mem: Option<&dyn VmMemory>,
) -> Option<Stream> {
    let mut stream = Stream::new(Family::Sdma, vmid);
    let mut i = 0usize;

    while i < words.len() {
        let hdr = words[i];
        let op = header::opcode(hdr);
        let sub = header::sub_opcode(hdr);
        let Some(len) = payload_len(hdr, &words[i + 1..], ver) else {
            warn!(header = hdr, opcode = op, sub_opcode = sub, offset = i, "unknown packet length, ending stream");
            break;
        };

        let end = i + 1 + len;
        if end > words.len() {
            debug!(
                header = hdr,
                offset = i,
                declared = len,
                remaining = words.len() - i - 1,
                "truncated trailing packet dropped"
            );
            break;
        }

        let mut token = Token::new(PacketType::Packet, op, hdr, i as u32);
        token.sub_opcode = Some(sub);
        token.words = words[i + 1..end].to_vec();

        if SdmaOpcode::from_raw(op) == SdmaOpcode::Indirect {
            if let Some(mem) = mem {
                prefetch_ib(&mut token, vmid, ver, mem);
            }
        }

        stream.tokens.push(token);
        i = end;
    }

    if stream.is_empty() {
        None
    } else {
        Some(stream)
    }
}

fn prefetch_ib(token: &mut Token, vmid: u32, ver: &VersionContext, mem: &dyn VmMemory) {
    let Some(target) = ib_target(token, vmid) else {
        return;
    };
    let Some(ib_words) = fetch_words(mem, target.vmid, target.addr, target.size_words) else {
        return;
    };
    if let Some(nested) = build_stream(&ib_words, target.vmid, ver, Some(mem)) {
        token.ib = Some(Box::new(nested));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ringdec_core::test_utils::VecVmMemory;
    use ringdec_core::{ChipFamily, IpTriple};

    fn sdma(maj: u32, min: u32) -> VersionContext {
        VersionContext::new(ChipFamily::Gfx10, IpTriple::new(maj, min, 0))
    }

    #[test]
    fn fixed_length_packets_frame_back_to_back() {
        let words = [
            header::encode(5, 0, 0), // FENCE
            0x1000,
            0,
            0xDEAD,
            header::encode(6, 0, 0), // TRAP
            0x7,
            header::encode(0, 0, 2), // NOP, 2 padding words
            0,
            0,
        ];
        let stream = build_stream(&words, 0, &sdma(5, 0), None).unwrap();
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.tokens[0].opcode, 5);
        assert_eq!(stream.tokens[0].words.len(), 3);
        assert_eq!(stream.tokens[1].opcode, 6);
        assert_eq!(stream.tokens[2].opcode, 0);
        assert_eq!(stream.tokens[2].words.len(), 2);
        assert_eq!(stream.size_words(), words.len() as u32);
    }

    #[test]
    fn linear_write_length_comes_from_count_word() {
        let words = [
            header::encode(2, 0, 0), // WRITE LINEAR
            0x2000,                  // DST_ADDR_LO
            0,                       // DST_ADDR_HI
            1,                       // COUNT: 1 -> 2 data words
            0xAAAA_AAAA,
            0xBBBB_BBBB,
            header::encode(6, 0, 0), // TRAP frames right after
            0,
        ];
        let stream = build_stream(&words, 0, &sdma(5, 0), None).unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.tokens[0].words.len(), 5);
        assert_eq!(stream.tokens[1].opcode, 6);
    }

    #[test]
    fn write_missing_count_word_is_truncated() {
        let words = [header::encode(2, 0, 0), 0x2000, 0];
        assert!(build_stream(&words, 0, &sdma(5, 0), None).is_none());
    }

    #[test]
    fn unknown_opcode_ends_stream() {
        let words = [
            header::encode(6, 0, 0), // TRAP
            0,
            header::encode(0x42, 0, 0),
            0x1234,
        ];
        let stream = build_stream(&words, 0, &sdma(5, 0), None).unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.tokens[0].opcode, 6);
    }

    #[test]
    fn gcr_req_needs_a_new_enough_engine() {
        let words = [header::encode(17, 0, 0), 0, 0, 0, 0];
        assert!(build_stream(&words, 0, &sdma(4, 0), None).is_none());
        let stream = build_stream(&words, 0, &sdma(5, 0), None).unwrap();
        assert_eq!(stream.tokens[0].words.len(), 4);
    }

    #[test]
    fn indirect_buffer_is_prefetched() {
        let ib_words = [header::encode(6, 0, 0), 0x7]; // TRAP
        let mem = VecVmMemory::new(2, 0x4000, &ib_words);
        let words = [
            header::encode(4, 0, 2), // INDIRECT, VMID 2 in the header
            0x4000,                  // IB_BASE_LO
            0,                       // IB_BASE_HI
            2,                       // IB_SIZE
            0,                       // CSA_ADDR_LO
            0,                       // CSA_ADDR_HI
        ];
        let stream = build_stream(&words, 0, &sdma(5, 0), Some(&mem)).unwrap();
        let ib = stream.tokens[0].ib.as_ref().expect("nested stream attached");
        assert_eq!(ib.vmid, 2);
        assert_eq!(ib.len(), 1);
        assert_eq!(ib.tokens[0].opcode, 6);
    }
}
