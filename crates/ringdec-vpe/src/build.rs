//! VPE stream builder.

use ringdec_core::{bits, fetch_words, Family, PacketType, Stream, Token, VmMemory};
use tracing::{debug, warn};

use crate::decode::ib_target;
use crate::header;
use crate::opcode::VpeOpcode;

/// Payload length in words for `op`, not counting the header. `NOP` padding
/// rides in the header's top half; everything else is fixed.
fn payload_len(header: u32) -> Option<usize> {
    match VpeOpcode::from_raw(header::opcode(header)) {
        VpeOpcode::Nop => Some(bits(header, 16, 30) as usize),
        VpeOpcode::VpeDescriptor => Some(3),
        VpeOpcode::VpePlaneConfig => Some(7),
        VpeOpcode::VpepConfig => Some(2),
        VpeOpcode::Indirect => Some(5),
        VpeOpcode::Fence => Some(3),
        VpeOpcode::Trap => Some(1),
        VpeOpcode::RegisterWrite => Some(2),
        VpeOpcode::PollRegmem => Some(5),
        VpeOpcode::CondExe => Some(4),
        VpeOpcode::Timestamp => Some(2),
        VpeOpcode::Unknown(_) => None,
    }
}

/// Builds a token stream from a raw VPE word slice.
///
/// Same framing rules as the DMA engine: lengths come from the per-opcode
/// table, an unknown opcode ends the stream, a truncated trailing packet is
/// dropped, and `INDIRECT` references are resolved eagerly when `mem` is
/// supplied.
pub fn build_stream(words: &[u32], vmid: u32, mem: Option<&dyn VmMemory>) -> Option<Stream> {
    let mut stream = Stream::new(Family::Vpe, vmid);
    let mut i = 0usize;

    while i < words.len() {
        let hdr = words[i];
        let op = header::opcode(hdr);
        let Some(len) = payload_len(hdr) else {
            warn!(header = hdr, opcode = op, offset = i, "unknown packet length, ending stream");
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
        token.sub_opcode = Some(header::sub_opcode(hdr));
        token.words = words[i + 1..end].to_vec();

        if VpeOpcode::from_raw(op) == VpeOpcode::Indirect {
            if let Some(mem) = mem {
                prefetch_ib(&mut token, vmid, mem);
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

fn prefetch_ib(token: &mut Token, vmid: u32, mem: &dyn VmMemory) {
    let Some(target) = ib_target(token, vmid) else {
        return;
    };
    let Some(ib_words) = fetch_words(mem, target.vmid, target.addr, target.size_words) else {
        return;
    };
    if let Some(nested) = build_stream(&ib_words, target.vmid, Some(mem)) {
        token.ib = Some(Box::new(nested));
    }
}
