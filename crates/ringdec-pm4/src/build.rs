//! PM4 stream builder.

use ringdec_core::{fetch_words, Family, PacketType, Stream, Token, VmMemory};
use tracing::{debug, warn};

use crate::decode::ib_target;
use crate::header;
use crate::opcode::Pm4Opcode;

/// Builds a token stream from a raw PM4 word slice.
///
/// `vmid` is the page-table context the slice was read under; it becomes the
/// default VMID for any indirect buffer whose control word does not name its
/// own. When `mem` is supplied, indirect-buffer references are resolved
/// eagerly: the referenced words are fetched, built recursively and attached
/// to the pointing token, so one top-level call yields the fully nested
/// result. A reference that fails to fetch is logged and left unresolved.
///
/// A token whose declared payload runs past the end of the slice is dropped
/// and the stream ends there; no read ever goes past `words`.
///
/// Returns `None` when no token could be materialized.
pub fn build_stream(words: &[u32], vmid: u32, mem: Option<&dyn VmMemory>) -> Option<Stream> {
    let mut stream = Stream::new(Family::Pm4, vmid);
    let mut i = 0usize;

    while i < words.len() {
        let hdr = words[i];
        let (pkt_type, opcode, count) = match header::pkt_type(hdr) {
            0 => (PacketType::Type0, header::pkt0_base(hdr), header::count(hdr)),
            2 => (PacketType::Type2, 0, 0),
            3 => (PacketType::Type3, header::opcode(hdr), header::count(hdr)),
            t => {
                // Type-1 is reserved on every supported generation; there is
                // no way to know its length, so the stream ends here.
                warn!(header = hdr, pkt_type = t, offset = i, "reserved packet type, ending stream");
                break;
            }
        };

        let end = i + 1 + count as usize;
        if end > words.len() {
            debug!(
                header = hdr,
                offset = i,
                declared = count,
                remaining = words.len() - i - 1,
                "truncated trailing packet dropped"
            );
            break;
        }

        let mut token = Token::new(pkt_type, opcode, hdr, i as u32);
        token.words = words[i + 1..end].to_vec();

        if pkt_type == PacketType::Type3 {
            let op = Pm4Opcode::from_raw(opcode);
            if op.is_ib() {
                if let Some(mem) = mem {
                    prefetch_ib(&mut token, vmid, mem);
                }
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
        // Already logged by fetch_words; the reference stays unresolved.
        return;
    };
    if let Some(nested) = build_stream(&ib_words, target.vmid, Some(mem)) {
        token.ib = Some(Box::new(nested));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{encode_type0, encode_type2, encode_type3};
    use pretty_assertions::assert_eq;
    use ringdec_core::test_utils::VecVmMemory;

    #[test]
    fn back_to_back_tokens_build_in_order() {
        let words = [
            encode_type3(0x10, 2), // NOP + 2 words
            0xAAAA_AAAA,
            0xBBBB_BBBB,
            encode_type0(0x2000, 1),
            0x1234_5678,
            encode_type2(),
            encode_type3(0x2A, 1), // INDEX_TYPE
            0x0000_0001,
        ];
        let stream = build_stream(&words, 0, None).unwrap();
        assert_eq!(stream.len(), 4);
        assert_eq!(stream.tokens[0].opcode, 0x10);
        assert_eq!(stream.tokens[0].words.len(), 2);
        assert_eq!(stream.tokens[1].pkt_type, PacketType::Type0);
        assert_eq!(stream.tokens[1].opcode, 0x2000);
        assert_eq!(stream.tokens[2].pkt_type, PacketType::Type2);
        assert_eq!(stream.tokens[2].words.len(), 0);
        assert_eq!(stream.tokens[3].offset, 6);
        assert_eq!(stream.size_words(), words.len() as u32);
    }

    #[test]
    fn truncated_trailing_token_is_dropped() {
        let full = [
            encode_type3(0x10, 1),
            0x1111_1111,
            encode_type3(0x37, 10), // declares 10 payload words
            0x2222_2222,
            0x3333_3333,
        ];
        let truncated = build_stream(&full, 0, None).unwrap();
        // Identical to building the input with the partial token removed.
        let clean = build_stream(&full[..2], 0, None).unwrap();
        assert_eq!(truncated, clean);
        assert_eq!(truncated.len(), 1);
    }

    #[test]
    fn empty_and_malformed_inputs_build_nothing() {
        assert!(build_stream(&[], 0, None).is_none());
        // Type-1 header up front: immediately malformed.
        assert!(build_stream(&[1 << 30, 0, 0], 0, None).is_none());
        // Bare header declaring one payload word with nothing after it.
        assert!(build_stream(&[0x0000_0000], 0, None).is_none());
    }

    #[test]
    fn indirect_buffer_is_prefetched_and_attached() {
        let ib_words = [encode_type3(0x10, 1), 0xCAFE_D00D];
        let mem = VecVmMemory::new(3, 0x8000, &ib_words);
        let words = [
            encode_type3(0x3F, 3), // INDIRECT_BUFFER
            0x8000,                // IB_BASE_LO
            0,                     // IB_BASE_HI
            2 | (3 << 24),         // IB_SIZE=2, VMID=3
        ];
        let stream = build_stream(&words, 0, Some(&mem)).unwrap();
        let ib = stream.tokens[0].ib.as_ref().expect("nested stream attached");
        assert_eq!(ib.vmid, 3);
        assert_eq!(ib.len(), 1);
        assert_eq!(ib.tokens[0].words, vec![0xCAFE_D00D]);
    }

    #[test]
    fn failed_ib_fetch_leaves_reference_unresolved() {
        let mem = VecVmMemory::new(1, 0, &[0; 2]);
        let words = [
            encode_type3(0x3F, 3),
            0x9000, // nothing mapped here
            0,
            4 | (1 << 24),
        ];
        let stream = build_stream(&words, 0, Some(&mem)).unwrap();
        assert_eq!(stream.len(), 1);
        assert!(stream.tokens[0].ib.is_none());
    }
}
