//! VCN decode-ring streams: type-0 register writes driving the firmware
//! mailbox.

use ringdec_core::{
    pair64, Asic, DecodeParams, OpcodeEvent, PacketType, Radix, Sink, Stream, Token,
};
use tracing::{debug, warn};

use ringdec_pm4::header;

use crate::msg;

/// Builds a token stream from a raw decode-ring word slice.
///
/// The framing is the PM4 type-0/type-2 subset; any other packet type ends
/// the stream. Truncation drops the partial trailing token, as everywhere.
pub fn build_stream(words: &[u32], vmid: u32) -> Option<Stream> {
    let mut stream = Stream::new(ringdec_core::Family::VcnDec, vmid);
    let mut i = 0usize;

    while i < words.len() {
        let hdr = words[i];
        let (pkt_type, base, count) = match header::pkt_type(hdr) {
            0 => (PacketType::Type0, header::pkt0_base(hdr), header::count(hdr)),
            2 => (PacketType::Type2, 0, 0),
            t => {
                warn!(header = hdr, pkt_type = t, offset = i, "unexpected packet type on a decode ring, ending stream");
                break;
            }
        };

        let end = i + 1 + count as usize;
        if end > words.len() {
            debug!(header = hdr, offset = i, declared = count, "truncated trailing packet dropped");
            break;
        }

        let mut token = Token::new(pkt_type, base, hdr, i as u32);
        token.words = words[i + 1..end].to_vec();
        stream.tokens.push(token);
        i = end;
    }

    if stream.is_empty() {
        None
    } else {
        Some(stream)
    }
}

/// Decodes a built decode-ring stream into Sink events.
///
/// Register writes are emitted as named fields. Writes that program the
/// `GPCOM_VCPU_DATA0`/`DATA1`/`CMD` mailbox are watched: a `CMD` write with
/// both address halves accumulated masks the command's reserved low bit and
/// hands the referenced buffer to the message parser, which emits `add_vcn`
/// records. A resumed pass (`params.start > 0`) rebuilds the accumulator
/// from the already-decoded prefix, so bounded calls compose.
///
/// A token already marked invalid aborts the remaining pass — the codec
/// families do not resynchronize past a bad token.
pub fn decode_stream(
    stream: &mut Stream,
    asic: &Asic<'_>,
    params: &DecodeParams,
    sink: &mut dyn Sink,
) -> Option<usize> {
    sink.start_ib(
        params.addr,
        params.vmid,
        params.from_addr,
        params.from_vmid,
        stream.size_words(),
        params.kind,
    );

    let mut mailbox = Mailbox::default();
    // On a resumed pass the address halves may have been programmed before
    // `params.start`; replay the decoded prefix into the accumulator so a
    // command after the boundary still sees them. Nothing is emitted here.
    for token in stream.tokens.iter().take(params.start) {
        if token.invalid || token.pkt_type != PacketType::Type0 {
            continue;
        }
        for (i, &value) in token.words.iter().enumerate() {
            if let Some(name) = asic.regs.name_for(token.opcode + i as u32) {
                mailbox.observe(&name, value);
            }
        }
    }

    let mut remaining = params.max_opcodes;
    for idx in params.start..stream.tokens.len() {
        match remaining {
            Some(0) => {
                sink.done();
                return Some(idx);
            }
            Some(ref mut n) => *n -= 1,
            None => {}
        }

        let token = &stream.tokens[idx];
        let addr = params.addr + 4 * u64::from(token.offset);
        let name = if token.pkt_type == PacketType::Type0 { "PKT0" } else { "PKT2" };
        sink.start_opcode(&OpcodeEvent {
            addr,
            vmid: params.vmid,
            pkt_type: token.pkt_type,
            opcode: token.opcode,
            sub_opcode: None,
            nwords: token.size_words(),
            name,
            header: token.header,
            words: &token.words,
        });

        if token.invalid {
            warn!(offset = token.offset, "invalid token, aborting decode-ring pass");
            break;
        }
        if token.pkt_type != PacketType::Type0 {
            continue;
        }

        for (i, &value) in token.words.iter().enumerate() {
            let offset = token.opcode + i as u32;
            let field_addr = addr + 4 * (1 + i as u64);
            let resolved = asic.regs.name_for(offset);
            let reg_name = resolved.unwrap_or_else(|| format!("reg_0x{offset:04x}"));
            mailbox.write(&reg_name, value, field_addr, params.vmid, asic, sink);
        }
    }

    sink.done();
    None
}

/// Accumulates the mailbox register writes of one pass.
#[derive(Debug, Default)]
struct Mailbox {
    data0: Option<u32>,
    data1: Option<u32>,
}

impl Mailbox {
    /// Latches an address-half write without emitting anything.
    fn observe(&mut self, reg_name: &str, value: u32) {
        if reg_name.ends_with("GPCOM_VCPU_DATA0") {
            self.data0 = Some(value);
        } else if reg_name.ends_with("GPCOM_VCPU_DATA1") {
            self.data1 = Some(value);
        }
    }

    fn write(
        &mut self,
        reg_name: &str,
        value: u32,
        field_addr: u64,
        vmid: u32,
        asic: &Asic<'_>,
        sink: &mut dyn Sink,
    ) {
        if reg_name.ends_with("GPCOM_VCPU_CMD") {
            // Low bit is reserved in the command encoding.
            let cmd = value & !1;
            sink.add_field(
                field_addr,
                vmid,
                reg_name,
                u64::from(value),
                msg::cmd_name(cmd),
                Radix::Hex,
            );
            self.dispatch(cmd, vmid, asic, sink);
            return;
        }
        self.observe(reg_name, value);
        sink.add_field(field_addr, vmid, reg_name, u64::from(value), None, Radix::Hex);
    }

    fn dispatch(&mut self, cmd: u32, vmid: u32, asic: &Asic<'_>, sink: &mut dyn Sink) {
        let (Some(lo), Some(hi)) = (self.data0, self.data1) else {
            debug!(cmd, "command issued without both address halves programmed");
            return;
        };
        let addr = pair64(lo, hi);
        let Some(mem) = asic.mem else {
            return;
        };
        if msg::parse_message(mem, vmid, addr, cmd, sink).is_none() {
            warn!(vmid, addr, cmd, "message buffer unreadable");
        }
    }
}
