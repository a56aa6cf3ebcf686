//! SDMA opcode field decoder and indirect-buffer follow.

use ringdec_core::{
    bits, compare_function, emit_fields, fetch_words, pair64, Asic, DecodeParams, IbKind,
    OpcodeEvent, Radix, Sink, Stream, Token,
};
use tracing::warn;

use crate::build::build_stream;
use crate::opcode::{self, SdmaOpcode};
use crate::tables;

/// The buffer reference decoded out of an `INDIRECT` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IbTarget {
    pub addr: u64,
    pub vmid: u32,
    pub size_words: u32,
}

/// Extracts the indirect-buffer target from an `INDIRECT` token.
///
/// The VMID rides in the header's opcode-specific half; zero means the
/// stream's own context (`default_vmid`). Returns `None` for a zero-sized
/// or structurally absent reference.
pub fn ib_target(token: &Token, default_vmid: u32) -> Option<IbTarget> {
    let w0 = *token.words.first()?;
    let w1 = *token.words.get(1)?;
    let size_words = bits(*token.words.get(2)?, 0, 20);
    if size_words == 0 {
        return None;
    }
    let vmid_field = bits(token.header, 16, 20);
    Some(IbTarget {
        addr: pair64(w0 & !3, w1),
        vmid: if vmid_field != 0 {
            vmid_field
        } else {
            default_vmid
        },
        size_words,
    })
}

/// Decodes a built SDMA stream into Sink events.
///
/// Same contract as the graphics-family decoder: one `start_ib`, per-token
/// `start_opcode` + fields, one `done`; a token whose table overruns its
/// payload is marked invalid without disturbing its neighbors; `INDIRECT`
/// tokens recurse when `params.follow` is set; a `max_opcodes` budget
/// returns the continuation index.
pub fn decode_stream(
    stream: &mut Stream,
    asic: &Asic<'_>,
    params: &DecodeParams,
    sink: &mut dyn Sink,
) -> Option<usize> {
    let mut decoder = SdmaDecoder { asic };
    decoder.run(stream, params, sink)
}

struct SdmaDecoder<'a, 'b> {
    asic: &'a Asic<'b>,
}

impl SdmaDecoder<'_, '_> {
    fn run(&mut self, stream: &mut Stream, params: &DecodeParams, sink: &mut dyn Sink) -> Option<usize> {
        sink.start_ib(
            params.addr,
            params.vmid,
            params.from_addr,
            params.from_vmid,
            stream.size_words(),
            params.kind,
        );

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
            self.token(stream, idx, params, sink);
        }

        sink.done();
        None
    }

    fn token(&mut self, stream: &mut Stream, idx: usize, params: &DecodeParams, sink: &mut dyn Sink) {
        let token = &mut stream.tokens[idx];
        let addr = params.addr + 4 * u64::from(token.offset);
        let vmid = params.vmid;

        let op = SdmaOpcode::from_raw(token.opcode);
        let sub = token.sub_opcode.unwrap_or(0);
        sink.start_opcode(&OpcodeEvent {
            addr,
            vmid,
            pkt_type: token.pkt_type,
            opcode: token.opcode,
            sub_opcode: token.sub_opcode,
            nwords: token.size_words(),
            name: op.name(),
            header: token.header,
            words: &token.words,
        });

        if token.invalid {
            return;
        }

        let Some(table) = tables::table_for(op, sub, &self.asic.ver) else {
            if matches!(op, SdmaOpcode::Unknown(_)) {
                sink.unhandled(addr, vmid, token);
            } else {
                sink.unhandled_subop(addr, vmid, token);
            }
            return;
        };
        if let Err(err) = emit_fields(table, token, &self.asic.ver, addr, vmid, sink) {
            warn!(opcode = op.name(), sub_opcode = sub, %err, "payload shorter than field table");
            token.invalid = true;
            return;
        }
        self.hook(op, sub, token, addr, vmid, sink);
        if token.invalid {
            return;
        }
        if op == SdmaOpcode::Indirect && params.follow {
            self.follow(token, addr, params, sink);
        }
    }

    fn hook(&mut self, op: SdmaOpcode, sub: u32, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        match (op, sub) {
            (SdmaOpcode::Write, opcode::WRITE_LINEAR) => {
                for (i, &value) in token.words.iter().enumerate().skip(3) {
                    let field_addr = addr + 4 * (1 + i as u64);
                    sink.add_field(field_addr, vmid, "DATA", u64::from(value), None, Radix::Hex);
                }
            }
            (SdmaOpcode::PollRegmem, _) => self.poll_regmem(token, addr, vmid, sink),
            (SdmaOpcode::SrbmWrite, _) => self.srbm_write(token, addr, vmid, sink),
            (SdmaOpcode::Indirect, _) => {
                if let Some(target) = ib_target(token, vmid) {
                    sink.add_field(addr + 4, vmid, "IB_BASE", target.addr, None, Radix::Hex);
                }
            }
            _ => {}
        }
    }

    /// The poll target's layout depends on the header: with the mem-poll bit
    /// clear the first payload word is a register offset, otherwise an
    /// address pair.
    fn poll_regmem(&mut self, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        let (Some(&w0), Some(&w1)) = (token.words.first(), token.words.get(1)) else {
            token.invalid = true;
            return;
        };
        let function = bits(token.header, 28, 31);
        sink.add_field(
            addr,
            vmid,
            "FUNCTION",
            u64::from(function),
            compare_function(function),
            Radix::Dec,
        );

        if bits(token.header, 31, 32) == 0 {
            let offset = bits(w0, 2, 20);
            let name = self
                .asic
                .regs
                .name_for(offset)
                .unwrap_or_else(|| format!("reg_0x{offset:04x}"));
            sink.add_field(addr + 4, vmid, "REGISTER", u64::from(offset), Some(&name), Radix::Hex);
        } else {
            sink.add_field(addr + 4, vmid, "ADDR_LO", u64::from(w0), None, Radix::Hex);
            sink.add_field(addr + 8, vmid, "ADDR_HI", u64::from(w1), None, Radix::Hex);
        }
    }

    fn srbm_write(&mut self, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        let (Some(&w0), Some(&w1)) = (token.words.first(), token.words.get(1)) else {
            token.invalid = true;
            return;
        };
        sink.add_field(
            addr,
            vmid,
            "BYTE_EN",
            u64::from(bits(token.header, 28, 32)),
            None,
            Radix::Hex,
        );
        let offset = bits(w0, 0, 18);
        let name = self
            .asic
            .regs
            .name_for(offset)
            .unwrap_or_else(|| format!("reg_0x{offset:04x}"));
        sink.add_field(addr + 4, vmid, "ADDR", u64::from(offset), Some(&name), Radix::Hex);
        sink.add_field(addr + 8, vmid, "DATA", u64::from(w1), None, Radix::Hex);
    }

    fn follow(&mut self, token: &mut Token, token_addr: u64, params: &DecodeParams, sink: &mut dyn Sink) {
        let Some(target) = ib_target(token, params.vmid) else {
            return;
        };

        if token.ib.is_none() {
            let Some(mem) = self.asic.mem else {
                return;
            };
            let Some(words) = fetch_words(mem, target.vmid, target.addr, target.size_words) else {
                return;
            };
            match build_stream(&words, target.vmid, &self.asic.ver, Some(mem)) {
                Some(nested) => token.ib = Some(Box::new(nested)),
                None => return,
            }
        }

        let nested_params = DecodeParams {
            addr: target.addr,
            vmid: target.vmid,
            from_addr: token_addr,
            from_vmid: params.vmid,
            follow: params.follow,
            max_opcodes: None,
            start: 0,
            kind: IbKind::Ib,
        };
        if let Some(ib) = token.ib.as_deref_mut() {
            decode_stream(ib, self.asic, &nested_params, sink);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringdec_core::PacketType;

    #[test]
    fn ib_target_vmid_comes_from_the_header() {
        let mut token = Token::new(PacketType::Packet, 4, crate::header::encode(4, 0, 9), 0);
        token.words = vec![0x4000, 0, 8, 0, 0];
        let t = ib_target(&token, 3).unwrap();
        assert_eq!(t.vmid, 9);
        assert_eq!(t.addr, 0x4000);
        assert_eq!(t.size_words, 8);

        token.header = crate::header::encode(4, 0, 0);
        assert_eq!(ib_target(&token, 3).unwrap().vmid, 3);

        token.words[2] = 0;
        assert!(ib_target(&token, 3).is_none());
    }
}
