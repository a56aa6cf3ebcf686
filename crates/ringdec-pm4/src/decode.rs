//! PM4 opcode field decoder and indirect-buffer follow.

use std::collections::HashMap;

use ringdec_core::{
    bits, emit_fields, fetch_words, pair64, Asic, DecodeParams, IbKind, OpcodeEvent, PacketType,
    Radix, ShaderRef, Sink, Stream, Token,
};
use tracing::warn;

use crate::build::build_stream;
use crate::opcode::Pm4Opcode;
use crate::tables;

/// The buffer reference decoded out of an `INDIRECT_BUFFER`-shaped payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IbTarget {
    pub addr: u64,
    pub vmid: u32,
    pub size_words: u32,
}

/// Extracts the indirect-buffer target from a pointer-bearing token.
///
/// A control word that names no VMID inherits `default_vmid` (the stream's
/// own context). For `COND_INDIRECT_BUFFER` this is the primary target
/// (words 7-9); which branch the hardware takes depends on runtime memory,
/// and the conditional form names no VMID at all. Returns `None` for a
/// zero-sized or structurally absent reference.
pub fn ib_target(token: &Token, default_vmid: u32) -> Option<IbTarget> {
    if Pm4Opcode::from_raw(token.opcode) == Pm4Opcode::CondIndirectBuffer {
        let w7 = *token.words.get(7)?;
        let w8 = *token.words.get(8)?;
        let size_words = bits(*token.words.get(9)?, 0, 20);
        if size_words == 0 {
            return None;
        }
        return Some(IbTarget {
            addr: pair64(w7 & !3, w8),
            vmid: default_vmid,
            size_words,
        });
    }

    let w0 = *token.words.first()?;
    let w1 = *token.words.get(1)?;
    let control = *token.words.get(2)?;
    let size_words = bits(control, 0, 20);
    if size_words == 0 {
        return None;
    }
    let vmid_field = bits(control, 24, 28);
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

/// Decodes a built PM4 stream into Sink events.
///
/// Emits one `start_ib`, then per token `start_opcode` plus its fields, then
/// `done`. A token whose table runs past the actual payload is marked
/// invalid and its remaining decode/follow is suppressed; earlier siblings
/// and later tokens are unaffected.
///
/// With `params.follow` set, pointer-bearing tokens recurse into their
/// nested stream (prefetched by the builder, or fetched here on demand).
/// There is no cycle detection: a self-referential IB chain recurses as deep
/// as the chain goes.
///
/// A resumed pass (`params.start > 0`) first replays the already-decoded
/// prefix into the shader-pair tracker without emitting anything, so bounded
/// calls compose into the same event sequence as one unbounded pass.
///
/// Returns the index of the first undecoded token when the
/// `params.max_opcodes` budget ran out, `None` when the pass completed.
pub fn decode_stream(
    stream: &mut Stream,
    asic: &Asic<'_>,
    params: &DecodeParams,
    sink: &mut dyn Sink,
) -> Option<usize> {
    let mut decoder = Pm4Decoder {
        asic,
        shader_lo: HashMap::new(),
    };
    decoder.run(stream, params, sink)
}

struct Pm4Decoder<'a, 'b> {
    asic: &'a Asic<'b>,
    /// Pending `*_PGM_LO` writes, keyed by register stem, awaiting their
    /// `*_PGM_HI` half.
    shader_lo: HashMap<String, u32>,
}

impl Pm4Decoder<'_, '_> {
    fn run(&mut self, stream: &mut Stream, params: &DecodeParams, sink: &mut dyn Sink) -> Option<usize> {
        sink.start_ib(
            params.addr,
            params.vmid,
            params.from_addr,
            params.from_vmid,
            stream.size_words(),
            params.kind,
        );

        if params.start > 0 {
            self.replay_shader_regs(stream, params.start);
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
            self.token(stream, idx, params, sink);
        }

        sink.done();
        None
    }

    fn token(&mut self, stream: &mut Stream, idx: usize, params: &DecodeParams, sink: &mut dyn Sink) {
        let token = &mut stream.tokens[idx];
        let addr = params.addr + 4 * u64::from(token.offset);
        let vmid = params.vmid;

        let op = Pm4Opcode::from_raw(token.opcode);
        let name = match token.pkt_type {
            PacketType::Type0 => "PKT0",
            PacketType::Type2 => "PKT2",
            _ => op.name(),
        };
        sink.start_opcode(&OpcodeEvent {
            addr,
            vmid,
            pkt_type: token.pkt_type,
            opcode: token.opcode,
            sub_opcode: None,
            nwords: token.size_words(),
            name,
            header: token.header,
            words: &token.words,
        });

        if token.invalid {
            return;
        }

        match token.pkt_type {
            PacketType::Type2 | PacketType::Packet => {}
            PacketType::Type0 => {
                let base = token.opcode;
                self.reg_fields(token, base, 0, addr, vmid, sink);
            }
            PacketType::Type3 => {
                let Some(table) = tables::table_for(op, &self.asic.ver) else {
                    sink.unhandled(addr, vmid, token);
                    return;
                };
                if let Err(err) = emit_fields(table, token, &self.asic.ver, addr, vmid, sink) {
                    warn!(opcode = op.name(), %err, "payload shorter than field table");
                    token.invalid = true;
                    return;
                }
                self.hook(op, token, addr, vmid, sink);
                if token.invalid {
                    return;
                }
                if op.is_ib() && params.follow {
                    self.follow(token, addr, params, sink);
                }
            }
        }
    }

    /// Rebuilds the pending `*_PGM_LO` map from the tokens before `start`,
    /// so a resumed pass pairs shader halves exactly like an unbounded one.
    /// Nothing is emitted; the prefix was already decoded.
    fn replay_shader_regs(&mut self, stream: &Stream, start: usize) {
        for token in stream.tokens.iter().take(start) {
            if token.invalid
                || token.pkt_type != PacketType::Type3
                || Pm4Opcode::from_raw(token.opcode) != Pm4Opcode::SetShReg
            {
                continue;
            }
            let Some(&w0) = token.words.first() else {
                continue;
            };
            let base = Pm4Opcode::SetShReg.reg_base().unwrap_or(0) + bits(w0, 0, 16);
            for (i, &value) in token.words.iter().enumerate().skip(1) {
                let offset = base + (i - 1) as u32;
                if let Some(name) = self.asic.regs.name_for(offset) {
                    let _ = self.track_shader(&name, value, 0, 0);
                }
            }
        }
    }

    /// Emits one symbolically-named field per register value written.
    ///
    /// `base` is the register dword offset of `words[skip]`; the first
    /// `skip` payload words are not register data.
    fn reg_fields(
        &mut self,
        token: &mut Token,
        base: u32,
        skip: usize,
        addr: u64,
        vmid: u32,
        sink: &mut dyn Sink,
    ) {
        let is_sh_reg = Pm4Opcode::from_raw(token.opcode) == Pm4Opcode::SetShReg
            && token.pkt_type == PacketType::Type3;
        let mut shader: Option<(u64, ShaderRef)> = None;

        for (i, &value) in token.words.iter().enumerate().skip(skip) {
            let offset = base + (i - skip) as u32;
            let field_addr = addr + 4 * (1 + i as u64);
            let resolved = self.asic.regs.name_for(offset);
            let name = resolved.unwrap_or_else(|| format!("reg_0x{offset:04x}"));
            sink.add_field(field_addr, vmid, &name, u64::from(value), None, Radix::Hex);

            if is_sh_reg {
                if let Some(hit) = self.track_shader(&name, value, field_addr, vmid) {
                    shader = Some(hit);
                }
            }
        }

        if let Some((shader_addr, shader_ref)) = shader {
            sink.add_shader(shader_addr, vmid, &shader_ref);
            token.shader = Some(shader_ref);
        }
    }

    /// Watches `*_PGM_LO`/`*_PGM_HI` pairs; returns the assembled program
    /// reference when a HI write completes one.
    fn track_shader(&mut self, name: &str, value: u32, field_addr: u64, vmid: u32) -> Option<(u64, ShaderRef)> {
        if let Some(stem) = name.strip_suffix_stem("_PGM_LO") {
            self.shader_lo.insert(stem, value);
            return None;
        }
        let stem = name.strip_suffix_stem("_PGM_HI")?;
        let lo = self.shader_lo.remove(&stem)?;
        // PGM registers hold the 256-byte-aligned program address >> 8.
        let addr = pair64(lo, value) << 8;
        Some((
            field_addr,
            ShaderRef {
                addr,
                vmid,
                unit: shader_unit(&stem),
            },
        ))
    }

    fn hook(&mut self, op: Pm4Opcode, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        match op {
            Pm4Opcode::SetConfigReg
            | Pm4Opcode::SetContextReg
            | Pm4Opcode::SetShReg
            | Pm4Opcode::SetUconfigReg => {
                let Some(&w0) = token.words.first() else {
                    token.invalid = true;
                    return;
                };
                let base = op.reg_base().unwrap_or(0) + bits(w0, 0, 16);
                self.reg_fields(token, base, 1, addr, vmid, sink);
            }
            Pm4Opcode::WriteData => self.write_data(token, addr, vmid, sink),
            Pm4Opcode::WaitRegMem => self.wait_reg_mem(token, addr, vmid, sink),
            Pm4Opcode::CopyData => self.copy_data(token, addr, vmid, sink),
            Pm4Opcode::EventWrite => {
                // An EVENT_WRITE with an address pair carries it in words 1-2.
                if token.words.len() >= 3 {
                    self.word_field(token, 1, "ADDR_LO", addr, vmid, sink);
                    self.word_field(token, 2, "ADDR_HI", addr, vmid, sink);
                }
            }
            Pm4Opcode::IndirectBuffer
            | Pm4Opcode::IndirectBufferConst
            | Pm4Opcode::CondIndirectBuffer => {
                if let Some(target) = ib_target(token, vmid) {
                    let base_word = if op == Pm4Opcode::CondIndirectBuffer { 7 } else { 0 };
                    sink.add_field(
                        addr + 4 * (1 + base_word),
                        vmid,
                        "IB_BASE",
                        target.addr,
                        None,
                        Radix::Hex,
                    );
                }
            }
            _ => {}
        }
    }

    fn word_field(
        &mut self,
        token: &Token,
        word: usize,
        name: &str,
        addr: u64,
        vmid: u32,
        sink: &mut dyn Sink,
    ) {
        if let Some(&value) = token.words.get(word) {
            let field_addr = addr + 4 * (1 + word as u64);
            sink.add_field(field_addr, vmid, name, u64::from(value), None, Radix::Hex);
        }
    }

    fn write_data(&mut self, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        let Some(&w0) = token.words.first() else {
            token.invalid = true;
            return;
        };
        let dst_sel = bits(w0, 8, 12);
        sink.add_field(
            addr + 4,
            vmid,
            "DST_SEL",
            u64::from(dst_sel),
            tables::write_data_dst_sel(dst_sel, &self.asic.ver),
            Radix::Dec,
        );

        // Data words start after the two address words.
        if dst_sel == 0 {
            // Destination is a mem-mapped register: name each written word.
            let base = bits(*token.words.get(1).unwrap_or(&0), 0, 18);
            for (i, &value) in token.words.iter().enumerate().skip(3) {
                let offset = base + (i - 3) as u32;
                let field_addr = addr + 4 * (1 + i as u64);
                let name = self
                    .asic
                    .regs
                    .name_for(offset)
                    .unwrap_or_else(|| format!("reg_0x{offset:04x}"));
                sink.add_field(field_addr, vmid, &name, u64::from(value), None, Radix::Hex);
            }
        } else {
            for (i, &value) in token.words.iter().enumerate().skip(3) {
                let field_addr = addr + 4 * (1 + i as u64);
                sink.add_field(field_addr, vmid, "DATA", u64::from(value), None, Radix::Hex);
            }
        }
    }

    fn wait_reg_mem(&mut self, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        let (Some(&w0), Some(&w1), Some(&w2)) = (
            token.words.first(),
            token.words.get(1),
            token.words.get(2),
        ) else {
            token.invalid = true;
            return;
        };
        let function = bits(w0, 0, 3);
        sink.add_field(
            addr + 4,
            vmid,
            "FUNCTION",
            u64::from(function),
            tables::compare_function(function),
            Radix::Dec,
        );

        if bits(w0, 4, 6) == 0 {
            // Register space: the low 18 bits of word 1 are the register
            // dword offset, the rest is reserved.
            let reg = bits(w1, 0, 18);
            let name = self
                .asic
                .regs
                .name_for(reg)
                .unwrap_or_else(|| format!("reg_0x{reg:04x}"));
            sink.add_field(addr + 8, vmid, "REGISTER", u64::from(reg), Some(&name), Radix::Hex);
        } else {
            sink.add_field(addr + 8, vmid, "ADDR_LO", u64::from(w1), None, Radix::Hex);
            sink.add_field(addr + 12, vmid, "ADDR_HI", u64::from(w2), None, Radix::Hex);
        }
    }

    fn copy_data(&mut self, token: &mut Token, addr: u64, vmid: u32, sink: &mut dyn Sink) {
        let Some(&w0) = token.words.first() else {
            token.invalid = true;
            return;
        };
        // When either side is a register, give its symbolic name too.
        if bits(w0, 0, 4) == 0 {
            if let Some(&src) = token.words.get(1) {
                if let Some(name) = self.asic.regs.name_for(src) {
                    sink.add_field(addr + 8, vmid, "SRC_REG", u64::from(src), Some(&name), Radix::Hex);
                }
            }
        }
        if bits(w0, 8, 12) == 0 {
            if let Some(&dst) = token.words.get(3) {
                if let Some(name) = self.asic.regs.name_for(dst) {
                    sink.add_field(addr + 16, vmid, "DST_REG", u64::from(dst), Some(&name), Radix::Hex);
                }
            }
        }
    }

    fn follow(&mut self, token: &mut Token, token_addr: u64, params: &DecodeParams, sink: &mut dyn Sink) {
        let Some(target) = ib_target(token, params.vmid) else {
            return;
        };

        if token.ib.is_none() {
            // Not prefetched at build time; resolve it now.
            let Some(mem) = self.asic.mem else {
                return;
            };
            let Some(words) = fetch_words(mem, target.vmid, target.addr, target.size_words) else {
                return;
            };
            match build_stream(&words, target.vmid, Some(mem)) {
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

fn shader_unit(stem: &str) -> String {
    if stem.starts_with("COMPUTE") {
        "COMPUTE".to_owned()
    } else {
        stem.rsplit('_').next().unwrap_or(stem).to_owned()
    }
}

trait StripStem {
    fn strip_suffix_stem(&self, suffix: &str) -> Option<String>;
}

impl StripStem for str {
    /// `SPI_SHADER_PGM_LO_PS` -> stem `SPI_SHADER_PS` for suffix `_PGM_LO`;
    /// the unit part may trail the suffix.
    fn strip_suffix_stem(&self, suffix: &str) -> Option<String> {
        let pos = self.find(suffix)?;
        let (head, tail) = self.split_at(pos);
        let tail = &tail[suffix.len()..];
        Some(format!("{head}{tail}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_stripping() {
        assert_eq!(
            "SPI_SHADER_PGM_LO_PS".strip_suffix_stem("_PGM_LO").unwrap(),
            "SPI_SHADER_PS"
        );
        assert_eq!(
            "COMPUTE_PGM_HI".strip_suffix_stem("_PGM_HI").unwrap(),
            "COMPUTE"
        );
        assert!("SPI_SHADER_PGM_RSRC1_PS".strip_suffix_stem("_PGM_LO").is_none());
    }

    #[test]
    fn shader_units() {
        assert_eq!(shader_unit("SPI_SHADER_PS"), "PS");
        assert_eq!(shader_unit("SPI_SHADER_GS"), "GS");
        assert_eq!(shader_unit("COMPUTE"), "COMPUTE");
    }

    #[test]
    fn ib_target_vmid_inheritance() {
        let mut token = Token::new(PacketType::Type3, 0x3F, 0, 0);
        token.words = vec![0x1000, 0, 4];
        let t = ib_target(&token, 7).unwrap();
        assert_eq!(t.vmid, 7);
        assert_eq!(t.addr, 0x1000);
        assert_eq!(t.size_words, 4);

        token.words[2] = 4 | (2 << 24);
        assert_eq!(ib_target(&token, 7).unwrap().vmid, 2);

        token.words[2] = 0;
        assert!(ib_target(&token, 7).is_none());
    }

    #[test]
    fn cond_ib_target_is_the_primary_pair() {
        let mut token = Token::new(PacketType::Type3, 0x3E, 0, 0);
        token.words = vec![1, 0x2000, 0, 0, 0, 0, 0, 0x4000, 0, 2, 0x8000, 0, 5];
        let t = ib_target(&token, 3).unwrap();
        assert_eq!(t.addr, 0x4000);
        assert_eq!(t.size_words, 2);
        // No VMID field in the conditional form; the stream's own applies.
        assert_eq!(t.vmid, 3);
    }
}
