//! The decoded token stream.
//!
//! A [`Stream`] is the output of a family's stream builder: an ordered
//! sequence of [`Token`]s, where a token that referenced an indirect buffer
//! may own a nested child stream. The original implementation used manual
//! linked lists with per-node allocation and a recursive free; here the
//! stream is an owned tree (`Vec` of tokens, boxed child streams) so
//! teardown is ordinary drop and every owned buffer is freed exactly once.

/// One of the supported command formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Graphics/compute (PM4).
    Pm4,
    /// DMA engine (SDMA).
    Sdma,
    /// Video decode micro-engine.
    VcnDec,
    /// Video encode micro-engine.
    VcnEnc,
    /// Post-processing engine.
    Vpe,
}

/// Packet-type tag carried in a token.
///
/// PM4-format streams distinguish type-0 (register block write), type-2
/// (filler) and type-3 (typed opcode) packets by the top two header bits.
/// The SDMA/VPE/VCN-encode formats have a single packet shape, tagged
/// [`PacketType::Packet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Type0,
    Type2,
    Type3,
    Packet,
}

impl PacketType {
    /// The raw two-bit type tag for PM4-format packets (`3` for the untyped
    /// engine formats, matching their fixed header encoding).
    pub fn raw(self) -> u8 {
        match self {
            PacketType::Type0 => 0,
            PacketType::Type2 => 2,
            PacketType::Type3 => 3,
            PacketType::Packet => 3,
        }
    }
}

/// A shader program referenced from a command stream.
///
/// Discovered when a register-write opcode writes a `*_PGM_LO`/`*_PGM_HI`
/// pair; `addr` is the assembled 256-byte-aligned program address. This core
/// only records the reference; disassembly is a caller concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderRef {
    pub addr: u64,
    pub vmid: u32,
    /// Pipeline unit the program was bound to (e.g. `"PS"`, `"COMPUTE"`),
    /// derived from the register name.
    pub unit: String,
}

/// One decoded opcode/packet record.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub pkt_type: PacketType,
    pub opcode: u32,
    /// Sub-opcode for the families that have one (SDMA, VPE).
    pub sub_opcode: Option<u32>,
    /// The raw header word.
    pub header: u32,
    /// Word offset of the header within the stream's input slice.
    pub offset: u32,
    /// Owned payload words (exactly the count implied by the header).
    pub words: Vec<u32>,
    /// Nested stream for an indirect buffer this token pointed to, when the
    /// builder was given a fetcher and the reference resolved.
    pub ib: Option<Box<Stream>>,
    /// Shader program reference discovered while decoding this token.
    pub shader: Option<ShaderRef>,
    /// Set when field decode ran past the token's actual payload. Once set,
    /// no further field emission or follow happens for this token.
    pub invalid: bool,
}

impl Token {
    pub fn new(pkt_type: PacketType, opcode: u32, header: u32, offset: u32) -> Self {
        Self {
            pkt_type,
            opcode,
            sub_opcode: None,
            header,
            offset,
            words: Vec::new(),
            ib: None,
            shader: None,
            invalid: false,
        }
    }

    /// Total size of the packet in words, header included.
    pub fn size_words(&self) -> u32 {
        1 + self.words.len() as u32
    }
}

/// An ordered sequence of tokens built from one input slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    pub family: Family,
    /// VMID the originating buffer was read under.
    pub vmid: u32,
    pub tokens: Vec<Token>,
}

impl Stream {
    pub fn new(family: Family, vmid: u32) -> Self {
        Self {
            family,
            vmid,
            tokens: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Total input words covered by the materialized tokens. Trailing input
    /// dropped by truncation is not counted.
    pub fn size_words(&self) -> u32 {
        self.tokens.iter().map(Token::size_words).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_stream_drops_with_parent() {
        let mut inner = Stream::new(Family::Pm4, 1);
        inner.tokens.push(Token::new(PacketType::Type2, 0, 0x8000_0000, 0));

        let mut outer = Stream::new(Family::Pm4, 1);
        let mut tok = Token::new(PacketType::Type3, 0x3F, 0xC002_3F00, 0);
        tok.words = vec![0, 0, 4];
        tok.ib = Some(Box::new(inner));
        outer.tokens.push(tok);

        assert_eq!(outer.size_words(), 4);
        assert_eq!(outer.tokens[0].ib.as_ref().unwrap().len(), 1);
        // `outer` owns the nested stream; dropping it here frees everything.
    }
}
