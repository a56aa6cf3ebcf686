//! The visitor interface decoded events are emitted through.
//!
//! The original implementation handed decoders a struct of function
//! pointers; that becomes a trait here. Concrete sinks (console printer,
//! GUI adapter) live outside this workspace; `test_utils::RecordingSink`
//! is the inert capture used by tests.

use crate::stream::{PacketType, ShaderRef, Token};

/// Preferred display radix for a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    Dec,
    Hex,
}

/// What level of the buffer hierarchy a `start_ib` announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IbKind {
    /// The top-level buffer handed to the decoder.
    Ring,
    /// An indirect buffer reached by following a pointer-bearing token.
    Ib,
}

/// The per-token announcement passed to [`Sink::start_opcode`].
///
/// Borrowed fields are valid only for the duration of the callback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpcodeEvent<'a> {
    /// Address of the packet's header word.
    pub addr: u64,
    pub vmid: u32,
    pub pkt_type: PacketType,
    pub opcode: u32,
    pub sub_opcode: Option<u32>,
    /// Total packet size in words, header included.
    pub nwords: u32,
    /// Mnemonic for the opcode (`"NOP"`, `"COPY"`, ...).
    pub name: &'a str,
    /// The raw header word.
    pub header: u32,
    /// The raw payload words.
    pub words: &'a [u32],
}

/// One `(size, type)` tagged sub-record of a video-codec message buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcnRecord {
    /// Byte offset of the record within the message buffer.
    pub offset: u32,
    /// Declared record size in bytes, tag included.
    pub size: u32,
    /// Record type tag.
    pub kind: u32,
}

/// Decode behavior and addressing for one `decode_stream` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeParams {
    /// Address of the stream's first token, for display.
    pub addr: u64,
    pub vmid: u32,
    /// Address/VMID of whatever pointed at this stream, or zero at top level.
    pub from_addr: u64,
    pub from_vmid: u32,
    /// Follow indirect-buffer references into nested decodes.
    pub follow: bool,
    /// Cooperative decode budget; `None` is unbounded.
    pub max_opcodes: Option<usize>,
    /// Token index to resume from (the continuation returned by a previous
    /// bounded call).
    pub start: usize,
    pub kind: IbKind,
}

impl DecodeParams {
    /// Top-level ring decode at `addr`/`vmid`, unbounded, with follow on.
    pub fn ring(addr: u64, vmid: u32) -> Self {
        Self {
            addr,
            vmid,
            from_addr: 0,
            from_vmid: 0,
            follow: true,
            max_opcodes: None,
            start: 0,
            kind: IbKind::Ring,
        }
    }

    pub fn with_follow(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_budget(mut self, max_opcodes: usize) -> Self {
        self.max_opcodes = Some(max_opcodes);
        self
    }

    pub fn resumed_at(mut self, start: usize) -> Self {
        self.start = start;
        self
    }
}

/// Receiver for decoded events.
///
/// Per decoded stream the call sequence is: one `start_ib`, then per token
/// one `start_opcode` followed by zero or more `add_field` (and optionally
/// `add_shader`/`add_vcn`), then one `done`. The sink never takes ownership
/// of anything passed to it.
pub trait Sink {
    fn start_ib(
        &mut self,
        addr: u64,
        vmid: u32,
        from_addr: u64,
        from_vmid: u32,
        size_words: u32,
        kind: IbKind,
    );

    fn start_opcode(&mut self, op: &OpcodeEvent<'_>);

    fn add_field(
        &mut self,
        addr: u64,
        vmid: u32,
        name: &str,
        value: u64,
        text: Option<&str>,
        radix: Radix,
    );

    fn add_shader(&mut self, addr: u64, vmid: u32, shader: &ShaderRef);

    fn add_vcn(&mut self, addr: u64, vmid: u32, record: &VcnRecord);

    /// An opcode the decoder has no table for. Not an error.
    fn unhandled(&mut self, _addr: u64, _vmid: u32, _token: &Token) {}

    /// A known opcode with an unrecognized sub-opcode. Not an error.
    fn unhandled_subop(&mut self, _addr: u64, _vmid: u32, _token: &Token) {}

    fn done(&mut self);
}
