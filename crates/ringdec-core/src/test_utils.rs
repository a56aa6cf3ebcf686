//! Inert collaborator implementations for tests.

use std::collections::BTreeMap;

use crate::asic::{FetchError, RegisterMap, VmMemory};
use crate::sink::{IbKind, OpcodeEvent, Radix, Sink, VcnRecord};
use crate::stream::{PacketType, ShaderRef, Token};

/// An owned copy of one sink callback, for comparing event sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StartIb {
        addr: u64,
        vmid: u32,
        from_addr: u64,
        from_vmid: u32,
        size_words: u32,
        kind: IbKind,
    },
    Opcode {
        addr: u64,
        vmid: u32,
        pkt_type: PacketType,
        opcode: u32,
        sub_opcode: Option<u32>,
        nwords: u32,
        name: String,
        header: u32,
    },
    Field {
        addr: u64,
        vmid: u32,
        name: String,
        value: u64,
        text: Option<String>,
        radix: Radix,
    },
    Shader {
        addr: u64,
        vmid: u32,
        shader: ShaderRef,
    },
    Vcn {
        addr: u64,
        vmid: u32,
        record: VcnRecord,
    },
    Unhandled {
        addr: u64,
        vmid: u32,
        opcode: u32,
    },
    UnhandledSubop {
        addr: u64,
        vmid: u32,
        opcode: u32,
        sub_opcode: Option<u32>,
    },
    Done,
}

/// A sink that records every callback in order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingSink {
    pub events: Vec<Event>,
}

impl RecordingSink {
    /// Just the `Field` events, as `(name, value)` pairs.
    pub fn fields(&self) -> Vec<(String, u64)> {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                Event::Field { name, value, .. } => Some((name.clone(), *value)),
                _ => None,
            })
            .collect()
    }

    /// Just the `Opcode` events' names.
    pub fn opcode_names(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|ev| match ev {
                Event::Opcode { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Sink for RecordingSink {
    fn start_ib(
        &mut self,
        addr: u64,
        vmid: u32,
        from_addr: u64,
        from_vmid: u32,
        size_words: u32,
        kind: IbKind,
    ) {
        self.events.push(Event::StartIb {
            addr,
            vmid,
            from_addr,
            from_vmid,
            size_words,
            kind,
        });
    }

    fn start_opcode(&mut self, op: &OpcodeEvent<'_>) {
        self.events.push(Event::Opcode {
            addr: op.addr,
            vmid: op.vmid,
            pkt_type: op.pkt_type,
            opcode: op.opcode,
            sub_opcode: op.sub_opcode,
            nwords: op.nwords,
            name: op.name.to_owned(),
            header: op.header,
        });
    }

    fn add_field(
        &mut self,
        addr: u64,
        vmid: u32,
        name: &str,
        value: u64,
        text: Option<&str>,
        radix: Radix,
    ) {
        self.events.push(Event::Field {
            addr,
            vmid,
            name: name.to_owned(),
            value,
            text: text.map(str::to_owned),
            radix,
        });
    }

    fn add_shader(&mut self, addr: u64, vmid: u32, shader: &ShaderRef) {
        self.events.push(Event::Shader {
            addr,
            vmid,
            shader: shader.clone(),
        });
    }

    fn add_vcn(&mut self, addr: u64, vmid: u32, record: &VcnRecord) {
        self.events.push(Event::Vcn {
            addr,
            vmid,
            record: *record,
        });
    }

    fn unhandled(&mut self, addr: u64, vmid: u32, token: &Token) {
        self.events.push(Event::Unhandled {
            addr,
            vmid,
            opcode: token.opcode,
        });
    }

    fn unhandled_subop(&mut self, addr: u64, vmid: u32, token: &Token) {
        self.events.push(Event::UnhandledSubop {
            addr,
            vmid,
            opcode: token.opcode,
            sub_opcode: token.sub_opcode,
        });
    }

    fn done(&mut self) {
        self.events.push(Event::Done);
    }
}

/// Contiguous VM memory stub: one word slice mapped at `(vmid, base)`.
#[derive(Debug, Clone)]
pub struct VecVmMemory {
    vmid: u32,
    base: u64,
    bytes: Vec<u8>,
}

impl VecVmMemory {
    pub fn new(vmid: u32, base: u64, words: &[u32]) -> Self {
        Self {
            vmid,
            base,
            bytes: bytemuck::cast_slice(words).to_vec(),
        }
    }

    pub fn from_bytes(vmid: u32, base: u64, bytes: Vec<u8>) -> Self {
        Self { vmid, base, bytes }
    }
}

impl VmMemory for VecVmMemory {
    fn read(&self, vmid: u32, addr: u64, dst: &mut [u8]) -> Result<(), FetchError> {
        let oob = || FetchError::OutOfRange {
            vmid,
            addr,
            len: dst.len(),
        };
        if vmid != self.vmid {
            return Err(oob());
        }
        let start = addr.checked_sub(self.base).ok_or_else(oob)? as usize;
        let end = start.checked_add(dst.len()).ok_or_else(oob)?;
        let src = self.bytes.get(start..end).ok_or_else(oob)?;
        dst.copy_from_slice(src);
        Ok(())
    }
}

/// A memory stub whose every read fails; for exercising unresolved-reference
/// paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingVmMemory;

impl VmMemory for FailingVmMemory {
    fn read(&self, vmid: u32, addr: u64, dst: &mut [u8]) -> Result<(), FetchError> {
        Err(FetchError::OutOfRange {
            vmid,
            addr,
            len: dst.len(),
        })
    }
}

/// Register map backed by an explicit offset -> name table.
#[derive(Debug, Default, Clone)]
pub struct TableRegisterMap {
    names: BTreeMap<u32, String>,
}

impl TableRegisterMap {
    pub fn new(entries: &[(u32, &str)]) -> Self {
        Self {
            names: entries
                .iter()
                .map(|&(offset, name)| (offset, name.to_owned()))
                .collect(),
        }
    }
}

impl RegisterMap for TableRegisterMap {
    fn name_for(&self, offset: u32) -> Option<String> {
        self.names.get(&offset).cloned()
    }
}

/// A register map that knows no names at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyRegisterMap;

impl RegisterMap for EmptyRegisterMap {
    fn name_for(&self, _offset: u32) -> Option<String> {
        None
    }
}
