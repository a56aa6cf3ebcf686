//! Per-(opcode, sub-opcode) SDMA field tables.

use ringdec_core::{field, FieldSpec, Radix, VersionContext};

use crate::opcode::{self, SdmaOpcode};

const COPY_LINEAR: &[FieldSpec] = &[
    field("COUNT", 0, 0, 22, Radix::Dec),
    field("SRC_ADDR_LO", 2, 0, 32, Radix::Hex),
    field("SRC_ADDR_HI", 3, 0, 32, Radix::Hex),
    field("DST_ADDR_LO", 4, 0, 32, Radix::Hex),
    field("DST_ADDR_HI", 5, 0, 32, Radix::Hex),
];

/// Linear `WRITE`; the trailing data words are emitted by a decoder hook.
const WRITE_LINEAR: &[FieldSpec] = &[
    field("DST_ADDR_LO", 0, 0, 32, Radix::Hex),
    field("DST_ADDR_HI", 1, 0, 32, Radix::Hex),
    field("COUNT", 2, 0, 20, Radix::Dec),
];

/// The assembled 64-bit base and the follow itself are decoder work.
const INDIRECT: &[FieldSpec] = &[
    field("IB_BASE_LO", 0, 0, 32, Radix::Hex),
    field("IB_BASE_HI", 1, 0, 32, Radix::Hex),
    field("IB_SIZE", 2, 0, 20, Radix::Dec),
    field("CSA_ADDR_LO", 3, 0, 32, Radix::Hex),
    field("CSA_ADDR_HI", 4, 0, 32, Radix::Hex),
];

const FENCE: &[FieldSpec] = &[
    field("ADDR_LO", 0, 0, 32, Radix::Hex),
    field("ADDR_HI", 1, 0, 32, Radix::Hex),
    field("DATA", 2, 0, 32, Radix::Hex),
];

const TRAP: &[FieldSpec] = &[field("TRAP_INT_CONTEXT", 0, 0, 28, Radix::Hex)];

const SEM: &[FieldSpec] = &[
    field("ADDR_LO", 0, 0, 32, Radix::Hex),
    field("ADDR_HI", 1, 0, 32, Radix::Hex),
];

/// `POLL_REGMEM`; the header-resident function bits and the register-or-
/// memory target live in a decoder hook (the target's layout depends on the
/// header's mem-poll bit).
const POLL_REGMEM: &[FieldSpec] = &[
    field("VALUE", 2, 0, 32, Radix::Hex),
    field("MASK", 3, 0, 32, Radix::Hex),
    field("POLL_INTERVAL", 4, 0, 16, Radix::Dec),
    field("RETRY_COUNT", 4, 16, 28, Radix::Dec),
];

const COND_EXE: &[FieldSpec] = &[
    field("ADDR_LO", 0, 0, 32, Radix::Hex),
    field("ADDR_HI", 1, 0, 32, Radix::Hex),
    field("REFERENCE", 2, 0, 32, Radix::Hex),
    field("EXEC_COUNT", 3, 0, 14, Radix::Dec),
];

const ATOMIC: &[FieldSpec] = &[
    field("ADDR_LO", 0, 0, 32, Radix::Hex),
    field("ADDR_HI", 1, 0, 32, Radix::Hex),
    field("SRC_DATA_LO", 2, 0, 32, Radix::Hex),
    field("SRC_DATA_HI", 3, 0, 32, Radix::Hex),
    field("CMP_DATA_LO", 4, 0, 32, Radix::Hex),
    field("CMP_DATA_HI", 5, 0, 32, Radix::Hex),
    field("LOOP_INTERVAL", 6, 0, 13, Radix::Dec),
];

const CONST_FILL: &[FieldSpec] = &[
    field("DST_ADDR_LO", 0, 0, 32, Radix::Hex),
    field("DST_ADDR_HI", 1, 0, 32, Radix::Hex),
    field("DATA", 2, 0, 32, Radix::Hex),
    field("COUNT", 3, 0, 22, Radix::Dec),
];

const TIMESTAMP: &[FieldSpec] = &[
    field("ADDR_LO", 0, 0, 32, Radix::Hex),
    field("ADDR_HI", 1, 0, 32, Radix::Hex),
];

const PRE_EXE: &[FieldSpec] = &[field("EXEC_COUNT", 0, 0, 14, Radix::Dec)];

const GCR_REQ: &[FieldSpec] = &[
    field("GCR_BASE_LO", 0, 7, 32, Radix::Hex),
    field("GCR_BASE_HI", 1, 0, 16, Radix::Hex),
    field("GCR_CONTROL_LO", 1, 16, 32, Radix::Hex),
    field("GCR_CONTROL_HI", 2, 0, 3, Radix::Hex),
    field("GCR_LIMIT_LO", 2, 8, 32, Radix::Hex),
    field("GCR_LIMIT_HI", 3, 0, 16, Radix::Hex),
    field("GCR_VMID", 3, 24, 28, Radix::Dec),
];

/// The field table for `(op, sub)`, or `None` when the packet has no plain
/// bitfield decode (unknown opcodes and the sub-opcode variants the decoder
/// reports through `unhandled`/`unhandled_subop`).
pub fn table_for(op: SdmaOpcode, sub: u32, _ver: &VersionContext) -> Option<&'static [FieldSpec]> {
    match (op, sub) {
        (SdmaOpcode::Nop, _) => Some(&[]),
        (SdmaOpcode::Copy, opcode::COPY_LINEAR) => Some(COPY_LINEAR),
        (SdmaOpcode::Write, opcode::WRITE_LINEAR) => Some(WRITE_LINEAR),
        (SdmaOpcode::Indirect, _) => Some(INDIRECT),
        (SdmaOpcode::Fence, _) => Some(FENCE),
        (SdmaOpcode::Trap, _) => Some(TRAP),
        (SdmaOpcode::Sem, _) => Some(SEM),
        (SdmaOpcode::PollRegmem, _) => Some(POLL_REGMEM),
        (SdmaOpcode::CondExe, _) => Some(COND_EXE),
        (SdmaOpcode::Atomic, _) => Some(ATOMIC),
        (SdmaOpcode::ConstFill, _) => Some(CONST_FILL),
        (SdmaOpcode::Timestamp, _) => Some(TIMESTAMP),
        (SdmaOpcode::SrbmWrite, _) => Some(&[]),
        (SdmaOpcode::PreExe, _) => Some(PRE_EXE),
        (SdmaOpcode::GcrReq, _) => Some(GCR_REQ),
        (SdmaOpcode::Copy | SdmaOpcode::Write, _) => None,
        (SdmaOpcode::Unknown(_), _) => None,
    }
}
