//! Per-opcode VPE field tables.

use ringdec_core::{field, FieldSpec, Radix};

use crate::opcode::VpeOpcode;

const VPE_DESCRIPTOR: &[FieldSpec] = &[
    field("NUM_CONFIG_DESCRIPTOR", 0, 0, 8, Radix::Dec),
    field("CONFIG_ARRAY_ADDR_LO", 1, 0, 32, Radix::Hex),
    field("CONFIG_ARRAY_ADDR_HI", 2, 0, 32, Radix::Hex),
];

const VPE_PLANE_CONFIG: &[FieldSpec] = &[
    field("NUM_SRC_PLANES", 0, 0, 4, Radix::Dec),
    field("NUM_DST_PLANES", 0, 4, 8, Radix::Dec),
    field("PLANE0_ADDR_LO", 1, 0, 32, Radix::Hex),
    field("PLANE0_ADDR_HI", 2, 0, 32, Radix::Hex),
    field("PLANE0_PITCH", 3, 0, 16, Radix::Dec),
    field("PLANE1_ADDR_LO", 4, 0, 32, Radix::Hex),
    field("PLANE1_ADDR_HI", 5, 0, 32, Radix::Hex),
    field("PLANE1_PITCH", 6, 0, 16, Radix::Dec),
];

const VPEP_CONFIG: &[FieldSpec] = &[
    field("CONFIG_DATA_ADDR_LO", 0, 0, 32, Radix::Hex),
    field("CONFIG_DATA_ADDR_HI", 1, 0, 32, Radix::Hex),
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

/// `REGISTER_WRITE`'s symbolic register name comes from a decoder hook.
const REGISTER_WRITE: &[FieldSpec] = &[field("DATA", 1, 0, 32, Radix::Hex)];

/// Same split as the DMA engine: the header-resident function bits and the
/// register-or-memory target live in a decoder hook.
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

const TIMESTAMP: &[FieldSpec] = &[
    field("ADDR_LO", 0, 0, 32, Radix::Hex),
    field("ADDR_HI", 1, 0, 32, Radix::Hex),
];

/// The field table for `op`, or `None` for an unknown opcode.
pub fn table_for(op: VpeOpcode) -> Option<&'static [FieldSpec]> {
    match op {
        VpeOpcode::Nop => Some(&[]),
        VpeOpcode::VpeDescriptor => Some(VPE_DESCRIPTOR),
        VpeOpcode::VpePlaneConfig => Some(VPE_PLANE_CONFIG),
        VpeOpcode::VpepConfig => Some(VPEP_CONFIG),
        VpeOpcode::Indirect => Some(INDIRECT),
        VpeOpcode::Fence => Some(FENCE),
        VpeOpcode::Trap => Some(TRAP),
        VpeOpcode::RegisterWrite => Some(REGISTER_WRITE),
        VpeOpcode::PollRegmem => Some(POLL_REGMEM),
        VpeOpcode::CondExe => Some(COND_EXE),
        VpeOpcode::Timestamp => Some(TIMESTAMP),
        VpeOpcode::Unknown(_) => None,
    }
}
