//! Per-opcode field layout tables.
//!
//! Each table lists the plain bitfields of an opcode's payload; version
//! gating is data (`since`/`until` on the entry), not scattered
//! conditionals. Fields that need register lookup, 64-bit assembly or
//! conditional layout are handled by the per-opcode hooks in the decoder.

use ringdec_core::{field, field_since, field_until, FieldSpec, Radix::Dec, Radix::Hex};

use crate::opcode::Pm4Opcode;
use ringdec_core::VersionContext;

pub const CLEAR_STATE: &[FieldSpec] = &[field("CMD", 0, 0, 4, Dec)];

pub const DISPATCH_DIRECT: &[FieldSpec] = &[
    field("DIM_X", 0, 0, 32, Dec),
    field("DIM_Y", 1, 0, 32, Dec),
    field("DIM_Z", 2, 0, 32, Dec),
    field("DISPATCH_INITIATOR", 3, 0, 32, Hex),
];

pub const DISPATCH_INDIRECT: &[FieldSpec] = &[
    field("DATA_OFFSET", 0, 0, 32, Hex),
    field("DISPATCH_INITIATOR", 1, 0, 32, Hex),
];

pub const ATOMIC_MEM: &[FieldSpec] = &[
    field("ATOMIC", 0, 0, 7, Dec),
    field("COMMAND", 0, 8, 12, Dec),
    field_since("CACHE_POLICY", 0, 25, 27, Dec, 9, 0),
    field("ADDR_LO", 1, 0, 32, Hex),
    field("ADDR_HI", 2, 0, 32, Hex),
    field("SRC_DATA_LO", 3, 0, 32, Hex),
    field("SRC_DATA_HI", 4, 0, 32, Hex),
    field("CMP_DATA_LO", 5, 0, 32, Hex),
    field("CMP_DATA_HI", 6, 0, 32, Hex),
    field("LOOP_INTERVAL", 7, 0, 13, Dec),
];

pub const SET_PREDICATION: &[FieldSpec] = &[
    field("START_ADDR_LO", 0, 4, 32, Hex),
    field("START_ADDR_HI", 1, 0, 8, Hex),
    field("PRED_BOOL", 1, 8, 9, Dec),
    field("HINT", 1, 12, 13, Dec),
    field("PRED_OP", 1, 16, 19, Dec),
    field("CONTINUE_BIT", 1, 31, 32, Dec),
];

pub const COND_EXEC: &[FieldSpec] = &[
    field("BOOL_ADDR_LO", 0, 2, 32, Hex),
    field("BOOL_ADDR_HI", 1, 0, 32, Hex),
    field("EXEC_COUNT", 3, 0, 14, Dec),
];

pub const DRAW_INDIRECT: &[FieldSpec] = &[
    field("DATA_OFFSET", 0, 0, 32, Hex),
    field("START_VTX_LOC", 1, 0, 16, Dec),
    field("START_INST_LOC", 2, 0, 16, Dec),
    field("DRAW_INITIATOR", 3, 0, 32, Hex),
];

pub const DRAW_INDEX_INDIRECT: &[FieldSpec] = &[
    field("DATA_OFFSET", 0, 0, 32, Hex),
    field("BASE_VTX_LOC", 1, 0, 16, Dec),
    field("START_INST_LOC", 2, 0, 16, Dec),
    field("DRAW_INITIATOR", 3, 0, 32, Hex),
];

pub const INDEX_BASE: &[FieldSpec] = &[
    field("INDEX_BASE_LO", 0, 1, 32, Hex),
    field("INDEX_BASE_HI", 1, 0, 32, Hex),
];

pub const DRAW_INDEX_2: &[FieldSpec] = &[
    field("MAX_SIZE", 0, 0, 32, Dec),
    field("INDEX_BASE_LO", 1, 0, 32, Hex),
    field("INDEX_BASE_HI", 2, 0, 32, Hex),
    field("NUM_INDICES", 3, 0, 32, Dec),
    field("DRAW_INITIATOR", 4, 0, 32, Hex),
];

pub const CONTEXT_CONTROL: &[FieldSpec] = &[
    field("LOAD_CONTROL", 0, 0, 32, Hex),
    field("SHADOW_CONTROL", 1, 0, 32, Hex),
];

pub const INDEX_TYPE: &[FieldSpec] = &[field("INDEX_TYPE", 0, 0, 2, Dec)];

pub const DRAW_INDIRECT_MULTI: &[FieldSpec] = &[
    field("DATA_OFFSET", 0, 0, 32, Hex),
    field("START_VTX_LOC", 1, 0, 16, Dec),
    field("START_INST_LOC", 2, 0, 16, Dec),
    field("DRAW_INDEX_LOC", 3, 0, 16, Dec),
    field("COUNT_INDIRECT_ENABLE", 3, 30, 31, Dec),
    field("DRAW_INDEX_ENABLE", 3, 31, 32, Dec),
    field("COUNT", 4, 0, 32, Dec),
    field("COUNT_ADDR_LO", 5, 2, 32, Hex),
    field("COUNT_ADDR_HI", 6, 0, 32, Hex),
    field("STRIDE", 7, 0, 32, Dec),
];

pub const DRAW_INDEX_AUTO: &[FieldSpec] = &[
    field("NUM_INDICES", 0, 0, 32, Dec),
    field("DRAW_INITIATOR", 1, 0, 32, Hex),
];

pub const NUM_INSTANCES: &[FieldSpec] = &[field("NUM_INSTANCES", 0, 0, 32, Dec)];

/// Shared by `INDIRECT_BUFFER` and `INDIRECT_BUFFER_CONST`. The decoder
/// additionally assembles the 64-bit base and, on request, follows it.
pub const INDIRECT_BUFFER: &[FieldSpec] = &[
    field("IB_BASE_LO", 0, 2, 32, Hex),
    field("IB_BASE_HI", 1, 0, 32, Hex),
    field("IB_SIZE", 2, 0, 20, Dec),
    field("CHAIN", 2, 20, 21, Dec),
    field("VALID", 2, 23, 24, Dec),
    field("VMID", 2, 24, 28, Dec),
    field_since("CACHE_POLICY", 2, 28, 30, Dec, 9, 0),
];

/// Two targets plus the condition that picks between them at execution
/// time. The decoder assembles and follows the primary (word 7) target;
/// which one the hardware would take depends on runtime memory contents.
pub const COND_INDIRECT_BUFFER: &[FieldSpec] = &[
    field("MODE", 0, 0, 2, Dec),
    field("FUNCTION", 0, 8, 11, Dec),
    field("COMPARE_ADDR_LO", 1, 3, 32, Hex),
    field("COMPARE_ADDR_HI", 2, 0, 32, Hex),
    field("MASK_LO", 3, 0, 32, Hex),
    field("MASK_HI", 4, 0, 32, Hex),
    field("REFERENCE_LO", 5, 0, 32, Hex),
    field("REFERENCE_HI", 6, 0, 32, Hex),
    field("IB_BASE1_LO", 7, 2, 32, Hex),
    field("IB_BASE1_HI", 8, 0, 32, Hex),
    field("IB_SIZE1", 9, 0, 20, Dec),
    field_since("CACHE_POLICY1", 9, 28, 30, Dec, 9, 0),
    field("IB_BASE2_LO", 10, 2, 32, Hex),
    field("IB_BASE2_HI", 11, 0, 32, Hex),
    field("IB_SIZE2", 12, 0, 20, Dec),
    field_since("CACHE_POLICY2", 12, 28, 30, Dec, 9, 0),
];

/// `DST_SEL` and the trailing data words are conditional on each other and
/// emitted by the opcode hook.
pub const WRITE_DATA: &[FieldSpec] = &[
    field("WR_ONE_ADDR", 0, 16, 17, Dec),
    field("WR_CONFIRM", 0, 20, 21, Dec),
    field("ENGINE_SEL", 0, 30, 32, Dec),
    field("DST_ADDR_LO", 1, 0, 32, Hex),
    field("DST_ADDR_HI", 2, 0, 32, Hex),
];

/// `FUNCTION` (labeled) and the register-vs-memory poll target are emitted
/// by the opcode hook; words 1 and 2 mean different things per `MEM_SPACE`.
pub const WAIT_REG_MEM: &[FieldSpec] = &[
    field("MEM_SPACE", 0, 4, 6, Dec),
    field("OPERATION", 0, 6, 8, Dec),
    field("ENGINE", 0, 8, 10, Dec),
    field("REFERENCE", 3, 0, 32, Hex),
    field("MASK", 4, 0, 32, Hex),
    field("POLL_INTERVAL", 5, 0, 16, Dec),
];

pub const COPY_DATA: &[FieldSpec] = &[
    field("SRC_SEL", 0, 0, 4, Dec),
    field("DST_SEL", 0, 8, 12, Dec),
    field("COUNT_SEL", 0, 16, 17, Dec),
    field("WR_CONFIRM", 0, 20, 21, Dec),
    field("ENGINE_SEL", 0, 30, 32, Dec),
    field("SRC_ADDR_LO", 1, 0, 32, Hex),
    field("SRC_ADDR_HI", 2, 0, 32, Hex),
    field("DST_ADDR_LO", 3, 0, 32, Hex),
    field("DST_ADDR_HI", 4, 0, 32, Hex),
];

pub const PFP_SYNC_ME: &[FieldSpec] = &[field("DUMMY", 0, 0, 32, Hex)];

/// gfx8/gfx9 only; the opcode itself is gone at gfx10+.
pub const SURFACE_SYNC: &[FieldSpec] = &[
    field("ENGINE", 0, 31, 32, Dec),
    field("COHER_CNTL", 0, 0, 29, Hex),
    field("COHER_SIZE", 1, 0, 32, Hex),
    field("COHER_BASE", 2, 0, 32, Hex),
    field("POLL_INTERVAL", 3, 0, 16, Dec),
];

pub const EVENT_WRITE: &[FieldSpec] = &[
    field("EVENT_TYPE", 0, 0, 6, Dec),
    field("EVENT_INDEX", 0, 8, 12, Dec),
];

/// gfx8/gfx9 only; superseded by `RELEASE_MEM` at gfx10+.
pub const EVENT_WRITE_EOP: &[FieldSpec] = &[
    field("EVENT_TYPE", 0, 0, 6, Dec),
    field("EVENT_INDEX", 0, 8, 12, Dec),
    field("ADDR_LO", 1, 2, 32, Hex),
    field("ADDR_HI", 2, 0, 16, Hex),
    field("INT_SEL", 2, 24, 26, Dec),
    field("DATA_SEL", 2, 29, 32, Dec),
    field("DATA_LO", 3, 0, 32, Hex),
    field("DATA_HI", 4, 0, 32, Hex),
];

/// The cache-control bits of word 0 were re-purposed as the coherent
/// `GCR_CNTL` bundle at gfx10; the gfx9 names must not leak into newer
/// decodes (and vice versa).
pub const RELEASE_MEM: &[FieldSpec] = &[
    field("EVENT_TYPE", 0, 0, 6, Dec),
    field("EVENT_INDEX", 0, 8, 12, Dec),
    field_until("TCL1_VOL_ACTION_ENA", 0, 12, 13, Dec, 10, 0),
    field_until("TC_WB_ACTION_ENA", 0, 15, 16, Dec, 10, 0),
    field_until("TCL1_ACTION_ENA", 0, 16, 17, Dec, 10, 0),
    field_until("TC_ACTION_ENA", 0, 17, 18, Dec, 10, 0),
    field_until("TC_NC_ACTION_ENA", 0, 19, 20, Dec, 10, 0),
    field_until("TC_WC_ACTION_ENA", 0, 20, 21, Dec, 10, 0),
    field_until("TC_MD_ACTION_ENA", 0, 21, 22, Dec, 10, 0),
    field_since("GCR_CNTL", 0, 12, 25, Hex, 10, 0),
    field("DST_SEL", 1, 16, 18, Dec),
    field("INT_SEL", 1, 24, 27, Dec),
    field("DATA_SEL", 1, 29, 32, Dec),
    field("ADDR_LO", 2, 0, 32, Hex),
    field("ADDR_HI", 3, 0, 32, Hex),
    field("DATA_LO", 4, 0, 32, Hex),
    field("DATA_HI", 5, 0, 32, Hex),
    field("INT_CTXID", 6, 0, 32, Hex),
];

pub const DMA_DATA: &[FieldSpec] = &[
    field("ENGINE", 0, 0, 1, Dec),
    field_since("SRC_CACHE_POLICY", 0, 13, 15, Dec, 9, 0),
    field("DST_SEL", 0, 20, 22, Dec),
    field_since("DST_CACHE_POLICY", 0, 25, 27, Dec, 9, 0),
    field("SRC_SEL", 0, 29, 31, Dec),
    field("CP_SYNC", 0, 31, 32, Dec),
    field("SRC_ADDR_LO", 1, 0, 32, Hex),
    field("SRC_ADDR_HI", 2, 0, 32, Hex),
    field("DST_ADDR_LO", 3, 0, 32, Hex),
    field("DST_ADDR_HI", 4, 0, 32, Hex),
    field("BYTE_COUNT", 5, 0, 26, Dec),
    field("SAS", 5, 26, 27, Dec),
    field("DAS", 5, 27, 28, Dec),
    field("SAIC", 5, 28, 29, Dec),
    field("DAIC", 5, 29, 30, Dec),
    field("RAW_WAIT", 5, 30, 31, Dec),
    field("DIS_WC", 5, 31, 32, Dec),
];

/// The trailing `GCR_CNTL` word exists only at gfx10+ (the packet itself is
/// one word longer there).
pub const ACQUIRE_MEM: &[FieldSpec] = &[
    field_until("COHER_CNTL", 0, 0, 31, Hex, 10, 0),
    field("COHER_SIZE", 1, 0, 32, Hex),
    field("COHER_SIZE_HI", 2, 0, 8, Hex),
    field("COHER_BASE_LO", 3, 0, 32, Hex),
    field("COHER_BASE_HI", 4, 0, 24, Hex),
    field("POLL_INTERVAL", 5, 0, 16, Dec),
    field_since("GCR_CNTL", 6, 0, 19, Hex, 10, 0),
];

pub const REWIND: &[FieldSpec] = &[
    field("OFFLOAD_ENABLE", 0, 0, 1, Dec),
    field("VALID", 0, 31, 32, Dec),
];

pub const LOAD_UCONFIG_REG: &[FieldSpec] = &[
    field("BASE_ADDR_LO", 0, 2, 32, Hex),
    field("BASE_ADDR_HI", 1, 0, 32, Hex),
    field("REG_OFFSET", 2, 0, 16, Hex),
    field("NUM_DWORDS", 3, 0, 14, Dec),
];

pub const SET_SH_REG_OFFSET: &[FieldSpec] = &[
    field("REG_OFFSET", 0, 0, 16, Hex),
    field("INDEX", 0, 28, 30, Dec),
    field("CALCULATED_LO", 1, 0, 32, Hex),
    field("CALCULATED_HI", 2, 0, 16, Hex),
];

pub const SWITCH_BUFFER: &[FieldSpec] = &[field("DUMMY", 0, 0, 32, Hex)];

pub const FRAME_CONTROL: &[FieldSpec] = &[
    field("TMZ", 0, 0, 1, Dec),
    field("COMMAND", 0, 28, 32, Dec),
];

/// The plain-bitfield table for an opcode, or `None` when the opcode has no
/// table for the resolved generation (routed to `unhandled`).
///
/// `SURFACE_SYNC` and `EVENT_WRITE_EOP` exist only below gfx10; decoding a
/// newer-generation capture must not pretend otherwise.
pub fn table_for(op: Pm4Opcode, ver: &VersionContext) -> Option<&'static [FieldSpec]> {
    let table: &'static [FieldSpec] = match op {
        Pm4Opcode::Nop => &[],
        Pm4Opcode::ClearState => CLEAR_STATE,
        Pm4Opcode::DispatchDirect => DISPATCH_DIRECT,
        Pm4Opcode::DispatchIndirect => DISPATCH_INDIRECT,
        Pm4Opcode::AtomicMem => ATOMIC_MEM,
        Pm4Opcode::SetPredication => SET_PREDICATION,
        Pm4Opcode::CondExec => COND_EXEC,
        Pm4Opcode::DrawIndirect => DRAW_INDIRECT,
        Pm4Opcode::DrawIndexIndirect => DRAW_INDEX_INDIRECT,
        Pm4Opcode::IndexBase => INDEX_BASE,
        Pm4Opcode::DrawIndex2 => DRAW_INDEX_2,
        Pm4Opcode::ContextControl => CONTEXT_CONTROL,
        Pm4Opcode::IndexType => INDEX_TYPE,
        Pm4Opcode::DrawIndirectMulti => DRAW_INDIRECT_MULTI,
        Pm4Opcode::DrawIndexAuto => DRAW_INDEX_AUTO,
        Pm4Opcode::NumInstances => NUM_INSTANCES,
        Pm4Opcode::IndirectBuffer | Pm4Opcode::IndirectBufferConst => INDIRECT_BUFFER,
        Pm4Opcode::WriteData => WRITE_DATA,
        Pm4Opcode::WaitRegMem => WAIT_REG_MEM,
        Pm4Opcode::CondIndirectBuffer => COND_INDIRECT_BUFFER,
        Pm4Opcode::CopyData => COPY_DATA,
        Pm4Opcode::PfpSyncMe => PFP_SYNC_ME,
        Pm4Opcode::SurfaceSync => {
            if ver.at_least(10, 0) {
                return None;
            }
            SURFACE_SYNC
        }
        Pm4Opcode::EventWrite => EVENT_WRITE,
        Pm4Opcode::EventWriteEop => {
            if ver.at_least(10, 0) {
                return None;
            }
            EVENT_WRITE_EOP
        }
        Pm4Opcode::ReleaseMem => RELEASE_MEM,
        Pm4Opcode::DmaData => DMA_DATA,
        Pm4Opcode::AcquireMem => ACQUIRE_MEM,
        Pm4Opcode::Rewind => REWIND,
        Pm4Opcode::LoadUconfigReg => LOAD_UCONFIG_REG,
        Pm4Opcode::SetConfigReg
        | Pm4Opcode::SetContextReg
        | Pm4Opcode::SetShReg
        | Pm4Opcode::SetUconfigReg => &[],
        Pm4Opcode::SetShRegOffset => SET_SH_REG_OFFSET,
        Pm4Opcode::SwitchBuffer => SWITCH_BUFFER,
        Pm4Opcode::FrameControl => FRAME_CONTROL,
        Pm4Opcode::Unknown(_) => return None,
    };
    Some(table)
}

/// Label for `WRITE_DATA.DST_SEL` values; value 6 gained a meaning at gfx9.
pub fn write_data_dst_sel(value: u32, ver: &VersionContext) -> Option<&'static str> {
    match value {
        0 => Some("mem-mapped register"),
        1 => Some("memory (sync)"),
        2 => Some("tc/l2"),
        3 => Some("gds"),
        5 => Some("memory (async)"),
        6 if ver.at_least(9, 0) => Some("preemption meta memory"),
        _ => None,
    }
}

/// Label for `WAIT_REG_MEM.FUNCTION`; the encoding is shared with the DMA
/// engines' poll packets.
pub use ringdec_core::compare_function;
