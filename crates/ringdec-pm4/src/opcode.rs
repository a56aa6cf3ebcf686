//! PM4 type-3 opcode numbers.

/// A PM4 type-3 opcode.
///
/// The numbers are the hardware ABI and stable across the supported
/// generations; which *fields* an opcode carries is version-dependent and
/// lives in the tables module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pm4Opcode {
    Nop,
    ClearState,
    DispatchDirect,
    DispatchIndirect,
    AtomicMem,
    SetPredication,
    CondExec,
    DrawIndirect,
    DrawIndexIndirect,
    IndexBase,
    DrawIndex2,
    ContextControl,
    IndexType,
    DrawIndirectMulti,
    DrawIndexAuto,
    NumInstances,
    IndirectBufferConst,
    WriteData,
    WaitRegMem,
    CondIndirectBuffer,
    IndirectBuffer,
    CopyData,
    PfpSyncMe,
    SurfaceSync,
    EventWrite,
    EventWriteEop,
    ReleaseMem,
    DmaData,
    AcquireMem,
    Rewind,
    LoadUconfigReg,
    SetConfigReg,
    SetContextReg,
    SetShReg,
    SetShRegOffset,
    SetUconfigReg,
    SwitchBuffer,
    FrameControl,
    Unknown(u32),
}

impl Pm4Opcode {
    pub fn from_raw(op: u32) -> Self {
        match op {
            0x10 => Self::Nop,
            0x12 => Self::ClearState,
            0x15 => Self::DispatchDirect,
            0x16 => Self::DispatchIndirect,
            0x1E => Self::AtomicMem,
            0x20 => Self::SetPredication,
            0x22 => Self::CondExec,
            0x24 => Self::DrawIndirect,
            0x25 => Self::DrawIndexIndirect,
            0x26 => Self::IndexBase,
            0x27 => Self::DrawIndex2,
            0x28 => Self::ContextControl,
            0x2A => Self::IndexType,
            0x2C => Self::DrawIndirectMulti,
            0x2D => Self::DrawIndexAuto,
            0x2F => Self::NumInstances,
            0x33 => Self::IndirectBufferConst,
            0x37 => Self::WriteData,
            0x3C => Self::WaitRegMem,
            0x3E => Self::CondIndirectBuffer,
            0x3F => Self::IndirectBuffer,
            0x40 => Self::CopyData,
            0x42 => Self::PfpSyncMe,
            0x43 => Self::SurfaceSync,
            0x46 => Self::EventWrite,
            0x47 => Self::EventWriteEop,
            0x49 => Self::ReleaseMem,
            0x50 => Self::DmaData,
            0x58 => Self::AcquireMem,
            0x59 => Self::Rewind,
            0x5E => Self::LoadUconfigReg,
            0x68 => Self::SetConfigReg,
            0x69 => Self::SetContextReg,
            0x76 => Self::SetShReg,
            0x77 => Self::SetShRegOffset,
            0x79 => Self::SetUconfigReg,
            0x8B => Self::SwitchBuffer,
            0x90 => Self::FrameControl,
            other => Self::Unknown(other),
        }
    }

    #[deny(unreachable_patterns)]
    pub fn raw(&self) -> u32 {
        match self {
            Self::Nop => 0x10,
            Self::ClearState => 0x12,
            Self::DispatchDirect => 0x15,
            Self::DispatchIndirect => 0x16,
            Self::AtomicMem => 0x1E,
            Self::SetPredication => 0x20,
            Self::CondExec => 0x22,
            Self::DrawIndirect => 0x24,
            Self::DrawIndexIndirect => 0x25,
            Self::IndexBase => 0x26,
            Self::DrawIndex2 => 0x27,
            Self::ContextControl => 0x28,
            Self::IndexType => 0x2A,
            Self::DrawIndirectMulti => 0x2C,
            Self::DrawIndexAuto => 0x2D,
            Self::NumInstances => 0x2F,
            Self::IndirectBufferConst => 0x33,
            Self::WriteData => 0x37,
            Self::WaitRegMem => 0x3C,
            Self::CondIndirectBuffer => 0x3E,
            Self::IndirectBuffer => 0x3F,
            Self::CopyData => 0x40,
            Self::PfpSyncMe => 0x42,
            Self::SurfaceSync => 0x43,
            Self::EventWrite => 0x46,
            Self::EventWriteEop => 0x47,
            Self::ReleaseMem => 0x49,
            Self::DmaData => 0x50,
            Self::AcquireMem => 0x58,
            Self::Rewind => 0x59,
            Self::LoadUconfigReg => 0x5E,
            Self::SetConfigReg => 0x68,
            Self::SetContextReg => 0x69,
            Self::SetShReg => 0x76,
            Self::SetShRegOffset => 0x77,
            Self::SetUconfigReg => 0x79,
            Self::SwitchBuffer => 0x8B,
            Self::FrameControl => 0x90,
            Self::Unknown(raw) => *raw,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::ClearState => "CLEAR_STATE",
            Self::DispatchDirect => "DISPATCH_DIRECT",
            Self::DispatchIndirect => "DISPATCH_INDIRECT",
            Self::AtomicMem => "ATOMIC_MEM",
            Self::SetPredication => "SET_PREDICATION",
            Self::CondExec => "COND_EXEC",
            Self::DrawIndirect => "DRAW_INDIRECT",
            Self::DrawIndexIndirect => "DRAW_INDEX_INDIRECT",
            Self::IndexBase => "INDEX_BASE",
            Self::DrawIndex2 => "DRAW_INDEX_2",
            Self::ContextControl => "CONTEXT_CONTROL",
            Self::IndexType => "INDEX_TYPE",
            Self::DrawIndirectMulti => "DRAW_INDIRECT_MULTI",
            Self::DrawIndexAuto => "DRAW_INDEX_AUTO",
            Self::NumInstances => "NUM_INSTANCES",
            Self::IndirectBufferConst => "INDIRECT_BUFFER_CONST",
            Self::WriteData => "WRITE_DATA",
            Self::WaitRegMem => "WAIT_REG_MEM",
            Self::CondIndirectBuffer => "COND_INDIRECT_BUFFER",
            Self::IndirectBuffer => "INDIRECT_BUFFER",
            Self::CopyData => "COPY_DATA",
            Self::PfpSyncMe => "PFP_SYNC_ME",
            Self::SurfaceSync => "SURFACE_SYNC",
            Self::EventWrite => "EVENT_WRITE",
            Self::EventWriteEop => "EVENT_WRITE_EOP",
            Self::ReleaseMem => "RELEASE_MEM",
            Self::DmaData => "DMA_DATA",
            Self::AcquireMem => "ACQUIRE_MEM",
            Self::Rewind => "REWIND",
            Self::LoadUconfigReg => "LOAD_UCONFIG_REG",
            Self::SetConfigReg => "SET_CONFIG_REG",
            Self::SetContextReg => "SET_CONTEXT_REG",
            Self::SetShReg => "SET_SH_REG",
            Self::SetShRegOffset => "SET_SH_REG_OFFSET",
            Self::SetUconfigReg => "SET_UCONFIG_REG",
            Self::SwitchBuffer => "SWITCH_BUFFER",
            Self::FrameControl => "FRAME_CONTROL",
            Self::Unknown(_) => "UNKNOWN",
        }
    }

    /// Does this opcode carry an indirect-buffer reference?
    pub fn is_ib(&self) -> bool {
        matches!(
            self,
            Self::IndirectBuffer | Self::IndirectBufferConst | Self::CondIndirectBuffer
        )
    }

    /// Register block base dword offset for the register-write opcodes.
    pub fn reg_base(&self) -> Option<u32> {
        match self {
            Self::SetConfigReg => Some(0x2000),
            Self::SetContextReg => Some(0xA000),
            Self::SetShReg => Some(0x2C00),
            Self::SetUconfigReg => Some(0xC000),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        for raw in 0u32..=0xFF {
            let op = Pm4Opcode::from_raw(raw);
            assert_eq!(op.raw(), raw);
        }
    }

    #[test]
    fn reg_bases() {
        assert_eq!(Pm4Opcode::SetShReg.reg_base(), Some(0x2C00));
        assert_eq!(Pm4Opcode::SetUconfigReg.reg_base(), Some(0xC000));
        assert_eq!(Pm4Opcode::Nop.reg_base(), None);
    }
}
