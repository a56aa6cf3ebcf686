//! VPE opcode numbers.

/// A VPE packet opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VpeOpcode {
    Nop,
    VpeDescriptor,
    VpePlaneConfig,
    VpepConfig,
    Indirect,
    Fence,
    Trap,
    RegisterWrite,
    PollRegmem,
    CondExe,
    Timestamp,
    Unknown(u32),
}

impl VpeOpcode {
    pub fn from_raw(op: u32) -> Self {
        match op {
            0 => Self::Nop,
            1 => Self::VpeDescriptor,
            2 => Self::VpePlaneConfig,
            3 => Self::VpepConfig,
            4 => Self::Indirect,
            5 => Self::Fence,
            6 => Self::Trap,
            7 => Self::RegisterWrite,
            8 => Self::PollRegmem,
            9 => Self::CondExe,
            13 => Self::Timestamp,
            other => Self::Unknown(other),
        }
    }

    #[deny(unreachable_patterns)]
    pub fn raw(&self) -> u32 {
        match self {
            Self::Nop => 0,
            Self::VpeDescriptor => 1,
            Self::VpePlaneConfig => 2,
            Self::VpepConfig => 3,
            Self::Indirect => 4,
            Self::Fence => 5,
            Self::Trap => 6,
            Self::RegisterWrite => 7,
            Self::PollRegmem => 8,
            Self::CondExe => 9,
            Self::Timestamp => 13,
            Self::Unknown(raw) => *raw,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::VpeDescriptor => "VPE_DESCRIPTOR",
            Self::VpePlaneConfig => "VPE_PLANE_CONFIG",
            Self::VpepConfig => "VPEP_CONFIG",
            Self::Indirect => "INDIRECT",
            Self::Fence => "FENCE",
            Self::Trap => "TRAP",
            Self::RegisterWrite => "REGISTER_WRITE",
            Self::PollRegmem => "POLL_REGMEM",
            Self::CondExe => "COND_EXE",
            Self::Timestamp => "TIMESTAMP",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}
