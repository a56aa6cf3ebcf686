//! Hardware-generation context threaded through every decode.
//!
//! The original tool re-derived "which generation am I" by scanning all
//! discovered IP blocks on every call; here the discovery collaborator
//! computes a [`VersionContext`] once and the decoders only ever consult the
//! immutable value they were handed.

/// Broad chip family, used where a field layout changed with the family
/// rather than with a specific IP revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipFamily {
    Gfx8,
    Gfx9,
    Gfx10,
    /// gfx10.3 parts; distinct from [`ChipFamily::Gfx10`] where layouts differ.
    Gfx103,
    Gfx11,
}

/// An IP block's `(major, minor, revision)` version triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IpTriple {
    pub maj: u32,
    pub min: u32,
    pub rev: u32,
}

impl IpTriple {
    pub const fn new(maj: u32, min: u32, rev: u32) -> Self {
        Self { maj, min, rev }
    }

    /// Returns `true` if this version is at least `maj.min`.
    pub fn at_least(&self, maj: u32, min: u32) -> bool {
        (self.maj, self.min) >= (maj, min)
    }
}

/// The chip family plus the owning IP block's version triple.
///
/// Selects which per-opcode field table and which header bit widths apply.
/// Computed once by the caller's hardware-discovery collaborator; the
/// decoders never mutate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionContext {
    pub chip: ChipFamily,
    pub ip: IpTriple,
}

impl VersionContext {
    pub const fn new(chip: ChipFamily, ip: IpTriple) -> Self {
        Self { chip, ip }
    }

    /// Convenience for table gating: is the owning IP at least `maj.min`?
    pub fn at_least(&self, maj: u32, min: u32) -> bool {
        self.ip.at_least(maj, min)
    }
}
