//! Collaborator interfaces the decoders consume.
//!
//! The register database, hardware discovery and actual memory I/O live
//! outside this workspace; the decoders see them only through these traits.
//! All calls are opaque and synchronous; a host wanting concurrency runs
//! independent decodes on independent collaborator instances.

use thiserror::Error;
use tracing::warn;

use crate::version::VersionContext;

/// A VM memory read failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("vm read of {len} bytes at 0x{addr:x} (vmid {vmid}) out of range")]
    OutOfRange { vmid: u32, addr: u64, len: usize },
    #[error("vm read failed: {0}")]
    Backend(String),
}

/// Reads guest VM memory on behalf of the decoders.
///
/// `vmid` selects which page-table context `addr` is resolved against.
pub trait VmMemory {
    fn read(&self, vmid: u32, addr: u64, dst: &mut [u8]) -> Result<(), FetchError>;
}

/// Resolves register dword offsets to symbolic names.
pub trait RegisterMap {
    fn name_for(&self, offset: u32) -> Option<String>;
}

/// The collaborator bundle one decode call runs against.
pub struct Asic<'a> {
    pub ver: VersionContext,
    pub regs: &'a dyn RegisterMap,
    /// Absent when the caller cannot (or does not want to) resolve buffer
    /// references; indirect buffers are then left unfollowed.
    pub mem: Option<&'a dyn VmMemory>,
}

impl<'a> Asic<'a> {
    pub fn new(ver: VersionContext, regs: &'a dyn RegisterMap, mem: &'a dyn VmMemory) -> Self {
        Self {
            ver,
            regs,
            mem: Some(mem),
        }
    }

    /// An ASIC view with no memory access; follows are skipped.
    pub fn without_memory(ver: VersionContext, regs: &'a dyn RegisterMap) -> Self {
        Self {
            ver,
            regs,
            mem: None,
        }
    }
}

/// Fetches `nwords` little-endian words from VM memory.
///
/// A failed read is logged and reported as `None`; per the error policy a
/// missing buffer degrades the decode (the reference stays unresolved), it
/// never aborts it.
pub fn fetch_words(mem: &dyn VmMemory, vmid: u32, addr: u64, nwords: u32) -> Option<Vec<u32>> {
    let mut bytes = vec![0u8; nwords as usize * 4];
    match mem.read(vmid, addr, &mut bytes) {
        Ok(()) => Some(bytemuck::pod_collect_to_vec(&bytes)),
        Err(err) => {
            warn!(vmid, addr, nwords, %err, "buffer fetch failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::VecVmMemory;

    #[test]
    fn fetch_words_roundtrip() {
        let mem = VecVmMemory::new(1, 0x1000, &[0x1122_3344, 0xdead_beef]);
        let words = fetch_words(&mem, 1, 0x1000, 2).unwrap();
        assert_eq!(words, vec![0x1122_3344, 0xdead_beef]);
    }

    #[test]
    fn fetch_words_out_of_range_is_none() {
        let mem = VecVmMemory::new(1, 0x1000, &[0; 4]);
        assert!(fetch_words(&mem, 1, 0x1000, 8).is_none());
        // Wrong VMID resolves against nothing.
        assert!(fetch_words(&mem, 2, 0x1000, 1).is_none());
    }
}
