//! Shared data model for the GPU command-stream decoders.
//!
//! This crate holds everything the per-engine crates (`ringdec-pm4`,
//! `ringdec-sdma`, `ringdec-vcn`, `ringdec-vpe`) have in common:
//!
//! - The [`Token`]/[`Stream`] owned tree produced by the stream builders.
//! - The [`Sink`] visitor interface that decoded events are emitted through.
//! - Collaborator traits for the pieces this core deliberately does *not*
//!   implement: VM memory reads ([`VmMemory`]) and register-name resolution
//!   ([`RegisterMap`]).
//! - The [`VersionContext`] that selects which per-generation field layout
//!   applies, and the declarative [`FieldSpec`] tables it gates.
//!
//! Input buffers are treated as **untrusted**: nothing in this workspace
//! reads past a slice end or panics on malformed data.

#![forbid(unsafe_code)]

mod asic;
mod fields;
mod sink;
mod stream;
mod version;

/// Recording sink and vec-backed collaborator stubs for tests.
///
/// Only available when compiling this crate's own tests or with the
/// `test-utils` feature enabled; not part of the stable API.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::asic::{fetch_words, Asic, FetchError, RegisterMap, VmMemory};
pub use crate::fields::{
    bits, compare_function, emit_fields, field, field_since, field_until, pair64, EmitOverrun,
    FieldSpec,
};
pub use crate::sink::{DecodeParams, IbKind, OpcodeEvent, Radix, Sink, VcnRecord};
pub use crate::stream::{Family, PacketType, ShaderRef, Stream, Token};
pub use crate::version::{ChipFamily, IpTriple, VersionContext};
