//! GPU command-buffer decoding, all engine families under one entry point.
//!
//! Raw ring or indirect-buffer contents go in as `&[u32]`; decoded events
//! come out through a caller-supplied [`Sink`]. Five command formats are
//! understood: graphics/compute ([`pm4`]), the DMA engine ([`sdma`]), video
//! decode and encode ([`vcn`]), and the post-processing engine ([`vpe`]).
//!
//! ```no_run
//! use ringdec::{decode_ring, Asic, DecodeParams, Family};
//! # fn demo(words: &[u32], asic: &Asic<'_>, sink: &mut dyn ringdec::Sink) {
//! let params = DecodeParams::ring(0x1000, 0);
//! decode_ring(Family::Pm4, words, asic, &params, sink);
//! # }
//! ```
//!
//! The per-family crates stay usable on their own; this crate only adds the
//! family dispatch and re-exports the shared data model.

#![forbid(unsafe_code)]

pub use ringdec_core::{
    fetch_words, Asic, ChipFamily, DecodeParams, Family, FetchError, IbKind, IpTriple,
    OpcodeEvent, PacketType, Radix, RegisterMap, ShaderRef, Sink, Stream, Token, VcnRecord,
    VersionContext, VmMemory,
};

pub use ringdec_pm4 as pm4;
pub use ringdec_sdma as sdma;
pub use ringdec_vcn as vcn;
pub use ringdec_vpe as vpe;

/// Builds a token stream from raw words in `family`'s format.
///
/// Indirect-buffer references are prefetched through `asic.mem` when it is
/// present. Returns `None` when no token could be materialized.
pub fn build_stream(
    family: Family,
    words: &[u32],
    vmid: u32,
    asic: &Asic<'_>,
) -> Option<Stream> {
    match family {
        Family::Pm4 => pm4::build_stream(words, vmid, asic.mem),
        Family::Sdma => sdma::build_stream(words, vmid, &asic.ver, asic.mem),
        Family::VcnDec => vcn::dec::build_stream(words, vmid),
        Family::VcnEnc => vcn::enc::build_stream(words, vmid),
        Family::Vpe => vpe::build_stream(words, vmid, asic.mem),
    }
}

/// Decodes a built stream with the decoder matching its family.
///
/// Returns the continuation index when `params.max_opcodes` ran out, `None`
/// when the pass completed.
pub fn decode_stream(
    stream: &mut Stream,
    asic: &Asic<'_>,
    params: &DecodeParams,
    sink: &mut dyn Sink,
) -> Option<usize> {
    match stream.family {
        Family::Pm4 => pm4::decode_stream(stream, asic, params, sink),
        Family::Sdma => sdma::decode_stream(stream, asic, params, sink),
        Family::VcnDec => vcn::dec::decode_stream(stream, asic, params, sink),
        Family::VcnEnc => vcn::enc::decode_stream(stream, asic, params, sink),
        Family::Vpe => vpe::decode_stream(stream, asic, params, sink),
    }
}

/// Builds and decodes `words` in one call, returning the built stream.
///
/// The returned stream keeps whatever indirect buffers were resolved, so a
/// caller can re-decode (e.g. with a different sink) without re-fetching.
/// Returns `None` when nothing could be built.
pub fn decode_ring(
    family: Family,
    words: &[u32],
    asic: &Asic<'_>,
    params: &DecodeParams,
    sink: &mut dyn Sink,
) -> Option<Stream> {
    let mut stream = build_stream(family, words, params.vmid, asic)?;
    decode_stream(&mut stream, asic, params, sink);
    Some(stream)
}
