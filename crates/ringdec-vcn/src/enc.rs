//! VCN encode-ring streams: self-framed session/task packages.
//!
//! Each package is `[size, opcode, payload...]` where `size` counts words,
//! itself included. There is no sub-format and no indirection; the
//! interesting structure is just which packages appear and their fields.

use ringdec_core::{
    emit_fields, field, Asic, DecodeParams, FieldSpec, OpcodeEvent, PacketType, Radix, Sink,
    Stream, Token,
};
use tracing::{debug, warn};

/// An encode-ring package opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcnEncOpcode {
    SessionInfo,
    TaskInfo,
    Create,
    Encode,
    Destroy,
    RateControl,
    QualityParams,
    SliceHeader,
    EncodeParams,
    Feedback,
    Unknown(u32),
}

impl VcnEncOpcode {
    pub fn from_raw(op: u32) -> Self {
        match op {
            0x01 => Self::SessionInfo,
            0x02 => Self::TaskInfo,
            0x03 => Self::Create,
            0x04 => Self::Encode,
            0x05 => Self::Destroy,
            0x06 => Self::RateControl,
            0x07 => Self::QualityParams,
            0x0A => Self::SliceHeader,
            0x0B => Self::EncodeParams,
            0x10 => Self::Feedback,
            other => Self::Unknown(other),
        }
    }

    #[deny(unreachable_patterns)]
    pub fn raw(&self) -> u32 {
        match self {
            Self::SessionInfo => 0x01,
            Self::TaskInfo => 0x02,
            Self::Create => 0x03,
            Self::Encode => 0x04,
            Self::Destroy => 0x05,
            Self::RateControl => 0x06,
            Self::QualityParams => 0x07,
            Self::SliceHeader => 0x0A,
            Self::EncodeParams => 0x0B,
            Self::Feedback => 0x10,
            Self::Unknown(raw) => *raw,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionInfo => "SESSION_INFO",
            Self::TaskInfo => "TASK_INFO",
            Self::Create => "CREATE",
            Self::Encode => "ENCODE",
            Self::Destroy => "DESTROY",
            Self::RateControl => "RATE_CONTROL",
            Self::QualityParams => "QUALITY_PARAMS",
            Self::SliceHeader => "SLICE_HEADER",
            Self::EncodeParams => "ENCODE_PARAMS",
            Self::Feedback => "FEEDBACK",
            Self::Unknown(_) => "UNKNOWN",
        }
    }
}

// Package payload tables. A token's word 0 is the package opcode word, so
// payload fields start at word 1.

const SESSION_INFO: &[FieldSpec] = &[
    field("INTERFACE_VERSION", 1, 0, 32, Radix::Hex),
    field("SW_CONTEXT_ADDRESS_HI", 2, 0, 32, Radix::Hex),
    field("SW_CONTEXT_ADDRESS_LO", 3, 0, 32, Radix::Hex),
];

const TASK_INFO: &[FieldSpec] = &[
    field("TOTAL_SIZE_OF_ALL_PACKAGES", 1, 0, 32, Radix::Dec),
    field("TASK_ID", 2, 0, 32, Radix::Dec),
    field("ALLOWED_MAX_NUM_FEEDBACKS", 3, 0, 32, Radix::Dec),
];

const CREATE: &[FieldSpec] = &[
    field("ENCODE_STANDARD", 1, 0, 32, Radix::Dec),
    field("ALIGNED_PICTURE_WIDTH", 2, 0, 32, Radix::Dec),
    field("ALIGNED_PICTURE_HEIGHT", 3, 0, 32, Radix::Dec),
    field("PADDING_WIDTH", 4, 0, 32, Radix::Dec),
    field("PADDING_HEIGHT", 5, 0, 32, Radix::Dec),
];

const RATE_CONTROL: &[FieldSpec] = &[
    field("RATE_CONTROL_METHOD", 1, 0, 32, Radix::Dec),
    field("TARGET_BITRATE", 2, 0, 32, Radix::Dec),
    field("PEAK_BITRATE", 3, 0, 32, Radix::Dec),
    field("FRAME_RATE_NUM", 4, 0, 32, Radix::Dec),
    field("FRAME_RATE_DEN", 5, 0, 32, Radix::Dec),
];

const QUALITY_PARAMS: &[FieldSpec] = &[
    field("VBAQ_MODE", 1, 0, 32, Radix::Dec),
    field("SCENE_CHANGE_SENSITIVITY", 2, 0, 32, Radix::Dec),
    field("SCENE_CHANGE_MIN_IDR_INTERVAL", 3, 0, 32, Radix::Dec),
];

const ENCODE_PARAMS: &[FieldSpec] = &[
    field("PICTURE_TYPE", 1, 0, 32, Radix::Dec),
    field("ALLOWED_MAX_BITSTREAM_SIZE", 2, 0, 32, Radix::Dec),
    field("INPUT_PICTURE_LUMA_ADDRESS_HI", 3, 0, 32, Radix::Hex),
    field("INPUT_PICTURE_LUMA_ADDRESS_LO", 4, 0, 32, Radix::Hex),
    field("INPUT_PICTURE_CHROMA_ADDRESS_HI", 5, 0, 32, Radix::Hex),
    field("INPUT_PICTURE_CHROMA_ADDRESS_LO", 6, 0, 32, Radix::Hex),
];

const FEEDBACK: &[FieldSpec] = &[
    field("FEEDBACK_BUFFER_ADDRESS_HI", 1, 0, 32, Radix::Hex),
    field("FEEDBACK_BUFFER_ADDRESS_LO", 2, 0, 32, Radix::Hex),
    field("FEEDBACK_BUFFER_SIZE", 3, 0, 32, Radix::Dec),
    field("FEEDBACK_DATA_SIZE", 4, 0, 32, Radix::Dec),
];

fn table_for(op: VcnEncOpcode) -> Option<&'static [FieldSpec]> {
    match op {
        VcnEncOpcode::SessionInfo => Some(SESSION_INFO),
        VcnEncOpcode::TaskInfo => Some(TASK_INFO),
        VcnEncOpcode::Create => Some(CREATE),
        VcnEncOpcode::RateControl => Some(RATE_CONTROL),
        VcnEncOpcode::QualityParams => Some(QUALITY_PARAMS),
        VcnEncOpcode::EncodeParams => Some(ENCODE_PARAMS),
        VcnEncOpcode::Feedback => Some(FEEDBACK),
        // Payload is an opaque bitstream template / has no fixed fields.
        VcnEncOpcode::Encode | VcnEncOpcode::Destroy | VcnEncOpcode::SliceHeader => Some(&[]),
        VcnEncOpcode::Unknown(_) => None,
    }
}

/// Builds a token stream from a raw encode-ring word slice.
///
/// A package needs at least its two framing words; a size below that is
/// malformed and ends the stream, as does a size running past the input.
/// The token's header is the size word and its payload keeps the opcode
/// word, so word counts stay exact.
pub fn build_stream(words: &[u32], vmid: u32) -> Option<Stream> {
    let mut stream = Stream::new(ringdec_core::Family::VcnEnc, vmid);
    let mut i = 0usize;

    while i < words.len() {
        let size = words[i] as usize;
        if size < 2 {
            warn!(size, offset = i, "malformed package size, ending stream");
            break;
        }
        if i + size > words.len() {
            debug!(size, offset = i, remaining = words.len() - i, "truncated trailing package dropped");
            break;
        }
        let opcode = words[i + 1];
        let mut token = Token::new(PacketType::Packet, opcode, words[i], i as u32);
        token.words = words[i + 1..i + size].to_vec();
        stream.tokens.push(token);
        i += size;
    }

    if stream.is_empty() {
        None
    } else {
        Some(stream)
    }
}

/// Decodes a built encode-ring stream into Sink events.
///
/// A package whose field table overruns its payload is marked invalid and
/// aborts the remaining pass (codec-family policy); unknown package types
/// go to `unhandled` and decoding continues.
pub fn decode_stream(
    stream: &mut Stream,
    asic: &Asic<'_>,
    params: &DecodeParams,
    sink: &mut dyn Sink,
) -> Option<usize> {
    sink.start_ib(
        params.addr,
        params.vmid,
        params.from_addr,
        params.from_vmid,
        stream.size_words(),
        params.kind,
    );

    let mut remaining = params.max_opcodes;
    for idx in params.start..stream.tokens.len() {
        match remaining {
            Some(0) => {
                sink.done();
                return Some(idx);
            }
            Some(ref mut n) => *n -= 1,
            None => {}
        }

        let token = &mut stream.tokens[idx];
        let addr = params.addr + 4 * u64::from(token.offset);
        let op = VcnEncOpcode::from_raw(token.opcode);
        sink.start_opcode(&OpcodeEvent {
            addr,
            vmid: params.vmid,
            pkt_type: token.pkt_type,
            opcode: token.opcode,
            sub_opcode: None,
            nwords: token.size_words(),
            name: op.name(),
            header: token.header,
            words: &token.words,
        });

        if token.invalid {
            warn!(offset = token.offset, "invalid package, aborting encode-ring pass");
            break;
        }

        let Some(table) = table_for(op) else {
            sink.unhandled(addr, params.vmid, token);
            continue;
        };
        if let Err(err) = emit_fields(table, token, &asic.ver, addr, params.vmid, sink) {
            warn!(package = op.name(), %err, "package shorter than field table, aborting encode-ring pass");
            token.invalid = true;
            break;
        }
    }

    sink.done();
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn packages_frame_by_size_word() {
        let words = [
            4, 0x02, 64, 7, // TASK_INFO missing one field word is fine at build
            2, 0x05, // DESTROY
        ];
        let stream = build_stream(&words, 0).unwrap();
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.tokens[0].opcode, 0x02);
        assert_eq!(stream.tokens[0].size_words(), 4);
        assert_eq!(stream.tokens[1].offset, 4);
        assert_eq!(stream.size_words(), words.len() as u32);
    }

    #[test]
    fn undersized_package_ends_stream() {
        let words = [2, 0x05, 1, 0xFF, 2, 0x05];
        let stream = build_stream(&words, 0).unwrap();
        assert_eq!(stream.len(), 1);
        assert!(build_stream(&[0, 0], 0).is_none());
    }

    #[test]
    fn oversized_trailing_package_is_dropped() {
        let words = [2, 0x05, 10, 0x04, 0];
        let stream = build_stream(&words, 0).unwrap();
        assert_eq!(stream.len(), 1);
    }
}
