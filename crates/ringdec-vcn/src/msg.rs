//! The decode-ring message buffer format.
//!
//! A `GPCOM_VCPU_CMD` write hands the firmware a message buffer: a four-word
//! header (`version`, `total_size` in bytes, `num_buffers`, `msg_type`),
//! optionally a sub-buffer index table, then a run of `(size, type)` tagged
//! records. Everything in the buffer is untrusted; sizes are validated
//! against what was actually fetched, never believed outright.

use ringdec_core::{fetch_words, Sink, VcnRecord, VmMemory};
use tracing::warn;

/// Header word count and byte size of the unified message header.
const HEADER_WORDS: u32 = 4;
const HEADER_BYTES: u32 = HEADER_WORDS * 4;

/// Tagged records carry at least their own `(size, type)` tag.
const RECORD_TAG_BYTES: u32 = 8;

/// Upper bound on how much of a message buffer is fetched. A declared size
/// beyond this is clamped (the size field is guest-controlled).
const MAX_MESSAGE_BYTES: u32 = 1 << 20;

/// The fixed message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub version: u32,
    /// Declared total size in bytes, header included.
    pub total_size: u32,
    pub num_buffers: u32,
    pub msg_type: u32,
}

/// What a message-buffer parse established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub header: MessageHeader,
    /// Command code the buffer was submitted under, reserved bit cleared.
    pub cmd: u32,
    /// Size the sub-buffer index table summed to, when one was present and
    /// disagreed with `header.total_size`. The summed value is the one the
    /// walk trusted.
    pub indexed_size: Option<u32>,
    /// Tagged records found, in buffer order.
    pub records: Vec<VcnRecord>,
}

/// Label for the mailbox command codes.
pub fn cmd_name(cmd: u32) -> Option<&'static str> {
    match cmd {
        0x0 => Some("message buffer"),
        0x2 => Some("dpb buffer"),
        0x4 => Some("decoding target buffer"),
        0x6 => Some("feedback buffer"),
        0xA => Some("session context buffer"),
        _ => None,
    }
}

/// Parses the message buffer at `(vmid, addr)` and reports each tagged
/// record through `sink.add_vcn`.
///
/// `cmd` must already have its reserved low bit masked off. Returns `None`
/// when the header itself cannot be fetched; every later inconsistency
/// degrades to a shorter walk instead.
pub fn parse_message(
    mem: &dyn VmMemory,
    vmid: u32,
    addr: u64,
    cmd: u32,
    sink: &mut dyn Sink,
) -> Option<ParsedMessage> {
    let head = fetch_words(mem, vmid, addr, HEADER_WORDS)?;
    let header = MessageHeader {
        version: head[0],
        total_size: head[1],
        num_buffers: head[2],
        msg_type: head[3],
    };

    let mut body_start = HEADER_BYTES;
    let mut effective_size = header.total_size;
    let mut indexed_size = None;

    if header.num_buffers > 1 {
        let pairs = header.num_buffers.min(MAX_MESSAGE_BYTES / 8);
        if let Some(index) = fetch_words(mem, vmid, addr + u64::from(HEADER_BYTES), pairs * 2) {
            let summed: u32 = index
                .chunks_exact(2)
                .map(|pair| pair[1])
                .fold(0u32, u32::saturating_add);
            if summed != header.total_size {
                warn!(
                    vmid,
                    addr,
                    declared = header.total_size,
                    summed,
                    "message index table disagrees with declared total size"
                );
                indexed_size = Some(summed);
                effective_size = summed;
            }
            body_start += pairs * 8;
        }
    }

    let effective_size = effective_size.min(MAX_MESSAGE_BYTES);
    let mut records = Vec::new();
    if effective_size > body_start {
        if let Some(body) = fetch_words(mem, vmid, addr, effective_size / 4) {
            walk_records(&body, body_start, addr, vmid, &mut records, sink);
        }
    }

    Some(ParsedMessage {
        header,
        cmd,
        indexed_size,
        records,
    })
}

/// Walks the `(size, type)` tagged records in `body` starting at byte
/// `start`. A record too small to hold its own tag, or one whose declared
/// size runs past the buffer, ends the walk.
fn walk_records(
    body: &[u32],
    start: u32,
    addr: u64,
    vmid: u32,
    records: &mut Vec<VcnRecord>,
    sink: &mut dyn Sink,
) {
    let body_bytes = body.len() as u32 * 4;
    let mut offset = start;
    while offset + RECORD_TAG_BYTES <= body_bytes {
        let word = (offset / 4) as usize;
        let size = body[word];
        let kind = body[word + 1];
        if size < RECORD_TAG_BYTES || offset.saturating_add(size) > body_bytes {
            break;
        }
        let record = VcnRecord { offset, size, kind };
        sink.add_vcn(addr + u64::from(offset), vmid, &record);
        records.push(record);
        // Records are word-aligned regardless of their byte size.
        offset += (size + 3) & !3;
    }
}
