use pretty_assertions::assert_eq;
use ringdec::{build_stream, decode_ring, decode_stream, Asic, DecodeParams, Family, IbKind};
use ringdec_core::test_utils::{EmptyRegisterMap, Event, RecordingSink, TableRegisterMap, VecVmMemory};
use ringdec_core::{ChipFamily, IpTriple, PacketType, Radix, VersionContext};

fn gfx10() -> VersionContext {
    VersionContext::new(ChipFamily::Gfx10, IpTriple::new(10, 1, 0))
}

#[test]
fn zero_header_is_a_single_register_write() {
    // A 0x00000000 header is a type-0 packet writing one word to register 0.
    let regs = TableRegisterMap::new(&[(0, "MM_INDEX")]);
    let asic = Asic::without_memory(gfx10(), &regs);
    let words = [0x0000_0000, 0xDEAD_BEEF];
    let mut sink = RecordingSink::default();
    let stream = decode_ring(Family::Pm4, &words, &asic, &DecodeParams::ring(0, 0), &mut sink)
        .expect("stream builds");

    assert_eq!(stream.len(), 1);
    assert_eq!(stream.tokens[0].pkt_type, PacketType::Type0);
    assert_eq!(
        sink.events,
        vec![
            Event::StartIb {
                addr: 0,
                vmid: 0,
                from_addr: 0,
                from_vmid: 0,
                size_words: 2,
                kind: IbKind::Ring,
            },
            Event::Opcode {
                addr: 0,
                vmid: 0,
                pkt_type: PacketType::Type0,
                opcode: 0,
                sub_opcode: None,
                nwords: 2,
                name: "PKT0".to_owned(),
                header: 0,
            },
            Event::Field {
                addr: 4,
                vmid: 0,
                name: "MM_INDEX".to_owned(),
                value: 0xDEAD_BEEF,
                text: None,
                radix: Radix::Hex,
            },
            Event::Done,
        ]
    );
}

#[test]
fn type3_nop_header_decodes_by_name() {
    // 0xC0001000: type 3, opcode 0x10 (NOP), one payload word.
    let asic = Asic::without_memory(gfx10(), &EmptyRegisterMap);
    let words = [0xC000_1000, 0x1234_5678];
    let mut sink = RecordingSink::default();
    decode_ring(Family::Pm4, &words, &asic, &DecodeParams::ring(0, 0), &mut sink).unwrap();
    assert_eq!(sink.opcode_names(), vec!["NOP".to_owned()]);
}

#[test]
fn sdma_ib_inherits_the_ring_vmid() {
    // The INDIRECT header names no VMID, so the nested decode runs under the
    // ring's own context.
    let ib_words = [ringdec::sdma::header::encode(6, 0, 0), 0x1]; // TRAP
    let mem = VecVmMemory::new(5, 0x4000, &ib_words);
    let ring = [
        ringdec::sdma::header::encode(4, 0, 0),
        0x4000,
        0,
        2,
        0,
        0,
    ];
    let asic = Asic::new(gfx10(), &EmptyRegisterMap, &mem);
    let mut sink = RecordingSink::default();
    let params = DecodeParams::ring(0x8000, 5);
    decode_ring(Family::Sdma, &ring, &asic, &params, &mut sink).unwrap();

    assert!(sink.events.contains(&Event::StartIb {
        addr: 0x4000,
        vmid: 5,
        from_addr: 0x8000,
        from_vmid: 5,
        size_words: 2,
        kind: IbKind::Ib,
    }));
}

#[test]
fn built_stream_can_be_redecoded_without_memory() {
    // decode_ring resolved the IB eagerly; a second pass over the returned
    // stream needs no fetcher and produces the identical events.
    let ib_words = [0xC000_1000u32, 0xAB]; // NOP
    let mem = VecVmMemory::new(1, 0x2000, &ib_words);
    let ring = [
        0xC002_3F00, // INDIRECT_BUFFER, 3 payload words
        0x2000,
        0,
        2 | (1 << 24),
    ];
    let asic = Asic::new(gfx10(), &EmptyRegisterMap, &mem);
    let params = DecodeParams::ring(0x9000, 0);
    let mut first = RecordingSink::default();
    let mut stream = decode_ring(Family::Pm4, &ring, &asic, &params, &mut first).unwrap();

    let dry = Asic::without_memory(gfx10(), &EmptyRegisterMap);
    let mut second = RecordingSink::default();
    decode_stream(&mut stream, &dry, &params, &mut second);
    assert_eq!(first, second);
}

#[test]
fn each_family_builds_through_the_dispatch() {
    let asic = Asic::without_memory(gfx10(), &EmptyRegisterMap);
    assert!(build_stream(Family::Pm4, &[0xC000_1000, 0], 0, &asic).is_some());
    assert!(build_stream(Family::Sdma, &[ringdec::sdma::header::encode(6, 0, 0), 0], 0, &asic).is_some());
    assert!(build_stream(Family::VcnDec, &[0x0000_0000, 0x1], 0, &asic).is_some());
    assert!(build_stream(Family::VcnEnc, &[2, 0x05], 0, &asic).is_some());
    assert!(build_stream(Family::Vpe, &[ringdec::vpe::header::encode(6, 0, 0), 0], 0, &asic).is_some());
    assert!(build_stream(Family::Pm4, &[], 0, &asic).is_none());
}
