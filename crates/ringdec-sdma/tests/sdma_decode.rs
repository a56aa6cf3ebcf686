use pretty_assertions::assert_eq;
use ringdec_core::test_utils::{EmptyRegisterMap, Event, RecordingSink, TableRegisterMap, VecVmMemory};
use ringdec_core::{
    Asic, ChipFamily, DecodeParams, IbKind, IpTriple, PacketType, Radix, Stream, Token,
    VersionContext,
};
use ringdec_sdma::{build_stream, decode_stream, header};

fn sdma(maj: u32, min: u32) -> VersionContext {
    VersionContext::new(ChipFamily::Gfx10, IpTriple::new(maj, min, 0))
}

fn decode(
    words: &[u32],
    ver: VersionContext,
    regs: &dyn ringdec_core::RegisterMap,
) -> RecordingSink {
    let mut stream = build_stream(words, 0, &ver, None).expect("stream builds");
    let asic = Asic::without_memory(ver, regs);
    let mut sink = RecordingSink::default();
    decode_stream(&mut stream, &asic, &DecodeParams::ring(0x1000, 0), &mut sink);
    sink
}

#[test]
fn poll_regmem_register_poll_resolves_symbolically() {
    let regs = TableRegisterMap::new(&[(0x01A4, "SDMA0_GFX_RB_RPTR")]);
    // func = 3 (==), mem_poll clear: register poll.
    let header = header::encode(8, 0, 0) | (3 << 28);
    let words = [
        header,
        0x01A4 << 2, // register dword offset
        0,
        0xCAFE,     // VALUE
        0xFFFF,     // MASK
        10 | (7 << 16),
    ];
    let sink = decode(&words, sdma(5, 0), &regs);
    assert_eq!(
        sink.fields(),
        vec![
            ("VALUE".to_owned(), 0xCAFE),
            ("MASK".to_owned(), 0xFFFF),
            ("POLL_INTERVAL".to_owned(), 10),
            ("RETRY_COUNT".to_owned(), 7),
            ("FUNCTION".to_owned(), 3),
            ("REGISTER".to_owned(), 0x01A4),
        ]
    );
    let func = sink
        .events
        .iter()
        .find_map(|ev| match ev {
            Event::Field { name, text, .. } if name == "FUNCTION" => Some(text.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(func.as_deref(), Some("=="));
    let reg_text = sink
        .events
        .iter()
        .find_map(|ev| match ev {
            Event::Field { name, text, .. } if name == "REGISTER" => Some(text.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(reg_text.as_deref(), Some("SDMA0_GFX_RB_RPTR"));
}

#[test]
fn poll_regmem_memory_poll_emits_address_pair() {
    // mem_poll set: the first two payload words are an address pair.
    let header = header::encode(8, 0, 0) | (1u32 << 31);
    let words = [header, 0xBEEF_0000, 0x0000_0001, 0, 0, 0];
    let sink = decode(&words, sdma(5, 0), &EmptyRegisterMap);
    let names: Vec<String> = sink.fields().into_iter().map(|(n, _)| n).collect();
    assert!(names.contains(&"ADDR_LO".to_owned()));
    assert!(names.contains(&"ADDR_HI".to_owned()));
    assert!(!names.contains(&"REGISTER".to_owned()));
}

#[test]
fn srbm_write_resolves_register() {
    let regs = TableRegisterMap::new(&[(0x0048, "MM_INDEX")]);
    let header = header::encode(14, 0, 0) | (0xF << 28); // all byte enables
    let words = [header, 0x0048, 0x1234_5678];
    let sink = decode(&words, sdma(5, 0), &regs);
    assert_eq!(
        sink.fields(),
        vec![
            ("BYTE_EN".to_owned(), 0xF),
            ("ADDR".to_owned(), 0x0048),
            ("DATA".to_owned(), 0x1234_5678),
        ]
    );
}

#[test]
fn linear_write_emits_each_data_word() {
    let words = [
        header::encode(2, 0, 0),
        0x2000,
        0,
        1, // COUNT -> 2 data words
        0xAAAA_AAAA,
        0xBBBB_BBBB,
    ];
    let sink = decode(&words, sdma(5, 0), &EmptyRegisterMap);
    assert_eq!(
        sink.fields(),
        vec![
            ("DST_ADDR_LO".to_owned(), 0x2000),
            ("DST_ADDR_HI".to_owned(), 0),
            ("COUNT".to_owned(), 1),
            ("DATA".to_owned(), 0xAAAA_AAAA),
            ("DATA".to_owned(), 0xBBBB_BBBB),
        ]
    );
}

#[test]
fn indirect_follow_decodes_nested_packets() {
    let ib_words = [header::encode(6, 0, 0), 0x7]; // TRAP
    let mem = VecVmMemory::new(2, 0x4000, &ib_words);
    let ring = [
        header::encode(4, 0, 2), // INDIRECT into VMID 2
        0x4000,
        0,
        2, // IB_SIZE
        0,
        0,
    ];
    let ver = sdma(5, 0);
    let mut stream = build_stream(&ring, 0, &ver, None).unwrap();
    let asic = Asic::new(ver, &EmptyRegisterMap, &mem);
    let mut sink = RecordingSink::default();
    decode_stream(&mut stream, &asic, &DecodeParams::ring(0x9000, 0), &mut sink);

    assert!(sink.events.contains(&Event::StartIb {
        addr: 0x4000,
        vmid: 2,
        from_addr: 0x9000,
        from_vmid: 0,
        size_words: 2,
        kind: IbKind::Ib,
    }));
    assert_eq!(sink.opcode_names(), vec!["INDIRECT".to_owned(), "TRAP".to_owned()]);
    assert!(sink
        .fields()
        .contains(&("IB_BASE".to_owned(), 0x4000)));
}

#[test]
fn unknown_sub_opcode_is_reported_not_fatal() {
    // Tiled COPY frames (length is known) but has no field decode.
    let words: Vec<u32> = std::iter::once(header::encode(1, 1, 0))
        .chain(std::iter::repeat(0).take(11))
        .chain([header::encode(6, 0, 0), 0x1].into_iter())
        .collect();
    let sink = decode(&words, sdma(5, 0), &EmptyRegisterMap);
    assert!(sink.events.contains(&Event::UnhandledSubop {
        addr: 0x1000,
        vmid: 0,
        opcode: 1,
        sub_opcode: Some(1),
    }));
    assert_eq!(sink.opcode_names(), vec!["COPY".to_owned(), "TRAP".to_owned()]);
}

#[test]
fn short_payload_invalidates_only_that_token() {
    // Hand-built stream: a FENCE missing its payload, then a healthy TRAP.
    let mut stream = Stream::new(ringdec_core::Family::Sdma, 0);
    let mut fence = Token::new(PacketType::Packet, 5, header::encode(5, 0, 0), 0);
    fence.sub_opcode = Some(0);
    fence.words = vec![0x1000]; // table needs 3
    let mut trap = Token::new(PacketType::Packet, 6, header::encode(6, 0, 0), 2);
    trap.sub_opcode = Some(0);
    trap.words = vec![0x7];
    stream.tokens = vec![fence, trap];

    let asic = Asic::without_memory(sdma(5, 0), &EmptyRegisterMap);
    let mut sink = RecordingSink::default();
    decode_stream(&mut stream, &asic, &DecodeParams::ring(0, 0), &mut sink);

    assert!(stream.tokens[0].invalid);
    assert!(!stream.tokens[1].invalid);
    assert!(sink
        .fields()
        .contains(&("TRAP_INT_CONTEXT".to_owned(), 0x7)));
}

#[test]
fn decode_is_idempotent() {
    let words = [
        header::encode(5, 0, 0),
        0x1000,
        0,
        0xDEAD,
        header::encode(0, 0, 1),
        0,
    ];
    let ver = sdma(5, 0);
    let mut stream = build_stream(&words, 0, &ver, None).unwrap();
    let asic = Asic::without_memory(ver, &EmptyRegisterMap);
    let params = DecodeParams::ring(0x2000, 0);

    let mut first = RecordingSink::default();
    decode_stream(&mut stream, &asic, &params, &mut first);
    let mut second = RecordingSink::default();
    decode_stream(&mut stream, &asic, &params, &mut second);
    assert_eq!(first, second);
}

#[test]
fn fence_fields_and_radix() {
    let words = [header::encode(5, 0, 0), 0xFFFF_F000, 0x1, 42];
    let sink = decode(&words, sdma(5, 0), &EmptyRegisterMap);
    assert_eq!(
        sink.fields(),
        vec![
            ("ADDR_LO".to_owned(), 0xFFFF_F000),
            ("ADDR_HI".to_owned(), 0x1),
            ("DATA".to_owned(), 42),
        ]
    );
    assert!(sink.events.iter().any(|ev| matches!(
        ev,
        Event::Field { name, radix: Radix::Hex, .. } if name == "ADDR_LO"
    )));
}
