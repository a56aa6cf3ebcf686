use pretty_assertions::assert_eq;
use ringdec_core::test_utils::{EmptyRegisterMap, Event, RecordingSink, TableRegisterMap, VecVmMemory};
use ringdec_core::{
    Asic, ChipFamily, DecodeParams, Family, IpTriple, PacketType, Stream, Token, VcnRecord,
    VersionContext,
};
use ringdec_pm4::header::encode_type0;
use ringdec_vcn::{dec, enc};

fn vcn(maj: u32, min: u32) -> VersionContext {
    VersionContext::new(ChipFamily::Gfx10, IpTriple::new(maj, min, 0))
}

fn mailbox_regs() -> TableRegisterMap {
    TableRegisterMap::new(&[
        (0x100, "UVD_GPCOM_VCPU_DATA0"),
        (0x101, "UVD_GPCOM_VCPU_DATA1"),
        (0x102, "UVD_GPCOM_VCPU_CMD"),
    ])
}

#[test]
fn mailbox_command_parses_the_referenced_message() {
    // Message at 0x6000: header + one 8-byte record of type 3.
    let message = [1, 24, 1, 0, 8, 3];
    let mem = VecVmMemory::new(0, 0x6000, &message);
    let regs = mailbox_regs();

    // One type-0 packet programming DATA0, DATA1, CMD. The command value has
    // the reserved low bit set; it must be masked before interpretation.
    let ring = [encode_type0(0x100, 3), 0x6000, 0, 0x1];
    let mut stream = dec::build_stream(&ring, 0).unwrap();
    let asic = Asic::new(vcn(3, 0), &regs, &mem);
    let mut sink = RecordingSink::default();
    dec::decode_stream(&mut stream, &asic, &DecodeParams::ring(0x2000, 0), &mut sink);

    assert!(sink.events.contains(&Event::Vcn {
        addr: 0x6010,
        vmid: 0,
        record: VcnRecord { offset: 16, size: 8, kind: 3 },
    }));
    let cmd_field = sink
        .events
        .iter()
        .find_map(|ev| match ev {
            Event::Field { name, value, text, .. } if name == "UVD_GPCOM_VCPU_CMD" => {
                Some((*value, text.clone()))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(cmd_field, (0x1, Some("message buffer".to_owned())));
}

#[test]
fn mailbox_command_survives_a_resumed_decode() {
    let message = [1, 24, 1, 0, 8, 3];
    let mem = VecVmMemory::new(0, 0x6000, &message);
    let regs = mailbox_regs();

    // Address halves in one packet, the command in the next; a budget of one
    // puts the boundary between them.
    let ring = [encode_type0(0x100, 2), 0x6000, 0, encode_type0(0x102, 1), 0x0];
    let mut stream = dec::build_stream(&ring, 0).unwrap();
    let asic = Asic::new(vcn(3, 0), &regs, &mem);

    let mut first = RecordingSink::default();
    let cont = dec::decode_stream(
        &mut stream,
        &asic,
        &DecodeParams::ring(0x2000, 0).with_budget(1),
        &mut first,
    )
    .expect("budget hit");
    assert_eq!(cont, 1);
    assert!(!first.events.iter().any(|ev| matches!(ev, Event::Vcn { .. })));

    let mut rest = RecordingSink::default();
    dec::decode_stream(
        &mut stream,
        &asic,
        &DecodeParams::ring(0x2000, 0).resumed_at(cont),
        &mut rest,
    );
    assert!(rest.events.contains(&Event::Vcn {
        addr: 0x6010,
        vmid: 0,
        record: VcnRecord { offset: 16, size: 8, kind: 3 },
    }));
}

#[test]
fn command_without_address_halves_is_skipped() {
    let regs = mailbox_regs();
    let mem = VecVmMemory::new(0, 0x6000, &[0; 8]);
    // CMD write alone: no DATA0/DATA1 seen this pass.
    let ring = [encode_type0(0x102, 1), 0x0];
    let mut stream = dec::build_stream(&ring, 0).unwrap();
    let asic = Asic::new(vcn(3, 0), &regs, &mem);
    let mut sink = RecordingSink::default();
    dec::decode_stream(&mut stream, &asic, &DecodeParams::ring(0, 0), &mut sink);
    assert!(!sink.events.iter().any(|ev| matches!(ev, Event::Vcn { .. })));
}

#[test]
fn invalid_token_aborts_the_whole_decode_pass() {
    // Hand-built: an invalid packet followed by a healthy register write.
    let mut stream = Stream::new(Family::VcnDec, 0);
    let mut bad = Token::new(PacketType::Type0, 0x100, encode_type0(0x100, 1), 0);
    bad.words = vec![0x1234];
    bad.invalid = true;
    let mut good = Token::new(PacketType::Type0, 0x100, encode_type0(0x100, 1), 2);
    good.words = vec![0x5678];
    stream.tokens = vec![bad, good];

    let asic = Asic::without_memory(vcn(3, 0), &EmptyRegisterMap);
    let mut sink = RecordingSink::default();
    dec::decode_stream(&mut stream, &asic, &DecodeParams::ring(0, 0), &mut sink);

    // One opcode announcement, then the pass ends; the healthy token after
    // the bad one is never reached.
    assert_eq!(sink.opcode_names(), vec!["PKT0".to_owned()]);
    assert_eq!(sink.events.last(), Some(&Event::Done));
}

#[test]
fn short_encode_package_aborts_the_remaining_pass() {
    // SESSION_INFO with a one-word payload (table needs three), then DESTROY.
    let words = [3, 0x01, 5, 2, 0x05];
    let mut stream = enc::build_stream(&words, 0).unwrap();
    let asic = Asic::without_memory(vcn(3, 0), &EmptyRegisterMap);
    let mut sink = RecordingSink::default();
    enc::decode_stream(&mut stream, &asic, &DecodeParams::ring(0, 0), &mut sink);

    assert!(stream.tokens[0].invalid);
    assert_eq!(sink.opcode_names(), vec!["SESSION_INFO".to_owned()]);
}

#[test]
fn encode_packages_decode_their_fields() {
    let words = [
        5, 0x01, 0x9_0001, 0x0, 0xFF00, // SESSION_INFO
        5, 0x02, 64, 7, 1, // TASK_INFO
        2, 0x05, // DESTROY
    ];
    let mut stream = enc::build_stream(&words, 0).unwrap();
    let asic = Asic::without_memory(vcn(3, 0), &EmptyRegisterMap);
    let mut sink = RecordingSink::default();
    enc::decode_stream(&mut stream, &asic, &DecodeParams::ring(0x3000, 0), &mut sink);

    assert_eq!(
        sink.opcode_names(),
        vec![
            "SESSION_INFO".to_owned(),
            "TASK_INFO".to_owned(),
            "DESTROY".to_owned()
        ]
    );
    assert_eq!(
        sink.fields(),
        vec![
            ("INTERFACE_VERSION".to_owned(), 0x9_0001),
            ("SW_CONTEXT_ADDRESS_HI".to_owned(), 0x0),
            ("SW_CONTEXT_ADDRESS_LO".to_owned(), 0xFF00),
            ("TOTAL_SIZE_OF_ALL_PACKAGES".to_owned(), 64),
            ("TASK_ID".to_owned(), 7),
            ("ALLOWED_MAX_NUM_FEEDBACKS".to_owned(), 1),
        ]
    );
}

#[test]
fn unknown_encode_package_is_reported_and_skipped() {
    let words = [3, 0xEE, 0, 2, 0x05];
    let mut stream = enc::build_stream(&words, 0).unwrap();
    let asic = Asic::without_memory(vcn(3, 0), &EmptyRegisterMap);
    let mut sink = RecordingSink::default();
    enc::decode_stream(&mut stream, &asic, &DecodeParams::ring(0, 0), &mut sink);

    assert!(sink.events.iter().any(|ev| matches!(
        ev,
        Event::Unhandled { opcode: 0xEE, .. }
    )));
    assert_eq!(
        sink.opcode_names(),
        vec!["UNKNOWN".to_owned(), "DESTROY".to_owned()]
    );
}
