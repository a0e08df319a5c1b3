use super::*;
use data_encoding::{BASE64, HEXLOWER_PERMISSIVE};
use std::time::Duration;

fn hex(value: &str) -> Vec<u8> {
    HEXLOWER_PERMISSIVE
        .decode(value.as_bytes())
        .expect("Failed to decode hex string")
}

fn base64(value: &str) -> Vec<u8> {
    BASE64
        .decode(value.as_bytes())
        .expect("Failed to decode base64 string")
}

fn decode_with(schema: SchemaVersion, buffer: &[u8]) -> DecodeResult<(SpliceInfoSection, usize)> {
    let config = DecoderConfig::new().schema(schema);
    Decoder::new(config).decode(buffer)
}

/// Splice insert with two segmentation descriptors (2013 layout).
const INSERT_TWO_SEGMENTATIONS: &str = "FC00490000000000000000000F0500000002004081E56EC735000000000029021543554549000000027FCF00002932E0080132340000021043554549000000017F9F0801313500007F0D0304";
/// Splice insert with break duration and an avail descriptor.
const INSERT_WITH_AVAIL: &str =
    "/DAvAAAAAAAA///wFAVIAACPf+/+c2nALv4AUsz1AAAAAAAKAAhDVUVJAAABNWLbowo=";
const TIME_SIGNAL: &str = "/DAWAAAAAAAAAP/wBQb+Qjo1vQAAuwxz9A==";
const TIME_SIGNAL_AVAIL: &str = "/DAgAAAAAAAAAP/wBQb+Qjo1vQAKAAhDVUVJAAAE0iVuWvA=";
const PLACEMENT_OPPORTUNITY_END: &str =
    "/DAvAAAAAAAA///wBQb+dGKQoAAZAhdDVUVJSAAAjn+fCAgAAAAALKChijUCAKnMZ1g=";
/// The time_signal placement opportunity start sample from section 14.1 of the 2013 standard.
const PLACEMENT_OPPORTUNITY_START: &str =
    "/DA0AAAAAAAA///wBQb+cr0AUAAeAhxDVUVJSAAAjn/PAAGlmbAICAAAAAAsoKGKNAIAmsnRfg==";
const THREE_AIRING_IDS: &str = "/DBhAAAAAAAA///wBQb+qM1E7QBLAhdDVUVJSAAArX+fCAgAAAAALLLXnTUCAAIXQ1VFSUgAACZ/nwgIAAAAACyy150RAAACF0NVRUlIAAAnf58ICAAAAAAsstezEAAAihiGnw==";
const MPU_UPID: &str = "/DAsAAAAAAAAAP/wBQb+7YaD1QAWAhRDVUVJAADc8X+/DAVPVkxZSSIAAJ6Gk2Q=";
/// Ad-ID sample whose CRC_32 does not match its content.
const ADID_BAD_CRC: &str =
    "/DA4AAAAAAAA///wBQb+AKpFLgAiAiBDVUVJAAAAA3//AAApPWwDDEFCQ0QwMTIzNDU2SHAAAFkTm+A=";
/// UMID sample whose UPID runs past the declared descriptor length.
const UMID_OVERRUN: &str = "/DBDAAAAAAAA///wBQb+AA2QOQAtAitDVUVJAAAAA3+/BCAwNjBhMmIzNC4wMTAxMDEwNS4wMTAxMGQyMC4xEAEBRKI3vg==";
/// Placement opportunity start carrying sub_segment_num/sub_segments_expected (2017 layout).
const SUB_SEGMENT_2017: &str = "fc3036000000000000fffff00506fe72bd00500020021e435545494800008e7fcf0001a599b00808000000002ca0a18a3402009ac9b6c1a0f1";
const ENCRYPTED_WITH_STUFFING: &str = "fc301700820000000007fff000000000ffffdeadbeef5b72a74f";
const SCHEDULE: &str = "fc303f00000000000000fff02e0403000000107fff5f5e1000fe002932e012340102000000117f1f0221000003e822000007d00055000000000012ff0000d9b5f008";
const DTMF_AVAIL_TIME: &str = "fc303c00000000000000fff001067f002a010a43554549b19f31323123000a4355454900000135aabb03104355454900006553f100000001f40025415594d5";
const PRIVATE_COMMAND: &str = "fc301800000000000000fff007ff4142434401020300000c5f29ce";
const INSERT_COMPONENTS: &str =
    "fc302400000000000000fff013054800008f7f8f0201fe00000100027f000701010000aba02a99";
const INSERT_IMMEDIATE_COMPONENTS: &str = "fc305100000000000000fff012054800008f7f3f020102fe00015f9000070101002e02094355454900000099ff0221435545490000009a7f3f0230fe0000232831fe000046500c054f564c5949220101ee445f8e";
const INSERT_CANCEL: &str = "fc301600000000000000fff005054800008fff0000cdbac052";
const BANDWIDTH_RESERVATION: &str = "fc301100000000000000fff0000700007f44f86a";

/// Every well-formed fixture, with the schema it decodes under.
fn valid_fixtures() -> Vec<(&'static str, Vec<u8>, SchemaVersion)> {
    use SchemaVersion::*;
    vec![
        ("insert_two_segmentations", hex(INSERT_TWO_SEGMENTATIONS), V2013),
        ("insert_with_avail", base64(INSERT_WITH_AVAIL), V2013),
        ("time_signal", base64(TIME_SIGNAL), V2013),
        ("time_signal_avail", base64(TIME_SIGNAL_AVAIL), V2013),
        ("placement_opportunity_end", base64(PLACEMENT_OPPORTUNITY_END), V2017),
        ("placement_opportunity_start", base64(PLACEMENT_OPPORTUNITY_START), V2013),
        ("three_airing_ids", base64(THREE_AIRING_IDS), V2013),
        ("mpu_upid", base64(MPU_UPID), V2013),
        ("adid_bad_crc", base64(ADID_BAD_CRC), V2013),
        ("sub_segment_2017", hex(SUB_SEGMENT_2017), V2017),
        ("encrypted_with_stuffing", hex(ENCRYPTED_WITH_STUFFING), V2013),
        ("schedule", hex(SCHEDULE), V2013),
        ("dtmf_avail_time", hex(DTMF_AVAIL_TIME), V2013),
        ("private_command", hex(PRIVATE_COMMAND), V2013),
        ("insert_components", hex(INSERT_COMPONENTS), V2013),
        ("insert_immediate_components", hex(INSERT_IMMEDIATE_COMPONENTS), V2017),
        ("insert_cancel", hex(INSERT_CANCEL), V2013),
        ("bandwidth_reservation", hex(BANDWIDTH_RESERVATION), V2013),
    ]
}

#[test]
fn test_insert_with_two_segmentation_descriptors() {
    let buffer = hex(INSERT_TWO_SEGMENTATIONS);
    let (section, bits) =
        decode_splice_info_section(&buffer).expect("Failed to decode splice_insert");

    assert_eq!(bits, 76 * 8);
    assert_eq!(section.table_id, 0xFC);
    assert!(!section.section_syntax_indicator);
    assert!(!section.private_indicator);
    assert_eq!(section.section_length, 73);
    assert_eq!(section.tier, 0);
    assert_eq!(section.cw_index, 0);
    assert_eq!(section.splice_command_length, 15);
    assert_eq!(section.splice_command_type, 0x05);
    assert_eq!(section.descriptor_loop_length, 41);
    assert_eq!(section.crc_32, 0x7F0D_0304);
    assert!(section.alignment_stuffing.is_empty());
    assert_eq!(section.e_crc_32, None);

    let SpliceCommand::SpliceInsert(ref insert) = section.splice_command else {
        panic!("Expected SpliceInsert command");
    };
    assert_eq!(insert.splice_event_id, 2);
    let splice = insert.splice.as_ref().expect("not cancelled");
    assert!(splice.program_splice_flag());
    assert_eq!(
        splice.splice_time(),
        Some(&SpliceTime::from_ticks(8_144_209_717))
    );

    assert_eq!(section.splice_descriptors.len(), 2);
    for descriptor in &section.splice_descriptors {
        assert_eq!(descriptor.splice_descriptor_tag(), 0x02);
        assert_eq!(descriptor.identifier, descriptors::CUEI);
        assert!(descriptor.private_bytes.is_empty());
    }

    let first = section.splice_descriptors[0]
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("First descriptor should be an active segmentation");
    assert_eq!(first.segmentation_duration, Some(2_700_000));
    assert_eq!(first.segmentation_upid, b"2".to_vec());
    assert_eq!(
        first.segmentation_type(),
        SegmentationType::ProviderPlacementOpportunityStart
    );
    assert_eq!(first.sub_segment, None);

    let second = section.splice_descriptors[1]
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("Second descriptor should be an active segmentation");
    assert!(!second.segmentation_duration_flag());
    assert_eq!(
        second.delivery_restrictions,
        Some(DeliveryRestrictions {
            web_delivery_allowed_flag: true,
            no_regional_blackout_flag: true,
            archive_allowed_flag: true,
            device_restrictions: DeviceRestrictions::None,
        })
    );
    assert_eq!(second.segmentation_type_id, 0x35);
}

#[test]
fn test_2017_layout_rejects_insert_with_two_segmentations() {
    // 0x34 without sub-segment bytes overruns its descriptor under the 2017 layout
    let err = decode_with(SchemaVersion::V2017, &hex(INSERT_TWO_SEGMENTATIONS)).unwrap_err();
    assert_eq!(
        err,
        DecodeError::DescriptorLengthMismatch {
            tag: 0x02,
            declared: 136,
            used_by_payload: 152
        }
    );
}

#[test]
fn test_truncated_section_is_rejected() {
    let buffer = hex(INSERT_TWO_SEGMENTATIONS);
    let truncated = &buffer[..buffer.len() - 5];
    let err = decode_splice_info_section(truncated).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InsufficientTrailerBits {
            required: 41 * 8 + 32,
            remaining: 40 * 8
        }
    );
}

#[test]
fn test_truncated_header_is_out_of_bits() {
    let buffer = hex(INSERT_TWO_SEGMENTATIONS);
    assert!(matches!(
        decode_splice_info_section(&buffer[..10]),
        Err(DecodeError::OutOfBits { .. })
    ));
    assert!(matches!(
        decode_splice_info_section(&[]),
        Err(DecodeError::OutOfBits {
            requested: 8,
            remaining: 0,
            offset: 0
        })
    ));
}

#[test]
fn test_insert_with_break_duration_and_avail() {
    let buffer = base64(INSERT_WITH_AVAIL);
    let (section, _) = decode_splice_info_section(&buffer).expect("Failed to decode splice_insert");

    assert_eq!(section.cw_index, 0xFF);
    assert_eq!(section.tier, 0xFFF);
    assert_eq!(section.splice_command_length, 20);
    assert_eq!(section.crc_32, 0x62DB_A30A);

    let SpliceCommand::SpliceInsert(ref insert) = section.splice_command else {
        panic!("Expected SpliceInsert command");
    };
    assert_eq!(insert.splice_event_id, 0x4800_008F);
    let splice = insert.splice.as_ref().expect("not cancelled");
    assert!(splice.out_of_network_indicator);
    assert!(splice.duration_flag());
    assert_eq!(
        splice.splice_time(),
        Some(&SpliceTime::from_ticks(1_936_310_318))
    );
    let break_duration = splice.break_duration.expect("break duration");
    assert!(break_duration.auto_return);
    assert_eq!(break_duration.duration, 5_426_421);
    assert_eq!(break_duration.to_duration().as_secs(), 60);

    assert_eq!(
        section.splice_descriptors[0].payload,
        DescriptorPayload::Avail(AvailDescriptor {
            provider_avail_id: 309
        })
    );
}

#[test]
fn test_time_signal_command() {
    let buffer = base64(TIME_SIGNAL);
    let (section, bits) =
        decode_splice_info_section(&buffer).expect("Failed to decode time_signal");

    assert_eq!(bits, 25 * 8);
    assert_eq!(section.splice_command_type, 0x06);
    assert_eq!(section.crc_32, 0xBB0C_73F4);
    assert!(section.splice_descriptors.is_empty());

    let SpliceCommand::TimeSignal(signal) = section.splice_command else {
        panic!("Expected TimeSignal command");
    };
    assert_eq!(signal.splice_time.pts_time, Some(1_111_111_101));
    let duration = signal.splice_time.to_duration().expect("pts_time");
    assert!(duration > Duration::from_secs(12_345) && duration < Duration::from_secs(12_346));
}

#[test]
fn test_time_signal_with_avail_descriptor() {
    let (section, _) =
        decode_splice_info_section(&base64(TIME_SIGNAL_AVAIL)).expect("Failed to decode");
    assert_eq!(section.descriptor_loop_length, 10);
    assert_eq!(
        section.splice_descriptors[0].payload,
        DescriptorPayload::Avail(AvailDescriptor {
            provider_avail_id: 1234
        })
    );
}

#[test]
fn test_placement_opportunity_end_is_schema_independent() {
    let buffer = base64(PLACEMENT_OPPORTUNITY_END);
    let (v2013, _) = decode_with(SchemaVersion::V2013, &buffer).expect("2013 decode");
    let (v2017, _) = decode_with(SchemaVersion::V2017, &buffer).expect("2017 decode");
    assert_eq!(v2013, v2017);

    let segmentation = v2013.splice_descriptors[0]
        .segmentation()
        .expect("Segmentation descriptor");
    assert_eq!(segmentation.segmentation_event_id, 0x4800_008E);
    let segmentation = segmentation.segmentation.as_ref().expect("not cancelled");
    assert_eq!(segmentation.upid_type(), SegmentationUpidType::AiringID);
    assert_eq!(segmentation.segmentation_upid, hex("000000002ca0a18a"));
    assert_eq!(
        segmentation.segmentation_type(),
        SegmentationType::ProviderPlacementOpportunityEnd
    );
    assert_eq!(segmentation.segment_num, 2);
    assert_eq!(v2013.crc_32, 0xA9CC_6758);
}

#[test]
fn test_placement_opportunity_start_2013_sample() {
    let buffer = base64(PLACEMENT_OPPORTUNITY_START);
    let (section, _) = decode_splice_info_section(&buffer).expect("Failed to decode");

    let segmentation = section.splice_descriptors[0]
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("Active segmentation descriptor");
    assert_eq!(segmentation.segmentation_type_id, 0x34);
    assert_eq!(segmentation.segmentation_duration, Some(27_630_000));
    assert_eq!(segmentation.duration(), Some(Duration::from_secs(307)));
    assert_eq!(segmentation.sub_segment, None);
    assert_eq!(section.crc_32, 0x9AC9_D17E);

    assert!(matches!(
        decode_with(SchemaVersion::V2017, &buffer),
        Err(DecodeError::DescriptorLengthMismatch { tag: 0x02, .. })
    ));
}

#[test]
fn test_sub_segments_2017() {
    let buffer = hex(SUB_SEGMENT_2017);
    let (section, bits) = decode_with(SchemaVersion::V2017, &buffer).expect("Failed to decode");
    assert_eq!(bits, 57 * 8);
    assert_eq!(section.crc_32, 0xB6C1_A0F1);

    let descriptor = &section.splice_descriptors[0];
    assert!(descriptor.private_bytes.is_empty());
    let segmentation = descriptor
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("Active segmentation descriptor");
    assert_eq!(
        segmentation.sub_segment,
        Some(SubSegment {
            sub_segment_num: 154,
            sub_segments_expected: 201
        })
    );

    // the 2013 layout leaves the sub-segment bytes as private bytes
    let (section, _) = decode_with(SchemaVersion::V2013, &buffer).expect("Failed to decode");
    assert_eq!(
        section.splice_descriptors[0].private_bytes,
        vec![0x9A, 0xC9]
    );
}

#[test]
fn test_three_airing_id_descriptors() {
    let (section, _) =
        decode_splice_info_section(&base64(THREE_AIRING_IDS)).expect("Failed to decode");
    let ids: Vec<(u32, u8)> = section
        .splice_descriptors
        .iter()
        .filter_map(SpliceDescriptor::segmentation)
        .map(|s| {
            let segmentation = s.segmentation.as_ref().expect("not cancelled");
            (s.segmentation_event_id, segmentation.segmentation_type_id)
        })
        .collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], (0x4800_00AD, 0x35));
    assert_eq!(ids[1], (0x4800_0026, 0x11));
    assert_eq!(ids[2], (0x4800_0027, 0x10));
}

#[test]
fn test_mpu_upid() {
    let (section, _) = decode_splice_info_section(&base64(MPU_UPID)).expect("Failed to decode");
    let segmentation = section.splice_descriptors[0]
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("Active segmentation descriptor");
    assert_eq!(segmentation.upid_type(), SegmentationUpidType::MPU);
    let upid = upid::format_upid(segmentation.upid_type(), &segmentation.segmentation_upid);
    assert_eq!(upid, "OVLYI");
    assert_eq!(
        segmentation.segmentation_type(),
        SegmentationType::BreakStart
    );
}

#[test]
fn test_crc_is_captured_not_judged_by_default() {
    let buffer = base64(ADID_BAD_CRC);
    let (section, _) = decode_splice_info_section(&buffer).expect("Default decode ignores the CRC");
    assert_eq!(section.crc_32, 0x5913_9BE0);

    let segmentation = section.splice_descriptors[0]
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("Active segmentation descriptor");
    assert_eq!(segmentation.upid_type(), SegmentationUpidType::AdID);
    assert_eq!(segmentation.segmentation_upid, b"ABCD0123456H".to_vec());
}

#[test]
#[cfg(feature = "crc-validation")]
fn test_verify_crc_rejects_bad_crc() {
    let decoder = Decoder::new(DecoderConfig::new().verify_crc(true));
    assert_eq!(
        decoder.decode(&base64(ADID_BAD_CRC)).unwrap_err(),
        DecodeError::CrcMismatch {
            stored: 0x5913_9BE0,
            computed: 0x5B7A_57D8
        }
    );
    assert!(decoder.decode(&base64(TIME_SIGNAL)).is_ok());
}

#[test]
fn test_umid_overrunning_descriptor_length() {
    assert_eq!(
        decode_splice_info_section(&base64(UMID_OVERRUN)).unwrap_err(),
        DecodeError::DescriptorLengthMismatch {
            tag: 0x02,
            declared: 312,
            used_by_payload: 344
        }
    );
}

#[test]
fn test_encrypted_section_with_stuffing() {
    let (section, bits) =
        decode_splice_info_section(&hex(ENCRYPTED_WITH_STUFFING)).expect("Failed to decode");
    assert_eq!(bits, 26 * 8);
    assert!(section.encrypted_packet);
    assert_eq!(section.algorithm(), EncryptionAlgorithm::DesEcb);
    assert_eq!(section.cw_index, 7);
    assert_eq!(section.splice_command, SpliceCommand::SpliceNull);
    assert_eq!(section.alignment_stuffing, vec![0xFF, 0xFF]);
    assert_eq!(section.e_crc_32, Some(0xDEAD_BEEF));
    assert_eq!(section.crc_32, 0x5B72_A74F);
}

#[test]
fn test_splice_schedule_section() {
    let (section, _) = decode_splice_info_section(&hex(SCHEDULE)).expect("Failed to decode");
    let SpliceCommand::SpliceSchedule(schedule) = &section.splice_command else {
        panic!("Expected SpliceSchedule command");
    };
    assert_eq!(schedule.splice_count(), 3);
    assert!(schedule.events[2].splice_event_cancel_indicator());
}

#[test]
fn test_dtmf_avail_and_time_descriptors() {
    let (section, _) = decode_splice_info_section(&hex(DTMF_AVAIL_TIME)).expect("Failed to decode");
    assert_eq!(
        section.splice_command,
        SpliceCommand::TimeSignal(TimeSignal {
            splice_time: SpliceTime::default()
        })
    );

    let tags: Vec<u8> = section
        .splice_descriptors
        .iter()
        .map(SpliceDescriptor::splice_descriptor_tag)
        .collect();
    assert_eq!(tags, vec![0x01, 0x00, 0x03]);

    assert_eq!(
        section.splice_descriptors[0].payload,
        DescriptorPayload::Dtmf(DtmfDescriptor {
            preroll: 177,
            dtmf_chars: "121#".to_string()
        })
    );
    assert_eq!(
        section.splice_descriptors[1].private_bytes,
        vec![0xAA, 0xBB]
    );

    let time = section.splice_descriptors[2]
        .time_descriptor()
        .expect("Tag 0x03 should read as a time descriptor");
    assert_eq!(time.tai_seconds, 1_700_000_000);
    assert_eq!(time.tai_ns, 500);
    assert_eq!(time.utc_offset, 37);
    assert_eq!(section.splice_descriptors[0].time_descriptor(), None);
}

#[test]
fn test_private_command_section() {
    let (section, _) = decode_splice_info_section(&hex(PRIVATE_COMMAND)).expect("Failed to decode");
    assert_eq!(
        section.splice_command,
        SpliceCommand::PrivateCommand(PrivateCommand {
            identifier: 0x4142_4344,
            private_bytes: vec![1, 2, 3]
        })
    );
    assert_eq!(fmt::format_identifier(0x4142_4344), "ABCD");
}

#[test]
fn test_insert_components() {
    let (section, _) =
        decode_splice_info_section(&hex(INSERT_COMPONENTS)).expect("Failed to decode");
    let SpliceCommand::SpliceInsert(insert) = &section.splice_command else {
        panic!("Expected SpliceInsert command");
    };
    let splice = insert.splice.as_ref().expect("not cancelled");
    assert!(splice.out_of_network_indicator);
    assert_eq!(
        splice.mode,
        SpliceMode::Components(vec![
            InsertComponent {
                component_tag: 1,
                splice_time: SpliceTime::from_ticks(0x100)
            },
            InsertComponent {
                component_tag: 2,
                splice_time: SpliceTime::default()
            },
        ])
    );
    assert_eq!(splice.unique_program_id, 7);
}

#[test]
fn test_insert_immediate_components_with_cancelled_segmentation() {
    let (section, _) =
        decode_splice_info_section(&hex(INSERT_IMMEDIATE_COMPONENTS)).expect("Failed to decode");
    let cancelled = section.splice_descriptors[0]
        .segmentation()
        .expect("Segmentation descriptor");
    assert_eq!(cancelled.segmentation_event_id, 0x99);
    assert!(cancelled.segmentation_event_cancel_indicator());
    assert_eq!(section.splice_descriptors[0].descriptor_length, 9);

    let active = section.splice_descriptors[1]
        .segmentation()
        .and_then(|s| s.segmentation.as_ref())
        .expect("Active segmentation descriptor");
    assert!(!active.program_segmentation_flag());
    assert!(active.delivery_not_restricted_flag());
}

#[test]
fn test_cancel_and_bandwidth_sections() {
    let (section, _) = decode_splice_info_section(&hex(INSERT_CANCEL)).expect("Failed to decode");
    let SpliceCommand::SpliceInsert(insert) = &section.splice_command else {
        panic!("Expected SpliceInsert command");
    };
    assert!(insert.splice_event_cancel_indicator());

    let (section, _) =
        decode_splice_info_section(&hex(BANDWIDTH_RESERVATION)).expect("Failed to decode");
    assert_eq!(section.splice_command, SpliceCommand::BandwidthReservation);
    assert_eq!(section.splice_command_length, 0);
}

#[test]
fn test_unsupported_command_type() {
    let buffer = hex("fc301100000000000000fff00001000000000000");
    assert_eq!(
        decode_splice_info_section(&buffer).unwrap_err(),
        DecodeError::UnsupportedCommandType(0x01)
    );
}

#[test]
fn test_command_length_mismatch() {
    // time_signal declaring 6 bytes but using 5
    let buffer = hex("fc301600000000000000fff00606fe423a35bd00000000000000");
    assert_eq!(
        decode_splice_info_section(&buffer).unwrap_err(),
        DecodeError::CommandLengthMismatch {
            declared: 48,
            actual: 40
        }
    );
}

#[test]
fn test_descriptor_shorter_than_identifier() {
    let buffer = hex("fc302000000000000000fff00506fe423a35bd000602034355454900000000");
    assert_eq!(
        decode_splice_info_section(&buffer).unwrap_err(),
        DecodeError::DescriptorLengthUnderflow {
            tag: 0x02,
            declared: 3
        }
    );
}

#[test]
fn test_descriptor_loop_overrun() {
    // loop declares 9 bytes around a 10-byte avail descriptor
    let buffer = hex("fc302500000000000000fff00506fe423a35bd0009000843554549000001350000000000");
    assert_eq!(
        decode_splice_info_section(&buffer).unwrap_err(),
        DecodeError::DescriptorLoopOverrun {
            declared: 72,
            actual: 80
        }
    );
}

#[test]
fn test_decoded_fixtures_satisfy_invariants() {
    for (name, buffer, schema) in valid_fixtures() {
        let (section, bits) = decode_with(schema, &buffer)
            .unwrap_or_else(|err| panic!("{name} failed to decode: {err}"));

        assert_eq!(bits, buffer.len() * 8, "{name}: whole input consumed");
        assert_eq!(section.bit_len(), bits, "{name}: tree size matches input");
        assert_eq!(
            section.section_length as usize,
            buffer.len() - 3,
            "{name}: section_length"
        );
        section
            .validate(schema)
            .unwrap_or_else(|err| panic!("{name} failed validation: {err}"));

        assert_eq!(
            section.splice_command.bit_len(),
            section.splice_command_length as usize * 8,
            "{name}: command length"
        );
        for descriptor in &section.splice_descriptors {
            assert_eq!(
                descriptor.bit_len(),
                16 + descriptor.descriptor_length as usize * 8,
                "{name}: descriptor private bytes fill the declared length"
            );
        }
    }
}

#[test]
fn test_validate_rejects_edited_trees() {
    let (section, _) =
        decode_splice_info_section(&base64(INSERT_WITH_AVAIL)).expect("Failed to decode");

    let mut edited = section.clone();
    edited.splice_command_length += 1;
    assert_eq!(
        edited.validate(SchemaVersion::V2013).unwrap_err(),
        DecodeError::CommandLengthMismatch {
            declared: 168,
            actual: 160
        }
    );

    let mut edited = section.clone();
    edited.splice_descriptors.clear();
    assert_eq!(
        edited.validate(SchemaVersion::V2013).unwrap_err(),
        DecodeError::DescriptorLoopOverrun {
            declared: 80,
            actual: 0
        }
    );

    let mut edited = section.clone();
    edited.splice_command_type = 0x06;
    assert_eq!(
        edited.validate(SchemaVersion::V2013).unwrap_err(),
        DecodeError::InvalidTree {
            field: "splice_command_type",
            reason: "does not match the splice command"
        }
    );

    let mut edited = section.clone();
    edited.e_crc_32 = Some(0);
    assert!(matches!(
        edited.validate(SchemaVersion::V2013),
        Err(DecodeError::InvalidTree { field: "e_crc_32", .. })
    ));

    let mut edited = section;
    edited.pts_adjustment = 1 << 33;
    assert_eq!(
        edited.validate(SchemaVersion::V2013).unwrap_err(),
        DecodeError::InvalidTree {
            field: "pts_adjustment",
            reason: "value does not fit its wire width"
        }
    );
}

#[test]
fn test_validate_checks_sub_segments_against_schema() {
    let (section, _) =
        decode_with(SchemaVersion::V2017, &hex(SUB_SEGMENT_2017)).expect("Failed to decode");
    assert!(section.validate(SchemaVersion::V2017).is_ok());
    assert!(matches!(
        section.validate(SchemaVersion::V2013),
        Err(DecodeError::InvalidTree { .. })
    ));
}

#[test]
#[cfg(feature = "base64")]
fn test_decode_text_payloads() {
    let decoder = Decoder::default();
    let (from_base64, _) = decoder
        .decode_base64(INSERT_WITH_AVAIL)
        .expect("base64 payload");
    let hex_payload = HEXLOWER_PERMISSIVE.encode(&base64(INSERT_WITH_AVAIL));
    let (from_hex, _) = decoder
        .decode_hex(&format!("0x{hex_payload}"))
        .expect("hex payload");
    assert_eq!(from_base64, from_hex);

    assert!(matches!(
        decoder.decode_hex("fc3"),
        Err(DecodeError::InvalidEncoding { encoding: "hex", .. })
    ));
    assert!(matches!(
        decoder.decode_base64("not base64!"),
        Err(DecodeError::InvalidEncoding { encoding: "base64", .. })
    ));
}

#[test]
fn test_decoder_is_shareable_across_threads() {
    let decoder = Decoder::new(DecoderConfig::new().schema(SchemaVersion::V2017));
    let buffer = hex(SUB_SEGMENT_2017);
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let (section, _) = decoder.decode(&buffer).expect("Failed to decode");
                assert_eq!(section.crc_32, 0xB6C1_A0F1);
            });
        }
    });
}
