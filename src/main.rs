use clap::{Parser, ValueEnum};
use scte35_decoder::fmt::{format_as_hex, format_identifier, format_ticks};
use scte35_decoder::time::ticks_to_secs;
use scte35_decoder::upid::format_upid;
use scte35_decoder::{
    DecodeError, Decoder, DecoderConfig, DescriptorPayload, InsertSplice, ScheduleMode,
    SchemaVersion, Segmentation, SegmentationScope, SpliceCommand, SpliceDescriptor,
    SpliceInfoSection, SpliceMode,
};
use serde_json::json;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Hex,
    Base64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

/// Decode an SCTE-35 splice_info_section
#[derive(Parser)]
#[clap(name = "scte35-decoder", version)]
struct Opt {
    /// Encoded splice_info_section payload
    payload: String,

    /// Encoding of the payload argument
    #[clap(long, value_enum, default_value_t = InputFormat::Hex)]
    input: InputFormat,

    /// SCTE-35 revision used for segmentation descriptors (2013 or 2017)
    #[clap(long, default_value_t = SchemaVersion::V2013)]
    schema: SchemaVersion,

    /// Reject sections whose CRC_32 does not match their content
    #[clap(long, default_value_t = false)]
    verify_crc: bool,

    /// Output format
    #[clap(short, long, value_enum, default_value_t = OutputFormat::Json)]
    output: OutputFormat,
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scte35_decoder=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let opt = Opt::parse();
    let config = DecoderConfig::new()
        .schema(opt.schema)
        .verify_crc(opt.verify_crc);
    let decoder = Decoder::new(config);

    let decoded = match opt.input {
        InputFormat::Hex => decoder.decode_hex(&opt.payload),
        InputFormat::Base64 => decoder.decode_base64(&opt.payload),
    };

    match decoded {
        Ok((section, bits)) => {
            match opt.output {
                OutputFormat::Json => print_json(&section, bits),
                OutputFormat::Text => print_text(&section, bits),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err, opt.output);
            ExitCode::FAILURE
        }
    }
}

fn report_error(err: &DecodeError, output: OutputFormat) {
    eprintln!("Error decoding splice_info_section: {err}");
    if output == OutputFormat::Json {
        let report = json!({ "status": "error", "error": err.to_string() });
        println!("{report}");
    }
}

fn print_json(section: &SpliceInfoSection, bits: usize) {
    let document = json!({
        "status": "success",
        "data": section,
        "bits": bits,
    });
    match serde_json::to_string_pretty(&document) {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("Error serializing splice_info_section: {err}"),
    }
}

fn print_text(section: &SpliceInfoSection, bits: usize) {
    println!("Decoded SpliceInfoSection ({bits} bits):");
    println!("  Table ID: 0x{:02X}", section.table_id);
    println!(
        "  Section Syntax Indicator: {}",
        section.section_syntax_indicator
    );
    println!("  Private Indicator: {}", section.private_indicator);
    println!("  Section Length: {}", section.section_length);
    println!("  Protocol Version: {}", section.protocol_version);
    println!("  Encrypted Packet: {}", section.encrypted_packet);
    println!("  Encryption Algorithm: {}", section.algorithm());
    println!("  PTS Adjustment: {}", format_ticks(section.pts_adjustment));
    println!("  CW Index: 0x{:02X}", section.cw_index);
    println!("  Tier: 0x{:03X}", section.tier);
    println!("  Splice Command Length: {}", section.splice_command_length);
    println!(
        "  Splice Command Type: 0x{:02X} ({})",
        section.splice_command_type,
        section.splice_command.splice_command_type()
    );
    print_command(&section.splice_command);

    println!(
        "  Descriptor Loop Length: {}",
        section.descriptor_loop_length
    );
    for (index, descriptor) in section.splice_descriptors.iter().enumerate() {
        print_descriptor(index, descriptor);
    }

    if !section.alignment_stuffing.is_empty() {
        println!(
            "  Alignment Stuffing: {}",
            format_as_hex(&section.alignment_stuffing)
        );
    }
    if let Some(e_crc_32) = section.e_crc_32 {
        println!("  E-CRC-32: 0x{e_crc_32:08X}");
    }
    println!("  CRC-32: 0x{:08X}", section.crc_32);
}

fn print_command(command: &SpliceCommand) {
    match command {
        SpliceCommand::SpliceNull | SpliceCommand::BandwidthReservation => {}
        SpliceCommand::SpliceSchedule(schedule) => {
            println!("    Splice Count: {}", schedule.splice_count());
            for event in &schedule.events {
                println!("    Splice Event ID: 0x{:08X}", event.splice_event_id);
                let Some(splice) = &event.splice else {
                    println!("      Cancelled");
                    continue;
                };
                println!("      Out of Network: {}", splice.out_of_network_indicator);
                match &splice.mode {
                    ScheduleMode::Program { utc_splice_time } => {
                        println!("      UTC Splice Time: {utc_splice_time}");
                    }
                    ScheduleMode::Components(components) => {
                        for component in components {
                            println!(
                                "      Component 0x{:02X}: UTC Splice Time {}",
                                component.component_tag, component.utc_splice_time
                            );
                        }
                    }
                }
                if let Some(duration) = splice.break_duration {
                    println!(
                        "      Break Duration: {} (auto return: {})",
                        format_ticks(duration.duration),
                        duration.auto_return
                    );
                }
                println!("      Unique Program ID: {}", splice.unique_program_id);
                println!(
                    "      Avail: {}/{}",
                    splice.avail_num, splice.avails_expected
                );
            }
        }
        SpliceCommand::SpliceInsert(insert) => {
            println!("    Splice Event ID: 0x{:08X}", insert.splice_event_id);
            match &insert.splice {
                Some(splice) => print_insert(splice),
                None => println!("    Cancelled"),
            }
        }
        SpliceCommand::TimeSignal(signal) => match signal.splice_time.pts_time {
            Some(pts) => println!("    PTS Time: {}", format_ticks(pts)),
            None => println!("    PTS Time: not specified"),
        },
        SpliceCommand::PrivateCommand(private) => {
            println!("    Identifier: {}", format_identifier(private.identifier));
            println!(
                "    Private Bytes: {}",
                format_as_hex(&private.private_bytes)
            );
        }
    }
}

fn print_insert(splice: &InsertSplice) {
    println!("    Out of Network: {}", splice.out_of_network_indicator);
    match &splice.mode {
        SpliceMode::Program(time) => match time.pts_time {
            Some(pts) => println!("    Splice Time: {}", format_ticks(pts)),
            None => println!("    Splice Time: not specified"),
        },
        SpliceMode::ProgramImmediate => println!("    Splice Immediate"),
        SpliceMode::Components(components) => {
            for component in components {
                match component.splice_time.pts_time {
                    Some(pts) => println!(
                        "    Component 0x{:02X}: {}",
                        component.component_tag,
                        format_ticks(pts)
                    ),
                    None => println!(
                        "    Component 0x{:02X}: not specified",
                        component.component_tag
                    ),
                }
            }
        }
        SpliceMode::ComponentsImmediate(tags) => {
            for tag in tags {
                println!("    Component 0x{tag:02X}: immediate");
            }
        }
    }
    if let Some(duration) = splice.break_duration {
        println!(
            "    Break Duration: {} (auto return: {})",
            format_ticks(duration.duration),
            duration.auto_return
        );
    }
    println!("    Unique Program ID: {}", splice.unique_program_id);
    println!("    Avail: {}/{}", splice.avail_num, splice.avails_expected);
}

fn print_descriptor(index: usize, descriptor: &SpliceDescriptor) {
    println!(
        "  Descriptor {index}: tag 0x{:02X}, length {}, identifier {}",
        descriptor.splice_descriptor_tag(),
        descriptor.descriptor_length,
        format_identifier(descriptor.identifier)
    );
    match &descriptor.payload {
        DescriptorPayload::Avail(avail) => {
            println!("    Provider Avail ID: {}", avail.provider_avail_id);
        }
        DescriptorPayload::Dtmf(dtmf) => {
            println!("    Preroll: {:.1}s", f64::from(dtmf.preroll) / 10.0);
            println!("    DTMF Chars: {}", dtmf.dtmf_chars);
        }
        DescriptorPayload::Segmentation(segmentation) => {
            println!(
                "    Segmentation Event ID: 0x{:08X}",
                segmentation.segmentation_event_id
            );
            match &segmentation.segmentation {
                Some(active) => print_segmentation(active),
                None => println!("    Cancelled"),
            }
        }
        DescriptorPayload::Unknown { .. } => {
            if let Some(time) = descriptor.time_descriptor() {
                println!(
                    "    TAI: {}.{:09}s (UTC offset {})",
                    time.tai_seconds, time.tai_ns, time.utc_offset
                );
            }
        }
    }
    if !descriptor.private_bytes.is_empty() {
        println!(
            "    Private Bytes: {}",
            format_as_hex(&descriptor.private_bytes)
        );
    }
}

fn print_segmentation(segmentation: &Segmentation) {
    let type_id = segmentation.segmentation_type_id;
    println!(
        "    Segmentation Type: 0x{type_id:02X} ({})",
        segmentation.segmentation_type().description()
    );
    if let Some(restrictions) = &segmentation.delivery_restrictions {
        println!(
            "    Delivery Restrictions: web {}, no regional blackout {}, archive {}, devices {:?}",
            restrictions.web_delivery_allowed_flag,
            restrictions.no_regional_blackout_flag,
            restrictions.archive_allowed_flag,
            restrictions.device_restrictions
        );
    }
    if let SegmentationScope::Components(components) = &segmentation.scope {
        for component in components {
            println!(
                "    Component 0x{:02X}: PTS offset {}",
                component.component_tag,
                format_ticks(component.pts_offset)
            );
        }
    }
    if let Some(duration) = segmentation.segmentation_duration {
        println!("    Duration: {duration} ({:.3}s)", ticks_to_secs(duration));
    }
    let upid_type = segmentation.upid_type();
    println!(
        "    UPID: {} [{}]",
        format_upid(upid_type, &segmentation.segmentation_upid),
        upid_type.description()
    );
    println!(
        "    Segment: {}/{}",
        segmentation.segment_num, segmentation.segments_expected
    );
    if let Some(sub) = segmentation.sub_segment {
        println!(
            "    Sub-segment: {}/{}",
            sub.sub_segment_num, sub.sub_segments_expected
        );
    }
}
