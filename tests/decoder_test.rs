// ABOUTME: Integration tests for the FIT container decoder
// ABOUTME: Exercises header validation, architectures, compressed timestamps, and degradation policy

mod common;

use common::{
    activity_without_file_id, data, decode_all, definition, definition_be, init_test_logging,
    sample_activity, wrap_container, SAMPLE_TIME_CREATED,
};
use fitmend::fit::decoder::RecordReader;
use fitmend::fit::profile::{mesg_num, FIT_EPOCH_OFFSET_SECS};
use fitmend::fit::DecodeError;
use fitmend::models::FieldValue;

#[test]
fn test_sample_activity_decodes_in_order() {
    init_test_logging();
    let bytes = sample_activity(2);
    let records = decode_all(&bytes);

    assert_eq!(records.len(), 4);
    assert_eq!(records[0].name(), "file_id");
    assert_eq!(records[1].name(), "record");
    assert_eq!(records[2].name(), "record");
    assert_eq!(records[3].name(), "session");

    let file_id = &records[0];
    assert_eq!(file_id.field(0).unwrap().value, FieldValue::UInt(4));
    assert_eq!(file_id.field(1).unwrap().value, FieldValue::UInt(1));
    assert_eq!(file_id.field(6).unwrap().value, FieldValue::UInt(2));

    let heart_rate = records[1].field_by_name("heart_rate").unwrap();
    assert_eq!(heart_rate.value, FieldValue::UInt(120));
}

#[test]
fn test_time_created_decodes_as_timestamp() {
    init_test_logging();
    let records = decode_all(&sample_activity(1));
    let time_created = records[0].field_by_name("time_created").unwrap();

    let FieldValue::Timestamp(at) = &time_created.value else {
        panic!("time_created should decode as a timestamp");
    };
    assert_eq!(
        at.timestamp(),
        i64::from(SAMPLE_TIME_CREATED) + FIT_EPOCH_OFFSET_SECS
    );
}

#[test]
fn test_twelve_byte_header_accepted() {
    init_test_logging();
    let mut records = Vec::new();
    records.extend(definition(0, mesg_num::RECORD, &[(3, 1, 0x02)]));
    records.extend(data(0, &[99]));

    // 12-byte header: no header CRC field
    let mut bytes = vec![12u8, 0x10];
    bytes.extend_from_slice(&2195u16.to_le_bytes());
    bytes.extend_from_slice(&u32::try_from(records.len()).unwrap().to_le_bytes());
    bytes.extend_from_slice(b".FIT");
    bytes.extend_from_slice(&records);
    let crc = fitmend::fit::crc::checksum(&bytes);
    bytes.extend_from_slice(&crc.to_le_bytes());

    let records = decode_all(&bytes);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].field(3).unwrap().value, FieldValue::UInt(99));
}

#[test]
fn test_big_endian_definitions_decode() {
    init_test_logging();
    let mut records = Vec::new();
    records.extend(definition_be(0, mesg_num::RECORD, &[(7, 2, 0x84)]));
    records.extend(data(0, &0x0102u16.to_be_bytes()));
    let bytes = wrap_container(&records);

    let records = decode_all(&bytes);
    assert_eq!(records[0].field(7).unwrap().value, FieldValue::UInt(0x0102));
}

#[test]
fn test_compressed_timestamp_header() {
    init_test_logging();
    let mut records = Vec::new();
    // Normal record carrying a full timestamp establishes the baseline
    records.extend(definition(1, mesg_num::RECORD, &[(253, 4, 0x86), (3, 1, 0x02)]));
    let mut payload = SAMPLE_TIME_CREATED.to_le_bytes().to_vec();
    payload.push(110);
    records.extend(data(1, &payload));

    // Compressed header on a definition without field 253
    records.extend(definition(2, mesg_num::RECORD, &[(3, 1, 0x02)]));
    let offset = ((SAMPLE_TIME_CREATED & 0x1F) as u8 + 3) & 0x1F;
    records.push(0x80 | (2 << 5) | offset);
    records.push(115);

    let decoded = decode_all(&wrap_container(&records));
    assert_eq!(decoded.len(), 2);

    let FieldValue::Timestamp(first) = &decoded[0].field(253).unwrap().value else {
        panic!("baseline timestamp missing");
    };
    let FieldValue::Timestamp(second) = &decoded[1].field(253).unwrap().value else {
        panic!("compressed timestamp missing");
    };
    assert_eq!(second.timestamp() - first.timestamp(), 3);
    assert_eq!(decoded[1].field(3).unwrap().value, FieldValue::UInt(115));
}

#[test]
fn test_developer_fields_are_skipped() {
    init_test_logging();
    let mut records = Vec::new();
    // Definition with one normal field and one 4-byte developer field
    let mut def = vec![0x60, 0, 0];
    def.extend_from_slice(&mesg_num::RECORD.to_le_bytes());
    def.push(1);
    def.extend_from_slice(&[3, 1, 0x02]); // heart_rate
    def.push(1); // one developer field
    def.extend_from_slice(&[0, 4, 0]); // field 0, 4 bytes, dev index 0
    records.extend(def);

    let mut payload = vec![140u8];
    payload.extend_from_slice(&[0xAA; 4]);
    records.extend(data(0, &payload));

    let decoded = decode_all(&wrap_container(&records));
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].fields.len(), 1);
    assert_eq!(decoded[0].field(3).unwrap().value, FieldValue::UInt(140));
}

#[test]
fn test_invalid_sentinel_fields_are_dropped() {
    init_test_logging();
    let mut records = Vec::new();
    records.extend(definition(0, mesg_num::RECORD, &[(3, 1, 0x02), (7, 2, 0x84)]));
    records.extend(data(0, &[0xFF, 0x34, 0x12])); // heart_rate invalid, power valid

    let decoded = decode_all(&wrap_container(&records));
    assert_eq!(decoded[0].fields.len(), 1);
    assert_eq!(decoded[0].field(7).unwrap().value, FieldValue::UInt(0x1234));
}

#[test]
fn test_unknown_message_still_decodes() {
    init_test_logging();
    let mut records = Vec::new();
    records.extend(definition(0, 4242, &[(0, 2, 0x84)]));
    records.extend(data(0, &77u16.to_le_bytes()));

    let decoded = decode_all(&wrap_container(&records));
    assert_eq!(decoded[0].name(), "unknown_4242");
    assert_eq!(decoded[0].field(0).unwrap().value, FieldValue::UInt(77));
}

#[test]
fn test_empty_input_is_distinct_error() {
    assert!(matches!(RecordReader::new(&[]), Err(DecodeError::Empty)));
}

#[test]
fn test_bad_magic_rejected() {
    let mut bytes = sample_activity(1);
    bytes[8] = b'X';
    assert!(matches!(
        RecordReader::new(&bytes),
        Err(DecodeError::InvalidHeader { .. })
    ));
}

#[test]
fn test_corrupted_body_fails_file_crc() {
    let mut bytes = sample_activity(1);
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x40;
    assert!(matches!(
        RecordReader::new(&bytes),
        Err(DecodeError::ChecksumMismatch { .. })
    ));
}

#[test]
fn test_corrupted_header_fails_header_crc() {
    let mut bytes = sample_activity(1);
    bytes[2] ^= 0x01; // profile version byte, covered by the header CRC
    assert!(matches!(
        RecordReader::new(&bytes),
        Err(DecodeError::HeaderChecksumMismatch { .. })
    ));
}

#[test]
fn test_truncated_container_rejected_up_front() {
    let bytes = sample_activity(1);
    let truncated = &bytes[..bytes.len() - 10];
    assert!(matches!(
        RecordReader::new(truncated),
        Err(DecodeError::Truncated { .. })
    ));
}

#[test]
fn test_data_message_without_definition_errors() {
    init_test_logging();
    let records = data(5, &[1, 2, 3]);
    let bytes = wrap_container(&records);

    let mut reader = RecordReader::new(&bytes).unwrap();
    let result = reader.next().unwrap();
    assert!(matches!(
        result,
        Err(DecodeError::UndefinedLocalType { local: 5 })
    ));
    // The iterator fuses after a framing error
    assert!(reader.next().is_none());
}

#[test]
fn test_activity_without_file_id_has_no_file_id_record() {
    init_test_logging();
    let records = decode_all(&activity_without_file_id());
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.is_file_id()));
}
