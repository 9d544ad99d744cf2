// ABOUTME: Shared test utilities and synthetic FIT container builders for integration tests
// ABOUTME: Hand-assembles containers byte by byte so codec tests do not depend on the encoder under test
#![allow(dead_code)]

//! Shared test utilities for `fitmend`
//!
//! The builders here assemble FIT containers directly from bytes (header,
//! definition/data messages, CRCs), so decoder tests exercise the wire
//! format rather than whatever the crate's own encoder happens to emit.

use std::sync::Once;

use fitmend::fit::crc;
use fitmend::fit::decoder::RecordReader;
use fitmend::models::Record;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Raw FIT seconds used for `time_created` in synthetic files
pub const SAMPLE_TIME_CREATED: u32 = 1_000_000_000;

/// Wrap raw record bytes in a valid 14-byte header and trailing CRC
pub fn wrap_container(records: &[u8]) -> Vec<u8> {
    let mut out = vec![14u8, 0x10];
    out.extend_from_slice(&2195u16.to_le_bytes());
    out.extend_from_slice(&u32::try_from(records.len()).unwrap().to_le_bytes());
    out.extend_from_slice(b".FIT");
    let header_crc = crc::checksum(&out[..12]);
    out.extend_from_slice(&header_crc.to_le_bytes());

    out.extend_from_slice(records);
    let file_crc = crc::checksum(&out);
    out.extend_from_slice(&file_crc.to_le_bytes());
    out
}

/// A little-endian definition message: `(def_num, size, base_type)` triples
pub fn definition(local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut out = vec![0x40 | (local & 0x0F), 0, 0];
    out.extend_from_slice(&global.to_le_bytes());
    out.push(u8::try_from(fields.len()).unwrap());
    for &(def_num, size, base_type) in fields {
        out.push(def_num);
        out.push(size);
        out.push(base_type);
    }
    out
}

/// A big-endian definition message
pub fn definition_be(local: u8, global: u16, fields: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut out = vec![0x40 | (local & 0x0F), 0, 1];
    out.extend_from_slice(&global.to_be_bytes());
    out.push(u8::try_from(fields.len()).unwrap());
    for &(def_num, size, base_type) in fields {
        out.push(def_num);
        out.push(size);
        out.push(base_type);
    }
    out
}

/// A data message for the given local type
pub fn data(local: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![local & 0x0F];
    out.extend_from_slice(payload);
    out
}

/// Decode a container into records, panicking on any error
pub fn decode_all(bytes: &[u8]) -> Vec<Record> {
    RecordReader::new(bytes)
        .expect("container should validate")
        .collect::<Result<Vec<_>, _>>()
        .expect("records should decode")
}

/// A small realistic activity: `file_id` (with the given sport wire value),
/// two `record` messages, and a `session`
pub fn sample_activity(sport_value: u8) -> Vec<u8> {
    let mut records = Vec::new();

    // file_id: type, manufacturer, time_created, sport
    records.extend(definition(
        0,
        0,
        &[(0, 1, 0x00), (1, 2, 0x84), (4, 4, 0x86), (6, 1, 0x00)],
    ));
    let mut file_id = vec![4u8];
    file_id.extend_from_slice(&1u16.to_le_bytes());
    file_id.extend_from_slice(&SAMPLE_TIME_CREATED.to_le_bytes());
    file_id.push(sport_value);
    records.extend(data(0, &file_id));

    // record: timestamp, heart_rate, power
    records.extend(definition(
        1,
        20,
        &[(253, 4, 0x86), (3, 1, 0x02), (7, 2, 0x84)],
    ));
    for (offset, heart_rate, power) in [(0u32, 120u8, 180u16), (1, 125, 210)] {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(SAMPLE_TIME_CREATED + offset).to_le_bytes());
        payload.push(heart_rate);
        payload.extend_from_slice(&power.to_le_bytes());
        records.extend(data(1, &payload));
    }

    // session: sport, avg_heart_rate
    records.extend(definition(2, 18, &[(5, 1, 0x00), (16, 1, 0x02)]));
    records.extend(data(2, &[sport_value, 122]));

    wrap_container(&records)
}

/// An activity with no `file_id` record at all
pub fn activity_without_file_id() -> Vec<u8> {
    let mut records = Vec::new();
    records.extend(definition(0, 20, &[(3, 1, 0x02)]));
    records.extend(data(0, &[118]));
    records.extend(data(0, &[121]));
    wrap_container(&records)
}
