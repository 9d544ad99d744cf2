// ABOUTME: FIT container decoder: header validation, definition tracking, and lazy record iteration
// ABOUTME: Verifies container integrity up front, then yields data messages as typed Records in file order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! FIT decoding.
//!
//! [`RecordReader::new`] validates the container as a whole (header shape,
//! declared data size, optional header CRC, trailing file CRC) before any
//! record is produced. Iteration then walks the record stream lazily:
//! definition messages update the local-type table, data messages decode
//! against it and come out as [`Record`]s.
//!
//! Decoding is read-only and total over the supported format: fields the
//! profile cannot represent (developer data, unsupported base types,
//! big-endian arrays, invalid sentinels) are dropped from their record
//! rather than failing the file.

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::crc;
use super::error::DecodeError;
use super::profile::{self, BaseType};
use crate::models::{Field, FieldValue, Record};

/// Minimum legal header size (no header CRC)
const HEADER_SIZE_MIN: u8 = 12;
/// Header size with the trailing header CRC
const HEADER_SIZE_WITH_CRC: u8 = 14;
/// Magic tag at header bytes 8..12
const MAGIC: &[u8; 4] = b".FIT";
/// Size of the trailing container CRC
const FILE_CRC_LEN: usize = 2;

/// Record header bit layout
const COMPRESSED_HEADER_BIT: u8 = 0x80;
const DEFINITION_BIT: u8 = 0x40;
const DEV_DATA_BIT: u8 = 0x20;
const LOCAL_TYPE_MASK: u8 = 0x0F;

/// Parsed file header
#[derive(Debug, Clone, Copy)]
pub struct FileHeader {
    /// Header length in bytes (12 or 14)
    pub header_size: u8,
    /// Protocol version byte
    pub protocol_version: u8,
    /// Profile version
    pub profile_version: u16,
    /// Byte count of the record section
    pub data_size: u32,
}

/// One field of a definition message
#[derive(Debug, Clone, Copy)]
struct FieldDef {
    def_num: u8,
    size: u8,
    /// `None` when the base type byte is outside the supported set
    base_type: Option<BaseType>,
}

/// An active definition for one local message type
#[derive(Debug, Clone)]
struct Definition {
    big_endian: bool,
    global: u16,
    fields: Vec<FieldDef>,
    /// Total size of developer-data fields appended to each data message
    dev_data_size: usize,
}

impl Definition {
    fn data_size(&self) -> usize {
        self.fields.iter().map(|f| usize::from(f.size)).sum::<usize>() + self.dev_data_size
    }
}

/// Lazy iterator over the data messages of a FIT container.
///
/// Construction validates the container; iteration yields [`Record`]s in
/// file order and stops at the first framing error.
#[derive(Debug)]
pub struct RecordReader<'a> {
    /// Record section only (header and trailing CRC already stripped)
    data: &'a [u8],
    pos: usize,
    header: FileHeader,
    definitions: [Option<Definition>; 16],
    /// Raw FIT seconds of the last decoded timestamp field, for
    /// compressed-timestamp headers
    last_timestamp: Option<u32>,
    failed: bool,
}

impl<'a> RecordReader<'a> {
    /// Validate a FIT container and position a reader at its first record.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] when the buffer is empty, shorter than the
    /// declared sizes, carries a bad magic/header, or fails either CRC.
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        let header = Self::parse_header(bytes)?;

        let header_size = usize::from(header.header_size);
        let data_size = header.data_size as usize;
        let total = header_size + data_size + FILE_CRC_LEN;
        if bytes.len() < total {
            return Err(DecodeError::Truncated {
                context: "record section",
                needed: total,
                available: bytes.len(),
            });
        }

        let crc_offset = header_size + data_size;
        let expected = u16::from_le_bytes([bytes[crc_offset], bytes[crc_offset + 1]]);
        let computed = crc::checksum(&bytes[..crc_offset]);
        if expected != computed {
            return Err(DecodeError::ChecksumMismatch { expected, computed });
        }

        trace!(
            data_size = header.data_size,
            protocol_version = header.protocol_version,
            "FIT container validated"
        );

        Ok(Self {
            data: &bytes[header_size..crc_offset],
            pos: 0,
            header,
            definitions: Default::default(),
            last_timestamp: None,
            failed: false,
        })
    }

    /// The validated file header
    #[must_use]
    pub const fn header(&self) -> FileHeader {
        self.header
    }

    fn parse_header(bytes: &[u8]) -> Result<FileHeader, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        if bytes.len() < usize::from(HEADER_SIZE_MIN) {
            return Err(DecodeError::InvalidHeader {
                reason: "shorter than the minimum 12-byte header",
            });
        }

        let header_size = bytes[0];
        if header_size != HEADER_SIZE_MIN && header_size != HEADER_SIZE_WITH_CRC {
            return Err(DecodeError::InvalidHeader {
                reason: "header size must be 12 or 14",
            });
        }
        if bytes.len() < usize::from(header_size) {
            return Err(DecodeError::InvalidHeader {
                reason: "buffer shorter than declared header size",
            });
        }
        if &bytes[8..12] != MAGIC {
            return Err(DecodeError::InvalidHeader {
                reason: "missing .FIT magic tag",
            });
        }

        if header_size == HEADER_SIZE_WITH_CRC {
            let expected = u16::from_le_bytes([bytes[12], bytes[13]]);
            // A zero header CRC means the writer skipped it
            if expected != 0 {
                let computed = crc::checksum(&bytes[..12]);
                if expected != computed {
                    return Err(DecodeError::HeaderChecksumMismatch { expected, computed });
                }
            }
        }

        Ok(FileHeader {
            header_size,
            protocol_version: bytes[1],
            profile_version: u16::from_le_bytes([bytes[2], bytes[3]]),
            data_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    fn take(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        let available = self.data.len() - self.pos;
        if available < len {
            return Err(DecodeError::Truncated {
                context,
                needed: len,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_definition(&mut self, header_byte: u8) -> Result<(), DecodeError> {
        let local = header_byte & LOCAL_TYPE_MASK;
        let fixed = self.take(5, "definition message")?;
        let big_endian = fixed[1] != 0;
        let global = if big_endian {
            u16::from_be_bytes([fixed[2], fixed[3]])
        } else {
            u16::from_le_bytes([fixed[2], fixed[3]])
        };
        let num_fields = usize::from(fixed[4]);

        let field_bytes = self.take(num_fields * 3, "field definitions")?;
        let mut fields = Vec::with_capacity(num_fields);
        for chunk in field_bytes.chunks_exact(3) {
            fields.push(FieldDef {
                def_num: chunk[0],
                size: chunk[1],
                base_type: BaseType::from_wire(chunk[2]),
            });
        }

        // Developer fields are defined per message but never carried into
        // the model; their per-record byte count is all the reader needs.
        let mut dev_data_size = 0;
        if header_byte & DEV_DATA_BIT != 0 {
            let count = usize::from(self.take(1, "developer field count")?[0]);
            let dev_defs = self.take(count * 3, "developer field definitions")?;
            dev_data_size = dev_defs.chunks_exact(3).map(|c| usize::from(c[1])).sum();
            debug!(global, count, "dropping developer fields from definition");
        }

        trace!(local, global, num_fields, "definition message");
        self.definitions[usize::from(local)] = Some(Definition {
            big_endian,
            global,
            fields,
            dev_data_size,
        });
        Ok(())
    }

    fn read_data(&mut self, local: u8, compressed_offset: Option<u8>) -> Result<Record, DecodeError> {
        let definition = self.definitions[usize::from(local)]
            .clone()
            .ok_or(DecodeError::UndefinedLocalType { local })?;

        let payload = self.take(definition.data_size(), "data message")?;
        let mut record = Record::new(definition.global);
        let mut offset = 0;

        for field_def in &definition.fields {
            let size = usize::from(field_def.size);
            let raw = &payload[offset..offset + size];
            offset += size;

            let Some(base_type) = field_def.base_type else {
                debug!(
                    global = definition.global,
                    def_num = field_def.def_num,
                    "dropping field with unsupported base type"
                );
                continue;
            };

            if let Some(value) =
                self.decode_value(&definition, field_def.def_num, base_type, raw)
            {
                record.fields.push(Field {
                    def_num: field_def.def_num,
                    base_type,
                    value,
                });
            }
        }

        if let Some(offset_bits) = compressed_offset {
            self.apply_compressed_timestamp(&mut record, offset_bits);
        }

        Ok(record)
    }

    /// Decode one field value, or `None` when the field should be dropped
    fn decode_value(
        &mut self,
        definition: &Definition,
        def_num: u8,
        base_type: BaseType,
        raw: &[u8],
    ) -> Option<FieldValue> {
        match base_type {
            BaseType::String => {
                let text = raw.split(|&b| b == 0).next().unwrap_or(raw);
                if text.is_empty() {
                    return None;
                }
                std::str::from_utf8(text).ok().map(|s| FieldValue::Text(s.to_owned()))
            }
            BaseType::Byte => {
                if raw.iter().all(|&b| b == 0xFF) {
                    return None;
                }
                Some(FieldValue::Bytes(raw.to_vec()))
            }
            _ => self.decode_numeric(definition, def_num, base_type, raw),
        }
    }

    fn decode_numeric(
        &mut self,
        definition: &Definition,
        def_num: u8,
        base_type: BaseType,
        raw: &[u8],
    ) -> Option<FieldValue> {
        let element = base_type.element_size();
        if raw.len() != element {
            // Arrays survive as raw bytes only when byte order cannot bite:
            // the encoder always writes little-endian.
            if raw.len() % element == 0 && (!definition.big_endian || element == 1) {
                if raw.iter().all(|&b| b == 0xFF) {
                    return None;
                }
                return Some(FieldValue::Bytes(raw.to_vec()));
            }
            debug!(
                global = definition.global,
                def_num, "dropping array field the encoder cannot reproduce"
            );
            return None;
        }

        match base_type {
            BaseType::SInt8 | BaseType::SInt16 | BaseType::SInt32 | BaseType::SInt64 => {
                let value = read_sint(raw, definition.big_endian);
                if base_type.is_invalid_sint(value) {
                    return None;
                }
                Some(FieldValue::SInt(value))
            }
            BaseType::Float32 => {
                let bits = read_uint(raw, definition.big_endian) as u32;
                let value = f32::from_bits(bits);
                value.is_finite().then(|| FieldValue::Float(f64::from(value)))
            }
            BaseType::Float64 => {
                let bits = read_uint(raw, definition.big_endian);
                let value = f64::from_bits(bits);
                value.is_finite().then_some(FieldValue::Float(value))
            }
            _ => {
                let value = read_uint(raw, definition.big_endian);
                if base_type.is_invalid_uint(value) {
                    return None;
                }
                if profile::is_date_time(definition.global, def_num) {
                    // Track raw seconds for compressed-timestamp headers
                    if def_num == 253 {
                        self.last_timestamp = Some(value as u32);
                    }
                    return fit_seconds_to_datetime(value as u32).map(FieldValue::Timestamp);
                }
                Some(FieldValue::UInt(value))
            }
        }
    }

    fn apply_compressed_timestamp(&mut self, record: &mut Record, offset_bits: u8) {
        let Some(last) = self.last_timestamp else {
            debug!("compressed timestamp with no prior timestamp, dropping the field");
            return;
        };
        let offset = u32::from(offset_bits & 0x1F);
        let mut seconds = (last & !0x1F) | offset;
        if seconds < last {
            seconds += 0x20;
        }
        self.last_timestamp = Some(seconds);
        if let Some(timestamp) = fit_seconds_to_datetime(seconds) {
            record.set_field(Field {
                def_num: 253,
                base_type: BaseType::UInt32,
                value: FieldValue::Timestamp(timestamp),
            });
        }
    }

    fn next_record(&mut self) -> Result<Option<Record>, DecodeError> {
        loop {
            if self.pos >= self.data.len() {
                return Ok(None);
            }
            let header_byte = self.take(1, "record header")?[0];

            if header_byte & COMPRESSED_HEADER_BIT != 0 {
                let local = (header_byte >> 5) & 0x03;
                let offset = header_byte & 0x1F;
                return self.read_data(local, Some(offset)).map(Some);
            }
            if header_byte & DEFINITION_BIT != 0 {
                self.read_definition(header_byte)?;
                continue;
            }
            let local = header_byte & LOCAL_TYPE_MASK;
            return self.read_data(local, None).map(Some);
        }
    }
}

impl Iterator for RecordReader<'_> {
    type Item = Result<Record, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Convert raw FIT seconds to a UTC timestamp
fn fit_seconds_to_datetime(seconds: u32) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(i64::from(seconds) + profile::FIT_EPOCH_OFFSET_SECS, 0)
}

fn read_uint(raw: &[u8], big_endian: bool) -> u64 {
    let mut value: u64 = 0;
    if big_endian {
        for &byte in raw {
            value = (value << 8) | u64::from(byte);
        }
    } else {
        for &byte in raw.iter().rev() {
            value = (value << 8) | u64::from(byte);
        }
    }
    value
}

fn read_sint(raw: &[u8], big_endian: bool) -> i64 {
    let unsigned = read_uint(raw, big_endian);
    let bits = raw.len() * 8;
    if bits == 64 {
        return unsigned as i64;
    }
    // Sign-extend from the field's width
    let sign_bit = 1u64 << (bits - 1);
    if unsigned & sign_bit != 0 {
        (unsigned as i64) - (1i64 << bits)
    } else {
        unsigned as i64
    }
}
