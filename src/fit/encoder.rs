// ABOUTME: FIT container encoder with automatic definition management and CRC finalization
// ABOUTME: Re-frames Records into definition/data messages, dropping only what the wire cannot carry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! FIT encoding.
//!
//! [`FitEncoder`] consumes [`Record`]s in order and produces a structurally
//! valid container: 14-byte header (with header CRC), interleaved
//! definition and data messages, and the trailing file CRC. Definitions are
//! managed automatically — a record whose field layout matches a live local
//! type reuses it, anything else claims the next of the 16 slots.
//!
//! All output is little-endian regardless of the input file's architecture.
//!
//! Per-field failures drop the field; a record with no encodable fields is
//! dropped whole. Neither aborts the container — only an empty result or a
//! data section overflowing the format's 32-bit size field does.

use std::collections::HashMap;
use tracing::{debug, warn};

use super::crc;
use super::error::{EncodeError, FieldEncodeError};
use super::profile::{self, BaseType};
use crate::models::{Field, FieldValue, Record};

/// Protocol version written into the header (1.0; no developer fields)
const PROTOCOL_VERSION: u8 = 0x10;
/// Profile version written into the header
const PROFILE_VERSION: u16 = 2195;
/// Emitted header size (always includes the header CRC)
const HEADER_SIZE: u8 = 14;

const DEFINITION_BIT: u8 = 0x40;
const LOCAL_TYPE_COUNT: u8 = 16;

/// Outcome of feeding one record to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// Whether the record made it into the container
    pub encoded: bool,
    /// Fields dropped from this record
    pub dropped_fields: usize,
}

/// Layout signature of an encoded record, used to reuse definitions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    global: u16,
    fields: Vec<(u8, u8, u8)>,
}

/// Builds a FIT container from a record sequence
pub struct FitEncoder {
    data: Vec<u8>,
    locals: HashMap<Signature, u8>,
    slot_owner: [Option<Signature>; 16],
    next_local: u8,
    record_count: usize,
    dropped_fields: usize,
    dropped_records: usize,
}

impl Default for FitEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FitEncoder {
    /// Create an empty encoder
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            locals: HashMap::new(),
            slot_owner: Default::default(),
            next_local: 0,
            record_count: 0,
            dropped_fields: 0,
            dropped_records: 0,
        }
    }

    /// Records successfully encoded so far
    #[must_use]
    pub const fn record_count(&self) -> usize {
        self.record_count
    }

    /// Fields dropped across all records so far
    #[must_use]
    pub const fn dropped_fields(&self) -> usize {
        self.dropped_fields
    }

    /// Records dropped whole so far
    #[must_use]
    pub const fn dropped_records(&self) -> usize {
        self.dropped_records
    }

    /// Encode one record, dropping fields the wire cannot carry.
    ///
    /// A record that ends up with no encodable fields is skipped entirely;
    /// the container keeps building either way.
    pub fn add_record(&mut self, record: &Record) -> AddOutcome {
        let mut encoded_fields = Vec::with_capacity(record.fields.len());
        let mut dropped = 0;

        for field in &record.fields {
            match encode_field(field) {
                Ok(encoded) => encoded_fields.push(encoded),
                Err(err) => {
                    dropped += 1;
                    debug!(
                        global = record.global,
                        def_num = field.def_num,
                        %err,
                        "dropping field from record"
                    );
                }
            }
        }
        self.dropped_fields += dropped;

        if encoded_fields.is_empty() || encoded_fields.len() > usize::from(u8::MAX) {
            self.dropped_records += 1;
            warn!(
                global = record.global,
                fields = record.fields.len(),
                "skipping record that cannot be framed"
            );
            return AddOutcome {
                encoded: false,
                dropped_fields: dropped,
            };
        }

        let signature = Signature {
            global: record.global,
            fields: encoded_fields
                .iter()
                .map(|f| (f.def_num, f.bytes.len() as u8, f.base_type.to_wire()))
                .collect(),
        };

        let local = self.local_for(&signature);
        self.data.push(local & 0x0F);
        for field in &encoded_fields {
            self.data.extend_from_slice(&field.bytes);
        }
        self.record_count += 1;

        AddOutcome {
            encoded: true,
            dropped_fields: dropped,
        }
    }

    /// Look up a live local type for this layout, or define a new one
    fn local_for(&mut self, signature: &Signature) -> u8 {
        if let Some(&local) = self.locals.get(signature) {
            return local;
        }

        let local = self.next_local % LOCAL_TYPE_COUNT;
        self.next_local = (local + 1) % LOCAL_TYPE_COUNT;

        // Evict whichever layout held the slot before
        if let Some(previous) = self.slot_owner[usize::from(local)].take() {
            self.locals.remove(&previous);
        }

        self.data.push(DEFINITION_BIT | local);
        self.data.push(0); // reserved
        self.data.push(0); // little-endian architecture
        self.data.extend_from_slice(&signature.global.to_le_bytes());
        self.data.push(signature.fields.len() as u8);
        for &(def_num, size, base_type) in &signature.fields {
            self.data.push(def_num);
            self.data.push(size);
            self.data.push(base_type);
        }

        self.locals.insert(signature.clone(), local);
        self.slot_owner[usize::from(local)] = Some(signature.clone());
        local
    }

    /// Finalize the container: header, records, trailing CRC.
    ///
    /// # Errors
    ///
    /// [`EncodeError::NoRecords`] when nothing was encoded, and
    /// [`EncodeError::DataTooLarge`] when the record section overflows the
    /// header's 32-bit size field.
    pub fn finish(self) -> Result<Vec<u8>, EncodeError> {
        if self.record_count == 0 {
            return Err(EncodeError::NoRecords);
        }
        let data_size = u32::try_from(self.data.len()).map_err(|_| EncodeError::DataTooLarge {
            size: self.data.len(),
        })?;

        let mut out = Vec::with_capacity(usize::from(HEADER_SIZE) + self.data.len() + 2);
        out.push(HEADER_SIZE);
        out.push(PROTOCOL_VERSION);
        out.extend_from_slice(&PROFILE_VERSION.to_le_bytes());
        out.extend_from_slice(&data_size.to_le_bytes());
        out.extend_from_slice(b".FIT");
        let header_crc = crc::checksum(&out[..12]);
        out.extend_from_slice(&header_crc.to_le_bytes());

        out.extend_from_slice(&self.data);

        let file_crc = crc::checksum(&out);
        out.extend_from_slice(&file_crc.to_le_bytes());
        Ok(out)
    }
}

struct EncodedField {
    def_num: u8,
    base_type: BaseType,
    bytes: Vec<u8>,
}

/// Encode a single field value against its declared base type
fn encode_field(field: &Field) -> Result<EncodedField, FieldEncodeError> {
    let def_num = field.def_num;
    let base_type = field.base_type;
    let element = base_type.element_size();

    let bytes = match (&field.value, base_type) {
        (FieldValue::Text(text), BaseType::String) => {
            let mut bytes = text.as_bytes().to_vec();
            bytes.push(0);
            bytes
        }
        (FieldValue::Text(_), _) => return Err(FieldEncodeError::ShapeMismatch { def_num }),

        (FieldValue::Bytes(raw), _) => {
            if raw.len() % element != 0 {
                return Err(FieldEncodeError::ShapeMismatch { def_num });
            }
            raw.clone()
        }

        (FieldValue::Timestamp(at), _) => {
            if base_type != BaseType::UInt32 {
                return Err(FieldEncodeError::ShapeMismatch { def_num });
            }
            let seconds = at.timestamp() - profile::FIT_EPOCH_OFFSET_SECS;
            let seconds =
                u32::try_from(seconds).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            seconds.to_le_bytes().to_vec()
        }

        (FieldValue::Float(value), BaseType::Float32) => {
            (*value as f32).to_le_bytes().to_vec()
        }
        (FieldValue::Float(value), BaseType::Float64) => value.to_le_bytes().to_vec(),
        (FieldValue::Float(_), _) => return Err(FieldEncodeError::ShapeMismatch { def_num }),

        (FieldValue::UInt(value), _) => encode_uint(def_num, base_type, *value)?,
        (FieldValue::SInt(value), _) => encode_sint(def_num, base_type, *value)?,
    };

    if bytes.is_empty() || bytes.len() > usize::from(u8::MAX) {
        return Err(FieldEncodeError::FieldTooLarge {
            def_num,
            size: bytes.len(),
        });
    }

    Ok(EncodedField {
        def_num,
        base_type,
        bytes,
    })
}

fn encode_uint(def_num: u8, base_type: BaseType, value: u64) -> Result<Vec<u8>, FieldEncodeError> {
    let bytes = match base_type {
        BaseType::Enum | BaseType::UInt8 | BaseType::UInt8z => {
            let v = u8::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            vec![v]
        }
        BaseType::UInt16 | BaseType::UInt16z => {
            let v = u16::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            v.to_le_bytes().to_vec()
        }
        BaseType::UInt32 | BaseType::UInt32z => {
            let v = u32::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            v.to_le_bytes().to_vec()
        }
        BaseType::UInt64 | BaseType::UInt64z => value.to_le_bytes().to_vec(),
        // Unsigned model values may land in signed wire fields (sign-agnostic sources)
        BaseType::SInt8 | BaseType::SInt16 | BaseType::SInt32 | BaseType::SInt64 => {
            let signed =
                i64::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            return encode_sint(def_num, base_type, signed);
        }
        _ => return Err(FieldEncodeError::ShapeMismatch { def_num }),
    };
    Ok(bytes)
}

fn encode_sint(def_num: u8, base_type: BaseType, value: i64) -> Result<Vec<u8>, FieldEncodeError> {
    let bytes = match base_type {
        BaseType::SInt8 => {
            let v = i8::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            v.to_le_bytes().to_vec()
        }
        BaseType::SInt16 => {
            let v = i16::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            v.to_le_bytes().to_vec()
        }
        BaseType::SInt32 => {
            let v = i32::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            v.to_le_bytes().to_vec()
        }
        BaseType::SInt64 => value.to_le_bytes().to_vec(),
        _ => {
            let unsigned =
                u64::try_from(value).map_err(|_| FieldEncodeError::OutOfRange { def_num })?;
            return encode_uint(def_num, base_type, unsigned);
        }
    };
    Ok(bytes)
}
