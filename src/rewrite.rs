// ABOUTME: Sport rewrite orchestration: validate, decode, mutate file_id, re-encode, fall back on failure
// ABOUTME: The only mutation this service performs - one field of one record, everything else preserved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! The sport rewrite pipeline.
//!
//! `VALIDATE_SPORT → DECODE → MUTATE → ENCODE`, where only the first step
//! (and a completely empty upload) can fail the operation outright. Any
//! failure in decode/mutate/encode falls back to returning the original
//! bytes untouched, paired with a warning — the caller always gets either a
//! valid file or an explicit error, never a corrupted one.

use chrono::Utc;
use tracing::{info, warn};

use crate::fit::decoder::RecordReader;
use crate::fit::encoder::FitEncoder;
use crate::fit::profile::{file_id_fields, mesg_num, BaseType};
use crate::models::{Field, FieldValue, FileType, Manufacturer, Record, Sport, UnknownSport};

/// Serial number placeholder written into synthesized `file_id` records
const SYNTHESIZED_SERIAL: u64 = 0x1234_5678;

/// Fatal rewrite failures.
///
/// Everything else degrades to [`RewriteOutcome::fallback`].
#[derive(Debug, thiserror::Error)]
pub enum RewriteError {
    /// The requested sport is not one of the canonical values
    #[error(transparent)]
    InvalidSport(#[from] UnknownSport),

    /// The upload contained no bytes at all
    #[error("uploaded file is empty")]
    EmptyInput,
}

/// Result of a rewrite: the bytes to return plus an optional warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    /// File to hand back to the caller
    pub bytes: Vec<u8>,
    /// Present when the rewrite was skipped or partially degraded
    pub warning: Option<String>,
}

impl RewriteOutcome {
    fn rewritten(bytes: Vec<u8>, warning: Option<String>) -> Self {
        Self { bytes, warning }
    }

    fn fallback(original: &[u8], reason: &str) -> Self {
        Self {
            bytes: original.to_vec(),
            warning: Some(format!(
                "Could not rewrite the sport field: {reason}. Returning the original file."
            )),
        }
    }

    /// Whether this outcome fell back to the original bytes
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.warning
            .as_deref()
            .is_some_and(|w| w.starts_with("Could not rewrite"))
    }
}

/// Rewrite the sport classification of a FIT upload.
///
/// The sport string is validated before any byte of the container is
/// parsed. On success the returned bytes are a freshly encoded container
/// whose `file_id.sport` equals the request; on any decode/encode failure
/// the original bytes come back with a warning instead.
///
/// # Errors
///
/// [`RewriteError::InvalidSport`] for a sport outside the canonical set and
/// [`RewriteError::EmptyInput`] for a zero-length upload. Nothing else
/// errors — corrupt containers take the fallback path.
pub fn rewrite_sport(input: &[u8], requested: &str) -> Result<RewriteOutcome, RewriteError> {
    let sport: Sport = requested.parse()?;
    if input.is_empty() {
        return Err(RewriteError::EmptyInput);
    }

    match try_rewrite(input, sport) {
        Ok(outcome) => Ok(outcome),
        Err(reason) => {
            warn!(%sport, %reason, "sport rewrite failed, returning original bytes");
            Ok(RewriteOutcome::fallback(input, &reason))
        }
    }
}

/// Decode, mutate, and re-encode; any error here is a fallback reason
fn try_rewrite(input: &[u8], sport: Sport) -> Result<RewriteOutcome, String> {
    let reader = RecordReader::new(input).map_err(|e| e.to_string())?;
    let records = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    info!(records = records.len(), "decoded FIT container");

    let records = apply_sport(records, sport);

    let mut encoder = FitEncoder::new();
    for record in &records {
        encoder.add_record(record);
    }
    let dropped_fields = encoder.dropped_fields();
    let dropped_records = encoder.dropped_records();
    let bytes = encoder.finish().map_err(|e| e.to_string())?;

    info!(
        %sport,
        dropped_fields,
        dropped_records,
        size = bytes.len(),
        "re-encoded FIT container"
    );

    let warning = (dropped_fields > 0 || dropped_records > 0).then(|| {
        format!(
            "Sport rewritten to '{sport}', but {dropped_fields} field(s) and \
             {dropped_records} record(s) could not be re-encoded and were dropped."
        )
    });
    Ok(RewriteOutcome::rewritten(bytes, warning))
}

/// Overwrite the sport of the first `file_id` record, synthesizing one at
/// the front of the container when the file has none. Every other record
/// passes through unchanged, in original order.
#[must_use]
pub fn apply_sport(mut records: Vec<Record>, sport: Sport) -> Vec<Record> {
    let sport_field = Field {
        def_num: file_id_fields::SPORT,
        base_type: BaseType::Enum,
        value: FieldValue::UInt(u64::from(sport.wire_value())),
    };

    match records.iter_mut().find(|r| r.is_file_id()) {
        Some(file_id) => {
            info!(%sport, "overwriting sport on existing file_id record");
            file_id.set_field(sport_field);
        }
        None => {
            info!(%sport, "no file_id record found, synthesizing one");
            records.insert(0, synthesize_file_id(sport));
        }
    }
    records
}

/// Build a `file_id` record with activity defaults and the requested sport
fn synthesize_file_id(sport: Sport) -> Record {
    let mut record = Record::new(mesg_num::FILE_ID);
    record.fields.push(Field {
        def_num: file_id_fields::TYPE,
        base_type: BaseType::Enum,
        value: FieldValue::UInt(u64::from(FileType::Activity.wire_value())),
    });
    record.fields.push(Field {
        def_num: file_id_fields::MANUFACTURER,
        base_type: BaseType::UInt16,
        value: FieldValue::UInt(u64::from(Manufacturer::Development.wire_value())),
    });
    record.fields.push(Field {
        def_num: file_id_fields::PRODUCT,
        base_type: BaseType::UInt16,
        value: FieldValue::UInt(0),
    });
    record.fields.push(Field {
        def_num: file_id_fields::SERIAL_NUMBER,
        base_type: BaseType::UInt32z,
        value: FieldValue::UInt(SYNTHESIZED_SERIAL),
    });
    record.fields.push(Field {
        def_num: file_id_fields::TIME_CREATED,
        base_type: BaseType::UInt32,
        value: FieldValue::Timestamp(Utc::now()),
    });
    record.fields.push(Field {
        def_num: file_id_fields::SPORT,
        base_type: BaseType::Enum,
        value: FieldValue::UInt(u64::from(sport.wire_value())),
    });
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sport_fails_before_decoding() {
        // Garbage bytes: if decoding ran first this would fall back instead
        let err = rewrite_sport(&[0xDE, 0xAD], "unicycling").unwrap_err();
        assert!(matches!(err, RewriteError::InvalidSport(_)));
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let err = rewrite_sport(&[], "running").unwrap_err();
        assert!(matches!(err, RewriteError::EmptyInput));
    }

    #[test]
    fn test_corrupt_input_falls_back_to_original() {
        let input = vec![0x0E, 0x10, 0x00, 0x00, 0xFF, 0xFF];
        let outcome = rewrite_sport(&input, "cycling").unwrap();
        assert_eq!(outcome.bytes, input);
        assert!(outcome.is_fallback());
        assert!(!outcome.warning.unwrap().is_empty());
    }

    #[test]
    fn test_apply_sport_synthesizes_missing_file_id() {
        let records = vec![Record::new(mesg_num::RECORD)];
        let result = apply_sport(records, Sport::Walking);

        assert_eq!(result.len(), 2);
        assert!(result[0].is_file_id());
        let sport = result[0].field(file_id_fields::SPORT).unwrap();
        assert_eq!(
            sport.value,
            FieldValue::UInt(u64::from(Sport::Walking.wire_value()))
        );
        assert!(result[0].field(file_id_fields::TIME_CREATED).is_some());
        assert!(result[0].field(file_id_fields::TYPE).is_some());
    }

    #[test]
    fn test_apply_sport_preserves_other_file_id_fields() {
        let mut file_id = Record::new(mesg_num::FILE_ID);
        file_id.fields.push(Field {
            def_num: file_id_fields::MANUFACTURER,
            base_type: BaseType::UInt16,
            value: FieldValue::UInt(1),
        });
        file_id.fields.push(Field {
            def_num: file_id_fields::SPORT,
            base_type: BaseType::Enum,
            value: FieldValue::UInt(u64::from(Sport::Running.wire_value())),
        });

        let result = apply_sport(vec![file_id], Sport::Swimming);
        assert_eq!(result.len(), 1);
        assert_eq!(
            result[0].field(file_id_fields::MANUFACTURER).unwrap().value,
            FieldValue::UInt(1)
        );
        assert_eq!(
            result[0].field(file_id_fields::SPORT).unwrap().value,
            FieldValue::UInt(u64::from(Sport::Swimming.wire_value()))
        );
    }

    #[test]
    fn test_apply_sport_leaves_later_file_ids_alone() {
        let first = Record::new(mesg_num::FILE_ID);
        let second = Record::new(mesg_num::FILE_ID);
        let result = apply_sport(vec![first, second], Sport::Hiking);

        assert_eq!(result.len(), 2);
        assert!(result[0].field(file_id_fields::SPORT).is_some());
        assert!(result[1].field(file_id_fields::SPORT).is_none());
    }
}
