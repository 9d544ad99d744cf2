// ABOUTME: Domain model for FIT containers: records, typed field values, and sport classification
// ABOUTME: Defines the Sport enum with parsing/display plus the Record/Field types shared by codec and rewriter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Core data model shared by the decoder, mutator, and re-encoder.
//!
//! A decoded FIT file is an ordered sequence of [`Record`]s. Each record
//! carries its global message number plus the fields that survived decoding,
//! and each [`Field`] keeps enough wire metadata (definition number and base
//! type) for the encoder to re-frame it without guessing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fit::profile::{self, BaseType};

/// Canonical sport classifications accepted by the rewriter.
///
/// This is a closed set: anything else is rejected before a single byte of
/// the upload is parsed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    /// Unspecified activity
    Generic,
    /// Running activity
    Running,
    /// Cycling/biking activity
    Cycling,
    /// Swimming activity
    Swimming,
    /// Hiking activity
    Hiking,
    /// Walking activity
    Walking,
    /// Trail running
    TrailRunning,
}

impl Sport {
    /// All canonical values, in the order the upload form presents them
    pub const ALL: [Self; 7] = [
        Self::Generic,
        Self::Running,
        Self::Cycling,
        Self::Swimming,
        Self::Hiking,
        Self::Walking,
        Self::TrailRunning,
    ];

    /// The canonical string form, matching the form field values
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Running => "running",
            Self::Cycling => "cycling",
            Self::Swimming => "swimming",
            Self::Hiking => "hiking",
            Self::Walking => "walking",
            Self::TrailRunning => "trail_running",
        }
    }

    /// The wire value written into the `file_id.sport` field
    #[must_use]
    pub const fn wire_value(&self) -> u8 {
        match self {
            Self::Generic => profile::sport_values::GENERIC,
            Self::Running => profile::sport_values::RUNNING,
            Self::Cycling => profile::sport_values::CYCLING,
            Self::Swimming => profile::sport_values::SWIMMING,
            Self::Hiking => profile::sport_values::HIKING,
            Self::Walking => profile::sport_values::WALKING,
            Self::TrailRunning => profile::sport_values::TRAIL_RUNNING,
        }
    }

    /// Map a decoded wire value back to a canonical sport, if it is one
    #[must_use]
    pub fn from_wire_value(value: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.wire_value() == value)
    }
}

impl FromStr for Sport {
    type Err = UnknownSport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(Self::Generic),
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            "swimming" => Ok(Self::Swimming),
            "hiking" => Ok(Self::Hiking),
            "walking" => Ok(Self::Walking),
            "trail_running" => Ok(Self::TrailRunning),
            other => Err(UnknownSport(other.to_owned())),
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error produced when a requested sport is not in the canonical set
#[derive(Debug, Clone, thiserror::Error)]
#[error("'{0}' is not a valid sport")]
pub struct UnknownSport(pub String);

/// FIT file types relevant to the rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Activity file (the only type this service synthesizes)
    Activity,
}

impl FileType {
    /// Wire value from the FIT `file` type enum
    #[must_use]
    pub const fn wire_value(&self) -> u8 {
        match self {
            Self::Activity => profile::file_type_values::ACTIVITY,
        }
    }
}

/// Manufacturer identifiers used when synthesizing a `file_id` record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manufacturer {
    /// Development/unbranded placeholder manufacturer
    Development,
}

impl Manufacturer {
    /// Wire value from the FIT manufacturer enum
    #[must_use]
    pub const fn wire_value(&self) -> u16 {
        match self {
            Self::Development => profile::manufacturer_values::DEVELOPMENT,
        }
    }
}

/// A decoded field value.
///
/// Values the format marks as invalid (the all-ones sentinel per base type)
/// never reach this enum; the decoder drops such fields instead, matching
/// the upstream tooling that filters out absent values.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Unsigned integer (covers enum, uintN, and uintNz base types)
    UInt(u64),
    /// Signed integer
    SInt(i64),
    /// Floating point
    Float(f64),
    /// Null-terminated UTF-8 string
    Text(String),
    /// Date-time field, held with millisecond precision in the model
    Timestamp(DateTime<Utc>),
    /// Raw bytes: byte-array fields and little-endian numeric arrays
    Bytes(Vec<u8>),
}

impl FieldValue {
    /// Unsigned view of the value, when it has one
    #[must_use]
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::SInt(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }
}

/// One field of a record, with the wire metadata needed to re-encode it
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field definition number within the message
    pub def_num: u8,
    /// Base type the field was defined with
    pub base_type: BaseType,
    /// Decoded value
    pub value: FieldValue,
}

impl Field {
    /// Field name from the profile catalog, if the message defines one
    #[must_use]
    pub fn name(&self, global: u16) -> Option<&'static str> {
        profile::field_name(global, self.def_num)
    }
}

/// One record of a FIT container: a global message number plus its fields
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Global message number (`file_id` = 0, `record` = 20, ...)
    pub global: u16,
    /// Fields in definition order
    pub fields: Vec<Field>,
}

impl Record {
    /// Create an empty record for the given global message number
    #[must_use]
    pub const fn new(global: u16) -> Self {
        Self {
            global,
            fields: Vec::new(),
        }
    }

    /// Message name from the profile catalog, or `unknown_<n>`
    #[must_use]
    pub fn name(&self) -> String {
        profile::message_name(self.global)
            .map_or_else(|| format!("unknown_{}", self.global), str::to_owned)
    }

    /// Whether this is the `file_id` record
    #[must_use]
    pub const fn is_file_id(&self) -> bool {
        self.global == profile::mesg_num::FILE_ID
    }

    /// Look up a field by definition number
    #[must_use]
    pub fn field(&self, def_num: u8) -> Option<&Field> {
        self.fields.iter().find(|f| f.def_num == def_num)
    }

    /// Look up a field by profile name
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name(self.global) == Some(name))
    }

    /// Replace the field with the same definition number, or append it.
    ///
    /// Appending keeps the untouched fields in their decoded order, which is
    /// what preserves them byte-for-byte across a rewrite.
    pub fn set_field(&mut self, field: Field) {
        match self.fields.iter_mut().find(|f| f.def_num == field.def_num) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
    }
}
