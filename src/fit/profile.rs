// ABOUTME: Authoritative compile-time FIT profile: base types, message catalog, and wire enum values
// ABOUTME: Replaces runtime field-name guessing with a static schema for every message the rewriter names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Static FIT profile tables.
//!
//! The decoder and encoder never discover field layouts at runtime; every
//! message name, field name, and enum wire value the crate understands is
//! pinned here. Messages outside the catalog still decode (by number), they
//! just have no names attached.

/// Seconds between the Unix epoch and the FIT epoch (1989-12-31T00:00:00Z)
pub const FIT_EPOCH_OFFSET_SECS: i64 = 631_065_600;

/// Base types a field definition can carry.
///
/// The wire byte encodes the type number in the low five bits; bit 7 marks
/// endian-sensitive types. Only the types below are representable — a field
/// defined with anything else is dropped during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// 1-byte enumeration
    Enum,
    /// Signed 8-bit integer
    SInt8,
    /// Unsigned 8-bit integer
    UInt8,
    /// Signed 16-bit integer
    SInt16,
    /// Unsigned 16-bit integer
    UInt16,
    /// Signed 32-bit integer
    SInt32,
    /// Unsigned 32-bit integer
    UInt32,
    /// Null-terminated UTF-8 string
    String,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
    /// Unsigned 8-bit, zero-invalid variant
    UInt8z,
    /// Unsigned 16-bit, zero-invalid variant
    UInt16z,
    /// Unsigned 32-bit, zero-invalid variant
    UInt32z,
    /// Opaque byte array
    Byte,
    /// Signed 64-bit integer
    SInt64,
    /// Unsigned 64-bit integer
    UInt64,
    /// Unsigned 64-bit, zero-invalid variant
    UInt64z,
}

impl BaseType {
    /// Decode a base type from its wire byte
    #[must_use]
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Enum),
            0x01 => Some(Self::SInt8),
            0x02 => Some(Self::UInt8),
            0x83 => Some(Self::SInt16),
            0x84 => Some(Self::UInt16),
            0x85 => Some(Self::SInt32),
            0x86 => Some(Self::UInt32),
            0x07 => Some(Self::String),
            0x88 => Some(Self::Float32),
            0x89 => Some(Self::Float64),
            0x8A => Some(Self::UInt8z),
            0x8B => Some(Self::UInt16z),
            0x8C => Some(Self::UInt32z),
            0x0D => Some(Self::Byte),
            0x8E => Some(Self::SInt64),
            0x8F => Some(Self::UInt64),
            0x90 => Some(Self::UInt64z),
            _ => None,
        }
    }

    /// The wire byte written into field definitions
    #[must_use]
    pub const fn to_wire(self) -> u8 {
        match self {
            Self::Enum => 0x00,
            Self::SInt8 => 0x01,
            Self::UInt8 => 0x02,
            Self::SInt16 => 0x83,
            Self::UInt16 => 0x84,
            Self::SInt32 => 0x85,
            Self::UInt32 => 0x86,
            Self::String => 0x07,
            Self::Float32 => 0x88,
            Self::Float64 => 0x89,
            Self::UInt8z => 0x8A,
            Self::UInt16z => 0x8B,
            Self::UInt32z => 0x8C,
            Self::Byte => 0x0D,
            Self::SInt64 => 0x8E,
            Self::UInt64 => 0x8F,
            Self::UInt64z => 0x90,
        }
    }

    /// Size in bytes of a single element of this type.
    ///
    /// Strings and byte arrays are variable-length; their element size is 1.
    #[must_use]
    pub const fn element_size(self) -> usize {
        match self {
            Self::Enum
            | Self::SInt8
            | Self::UInt8
            | Self::UInt8z
            | Self::String
            | Self::Byte => 1,
            Self::SInt16 | Self::UInt16 | Self::UInt16z => 2,
            Self::SInt32 | Self::UInt32 | Self::UInt32z | Self::Float32 => 4,
            Self::Float64 | Self::SInt64 | Self::UInt64 | Self::UInt64z => 8,
        }
    }

    /// Whether an unsigned value is this type's invalid sentinel
    #[must_use]
    pub const fn is_invalid_uint(self, value: u64) -> bool {
        match self {
            Self::Enum | Self::UInt8 => value == 0xFF,
            Self::UInt16 => value == 0xFFFF,
            Self::UInt32 => value == 0xFFFF_FFFF,
            Self::UInt64 => value == u64::MAX,
            Self::UInt8z | Self::UInt16z | Self::UInt32z | Self::UInt64z => value == 0,
            _ => false,
        }
    }

    /// Whether a signed value is this type's invalid sentinel
    #[must_use]
    pub const fn is_invalid_sint(self, value: i64) -> bool {
        match self {
            Self::SInt8 => value == 0x7F,
            Self::SInt16 => value == 0x7FFF,
            Self::SInt32 => value == 0x7FFF_FFFF,
            Self::SInt64 => value == i64::MAX,
            _ => false,
        }
    }
}

/// Global message numbers for the messages the crate names
pub mod mesg_num {
    pub const FILE_ID: u16 = 0;
    pub const DEVICE_SETTINGS: u16 = 2;
    pub const USER_PROFILE: u16 = 3;
    pub const ZONES_TARGET: u16 = 7;
    pub const SPORT: u16 = 12;
    pub const SESSION: u16 = 18;
    pub const LAP: u16 = 19;
    pub const RECORD: u16 = 20;
    pub const EVENT: u16 = 21;
    pub const DEVICE_INFO: u16 = 23;
    pub const ACTIVITY: u16 = 34;
    pub const FILE_CREATOR: u16 = 49;
    pub const HRV: u16 = 78;
}

/// Field definition numbers of the `file_id` message.
///
/// Field 6 carries the sport classification. The standard profile leaves 6
/// and 7 unassigned in `file_id`; pinning sport there keeps the rewrite a
/// single-field edit instead of a cross-message one.
pub mod file_id_fields {
    pub const TYPE: u8 = 0;
    pub const MANUFACTURER: u8 = 1;
    pub const PRODUCT: u8 = 2;
    pub const SERIAL_NUMBER: u8 = 3;
    pub const TIME_CREATED: u8 = 4;
    pub const NUMBER: u8 = 5;
    pub const SPORT: u8 = 6;
    pub const PRODUCT_NAME: u8 = 8;
}

/// Wire values of the FIT `sport` enum for the canonical classifications.
///
/// `TRAIL_RUNNING` is an extension value: the standard profile spells trail
/// running as running plus a sub-sport, which would not round-trip through
/// a single field.
pub mod sport_values {
    pub const GENERIC: u8 = 0;
    pub const RUNNING: u8 = 1;
    pub const CYCLING: u8 = 2;
    pub const SWIMMING: u8 = 5;
    pub const WALKING: u8 = 11;
    pub const HIKING: u8 = 17;
    pub const TRAIL_RUNNING: u8 = 80;
}

/// Wire values of the FIT `file` type enum
pub mod file_type_values {
    pub const ACTIVITY: u8 = 4;
}

/// Wire values of the FIT manufacturer enum
pub mod manufacturer_values {
    pub const DEVELOPMENT: u16 = 255;
}

struct FieldSchema {
    num: u8,
    name: &'static str,
    date_time: bool,
}

struct MessageSchema {
    num: u16,
    name: &'static str,
    fields: &'static [FieldSchema],
}

const fn field(num: u8, name: &'static str) -> FieldSchema {
    FieldSchema {
        num,
        name,
        date_time: false,
    }
}

const fn date_time(num: u8, name: &'static str) -> FieldSchema {
    FieldSchema {
        num,
        name,
        date_time: true,
    }
}

/// Message catalog: the subset of the FIT profile a typical activity file
/// uses. Field numbers follow the published profile.
static MESSAGES: &[MessageSchema] = &[
    MessageSchema {
        num: mesg_num::FILE_ID,
        name: "file_id",
        fields: &[
            field(file_id_fields::TYPE, "type"),
            field(file_id_fields::MANUFACTURER, "manufacturer"),
            field(file_id_fields::PRODUCT, "product"),
            field(file_id_fields::SERIAL_NUMBER, "serial_number"),
            date_time(file_id_fields::TIME_CREATED, "time_created"),
            field(file_id_fields::NUMBER, "number"),
            field(file_id_fields::SPORT, "sport"),
            field(file_id_fields::PRODUCT_NAME, "product_name"),
        ],
    },
    MessageSchema {
        num: mesg_num::DEVICE_SETTINGS,
        name: "device_settings",
        fields: &[
            field(0, "active_time_zone"),
            field(1, "utc_offset"),
            field(2, "time_offset"),
        ],
    },
    MessageSchema {
        num: mesg_num::USER_PROFILE,
        name: "user_profile",
        fields: &[
            field(0, "friendly_name"),
            field(1, "gender"),
            field(2, "age"),
            field(3, "height"),
            field(4, "weight"),
        ],
    },
    MessageSchema {
        num: mesg_num::ZONES_TARGET,
        name: "zones_target",
        fields: &[
            field(1, "max_heart_rate"),
            field(2, "threshold_heart_rate"),
            field(3, "functional_threshold_power"),
        ],
    },
    MessageSchema {
        num: mesg_num::SPORT,
        name: "sport",
        fields: &[field(0, "sport"), field(1, "sub_sport"), field(3, "name")],
    },
    MessageSchema {
        num: mesg_num::SESSION,
        name: "session",
        fields: &[
            date_time(253, "timestamp"),
            field(0, "event"),
            field(1, "event_type"),
            date_time(2, "start_time"),
            field(5, "sport"),
            field(6, "sub_sport"),
            field(7, "total_elapsed_time"),
            field(8, "total_timer_time"),
            field(9, "total_distance"),
            field(11, "total_calories"),
            field(14, "avg_speed"),
            field(15, "max_speed"),
            field(16, "avg_heart_rate"),
            field(17, "max_heart_rate"),
        ],
    },
    MessageSchema {
        num: mesg_num::LAP,
        name: "lap",
        fields: &[
            date_time(253, "timestamp"),
            field(0, "event"),
            field(1, "event_type"),
            date_time(2, "start_time"),
            field(7, "total_elapsed_time"),
            field(8, "total_timer_time"),
            field(9, "total_distance"),
            field(11, "total_calories"),
            field(13, "avg_speed"),
            field(14, "max_speed"),
            field(15, "avg_heart_rate"),
            field(16, "max_heart_rate"),
        ],
    },
    MessageSchema {
        num: mesg_num::RECORD,
        name: "record",
        fields: &[
            date_time(253, "timestamp"),
            field(0, "position_lat"),
            field(1, "position_long"),
            field(2, "altitude"),
            field(3, "heart_rate"),
            field(4, "cadence"),
            field(5, "distance"),
            field(6, "speed"),
            field(7, "power"),
            field(13, "temperature"),
        ],
    },
    MessageSchema {
        num: mesg_num::EVENT,
        name: "event",
        fields: &[
            date_time(253, "timestamp"),
            field(0, "event"),
            field(1, "event_type"),
            field(2, "data16"),
            field(3, "data"),
        ],
    },
    MessageSchema {
        num: mesg_num::DEVICE_INFO,
        name: "device_info",
        fields: &[
            date_time(253, "timestamp"),
            field(0, "device_index"),
            field(1, "device_type"),
            field(2, "manufacturer"),
            field(3, "serial_number"),
            field(4, "product"),
            field(5, "software_version"),
            field(11, "battery_status"),
        ],
    },
    MessageSchema {
        num: mesg_num::ACTIVITY,
        name: "activity",
        fields: &[
            date_time(253, "timestamp"),
            field(0, "total_timer_time"),
            field(1, "num_sessions"),
            field(2, "type"),
            field(3, "event"),
            field(4, "event_type"),
            date_time(5, "local_timestamp"),
            field(6, "event_group"),
        ],
    },
    MessageSchema {
        num: mesg_num::FILE_CREATOR,
        name: "file_creator",
        fields: &[field(0, "software_version"), field(1, "hardware_version")],
    },
    MessageSchema {
        num: mesg_num::HRV,
        name: "hrv",
        fields: &[field(0, "time")],
    },
];

fn message_schema(global: u16) -> Option<&'static MessageSchema> {
    MESSAGES.iter().find(|m| m.num == global)
}

/// Name of a global message, if the catalog knows it
#[must_use]
pub fn message_name(global: u16) -> Option<&'static str> {
    message_schema(global).map(|m| m.name)
}

/// Name of a field within a message, if the catalog knows it
#[must_use]
pub fn field_name(global: u16, def_num: u8) -> Option<&'static str> {
    message_schema(global)?
        .fields
        .iter()
        .find(|f| f.num == def_num)
        .map(|f| f.name)
}

/// Whether the profile types this field as a date-time
#[must_use]
pub fn is_date_time(global: u16, def_num: u8) -> bool {
    message_schema(global)
        .and_then(|m| m.fields.iter().find(|f| f.num == def_num))
        .is_some_and(|f| f.date_time)
}
