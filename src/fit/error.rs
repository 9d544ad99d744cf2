// ABOUTME: Error types for the FIT binary codec
// ABOUTME: DecodeError covers header/framing/checksum failures, EncodeError covers container finalization
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

/// Errors produced while parsing a FIT container
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input buffer holds no bytes at all
    #[error("input is empty")]
    Empty,

    /// The buffer ended before a complete structure could be read
    #[error("truncated input while reading {context}: need {needed} bytes, {available} available")]
    Truncated {
        /// What was being read when the bytes ran out
        context: &'static str,
        /// Bytes required to finish the read
        needed: usize,
        /// Bytes actually remaining
        available: usize,
    },

    /// The file header failed validation
    #[error("invalid FIT header: {reason}")]
    InvalidHeader {
        /// Why the header was rejected
        reason: &'static str,
    },

    /// The trailing container checksum does not match the file contents
    #[error("container checksum mismatch: file says {expected:#06x}, computed {computed:#06x}")]
    ChecksumMismatch {
        /// Checksum stored at the end of the file
        expected: u16,
        /// Checksum computed over header and records
        computed: u16,
    },

    /// The optional header checksum does not match the header bytes
    #[error("header checksum mismatch: file says {expected:#06x}, computed {computed:#06x}")]
    HeaderChecksumMismatch {
        /// Checksum stored in the 14-byte header
        expected: u16,
        /// Checksum computed over the first 12 header bytes
        computed: u16,
    },

    /// A data message referenced a local type no definition has claimed
    #[error("data message uses undefined local message type {local}")]
    UndefinedLocalType {
        /// Local message type from the record header
        local: u8,
    },
}

/// Errors produced while building a FIT container
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// No records survived encoding, so there is no container to finalize
    #[error("no records could be encoded")]
    NoRecords,

    /// The encoded records exceed the format's 32-bit data size field
    #[error("encoded data size {size} exceeds the format limit")]
    DataTooLarge {
        /// Total record bytes produced
        size: usize,
    },
}

/// Why a single field could not be re-encoded.
///
/// These never abort a rewrite; the field (or at worst the record) is
/// dropped and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum FieldEncodeError {
    /// The value does not fit the field's declared base type
    #[error("value out of range for field {def_num}")]
    OutOfRange {
        /// Field definition number
        def_num: u8,
    },

    /// The value's shape does not match the base type (e.g. text in a numeric field)
    #[error("value shape mismatch for field {def_num}")]
    ShapeMismatch {
        /// Field definition number
        def_num: u8,
    },

    /// The field is larger than the one-byte size field allows
    #[error("field {def_num} is {size} bytes, larger than the format allows")]
    FieldTooLarge {
        /// Field definition number
        def_num: u8,
        /// Encoded size that overflowed
        size: usize,
    },
}
