//! Error type shared by every codec in the crate.

/// Failure of an encode or decode call.
///
/// Malformed input (`Truncated`, `OffsetOutOfBounds`, `UnknownElementType`,
/// `InvalidString`) fails only the record being decoded. Schema misuse
/// (`UnknownField`, `TypeMismatch`, `OutOfRange`, `MissingCorrelatedField`)
/// is reported before any byte is produced.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("truncated input: need {needed} byte(s) at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("tag {tag:#06x}: payload of {length} byte(s) at offset {offset} exceeds buffer of {available}")]
    OffsetOutOfBounds {
        tag: u16,
        offset: usize,
        length: usize,
        available: usize,
    },
    #[error("tag {tag:#06x}: unknown element type {code:#06x}")]
    UnknownElementType { tag: u16, code: u16 },
    #[error("tag {tag:#06x}: invalid string payload")]
    InvalidString { tag: u16 },
    #[error("{record}: unknown field {field}")]
    UnknownField { record: String, field: String },
    #[error("field {field}: expected {expected}")]
    TypeMismatch { field: String, expected: &'static str },
    #[error("field {field}: value {value} out of range")]
    OutOfRange { field: String, value: String },
    #[error("unsupported integer width: {0} byte(s)")]
    UnsupportedWidth(usize),
    #[error("{given} was given without {missing}")]
    MissingCorrelatedField { given: String, missing: String },
    #[error("record body of {0} bytes does not fit the length header")]
    RecordTooLarge(usize),
    #[error("transport: {0}")]
    Transport(String),
}

impl CodecError {
    /// True for errors caused by the input buffer rather than by the caller.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            CodecError::Truncated { .. }
                | CodecError::OffsetOutOfBounds { .. }
                | CodecError::UnknownElementType { .. }
                | CodecError::InvalidString { .. }
        )
    }
}
