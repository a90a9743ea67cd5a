use std::fmt;

use thiserror::Error;

/// Errors raised while encoding or decoding bencode.
///
/// Each failure maps to exactly one variant. Decoding errors are terminal: a
/// target that was being populated when an error occurred must be discarded.
#[derive(Debug, Error)]
pub enum BencodeError {
    /// The top-level input was empty.
    #[error("data is empty")]
    EmptyData,

    /// Input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// The host type has no bencode representation (floating point).
    #[error("type is not valid for bencode")]
    InvalidType,

    /// The value cannot be encoded (an absent optional outside an omitted field).
    #[error("value is not valid")]
    InvalidValue,

    /// A map key is not a byte string type.
    #[error("map key is not of type string")]
    NonStringKey,

    /// An integer or string length has a leading zero.
    #[error("integer must not have leading zeros")]
    LeadingZero,

    /// A well-formed integer does not fit the target type.
    #[error("integer out of range for target: {0}")]
    IntegerOverflow(String),

    /// A string length exceeds the remaining input.
    #[error("string length would exceed length of data")]
    LengthTooBig,

    /// Bytes were left after the top-level value.
    #[error("data was not fully consumed")]
    RemainingData,

    /// A boolean was encoded as something other than `i0e` or `i1e`.
    #[error("unexpected value when decoding bool")]
    InvalidBool,

    #[error("unexpected value when decoding integer")]
    InvalidInteger,

    #[error("unexpected value when decoding string")]
    InvalidString,

    #[error("unexpected value when decoding list")]
    InvalidList,

    #[error("unexpected value when decoding dict")]
    InvalidDict,

    #[error("unexpected value when decoding struct")]
    InvalidStruct,

    /// The leading byte does not start any value.
    #[error("unexpected value when decoding")]
    InvalidToken,

    #[error("nesting too deep")]
    NestingTooDeep,

    /// Raised by a custom [`Marshaler`](super::Marshaler) or
    /// [`Unmarshaler`](super::Unmarshaler).
    #[error("{0}")]
    Custom(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BencodeError {
    /// Builds a [`BencodeError::Custom`] from any displayable message.
    pub fn custom(msg: impl fmt::Display) -> Self {
        BencodeError::Custom(msg.to_string())
    }
}
