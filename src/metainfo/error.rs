use thiserror::Error;

use crate::bencode::BencodeError;

/// Errors that can occur when parsing or validating torrent files.
#[derive(Debug, Error)]
pub enum MetainfoError {
    /// The torrent file contains invalid bencode.
    #[error("bencode error: {0}")]
    Bencode(#[from] BencodeError),

    /// A required field is missing from the torrent file.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A field has an invalid value.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// The info hash is not 20 bytes (or 40 hex digits).
    #[error("invalid info hash length")]
    InvalidInfoHashLength,
}
