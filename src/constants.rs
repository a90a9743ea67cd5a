//! Codec constants and tuning parameters.
//!
//! Grammar tokens follow [BEP-3]. The field directive tokens define the
//! mini-language accepted by [`FieldMeta::parse`](crate::bencode::FieldMeta::parse).
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

// ============================================================================
// Grammar tokens
// ============================================================================

/// Starts an integer (`i42e`).
pub const INT_TOKEN: u8 = b'i';

/// Starts a list (`l...e`).
pub const LIST_TOKEN: u8 = b'l';

/// Starts a dictionary (`d...e`).
pub const DICT_TOKEN: u8 = b'd';

/// Terminates integers, lists and dictionaries.
pub const END_TOKEN: u8 = b'e';

/// Separates a byte string's length prefix from its contents (`4:spam`).
pub const STRING_SEPARATOR: u8 = b':';

// ============================================================================
// Field directives
// ============================================================================

/// Directive that removes a field from both directions.
pub const DIRECTIVE_SKIP: &str = "-";

/// Separates the wire name from its options.
pub const DIRECTIVE_SEPARATOR: char = ',';

/// Option that drops a field from the output when it holds its zero value.
pub const OPTION_OMIT_EMPTY: &str = "omitempty";

// ============================================================================
// Limits
// ============================================================================

/// Default maximum nesting of lists, dictionaries and records.
///
/// Inputs are untrusted, so recursion is bounded. Atoms do not count; each
/// container adds one level.
pub const MAX_DEPTH: usize = 64;
