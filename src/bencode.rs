//! Bencode encoding and decoding ([BEP-3]).
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files and tracker
//! responses.
//!
//! # Data Types
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Targets
//!
//! Values are read and written through the [`Encode`] and [`Decode`] traits:
//!
//! - the dynamic [`Value`] model, for input of unknown shape
//! - integers of any width, `bool` (`i0e`/`i1e`), `String`, [`bytes::Bytes`]
//! - `Vec<T>`, slices and arrays as lists, except that `u8` sequences are byte strings
//! - `BTreeMap`/`HashMap` keyed by a string type ([`DictKey`]) as dictionaries
//! - structs declared with [`bencode_record!`](crate::bencode_record), mapped
//!   to dictionaries through per-field directives
//! - types with their own wire format, via [`Marshaler`] / [`Unmarshaler`]
//!   and [`bencode_custom!`](crate::bencode_custom)
//!
//! # Examples
//!
//! ```
//! use bencoding::{from_bytes, marshal, unmarshal, Value};
//!
//! let value: Value = from_bytes(b"d3:foo3:bare").unwrap();
//! assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
//!
//! let mut numbers: Vec<u32> = Vec::new();
//! unmarshal(b"li1ei2ee", &mut numbers).unwrap();
//! assert_eq!(numbers, [1, 2]);
//!
//! assert_eq!(marshal(&numbers).unwrap(), b"li1ei2ee");
//! ```
//!
//! # Canonical form
//!
//! Dictionary keys are emitted shortest first, equal lengths compared byte by
//! byte (see [`key_order`]). The same logical dictionary always encodes to the
//! same bytes. Decoding accepts keys in any order.
//!
//! # Error Handling
//!
//! Every failure is one [`BencodeError`] variant, for example:
//!
//! - [`BencodeError::EmptyData`] - Input was empty
//! - [`BencodeError::LeadingZero`] - `i01e` or `01:a`
//! - [`BencodeError::LengthTooBig`] - String length exceeds the input
//! - [`BencodeError::RemainingData`] - Extra data after the top-level value
//! - [`BencodeError::NestingTooDeep`] - Recursion limit exceeded (64 levels by default)
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod custom;
mod decode;
mod encode;
mod error;
mod field;
mod key;
mod record;
mod value;

pub use custom::{decode_custom, encode_custom, Marshaler, RawValue, Unmarshaler};
pub use decode::{decode_prefix, from_bytes, unmarshal, Decode, Decoder};
pub use encode::{key_order, marshal, Encode, Encoder};
pub use error::BencodeError;
pub use field::{field_set, FieldDecl, FieldEntry, FieldMeta, FieldSet};
pub use key::DictKey;
pub use record::{decode_record, encode_record, record_is_zero, Record};
pub use value::Value;

#[cfg(test)]
mod tests;
