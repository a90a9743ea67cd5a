//! bencoding - A bencode codec for BitTorrent data
//!
//! Converts between the BEP-3 wire format and Rust values, either through the
//! dynamic [`Value`] model or by mapping structs onto dictionaries with
//! per-field directives, in the manner of a JSON marshaller.
//!
//! # Modules
//!
//! - [`bencode`] - Encoder, decoder, record mapping and custom hooks
//! - [`metainfo`] - `.torrent` metainfo records built on the codec
//! - [`constants`] - Grammar tokens, directive tokens and limits
//!
//! # Examples
//!
//! ```
//! use bencoding::{bencode_record, from_bytes, marshal};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Peer {
//!     id: String,
//!     port: u16,
//! }
//!
//! bencode_record! {
//!     Peer {
//!         id = "peer id",
//!         port = "port",
//!     }
//! }
//!
//! let peer = Peer { id: "abc".into(), port: 6881 };
//! let encoded = marshal(&peer).unwrap();
//! assert_eq!(encoded, b"d4:porti6881e7:peer id3:abce");
//! assert_eq!(from_bytes::<Peer>(&encoded).unwrap(), peer);
//! ```

pub mod bencode;
pub mod constants;
pub mod metainfo;

pub use bencode::{
    decode_custom, decode_prefix, decode_record, encode_custom, encode_record, field_set,
    from_bytes, key_order, marshal, record_is_zero, unmarshal, BencodeError, Decode, Decoder,
    DictKey, Encode, Encoder, FieldDecl, FieldEntry, FieldMeta, FieldSet, Marshaler, RawValue, Record,
    Unmarshaler, Value,
};
pub use metainfo::{File, Info, InfoHash, Metainfo, MetainfoError};
