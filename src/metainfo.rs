//! Torrent metainfo records ([BEP-3]).
//!
//! The `.torrent` file format expressed as records over the bencode codec.
//! Every type here is declared with [`bencode_record!`](crate::bencode_record)
//! and its field directives; no hand-written dictionary walking is involved.
//!
//! # Examples
//!
//! ```
//! use bencoding::metainfo::{Info, Metainfo};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metainfo = Metainfo {
//!     announce: "http://tracker.example.com/announce".into(),
//!     info: Info {
//!         name: "example.txt".into(),
//!         length: Some(5),
//!         piece_length: 16384,
//!         pieces: vec![0u8; 20].into(),
//!         ..Info::default()
//!     },
//!     ..Metainfo::default()
//! };
//!
//! let data = metainfo.to_bytes()?;
//! let parsed = Metainfo::from_bytes(&data)?;
//!
//! assert_eq!(parsed, metainfo);
//! assert_eq!(parsed.info.piece_count(), 1);
//! assert_eq!(parsed.info.total_length(), 5);
//! println!("Info hash: {}", parsed.info_hash()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Torrent Structure
//!
//! - **announce** - Primary tracker URL
//! - **info** - Core torrent metadata (hashed to create the info hash)
//!   - `name` - Suggested file/directory name
//!   - `piece length` - Size of each piece in bytes
//!   - `pieces` - Concatenated SHA1 hashes of each piece
//!   - `length` - Total size (single-file) OR `files` list (multi-file)
//! - **announce-list** - Additional tracker tiers (BEP-12)
//! - **creation date** - Unix timestamp when created
//! - **comment**, **created by**, **encoding** - Free-form annotations
//!
//! # Info hashes
//!
//! Dictionaries written by this crate put shorter keys first, which is not
//! the order most other encoders use. [`Metainfo::info_hash`] hashes this
//! crate's re-encoding of the info dictionary; [`InfoHash::from_torrent_bytes`]
//! hashes the bytes exactly as they appear in the file, which is what peers
//! and trackers expect.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod error;
mod info_hash;
mod torrent;

pub use error::MetainfoError;
pub use info_hash::InfoHash;
pub use torrent::{File, Info, Metainfo, PIECE_HASH_LEN};
