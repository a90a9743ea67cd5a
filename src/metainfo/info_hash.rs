use super::error::MetainfoError;
use crate::bencode::{self, RawValue};
use crate::bencode_record;
use crate::constants::DICT_TOKEN;
use sha1::{Digest, Sha1};
use std::fmt;

/// SHA1 hash of a bencoded info dictionary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

/// Just the `info` entry of a torrent, kept as received.
#[derive(Default)]
struct RawTorrent {
    info: RawValue,
}

bencode_record! {
    RawTorrent {
        info = "info",
    }
}

impl InfoHash {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MetainfoError> {
        let arr: [u8; 20] = bytes
            .try_into()
            .map_err(|_| MetainfoError::InvalidInfoHashLength)?;
        Ok(InfoHash(arr))
    }

    pub fn from_hex(s: &str) -> Result<Self, MetainfoError> {
        let bytes = hex_decode(s).ok_or(MetainfoError::InvalidInfoHashLength)?;
        Self::from_bytes(&bytes)
    }

    /// Hashes an encoded info dictionary.
    pub fn from_info_bytes(raw_info: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(raw_info);
        InfoHash(hasher.finalize().into())
    }

    /// Hashes the info dictionary of a whole `.torrent` file byte for byte.
    ///
    /// The rest of the file is validated as bencode but otherwise ignored.
    pub fn from_torrent_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let torrent: RawTorrent = bencode::from_bytes(data)?;
        match torrent.info.as_bytes().first() {
            None => Err(MetainfoError::MissingField("info")),
            Some(&DICT_TOKEN) => Ok(Self::from_info_bytes(torrent.info.as_bytes())),
            Some(_) => Err(MetainfoError::InvalidField("info")),
        }
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex_encode(&self.0)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{:02x}", b);
        s
    })
}

fn hex_decode(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 || !s.is_ascii() {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
