use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode;
use crate::bencode_record;
use bytes::Bytes;

/// Length of one SHA1 piece hash inside `pieces`.
pub const PIECE_HASH_LEN: usize = 20;

/// A parsed torrent file.
///
/// Fields mirror the top-level dictionary. Optional keys are represented by
/// their zero value and omitted again on encoding.
///
/// # Examples
///
/// ```no_run
/// use bencoding::metainfo::Metainfo;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("example.torrent")?;
/// let metainfo = Metainfo::from_bytes(&data)?;
///
/// println!("Torrent: {}", metainfo.info.name);
/// println!("Size: {} bytes", metainfo.info.total_length());
/// println!("Info hash: {}", metainfo.info_hash()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metainfo {
    /// Primary tracker URL.
    pub announce: String,
    /// The info dictionary containing file and piece information.
    pub info: Info,
    /// Multi-tier tracker list ([BEP-12](http://bittorrent.org/beps/bep_0012.html)).
    pub announce_list: Vec<Vec<String>>,
    /// Unix timestamp when the torrent was created.
    pub creation_date: i64,
    pub comment: String,
    /// Name/version of the program that created the torrent.
    pub created_by: String,
    /// String encoding used for the text fields of `info`.
    pub encoding: String,
}

bencode_record! {
    Metainfo {
        announce = "announce",
        info = "info",
        announce_list = "announce-list,omitempty",
        creation_date = "creation date,omitempty",
        comment = "comment,omitempty",
        created_by = "created by,omitempty",
        encoding = "encoding,omitempty",
    }
}

/// The info dictionary from a torrent file.
///
/// Exactly one of `length` (single file) and `files` (multiple files) is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Info {
    /// Files of a multi-file torrent, in piece order.
    pub files: Vec<File>,
    /// Size of a single-file torrent.
    pub length: Option<u64>,
    pub md5sum: Bytes,
    /// Suggested name for the file or directory.
    pub name: String,
    /// Number of bytes per piece.
    pub piece_length: u64,
    /// Concatenated SHA1 hashes, [`PIECE_HASH_LEN`] bytes per piece.
    pub pieces: Bytes,
    /// If true, clients should only use trackers in the metainfo (no DHT/PEX).
    pub private: bool,
}

bencode_record! {
    Info {
        files = "files,omitempty",
        length = "length,omitempty",
        md5sum = "md5sum,omitempty",
        name = "name",
        piece_length = "piece length",
        pieces = "pieces",
        private = "private,omitempty",
    }
}

/// A file within a multi-file torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct File {
    /// Size of the file in bytes.
    pub length: u64,
    pub md5sum: Bytes,
    /// Directory components followed by the file name, relative to the torrent root.
    pub path: Vec<String>,
}

bencode_record! {
    File {
        length = "length",
        md5sum = "md5sum,omitempty",
        path = "path",
    }
}

impl Metainfo {
    /// Parses and validates a torrent file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is not valid bencode, or a field has the wrong shape
    /// - `name` or `piece length` is missing
    /// - The pieces field length is not a multiple of 20
    /// - Both or neither of `length` and `files` are present
    /// - A file has an empty path
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let metainfo: Metainfo = bencode::from_bytes(data)?;
        metainfo.validate()?;
        Ok(metainfo)
    }

    /// Encodes the torrent file.
    pub fn to_bytes(&self) -> Result<Vec<u8>, MetainfoError> {
        Ok(bencode::marshal(self)?)
    }

    /// Checks the structural rules that decoding alone does not enforce.
    pub fn validate(&self) -> Result<(), MetainfoError> {
        self.info.validate()
    }

    /// Hashes this crate's encoding of the info dictionary.
    ///
    /// Equal to the hash of the original file only when that file was written
    /// with the same key order; use [`InfoHash::from_torrent_bytes`] for
    /// files from elsewhere.
    pub fn info_hash(&self) -> Result<InfoHash, MetainfoError> {
        let raw_info = bencode::marshal(&self.info)?;
        Ok(InfoHash::from_info_bytes(&raw_info))
    }

    /// Returns all tracker URLs from both `announce` and `announce-list`.
    ///
    /// The primary tracker (from `announce`) comes first, followed by
    /// trackers from `announce-list`. Duplicates are removed.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers = Vec::new();

        if !self.announce.is_empty() {
            trackers.push(self.announce.clone());
        }

        for tier in &self.announce_list {
            for tracker in tier {
                if !trackers.contains(tracker) {
                    trackers.push(tracker.clone());
                }
            }
        }

        trackers
    }
}

impl Info {
    pub fn validate(&self) -> Result<(), MetainfoError> {
        if self.name.is_empty() {
            return Err(MetainfoError::MissingField("name"));
        }
        if self.piece_length == 0 {
            return Err(MetainfoError::MissingField("piece length"));
        }
        if self.pieces.len() % PIECE_HASH_LEN != 0 {
            return Err(MetainfoError::InvalidField("pieces"));
        }

        match (self.length, self.files.is_empty()) {
            (Some(_), true) => Ok(()),
            (None, false) => {
                if self.files.iter().any(|file| file.path.is_empty()) {
                    return Err(MetainfoError::InvalidField("path"));
                }
                Ok(())
            }
            (Some(_), false) => Err(MetainfoError::InvalidField("length")),
            (None, true) => Err(MetainfoError::MissingField("length or files")),
        }
    }

    /// Returns `true` for a single-file torrent.
    pub fn is_single_file(&self) -> bool {
        self.files.is_empty()
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len() / PIECE_HASH_LEN
    }

    /// Returns the SHA1 hash of piece `index`.
    pub fn piece_hash(&self, index: usize) -> Option<[u8; PIECE_HASH_LEN]> {
        let start = index.checked_mul(PIECE_HASH_LEN)?;
        let end = start.checked_add(PIECE_HASH_LEN)?;
        let chunk = self.pieces.get(start..end)?;
        chunk.try_into().ok()
    }

    /// Total size of all files combined.
    pub fn total_length(&self) -> u64 {
        match self.length {
            Some(length) => length,
            None => self.files.iter().map(|file| file.length).sum(),
        }
    }
}
