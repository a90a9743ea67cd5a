use super::error::BencodeError;
use super::key::{check_key_type, DictKey};
use super::record::Record;
use crate::constants::{DICT_TOKEN, END_TOKEN, INT_TOKEN, LIST_TOKEN, MAX_DEPTH, STRING_SEPARATOR};
use bytes::Bytes;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::io::Write;

/// A type that can be written as bencode.
///
/// Implemented for integers of every width, `bool`, `str`/`String`, [`Bytes`],
/// sequences, string-keyed maps, [`Option`], and [`Value`](super::Value).
/// Records get an implementation from [`bencode_record!`](crate::bencode_record),
/// types with their own wire format from [`bencode_custom!`](crate::bencode_custom).
pub trait Encode {
    /// Writes this value to `encoder`.
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError>;

    /// Returns `true` if this is the zero value of its type.
    ///
    /// Consulted for fields declared `omitempty`.
    fn is_zero(&self) -> bool {
        false
    }

    /// Returns the record view of this value, used to flatten embedded fields.
    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    /// Writes a sequence of this type.
    ///
    /// Sequences are lists unless the element type says otherwise; `u8`
    /// sequences are byte strings.
    fn encode_slice(items: &[Self], encoder: &mut Encoder) -> Result<(), BencodeError>
    where
        Self: Sized,
    {
        encoder.emit_list(items)
    }
}

/// Compares dictionary keys in emission order.
///
/// Shorter keys sort first; keys of equal length compare byte by byte. Note
/// that this differs from the plain lexicographic order of BEP-3, so dictionaries
/// produced here can hash differently than those of other encoders.
///
/// # Examples
///
/// ```
/// use bencoding::key_order;
/// use std::cmp::Ordering;
///
/// assert_eq!(key_order(b"a", b"bb"), Ordering::Less);
/// assert_eq!(key_order(b"zz", b"aaa"), Ordering::Less);
/// assert_eq!(key_order(b"ab", b"aa"), Ordering::Greater);
/// ```
pub fn key_order(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Buffer that bencode is written into.
///
/// [`Encode`] implementations drive it through the `emit_*` methods.
#[derive(Debug)]
pub struct Encoder {
    buf: Vec<u8>,
    depth: usize,
    max_depth: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            depth: 0,
            max_depth: MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting of lists and dictionaries.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn emit<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
        value.encode(self)
    }

    pub fn emit_int(&mut self, value: i64) -> Result<(), BencodeError> {
        write!(self.buf, "{}{}{}", INT_TOKEN as char, value, END_TOKEN as char)?;
        Ok(())
    }

    pub fn emit_uint(&mut self, value: u64) -> Result<(), BencodeError> {
        write!(self.buf, "{}{}{}", INT_TOKEN as char, value, END_TOKEN as char)?;
        Ok(())
    }

    pub fn emit_bytes(&mut self, bytes: &[u8]) -> Result<(), BencodeError> {
        write!(self.buf, "{}{}", bytes.len(), STRING_SEPARATOR as char)?;
        self.buf.write_all(bytes)?;
        Ok(())
    }

    /// Appends already encoded bytes verbatim.
    pub fn emit_raw(&mut self, raw: &[u8]) -> Result<(), BencodeError> {
        self.buf.write_all(raw)?;
        Ok(())
    }

    /// Emits a list, encoding the items in iteration order.
    pub fn emit_list<'v, T, I>(&mut self, items: I) -> Result<(), BencodeError>
    where
        T: Encode + ?Sized + 'v,
        I: IntoIterator<Item = &'v T>,
    {
        self.nested(|encoder| {
            encoder.buf.push(LIST_TOKEN);
            for item in items {
                item.encode(encoder)?;
            }
            encoder.buf.push(END_TOKEN);
            Ok(())
        })
    }

    /// Emits a dictionary after sorting `pairs` by [`key_order`].
    ///
    /// Keys are expected to be unique.
    pub fn emit_dict(&mut self, mut pairs: Vec<(Bytes, &dyn Encode)>) -> Result<(), BencodeError> {
        pairs.sort_by(|(a, _), (b, _)| key_order(a, b));

        self.nested(|encoder| {
            encoder.buf.push(DICT_TOKEN);
            for (key, value) in pairs {
                encoder.emit_bytes(&key)?;
                value.encode(encoder)?;
            }
            encoder.buf.push(END_TOKEN);
            Ok(())
        })
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Runs `body` one nesting level deeper, restoring the depth on every path.
    fn nested<F>(&mut self, body: F) -> Result<(), BencodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), BencodeError>,
    {
        if self.depth >= self.max_depth {
            return Err(BencodeError::NestingTooDeep);
        }
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

/// Encodes a value to a byte vector.
///
/// Integers of every width and signedness become `i<n>e`, `bool` becomes
/// `i1e`/`i0e`, [`Bytes`] and strings become byte strings, sequences become
/// lists, and maps and records become dictionaries with keys in [`key_order`].
///
/// # Errors
///
/// - [`BencodeError::InvalidType`] for floating point values
/// - [`BencodeError::NonStringKey`] for maps whose key type is not a string type
/// - [`BencodeError::InvalidValue`] for `None` outside an omitted field
///
/// # Examples
///
/// ```
/// use bencoding::{marshal, Value};
/// use std::collections::HashMap;
///
/// assert_eq!(marshal(&42u8).unwrap(), b"i42e");
/// assert_eq!(marshal("hello").unwrap(), b"5:hello");
/// assert_eq!(marshal(&vec![1, 2]).unwrap(), b"li1ei2ee");
///
/// let mut dict = HashMap::new();
/// dict.insert("bb", 1);
/// dict.insert("a", 2);
/// assert_eq!(marshal(&dict).unwrap(), b"d1:ai2e2:bbi1ee");
/// ```
pub fn marshal<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    let mut encoder = Encoder::new();
    value.encode(&mut encoder)?;
    Ok(encoder.into_bytes())
}

macro_rules! impl_encode_signed {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
                encoder.emit_int(*self as i64)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

macro_rules! impl_encode_unsigned {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
                encoder.emit_uint(*self as u64)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }
        }
    )*};
}

impl_encode_signed!(i8, i16, i32, i64, isize);
impl_encode_unsigned!(u16, u32, u64, usize);

impl Encode for u8 {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        encoder.emit_uint(u64::from(*self))
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn encode_slice(items: &[Self], encoder: &mut Encoder) -> Result<(), BencodeError> {
        encoder.emit_bytes(items)
    }
}

impl Encode for bool {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        encoder.emit_int(i64::from(*self))
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl Encode for f32 {
    fn encode(&self, _encoder: &mut Encoder) -> Result<(), BencodeError> {
        Err(BencodeError::InvalidType)
    }
}

impl Encode for f64 {
    fn encode(&self, _encoder: &mut Encoder) -> Result<(), BencodeError> {
        Err(BencodeError::InvalidType)
    }
}

impl Encode for str {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        encoder.emit_bytes(self.as_bytes())
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for String {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        self.as_str().encode(encoder)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Encode for Bytes {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        encoder.emit_bytes(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        T::encode_slice(self, encoder)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        T::encode_slice(self, encoder)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        T::encode_slice(self, encoder)
    }

    fn is_zero(&self) -> bool {
        self.iter().all(Encode::is_zero)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        match self {
            Some(value) => value.encode(encoder),
            None => Err(BencodeError::InvalidValue),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn as_record(&self) -> Option<&dyn Record> {
        self.as_ref()?.as_record()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        (**self).encode(encoder)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn as_record(&self) -> Option<&dyn Record> {
        (**self).as_record()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        (**self).encode(encoder)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn as_record(&self) -> Option<&dyn Record> {
        (**self).as_record()
    }
}

impl<K: DictKey, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        encode_map(self.iter(), encoder)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K: DictKey, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn encode(&self, encoder: &mut Encoder) -> Result<(), BencodeError> {
        encode_map(self.iter(), encoder)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

fn encode_map<'m, K, V, I>(entries: I, encoder: &mut Encoder) -> Result<(), BencodeError>
where
    K: DictKey + 'm,
    V: Encode + 'm,
    I: Iterator<Item = (&'m K, &'m V)>,
{
    check_key_type::<K>()?;
    let pairs = entries
        .map(|(key, value)| Ok((key.to_key()?, value as &dyn Encode)))
        .collect::<Result<Vec<_>, BencodeError>>()?;
    encoder.emit_dict(pairs)
}
