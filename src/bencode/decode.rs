use super::error::BencodeError;
use super::key::{check_key_type, DictKey};
use super::record::Record;
use super::value::Value;
use crate::constants::{DICT_TOKEN, END_TOKEN, INT_TOKEN, LIST_TOKEN, MAX_DEPTH, STRING_SEPARATOR};
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::str::FromStr;
use tracing::debug;

/// A type that can be populated from bencode.
///
/// Decoding writes into an existing value. Containers replace their contents;
/// records only overwrite the fields present in the input.
pub trait Decode {
    /// Reads one value from `decoder` into `self`.
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError>;

    /// Returns the record view of this value, used to reach embedded fields.
    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }

    /// Reads a sequence of this type.
    ///
    /// Sequences are lists unless the element type says otherwise; `u8`
    /// sequences are byte strings.
    fn decode_vec(decoder: &mut Decoder<'_>) -> Result<Vec<Self>, BencodeError>
    where
        Self: Sized + Default,
    {
        let mut items = Vec::new();
        decoder.read_list(|d| {
            let mut item = Self::default();
            item.decode(d)?;
            items.push(item);
            Ok(())
        })?;
        Ok(items)
    }

    /// Reads a sequence of exactly `items.len()` elements into `items`.
    fn decode_slice(items: &mut [Self], decoder: &mut Decoder<'_>) -> Result<(), BencodeError>
    where
        Self: Sized,
    {
        let mut slots = items.iter_mut();
        decoder.read_list(|d| match slots.next() {
            Some(slot) => slot.decode(d),
            None => Err(BencodeError::InvalidList),
        })?;
        if slots.next().is_some() {
            return Err(BencodeError::InvalidList);
        }
        Ok(())
    }
}

/// Recursive-descent reader over a fully materialized buffer.
///
/// Each `read_*` method parses exactly one grammar production starting at the
/// current position and advances past it. Sub-values never check for trailing
/// data; only [`unmarshal`] does.
#[derive(Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
            max_depth: MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting of lists, dictionaries and records.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Returns the next byte without consuming it.
    pub fn peek(&self) -> Result<u8, BencodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(BencodeError::UnexpectedEof)
    }

    /// Reads an integer into any type parsed from its decimal text.
    ///
    /// The text is validated first, so a parse failure can only mean the
    /// magnitude does not fit `T`.
    pub fn read_integer<T: FromStr>(&mut self) -> Result<T, BencodeError> {
        let text = self.read_integer_text()?;
        text.parse()
            .map_err(|_| BencodeError::IntegerOverflow(text.to_owned()))
    }

    /// Reads an integer restricted to `0` and `1`.
    pub fn read_bool(&mut self) -> Result<bool, BencodeError> {
        match self.read_integer::<i64>()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(BencodeError::InvalidBool),
        }
    }

    /// Reads a byte string, borrowing its contents from the input.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], BencodeError> {
        if !self.peek()?.is_ascii_digit() {
            return Err(BencodeError::InvalidString);
        }

        let start = self.pos;
        loop {
            match self.peek()? {
                b'0'..=b'9' => self.pos += 1,
                STRING_SEPARATOR => break,
                _ => return Err(BencodeError::InvalidString),
            }
        }

        let digits = &self.data[start..self.pos];
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(BencodeError::LeadingZero);
        }
        self.pos += 1;

        let len: usize = std::str::from_utf8(digits)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(BencodeError::LengthTooBig)?;

        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(BencodeError::LengthTooBig)?;

        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    /// Reads a list, calling `each` once per element.
    ///
    /// `each` must consume exactly one value.
    pub fn read_list<F>(&mut self, mut each: F) -> Result<(), BencodeError>
    where
        F: FnMut(&mut Self) -> Result<(), BencodeError>,
    {
        self.expect(LIST_TOKEN, BencodeError::InvalidList)?;
        self.nested(|decoder| {
            while decoder.peek()? != END_TOKEN {
                each(decoder)?;
            }
            decoder.pos += 1;
            Ok(())
        })
    }

    /// Reads a dictionary, calling `each` with every key.
    ///
    /// `each` must consume exactly the value paired with the key. Key order is
    /// not checked.
    pub fn read_dict<F>(&mut self, each: F) -> Result<(), BencodeError>
    where
        F: FnMut(&mut Self, &'a [u8]) -> Result<(), BencodeError>,
    {
        self.read_entries(BencodeError::InvalidDict, each)
    }

    pub(crate) fn read_entries<F>(
        &mut self,
        mismatch: BencodeError,
        mut each: F,
    ) -> Result<(), BencodeError>
    where
        F: FnMut(&mut Self, &'a [u8]) -> Result<(), BencodeError>,
    {
        self.expect(DICT_TOKEN, mismatch)?;
        self.nested(|decoder| {
            while decoder.peek()? != END_TOKEN {
                let key = decoder.read_bytes()?;
                each(decoder, key)?;
            }
            decoder.pos += 1;
            Ok(())
        })
    }

    /// Reads any value into the dynamic model.
    pub fn read_value(&mut self) -> Result<Value, BencodeError> {
        match self.peek()? {
            INT_TOKEN => Ok(Value::Integer(self.read_integer()?)),
            b'0'..=b'9' => Ok(Value::Bytes(Bytes::copy_from_slice(self.read_bytes()?))),
            LIST_TOKEN => {
                let mut items = Vec::new();
                self.read_list(|d| {
                    items.push(d.read_value()?);
                    Ok(())
                })?;
                Ok(Value::List(items))
            }
            DICT_TOKEN => {
                let mut dict = BTreeMap::new();
                self.read_dict(|d, key| {
                    let value = d.read_value()?;
                    dict.insert(Bytes::copy_from_slice(key), value);
                    Ok(())
                })?;
                Ok(Value::Dict(dict))
            }
            _ => Err(BencodeError::InvalidToken),
        }
    }

    /// Returns the exact bytes of the next well-formed value and advances past it.
    pub fn read_raw(&mut self) -> Result<&'a [u8], BencodeError> {
        let start = self.pos;
        self.skip_value()?;
        Ok(&self.data[start..self.pos])
    }

    /// Validates and discards the next value.
    pub fn skip_value(&mut self) -> Result<(), BencodeError> {
        match self.peek()? {
            INT_TOKEN => self.read_integer_text().map(drop),
            b'0'..=b'9' => self.read_bytes().map(drop),
            LIST_TOKEN => self.read_list(|d| d.skip_value()),
            DICT_TOKEN => self.read_dict(|d, _| d.skip_value()),
            _ => Err(BencodeError::InvalidToken),
        }
    }

    fn read_integer_text(&mut self) -> Result<&'a str, BencodeError> {
        self.expect(INT_TOKEN, BencodeError::InvalidInteger)?;

        let start = self.pos;
        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }

        let digits_start = self.pos;
        loop {
            match self.peek()? {
                b'0'..=b'9' => self.pos += 1,
                END_TOKEN => break,
                _ => return Err(BencodeError::InvalidInteger),
            }
        }

        let digits = &self.data[digits_start..self.pos];
        match digits {
            [] => return Err(BencodeError::InvalidInteger),
            [b'0', _, ..] => return Err(BencodeError::LeadingZero),
            [b'0'] if negative => return Err(BencodeError::InvalidInteger),
            _ => {}
        }

        let text = &self.data[start..self.pos];
        self.pos += 1;

        // Only '-' and ASCII digits were accepted above.
        std::str::from_utf8(text).map_err(|_| BencodeError::InvalidInteger)
    }

    fn expect(&mut self, token: u8, mismatch: BencodeError) -> Result<(), BencodeError> {
        if self.peek()? != token {
            return Err(mismatch);
        }
        self.pos += 1;
        Ok(())
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

/// Decodes one value from the start of `data` into `target`.
///
/// Returns the number of bytes consumed. Bytes after the value are left
/// untouched; use [`unmarshal`] to reject them.
pub fn decode_prefix<T: Decode + ?Sized>(data: &[u8], target: &mut T) -> Result<usize, BencodeError> {
    if data.is_empty() {
        return Err(BencodeError::EmptyData);
    }

    let mut decoder = Decoder::new(data);
    target.decode(&mut decoder)?;
    Ok(decoder.position())
}

/// Decodes `data` into `target`, requiring the whole input to be consumed.
///
/// # Errors
///
/// - [`BencodeError::EmptyData`] if `data` is empty
/// - [`BencodeError::RemainingData`] if bytes follow the top-level value
/// - a grammar error if `data` does not match the shape of `target`
///
/// On error `target` may be partially written and should be discarded.
///
/// # Examples
///
/// ```
/// use bencoding::{unmarshal, BencodeError};
///
/// let mut list: Vec<String> = Vec::new();
/// unmarshal(b"l4:spam4:eggse", &mut list).unwrap();
/// assert_eq!(list, ["spam", "eggs"]);
///
/// let mut n = 0i64;
/// assert!(matches!(unmarshal(b"i3e ", &mut n), Err(BencodeError::RemainingData)));
/// ```
pub fn unmarshal<T: Decode + ?Sized>(data: &[u8], target: &mut T) -> Result<(), BencodeError> {
    let consumed = decode_prefix(data, target)?;
    if consumed != data.len() {
        debug!(consumed, total = data.len(), "trailing data after top-level value");
        return Err(BencodeError::RemainingData);
    }
    Ok(())
}

/// Decodes `data` into a fresh `T`.
///
/// # Examples
///
/// ```
/// use bencoding::{from_bytes, Value};
///
/// let value: Value = from_bytes(b"l4:spami42ee").unwrap();
/// assert_eq!(value.as_list().map(|l| l.len()), Some(2));
/// ```
pub fn from_bytes<T: Decode + Default>(data: &[u8]) -> Result<T, BencodeError> {
    let mut target = T::default();
    unmarshal(data, &mut target)?;
    Ok(target)
}

macro_rules! impl_decode_integer {
    ($($t:ty),*) => {$(
        impl Decode for $t {
            fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
                *self = decoder.read_integer()?;
                Ok(())
            }
        }
    )*};
}

impl_decode_integer!(i8, i16, i32, i64, isize, u16, u32, u64, usize);

impl Decode for u8 {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        *self = decoder.read_integer()?;
        Ok(())
    }

    fn decode_vec(decoder: &mut Decoder<'_>) -> Result<Vec<Self>, BencodeError> {
        Ok(decoder.read_bytes()?.to_vec())
    }

    fn decode_slice(items: &mut [Self], decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        let bytes = decoder.read_bytes()?;
        if bytes.len() != items.len() {
            return Err(BencodeError::InvalidString);
        }
        items.copy_from_slice(bytes);
        Ok(())
    }
}

impl Decode for bool {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        *self = decoder.read_bool()?;
        Ok(())
    }
}

impl Decode for f32 {
    fn decode(&mut self, _decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        Err(BencodeError::InvalidType)
    }
}

impl Decode for f64 {
    fn decode(&mut self, _decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        Err(BencodeError::InvalidType)
    }
}

impl Decode for String {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        *self = Self::from_key(decoder.read_bytes()?)?;
        Ok(())
    }
}

impl Decode for Bytes {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        *self = Bytes::copy_from_slice(decoder.read_bytes()?);
        Ok(())
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        *self = T::decode_vec(decoder)?;
        Ok(())
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        T::decode_slice(self, decoder)
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        let mut inner = T::default();
        inner.decode(decoder)?;
        *self = Some(inner);
        Ok(())
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        (**self).decode(decoder)
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        (**self).as_record_mut()
    }
}

impl<K: DictKey + Ord, V: Decode + Default> Decode for BTreeMap<K, V> {
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        check_key_type::<K>()?;
        let mut map = BTreeMap::new();
        decoder.read_dict(|d, key| {
            let key = K::from_key(key)?;
            let mut value = V::default();
            value.decode(d)?;
            map.insert(key, value);
            Ok(())
        })?;
        *self = map;
        Ok(())
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: DictKey + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher + Default,
{
    fn decode(&mut self, decoder: &mut Decoder<'_>) -> Result<(), BencodeError> {
        check_key_type::<K>()?;
        let mut map = HashMap::with_hasher(S::default());
        decoder.read_dict(|d, key| {
            let key = K::from_key(key)?;
            let mut value = V::default();
            value.decode(d)?;
            map.insert(key, value);
            Ok(())
        })?;
        *self = map;
        Ok(())
    }
}
