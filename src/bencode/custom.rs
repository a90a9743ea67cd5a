use super::decode::{from_bytes, Decode, Decoder};
use super::encode::Encoder;
use super::error::BencodeError;
use bytes::Bytes;

/// A type that produces its own bencode.
///
/// The returned bytes are written verbatim, bypassing structural encoding.
/// They should be one well-formed value.
pub trait Marshaler {
    fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError>;

    /// Reports the zero value, which `omitempty` fields leave out.
    fn is_zero_bencode(&self) -> bool {
        false
    }
}

/// A type that parses its own bencode.
///
/// `data` holds exactly one well-formed value: the decoder has located its end
/// without interpreting it, so the type can sit inside lists, dictionaries and
/// records.
pub trait Unmarshaler {
    fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<(), BencodeError>;
}

/// Encodes `value` through its [`Marshaler`] implementation.
pub fn encode_custom<T: Marshaler + ?Sized>(value: &T, encoder: &mut Encoder) -> Result<(), BencodeError> {
    let raw = value.marshal_bencode()?;
    encoder.emit_raw(&raw)
}

/// Decodes the next value through `target`'s [`Unmarshaler`] implementation.
pub fn decode_custom<T: Unmarshaler + ?Sized>(
    target: &mut T,
    decoder: &mut Decoder<'_>,
) -> Result<(), BencodeError> {
    let raw = decoder.read_raw()?;
    target.unmarshal_bencode(raw)
}

/// Routes [`Encode`](crate::Encode) and/or [`Decode`](crate::Decode) through a
/// type's [`Marshaler`] / [`Unmarshaler`] implementation.
///
/// `bencode_custom!(T)` wires both directions, `bencode_custom!(encode T)` and
/// `bencode_custom!(decode T)` wire one. The encode side also forwards
/// [`Marshaler::is_zero_bencode`] as the `omitempty` check.
///
/// # Examples
///
/// ```
/// use bencoding::{bencode_custom, from_bytes, marshal, BencodeError, Marshaler, Unmarshaler};
///
/// /// A port carried as a decimal byte string.
/// #[derive(Debug, Default, PartialEq)]
/// struct Port(u16);
///
/// impl Marshaler for Port {
///     fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError> {
///         marshal(&self.0.to_string())
///     }
/// }
///
/// impl Unmarshaler for Port {
///     fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<(), BencodeError> {
///         let text: String = from_bytes(data)?;
///         self.0 = text.parse().map_err(BencodeError::custom)?;
///         Ok(())
///     }
/// }
///
/// bencode_custom!(Port);
///
/// assert_eq!(marshal(&Port(6881)).unwrap(), b"4:6881");
/// assert_eq!(from_bytes::<Port>(b"4:6881").unwrap(), Port(6881));
/// ```
#[macro_export]
macro_rules! bencode_custom {
    (encode $name:ty) => {
        impl $crate::Encode for $name {
            fn encode(&self, encoder: &mut $crate::Encoder) -> ::std::result::Result<(), $crate::BencodeError> {
                $crate::encode_custom(self, encoder)
            }

            fn is_zero(&self) -> bool {
                $crate::Marshaler::is_zero_bencode(self)
            }
        }
    };
    (decode $name:ty) => {
        impl $crate::Decode for $name {
            fn decode(&mut self, decoder: &mut $crate::Decoder<'_>) -> ::std::result::Result<(), $crate::BencodeError> {
                $crate::decode_custom(self, decoder)
            }
        }
    };
    ($name:ty) => {
        $crate::bencode_custom!(encode $name);
        $crate::bencode_custom!(decode $name);
    };
}

/// The exact bytes of one bencode value, kept without interpretation.
///
/// Decoding stores the value as it appeared in the input; encoding writes it
/// back unchanged. Useful to hash a dictionary exactly as received, or to defer
/// decoding part of a message.
///
/// # Examples
///
/// ```
/// use bencoding::{from_bytes, RawValue, Value};
///
/// let raw: Vec<RawValue> = from_bytes(b"ld1:bi1e1:ai2eei7ee").unwrap();
/// assert_eq!(raw[0].as_bytes(), b"d1:bi1e1:ai2ee");
///
/// let inner: Value = raw[0].parse().unwrap();
/// assert_eq!(inner.get(b"a").and_then(|v| v.as_integer()), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawValue(Bytes);

impl RawValue {
    /// Wraps bytes that are already bencode.
    pub fn new(raw: impl Into<Bytes>) -> Self {
        RawValue(raw.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Bytes {
        self.0
    }

    /// Decodes the held value.
    pub fn parse<T: Decode + Default>(&self) -> Result<T, BencodeError> {
        from_bytes(&self.0)
    }
}

impl Marshaler for RawValue {
    fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError> {
        if self.0.is_empty() {
            return Err(BencodeError::InvalidValue);
        }
        Ok(self.0.to_vec())
    }

    fn is_zero_bencode(&self) -> bool {
        self.0.is_empty()
    }
}

impl Unmarshaler for RawValue {
    fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<(), BencodeError> {
        self.0 = Bytes::copy_from_slice(data);
        Ok(())
    }
}

bencode_custom!(RawValue);
