use super::decode::{Decode, Decoder};
use super::encode::{Encode, Encoder};
use super::error::BencodeError;
use super::field::{field_set, FieldDecl};
use tracing::trace;

/// A struct mapped to a bencode dictionary through field directives.
///
/// Implementations are usually generated by [`bencode_record!`](crate::bencode_record).
/// Field indices are positions in [`Record::fields`]; `field` and `field_mut`
/// must return the same field for the same index.
pub trait Record {
    /// Declares the fields in order, with their directives.
    fn fields() -> Vec<FieldDecl>
    where
        Self: Sized;

    fn field(&self, index: usize) -> Option<&dyn Encode>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decode>;
}

/// Encodes a record as a dictionary of its resolved fields.
pub fn encode_record<R: Record + 'static>(record: &R, encoder: &mut Encoder) -> Result<(), BencodeError> {
    let fields = field_set::<R>();
    let mut pairs = Vec::with_capacity(fields.len());

    for entry in fields.entries() {
        let value = lookup(record, &entry.path)?;
        if entry.omit_empty && value.is_zero() {
            continue;
        }
        pairs.push((entry.wire_name.clone(), value));
    }

    encoder.emit_dict(pairs)
}

/// Decodes a dictionary into the matching fields of a record.
///
/// Keys without a matching field are parsed and discarded.
pub fn decode_record<R: Record + 'static>(
    record: &mut R,
    decoder: &mut Decoder<'_>,
) -> Result<(), BencodeError> {
    let fields = field_set::<R>();

    decoder.read_entries(BencodeError::InvalidStruct, |decoder, key| {
        match fields.get(key) {
            Some(entry) => lookup_mut(&mut *record, &entry.path)?.decode(decoder),
            None => {
                trace!(
                    key = %String::from_utf8_lossy(key),
                    position = decoder.position(),
                    "skipping unknown record key"
                );
                decoder.skip_value()
            }
        }
    })
}

/// Returns `true` if every declared field holds its zero value.
pub fn record_is_zero<R: Record>(record: &R) -> bool {
    (0..)
        .map_while(|index| record.field(index))
        .all(|field| field.is_zero())
}

fn lookup<'r>(record: &'r dyn Record, path: &[usize]) -> Result<&'r dyn Encode, BencodeError> {
    let (&last, parents) = path.split_last().ok_or(BencodeError::InvalidStruct)?;

    let mut current = record;
    for &index in parents {
        current = current
            .field(index)
            .and_then(|field| field.as_record())
            .ok_or(BencodeError::InvalidStruct)?;
    }

    current.field(last).ok_or(BencodeError::InvalidStruct)
}

fn lookup_mut<'r>(
    record: &'r mut dyn Record,
    path: &[usize],
) -> Result<&'r mut dyn Decode, BencodeError> {
    let (&last, parents) = path.split_last().ok_or(BencodeError::InvalidStruct)?;

    let mut current = record;
    for &index in parents {
        current = current
            .field_mut(index)
            .and_then(|field| field.as_record_mut())
            .ok_or(BencodeError::InvalidStruct)?;
    }

    current.field_mut(last).ok_or(BencodeError::InvalidStruct)
}

/// Implements [`Record`], [`Encode`] and [`Decode`] for a struct.
///
/// Each field is listed with its directive (see [`FieldMeta::parse`](crate::FieldMeta::parse)),
/// or with `embed` to flatten another record's fields into this one. Fields not
/// listed take no part in encoding or decoding. Every listed field must
/// implement [`Encode`] and [`Decode`].
///
/// # Examples
///
/// ```
/// use bencoding::{bencode_record, from_bytes, marshal};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Common {
///     version: i64,
/// }
///
/// bencode_record! {
///     Common {
///         version = "v",
///     }
/// }
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Message {
///     common: Common,
///     name: String,
///     note: String,
///     secret: String,
/// }
///
/// bencode_record! {
///     Message {
///         common = embed,
///         name = "",
///         note = "note,omitempty",
///         secret = "-",
///     }
/// }
///
/// let message = Message {
///     common: Common { version: 2 },
///     name: "ping".into(),
///     note: String::new(),
///     secret: "hidden".into(),
/// };
/// let encoded = marshal(&message).unwrap();
/// assert_eq!(encoded, b"d1:vi2e4:name4:pinge");
///
/// let decoded: Message = from_bytes(&encoded).unwrap();
/// assert_eq!(decoded.common.version, 2);
/// assert_eq!(decoded.secret, "");
/// ```
#[macro_export]
macro_rules! bencode_record {
    (@decl $name:ident, $field:ident, embed) => {
        $crate::FieldDecl::embedded(::std::stringify!($field), |record: &$name| &record.$field)
    };
    (@decl $name:ident, $field:ident, $directive:literal) => {
        $crate::FieldDecl::new(::std::stringify!($field), $directive)
    };
    ($name:ident { $($field:ident = $spec:tt),* $(,)? }) => {
        impl $crate::Record for $name {
            fn fields() -> ::std::vec::Vec<$crate::FieldDecl> {
                ::std::vec![$($crate::bencode_record!(@decl $name, $field, $spec)),*]
            }

            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::Encode> {
                ::std::iter::IntoIterator::into_iter([$(&self.$field as &dyn $crate::Encode),*]).nth(index)
            }

            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::Decode> {
                ::std::iter::IntoIterator::into_iter([$(&mut self.$field as &mut dyn $crate::Decode),*]).nth(index)
            }
        }

        impl $crate::Encode for $name {
            fn encode(&self, encoder: &mut $crate::Encoder) -> ::std::result::Result<(), $crate::BencodeError> {
                $crate::encode_record(self, encoder)
            }

            fn is_zero(&self) -> bool {
                $crate::record_is_zero(self)
            }

            fn as_record(&self) -> ::std::option::Option<&dyn $crate::Record> {
                ::std::option::Option::Some(self)
            }
        }

        impl $crate::Decode for $name {
            fn decode(&mut self, decoder: &mut $crate::Decoder<'_>) -> ::std::result::Result<(), $crate::BencodeError> {
                $crate::decode_record(self, decoder)
            }

            fn as_record_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::Record> {
                ::std::option::Option::Some(self)
            }
        }
    };
}
