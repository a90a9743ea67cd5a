use super::error::BencodeError;
use bytes::Bytes;

/// A type that can key a map encoded as a dictionary.
///
/// Only byte string types are valid keys. Other types may implement the trait
/// with `IS_STRING = false`: maps keyed by them fail with
/// [`BencodeError::NonStringKey`] before any entry is read or written, so an
/// empty map is rejected too.
pub trait DictKey {
    const IS_STRING: bool;

    fn to_key(&self) -> Result<Bytes, BencodeError> {
        Err(BencodeError::NonStringKey)
    }

    fn from_key(_key: &[u8]) -> Result<Self, BencodeError>
    where
        Self: Sized,
    {
        Err(BencodeError::NonStringKey)
    }
}

pub(crate) fn check_key_type<K: DictKey + ?Sized>() -> Result<(), BencodeError> {
    if K::IS_STRING {
        Ok(())
    } else {
        Err(BencodeError::NonStringKey)
    }
}

impl DictKey for str {
    const IS_STRING: bool = true;

    fn to_key(&self) -> Result<Bytes, BencodeError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl DictKey for String {
    const IS_STRING: bool = true;

    fn to_key(&self) -> Result<Bytes, BencodeError> {
        self.as_str().to_key()
    }

    fn from_key(key: &[u8]) -> Result<Self, BencodeError> {
        String::from_utf8(key.to_vec()).map_err(|_| BencodeError::InvalidString)
    }
}

impl DictKey for Bytes {
    const IS_STRING: bool = true;

    fn to_key(&self) -> Result<Bytes, BencodeError> {
        Ok(self.clone())
    }

    fn from_key(key: &[u8]) -> Result<Self, BencodeError> {
        Ok(Bytes::copy_from_slice(key))
    }
}

impl<T: DictKey + ?Sized> DictKey for &T {
    const IS_STRING: bool = T::IS_STRING;

    fn to_key(&self) -> Result<Bytes, BencodeError> {
        (**self).to_key()
    }
}

macro_rules! impl_non_string_key {
    ($($t:ty),*) => {$(
        impl DictKey for $t {
            const IS_STRING: bool = false;
        }
    )*};
}

impl_non_string_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool);
