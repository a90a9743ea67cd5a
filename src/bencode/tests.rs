use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;

use super::*;
use crate::{bencode_custom, bencode_record};

#[derive(Debug, Clone, Default, PartialEq)]
struct Sample {
    attr0: Bytes,
    attr1: i64,
    attr2: String,
    attr3: BTreeMap<String, bool>,
}

bencode_record! {
    Sample {
        attr0 = "",
        attr1 = "int_attr",
        attr2 = "str_attr,omitempty",
        attr3 = "-",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Base {
    id: u32,
    label: String,
}

bencode_record! {
    Base {
        id = "id",
        label = "label,omitempty",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Derived {
    base: Base,
    extra: Vec<i64>,
}

bencode_record! {
    Derived {
        base = embed,
        extra = "extra",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Named {
    base: Base,
    flag: bool,
}

bencode_record! {
    Named {
        base = "base",
        flag = "flag",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Nested {
    derived: Derived,
    note: String,
}

bencode_record! {
    Nested {
        derived = embed,
        note = "note",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Shadowed {
    base: Base,
    id: String,
}

bencode_record! {
    Shadowed {
        base = embed,
        id = "id",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Flags {
    enabled: bool,
}

bencode_record! {
    Flags {
        enabled = "enabled",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Optional {
    name: Option<String>,
    size: Option<u64>,
}

bencode_record! {
    Optional {
        name = "name,omitempty",
        size = "size",
    }
}

/// Record-shaped type that owns its wire format.
#[derive(Debug, Clone, Default, PartialEq)]
struct Versioned {
    major: u8,
    minor: u8,
}

impl Record for Versioned {
    fn fields() -> Vec<FieldDecl> {
        vec![FieldDecl::new("major", "major"), FieldDecl::new("minor", "minor")]
    }

    fn field(&self, index: usize) -> Option<&dyn Encode> {
        match index {
            0 => Some(&self.major),
            1 => Some(&self.minor),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decode> {
        match index {
            0 => Some(&mut self.major),
            1 => Some(&mut self.minor),
            _ => None,
        }
    }
}

impl Marshaler for Versioned {
    fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError> {
        marshal(&format!("{}.{}", self.major, self.minor))
    }
}

impl Unmarshaler for Versioned {
    fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<(), BencodeError> {
        let text: String = from_bytes(data)?;
        let (major, minor) = text
            .split_once('.')
            .ok_or_else(|| BencodeError::custom("missing '.'"))?;
        self.major = major.parse().map_err(BencodeError::custom)?;
        self.minor = minor.parse().map_err(BencodeError::custom)?;
        Ok(())
    }
}

bencode_custom!(Versioned);

#[derive(Debug, Clone, Default, PartialEq)]
struct Release {
    version: Versioned,
    name: String,
}

bencode_record! {
    Release {
        version = "version",
        name = "name",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Envelope {
    raw: RawValue,
    dynamic: Value,
}

bencode_record! {
    Envelope {
        raw = "raw,omitempty",
        dynamic = "dynamic,omitempty",
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Peer {
    id: [u8; 20],
    port: u16,
}

bencode_record! {
    Peer {
        id = "peer id",
        port = "port",
    }
}

fn decode_err<T: Decode + Default>(data: &[u8]) -> BencodeError {
    match from_bytes::<T>(data) {
        Ok(_) => panic!("expected error for {:?}", String::from_utf8_lossy(data)),
        Err(e) => e,
    }
}

// ============================================================================
// Dynamic values
// ============================================================================

#[test]
fn test_decode_integer() {
    assert_eq!(from_bytes::<Value>(b"i42e").unwrap(), Value::Integer(42));
    assert_eq!(from_bytes::<Value>(b"i-42e").unwrap(), Value::Integer(-42));
    assert_eq!(from_bytes::<Value>(b"i0e").unwrap(), Value::Integer(0));
}

#[test]
fn test_decode_integer_bounds() {
    assert_eq!(from_bytes::<i64>(b"i9223372036854775807e").unwrap(), i64::MAX);
    assert_eq!(from_bytes::<i64>(b"i-9223372036854775808e").unwrap(), i64::MIN);
    assert_eq!(
        from_bytes::<u64>(b"i18446744073709551615e").unwrap(),
        u64::MAX
    );
    assert!(matches!(
        decode_err::<i64>(b"i9223372036854775808e"),
        BencodeError::IntegerOverflow(_)
    ));
}

#[test]
fn test_decode_integer_invalid() {
    assert!(matches!(decode_err::<Value>(b"i01e"), BencodeError::LeadingZero));
    assert!(matches!(decode_err::<Value>(b"i00e"), BencodeError::LeadingZero));
    assert!(matches!(decode_err::<Value>(b"i-01e"), BencodeError::LeadingZero));
    assert!(matches!(decode_err::<Value>(b"i-0e"), BencodeError::InvalidInteger));
    assert!(matches!(decode_err::<Value>(b"ie"), BencodeError::InvalidInteger));
    assert!(matches!(decode_err::<Value>(b"i-e"), BencodeError::InvalidInteger));
    assert!(matches!(decode_err::<Value>(b"i12a3e"), BencodeError::InvalidInteger));
    assert!(matches!(decode_err::<Value>(b"i--1e"), BencodeError::InvalidInteger));
    assert!(matches!(decode_err::<Value>(b"i42"), BencodeError::UnexpectedEof));
}

#[test]
fn test_decode_bytes() {
    assert_eq!(
        from_bytes::<Value>(b"4:spam").unwrap(),
        Value::Bytes(Bytes::from_static(b"spam"))
    );
    assert_eq!(
        from_bytes::<Value>(b"0:").unwrap(),
        Value::Bytes(Bytes::from_static(b""))
    );
    assert_eq!(
        from_bytes::<Bytes>(b"4:\x00\x01\xfe\xff").unwrap(),
        Bytes::from_static(b"\x00\x01\xfe\xff")
    );
}

#[test]
fn test_decode_bytes_invalid() {
    assert!(matches!(decode_err::<Value>(b"5:ab"), BencodeError::LengthTooBig));
    assert!(matches!(decode_err::<Value>(b"04:spam"), BencodeError::LeadingZero));
    assert!(matches!(decode_err::<Value>(b"4spam"), BencodeError::InvalidString));
    assert!(matches!(decode_err::<Value>(b"12"), BencodeError::UnexpectedEof));
    assert!(matches!(
        decode_err::<Value>(b"99999999999999999999999:a"),
        BencodeError::LengthTooBig
    ));
    assert!(matches!(decode_err::<String>(b"i1e"), BencodeError::InvalidString));
    assert!(matches!(decode_err::<String>(b"2:\xff\xfe"), BencodeError::InvalidString));
}

#[test]
fn test_decode_list() {
    let result = from_bytes::<Value>(b"l4:spami42ee").unwrap();
    match result {
        Value::List(l) => {
            assert_eq!(l.len(), 2);
            assert_eq!(l[0], Value::Bytes(Bytes::from_static(b"spam")));
            assert_eq!(l[1], Value::Integer(42));
        }
        _ => panic!("expected list"),
    }
    assert_eq!(from_bytes::<Value>(b"le").unwrap(), Value::List(vec![]));
}

#[test]
fn test_decode_dict() {
    let result = from_bytes::<Value>(b"d3:cow3:moo4:spam4:eggse").unwrap();
    match result {
        Value::Dict(d) => {
            assert_eq!(d.len(), 2);
            assert_eq!(
                d.get(&Bytes::from_static(b"cow")),
                Some(&Value::Bytes(Bytes::from_static(b"moo")))
            );
        }
        _ => panic!("expected dict"),
    }
    assert_eq!(from_bytes::<Value>(b"de").unwrap(), Value::Dict(BTreeMap::new()));
}

#[test]
fn test_decode_truncated() {
    assert!(matches!(decode_err::<Value>(b"l4:spam"), BencodeError::UnexpectedEof));
    assert!(matches!(decode_err::<Value>(b"d3:cow"), BencodeError::UnexpectedEof));
    assert!(matches!(decode_err::<Value>(b"d3:cow3:moo"), BencodeError::UnexpectedEof));
    assert!(matches!(decode_err::<Value>(b"l"), BencodeError::UnexpectedEof));
}

#[test]
fn test_decode_invalid_token() {
    assert!(matches!(decode_err::<Value>(b"x"), BencodeError::InvalidToken));
    assert!(matches!(decode_err::<Value>(b"li1exe"), BencodeError::InvalidToken));
    assert!(matches!(decode_err::<Value>(b":abc"), BencodeError::InvalidToken));
}

#[test]
fn test_decode_dict_non_string_key() {
    assert!(matches!(decode_err::<Value>(b"di1ei2ee"), BencodeError::InvalidString));
}

#[test]
fn test_empty_data() {
    assert!(matches!(decode_err::<Value>(b""), BencodeError::EmptyData));
    let mut n = 0i64;
    assert!(matches!(unmarshal(b"", &mut n), Err(BencodeError::EmptyData)));
}

#[test]
fn test_trailing_data_error() {
    assert!(matches!(decode_err::<Value>(b"i3e "), BencodeError::RemainingData));
    assert!(matches!(decode_err::<Value>(b"i42eextra"), BencodeError::RemainingData));
}

#[test]
fn test_decode_prefix_reports_consumed() {
    let mut value = Value::default();
    let consumed = decode_prefix(b"l1:ae4:rest", &mut value).unwrap();
    assert_eq!(consumed, 5);
    assert_eq!(value, Value::List(vec![Value::string("a")]));
}

#[test]
fn test_nesting_too_deep() {
    let mut data = vec![b'l'; 100];
    data.extend(vec![b'e'; 100]);
    assert!(matches!(decode_err::<Value>(&data), BencodeError::NestingTooDeep));

    let mut data = vec![b'l'; 64];
    data.extend(vec![b'e'; 64]);
    assert!(from_bytes::<Value>(&data).is_ok());
}

#[test]
fn test_decoder_custom_max_depth() {
    let mut decoder = Decoder::new(b"llee").with_max_depth(1);
    assert!(matches!(decoder.read_value(), Err(BencodeError::NestingTooDeep)));

    let mut decoder = Decoder::new(b"lei1e").with_max_depth(1);
    assert_eq!(decoder.read_value().unwrap(), Value::List(vec![]));
    assert_eq!(decoder.position(), 2);
    assert_eq!(decoder.remaining(), b"i1e");
}

#[test]
fn test_decoder_depth_restored_after_error() {
    let mut decoder = Decoder::new(b"llellee").with_max_depth(2);
    let result = decoder.read_list(|d| {
        d.read_list(|_| Ok(()))?;
        Err(BencodeError::custom("stop"))
    });
    assert!(matches!(result, Err(BencodeError::Custom(_))));

    // A failed list leaves the full depth budget for the next value.
    assert_eq!(decoder.position(), 3);
    assert_eq!(
        decoder.read_value().unwrap(),
        Value::List(vec![Value::List(vec![])])
    );
}

#[test]
fn test_encode_integer() {
    assert_eq!(marshal(&Value::Integer(42)).unwrap(), b"i42e");
    assert_eq!(marshal(&Value::Integer(-42)).unwrap(), b"i-42e");
    assert_eq!(marshal(&Value::Integer(0)).unwrap(), b"i0e");
    assert_eq!(marshal(&i64::MIN).unwrap(), b"i-9223372036854775808e");
    assert_eq!(marshal(&u64::MAX).unwrap(), b"i18446744073709551615e");
    assert_eq!(marshal(&-7i8).unwrap(), b"i-7e");
    assert_eq!(marshal(&300u16).unwrap(), b"i300e");
}

#[test]
fn test_encode_bool() {
    assert_eq!(marshal(&true).unwrap(), b"i1e");
    assert_eq!(marshal(&false).unwrap(), b"i0e");
}

#[test]
fn test_encode_bytes() {
    assert_eq!(
        marshal(&Value::Bytes(Bytes::from_static(b"spam"))).unwrap(),
        b"4:spam"
    );
    assert_eq!(marshal(&Bytes::from_static(b"\x00\xff")).unwrap(), b"2:\x00\xff");
    assert_eq!(marshal("").unwrap(), b"0:");
}

#[test]
fn test_encode_list() {
    let list = Value::List(vec![
        Value::Bytes(Bytes::from_static(b"spam")),
        Value::Integer(42),
    ]);
    assert_eq!(marshal(&list).unwrap(), b"l4:spami42ee");
    assert_eq!(marshal(&Vec::<i64>::new()).unwrap(), b"le");
    assert_eq!(marshal(&[1u16, 2, 3]).unwrap(), b"li1ei2ei3ee");
    assert_eq!(marshal(&["a", "b"][..]).unwrap(), b"l1:a1:be");
}

#[test]
fn test_byte_sequences_are_strings() {
    assert_eq!(marshal(&vec![0x61u8, 0x62]).unwrap(), b"2:ab");
    assert_eq!(marshal(&[1u8, 2, 3]).unwrap(), b"3:\x01\x02\x03");
    assert_eq!(marshal(&b"spam"[..]).unwrap(), b"4:spam");
    assert_eq!(marshal(&Vec::<u8>::new()).unwrap(), b"0:");

    assert_eq!(from_bytes::<Vec<u8>>(b"2:ab").unwrap(), vec![b'a', b'b']);
    assert_eq!(from_bytes::<[u8; 4]>(b"4:\x00\x01\xfe\xff").unwrap(), [0, 1, 0xfe, 0xff]);
    assert!(matches!(decode_err::<[u8; 3]>(b"2:ab"), BencodeError::InvalidString));
    assert!(matches!(decode_err::<Vec<u8>>(b"li1ei2ee"), BencodeError::InvalidString));

    // Wider elements are still lists.
    assert_eq!(from_bytes::<Vec<u16>>(b"li1ei2ee").unwrap(), vec![1, 2]);
    assert_eq!(from_bytes::<[i64; 2]>(b"li1ei2ee").unwrap(), [1, 2]);
    assert!(matches!(decode_err::<[i64; 2]>(b"li1ee"), BencodeError::InvalidList));
    assert!(matches!(decode_err::<[i64; 2]>(b"li1ei2ei3ee"), BencodeError::InvalidList));
}

#[test]
fn test_byte_array_record_field() {
    let peer = Peer {
        id: [b'x'; 20],
        port: 6881,
    };
    let encoded = marshal(&peer).unwrap();
    assert_eq!(encoded, b"d4:porti6881e7:peer id20:xxxxxxxxxxxxxxxxxxxxe");
    assert_eq!(from_bytes::<Peer>(&encoded).unwrap(), peer);

    assert!(matches!(
        decode_err::<Peer>(b"d7:peer id3:abce"),
        BencodeError::InvalidString
    ));
}

#[test]
fn test_encode_dict() {
    let mut dict = BTreeMap::new();
    dict.insert(
        Bytes::from_static(b"cow"),
        Value::Bytes(Bytes::from_static(b"moo")),
    );
    let value = Value::Dict(dict);
    assert_eq!(marshal(&value).unwrap(), b"d3:cow3:mooe");
    assert_eq!(marshal(&BTreeMap::<String, i64>::new()).unwrap(), b"de");
}

#[test]
fn test_encode_floats_rejected() {
    assert!(matches!(marshal(&1.5f64), Err(BencodeError::InvalidType)));
    assert!(matches!(marshal(&vec![1.0f32]), Err(BencodeError::InvalidType)));
    assert!(matches!(decode_err::<f64>(b"i1e"), BencodeError::InvalidType));
}

#[test]
fn test_non_string_keys() {
    let mut map = BTreeMap::new();
    map.insert(1i64, "one");
    assert!(matches!(marshal(&map), Err(BencodeError::NonStringKey)));

    assert!(matches!(
        decode_err::<BTreeMap<i64, String>>(b"d1:a1:be"),
        BencodeError::NonStringKey
    ));

    // The key type is rejected even when there are no entries.
    assert!(matches!(
        marshal(&BTreeMap::<i64, String>::new()),
        Err(BencodeError::NonStringKey)
    ));
    assert!(matches!(
        marshal(&HashMap::<u8, i64>::new()),
        Err(BencodeError::NonStringKey)
    ));
    assert!(matches!(
        decode_err::<HashMap<i64, String>>(b"de"),
        BencodeError::NonStringKey
    ));

    let mut borrowed = BTreeMap::new();
    borrowed.insert("k", 1i64);
    assert_eq!(marshal(&borrowed).unwrap(), b"d1:ki1ee");
}

#[test]
fn test_encode_none_rejected() {
    assert!(matches!(marshal(&None::<i64>), Err(BencodeError::InvalidValue)));
    assert_eq!(marshal(&Some(5)).unwrap(), b"i5e");
}

// ============================================================================
// Key ordering
// ============================================================================

#[test]
fn test_key_order_length_first() {
    let mut dict = HashMap::new();
    dict.insert("bb", 1);
    dict.insert("a", 2);
    assert_eq!(marshal(&dict).unwrap(), b"d1:ai2e2:bbi1ee");

    let mut dict = HashMap::new();
    dict.insert("aaa", 1);
    dict.insert("zz", 2);
    assert_eq!(marshal(&dict).unwrap(), b"d2:zzi2e3:aaai1ee");
}

#[test]
fn test_key_order_equal_length_lexicographic() {
    let mut dict = HashMap::new();
    dict.insert("ab", 1);
    dict.insert("aa", 2);
    dict.insert("b", 3);
    assert_eq!(marshal(&dict).unwrap(), b"d1:bi3e2:aai2e2:abi1ee");
}

#[test]
fn test_value_dict_uses_key_order() {
    // BTreeMap iterates "announce" before "info"; the wire order is by length.
    let original = b"d4:infod4:name4:test12:piece lengthi16384ee8:announce15:http://test.come";
    let decoded = from_bytes::<Value>(original).unwrap();
    let encoded = marshal(&decoded).unwrap();
    assert_eq!(encoded, original);
}

#[test]
fn test_unsorted_input_accepted_and_resorted() {
    let decoded = from_bytes::<Value>(b"d3:foo3:bar1:xi1ee").unwrap();
    assert_eq!(decoded.get(b"x").and_then(Value::as_integer), Some(1));
    assert_eq!(marshal(&decoded).unwrap(), b"d1:xi1e3:foo3:bare");
}

#[test]
fn test_encoding_independent_of_insertion_order() {
    let keys = ["info", "a", "announce", "zz", "b"];
    let mut forward = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        forward.insert(key.to_string(), i as i64);
    }
    let mut backward = HashMap::new();
    for (i, key) in keys.iter().enumerate().rev() {
        backward.insert(key.to_string(), i as i64);
    }
    let btree: BTreeMap<String, i64> = forward.clone().into_iter().collect();

    let encoded = marshal(&forward).unwrap();
    assert_eq!(encoded, marshal(&backward).unwrap());
    assert_eq!(encoded, marshal(&btree).unwrap());
}

#[test]
fn test_duplicate_keys_last_wins() {
    let decoded = from_bytes::<Value>(b"d1:ai1e1:ai2ee").unwrap();
    assert_eq!(decoded.get(b"a").and_then(Value::as_integer), Some(2));
}

// ============================================================================
// Typed targets
// ============================================================================

#[test]
fn test_bool_boundary() {
    assert!(!from_bytes::<bool>(b"i0e").unwrap());
    assert!(from_bytes::<bool>(b"i1e").unwrap());
    assert!(matches!(decode_err::<bool>(b"i2e"), BencodeError::InvalidBool));
    assert!(matches!(decode_err::<bool>(b"i-1e"), BencodeError::InvalidBool));
    assert!(matches!(decode_err::<Flags>(b"d7:enabledi2ee"), BencodeError::InvalidBool));
    assert_eq!(
        from_bytes::<Flags>(b"d7:enabledi1ee").unwrap(),
        Flags { enabled: true }
    );
}

#[test]
fn test_integer_width_checked() {
    assert_eq!(from_bytes::<u8>(b"i255e").unwrap(), 255);
    assert!(matches!(decode_err::<u8>(b"i256e"), BencodeError::IntegerOverflow(_)));
    assert!(matches!(decode_err::<i8>(b"i-129e"), BencodeError::IntegerOverflow(_)));
    assert!(matches!(decode_err::<u32>(b"i-1e"), BencodeError::IntegerOverflow(_)));
}

#[test]
fn test_production_mismatch_errors() {
    assert!(matches!(decode_err::<i64>(b"4:spam"), BencodeError::InvalidInteger));
    assert!(matches!(decode_err::<Vec<i64>>(b"i1e"), BencodeError::InvalidList));
    assert!(matches!(
        decode_err::<BTreeMap<String, i64>>(b"le"),
        BencodeError::InvalidDict
    ));
    assert!(matches!(decode_err::<Sample>(b"le"), BencodeError::InvalidStruct));
}

#[test]
fn test_typed_collections() {
    let list: Vec<Vec<String>> = from_bytes(b"ll1:a1:bel1:cee").unwrap();
    assert_eq!(list, vec![vec!["a", "b"], vec!["c"]]);

    let map: HashMap<String, Vec<u16>> = from_bytes(b"d1:xli1ei2ee1:ylee").unwrap();
    assert_eq!(map["x"], vec![1, 2]);
    assert!(map["y"].is_empty());

    let map: BTreeMap<Bytes, Value> = from_bytes(b"d1:ai1ee").unwrap();
    assert_eq!(map[&Bytes::from_static(b"a")], Value::Integer(1));
}

#[test]
fn test_heterogeneous_dynamic_list() {
    let value: Value = from_bytes(b"li1e1:al1:bed1:ci2eee").unwrap();
    let list = value.as_list().unwrap();
    assert_eq!(list[0], Value::Integer(1));
    assert_eq!(list[1], Value::string("a"));
    assert_eq!(list[2], Value::List(vec![Value::string("b")]));
    assert_eq!(list[3].get(b"c"), Some(&Value::Integer(2)));
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_record_zero_value_encoding() {
    // The empty directive falls back to the field name.
    assert_eq!(
        marshal(&Sample::default()).unwrap(),
        b"d5:attr00:8:int_attri0ee"
    );
}

#[test]
fn test_record_skip_and_omit_empty() {
    let mut sample = Sample {
        attr0: Bytes::from_static(b"raw"),
        attr1: 7,
        attr2: "text".into(),
        attr3: BTreeMap::new(),
    };
    sample.attr3.insert("hidden".into(), true);

    let encoded = marshal(&sample).unwrap();
    assert_eq!(encoded, b"d5:attr03:raw8:int_attri7e8:str_attr4:texte");

    let decoded: Sample = from_bytes(&encoded).unwrap();
    assert_eq!(decoded.attr0, sample.attr0);
    assert_eq!(decoded.attr1, 7);
    assert_eq!(decoded.attr2, "text");
    assert!(decoded.attr3.is_empty());
}

#[test]
fn test_record_skip_field_never_matched() {
    // "attr3" is the declared name of a skipped field; it is treated as unknown.
    let decoded: Sample = from_bytes(b"d5:attr3d1:ai1ee8:int_attri3ee").unwrap();
    assert!(decoded.attr3.is_empty());
    assert_eq!(decoded.attr1, 3);
}

#[test]
fn test_record_unknown_keys_skipped() {
    let data = b"d5:attr01:x7:unknownld1:ali1ei2eee1:zi9e8:int_attri5e4:tailde8:str_attr2:ooe";
    let decoded: Sample = from_bytes(data).unwrap();
    assert_eq!(decoded.attr0, Bytes::from_static(b"x"));
    assert_eq!(decoded.attr1, 5);
    assert_eq!(decoded.attr2, "oo");
}

#[test]
fn test_record_unknown_key_value_is_validated() {
    assert!(matches!(
        decode_err::<Sample>(b"d7:unknowni01ee"),
        BencodeError::LeadingZero
    ));
    assert!(matches!(
        decode_err::<Sample>(b"d7:unknown9:abce"),
        BencodeError::LengthTooBig
    ));
}

#[test]
fn test_record_missing_fields_keep_defaults() {
    let mut sample = Sample {
        attr1: 99,
        ..Sample::default()
    };
    unmarshal(b"d8:str_attr1:se", &mut sample).unwrap();
    assert_eq!(sample.attr1, 99);
    assert_eq!(sample.attr2, "s");
}

#[test]
fn test_record_embedded_flattened() {
    let derived = Derived {
        base: Base {
            id: 3,
            label: "l".into(),
        },
        extra: vec![1, 2],
    };
    let encoded = marshal(&derived).unwrap();
    assert_eq!(encoded, b"d2:idi3e5:extrali1ei2ee5:label1:le");

    let decoded: Derived = from_bytes(&encoded).unwrap();
    assert_eq!(decoded, derived);
}

#[test]
fn test_record_embedded_omit_empty_applies() {
    let derived = Derived {
        base: Base {
            id: 0,
            label: String::new(),
        },
        extra: vec![],
    };
    assert_eq!(marshal(&derived).unwrap(), b"d2:idi0e5:extralee");
}

#[test]
fn test_record_named_record_field_nested() {
    let named = Named {
        base: Base {
            id: 1,
            label: String::new(),
        },
        flag: true,
    };
    let encoded = marshal(&named).unwrap();
    assert_eq!(encoded, b"d4:based2:idi1ee4:flagi1ee");
    assert_eq!(from_bytes::<Named>(&encoded).unwrap(), named);
}

#[test]
fn test_record_embedded_recursively() {
    let nested = Nested {
        derived: Derived {
            base: Base {
                id: 8,
                label: "b".into(),
            },
            extra: vec![3],
        },
        note: "n".into(),
    };
    let encoded = marshal(&nested).unwrap();
    assert_eq!(encoded, b"d2:idi8e4:note1:n5:extrali3ee5:label1:be");
    assert_eq!(from_bytes::<Nested>(&encoded).unwrap(), nested);
}

#[test]
fn test_record_parent_field_shadows_embedded() {
    let shadowed = Shadowed {
        base: Base {
            id: 4,
            label: "x".into(),
        },
        id: "parent".into(),
    };
    assert_eq!(
        marshal(&shadowed).unwrap(),
        b"d2:id6:parent5:label1:xe"
    );

    let decoded: Shadowed = from_bytes(b"d2:id3:new5:label1:ye").unwrap();
    assert_eq!(decoded.id, "new");
    assert_eq!(decoded.base.id, 0);
    assert_eq!(decoded.base.label, "y");
}

#[test]
fn test_record_field_set_resolution() {
    let set = field_set::<Nested>();
    let names: Vec<&[u8]> = set.entries().iter().map(|e| e.wire_name.as_ref()).collect();
    assert_eq!(names, vec![&b"id"[..], &b"label"[..], &b"extra"[..], &b"note"[..]]);
    assert_eq!(set.get(b"label").map(|e| e.path.clone()), Some(vec![0, 0, 1]));
    assert!(std::sync::Arc::ptr_eq(&set, &field_set::<Nested>()));
}

#[test]
fn test_record_optional_fields() {
    let optional = Optional {
        name: None,
        size: Some(10),
    };
    assert_eq!(marshal(&optional).unwrap(), b"d4:sizei10ee");

    let decoded: Optional = from_bytes(b"d4:name1:a4:sizei1ee").unwrap();
    assert_eq!(decoded.name.as_deref(), Some("a"));
    assert_eq!(decoded.size, Some(1));

    let missing = Optional {
        name: None,
        size: None,
    };
    assert!(matches!(marshal(&missing), Err(BencodeError::InvalidValue)));
}

#[test]
fn test_record_is_zero() {
    assert!(Base::default().is_zero());
    assert!(!Base {
        id: 1,
        label: String::new()
    }
    .is_zero());
    assert!(Sample::default().is_zero());
}

#[test]
fn test_records_in_collections() {
    let bases = vec![
        Base {
            id: 1,
            label: "a".into(),
        },
        Base {
            id: 2,
            label: String::new(),
        },
    ];
    let encoded = marshal(&bases).unwrap();
    assert_eq!(encoded, b"ld2:idi1e5:label1:aed2:idi2eee");
    assert_eq!(from_bytes::<Vec<Base>>(&encoded).unwrap(), bases);

    let mut by_name = BTreeMap::new();
    by_name.insert("x".to_string(), bases[0].clone());
    let encoded = marshal(&by_name).unwrap();
    assert_eq!(
        from_bytes::<BTreeMap<String, Base>>(&encoded).unwrap(),
        by_name
    );
}

#[test]
fn test_record_roundtrip_deep() {
    let value = vec![vec![vec![Derived {
        base: Base {
            id: u32::MAX,
            label: "deep".into(),
        },
        extra: vec![i64::MIN, 0, i64::MAX],
    }]]];
    let encoded = marshal(&value).unwrap();
    assert_eq!(from_bytes::<Vec<Vec<Vec<Derived>>>>(&encoded).unwrap(), value);
}

// ============================================================================
// Custom capability
// ============================================================================

#[test]
fn test_custom_capability_takes_precedence() {
    let version = Versioned { major: 1, minor: 2 };
    assert_eq!(marshal(&version).unwrap(), b"3:1.2");
    assert_eq!(from_bytes::<Versioned>(b"3:1.2").unwrap(), version);

    // The record shape is still declared but never consulted.
    assert!(matches!(
        decode_err::<Versioned>(b"d5:majori1e5:minori2ee"),
        BencodeError::InvalidString
    ));
}

#[test]
fn test_custom_capability_inside_record() {
    let release = Release {
        version: Versioned { major: 3, minor: 14 },
        name: "pi".into(),
    };
    let encoded = marshal(&release).unwrap();
    assert_eq!(encoded, b"d4:name2:pi7:version4:3.14e");
    assert_eq!(from_bytes::<Release>(&encoded).unwrap(), release);
}

#[test]
fn test_custom_capability_receives_exact_slice() {
    let raws: Vec<RawValue> = from_bytes(b"li-3e3:abcl1:xed1:ai1eee").unwrap();
    let slices: Vec<&[u8]> = raws.iter().map(RawValue::as_bytes).collect();
    assert_eq!(slices, vec![&b"i-3e"[..], &b"3:abc"[..], &b"l1:xe"[..], &b"d1:ai1ee"[..]]);
}

#[test]
fn test_custom_error_propagates() {
    assert!(matches!(
        decode_err::<Versioned>(b"3:1x2"),
        BencodeError::Custom(_)
    ));
    // The raw slice must still be well-formed before the hook runs.
    assert!(matches!(decode_err::<Versioned>(b"03:1.2"), BencodeError::LeadingZero));
}

#[test]
fn test_raw_value_preserves_order() {
    // Unsorted keys survive a round trip through RawValue untouched.
    let data = b"d3:foo3:bar1:xi1ee";
    let raw: RawValue = from_bytes(data).unwrap();
    assert_eq!(marshal(&raw).unwrap(), data);

    assert!(matches!(marshal(&RawValue::default()), Err(BencodeError::InvalidValue)));
}

#[test]
fn test_omit_empty_raw_and_dynamic_fields() {
    assert_eq!(marshal(&Envelope::default()).unwrap(), b"de");

    let envelope = Envelope {
        raw: RawValue::new(&b"l1:xe"[..]),
        dynamic: Value::Integer(7),
    };
    let encoded = marshal(&envelope).unwrap();
    assert_eq!(encoded, b"d3:rawl1:xe7:dynamici7ee");
    assert_eq!(from_bytes::<Envelope>(&encoded).unwrap(), envelope);

    for empty in [
        Value::Integer(0),
        Value::Bytes(Bytes::new()),
        Value::List(vec![]),
        Value::Dict(BTreeMap::new()),
    ] {
        let envelope = Envelope {
            dynamic: empty,
            ..Envelope::default()
        };
        assert_eq!(marshal(&envelope).unwrap(), b"de");
    }
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_roundtrip_integers() {
    for n in [i64::MIN, -1_000_000, -1, 0, 1, 42, i64::MAX] {
        let encoded = marshal(&n).unwrap();
        assert_eq!(from_bytes::<i64>(&encoded).unwrap(), n);
    }
}

#[test]
fn test_roundtrip_byte_strings() {
    for len in [0usize, 1, 9, 10, 255, 4096] {
        let data = Bytes::from((0..len).map(|i| i as u8).collect::<Vec<u8>>());
        let encoded = marshal(&data).unwrap();
        assert_eq!(from_bytes::<Bytes>(&encoded).unwrap(), data);
    }
}

#[test]
fn test_nested_structures() {
    let data = b"d4:listl4:spami42eee";
    let decoded = from_bytes::<Value>(data).unwrap();
    let encoded = marshal(&decoded).unwrap();
    assert_eq!(encoded, data);
}

#[test]
fn test_encoder_depth_limit() {
    let mut value = Value::Integer(1);
    for _ in 0..70 {
        value = Value::List(vec![value]);
    }
    assert!(matches!(marshal(&value), Err(BencodeError::NestingTooDeep)));

    let mut encoder = Encoder::new().with_max_depth(100);
    encoder.emit(&value).unwrap();
    assert_eq!(encoder.into_bytes().len(), 70 * 2 + 3);
}

#[test]
fn test_encoder_depth_restored_after_error() {
    let mut encoder = Encoder::new().with_max_depth(1);
    assert!(matches!(encoder.emit(&vec![1.5f64]), Err(BencodeError::InvalidType)));
    encoder.emit(&vec![1i64]).unwrap();
}

#[test]
fn test_value_accessors() {
    let value = Value::Integer(42);
    assert_eq!(value.as_integer(), Some(42));
    assert!(value.as_bytes().is_none());

    let value = Value::Bytes(Bytes::from_static(b"test"));
    assert_eq!(value.as_str(), Some("test"));
    assert!(value.as_integer().is_none());

    let value = Value::List(vec![]);
    assert!(value.as_list().is_some());
    assert!(value.as_dict().is_none());
    assert!(value.into_dict().is_none());
}
