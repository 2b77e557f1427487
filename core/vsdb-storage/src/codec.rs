// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Value codec for vsdb.
//
// A depth-first, length-prefixed, tag-first binary encoding for the
// closed set of value variants a vsdb store holds. Integer and length
// fields are fixed at `u64`/`i64` little-endian rather than host width —
// a new wire format has no existing files to stay host-width-compatible
// with, so the portable choice wins.

use std::collections::HashMap;

/// Tag numbering for each value variant on the wire.
mod tag {
    pub const STRING: u32 = 0;
    pub const DATA: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const DOUBLE: u32 = 3;
    pub const BOOL_TRUE: u32 = 4;
    pub const BOOL_FALSE: u32 = 5;
    pub const DATE: u32 = 6;
    pub const DICTIONARY: u32 = 7;
    pub const ARRAY: u32 = 8;
    pub const SET: u32 = 9;
    pub const NULL: u32 = 10;
}

/// A recursive, dynamically-typed value tree.
///
/// This is a closed sum over exactly the variants the wire format knows
/// about, so there is no "unrecognized input variant" case to handle on
/// encode; unrecognized tags can only arise on decode, where they fall
/// back to `Null` (see [`Value::decode`]).
#[derive(Debug, Clone)]
pub enum Value {
    /// A UTF-8 string.
    String(String),
    /// An opaque byte string.
    Data(Vec<u8>),
    /// A signed 64-bit integer.
    Integer(i64),
    /// An IEEE-754 64-bit float.
    Double(f64),
    /// A boolean.
    Bool(bool),
    /// Seconds since the implementation-defined reference epoch.
    Date(f64),
    /// An ordered sequence of (string key, value) pairs.
    Dictionary(Vec<(String, Value)>),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An unordered collection of values (multiset semantics).
    Set(Vec<Value>),
    /// The null value — also the decode target for unrecognized tags.
    Null,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (String(a), String(b)) => a == b,
            (Data(a), Data(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Double(a), Double(b)) => a == b,
            (Bool(a), Bool(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Null, Null) => true,
            (Array(a), Array(b)) => a == b,
            (Dictionary(a), Dictionary(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.iter().any(|(k2, v2)| k == k2 && v == v2))
            }
            (Set(a), Set(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut remaining: Vec<&Value> = b.iter().collect();
                for item in a {
                    match remaining.iter().position(|x| *x == item) {
                        Some(pos) => {
                            remaining.remove(pos);
                        }
                        None => return false,
                    }
                }
                true
            }
            _ => false,
        }
    }
}

impl Value {
    /// Encode this value tree into a self-describing byte blob.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512);
        write_value(self, &mut buf);
        buf.shrink_to_fit();
        buf
    }

    /// Decode a byte blob produced by [`Value::encode`].
    ///
    /// Truncated buffers and unrecognized tags decode losslessly to
    /// partial/`Null` values rather than erroring — see module docs.
    pub fn decode(bytes: &[u8]) -> Value {
        let mut reader = Reader { buf: bytes, cursor: 0 };
        read_value(&mut reader)
    }
}

// ---------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_string_body(buf: &mut Vec<u8>, s: &str) {
    write_u64(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

fn write_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::String(s) => {
            write_u32(buf, tag::STRING);
            write_string_body(buf, s);
        }
        Value::Data(d) => {
            write_u32(buf, tag::DATA);
            write_u64(buf, d.len() as u64);
            buf.extend_from_slice(d);
        }
        Value::Integer(i) => {
            write_u32(buf, tag::INTEGER);
            write_i64(buf, *i);
        }
        Value::Double(d) => {
            write_u32(buf, tag::DOUBLE);
            write_f64(buf, *d);
        }
        Value::Bool(true) => write_u32(buf, tag::BOOL_TRUE),
        Value::Bool(false) => write_u32(buf, tag::BOOL_FALSE),
        Value::Date(secs) => {
            write_u32(buf, tag::DATE);
            write_f64(buf, *secs);
        }
        Value::Dictionary(entries) => {
            write_u32(buf, tag::DICTIONARY);
            write_u64(buf, entries.len() as u64);
            for (key, val) in entries {
                // Reserved tag slot ahead of each key's String body; the
                // decoder skips it rather than reading it as a tag, since
                // a dictionary key is always a string.
                write_u32(buf, tag::STRING);
                write_string_body(buf, key);
                write_value(val, buf);
            }
        }
        Value::Array(items) => {
            write_u32(buf, tag::ARRAY);
            write_u64(buf, items.len() as u64);
            for item in items {
                write_value(item, buf);
            }
        }
        Value::Set(items) => {
            write_u32(buf, tag::SET);
            write_u64(buf, items.len() as u64);
            for item in items {
                write_value(item, buf);
            }
        }
        Value::Null => write_u32(buf, tag::NULL),
    }
}

// ---------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------

struct Reader<'a> {
    buf: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Read `n` bytes, or zero-filled bytes if the buffer is exhausted.
    /// On overflow the cursor does not advance, so every subsequent
    /// primitive read against a truncated buffer also zero-fills.
    fn read_or_zero(&mut self, n: usize) -> Vec<u8> {
        if self.cursor + n > self.buf.len() {
            return vec![0u8; n];
        }
        let slice = self.buf[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        slice
    }

    /// Read `n` bytes, or `None` if the buffer is exhausted (used only
    /// for `Data` payloads, which decode to `Null` on truncation).
    fn read_data_or_none(&mut self, n: usize) -> Option<Vec<u8>> {
        if self.cursor + n > self.buf.len() {
            return None;
        }
        let slice = self.buf[self.cursor..self.cursor + n].to_vec();
        self.cursor += n;
        Some(slice)
    }

    /// Advance the cursor without reading — used to skip the dictionary
    /// entry's placeholder tag slot.
    fn skip(&mut self, n: usize) {
        self.cursor += n;
    }

    fn read_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.read_or_zero(4).try_into().unwrap())
    }

    fn read_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.read_or_zero(8).try_into().unwrap())
    }

    fn read_i64(&mut self) -> i64 {
        i64::from_le_bytes(self.read_or_zero(8).try_into().unwrap())
    }

    fn read_f64(&mut self) -> f64 {
        f64::from_le_bytes(self.read_or_zero(8).try_into().unwrap())
    }

    fn read_string_body(&mut self) -> String {
        let len = self.read_u64() as usize;
        let bytes = self.read_or_zero(len);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

fn read_value(r: &mut Reader) -> Value {
    let t = r.read_u32();
    match t {
        tag::STRING => Value::String(r.read_string_body()),
        tag::DATA => {
            let len = r.read_u64() as usize;
            match r.read_data_or_none(len) {
                Some(bytes) => Value::Data(bytes),
                None => Value::Null,
            }
        }
        tag::INTEGER => Value::Integer(r.read_i64()),
        tag::DOUBLE => Value::Double(r.read_f64()),
        tag::BOOL_TRUE => Value::Bool(true),
        tag::BOOL_FALSE => Value::Bool(false),
        tag::DATE => Value::Date(r.read_f64()),
        tag::DICTIONARY => {
            let count = r.read_u64();
            let mut entries = Vec::with_capacity(count.min(1 << 20) as usize);
            for _ in 0..count {
                r.skip(4);
                let key = r.read_string_body();
                let val = read_value(r);
                entries.push((key, val));
            }
            Value::Dictionary(entries)
        }
        tag::ARRAY => {
            let count = r.read_u64();
            let mut items = Vec::with_capacity(count.min(1 << 20) as usize);
            for _ in 0..count {
                items.push(read_value(r));
            }
            Value::Array(items)
        }
        tag::SET => {
            let count = r.read_u64();
            let mut items = Vec::with_capacity(count.min(1 << 20) as usize);
            for _ in 0..count {
                items.push(read_value(r));
            }
            Value::Set(items)
        }
        // tag::NULL and any unrecognized tag both decode to Null.
        _ => Value::Null,
    }
}

/// Build a [`Value::Dictionary`] from a map of decoded glob results.
/// Exposed for the typed facade's glob-read aggregation.
pub(crate) fn dictionary_from_map(map: HashMap<String, Value>) -> Value {
    Value::Dictionary(map.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_scalars() {
        for v in [
            Value::String("Alice".into()),
            Value::Data(vec![1, 2, 3, 4]),
            Value::Integer(-7),
            Value::Double(1.5),
            Value::Bool(true),
            Value::Bool(false),
            Value::Date(1_700_000_000.0),
            Value::Null,
        ] {
            let bytes = v.encode();
            assert_eq!(Value::decode(&bytes), v);
        }
    }

    #[test]
    fn round_trip_dictionary() {
        let dict = Value::Dictionary(vec![
            ("n".into(), Value::String("A".into())),
            ("age".into(), Value::Integer(30)),
        ]);
        let bytes = dict.encode();
        let decoded = Value::decode(&bytes);
        assert_eq!(decoded, dict);
    }

    #[test]
    fn round_trip_nested_array_mixed_types() {
        let arr = Value::Array(vec![
            Value::String("s".into()),
            Value::Integer(-7),
            Value::Double(1.5),
            Value::Bool(true),
            Value::Null,
        ]);
        let bytes = arr.encode();
        assert_eq!(Value::decode(&bytes), arr);
    }

    #[test]
    fn round_trip_set_is_multiset_equal_regardless_of_order() {
        let a = Value::Set(vec![Value::Integer(1), Value::Integer(2), Value::Integer(2)]);
        let b = Value::Set(vec![Value::Integer(2), Value::Integer(1), Value::Integer(2)]);
        assert_eq!(a, b);

        let bytes = a.encode();
        assert_eq!(Value::decode(&bytes), b);
    }

    #[test]
    fn dictionary_equality_ignores_entry_order() {
        let a = Value::Dictionary(vec![
            ("x".into(), Value::Integer(1)),
            ("y".into(), Value::Integer(2)),
        ]);
        let b = Value::Dictionary(vec![
            ("y".into(), Value::Integer(2)),
            ("x".into(), Value::Integer(1)),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn deep_nesting_does_not_fail() {
        let mut v = Value::Integer(0);
        for _ in 0..200 {
            v = Value::Array(vec![v]);
        }
        let bytes = v.encode();
        let decoded = Value::decode(&bytes);
        assert_eq!(decoded, v);
    }

    #[test]
    fn unknown_tag_decodes_to_null() {
        let mut bytes = Vec::new();
        write_u32(&mut bytes, 999);
        assert_eq!(Value::decode(&bytes), Value::Null);
    }

    #[test]
    fn truncated_data_decodes_to_null() {
        let mut bytes = Vec::new();
        write_u32(&mut bytes, tag::DATA);
        write_u64(&mut bytes, 100); // claims 100 bytes, none present
        assert_eq!(Value::decode(&bytes), Value::Null);
    }

    #[test]
    fn truncated_integer_zero_fills() {
        let mut bytes = Vec::new();
        write_u32(&mut bytes, tag::INTEGER);
        // no payload at all
        assert_eq!(Value::decode(&bytes), Value::Integer(0));
    }

    #[test]
    fn empty_buffer_decodes_to_null() {
        assert_eq!(Value::decode(&[]), Value::Null);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn string_round_trips(s in ".*") {
            let v = Value::String(s);
            let bytes = v.encode();
            prop_assert_eq!(Value::decode(&bytes), v);
        }

        #[test]
        fn integer_round_trips(i: i64) {
            let v = Value::Integer(i);
            let bytes = v.encode();
            prop_assert_eq!(Value::decode(&bytes), v);
        }

        #[test]
        fn data_round_trips(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let v = Value::Data(bytes);
            let encoded = v.encode();
            prop_assert_eq!(Value::decode(&encoded), v);
        }

        #[test]
        fn array_of_integers_round_trips(items in proptest::collection::vec(any::<i64>(), 0..32)) {
            let v = Value::Array(items.into_iter().map(Value::Integer).collect());
            let bytes = v.encode();
            prop_assert_eq!(Value::decode(&bytes), v);
        }
    }
}
