//! The generic mapping: what an external format decoder produces before any
//! type-directed interpretation.
//!
//! [`RawValue`] deserializes from any self-describing serde format through
//! `deserialize_any`, so the TOML and YAML decoders share one representation.
//! Values with no place in the mapping model (nulls, byte strings, TOML
//! datetimes) are kept as [`RawValue::Unsupported`] and rejected later by the
//! tree builder, which knows the key path.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

/// String-keyed mapping. Source mappings are unordered.
pub type RawMap = BTreeMap<String, RawValue>;

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Sequence(Vec<RawValue>),
    Mapping(RawMap),
    /// A value of the named kind that has no string form.
    Unsupported(&'static str),
}

// The toml crate hands datetimes to `deserialize_any` as a single-entry map
// under this key.
const TOML_DATETIME_FIELD: &str = "$__toml_private_datetime";

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawVisitor)
    }
}

struct RawVisitor;

impl<'de> Visitor<'de> for RawVisitor {
    type Value = RawValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, boolean, number, sequence, or mapping")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<RawValue, E> {
        Ok(RawValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawValue, E> {
        Ok(RawValue::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawValue, E> {
        Ok(RawValue::Uint(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawValue, E> {
        Ok(RawValue::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawValue, E> {
        Ok(RawValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawValue, E> {
        Ok(RawValue::String(v))
    }

    fn visit_bytes<E: de::Error>(self, _v: &[u8]) -> Result<RawValue, E> {
        Ok(RawValue::Unsupported("bytes"))
    }

    fn visit_unit<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Unsupported("null"))
    }

    fn visit_none<E: de::Error>(self) -> Result<RawValue, E> {
        Ok(RawValue::Unsupported("null"))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RawValue, D::Error> {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(RawValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawValue, A::Error> {
        let mut entries = RawMap::new();
        let mut datetime = false;
        while let Some(key) = map.next_key::<String>()? {
            let value: RawValue = map.next_value()?;
            if key == TOML_DATETIME_FIELD {
                datetime = true;
                continue;
            }
            entries.insert(key, value);
        }
        if datetime {
            return Ok(RawValue::Unsupported("datetime"));
        }
        Ok(RawValue::Mapping(entries))
    }
}
