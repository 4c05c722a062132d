//! The fully dynamic destination.
//!
//! Decoding into a [`Value`] (or into a container of them) lets the source
//! data pick the shape: leaves become [`Value::String`] whatever their source
//! type, sequences become [`Value::Sequence`], and everything else becomes a
//! string-keyed [`Value::Mapping`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::shape::{Def, MapKey, Reflect, ReflectMut, Shape};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Nothing decoded yet.
    #[default]
    Null,
    String(String),
    Sequence(Vec<Value>),
    Mapping(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up `key` when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping()?.get(key)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl Reflect for Value {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Dynamic)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(self)
    }
}

impl MapKey for Value {
    fn from_key(key: &str) -> Self {
        Self::String(key.to_owned())
    }
}
