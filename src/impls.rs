//! [`Reflect`] for standard library types.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::time::Duration;

use crate::duration::SignedDuration;
use crate::error::FillError;
use crate::shape::{
    ArrayDef, ArrayMut, Def, FillFn, ListDef, MapDef, MapKey, MappingMut, OptionalMut, Reflect,
    ReflectMut, ScalarDef, ScalarMut, SequenceMut, Shape,
};

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn shape() -> Shape {
                    Shape::of::<Self>(Def::Scalar(ScalarDef::$variant))
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Scalar(ScalarMut::$variant(self))
                }
            }
        )*
    };
}

impl_scalar! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    Duration => Duration,
    SignedDuration => SignedDuration,
}

impl MapKey for String {
    fn from_key(key: &str) -> Self {
        key.to_owned()
    }
}

// Box is transparent: it is always allocated, so it describes itself as `T`.
impl<T: Reflect> Reflect for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        (**self).reflect_mut()
    }
}

impl<T: Reflect + Default> Reflect for Option<T> {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Optional(T::shape))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }
}

impl<T: Reflect + Default> OptionalMut for Option<T> {
    fn value_mut(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Sequence(ListDef { item: T::shape }))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Sequence(self)
    }
}

impl<T: Reflect + Default> SequenceMut for Vec<T> {
    fn rebuild(&mut self, len: usize, fill: &mut FillFn<'_>) -> Result<(), FillError> {
        let mut items = Vec::with_capacity(len);
        for index in 0..len {
            let mut item = T::default();
            fill(index, &mut item)?;
            items.push(item);
        }
        *self = items;
        Ok(())
    }
}

impl<T: Reflect + Default, const N: usize> Reflect for [T; N] {
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Array(ArrayDef {
            item: T::shape,
            len: N,
        }))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Array(self)
    }
}

impl<T: Reflect + Default, const N: usize> ArrayMut for [T; N] {
    fn refill(&mut self, fill: &mut FillFn<'_>) -> Result<(), FillError> {
        for (index, slot) in self.iter_mut().enumerate() {
            let mut item = T::default();
            fill(index, &mut item)?;
            *slot = item;
        }
        Ok(())
    }
}

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Mapping(MapDef {
            key: K::shape,
            value: V::shape,
        }))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Mapping(self)
    }
}

impl<K, V, S> MappingMut for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn rebuild(&mut self, keys: &[&str], fill: &mut FillFn<'_>) -> Result<(), FillError> {
        let mut entries = HashMap::with_capacity_and_hasher(keys.len(), S::default());
        for (index, key) in keys.iter().enumerate() {
            let mut value = V::default();
            fill(index, &mut value)?;
            entries.insert(K::from_key(key), value);
        }
        *self = entries;
        Ok(())
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect + Default,
{
    fn shape() -> Shape {
        Shape::of::<Self>(Def::Mapping(MapDef {
            key: K::shape,
            value: V::shape,
        }))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Mapping(self)
    }
}

impl<K, V> MappingMut for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Reflect + Default,
{
    fn rebuild(&mut self, keys: &[&str], fill: &mut FillFn<'_>) -> Result<(), FillError> {
        let mut entries = BTreeMap::new();
        for (index, key) in keys.iter().enumerate() {
            let mut value = V::default();
            fill(index, &mut value)?;
            entries.insert(K::from_key(key), value);
        }
        *self = entries;
        Ok(())
    }
}
