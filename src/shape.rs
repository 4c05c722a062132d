//! Type descriptors: how the decoder sees a destination type.
//!
//! A destination type implements [`Reflect`], which exposes two views of it:
//!
//! - a static [`Shape`] describing what the type looks like (scalar, composite
//!   with named fields, mapping, sequence, fixed-size array, optional, or fully
//!   dynamic). The annotator walks shapes before anything is written.
//! - a [`ReflectMut`] handle to a live value. The filler writes through it.
//!
//! Shapes reference nested shapes through `fn() -> Shape` pointers, so a
//! recursive type (a tree of `Vec<Self>`) describes itself lazily.
//!
//! Most types never implement these traits by hand: the standard scalars and
//! containers are covered by the crate, and structs are registered with the
//! [`composite!`](crate::composite) macro.

use std::any::{TypeId, type_name};
use std::fmt;
use std::time::Duration;

use crate::duration::SignedDuration;
use crate::error::FillError;
use crate::value::Value;

/// A type the decoder can describe and write into.
pub trait Reflect: 'static {
    /// The static description of this type.
    fn shape() -> Shape
    where
        Self: Sized;

    /// A writable handle to this value.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;
}

/// Describes a destination type.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    /// Identity of the described type. Keys the field cache.
    pub id: TypeId,
    /// Human-readable type name, used in error messages.
    pub type_name: &'static str,
    pub def: Def,
}

impl Shape {
    /// Describe `T` with the given definition.
    pub fn of<T: ?Sized + 'static>(def: Def) -> Self {
        Self {
            id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            def,
        }
    }

    /// Follow [`Def::Optional`] indirection until a non-optional shape is reached.
    pub fn peel(self) -> Self {
        match self.def {
            Def::Optional(inner) => inner().peel(),
            _ => self,
        }
    }
}

/// The structural definition of a [`Shape`].
#[derive(Debug, Clone, Copy)]
pub enum Def {
    /// A leaf parsed from text: numbers, booleans, strings, durations.
    Scalar(ScalarDef),

    /// A record with named fields, e.g. a struct registered with `composite!`.
    Composite(&'static [Field]),

    /// Keyed entries with homogeneous values, e.g. `HashMap<String, T>`.
    Mapping(MapDef),

    /// Variable-length list, e.g. `Vec<T>`.
    Sequence(ListDef),

    /// Fixed-length list, e.g. `[T; 3]`.
    Array(ArrayDef),

    /// A value that may be absent. The decoder allocates a default when it
    /// has something to write.
    Optional(fn() -> Shape),

    /// Unconstrained: the shape is taken from the source data. See [`Value`].
    Dynamic,

    /// A type the decoder cannot fill.
    Opaque,
}

#[derive(Debug, Clone, Copy)]
pub struct MapDef {
    pub key: fn() -> Shape,
    pub value: fn() -> Shape,
}

#[derive(Debug, Clone, Copy)]
pub struct ListDef {
    pub item: fn() -> Shape,
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayDef {
    pub item: fn() -> Shape,
    pub len: usize,
}

/// Leaf representations the filler knows how to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarDef {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    String,
    /// A [`Duration`], parsed from expressions such as `"1h30m"` or `"250ms"`.
    /// Only this representation gets duration parsing; plain integers never do.
    Duration,
    /// A [`SignedDuration`], parsed from the same expressions, negative ones
    /// included.
    SignedDuration,
}

impl ScalarDef {
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Duration => "duration",
            Self::SignedDuration => "signed duration",
        }
    }
}

impl fmt::Display for ScalarDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared member of a composite.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub shape: fn() -> Shape,
    /// Visible outside its defining module. Private members are not decoded.
    pub exported: bool,
    /// The member's own fields are promoted into the enclosing composite.
    pub embedded: bool,
}

impl Field {
    pub const fn new(name: &'static str, shape: fn() -> Shape) -> Self {
        Self {
            name,
            shape,
            exported: true,
            embedded: false,
        }
    }

    pub const fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub const fn embed(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// The destination kind a node was annotated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar(ScalarDef),
    Composite,
    Mapping,
    Sequence,
    Array(usize),
    Dynamic,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(def) => write!(f, "{def}"),
            Self::Composite => f.write_str("composite"),
            Self::Mapping => f.write_str("mapping"),
            Self::Sequence => f.write_str("sequence"),
            Self::Array(len) => write!(f, "array of {len}"),
            Self::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Writable handle to a live value, by representation.
pub enum ReflectMut<'a> {
    Scalar(ScalarMut<'a>),
    Composite(&'a mut dyn CompositeMut),
    Mapping(&'a mut dyn MappingMut),
    Sequence(&'a mut dyn SequenceMut),
    Array(&'a mut dyn ArrayMut),
    Optional(&'a mut dyn OptionalMut),
    Dynamic(&'a mut Value),
    Opaque,
}

impl ReflectMut<'_> {
    /// Short name of the representation, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Scalar(scalar) => scalar.def().name(),
            Self::Composite(_) => "composite",
            Self::Mapping(_) => "mapping",
            Self::Sequence(_) => "sequence",
            Self::Array(_) => "array",
            Self::Optional(_) => "optional",
            Self::Dynamic(_) => "dynamic",
            Self::Opaque => "opaque",
        }
    }
}

pub enum ScalarMut<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    String(&'a mut String),
    Duration(&'a mut Duration),
    SignedDuration(&'a mut SignedDuration),
}

impl ScalarMut<'_> {
    pub fn def(&self) -> ScalarDef {
        match self {
            Self::Bool(_) => ScalarDef::Bool,
            Self::I8(_) => ScalarDef::I8,
            Self::I16(_) => ScalarDef::I16,
            Self::I32(_) => ScalarDef::I32,
            Self::I64(_) => ScalarDef::I64,
            Self::Isize(_) => ScalarDef::Isize,
            Self::U8(_) => ScalarDef::U8,
            Self::U16(_) => ScalarDef::U16,
            Self::U32(_) => ScalarDef::U32,
            Self::U64(_) => ScalarDef::U64,
            Self::Usize(_) => ScalarDef::Usize,
            Self::F32(_) => ScalarDef::F32,
            Self::F64(_) => ScalarDef::F64,
            Self::String(_) => ScalarDef::String,
            Self::Duration(_) => ScalarDef::Duration,
            Self::SignedDuration(_) => ScalarDef::SignedDuration,
        }
    }
}

/// Callback a container invokes once per freshly constructed element, with the
/// element's index in the source node.
pub type FillFn<'f> = dyn FnMut(usize, &mut dyn Reflect) -> Result<(), FillError> + 'f;

pub trait CompositeMut {
    /// Shape of the concrete composite behind this handle.
    fn type_shape(&self) -> Shape;

    /// The direct member named `name`, without following embedded members.
    fn field_mut(&mut self, name: &str) -> Option<&mut dyn Reflect>;
}

pub trait MappingMut {
    /// Replace the contents with one fresh entry per key, each filled by `fill`.
    fn rebuild(&mut self, keys: &[&str], fill: &mut FillFn<'_>) -> Result<(), FillError>;
}

pub trait SequenceMut {
    /// Replace the contents with `len` fresh elements, each filled by `fill`.
    fn rebuild(&mut self, len: usize, fill: &mut FillFn<'_>) -> Result<(), FillError>;
}

pub trait ArrayMut {
    /// Overwrite every slot in place with a fresh element filled by `fill`.
    fn refill(&mut self, fill: &mut FillFn<'_>) -> Result<(), FillError>;
}

pub trait OptionalMut {
    /// The contained value, allocating a default one when absent.
    fn value_mut(&mut self) -> &mut dyn Reflect;
}

/// A mapping key type, built from the source key text.
pub trait MapKey: Reflect + Sized {
    fn from_key(key: &str) -> Self;
}
