//! Type-directed configuration decoding. Describe a struct, hand it TOML,
//! YAML or JSON, and get it filled.
//!
//! ```
//! use std::time::Duration;
//!
//! cfgshape::composite! {
//!     #[derive(Debug, Default)]
//!     pub struct Retry {
//!         pub count: u32,
//!         pub timeout: Duration,
//!     }
//! }
//!
//! fn main() -> Result<(), cfgshape::DecodeError> {
//!     let mut retry = Retry::default();
//!     cfgshape::decode(br#"{"count": 3, "timeout": "5s"}"#, "json", &mut retry)?;
//!     assert_eq!(retry.count, 3);
//!     assert_eq!(retry.timeout, Duration::from_secs(5));
//!     Ok(())
//! }
//! ```
//!
//! # How values are interpreted
//!
//! The source document is first decoded into a generic mapping by an
//! off-the-shelf parser, and every scalar in it is turned into text: `8080`
//! becomes `"8080"`, `true` becomes `"true"`, `2.5` becomes `"2.500000"`.
//! The destination type alone decides how that text is read back. A `u16`
//! field parses it as an integer, a `String` field takes it as is, and a
//! [`Duration`](std::time::Duration) field parses a duration expression such
//! as `"1h30m"`. So `port = "8080"` and `port = 8080` decode the same way,
//! and a numeric source value lands fine in a string field. Negative
//! durations such as `"-30s"` need a [`SignedDuration`] field.
//!
//! # Destinations
//!
//! The top-level target must be a composite (a struct registered with
//! [`composite!`]), a string-keyed map, or a [`Value`], optionally behind
//! `Option`. Inside, fields can be any scalar, `String`, `Duration`,
//! [`SignedDuration`], `Vec`, fixed-size arrays, maps with `String` or
//! [`Value`] keys, `Option`, `Box`, nested composites, or [`Value`].
//!
//! - **Field matching** is case-insensitive, preferring an exact match.
//!   Source keys with no matching field are ignored. Fields the source does
//!   not mention keep their current value.
//! - **Embedding**: a member marked `@embed` has its fields promoted into the
//!   enclosing composite. A shallower field hides a deeper one of the same
//!   name; two promoted fields of the same name at the same depth hide each
//!   other and neither is decoded.
//! - **Private fields** (no visibility modifier) are never decoded.
//! - **Dynamic values**: a [`Value`] takes its shape from the source. Leaves
//!   become strings, lists become sequences, everything else string-keyed
//!   mappings.
//! - **Fixed-size arrays** require the source list to have exactly the same
//!   length.
//!
//! # Errors
//!
//! Every failure aborts the decode and is reported as a [`DecodeError`]
//! naming the stage that failed. Errors from the later stages carry the key
//! path of the offending value, such as `retry.timeout` or `tags[1]`.
//!
//! # Field resolution cache
//!
//! Resolving the decodable fields of a composite walks its embedded members;
//! the result is cached per type in a [`FieldCache`]. [`decode`] and
//! [`decode_file`] use a process-wide cache. Use [`Decoder::with_cache`] to
//! supply your own.

pub mod error;
pub mod format;

mod annotate;
mod decoder;
mod duration;
mod fields;
mod fill;
mod impls;
mod macros;
mod raw;
mod shape;
mod tree;
mod value;

#[cfg(test)]
mod fixtures;

pub use decoder::{Decoder, decode, decode_file};
pub use duration::{DurationError, SignedDuration, parse_duration, parse_signed_duration};
pub use error::DecodeError;
pub use fields::FieldCache;
pub use format::Format;
pub use shape::{
    ArrayDef, ArrayMut, CompositeMut, Def, Field, FillFn, Kind, ListDef, MapDef, MapKey,
    MappingMut, OptionalMut, Reflect, ReflectMut, ScalarDef, ScalarMut, SequenceMut, Shape,
};
pub use value::Value;
