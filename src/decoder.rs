use std::path::Path;

use tracing::{debug, trace};

use crate::annotate::Annotator;
use crate::error::DecodeError;
use crate::fields::FieldCache;
use crate::fill::Filler;
use crate::format::Format;
use crate::shape::{Def, Reflect, Shape};
use crate::tree;

/// Decode `data` into `target` using the process-wide field cache.
///
/// See [`Decoder::decode`].
pub fn decode<T: Reflect>(data: &[u8], hint: &str, target: &mut T) -> Result<(), DecodeError> {
    Decoder::new().decode(data, hint, target)
}

/// Decode the file at `path` into `target` using the process-wide field cache.
///
/// See [`Decoder::decode_file`].
pub fn decode_file<T: Reflect>(path: impl AsRef<Path>, target: &mut T) -> Result<(), DecodeError> {
    Decoder::new().decode_file(path, target)
}

/// Drives a decode: parse, build the node tree, annotate it against the
/// destination type, then fill the destination.
///
/// A decoder borrows the [`FieldCache`] that memoizes field resolution. The
/// default one shares the process-wide cache; [`with_cache`](Self::with_cache)
/// keeps resolution state local, e.g. per test.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'c> {
    cache: &'c FieldCache,
}

impl Decoder<'static> {
    pub fn new() -> Self {
        Self {
            cache: FieldCache::global(),
        }
    }
}

impl Default for Decoder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'c> Decoder<'c> {
    pub fn with_cache(cache: &'c FieldCache) -> Self {
        Self { cache }
    }

    /// Decode `data`, in the format named by `hint`, into `target`.
    ///
    /// `hint` is an extension with or without its leading dot: `toml`, `yaml`,
    /// `yml` or `json`. After following optional indirection the target must
    /// be a composite, a mapping or a [`Value`](crate::Value); anything else
    /// is rejected before `data` is looked at.
    ///
    /// Fields present in `target` but absent from the source keep their
    /// current value. Source keys with no matching field are ignored.
    pub fn decode<T: Reflect>(
        &self,
        data: &[u8],
        hint: &str,
        target: &mut T,
    ) -> Result<(), DecodeError> {
        let shape = check_target(T::shape())?;
        let format = Format::from_hint(hint)?;
        debug!(%format, type_name = shape.type_name, len = data.len(), "decoding");

        let mapping = format.parse(data)?;
        trace!(keys = mapping.len(), "parsed source mapping");

        let mut root = tree::build(mapping)?;
        Annotator::new(self.cache).annotate(&mut root, shape)?;
        trace!("annotated node tree");

        Filler::new(self.cache).fill(&root, target)?;
        debug!(type_name = shape.type_name, "decoded");
        Ok(())
    }

    /// Read the file at `path` and decode it into `target`, picking the
    /// format from the file extension.
    pub fn decode_file<T: Reflect>(
        &self,
        path: impl AsRef<Path>,
        target: &mut T,
    ) -> Result<(), DecodeError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| DecodeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let hint = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        debug!(path = %path.display(), "decoding file");

        self.decode(&data, &hint, target)
            .map_err(|e| DecodeError::File {
                path: path.to_path_buf(),
                source: Box::new(e),
            })
    }
}

/// Only composites, mappings and dynamic values can be decoded into.
fn check_target(shape: Shape) -> Result<Shape, DecodeError> {
    let peeled = shape.peel();
    match peeled.def {
        Def::Composite(_) | Def::Mapping(_) | Def::Dynamic => Ok(shape),
        _ => Err(DecodeError::UnsupportedTarget {
            type_name: peeled.type_name,
        }),
    }
}
