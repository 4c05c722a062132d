use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;

use thiserror::Error;

use crate::duration::DurationError;
use crate::shape::Kind;

/// Errors returned by [`decode`](crate::decode) and friends.
///
/// Pipeline failures are wrapped with the stage that produced them; the inner
/// error carries the key path of the offending value.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(
        "cannot decode to unsupported type {type_name:?}; supported types are composites, maps, or Value"
    )]
    UnsupportedTarget { type_name: &'static str },

    #[error("failed to unmarshal data: {0}")]
    Unmarshal(#[from] SourceError),

    #[error("failed to build nodes: {0}")]
    Build(#[from] BuildError),

    #[error("failed to add metadata: {0}")]
    Annotate(#[from] AnnotateError),

    #[error("failed to fill value: {0}")]
    Fill(#[from] FillError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("decode file {path}: {source}")]
    File {
        path: PathBuf,
        source: Box<DecodeError>,
    },
}

/// The raw bytes could not be turned into a generic mapping.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unsupported extension {0:?}")]
    UnsupportedExtension(String),

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Location of a value in the source document, e.g. `retry.timeout` or `tags[1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath {
    // innermost segment first; errors extend the path while unwinding
    segments: Vec<String>,
}

impl KeyPath {
    pub(crate) fn push_parent(&mut self, segment: &str) {
        self.segments.push(segment.to_owned());
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments from the outermost key inward.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().rev().map(String::as_str)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments().enumerate() {
            if i > 0 && !segment.starts_with('[') {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// The generic mapping held a value with no string form.
#[derive(Debug, Error)]
#[error("cannot decode value from unsupported type {value_kind} at {path}")]
pub struct BuildError {
    path: KeyPath,
    value_kind: &'static str,
}

impl BuildError {
    pub(crate) fn new(value_kind: &'static str) -> Self {
        Self {
            path: KeyPath::default(),
            value_kind,
        }
    }

    pub(crate) fn at(mut self, segment: &str) -> Self {
        self.path.push_parent(segment);
        self
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn value_kind(&self) -> &'static str {
        self.value_kind
    }
}

/// The destination type could not be matched against the node tree.
#[derive(Debug, Error)]
#[error("{kind} at {path}")]
pub struct AnnotateError {
    path: KeyPath,
    kind: AnnotateErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotateErrorKind {
    #[error("unsupported type {type_name:?}")]
    UnsupportedKind { type_name: &'static str },

    #[error("map with non-string key type ({key_type} in {map_type:?}) is not supported")]
    UnsupportedKey {
        key_type: &'static str,
        map_type: &'static str,
    },

    #[error("expected array length {expected}, but got {found}")]
    LengthMismatch { expected: usize, found: usize },
}

impl AnnotateError {
    pub(crate) fn at(mut self, segment: &str) -> Self {
        self.path.push_parent(segment);
        self
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn kind(&self) -> &AnnotateErrorKind {
        &self.kind
    }
}

impl From<AnnotateErrorKind> for AnnotateError {
    fn from(kind: AnnotateErrorKind) -> Self {
        Self {
            path: KeyPath::default(),
            kind,
        }
    }
}

/// A leaf could not be converted, or a destination slot could not be reached.
#[derive(Debug, Error)]
#[error("{kind} at {path}")]
pub struct FillError {
    path: KeyPath,
    kind: FillErrorKind,
}

#[derive(Debug, Error)]
pub enum FillErrorKind {
    #[error("invalid integer {value:?} for {type_name}: {source}")]
    InvalidInteger {
        value: String,
        type_name: &'static str,
        source: ParseIntError,
    },

    #[error("invalid float {value:?} for {type_name}: {source}")]
    InvalidFloat {
        value: String,
        type_name: &'static str,
        source: ParseFloatError,
    },

    #[error("float {value:?} is out of range for {type_name}")]
    FloatOutOfRange {
        value: String,
        type_name: &'static str,
    },

    #[error("invalid boolean {value:?}")]
    InvalidBool { value: String },

    #[error(transparent)]
    InvalidDuration(#[from] DurationError),

    #[error("named field ({field} in {type_name:?}) not found")]
    FieldNotFound {
        field: &'static str,
        type_name: &'static str,
    },

    #[error("cannot fill a {found} destination as {expected}")]
    Mismatch { expected: Kind, found: &'static str },
}

impl FillError {
    pub(crate) fn at(mut self, segment: &str) -> Self {
        self.path.push_parent(segment);
        self
    }

    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    pub fn kind(&self) -> &FillErrorKind {
        &self.kind
    }
}

impl From<FillErrorKind> for FillError {
    fn from(kind: FillErrorKind) -> Self {
        Self {
            path: KeyPath::default(),
            kind,
        }
    }
}
