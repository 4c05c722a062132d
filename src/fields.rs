//! Field resolution for composite types.
//!
//! The decodable fields of a composite are its exported fields plus those
//! promoted from embedded members, following the usual shadowing rules:
//!
//! - a shallower field hides any deeper field of the same name;
//! - two fields of the same name at the same depth hide each other, and the
//!   name is dropped entirely;
//! - an embedded member's own name is claimed at its depth, so a deeper field
//!   cannot take it over.
//!
//! Resolution walks the embedding graph breadth-first and visits each
//! composite type at most once, so self-embedding cycles terminate. Results
//! are cached per type in a [`FieldCache`].

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::trace;

use crate::shape::{Def, Shape};

/// A decodable field of a composite.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedField {
    /// Field name as declared.
    pub(crate) name: &'static str,
    /// Embedded member names leading from the composite to the struct that
    /// declares the field. Empty for direct fields.
    pub(crate) path: Vec<&'static str>,
    pub(crate) shape: fn() -> Shape,
}

/// Resolve the decodable fields of a composite shape.
///
/// Returns an empty list for any shape that is not a composite. Fields keep
/// their declaration order within each depth, shallower depths first.
pub(crate) fn resolve_fields(shape: &Shape) -> Vec<ResolvedField> {
    let mut resolved = Vec::new();
    let mut claimed: HashSet<&'static str> = HashSet::new();
    let mut visited: HashSet<TypeId> = HashSet::new();
    let mut next: Vec<(Shape, Vec<&'static str>)> = vec![(*shape, Vec::new())];

    while !next.is_empty() {
        let current = std::mem::take(&mut next);
        // name -> (occurrences at this depth, first occurrence)
        let mut counts: Vec<(&'static str, usize, Option<ResolvedField>)> = Vec::new();

        for (shape, path) in current {
            if !visited.insert(shape.id) {
                continue;
            }
            let Def::Composite(fields) = shape.def else {
                continue;
            };

            for field in fields {
                if !field.exported && !field.embedded {
                    continue;
                }

                // one level of optional indirection is looked through
                let mut member = (field.shape)();
                if let Def::Optional(inner) = member.def {
                    member = inner();
                }

                if field.embedded && matches!(member.def, Def::Composite(_)) {
                    let mut member_path = path.clone();
                    member_path.push(field.name);
                    next.push((member, member_path));
                    claimed.insert(field.name);
                    continue;
                }

                match counts.iter_mut().find(|(name, _, _)| *name == field.name) {
                    Some((_, count, _)) => *count += 1,
                    None => counts.push((
                        field.name,
                        1,
                        Some(ResolvedField {
                            name: field.name,
                            path: path.clone(),
                            shape: field.shape,
                        }),
                    )),
                }
            }
        }

        for (name, count, first) in counts {
            if count == 1
                && !claimed.contains(name)
                && let Some(field) = first
            {
                resolved.push(field);
            }
            claimed.insert(name);
        }
    }

    resolved
}

/// Pick the resolved field a source key refers to: an exact-case match if
/// there is one, otherwise the first case-insensitive match.
pub(crate) fn find_field<'a>(fields: &'a [ResolvedField], key: &str) -> Option<&'a ResolvedField> {
    if let Some(exact) = fields.iter().find(|f| f.name == key) {
        return Some(exact);
    }
    let folded = key.to_lowercase();
    fields.iter().find(|f| f.name.to_lowercase() == folded)
}

/// Per-type memo of composite field resolution, safe to share between threads.
///
/// Resolution for a given type is deterministic, so when two threads miss on
/// the same type concurrently the second insert simply replaces an equal entry.
#[derive(Debug, Default)]
pub struct FieldCache {
    entries: RwLock<HashMap<TypeId, Arc<[ResolvedField]>>>,
}

static GLOBAL: Lazy<FieldCache> = Lazy::new(FieldCache::new);

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`Decoder::new`](crate::Decoder::new).
    pub fn global() -> &'static FieldCache {
        &GLOBAL
    }

    /// Resolved fields for `shape`, computed on first request.
    pub(crate) fn resolve(&self, shape: &Shape) -> Arc<[ResolvedField]> {
        if let Some(fields) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&shape.id)
        {
            return Arc::clone(fields);
        }

        trace!(type_name = shape.type_name, "resolving composite fields");
        let fields: Arc<[ResolvedField]> = resolve_fields(shape).into();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(shape.id, Arc::clone(&fields));
        fields
    }

    /// Number of cached types.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
