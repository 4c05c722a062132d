//! Metadata annotation: matching the node tree against the destination shape.
//!
//! Each node gets the [`Kind`] it will be filled as, and children of a
//! composite get the name of the field they land in. Source keys with no
//! matching field are left unannotated and the filler skips them.

use tracing::trace;

use crate::error::{AnnotateError, AnnotateErrorKind};
use crate::fields::{FieldCache, find_field};
use crate::shape::{ArrayDef, Def, Kind, MapDef, Reflect, ScalarDef, Shape};
use crate::tree::Node;
use crate::value::Value;

pub(crate) struct Annotator<'c> {
    cache: &'c FieldCache,
}

impl<'c> Annotator<'c> {
    pub(crate) fn new(cache: &'c FieldCache) -> Self {
        Self { cache }
    }

    /// Annotate the root node for a destination of the given shape.
    pub(crate) fn annotate(&self, root: &mut Node, shape: Shape) -> Result<(), AnnotateError> {
        if matches!(shape.peel().def, Def::Dynamic) {
            // the root is a mapping even when the document is empty
            root.kind = Some(Kind::Mapping);
            return self.annotate_items(root, Value::shape);
        }
        self.annotate_node(root, shape)
    }

    fn annotate_node(&self, node: &mut Node, shape: Shape) -> Result<(), AnnotateError> {
        let shape = shape.peel();
        match shape.def {
            Def::Scalar(def) => {
                node.kind = Some(Kind::Scalar(def));
                Ok(())
            }
            Def::Composite(_) => {
                node.kind = Some(Kind::Composite);
                self.annotate_composite(node, &shape)
            }
            Def::Sequence(list) => {
                node.kind = Some(Kind::Sequence);
                self.annotate_items(node, list.item)
            }
            Def::Array(array) => self.annotate_array(node, array),
            Def::Mapping(map) => self.annotate_mapping(node, &shape, map),
            Def::Dynamic => self.annotate_dynamic(node),
            Def::Optional(_) | Def::Opaque => Err(AnnotateErrorKind::UnsupportedKind {
                type_name: shape.type_name,
            }
            .into()),
        }
    }

    fn annotate_composite(&self, node: &mut Node, shape: &Shape) -> Result<(), AnnotateError> {
        let fields = self.cache.resolve(shape);
        for child in &mut node.children {
            let Some(field) = find_field(&fields, &child.name) else {
                trace!(
                    key = %child.name,
                    type_name = shape.type_name,
                    "no matching field, skipping"
                );
                continue;
            };
            child.field_name = Some(field.name);
            self.annotate_node(child, (field.shape)())
                .map_err(|e| e.at(&child.name))?;
        }
        Ok(())
    }

    fn annotate_items(&self, node: &mut Node, item: fn() -> Shape) -> Result<(), AnnotateError> {
        for child in &mut node.children {
            self.annotate_node(child, item())
                .map_err(|e| e.at(&child.name))?;
        }
        Ok(())
    }

    fn annotate_array(&self, node: &mut Node, array: ArrayDef) -> Result<(), AnnotateError> {
        node.kind = Some(Kind::Array(array.len));
        if node.children.len() != array.len {
            return Err(AnnotateErrorKind::LengthMismatch {
                expected: array.len,
                found: node.children.len(),
            }
            .into());
        }
        self.annotate_items(node, array.item)
    }

    fn annotate_mapping(
        &self,
        node: &mut Node,
        shape: &Shape,
        map: MapDef,
    ) -> Result<(), AnnotateError> {
        let key = (map.key)().peel();
        if !matches!(key.def, Def::Scalar(ScalarDef::String) | Def::Dynamic) {
            return Err(AnnotateErrorKind::UnsupportedKey {
                key_type: key.type_name,
                map_type: shape.type_name,
            }
            .into());
        }
        node.kind = Some(Kind::Mapping);
        self.annotate_items(node, map.value)
    }

    /// The source data picks the shape: a leaf is kept as text, a branch of
    /// elements becomes a sequence, any other branch a string-keyed mapping.
    fn annotate_dynamic(&self, node: &mut Node) -> Result<(), AnnotateError> {
        if node.is_leaf() {
            node.kind = Some(Kind::Dynamic);
            return Ok(());
        }
        node.kind = Some(if node.is_sequence() {
            Kind::Sequence
        } else {
            Kind::Mapping
        });
        self.annotate_items(node, Value::shape)
    }
}
