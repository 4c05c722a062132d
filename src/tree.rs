//! The node tree: a uniformly stringified copy of the generic mapping.
//!
//! Every scalar becomes its canonical text here; reinterpreting that text as
//! an integer, float, boolean or duration is deferred to the filler, once the
//! destination type is known. Sequence elements are named `[i]`.

use crate::error::BuildError;
use crate::raw::{RawMap, RawValue};
use crate::shape::Kind;

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Node {
    /// Mapping key, or `[i]` for a sequence element.
    pub(crate) name: String,
    /// Destination field, set by the annotator for children of a composite.
    pub(crate) field_name: Option<&'static str>,
    /// Destination kind, set by the annotator.
    pub(crate) kind: Option<Kind>,
    /// Canonical text of a leaf. Empty for branches.
    pub(crate) value: String,
    pub(crate) children: Vec<Node>,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub(crate) fn element(index: usize) -> Self {
        Self::new(format!("[{index}]"))
    }

    pub(crate) fn is_element(&self) -> bool {
        self.name.starts_with('[') && self.name.ends_with(']')
    }

    /// A branch whose children are sequence elements.
    pub(crate) fn is_sequence(&self) -> bool {
        self.children.first().is_some_and(Node::is_element)
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Build the tree for a decoded document. The root is always a mapping branch.
pub(crate) fn build(mapping: RawMap) -> Result<Node, BuildError> {
    let mut root = Node::new("root");
    build_mapping(&mut root, mapping)?;
    Ok(root)
}

fn build_value(node: &mut Node, raw: RawValue) -> Result<(), BuildError> {
    match raw {
        RawValue::String(s) => node.value = s,
        RawValue::Bool(b) => node.value = b.to_string(),
        RawValue::Int(i) => node.value = i.to_string(),
        RawValue::Uint(u) => node.value = u.to_string(),
        RawValue::Float(f) => node.value = canonical_float(f),
        RawValue::Sequence(items) => build_sequence(node, items)?,
        RawValue::Mapping(entries) => build_mapping(node, entries)?,
        RawValue::Unsupported(kind) => return Err(BuildError::new(kind)),
    }
    Ok(())
}

fn build_mapping(node: &mut Node, entries: RawMap) -> Result<(), BuildError> {
    node.children.reserve(entries.len());
    for (key, raw) in entries {
        let mut child = Node::new(key);
        build_value(&mut child, raw).map_err(|e| e.at(&child.name))?;
        node.children.push(child);
    }
    Ok(())
}

fn build_sequence(node: &mut Node, items: Vec<RawValue>) -> Result<(), BuildError> {
    node.children.reserve(items.len());
    for (index, raw) in items.into_iter().enumerate() {
        let mut child = Node::element(index);
        build_value(&mut child, raw).map_err(|e| e.at(&child.name))?;
        node.children.push(child);
    }
    Ok(())
}

/// Six fractional digits; integral values drop the fraction entirely.
fn canonical_float(value: f64) -> String {
    let mut text = format!("{value:.6}");
    if text.ends_with(".000000") {
        text.truncate(text.len() - ".000000".len());
    }
    text
}
