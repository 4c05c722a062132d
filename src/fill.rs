//! Filling: writing an annotated node tree into a live destination.
//!
//! Dispatch is on the kind each node was annotated with. Leaves are parsed
//! from their canonical text; containers are rebuilt from fresh elements.
//! The first failure aborts the fill.

use std::collections::BTreeMap;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

use crate::duration::{parse_duration, parse_signed_duration};
use crate::error::{FillError, FillErrorKind};
use crate::fields::{FieldCache, ResolvedField};
use crate::shape::{CompositeMut, Kind, MappingMut, Reflect, ReflectMut, ScalarMut};
use crate::tree::Node;
use crate::value::Value;

pub(crate) struct Filler<'c> {
    cache: &'c FieldCache,
}

impl<'c> Filler<'c> {
    pub(crate) fn new(cache: &'c FieldCache) -> Self {
        Self { cache }
    }

    pub(crate) fn fill(&self, node: &Node, target: &mut dyn Reflect) -> Result<(), FillError> {
        self.fill_handle(node, indirect(target.reflect_mut()))
    }

    fn fill_handle(&self, node: &Node, handle: ReflectMut<'_>) -> Result<(), FillError> {
        let Some(kind) = node.kind else {
            return Ok(());
        };
        match (kind, handle) {
            (Kind::Dynamic, ReflectMut::Dynamic(value)) => {
                *value = Value::String(node.value.clone());
                Ok(())
            }
            (Kind::Scalar(def), ReflectMut::Scalar(scalar)) if scalar.def() == def => {
                set_scalar(scalar, &node.value)
            }
            (Kind::Composite, ReflectMut::Composite(composite)) => {
                self.fill_composite(node, composite)
            }
            (Kind::Mapping, ReflectMut::Mapping(mapping)) => self.fill_mapping(node, mapping),
            (Kind::Mapping, ReflectMut::Dynamic(value)) => {
                let mut entries = BTreeMap::new();
                for child in &node.children {
                    let mut item = Value::Null;
                    self.fill(child, &mut item).map_err(|e| e.at(&child.name))?;
                    entries.insert(child.name.clone(), item);
                }
                *value = Value::Mapping(entries);
                Ok(())
            }
            (Kind::Sequence, ReflectMut::Sequence(sequence)) => {
                sequence.rebuild(node.children.len(), &mut |index: usize, slot: &mut dyn Reflect| {
                    self.fill_child(node, index, slot)
                })
            }
            (Kind::Sequence, ReflectMut::Dynamic(value)) => {
                let mut items = Vec::with_capacity(node.children.len());
                for child in &node.children {
                    let mut item = Value::Null;
                    self.fill(child, &mut item).map_err(|e| e.at(&child.name))?;
                    items.push(item);
                }
                *value = Value::Sequence(items);
                Ok(())
            }
            (Kind::Array(_), ReflectMut::Array(array)) => {
                array.refill(&mut |index: usize, slot: &mut dyn Reflect| {
                    self.fill_child(node, index, slot)
                })
            }
            (expected, handle) => Err(FillErrorKind::Mismatch {
                expected,
                found: handle.describe(),
            }
            .into()),
        }
    }

    fn fill_child(&self, node: &Node, index: usize, slot: &mut dyn Reflect) -> Result<(), FillError> {
        let Some(child) = node.children.get(index) else {
            return Ok(());
        };
        self.fill(child, slot).map_err(|e| e.at(&child.name))
    }

    fn fill_mapping(&self, node: &Node, mapping: &mut dyn MappingMut) -> Result<(), FillError> {
        // entries are keyed by the source key, not a field name
        let keys: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
        mapping.rebuild(&keys, &mut |index: usize, slot: &mut dyn Reflect| {
            self.fill_child(node, index, slot)
        })
    }

    fn fill_composite(
        &self,
        node: &Node,
        composite: &mut dyn CompositeMut,
    ) -> Result<(), FillError> {
        let shape = composite.type_shape();
        let fields = self.cache.resolve(&shape);
        for child in &node.children {
            let Some(field_name) = child.field_name else {
                continue;
            };
            let slot = match fields.iter().find(|f| f.name == field_name) {
                Some(field) => locate(&mut *composite, field),
                None => None,
            };
            let Some(slot) = slot else {
                return Err(FillError::from(FillErrorKind::FieldNotFound {
                    field: field_name,
                    type_name: shape.type_name,
                })
                .at(&child.name));
            };
            self.fill(child, slot).map_err(|e| e.at(&child.name))?;
        }
        Ok(())
    }
}

/// Follow optional indirection, allocating a default value for each empty
/// optional on the way.
fn indirect(handle: ReflectMut<'_>) -> ReflectMut<'_> {
    match handle {
        ReflectMut::Optional(optional) => indirect(optional.value_mut().reflect_mut()),
        other => other,
    }
}

/// The member slot of a resolved field, reached through its embedded members.
fn locate<'a>(
    composite: &'a mut dyn CompositeMut,
    field: &ResolvedField,
) -> Option<&'a mut dyn Reflect> {
    let mut current = composite;
    for member in &field.path {
        current = match indirect(current.field_mut(member)?.reflect_mut()) {
            ReflectMut::Composite(inner) => inner,
            _ => return None,
        };
    }
    current.field_mut(field.name)
}

fn set_scalar(scalar: ScalarMut<'_>, text: &str) -> Result<(), FillError> {
    match scalar {
        ScalarMut::Bool(slot) => *slot = parse_bool(text)?,
        ScalarMut::I8(slot) => *slot = parse_int(text, "i8")?,
        ScalarMut::I16(slot) => *slot = parse_int(text, "i16")?,
        ScalarMut::I32(slot) => *slot = parse_int(text, "i32")?,
        ScalarMut::I64(slot) => *slot = parse_int(text, "i64")?,
        ScalarMut::Isize(slot) => *slot = parse_int(text, "isize")?,
        ScalarMut::U8(slot) => *slot = parse_int(text, "u8")?,
        ScalarMut::U16(slot) => *slot = parse_int(text, "u16")?,
        ScalarMut::U32(slot) => *slot = parse_int(text, "u32")?,
        ScalarMut::U64(slot) => *slot = parse_int(text, "u64")?,
        ScalarMut::Usize(slot) => *slot = parse_int(text, "usize")?,
        ScalarMut::F32(slot) => *slot = parse_float(text, "f32")?,
        ScalarMut::F64(slot) => *slot = parse_float(text, "f64")?,
        ScalarMut::String(slot) => text.clone_into(slot),
        ScalarMut::Duration(slot) => {
            *slot = parse_duration(text).map_err(FillErrorKind::from)?;
        }
        ScalarMut::SignedDuration(slot) => {
            *slot = parse_signed_duration(text).map_err(FillErrorKind::from)?;
        }
    }
    Ok(())
}

fn parse_int<T>(text: &str, type_name: &'static str) -> Result<T, FillError>
where
    T: FromStr<Err = ParseIntError>,
{
    text.parse().map_err(|source| {
        FillErrorKind::InvalidInteger {
            value: text.to_owned(),
            type_name,
            source,
        }
        .into()
    })
}

/// Parse at the width of `T`. Values too large for it are an error rather
/// than infinity; only an explicit infinity literal yields one.
fn parse_float<T>(text: &str, type_name: &'static str) -> Result<T, FillError>
where
    T: FromStr<Err = ParseFloatError> + Into<f64> + Copy,
{
    let value: T = text.parse().map_err(|source| FillErrorKind::InvalidFloat {
        value: text.to_owned(),
        type_name,
        source,
    })?;
    if value.into().is_infinite() && !is_infinity_literal(text) {
        return Err(FillErrorKind::FloatOutOfRange {
            value: text.to_owned(),
            type_name,
        }
        .into());
    }
    Ok(value)
}

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text
        .strip_prefix(['+', '-'])
        .unwrap_or(text)
        .to_ascii_lowercase();
    unsigned == "inf" || unsigned == "infinity"
}

/// Accepts `1`, `t`, `T`, `true`, `TRUE`, `True` and their false counterparts.
fn parse_bool(text: &str) -> Result<bool, FillError> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(FillErrorKind::InvalidBool {
            value: text.to_owned(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::*;
    use crate::annotate::Annotator;
    use crate::duration::{DurationError, SignedDuration};
    use crate::fixtures::test::*;
    use crate::format::Format;
    use crate::shape::{Def, Field, Shape};
    use crate::tree;

    fn fill_yaml<T: Reflect>(source: &str, target: &mut T) -> Result<(), FillError> {
        let mut root = tree::build(Format::Yaml.parse(source.as_bytes()).unwrap()).unwrap();
        let cache = FieldCache::new();
        Annotator::new(&cache)
            .annotate(&mut root, T::shape())
            .unwrap();
        Filler::new(&cache).fill(&root, target)
    }

    #[test]
    fn scalars_are_parsed_by_destination_type() {
        let mut config = ServiceConfig::default();
        fill_yaml(
            "name: svc\nport: 8080\ndebug: true\nratio: 0.25\n",
            &mut config,
        )
        .unwrap();
        assert_eq!(config.name, "svc");
        assert_eq!(config.port, 8080);
        assert!(config.debug);
        assert_eq!(config.ratio, 0.25);
    }

    #[test]
    fn quoted_numbers_fill_numeric_fields() {
        let mut config = ServiceConfig::default();
        fill_yaml("port: \"443\"\ndebug: \"T\"\n", &mut config).unwrap();
        assert_eq!(config.port, 443);
        assert!(config.debug);
    }

    #[test]
    fn numbers_fill_string_fields() {
        let mut config = ServiceConfig::default();
        fill_yaml("name: 42\n", &mut config).unwrap();
        assert_eq!(config.name, "42");
    }

    #[test]
    fn durations_are_parsed() {
        let mut retry = RetryConfig::default();
        fill_yaml("count: 3\ntimeout: 1m30s\n", &mut retry).unwrap();
        assert_eq!(retry.count, 3);
        assert_eq!(retry.timeout, Duration::from_secs(90));
    }

    #[test]
    fn integer_out_of_range_fails() {
        let mut config = ServiceConfig::default();
        let err = fill_yaml("port: 70000\n", &mut config).unwrap_err();
        assert!(matches!(
            err.kind(),
            FillErrorKind::InvalidInteger { type_name: "u16", .. }
        ));
        assert_eq!(err.path().to_string(), "port");
    }

    #[test]
    fn negative_into_unsigned_fails() {
        let mut retry = RetryConfig::default();
        assert!(fill_yaml("count: -1\n", &mut retry).is_err());
    }

    #[test]
    fn float_overflow_is_an_error() {
        crate::composite! {
            #[derive(Debug, Default)]
            struct Floats {
                pub small: f32,
                pub big: f64,
            }
        }

        let mut floats = Floats::default();
        let err = fill_yaml("small: 1e40\n", &mut floats).unwrap_err();
        assert!(matches!(
            err.kind(),
            FillErrorKind::FloatOutOfRange { type_name: "f32", .. }
        ));
        assert_eq!(err.path().to_string(), "small");

        let err = fill_yaml("big: \"1e400\"\n", &mut floats).unwrap_err();
        assert!(matches!(
            err.kind(),
            FillErrorKind::FloatOutOfRange { type_name: "f64", .. }
        ));

        // the same values fit the wider type
        fill_yaml("big: 1e40\n", &mut floats).unwrap();
        assert_eq!(floats.big, 1e40);
    }

    #[test]
    fn infinity_literals_are_accepted() {
        crate::composite! {
            #[derive(Debug, Default)]
            struct Floats {
                pub small: f32,
                pub big: f64,
            }
        }

        let mut floats = Floats::default();
        fill_yaml("small: .inf\nbig: \"-Infinity\"\n", &mut floats).unwrap();
        assert_eq!(floats.small, f32::INFINITY);
        assert_eq!(floats.big, f64::NEG_INFINITY);
    }

    #[test]
    fn signed_duration_takes_negative_values() {
        crate::composite! {
            #[derive(Debug, Default)]
            struct Clock {
                pub offset: SignedDuration,
                pub drift: SignedDuration,
                pub floor: SignedDuration,
            }
        }

        let mut clock = Clock::default();
        fill_yaml(
            "offset: -5s\ndrift: -1.5h\nfloor: -9223372036854775808ns\n",
            &mut clock,
        )
        .unwrap();
        assert_eq!(clock.offset, SignedDuration::from_secs(-5));
        assert_eq!(clock.drift, SignedDuration::from_secs(-5400));
        assert_eq!(clock.floor, SignedDuration::MIN);

        let err = fill_yaml("offset: soon\n", &mut clock).unwrap_err();
        assert!(matches!(err.kind(), FillErrorKind::InvalidDuration(_)));
        assert_eq!(err.path().to_string(), "offset");
    }

    #[test]
    fn unsigned_duration_still_rejects_negatives() {
        let mut retry = RetryConfig::default();
        let err = fill_yaml("timeout: -5s\n", &mut retry).unwrap_err();
        assert!(matches!(
            err.kind(),
            FillErrorKind::InvalidDuration(DurationError::Negative(_))
        ));
    }

    #[test]
    fn malformed_scalars_fail() {
        let mut config = ServiceConfig::default();
        let err = fill_yaml("debug: yes\n", &mut config).unwrap_err();
        assert!(matches!(err.kind(), FillErrorKind::InvalidBool { .. }));

        let err = fill_yaml("ratio: lots\n", &mut config).unwrap_err();
        assert!(matches!(err.kind(), FillErrorKind::InvalidFloat { .. }));

        let mut retry = RetryConfig::default();
        let err = fill_yaml("timeout: soon\n", &mut retry).unwrap_err();
        assert!(matches!(err.kind(), FillErrorKind::InvalidDuration(_)));
        assert_eq!(err.path().to_string(), "timeout");
    }

    #[test]
    fn nested_error_path() {
        let mut config = ServiceConfig::default();
        let err = fill_yaml("retry: {timeout: 5x}\n", &mut config).unwrap_err();
        assert_eq!(err.path().to_string(), "retry.timeout");
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut retry = RetryConfig::default();
        fill_yaml("count: 2\nflavor: {deep: [1, 2]}\n", &mut retry).unwrap();
        assert_eq!(retry.count, 2);
    }

    #[test]
    fn private_fields_are_untouched() {
        let mut config = ServiceConfig::default();
        fill_yaml("cache_dir: /tmp\nname: svc\n", &mut config).unwrap();
        assert_eq!(config.name, "svc");
        assert!(config.cache_dir().is_empty());
    }

    #[test]
    fn sequences_are_replaced() {
        let mut config = ServiceConfig::default();
        config.tags = vec!["stale".into(); 4];
        fill_yaml("tags: [a, b]\n", &mut config).unwrap();
        assert_eq!(config.tags, vec!["a", "b"]);
    }

    #[test]
    fn mappings_use_source_keys() {
        let mut config = ServiceConfig::default();
        config.labels.insert("stale".into(), "x".into());
        fill_yaml("labels: {Team: core, tier: 1}\n", &mut config).unwrap();

        let expected: HashMap<String, String> = [("Team", "core"), ("tier", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(config.labels, expected);
    }

    #[test]
    fn arrays_fill_in_place() {
        let mut limits = Limits::default();
        fill_yaml("window: [1, 2, 3]\nweights: [0.5, 1]\n", &mut limits).unwrap();
        assert_eq!(limits.window, [1, 2, 3]);
        assert_eq!(limits.weights, vec![0.5, 1.0]);
    }

    #[test]
    fn array_element_error_has_index() {
        let mut limits = Limits::default();
        let err = fill_yaml("window: [1, x, 3]\n", &mut limits).unwrap_err();
        assert_eq!(err.path().to_string(), "window[1]");
    }

    #[test]
    fn empty_optional_is_allocated() {
        let mut limits = Limits::default();
        fill_yaml("burst: 64\n", &mut limits).unwrap();
        assert_eq!(limits.burst, Some(64));

        let mut limits = Limits::default();
        fill_yaml("window: [0, 0, 0]\n", &mut limits).unwrap();
        assert_eq!(limits.burst, None);
    }

    #[test]
    fn recursive_optional_boxes() {
        let mut chain = Chain::default();
        fill_yaml("name: a\nnext: {name: b, next: {name: c}}\n", &mut chain).unwrap();
        let b = chain.next.as_deref().unwrap();
        let c = b.next.as_deref().unwrap();
        assert_eq!((chain.name.as_str(), b.name.as_str(), c.name.as_str()), ("a", "b", "c"));
        assert!(c.next.is_none());
    }

    #[test]
    fn promoted_fields_land_in_embedded_member() {
        let mut endpoint = Endpoint::default();
        fill_yaml("host: db\nUser: admin\npassword: hunter2\n", &mut endpoint).unwrap();
        assert_eq!(endpoint.host, "db");
        assert_eq!(endpoint.credentials.user, "admin");
        assert_eq!(endpoint.credentials.password, "hunter2");
    }

    #[test]
    fn ambiguous_promoted_field_is_skipped() {
        let mut gateway = Gateway::default();
        fill_yaml("user: admin\ntoken: abc\npassword: pw\n", &mut gateway).unwrap();
        assert!(gateway.credentials.user.is_empty());
        assert!(gateway.auth.user.is_empty());
        assert_eq!(gateway.auth.token, "abc");
        assert_eq!(gateway.credentials.password, "pw");
    }

    #[test]
    fn shadowing_field_wins() {
        let mut shadowed = Shadowed::default();
        fill_yaml("count: three\ntimeout: 2s\n", &mut shadowed).unwrap();
        assert_eq!(shadowed.count, "three");
        assert_eq!(shadowed.retry.count, 0);
        assert_eq!(shadowed.retry.timeout, Duration::from_secs(2));
    }

    #[test]
    fn optional_embedded_member_is_allocated() {
        let mut layered = Layered::default();
        fill_yaml("name: edge\ncount: 5\n", &mut layered).unwrap();
        assert_eq!(layered.retry.as_ref().map(|r| r.count), Some(5));

        let mut layered = Layered::default();
        fill_yaml("name: edge\n", &mut layered).unwrap();
        assert!(layered.retry.is_none());
    }

    #[test]
    fn dynamic_section_takes_source_shape() {
        let mut config = ServiceConfig::default();
        fill_yaml(
            "extra: {level: 3, hosts: [a, b], nested: {on: true}}\n",
            &mut config,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&config.extra).unwrap(),
            serde_json::json!({
                "level": "3",
                "hosts": ["a", "b"],
                "nested": {"on": "true"},
            })
        );
    }

    #[test]
    fn dynamic_root() {
        let mut value = Value::Null;
        fill_yaml("ratio: 1.5\nitems: [{id: 1}]\n", &mut value).unwrap();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            serde_json::json!({"ratio": "1.500000", "items": [{"id": "1"}]})
        );
    }

    #[test]
    fn map_of_dynamic_values() {
        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        fill_yaml("a: 1\nb: [x]\n", &mut map).unwrap();
        assert_eq!(map["a"], Value::from("1"));
        assert_eq!(map["b"], Value::from(vec!["x"]));
    }

    #[test]
    fn hidden_member_is_field_not_found() {
        // lists a field it does not expose through field_mut
        #[derive(Default)]
        struct Hidden {
            level: u8,
        }

        impl Reflect for Hidden {
            fn shape() -> Shape {
                const FIELDS: &[Field] = &[Field::new("level", u8::shape)];
                Shape::of::<Self>(Def::Composite(FIELDS))
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Composite(self)
            }
        }

        impl CompositeMut for Hidden {
            fn type_shape(&self) -> Shape {
                <Self as Reflect>::shape()
            }

            fn field_mut(&mut self, _name: &str) -> Option<&mut dyn Reflect> {
                None
            }
        }

        let mut hidden = Hidden::default();
        let err = fill_yaml("level: 3\n", &mut hidden).unwrap_err();
        assert!(matches!(
            err.kind(),
            FillErrorKind::FieldNotFound { field: "level", .. }
        ));
        assert_eq!(err.path().to_string(), "level");
        assert_eq!(hidden.level, 0);
    }

    #[test]
    fn bool_spellings() {
        for text in ["1", "t", "T", "true", "TRUE", "True"] {
            assert!(parse_bool(text).unwrap());
        }
        for text in ["0", "f", "F", "false", "FALSE", "False"] {
            assert!(!parse_bool(text).unwrap());
        }
        assert!(parse_bool("tRuE").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn mismatched_handle_is_reported() {
        let mut node = Node::new("root");
        node.kind = Some(Kind::Sequence);
        let mut target = 0u8;
        let cache = FieldCache::new();
        let err = Filler::new(&cache).fill(&node, &mut target).unwrap_err();
        assert!(matches!(
            err.kind(),
            FillErrorKind::Mismatch {
                expected: Kind::Sequence,
                found: "u8"
            }
        ));
    }
}
