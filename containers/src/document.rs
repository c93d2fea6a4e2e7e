//! Helpers around the hierarchical document model used for fixtures and
//! tool input/output.
//!
//! A document is a plain [`serde_json::Value`]. Object keys are kept sorted,
//! so two documents with the same content compare equal regardless of the
//! order their source listed the keys in.

use crate::error::SchemaError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::TScalarStyle;

pub type Document = Value;

/// Declared type of a document field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Null,
    Bool,
    Integer,
    String,
    Array,
    Object,
}

impl DataType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => DataType::Null,
            Value::Bool(_) => DataType::Bool,
            Value::Number(_) => DataType::Integer,
            Value::String(_) => DataType::String,
            Value::Array(_) => DataType::Array,
            Value::Object(_) => DataType::Object,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Null => "null",
            DataType::Bool => "bool",
            DataType::Integer => "integer",
            DataType::String => "string",
            DataType::Array => "array",
            DataType::Object => "object",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// One allowed key of a structure, with the types it may carry.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub types: &'static [DataType],
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, types: &'static [DataType]) -> Self {
        Self {
            name,
            types,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, types: &'static [DataType]) -> Self {
        Self {
            name,
            types,
            presence: Presence::Optional,
        }
    }
}

/// Check that `doc` is an object whose keys are all declared in `fields`,
/// that every required key is present and that every key has one of its
/// declared types.
pub fn require_fields<'a>(
    doc: &'a Value,
    context: &str,
    fields: &[FieldSpec],
) -> Result<&'a Map<String, Value>, SchemaError> {
    let object = as_object(doc, context)?;
    if let Some(key) = object.keys().find(|key| !fields.iter().any(|s| s.name == *key)) {
        return Err(SchemaError::UnknownField {
            context: context.to_string(),
            field: key.clone(),
        });
    }
    check_declared_fields(doc, context, fields)
}

/// Like [`require_fields`] but keys outside `fields` are left alone.
///
/// Used for documents produced by external tools, which grow new keys with
/// every fork.
pub fn check_declared_fields<'a>(
    doc: &'a Value,
    context: &str,
    fields: &[FieldSpec],
) -> Result<&'a Map<String, Value>, SchemaError> {
    let object = as_object(doc, context)?;

    for spec in fields {
        if let Some(value) = object.get(spec.name) {
            check_type(context, spec, value)?;
        }
    }

    for spec in fields.iter().filter(|s| s.presence == Presence::Required) {
        if !object.contains_key(spec.name) {
            return Err(SchemaError::MissingField {
                context: context.to_string(),
                field: spec.name.to_string(),
            });
        }
    }

    Ok(object)
}

fn check_type(context: &str, spec: &FieldSpec, value: &Value) -> Result<(), SchemaError> {
    let found = DataType::of(value);
    if spec.types.contains(&found) {
        return Ok(());
    }
    let expected = spec
        .types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ");
    Err(SchemaError::WrongType {
        context: context.to_string(),
        field: spec.name.to_string(),
        expected,
        found: found.to_string(),
    })
}

pub fn as_object<'a>(doc: &'a Value, context: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    doc.as_object().ok_or_else(|| SchemaError::NotAnObject {
        context: context.to_string(),
        found: DataType::of(doc).to_string(),
    })
}

/// Look up a string field, failing if it is absent or not a string.
pub fn required_str<'a>(doc: &'a Value, context: &str, key: &str) -> Result<&'a str, SchemaError> {
    optional_str(doc, context, key)?.ok_or_else(|| SchemaError::MissingField {
        context: context.to_string(),
        field: key.to_string(),
    })
}

/// Look up a string field that may be absent.
pub fn optional_str<'a>(
    doc: &'a Value,
    context: &str,
    key: &str,
) -> Result<Option<&'a str>, SchemaError> {
    match doc.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(SchemaError::WrongType {
            context: context.to_string(),
            field: key.to_string(),
            expected: DataType::String.to_string(),
            found: DataType::of(other).to_string(),
        }),
    }
}

/// Resolve the first present key out of a list of aliases.
///
/// Returns the key that matched together with its value. When none is
/// present the error names the first (canonical) spelling.
pub fn aliased_str<'a>(
    doc: &'a Value,
    context: &str,
    keys: &[&'static str],
) -> Result<(&'static str, &'a str), SchemaError> {
    for &key in keys {
        if let Some(value) = optional_str(doc, context, key)? {
            return Ok((key, value));
        }
    }
    Err(SchemaError::MissingField {
        context: context.to_string(),
        field: keys.first().copied().unwrap_or_default().to_string(),
    })
}

pub fn from_json_str(input: &str) -> Result<Document, SchemaError> {
    serde_json::from_str(input).map_err(|e| SchemaError::Malformed {
        format: "JSON",
        reason: e.to_string(),
    })
}

/// Parse YAML into a document.
///
/// Scalars keep their source text, so `0x020000` stays the string it is in
/// the fixture. Only scalars explicitly tagged `!!int` become numbers, and
/// `~`/`null` (or an explicit `!!null`) become null. Anchors and aliases are
/// resolved; only the first document of a stream is read.
pub fn from_yaml_str(input: &str) -> Result<Document, SchemaError> {
    let mut builder = YamlBuilder::default();
    Parser::new_from_str(input)
        .load(&mut builder, false)
        .map_err(|e| yaml_error(e.to_string()))?;
    builder.finish()
}

fn yaml_error(reason: impl Into<String>) -> SchemaError {
    SchemaError::Malformed {
        format: "YAML",
        reason: reason.into(),
    }
}

// Builds a document from parser events. Containers under construction sit
// on `stack`; each open mapping has an entry in `keys` holding its pending
// key.
#[derive(Default)]
struct YamlBuilder {
    stack: Vec<(Value, usize)>,
    keys: Vec<Option<String>>,
    anchors: HashMap<usize, Value>,
    root: Option<Value>,
    error: Option<SchemaError>,
}

impl YamlBuilder {
    fn finish(self) -> Result<Document, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(self.root.unwrap_or(Value::Null))
    }

    fn fail(&mut self, error: SchemaError) {
        self.error.get_or_insert(error);
    }

    fn insert(&mut self, node: Value, anchor: usize) {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        let Some((parent, _)) = self.stack.last_mut() else {
            self.root.get_or_insert(node);
            return;
        };
        match parent {
            Value::Array(items) => items.push(node),
            Value::Object(object) => {
                let Some(pending) = self.keys.last_mut() else {
                    return;
                };
                match pending.take() {
                    Some(key) => {
                        object.insert(key, node);
                    }
                    None => match node {
                        Value::String(key) => *pending = Some(key),
                        Value::Number(n) => *pending = Some(n.to_string()),
                        other => {
                            let reason = format!("unsupported mapping key {other}");
                            self.error.get_or_insert(yaml_error(reason));
                        }
                    },
                }
            }
            _ => {}
        }
    }

    fn close(&mut self) {
        if let Some((node, anchor)) = self.stack.pop() {
            self.insert(node, anchor);
        }
    }
}

impl EventReceiver for YamlBuilder {
    fn on_event(&mut self, event: Event) {
        if self.error.is_some() {
            return;
        }
        match event {
            Event::SequenceStart(anchor, ..) => self.stack.push((Value::Array(Vec::new()), anchor)),
            Event::MappingStart(anchor, ..) => {
                self.stack.push((Value::Object(Map::new()), anchor));
                self.keys.push(None);
            }
            Event::SequenceEnd => self.close(),
            Event::MappingEnd => {
                self.keys.pop();
                self.close();
            }
            Event::Scalar(text, style, anchor, tag) => {
                match yaml_scalar(text, style, tag.as_ref()) {
                    Ok(node) => self.insert(node, anchor),
                    Err(error) => self.fail(error),
                }
            }
            Event::Alias(anchor) => match self.anchors.get(&anchor).cloned() {
                Some(node) => self.insert(node, 0),
                None => self.fail(yaml_error(format!("unknown alias {anchor}"))),
            },
            _ => {}
        }
    }
}

fn is_core_tag(tag: &Tag, name: &str) -> bool {
    (tag.handle == "!!" || tag.handle == "tag:yaml.org,2002:") && tag.suffix == name
}

fn yaml_scalar(text: String, style: TScalarStyle, tag: Option<&Tag>) -> Result<Value, SchemaError> {
    match tag {
        Some(tag) if is_core_tag(tag, "int") => yaml_int(&text)
            .map(Value::from)
            .ok_or_else(|| yaml_error(format!("`{text}` is not a valid !!int"))),
        Some(tag) if is_core_tag(tag, "null") => Ok(Value::Null),
        None if style == TScalarStyle::Plain
            && matches!(text.as_str(), "" | "~" | "null" | "Null" | "NULL") =>
        {
            Ok(Value::Null)
        }
        _ => Ok(Value::String(text)),
    }
}

fn yaml_int(text: &str) -> Option<i64> {
    match text.strip_prefix("0x") {
        Some(digits) => i64::from_str_radix(digits, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::required("number", &[DataType::String]),
        FieldSpec::optional("uncles", &[DataType::Array]),
    ];

    #[test]
    fn yaml_scalars_keep_their_source_text() {
        let doc = from_yaml_str(
            "
network: Istanbul
chainId: 1
explicit: !!int 7
reward: true
difficulty: 0x020000
nothing: ~
blocks:
  - number: '0x01'
    gasLimit: 0x2fefd8
",
        )
        .unwrap();

        assert_eq!(
            doc,
            json!({
                "network": "Istanbul",
                "chainId": "1",
                "explicit": 7,
                "reward": "true",
                "difficulty": "0x020000",
                "nothing": null,
                "blocks": [{ "number": "0x01", "gasLimit": "0x2fefd8" }],
            })
        );
    }

    #[test]
    fn yaml_aliases_are_resolved() {
        let doc = from_yaml_str(
            "
base: &env
  coinbase: 0x8888f1f195afa192cfee860698584c030f4c9db1
copy: *env
",
        )
        .unwrap();

        assert_eq!(doc["copy"], doc["base"]);
        assert_eq!(
            doc["copy"]["coinbase"],
            json!("0x8888f1f195afa192cfee860698584c030f4c9db1")
        );
    }

    #[test]
    fn malformed_yaml_is_reported() {
        assert!(matches!(
            from_yaml_str("a: [1, 2"),
            Err(SchemaError::Malformed { format: "YAML", .. })
        ));
        assert!(matches!(
            from_yaml_str("n: !!int twelve"),
            Err(SchemaError::Malformed { format: "YAML", .. })
        ));
    }

    #[test]
    fn require_fields_reports_each_problem() {
        assert!(require_fields(&json!({ "number": "0x01" }), "t", FIELDS).is_ok());

        assert_eq!(
            require_fields(&json!({}), "t", FIELDS).unwrap_err(),
            SchemaError::MissingField {
                context: "t".into(),
                field: "number".into()
            }
        );
        assert!(matches!(
            require_fields(&json!({ "number": 1 }), "t", FIELDS),
            Err(SchemaError::WrongType { .. })
        ));
        assert!(matches!(
            require_fields(&json!({ "number": "0x01", "extra": "0x" }), "t", FIELDS),
            Err(SchemaError::UnknownField { .. })
        ));
        assert!(matches!(
            require_fields(&json!([]), "t", FIELDS),
            Err(SchemaError::NotAnObject { .. })
        ));
    }

    #[test]
    fn aliases_prefer_the_first_spelling() {
        let doc = json!({ "coinbase": "0x01", "author": "0x02" });
        assert_eq!(
            aliased_str(&doc, "t", &["author", "coinbase"]).unwrap(),
            ("author", "0x02")
        );
        assert_eq!(
            aliased_str(&json!({ "coinbase": "0x01" }), "t", &["author", "coinbase"]).unwrap(),
            ("coinbase", "0x01")
        );
    }
}
