//! Data model for assembled documents and the fragments that feed them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Format-version marker forced onto every assembled document.
pub const SWAGGER_VERSION: &str = "2.0";

/// Top-level keys owned by the assembler. Base definitions never supply these.
pub const RESERVED_FIELDS: &[&str] = &[
    "swagger",
    "paths",
    "definitions",
    "responses",
    "parameters",
    "securityDefinitions",
    "tags",
];

fn default_version() -> String {
    SWAGGER_VERSION.to_string()
}

/// An assembled (or partially assembled) Swagger document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default = "default_version")]
    pub swagger: String,
    /// URL path → (HTTP method → operation)
    #[serde(default)]
    pub paths: Map<String, Value>,
    #[serde(default)]
    pub definitions: Map<String, Value>,
    #[serde(default)]
    pub responses: Map<String, Value>,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default, rename = "securityDefinitions")]
    pub security_definitions: Map<String, Value>,
    #[serde(default)]
    pub tags: Vec<Value>,
    /// Caller-supplied base fields (info, host, basePath, ...), passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            swagger: default_version(),
            paths: Map::new(),
            definitions: Map::new(),
            responses: Map::new(),
            parameters: Map::new(),
            security_definitions: Map::new(),
            tags: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Document {
    /// Seed a document from a caller-supplied base definition.
    ///
    /// The format marker and the typed containers are always reset, even if
    /// the base carries its own `paths`, `tags`, etc. Every other key lands in
    /// [`Document::extra`].
    pub fn seed(base: &Value) -> Result<Self> {
        let base = base
            .as_object()
            .ok_or_else(|| Error::config("definition", "base definition must be a mapping"))?;

        let extra = base
            .iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            extra,
            ..Self::default()
        })
    }

    /// Convert into a plain JSON value, with `extra` flattened into the top level.
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(|e| Error::Serialize {
            message: e.to_string(),
        })
    }
}

/// Typed view of one extra top-level field, used to decide how it merges.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Mapping(Map<String, Value>),
    List(Vec<Value>),
    Scalar(Value),
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Field::Mapping(map),
            Value::Array(items) => Field::List(items),
            other => Field::Scalar(other),
        }
    }
}

impl From<Field> for Value {
    fn from(field: Field) -> Self {
        match field {
            Field::Mapping(map) => Value::Object(map),
            Field::List(items) => Value::Array(items),
            Field::Scalar(value) => value,
        }
    }
}

/// One unit of API-description content.
///
/// A single YAML payload (one declarative file, or one tagged comment) yields
/// zero or more fragments.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Operations keyed by HTTP method, contributed to one URL path.
    Path {
        path: String,
        operations: Map<String, Value>,
    },
    Definition { name: String, value: Value },
    Response { name: String, value: Value },
    Parameter { name: String, value: Value },
    SecurityDefinition { name: String, value: Value },
    Tag(Value),
}

impl Fragment {
    /// Split one parsed payload into fragments, keeping key order.
    ///
    /// `source` is only used to label errors.
    pub fn parse_payload(payload: Value, source: &Path) -> Result<Vec<Fragment>> {
        let map = match payload {
            Value::Null => return Ok(Vec::new()),
            Value::Object(map) => map,
            other => {
                return Err(shape_error(
                    source,
                    format!("payload must be a mapping, found {}", kind_of(&other)),
                ))
            }
        };

        let mut fragments = Vec::new();
        for (key, value) in map {
            match key.as_str() {
                "definition" => collect_named(&key, value, source, &mut fragments, |name, value| {
                    Fragment::Definition { name, value }
                })?,
                "response" => collect_named(&key, value, source, &mut fragments, |name, value| {
                    Fragment::Response { name, value }
                })?,
                "parameter" => collect_named(&key, value, source, &mut fragments, |name, value| {
                    Fragment::Parameter { name, value }
                })?,
                "securityDefinition" => {
                    collect_named(&key, value, source, &mut fragments, |name, value| {
                        Fragment::SecurityDefinition { name, value }
                    })?
                }
                "tag" => fragments.push(Fragment::Tag(value)),
                _ => match value {
                    Value::Object(operations) => fragments.push(Fragment::Path {
                        path: key,
                        operations,
                    }),
                    other => {
                        return Err(shape_error(
                            source,
                            format!(
                                "path '{}' must map HTTP methods to operations, found {}",
                                key,
                                kind_of(&other)
                            ),
                        ))
                    }
                },
            }
        }
        Ok(fragments)
    }
}

fn collect_named(
    section: &str,
    value: Value,
    source: &Path,
    out: &mut Vec<Fragment>,
    make: impl Fn(String, Value) -> Fragment,
) -> Result<()> {
    match value {
        Value::Object(entries) => {
            out.extend(entries.into_iter().map(|(name, value)| make(name, value)));
            Ok(())
        }
        Value::Null => Ok(()),
        other => Err(shape_error(
            source,
            format!("'{}' must be a mapping of names, found {}", section, kind_of(&other)),
        )),
    }
}

fn shape_error(source: &Path, message: String) -> Error {
    Error::Parse {
        path: source.to_path_buf(),
        line: None,
        message,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn src() -> &'static Path {
        Path::new("routes.js")
    }

    #[test]
    fn seed_forces_reserved_fields() {
        let base = json!({
            "info": { "title": "Pets", "version": "1.0.0" },
            "swagger": "1.2",
            "paths": { "/stale": {} },
            "tags": [{ "name": "stale" }],
            "host": "api.example.com"
        });
        let doc = Document::seed(&base).unwrap();
        assert_eq!(doc.swagger, "2.0");
        assert!(doc.paths.is_empty());
        assert!(doc.tags.is_empty());
        assert_eq!(doc.extra.len(), 2);
        assert_eq!(doc.extra["host"], "api.example.com");
    }

    #[test]
    fn seed_rejects_non_mapping() {
        let err = Document::seed(&json!(["not", "a", "map"])).unwrap_err();
        assert!(matches!(err, Error::Config { ref field, .. } if field == "definition"));
    }

    #[test]
    fn serialized_document_flattens_extra() {
        let doc = Document::seed(&json!({ "info": { "title": "T", "version": "1" } })).unwrap();
        let value = doc.to_value().unwrap();
        assert_eq!(value["swagger"], "2.0");
        assert_eq!(value["info"]["title"], "T");
        assert!(value["securityDefinitions"].is_object());
        assert!(value["tags"].is_array());
    }

    #[test]
    fn payload_splits_into_fragments_in_order() {
        let payload = json!({
            "/pets": { "get": { "responses": { "200": { "description": "ok" } } } },
            "definition": { "Pet": { "type": "object" }, "Owner": { "type": "object" } },
            "tag": { "name": "pets" }
        });
        let fragments = Fragment::parse_payload(payload, src()).unwrap();
        assert_eq!(fragments.len(), 4);
        assert!(matches!(&fragments[0], Fragment::Path { path, .. } if path == "/pets"));
        assert!(matches!(&fragments[1], Fragment::Definition { name, .. } if name == "Pet"));
        assert!(matches!(&fragments[2], Fragment::Definition { name, .. } if name == "Owner"));
        assert_eq!(fragments[3], Fragment::Tag(json!({ "name": "pets" })));
    }

    #[test]
    fn every_named_section_maps_to_its_variant() {
        let payload = json!({
            "response": { "NotFound": { "description": "missing" } },
            "parameter": { "petId": { "in": "path", "name": "petId" } },
            "securityDefinition": { "key": { "type": "apiKey" } }
        });
        let fragments = Fragment::parse_payload(payload, src()).unwrap();
        assert!(matches!(&fragments[0], Fragment::Response { name, .. } if name == "NotFound"));
        assert!(matches!(&fragments[1], Fragment::Parameter { name, .. } if name == "petId"));
        assert!(matches!(
            &fragments[2],
            Fragment::SecurityDefinition { name, .. } if name == "key"
        ));
    }

    #[test]
    fn empty_payload_yields_nothing() {
        assert!(Fragment::parse_payload(Value::Null, src()).unwrap().is_empty());
    }

    #[test]
    fn scalar_payload_is_a_parse_error() {
        let err = Fragment::parse_payload(json!("just text"), src()).unwrap_err();
        match err {
            Error::Parse { path, message, .. } => {
                assert_eq!(path, Path::new("routes.js"));
                assert!(message.contains("must be a mapping"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn path_with_list_value_is_rejected() {
        let err = Fragment::parse_payload(json!({ "/pets": ["get"] }), src()).unwrap_err();
        assert!(err.to_string().contains("/pets"));
    }

    #[test]
    fn field_roundtrips_through_value() {
        let map = json!({ "a": 1 }).as_object().unwrap().clone();
        assert_eq!(Field::from(json!({ "a": 1 })), Field::Mapping(map));
        assert_eq!(Field::from(json!([1, 2])), Field::List(vec![json!(1), json!(2)]));
        assert_eq!(Value::from(Field::Scalar(json!("x"))), json!("x"));
    }
}
