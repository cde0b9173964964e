//! Final validation and normalization of an assembled document.

use crate::error::ValidationError;
use crate::model::Document;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// HTTP methods a Swagger 2.0 path item may carry.
pub const HTTP_METHODS: &[&str] = &["get", "put", "post", "delete", "options", "head", "patch"];

/// What the builder does when validation fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPolicy {
    /// Log the failure and return the document as assembled.
    #[default]
    BestEffort,
    /// Return the failure as [`crate::Error::Validation`].
    Propagate,
}

/// Validator/normalizer run on every finished document.
pub trait Validate {
    /// Check `doc` and return its normalized form.
    fn validate(&self, doc: &Document) -> Result<Document, ValidationError>;
}

/// Structural Swagger 2.0 checks, plus lowercasing of HTTP-method keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl Validate for StructuralValidator {
    fn validate(&self, doc: &Document) -> Result<Document, ValidationError> {
        let mut problems = Vec::new();

        check_info(doc.extra.get("info"), &mut problems);

        let mut paths = Map::new();
        for (path, item) in &doc.paths {
            if !path.starts_with('/') {
                problems.push(format!("path '{}' must start with '/'", path));
            }
            match item {
                Value::Object(item) => {
                    let item = normalize_item(path, item, &mut problems);
                    paths.insert(path.clone(), Value::Object(item));
                }
                _ => {
                    problems.push(format!("path '{}' must be a mapping", path));
                    paths.insert(path.clone(), item.clone());
                }
            }
        }

        for (i, tag) in doc.tags.iter().enumerate() {
            if tag.get("name").and_then(Value::as_str).is_none() {
                problems.push(format!("tags[{}] must be a mapping with a string 'name'", i));
            }
        }

        if !problems.is_empty() {
            return Err(ValidationError { problems });
        }

        Ok(Document {
            paths,
            ..doc.clone()
        })
    }
}

fn check_info(info: Option<&Value>, problems: &mut Vec<String>) {
    let Some(info) = info else {
        problems.push("missing 'info'".to_string());
        return;
    };
    if !info.is_object() {
        problems.push("'info' must be a mapping".to_string());
        return;
    }
    for key in ["title", "version"] {
        if info.get(key).and_then(Value::as_str).is_none() {
            problems.push(format!("'info.{}' must be a string", key));
        }
    }
}

fn normalize_item(
    path: &str,
    item: &Map<String, Value>,
    problems: &mut Vec<String>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in item {
        let lower = key.to_ascii_lowercase();
        if HTTP_METHODS.contains(&lower.as_str()) {
            let has_responses = value
                .get("responses")
                .is_some_and(Value::is_object);
            if !value.is_object() {
                problems.push(format!("operation {} {} must be a mapping", lower, path));
            } else if !has_responses {
                problems.push(format!("operation {} {} is missing 'responses'", lower, path));
            }
            out.insert(lower, value.clone());
        } else if key == "parameters" || key == "$ref" || key.starts_with("x-") {
            out.insert(key.clone(), value.clone());
        } else {
            problems.push(format!("path '{}' has unknown key '{}'", path, key));
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
