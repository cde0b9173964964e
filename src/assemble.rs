//! Fold fragments into an accumulating document.
//!
//! Collision rules:
//!
//! - **named entities** (definitions, responses, parameters, security
//!   definitions): last write wins
//! - **tags**: appended, never deduplicated
//! - **paths**: operations accumulate per path; the later fragment wins for
//!   the same HTTP method, with no deep merge of the operation itself

use crate::model::{Document, Fragment};
use serde_json::{Map, Value};
use tracing::trace;

/// Apply `fragments` to `doc` in order.
pub fn assemble(doc: &mut Document, fragments: &[Fragment]) {
    for fragment in fragments {
        apply(doc, fragment);
    }
}

fn apply(doc: &mut Document, fragment: &Fragment) {
    match fragment {
        Fragment::Path { path, operations } => {
            trace!(path = %path, methods = operations.len(), "path fragment");
            let entry = doc
                .paths
                .entry(path.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Some(existing) = entry.as_object_mut() {
                for (method, operation) in operations {
                    existing.insert(method.clone(), operation.clone());
                }
            }
        }
        Fragment::Definition { name, value } => {
            trace!(name = %name, "definition fragment");
            doc.definitions.insert(name.clone(), value.clone());
        }
        Fragment::Response { name, value } => {
            trace!(name = %name, "response fragment");
            doc.responses.insert(name.clone(), value.clone());
        }
        Fragment::Parameter { name, value } => {
            trace!(name = %name, "parameter fragment");
            doc.parameters.insert(name.clone(), value.clone());
        }
        Fragment::SecurityDefinition { name, value } => {
            trace!(name = %name, "security definition fragment");
            doc.security_definitions.insert(name.clone(), value.clone());
        }
        Fragment::Tag(tag) => {
            trace!("tag fragment");
            doc.tags.push(tag.clone());
        }
    }
}
