//! Multi-document merge: namespace rewriting, document folding, and the
//! group-based [`MultiSpec`] driver.
//!
//! Field rules when folding a source into a target:
//!
//! - **mappings**: the target's entries overlay the source's; target wins
//! - **lists**: the source's elements are appended after the target's
//! - **scalars**: the target keeps its value and the field is reported as skipped
//!
//! Only fields present on the target take part. Fields that exist only on a
//! source are dropped.

use crate::builder::{BuildOptions, SpecBuilder, DEFAULT_KEYWORD};
use crate::extract::{parse_yaml, read_text};
use crate::model::{Document, Field, RESERVED_FIELDS};
use crate::validate::ValidationPolicy;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Fields a merge left untouched because they can't be combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub skipped: Vec<String>,
}

impl MergeReport {
    fn absorb(&mut self, other: MergeReport) {
        self.skipped.extend(other.skipped);
    }
}

/// Prefix every path key with `prefix`. An empty prefix is a no-op.
pub fn rewrite_namespace(doc: &mut Document, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    let paths = std::mem::take(&mut doc.paths);
    for (path, item) in paths {
        doc.paths.insert(format!("{}{}", prefix, path), item);
    }
}

/// Fold each source into `target`, in order.
pub fn merge_documents(
    target: &mut Document,
    sources: impl IntoIterator<Item = Document>,
) -> MergeReport {
    let mut report = MergeReport::default();
    for source in sources {
        report.absorb(merge_one(target, source));
    }
    report
}

fn merge_one(target: &mut Document, mut source: Document) -> MergeReport {
    let mut report = MergeReport::default();

    overlay_field(&mut target.paths, source.paths);
    overlay_field(&mut target.definitions, source.definitions);
    overlay_field(&mut target.responses, source.responses);
    overlay_field(&mut target.parameters, source.parameters);
    overlay_field(&mut target.security_definitions, source.security_definitions);
    target.tags.extend(source.tags);

    for (key, value) in target.extra.iter_mut() {
        let incoming = source.extra.remove(key);
        *value = match Field::from(std::mem::take(value)) {
            Field::Mapping(mut map) => {
                if let Some(Value::Object(from)) = incoming {
                    map = overlay(map, from);
                }
                Field::Mapping(map)
            }
            Field::List(mut items) => {
                if let Some(Value::Array(from)) = incoming {
                    items.extend(from);
                }
                Field::List(items)
            }
            Field::Scalar(kept) => {
                warn!(field = %key, "field is neither a mapping nor a list; keeping target value");
                report.skipped.push(key.clone());
                Field::Scalar(kept)
            }
        }
        .into();
    }

    report
}

fn overlay_field(target: &mut Map<String, Value>, source: Map<String, Value>) {
    *target = overlay(std::mem::take(target), source);
}

/// Target entries on top of the source's: conflicting keys keep the target's value.
fn overlay(target: Map<String, Value>, source: Map<String, Value>) -> Map<String, Value> {
    let mut merged = source;
    for (key, value) in target {
        merged.insert(key, value);
    }
    merged
}

/// Anything that can hand over a finished document.
pub trait DocumentSource {
    fn document(&self) -> Result<Document>;
}

impl DocumentSource for Document {
    fn document(&self) -> Result<Document> {
        Ok(self.clone())
    }
}

/// A pre-built JSON or YAML document on disk.
#[derive(Debug, Clone)]
pub struct SpecFile {
    path: PathBuf,
}

impl SpecFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for SpecFile {
    fn document(&self) -> Result<Document> {
        let content = read_text(&self.path)?;

        let value = match self.path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| Error::Parse {
                path: self.path.clone(),
                line: Some(e.line()),
                message: e.to_string(),
            })?,
            _ => parse_yaml(&content, &self.path)?,
        };

        serde_json::from_value(loosen(value)).map_err(|e| Error::Parse {
            path: self.path.clone(),
            line: None,
            message: e.to_string(),
        })
    }
}

/// Accept hand-written documents: a null reserved section counts as absent,
/// and a non-string `swagger` marker (`swagger: 2.0` in YAML) is stringified.
fn loosen(mut value: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.retain(|key, v| !(v.is_null() && RESERVED_FIELDS.contains(&key.as_str())));
        if let Some(marker) = map.get_mut("swagger").filter(|m| !m.is_string()) {
            *marker = Value::String(marker.to_string());
        }
    }
    value
}

/// Fetch a document from `source`, prefix its paths, and fold it into `target`.
pub fn integrate(
    target: &mut Document,
    prefix: &str,
    source: &dyn DocumentSource,
) -> Result<MergeReport> {
    let mut doc = source.document()?;
    rewrite_namespace(&mut doc, prefix);
    Ok(merge_documents(target, [doc]))
}

/// One independently-built document and the prefix its paths get.
#[derive(Debug, Clone)]
pub struct Group {
    pub prefix: String,
    pub apis: Vec<String>,
    /// Overrides the shared base definition for this group.
    pub definition: Option<Value>,
}

impl Group {
    pub fn new(prefix: impl Into<String>, apis: Vec<String>) -> Self {
        Self {
            prefix: prefix.into(),
            apis,
            definition: None,
        }
    }

    pub fn with_definition(mut self, definition: Value) -> Self {
        self.definition = Some(definition);
        self
    }
}

struct ExternalSpec {
    prefix: String,
    source: Box<dyn DocumentSource>,
}

/// Builds one document per group and merges them into the last group's.
pub struct MultiSpec {
    definition: Value,
    working_dir: PathBuf,
    groups: Vec<Group>,
    external: Vec<ExternalSpec>,
    keyword: String,
    validation: ValidationPolicy,
}

impl MultiSpec {
    pub fn new(definition: Value, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            definition,
            working_dir: working_dir.into(),
            groups: Vec::new(),
            external: Vec::new(),
            keyword: DEFAULT_KEYWORD.to_string(),
            validation: ValidationPolicy::default(),
        }
    }

    pub fn group(self, prefix: impl Into<String>, apis: Vec<String>) -> Self {
        self.add_group(Group::new(prefix, apis))
    }

    pub fn add_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Fold an externally produced document in after the groups.
    pub fn external(
        mut self,
        prefix: impl Into<String>,
        source: impl DocumentSource + 'static,
    ) -> Self {
        self.external.push(ExternalSpec {
            prefix: prefix.into(),
            source: Box::new(source),
        });
        self
    }

    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn validation(mut self, policy: ValidationPolicy) -> Self {
        self.validation = policy;
        self
    }

    pub fn build(&self) -> Result<(Document, MergeReport)> {
        if self.groups.is_empty() {
            return Err(Error::config("groups", "at least one group is required"));
        }

        let mut docs = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let definition = group
                .definition
                .clone()
                .unwrap_or_else(|| self.definition.clone());
            let options = BuildOptions {
                definition: Some(definition),
                apis: Some(group.apis.clone()),
                working_dir: Some(self.working_dir.clone()),
                keyword: self.keyword.clone(),
                validation: self.validation,
            };
            let mut doc = SpecBuilder::new(options).build()?;
            rewrite_namespace(&mut doc, &group.prefix);
            debug!(prefix = %group.prefix, paths = doc.paths.len(), "built group");
            docs.push(doc);
        }

        let Some(mut target) = docs.pop() else {
            return Err(Error::config("groups", "at least one group is required"));
        };
        let mut report = merge_documents(&mut target, docs);

        for spec in &self.external {
            report.absorb(integrate(&mut target, &spec.prefix, spec.source.as_ref())?);
        }

        info!(
            groups = self.groups.len(),
            external = self.external.len(),
            paths = target.paths.len(),
            "merged documents"
        );
        Ok((target, report))
    }
}
