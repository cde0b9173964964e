//! Build one document from a base definition and a list of file patterns.

use crate::assemble::assemble;
use crate::expand::expand_patterns;
use crate::extract::{extract_file, filter_tagged};
use crate::model::{Document, Fragment};
use crate::validate::{StructuralValidator, Validate, ValidationPolicy};
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default comment tag marking a payload.
pub const DEFAULT_KEYWORD: &str = "swagger";

/// Inputs for [`SpecBuilder`].
///
/// `definition` and `apis` are required; they are `Option` so a missing one
/// can be reported by name instead of failing at deserialization.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Base document. Must be a mapping.
    pub definition: Option<Value>,
    /// File patterns, literal or glob.
    pub apis: Option<Vec<String>>,
    /// Directory that relative patterns resolve against.
    pub working_dir: Option<PathBuf>,
    pub keyword: String,
    pub validation: ValidationPolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            definition: None,
            apis: None,
            working_dir: None,
            keyword: DEFAULT_KEYWORD.to_string(),
            validation: ValidationPolicy::default(),
        }
    }
}

impl BuildOptions {
    pub fn new(definition: Value, apis: Vec<String>) -> Self {
        Self {
            definition: Some(definition),
            apis: Some(apis),
            ..Self::default()
        }
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
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
}

/// Assembles a [`Document`] from every fragment its patterns reach.
pub struct SpecBuilder {
    options: BuildOptions,
    validator: Box<dyn Validate>,
}

impl SpecBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            validator: Box::new(StructuralValidator),
        }
    }

    /// Replace the validator run on the finished document.
    pub fn with_validator(mut self, validator: impl Validate + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Run the whole pipeline: seed, expand, extract, assemble, validate.
    pub fn build(&self) -> Result<Document> {
        let definition = self
            .options
            .definition
            .as_ref()
            .ok_or_else(|| Error::config("definition", "a base definition is required"))?;
        let apis = self
            .options
            .apis
            .as_ref()
            .ok_or_else(|| Error::config("apis", "a list of file patterns is required"))?;

        let mut doc = Document::seed(definition)?;

        let files = expand_patterns(apis, self.options.working_dir.as_deref())?;
        info!(patterns = apis.len(), files = files.len(), "assembling document");

        for path in &files {
            self.assemble_file(&mut doc, path)?;
        }

        self.finish(doc)
    }

    /// Declarative payloads first, then tagged comment payloads, all from one file.
    fn assemble_file(&self, doc: &mut Document, path: &Path) -> Result<()> {
        let extracted = extract_file(path)?;
        let tagged = filter_tagged(&extracted.comments, &self.options.keyword, path)?;

        let mut count = 0;
        for payload in extracted.declarative.into_iter().chain(tagged) {
            let fragments = Fragment::parse_payload(payload, path)?;
            count += fragments.len();
            assemble(doc, &fragments);
        }
        debug!(path = %path.display(), fragments = count, "assembled file");
        Ok(())
    }

    fn finish(&self, doc: Document) -> Result<Document> {
        match self.validator.validate(&doc) {
            Ok(normalized) => Ok(normalized),
            Err(err) => match self.options.validation {
                ValidationPolicy::BestEffort => {
                    warn!(error = %err, "returning document as assembled");
                    Ok(doc)
                }
                ValidationPolicy::Propagate => Err(err.into()),
            },
        }
    }
}

/// Build a document with the default validator.
pub fn build_spec(options: BuildOptions) -> Result<Document> {
    SpecBuilder::new(options).build()
}
