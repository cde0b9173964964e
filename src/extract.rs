//! Fragment extraction, dispatched by file extension.
//!
//! `.yaml` / `.yml` files are one declarative payload each. Every other file
//! is scanned for `/** ... */` blocks; [`filter_tagged`] then keeps only the
//! payloads marked with the designated keyword.

use crate::comment::{self, CommentBlock};
use crate::{Error, Result};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;

/// File extensions parsed wholesale as YAML.
pub const DECLARATIVE_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Raw output of extracting one file. Only one of the two lists is populated.
#[derive(Debug, Default)]
pub struct Extracted {
    pub declarative: Vec<Value>,
    pub comments: Vec<CommentBlock>,
}

/// Whether `path` is parsed as a whole-file YAML payload.
pub fn is_declarative(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| DECLARATIVE_EXTENSIONS.contains(&ext))
}

/// Read `path` and extract its payloads or comment blocks.
pub fn extract_file(path: &Path) -> Result<Extracted> {
    let content = read_text(path)?;
    extract_source(path, &content)
}

/// Read a whole file as UTF-8, telling binary content apart from I/O failures.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::InvalidData => Error::NotText {
            path: path.to_path_buf(),
        },
        _ => Error::Read {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Extract from already-loaded content. `path` decides the mode and labels errors.
pub fn extract_source(path: &Path, content: &str) -> Result<Extracted> {
    if is_declarative(path) {
        return Ok(Extracted {
            declarative: vec![parse_yaml(content, path)?],
            comments: Vec::new(),
        });
    }

    Ok(Extracted {
        declarative: Vec::new(),
        comments: comment::scan(content),
    })
}

/// Keep the payloads of every tag titled `keyword`, in block then tag order.
pub fn filter_tagged(comments: &[CommentBlock], keyword: &str, path: &Path) -> Result<Vec<Value>> {
    comments
        .iter()
        .flat_map(|block| block.tags.iter())
        .filter(|tag| tag.title == keyword)
        .map(|tag| parse_yaml(&tag.description, path))
        .collect()
}

/// Parse YAML text into a JSON value.
///
/// Goes through `serde_yaml::Value` so integer keys like `200:` become strings.
pub fn parse_yaml(text: &str, path: &Path) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| Error::yaml(path, &e))?;
    serde_json::to_value(yaml).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        line: None,
        message: e.to_string(),
    })
}
