//! Renderer module: trait-based format dispatch.

use crate::model::Document;
use crate::{Error, Result};
use std::path::Path;

/// Trait for serializing a Document into a specific output format.
pub trait Renderer {
    fn render(&self, doc: &Document) -> Result<String>;
}

/// Pretty-printed JSON.
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        let mut out = serde_json::to_string_pretty(doc).map_err(|e| Error::Serialize {
            message: e.to_string(),
        })?;
        out.push('\n');
        Ok(out)
    }
}

pub struct YamlRenderer;

impl Renderer for YamlRenderer {
    fn render(&self, doc: &Document) -> Result<String> {
        serde_yaml::to_string(doc).map_err(|e| Error::Serialize {
            message: e.to_string(),
        })
    }
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "json" => Ok(Box::new(JsonRenderer)),
        "yaml" | "yml" => Ok(Box::new(YamlRenderer)),
        _ => Err(Error::config(
            "format",
            format!("unknown format: {}. Use json or yaml", format),
        )),
    }
}

/// Pick a format from an output file's extension, defaulting to JSON.
pub fn format_for_output(output: Option<&Path>) -> &'static str {
    match output.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => "yaml",
        _ => "json",
    }
}
