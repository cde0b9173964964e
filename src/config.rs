//! Configuration file loading and parsing.
//!
//! A config file describes either a single build (`apis`) or a multi-spec
//! merge (`groups`), plus output settings:
//!
//! ```yaml
//! definitionFile: base.yaml
//! groups:
//!   - prefix: /pets
//!     apis: ["pets/**/*.js"]
//!   - prefix: /store
//!     apis: ["store/*.yaml"]
//! external:
//!   - prefix: /legacy
//!     file: legacy/swagger.json
//! validation: propagate
//! output: dist/swagger.json
//! ```
//!
//! Relative paths resolve against the config file's directory.

use crate::extract::{parse_yaml, read_text};
use crate::merge::Group;
use crate::validate::ValidationPolicy;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Inline base definition.
    pub definition: Option<Value>,
    /// Base definition loaded from a JSON or YAML file.
    pub definition_file: Option<PathBuf>,
    pub apis: Option<Vec<String>>,
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    #[serde(default)]
    pub external: Vec<ExternalConfig>,
    pub keyword: Option<String>,
    pub validation: Option<ValidationPolicy>,
    pub output: Option<PathBuf>,
    pub format: Option<String>,
    /// Directory of the loaded file; relative paths resolve against it.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    #[serde(default)]
    pub prefix: String,
    pub apis: Vec<String>,
    pub definition: Option<Value>,
}

impl From<GroupConfig> for Group {
    fn from(config: GroupConfig) -> Self {
        Group {
            prefix: config.prefix,
            apis: config.apis,
            definition: config.definition,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalConfig {
    #[serde(default)]
    pub prefix: String,
    pub file: PathBuf,
}

impl Config {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_text(path)?;
        let mut config: Config =
            serde_yaml::from_str(&contents).map_err(|e| Error::yaml(path, &e))?;

        config.base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        config.resolve_paths();
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self) {
        let base = self.base_dir.clone();
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(p) = self.definition_file.as_mut() {
            join(p);
        }
        if let Some(p) = self.output.as_mut() {
            join(p);
        }
        for ext in &mut self.external {
            join(&mut ext.file);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.definition.is_some() && self.definition_file.is_some() {
            return Err(Error::config(
                "definition",
                "set either 'definition' or 'definitionFile', not both",
            ));
        }
        if self.apis.is_some() && !self.groups.is_empty() {
            return Err(Error::config("groups", "set either 'apis' or 'groups', not both"));
        }
        if let Some(group) = self.groups.iter().find(|g| g.apis.is_empty()) {
            return Err(Error::config(
                "groups",
                format!("group '{}' has no apis", group.prefix),
            ));
        }
        Ok(())
    }

    /// The base definition, inline or loaded from `definitionFile`.
    pub fn resolve_definition(&self) -> Result<Option<Value>> {
        match (&self.definition, &self.definition_file) {
            (Some(inline), _) => Ok(Some(inline.clone())),
            (None, Some(path)) => load_definition(path).map(Some),
            (None, None) => Ok(None),
        }
    }
}

/// Read a base definition from a JSON or YAML file.
pub fn load_definition(path: &Path) -> Result<Value> {
    let contents = read_text(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            line: Some(e.line()),
            message: e.to_string(),
        }),
        _ => parse_yaml(&contents, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("swagdoc.yaml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn load_single_build_config() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            "definition:\n  info:\n    title: Pets\napis:\n  - routes/*.js\nvalidation: propagate\noutput: out/api.json\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.apis, Some(vec!["routes/*.js".to_string()]));
        assert_eq!(config.validation, Some(ValidationPolicy::Propagate));
        assert_eq!(config.output, Some(dir.path().join("out/api.json")));
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(
            config.resolve_definition().unwrap(),
            Some(json!({ "info": { "title": "Pets" } }))
        );
    }

    #[test]
    fn load_groups_and_external() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            "groups:\n  - prefix: /a\n    apis: [a/*.js]\n  - apis: [b/*.js]\nexternal:\n  - prefix: /legacy\n    file: legacy.json\n",
        );
        let config = Config::load(&path).unwrap();
        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.groups[1].prefix, "");
        assert_eq!(config.external[0].file, dir.path().join("legacy.json"));
        let group: Group = config.groups[0].clone().into();
        assert_eq!(group.prefix, "/a");
    }

    #[test]
    fn definition_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("base.json"), r#"{"info":{"title":"J","version":"1"}}"#).unwrap();
        let path = write_config(dir.path(), "definitionFile: base.json\napis: []\n");
        let config = Config::load(&path).unwrap();
        let definition = config.resolve_definition().unwrap().unwrap();
        assert_eq!(definition["info"]["title"], "J");
    }

    #[test]
    fn both_definitions_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "definition: {}\ndefinitionFile: base.yaml\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { ref field, .. } if field == "definition"));
    }

    #[test]
    fn empty_group_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "groups:\n  - prefix: /a\n    apis: []\n");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("group '/a' has no apis"));
    }

    #[test]
    fn parse_error_reports_line() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "apis:\n  - a\n  bad: [\n");
        match Config::load(&path).unwrap_err() {
            Error::Parse { line, .. } => assert!(line.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
