//! swagdoc: assemble a Swagger document from YAML files and `@swagger`
//! comment blocks.
//!
//! Three ways to drive it:
//!
//! - **single build**: `swagdoc -d base.yaml 'routes/*.js' docs/api.yaml`
//! - **groups**: `swagdoc -d base.yaml --group /v1='v1/*.js' --group /v2='v2/*.js'`
//! - **config file**: `swagdoc -c swagdoc.yaml`

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use swagdoc::builder::DEFAULT_KEYWORD;
use swagdoc::config::{load_definition, Config};
use swagdoc::merge::Group;
use swagdoc::render::{create_renderer, format_for_output};
use swagdoc::{
    integrate, BuildOptions, Document, MultiSpec, SpecBuilder, SpecFile, ValidationPolicy,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "swagdoc",
    version,
    about = "Assemble a Swagger document from YAML files and @swagger comment blocks"
)]
struct Cli {
    /// Input files (glob patterns supported) for a single build. Replaces `apis`
    /// from the config file; not allowed together with groups.
    files: Vec<String>,

    /// YAML config file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Base definition (YAML or JSON)
    #[arg(short = 'd', long)]
    definition: Option<PathBuf>,

    /// Output file. Writes to stdout if omitted.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: json (default) or yaml. Inferred from --output when omitted.
    #[arg(short = 'f', long)]
    format: Option<String>,

    /// Directory relative patterns resolve against
    #[arg(short = 'C', long)]
    cwd: Option<PathBuf>,

    /// Comment tag marking a payload
    #[arg(short = 'k', long)]
    keyword: Option<String>,

    /// Path group as PREFIX=PATTERN. Repeatable; the same prefix accumulates patterns.
    #[arg(long = "group", value_parser = parse_pair)]
    groups: Vec<(String, String)>,

    /// Pre-built document to fold in, as PREFIX=FILE. Repeatable.
    #[arg(long = "external", value_parser = parse_pair)]
    external: Vec<(String, String)>,

    /// Fail when the assembled document does not validate
    #[arg(long)]
    strict: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let definition = match cli.definition.as_deref() {
        Some(path) => Some(load_definition(path)?),
        None => config.resolve_definition()?,
    };
    let keyword = cli
        .keyword
        .clone()
        .or_else(|| config.keyword.clone())
        .unwrap_or_else(|| DEFAULT_KEYWORD.to_string());
    let validation = if cli.strict {
        ValidationPolicy::Propagate
    } else {
        config.validation.unwrap_or_default()
    };
    let external = external_specs(&cli, &config);

    let groups = select_groups(&cli, &config)?;

    let doc = if groups.is_empty() {
        let (apis, working_dir) = if cli.files.is_empty() {
            (config.apis.clone(), cli.cwd.clone().or_else(|| config_dir(&cli, &config)))
        } else {
            (Some(cli.files.clone()), cli.cwd.clone())
        };
        let options = BuildOptions {
            definition,
            apis,
            working_dir,
            keyword,
            validation,
        };
        let mut doc = SpecBuilder::new(options).build()?;
        for (prefix, file) in &external {
            integrate(&mut doc, prefix, &SpecFile::new(file))?;
        }
        doc
    } else {
        let definition = definition.context(
            "invalid configuration for 'definition': a base definition is required (--definition or config)",
        )?;
        let working_dir = if cli.groups.is_empty() {
            cli.cwd.clone().or_else(|| config_dir(&cli, &config))
        } else {
            cli.cwd.clone()
        }
        .unwrap_or_else(|| PathBuf::from("."));

        let mut multi = MultiSpec::new(definition, working_dir)
            .keyword(keyword)
            .validation(validation);
        for group in groups {
            multi = multi.add_group(group);
        }
        for (prefix, file) in external {
            multi = multi.external(prefix, SpecFile::new(file));
        }
        let (doc, report) = multi.build()?;
        if !report.skipped.is_empty() {
            info!(fields = ?report.skipped, "fields kept from the merge target");
        }
        doc
    };

    write_output(&cli, &config, &doc)
}

/// Route tracing to stderr so stdout stays clean for the document.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn write_output(cli: &Cli, config: &Config, doc: &Document) -> Result<()> {
    let output = cli.output.clone().or_else(|| config.output.clone());
    let format = cli
        .format
        .clone()
        .or_else(|| config.format.clone())
        .unwrap_or_else(|| format_for_output(output.as_deref()).to_string());
    let renderer = create_renderer(&format)?;
    let rendered = renderer.render(doc)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), paths = doc.paths.len(), "wrote document");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

/// Directory of the config file, when one was given.
fn config_dir(cli: &Cli, config: &Config) -> Option<PathBuf> {
    cli.config.as_ref().map(|_| config.base_dir.clone())
}

/// External specs from the command line win over the config file's.
fn external_specs(cli: &Cli, config: &Config) -> Vec<(String, PathBuf)> {
    if cli.external.is_empty() {
        config
            .external
            .iter()
            .map(|e| (e.prefix.clone(), e.file.clone()))
            .collect()
    } else {
        cli.external
            .iter()
            .map(|(prefix, file)| (prefix.clone(), PathBuf::from(file)))
            .collect()
    }
}

/// Groups from `--group`, falling back to the config file's. Positional files
/// only drive a single build, so they conflict with either source of groups.
fn select_groups(cli: &Cli, config: &Config) -> Result<Vec<Group>> {
    let groups = if cli.groups.is_empty() {
        config.groups.iter().cloned().map(Group::from).collect()
    } else {
        collect_groups(&cli.groups)
    };
    if !groups.is_empty() && !cli.files.is_empty() {
        bail!(
            "input files cannot be combined with groups: move {} into a group",
            cli.files.join(", ")
        );
    }
    Ok(groups)
}

/// Parse a `KEY=VALUE` argument. The key may be empty.
fn parse_pair(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !value.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected PREFIX=VALUE, got '{}'", arg)),
    }
}

/// Fold repeated `--group` pairs into groups, first-seen prefix order.
fn collect_groups(pairs: &[(String, String)]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for (prefix, pattern) in pairs {
        match groups.iter_mut().find(|g| &g.prefix == prefix) {
            Some(group) => group.apis.push(pattern.clone()),
            None => groups.push(Group::new(prefix.clone(), vec![pattern.clone()])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use swagdoc::config::GroupConfig;

    #[test]
    fn pair_splits_on_first_equals() {
        assert_eq!(
            parse_pair("/v1=routes/*.js").unwrap(),
            ("/v1".to_string(), "routes/*.js".to_string())
        );
        assert_eq!(parse_pair("=a=b").unwrap(), (String::new(), "a=b".to_string()));
    }

    #[test]
    fn pair_requires_a_value() {
        assert!(parse_pair("/v1").is_err());
        assert!(parse_pair("/v1=").is_err());
    }

    #[test]
    fn groups_accumulate_by_prefix() {
        let pairs = vec![
            ("/a".to_string(), "a/*.js".to_string()),
            ("/b".to_string(), "b/*.js".to_string()),
            ("/a".to_string(), "a/*.yaml".to_string()),
        ];
        let groups = collect_groups(&pairs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].prefix, "/a");
        assert_eq!(groups[0].apis, vec!["a/*.js", "a/*.yaml"]);
        assert_eq!(groups[1].apis, vec!["b/*.js"]);
    }

    #[test]
    fn files_conflict_with_group_flags() {
        let cli = Cli::try_parse_from(["swagdoc", "a.js", "--group", "/v1=v1/*.js"]).unwrap();
        let err = select_groups(&cli, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("cannot be combined with groups"));
        assert!(err.to_string().contains("a.js"));
    }

    #[test]
    fn files_conflict_with_config_groups() {
        let cli = Cli::try_parse_from(["swagdoc", "a.js"]).unwrap();
        let config = Config {
            groups: vec![GroupConfig {
                prefix: "/v1".to_string(),
                apis: vec!["v1/*.js".to_string()],
                definition: None,
            }],
            ..Config::default()
        };
        assert!(select_groups(&cli, &config).is_err());
    }

    #[test]
    fn files_alone_select_single_build() {
        let cli = Cli::try_parse_from(["swagdoc", "a.js"]).unwrap();
        assert!(select_groups(&cli, &Config::default()).unwrap().is_empty());
    }
}
