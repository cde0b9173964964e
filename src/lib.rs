//! swagdoc: assemble a Swagger 2.0 document from fragments that live next
//! to the code they describe.
//!
//! Fragments come from two places:
//!
//! - **declarative files** (`.yaml` / `.yml`) parsed wholesale
//! - **comment blocks** (`/** ... */`) carrying an `@swagger` tag whose body is YAML
//!
//! The [`SpecBuilder`] folds every fragment found under a list of glob
//! patterns into one [`Document`]. The [`MultiSpec`] merger builds several
//! documents, prefixes their paths, and folds them into one.
//!
//! ```no_run
//! use serde_json::json;
//! use swagdoc::{BuildOptions, SpecBuilder};
//!
//! let options = BuildOptions::new(
//!     json!({ "info": { "title": "Pets", "version": "1.0.0" } }),
//!     vec!["routes/*.js".to_string(), "docs/*.yaml".to_string()],
//! );
//! let doc = SpecBuilder::new(options).build()?;
//! println!("{}", serde_json::to_string_pretty(&doc)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assemble;
pub mod builder;
pub mod comment;
pub mod config;
pub mod error;
pub mod expand;
pub mod extract;
pub mod merge;
pub mod model;
pub mod render;
pub mod validate;

pub use assemble::assemble;
pub use builder::{build_spec, BuildOptions, SpecBuilder};
pub use error::{Error, ValidationError};
pub use expand::expand_patterns;
pub use extract::{extract_file, filter_tagged, Extracted};
pub use merge::{
    integrate, merge_documents, rewrite_namespace, DocumentSource, MergeReport, MultiSpec, SpecFile,
};
pub use model::{Document, Field, Fragment};
pub use validate::{StructuralValidator, Validate, ValidationPolicy};

/// Result type for swagdoc operations.
pub type Result<T> = std::result::Result<T, Error>;
