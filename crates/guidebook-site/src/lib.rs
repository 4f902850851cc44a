//! Docs directory generation for the guidelines site.
//!
//! Turns the monolithic guidelines source into a docs directory MkDocs can
//! build, writes `mkdocs.yml`, and drives `mkdocs build` to produce the site
//! and its PDF.

pub mod assets;
pub mod builder;
pub mod check;
pub mod mkdocs;
pub mod runner;
pub mod templates;
pub mod writer;

pub use assets::AssetCopier;
pub use builder::{BuildConfig, BuildError, SiteBuilder, SplitResult};
pub use check::{check_site, BrokenAnchor, CheckError, CheckReport};
pub use mkdocs::{ConfigError, ConfigOutcome, MkDocsConfig, NavEntry, NavMode, SiteInfo};
pub use runner::{MkDocsRunner, RunnerConfig, RunnerError};
pub use templates::{TemplateEngine, WorkflowContext};
