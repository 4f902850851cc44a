//! The split step: one source document in, a ready-to-build docs directory out.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use guidebook_md::{fix_root_anchors, resolve_cross_page_anchors, rewrite_image_links, split_chapters};

use crate::assets::AssetCopier;
use crate::mkdocs::{write_config, ConfigError, ConfigOutcome, MkDocsConfig, NavEntry, NavMode, SiteInfo};
use crate::templates::TemplateEngine;
use crate::writer::{ensure_home_heading, write_chapters, write_notice};

/// Configuration for splitting the source into a docs directory.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Monolithic Markdown source
    pub source: PathBuf,

    /// Directory the pages are written to
    pub docs_dir: PathBuf,

    /// Image directory, relative to the docs directory
    pub assets_dir: String,

    /// Path of the generated `mkdocs.yml`
    pub mkdocs_config: PathBuf,

    /// How an existing `mkdocs.yml` is treated
    pub nav_mode: NavMode,

    /// Heading the home page must start with
    pub home_heading: String,

    /// Rewrite `(#id)` links that point into another chapter
    pub cross_page_links: bool,

    /// Site settings for `mkdocs.yml`
    pub site: SiteInfo,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("CppCoreGuidelines.md"),
            docs_dir: PathBuf::from("docs"),
            assets_dir: "src".to_string(),
            mkdocs_config: PathBuf::from("mkdocs.yml"),
            nav_mode: NavMode::default(),
            home_heading: "C++ Core Guidelines".to_string(),
            cross_page_links: false,
            site: SiteInfo::default(),
        }
    }
}

/// Result of a split.
#[derive(Debug)]
pub struct SplitResult {
    /// Pages written, home page included
    pub pages: usize,

    /// Chapter navigation, home page excluded
    pub nav: Vec<NavEntry>,

    /// Distinct images copied into the docs directory
    pub images: usize,

    /// Links rewritten to point into another chapter
    pub cross_links: usize,

    /// What happened to `mkdocs.yml`; `None` when it was left alone
    pub config: Option<ConfigOutcome>,

    /// Total time in milliseconds
    pub duration_ms: u64,

    /// Docs directory
    pub docs_dir: PathBuf,
}

/// Errors that can occur during the split.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Input file {0} not found")]
    SourceNotFound(PathBuf),

    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("MkDocs config error: {0}")]
    Config(#[from] ConfigError),
}

/// Splits the source document and prepares the docs directory.
pub struct SiteBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl SiteBuilder {
    /// Create a new builder.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// The configuration this builder runs with.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Run the split step.
    pub fn split(&self) -> Result<SplitResult, BuildError> {
        let start = Instant::now();
        let config = &self.config;

        if !config.source.is_file() {
            return Err(BuildError::SourceNotFound(config.source.clone()));
        }

        let content = fs::read_to_string(&config.source).map_err(|e| {
            BuildError::ReadError(format!("{}: {}", config.source.display(), e))
        })?;

        fs::create_dir_all(&config.docs_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Images resolve relative to the source file
        let source_dir = source_dir(&config.source);
        let mut copier = AssetCopier::new(&source_dir, &config.docs_dir, &config.assets_dir);
        let content = rewrite_image_links(&content, |path| copier.resolve(path));
        let content = fix_root_anchors(&content);

        let mut chapters = split_chapters(&content);
        let cross_links = if config.cross_page_links {
            resolve_cross_page_anchors(&mut chapters)
        } else {
            0
        };

        let pages = write_chapters(&config.docs_dir, &chapters)?;

        let nav: Vec<NavEntry> = chapters
            .iter()
            .filter(|c| !c.is_home)
            .map(|c| NavEntry::new(c.title.clone(), c.file_name.clone()))
            .collect();

        let config_outcome = if nav.is_empty() {
            tracing::warn!("No chapters found; MkDocs config was not updated.");
            None
        } else {
            let mkdocs = MkDocsConfig::new(&config.site, &nav);
            Some(write_config(&config.mkdocs_config, &mkdocs, config.nav_mode)?)
        };

        ensure_home_heading(&config.docs_dir, &config.home_heading, &self.templates)?;
        if config.site.notice {
            write_notice(&config.docs_dir, &self.templates)?;
        }

        Ok(SplitResult {
            pages,
            nav,
            images: copier.copied(),
            cross_links,
            config: config_outcome,
            duration_ms: start.elapsed().as_millis() as u64,
            docs_dir: config.docs_dir.clone(),
        })
    }
}

/// Absolute directory containing `source`.
fn source_dir(source: &Path) -> PathBuf {
    let absolute = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SOURCE: &str = r#"# <a name="main"></a>C++ Core Guidelines

See [the introduction](/#S-introduction).

# <a name="S-introduction"></a>In: Introduction

![Passing](./param-passing-normal.png "Normal parameter passing")

# <a name="S-philosophy"></a>P: Philosophy

Back to [the introduction](#S-introduction).
"#;

    fn setup(temp: &Path) -> BuildConfig {
        fs::write(temp.join("CppCoreGuidelines.md"), SOURCE).unwrap();
        fs::write(temp.join("param-passing-normal.png"), b"png").unwrap();

        BuildConfig {
            source: temp.join("CppCoreGuidelines.md"),
            docs_dir: temp.join("docs"),
            mkdocs_config: temp.join("mkdocs.yml"),
            ..Default::default()
        }
    }

    #[test]
    fn splits_source_into_docs() {
        let temp = tempdir().unwrap();
        let config = setup(temp.path());

        let result = SiteBuilder::new(config).split().unwrap();

        assert_eq!(result.pages, 3);
        assert_eq!(result.images, 1);
        assert_eq!(result.config, Some(ConfigOutcome::Created));
        assert_eq!(
            result.nav,
            vec![
                NavEntry::new("In: Introduction", "in-introduction.md"),
                NavEntry::new("P: Philosophy", "p-philosophy.md"),
            ]
        );

        let docs = temp.path().join("docs");
        let index = fs::read_to_string(docs.join("index.md")).unwrap();
        assert!(index.starts_with("# C++ Core Guidelines {#main}"));
        assert!(index.contains("[the introduction](#S-introduction)"));

        let intro = fs::read_to_string(docs.join("in-introduction.md")).unwrap();
        assert!(intro.contains("![Passing](src/param-passing-normal.png \"Normal parameter passing\")"));
        assert!(docs.join("src/param-passing-normal.png").exists());
        assert!(docs.join("NOTICE.md").exists());

        let yaml = fs::read_to_string(temp.path().join("mkdocs.yml")).unwrap();
        assert!(yaml.contains("in-introduction.md"));
        assert!(yaml.contains("NOTICE.md"));
    }

    #[test]
    fn resolves_cross_page_links_when_enabled() {
        let temp = tempdir().unwrap();
        let config = BuildConfig {
            cross_page_links: true,
            ..setup(temp.path())
        };

        let result = SiteBuilder::new(config).split().unwrap();

        assert_eq!(result.cross_links, 2);
        let philosophy =
            fs::read_to_string(temp.path().join("docs/p-philosophy.md")).unwrap();
        assert!(philosophy.contains("[the introduction](in-introduction.md#S-introduction)"));
    }

    #[test]
    fn second_run_keeps_existing_config() {
        let temp = tempdir().unwrap();
        let config = setup(temp.path());

        SiteBuilder::new(config.clone()).split().unwrap();
        let result = SiteBuilder::new(config).split().unwrap();

        assert_eq!(result.config, Some(ConfigOutcome::Skipped));
    }

    #[test]
    fn single_page_source_leaves_config_alone() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("one.md"), "Just a preamble.\n").unwrap();

        let config = BuildConfig {
            source: temp.path().join("one.md"),
            docs_dir: temp.path().join("docs"),
            mkdocs_config: temp.path().join("mkdocs.yml"),
            ..Default::default()
        };
        let result = SiteBuilder::new(config).split().unwrap();

        assert_eq!(result.config, None);
        assert!(!temp.path().join("mkdocs.yml").exists());
        assert_eq!(
            fs::read_to_string(temp.path().join("docs/index.md")).unwrap(),
            "# C++ Core Guidelines\n\nJust a preamble.\n"
        );
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = tempdir().unwrap();
        let config = BuildConfig {
            source: temp.path().join("missing.md"),
            docs_dir: temp.path().join("docs"),
            ..Default::default()
        };

        let result = SiteBuilder::new(config).split();

        assert!(matches!(result, Err(BuildError::SourceNotFound(_))));
    }
}
