//! `mkdocs.yml` model and writer.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_yaml::Value;

/// Site-level settings that end up in `mkdocs.yml`.
#[derive(Debug, Clone)]
pub struct SiteInfo {
    /// Site title
    pub name: String,

    /// Repository link shown in the header
    pub repo_url: Option<String>,

    /// Repository label
    pub repo_name: Option<String>,

    /// PDF location inside the built site
    pub pdf_path: String,

    /// Whether a NOTICE page is listed after Home
    pub notice: bool,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "C++ Core Guidelines".to_string(),
            repo_url: Some("https://github.com/xxrjun/CppCoreGuidelines".to_string()),
            repo_name: Some("xxrjun/CppCoreGuidelines".to_string()),
            pdf_path: "pdf/document.pdf".to_string(),
            notice: true,
        }
    }
}

/// A top-level navigation entry (`- 'Title': file.md`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub title: String,
    pub file: String,
}

impl NavEntry {
    pub fn new(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
        }
    }
}

impl Serialize for NavEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.title, &self.file)?;
        map.end()
    }
}

/// A plugin or Markdown extension, either bare or with options.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Extension {
    Name(String),
    Configured(BTreeMap<String, Value>),
}

impl Extension {
    fn configured(name: &str, options: &[(&str, Value)]) -> Self {
        let options: serde_yaml::Mapping = options
            .iter()
            .map(|(k, v)| (Value::String(k.to_string()), v.clone()))
            .collect();
        Self::Configured(BTreeMap::from([(name.to_string(), Value::Mapping(options))]))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Toggle {
    pub icon: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Palette {
    pub scheme: String,
    pub primary: String,
    pub accent: String,
    pub toggle: Toggle,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Theme {
    pub name: String,
    pub palette: Vec<Palette>,
    pub features: Vec<String>,
}

/// The generated MkDocs configuration.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MkDocsConfig {
    pub site_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    pub theme: Theme,
    pub markdown_extensions: Vec<Extension>,
    pub plugins: Vec<Extension>,
    pub nav: Vec<NavEntry>,
}

impl MkDocsConfig {
    /// Build the configuration for a site whose chapters are `chapters`.
    ///
    /// Navigation starts with Home and (optionally) NOTICE, followed by the
    /// chapters in document order.
    pub fn new(site: &SiteInfo, chapters: &[NavEntry]) -> Self {
        let palette = |scheme: &str, icon: &str, name: &str| Palette {
            scheme: scheme.to_string(),
            primary: "indigo".to_string(),
            accent: "indigo".to_string(),
            toggle: Toggle {
                icon: icon.to_string(),
                name: name.to_string(),
            },
        };

        let mut nav = vec![NavEntry::new("Home", "index.md")];
        if site.notice {
            nav.push(NavEntry::new("NOTICE", "NOTICE.md"));
        }
        nav.extend(chapters.iter().cloned());

        Self {
            site_name: site.name.clone(),
            repo_url: site.repo_url.clone(),
            repo_name: site.repo_name.clone(),
            theme: Theme {
                name: "material".to_string(),
                palette: vec![
                    palette("default", "material/brightness-7", "Switch to dark mode"),
                    palette("slate", "material/brightness-4", "Switch to light mode"),
                ],
                features: vec!["content.code.copy".to_string()],
            },
            markdown_extensions: vec![
                Extension::configured(
                    "toc",
                    &[
                        ("permalink", Value::Bool(true)),
                        ("toc_depth", Value::Number(3.into())),
                    ],
                ),
                Extension::configured(
                    "pymdownx.highlight",
                    &[
                        ("anchor_linenums", Value::Bool(true)),
                        ("line_spans", Value::String("__span".to_string())),
                        ("pygments_lang_class", Value::Bool(true)),
                    ],
                ),
                Extension::Name("pymdownx.inlinehilite".to_string()),
                Extension::Name("pymdownx.snippets".to_string()),
                Extension::Name("pymdownx.superfences".to_string()),
            ],
            plugins: vec![
                Extension::Name("search".to_string()),
                Extension::Name("open-in-new-tab".to_string()),
                Extension::configured(
                    "with-pdf",
                    &[("output_path", Value::String(site.pdf_path.clone()))],
                ),
            ],
            nav,
        }
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// How an existing `mkdocs.yml` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavMode {
    /// Write the file only when it does not exist yet
    #[default]
    Create,
    /// Keep the existing file and replace its `nav` section
    Update,
}

/// What [`write_config`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOutcome {
    Created,
    Updated,
    Skipped,
}

/// Errors reading or writing `mkdocs.yml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} is not a YAML mapping")]
    NotAMapping(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError + '_ {
    move |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `config` to `path` according to `mode`.
pub fn write_config(
    path: &Path,
    config: &MkDocsConfig,
    mode: NavMode,
) -> Result<ConfigOutcome, ConfigError> {
    if !path.exists() {
        fs::write(path, config.to_yaml()?).map_err(io_error(path))?;
        tracing::info!("Created MkDocs config: {}", path.display());
        return Ok(ConfigOutcome::Created);
    }

    match mode {
        NavMode::Create => {
            tracing::info!(
                "MkDocs config already exists at {}. Skipping creation.",
                path.display()
            );
            Ok(ConfigOutcome::Skipped)
        }
        NavMode::Update => {
            let existing = fs::read_to_string(path).map_err(io_error(path))?;
            let mut doc: Value = serde_yaml::from_str(&existing)?;
            let Value::Mapping(map) = &mut doc else {
                return Err(ConfigError::NotAMapping(path.to_path_buf()));
            };
            map.insert(
                Value::String("nav".to_string()),
                serde_yaml::to_value(&config.nav)?,
            );

            fs::write(path, serde_yaml::to_string(&doc)?).map_err(io_error(path))?;
            tracing::info!("Updated navigation in {}", path.display());
            Ok(ConfigOutcome::Updated)
        }
    }
}

/// Every page referenced from the `nav` of an existing `mkdocs.yml`.
///
/// Nested sections are flattened. External links (`http…`) are skipped.
pub fn nav_pages(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let doc: Value = serde_yaml::from_str(&content)?;
    let Value::Mapping(map) = &doc else {
        return Err(ConfigError::NotAMapping(path.to_path_buf()));
    };

    let mut pages = Vec::new();
    if let Some(nav) = map.get("nav") {
        collect_pages(nav, &mut pages);
    }
    Ok(pages)
}

fn collect_pages(value: &Value, pages: &mut Vec<String>) {
    match value {
        Value::String(page) if !page.starts_with("http") => pages.push(page.clone()),
        Value::Sequence(items) => items.iter().for_each(|item| collect_pages(item, pages)),
        Value::Mapping(map) => map.values().for_each(|item| collect_pages(item, pages)),
        _ => {}
    }
}
