//! Tool configuration file (guidebook.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use guidebook_site::{BuildConfig, NavMode, RunnerConfig, SiteInfo};
use serde::Deserialize;

/// Configuration file structure. Every section and key is optional.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub docs: DocsConfig,
    pub site: SiteConfig,
    pub build: BuildSettings,
    pub sync: SyncConfig,
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    /// Monolithic guidelines document
    pub input: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocsConfig {
    pub dir: PathBuf,
    /// Image directory inside `dir`
    pub assets_dir: String,
    pub home_heading: String,
    pub notice: bool,
    pub cross_page_links: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// Empty string leaves the repository link out
    pub repo_url: String,
    pub repo_name: String,
    /// Generated MkDocs configuration
    pub config: PathBuf,
    pub nav: NavMode,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BuildSettings {
    /// Program and leading arguments used to run MkDocs
    pub mkdocs: Vec<String>,
    pub site_dir: PathBuf,
    /// PDF location inside the site directory
    pub pdf: String,
    pub pdf_output: PathBuf,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub remote: String,
    pub url: String,
    pub branch: String,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Branch whose pushes republish the site
    pub branch: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("CppCoreGuidelines.md"),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("docs"),
            assets_dir: "src".to_string(),
            home_heading: "C++ Core Guidelines".to_string(),
            notice: true,
            cross_page_links: false,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let site = SiteInfo::default();
        Self {
            name: site.name,
            repo_url: site.repo_url.unwrap_or_default(),
            repo_name: site.repo_name.unwrap_or_default(),
            config: PathBuf::from("mkdocs.yml"),
            nav: NavMode::Create,
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        let runner = RunnerConfig::default();
        Self {
            mkdocs: runner.command,
            site_dir: runner.site_dir,
            pdf: runner.pdf_path,
            pdf_output: runner.pdf_output,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote: "upstream".to_string(),
            url: "https://github.com/isocpp/CppCoreGuidelines.git".to_string(),
            branch: "master".to_string(),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            branch: "main".to_string(),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

impl Config {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Settings for the split step.
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            source: self.source.input.clone(),
            docs_dir: self.docs.dir.clone(),
            assets_dir: self.docs.assets_dir.clone(),
            mkdocs_config: self.site.config.clone(),
            nav_mode: self.site.nav,
            home_heading: self.docs.home_heading.clone(),
            cross_page_links: self.docs.cross_page_links,
            site: SiteInfo {
                name: self.site.name.clone(),
                repo_url: non_empty(&self.site.repo_url),
                repo_name: non_empty(&self.site.repo_name),
                pdf_path: self.build.pdf.clone(),
                notice: self.docs.notice,
            },
        }
    }

    /// Settings for running MkDocs.
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            command: self.build.mkdocs.clone(),
            config_file: self.site.config.clone(),
            site_dir: self.build.site_dir.clone(),
            pdf_path: self.build.pdf.clone(),
            pdf_output: self.build.pdf_output.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load(&temp.path().join("guidebook.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.source.input, PathBuf::from("CppCoreGuidelines.md"));
        assert_eq!(config.build.pdf_output, PathBuf::from("CppCoreGuidelines.pdf"));
        assert_eq!(config.sync.branch, "master");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[docs]
dir = "pages"

[site]
nav = "update"
repo_url = ""

[build]
mkdocs = ["python", "-m", "mkdocs"]
"#,
        )
        .unwrap();

        assert_eq!(config.docs.dir, PathBuf::from("pages"));
        assert_eq!(config.docs.assets_dir, "src");
        assert_eq!(config.site.nav, NavMode::Update);
        assert_eq!(config.site.name, "C++ Core Guidelines");
        assert_eq!(config.build.site_dir, PathBuf::from("site"));

        let build = config.build_config();
        assert_eq!(build.docs_dir, PathBuf::from("pages"));
        assert_eq!(build.site.repo_url, None);
        assert_eq!(
            build.site.repo_name.as_deref(),
            Some("xxrjun/CppCoreGuidelines")
        );

        let runner = config.runner_config();
        assert_eq!(runner.command, vec!["python", "-m", "mkdocs"]);
        assert_eq!(runner.config_file, PathBuf::from("mkdocs.yml"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("guidebook.toml");
        fs::write(&path, "[docs\ndir = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn unknown_nav_mode_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[site]\nnav = \"merge\"\n");
        assert!(result.is_err());
    }
}
