//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing guidebook...");

    if write_default_config(config_path, yes)? {
        tracing::info!("Created {}", config_path.display());
        tracing::info!("Run 'guidebook build' to generate the site.");
    } else {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    }

    Ok(())
}

/// Write [`DEFAULT_CONFIG`] unless the file exists and `overwrite` is off.
fn write_default_config(path: &Path, overwrite: bool) -> Result<bool> {
    if path.exists() && !overwrite {
        return Ok(false);
    }

    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

const DEFAULT_CONFIG: &str = r#"# guidebook configuration

[source]
# Monolithic guidelines document
input = "CppCoreGuidelines.md"

[docs]
# Generated pages
dir = "docs"

# Images are copied here, relative to the docs directory
assets_dir = "src"

# Heading the home page must start with
home_heading = "C++ Core Guidelines"

# List a NOTICE page after Home
notice = true

# Rewrite (#id) links that point into another chapter
cross_page_links = false

[site]
name = "C++ Core Guidelines"
repo_url = "https://github.com/xxrjun/CppCoreGuidelines"
repo_name = "xxrjun/CppCoreGuidelines"

# Generated MkDocs configuration
config = "mkdocs.yml"

# "create" writes mkdocs.yml once, "update" refreshes its nav on every build
nav = "create"

[build]
mkdocs = ["mkdocs"]
site_dir = "site"

# PDF location inside the site directory, and where it is copied
pdf = "pdf/document.pdf"
pdf_output = "CppCoreGuidelines.pdf"

[sync]
remote = "upstream"
url = "https://github.com/isocpp/CppCoreGuidelines.git"
branch = "master"

[workflow]
branch = "main"
"#;
