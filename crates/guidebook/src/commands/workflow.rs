//! GitHub Actions workflow setup.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use guidebook_site::{TemplateEngine, WorkflowContext};

use crate::config::Config;

const WORKFLOW_PATH: &str = ".github/workflows/publish.yml";

/// Run the workflow command in the current directory.
pub async fn run(config: &Config, force: bool) -> Result<()> {
    let path = write_workflow(Path::new("."), config, force)?;

    tracing::info!("Created {}", path.display());
    tracing::info!(
        "The site is republished on every push to {} and on the 1st of each month.",
        config.workflow.branch
    );
    tracing::info!("Enable GitHub Pages with source 'GitHub Actions' in the repository settings.");

    Ok(())
}

/// Render the publish workflow into `root`.
fn write_workflow(root: &Path, config: &Config, force: bool) -> Result<PathBuf> {
    let path = root.join(WORKFLOW_PATH);

    if path.exists() && !force {
        anyhow::bail!(
            "Workflow already exists at {}\nUse --force to overwrite",
            path.display()
        );
    }

    let ctx = WorkflowContext {
        branch: config.workflow.branch.clone(),
        upstream_url: config.sync.url.clone(),
        upstream_branch: config.sync.branch.clone(),
        pdf_output: config.build.pdf_output.to_string_lossy().into_owned(),
    };
    let content = TemplateEngine::new()
        .render_workflow(&ctx)
        .context("Failed to render workflow")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create .github/workflows directory")?;
    }
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}
