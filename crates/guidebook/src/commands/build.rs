//! Full build: split, MkDocs, PDF.

use anyhow::{Context, Result};
use guidebook_site::{MkDocsRunner, SiteBuilder};

use crate::config::Config;

/// Run the build command.
pub async fn run(config: &Config, skip_pdf: bool) -> Result<()> {
    tracing::info!("Building site...");

    let result = SiteBuilder::new(config.build_config()).split()?;
    super::split::report(&result);

    let runner = MkDocsRunner::new(config.runner_config());
    runner
        .check_available()
        .await
        .context("MkDocs is not available. Install mkdocs-material and mkdocs-with-pdf")?;
    runner.build().await?;

    if skip_pdf {
        tracing::info!("Skipping PDF copy");
        return Ok(());
    }

    let pdf = runner.copy_pdf().await?;
    tracing::info!("PDF: {}", pdf.display());

    Ok(())
}
