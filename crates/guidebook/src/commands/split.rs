//! Split command.

use anyhow::Result;
use guidebook_site::{ConfigOutcome, SiteBuilder, SplitResult};

use crate::config::Config;

/// Run the split command.
pub async fn run(config: &Config) -> Result<()> {
    tracing::info!("Splitting {}...", config.source.input.display());

    let result = SiteBuilder::new(config.build_config()).split()?;
    report(&result);

    Ok(())
}

/// Log what a split produced.
pub fn report(result: &SplitResult) {
    tracing::info!(
        "Wrote {} pages ({} chapters, {} images) in {}ms",
        result.pages,
        result.nav.len(),
        result.images,
        result.duration_ms
    );

    if result.cross_links > 0 {
        tracing::info!("Pointed {} links at other chapters", result.cross_links);
    }

    match result.config {
        Some(ConfigOutcome::Created) => tracing::info!("Created MkDocs config"),
        Some(ConfigOutcome::Updated) => tracing::info!("Updated MkDocs navigation"),
        Some(ConfigOutcome::Skipped) => {
            tracing::info!("MkDocs config already exists, left unchanged")
        }
        None => {}
    }

    tracing::info!("Output: {}", result.docs_dir.display());
}
