//! Site consistency check.

use anyhow::Result;
use guidebook_site::check_site;

use crate::config::Config;

/// Run the check command. Fails when any problem is found.
pub async fn run(config: &Config) -> Result<()> {
    let report = check_site(&config.docs.dir, &config.site.config)?;

    for page in &report.missing_pages {
        tracing::warn!("Navigation lists missing page {}", page);
    }
    for page in &report.orphan_pages {
        tracing::warn!("Page {} is not in the navigation", page);
    }
    for link in &report.broken_anchors {
        tracing::warn!("{}: broken link to {}", link.page, link.target);
    }

    if !report.is_clean() {
        anyhow::bail!("Found {} problems", report.problems());
    }

    tracing::info!("No problems found");
    Ok(())
}
