//! Development server command.

use anyhow::Result;
use guidebook_server::{PreviewConfig, PreviewServer, Rebuilder};
use guidebook_site::{MkDocsRunner, SiteBuilder};

use crate::config::Config;

/// Build once, then serve the site and rebuild it when the source changes.
pub async fn run(config: &Config, port: u16, open: bool) -> Result<()> {
    let builder = SiteBuilder::new(config.build_config());
    let runner = MkDocsRunner::new(config.runner_config());

    let result = builder.split()?;
    super::split::report(&result);
    runner.check_available().await?;
    runner.build().await?;

    tracing::info!("Starting development server on port {}", port);

    // Only the source: the split itself rewrites docs/ and mkdocs.yml
    let preview = PreviewConfig {
        site_dir: config.build.site_dir.clone(),
        port,
        open,
        live_reload: true,
        watch: vec![config.source.input.clone()],
        ..Default::default()
    };

    PreviewServer::new(preview)
        .with_rebuilder(Rebuilder::new(builder, runner))
        .start()
        .await?;

    Ok(())
}
