//! Preview server command.

use std::path::PathBuf;

use anyhow::Result;
use guidebook_server::{PreviewConfig, PreviewServer};

/// Run the serve command.
pub async fn run(port: u16, dir: PathBuf) -> Result<()> {
    let config = PreviewConfig {
        site_dir: dir,
        port,
        ..Default::default()
    };

    PreviewServer::new(config).start().await?;

    Ok(())
}
