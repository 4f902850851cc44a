//! guidebook CLI - publishes the C++ Core Guidelines as a MkDocs site and PDF.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "guidebook")]
#[command(about = "Publish the C++ Core Guidelines as a multi-page site and PDF")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to guidebook.toml config file
    #[arg(short, long, default_value = "guidebook.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default guidebook.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Split the source into the docs directory and update mkdocs.yml
    Split,

    /// Split, run mkdocs build and copy the PDF
    Build {
        /// Do not copy the generated PDF
        #[arg(long)]
        skip_pdf: bool,
    },

    /// Preview the built site
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Directory to serve (defaults to the configured site directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Build, serve, and rebuild when the source changes
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Check the docs directory against the navigation
    Check,

    /// Merge the upstream guidelines repository
    Sync,

    /// Write the GitHub Actions workflow that republishes the site
    Workflow {
        /// Overwrite an existing workflow
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    if let Commands::Init { yes } = cli.command {
        return commands::init::run(&cli.config, yes).await;
    }

    let config = Config::load(&cli.config)?;

    // Execute command
    match cli.command {
        Commands::Init { .. } => {}
        Commands::Split => {
            commands::split::run(&config).await?;
        }
        Commands::Build { skip_pdf } => {
            commands::build::run(&config, skip_pdf).await?;
        }
        Commands::Serve { port, dir } => {
            let dir = dir.unwrap_or_else(|| config.build.site_dir.clone());
            commands::serve::run(port, dir).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&config, port, !no_open).await?;
        }
        Commands::Check => {
            commands::check::run(&config).await?;
        }
        Commands::Sync => {
            commands::sync::run(&config).await?;
        }
        Commands::Workflow { force } => {
            commands::workflow::run(&config, force).await?;
        }
    }

    Ok(())
}
