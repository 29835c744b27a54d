use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidshelf::config::{load_config, Config, ROUTE_PREFIX};
use vidshelf::server;

#[derive(Parser)]
#[command(
    name = "vidshelf",
    version,
    about = "Personal media directory browser with watch-state sync"
)]
struct Cli {
    /// Config file (TOML). Optional when --media-root is given.
    #[arg(long, default_value = "vidshelf.toml")]
    config: PathBuf,

    /// Listen address, e.g. 0.0.0.0:8325 (overrides the config file)
    #[arg(long)]
    listen: Option<String>,

    /// Media tree to serve (overrides the config file)
    #[arg(long)]
    media_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "vidshelf=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        load_config(&cli.config)?
    } else if let Some(root) = cli.media_root.clone() {
        Config::with_root(root)
    } else {
        bail!(
            "no config file at {} and no --media-root given",
            cli.config.display()
        );
    };
    if let Some(root) = cli.media_root {
        config.media_root = root;
    }
    if let Some(listen) = cli.listen {
        config.listen = Some(listen);
    }
    if !config.media_root.is_dir() {
        bail!(
            "media_root {} is not a directory",
            config.media_root.display()
        );
    }

    let addr = config.listen_addr()?;
    let app = server::router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}{ROUTE_PREFIX}");
    axum::serve(listener, app).await?;
    Ok(())
}
