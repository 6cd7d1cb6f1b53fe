use anyhow::{Context, Result};
use bookshelf::{AppConfig, Bookshelf};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bookshelf")]
#[command(about = "Book catalogue HTTP service with read-through cache and mutation events")]
struct Cli {
    /// Bind host (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides SERVER_PORT)
    #[arg(long, short)]
    port: Option<u16>,

    /// Per-request deadline in milliseconds, 0 disables it
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Do not start the background event consumer
    #[arg(long)]
    no_consumer: bool,
}

impl Cli {
    fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(host) = self.host {
            config = config.host(&host);
        }
        if let Some(port) = self.port {
            config = config.port(port);
        }
        match self.request_timeout_ms {
            Some(0) => config = config.no_request_timeout(),
            Some(millis) => config = config.request_timeout(Duration::from_millis(millis)),
            None => {}
        }
        if self.no_consumer {
            config = config.consumer_enabled(false);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.apply(AppConfig::from_env().context("loading configuration")?);
    let shelf = Bookshelf::from_config(&config).context("building services")?;

    let consumer = config.consumer_enabled.then(|| {
        info!("event consumer started");
        shelf.spawn_consumer()
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("binding {}", config.bind_addr()))?;
    info!(addr = %config.bind_addr(), "server starting");

    axum::serve(listener, shelf.router())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    if let Some(consumer) = consumer {
        let processed = consumer.processed();
        consumer.stop().await.context("stopping event consumer")?;
        info!(processed, "event consumer stopped");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
