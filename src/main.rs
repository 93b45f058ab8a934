use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gallery_server::{
    cache::{ArtworkCache, CacheConfig},
    http::{router, AppState, HttpServer},
    source::{AirtableConfig, AirtableSource, ArtworkSource, FixtureSource},
};

#[derive(Parser)]
#[command(name = "gallery-server")]
#[command(about = "Cached artwork API for the gallery")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(short, long, default_value = "3000")]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Seconds a fetched collection is served before the next read refetches
    #[arg(long, default_value = "3600")]
    cache_ttl: u64,

    /// Seconds to wait on the artwork source before giving up
    #[arg(long, default_value = "10")]
    fetch_timeout: u64,

    /// Keep answering reads with the last good collection when a fetch fails
    #[arg(long)]
    serve_stale: bool,

    /// Serve artworks from a local JSON file instead of Airtable
    #[arg(long)]
    fixture: Option<PathBuf>,

    #[arg(long)]
    debug: bool,
}

impl Args {
    fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_secs(self.cache_ttl.max(1)),
            fetch_timeout: Duration::from_secs(self.fetch_timeout.max(1)),
            serve_stale_on_error: self.serve_stale,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // .env has to be loaded before the subscriber reads RUST_LOG
    dotenvy::dotenv().ok();

    let filter_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("gallery_server={filter_level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let source: Arc<dyn ArtworkSource> = match &args.fixture {
        Some(path) => {
            info!("Serving artworks from fixture {}", path.display());
            Arc::new(FixtureSource::new(path))
        }
        None => {
            let config = AirtableConfig::from_env()
                .context("Failed to load Airtable configuration from environment")?;
            info!("Serving artworks from Airtable base {}", config.base_id);
            Arc::new(AirtableSource::new(config))
        }
    };

    let cache_config = args.cache_config();
    info!(
        "Artwork cache ttl {:?}, fetch timeout {:?}, serve stale: {}",
        cache_config.ttl, cache_config.fetch_timeout, cache_config.serve_stale_on_error
    );

    let cache = Arc::new(ArtworkCache::new(source, cache_config));
    let app = router(AppState::new(cache));

    HttpServer::new(&args.host, args.port, app)
        .serve()
        .await
        .context("server error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from([
            "gallery-server",
            "--port",
            "9000",
            "--cache-ttl",
            "60",
            "--serve-stale",
            "--fixture",
            "artworks.json",
        ])
        .unwrap();

        assert_eq!(args.port, 9000);
        assert!(args.serve_stale);
        assert!(!args.debug);
        assert_eq!(args.fixture, Some(PathBuf::from("artworks.json")));

        let config = args.cache_config();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert!(config.serve_stale_on_error);
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let args =
            Args::try_parse_from(["gallery-server", "--cache-ttl", "0", "--fetch-timeout", "0"])
                .unwrap();

        let config = args.cache_config();
        assert_eq!(config.ttl, Duration::from_secs(1));
        assert_eq!(config.fetch_timeout, Duration::from_secs(1));
    }
}
