//! Reelmix Player - main entry point
//!
//! Serves keyword-indexed clip playlists from a corpus of timestamped
//! interview segments: HTTP control surface, SSE event stream for UI
//! clients, and an SSE command stream for the embedded media player.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelmix_common::config::TomlConfig;
use reelmix_common::SystemClock;
use reelmix_player::api::{self, AppContext};
use reelmix_player::index::IndexCache;
use reelmix_player::player::{
    ClipController, IntervalTicker, PlayerEngine, RemoteWidget,
};
use reelmix_player::playlist::PlaylistAssembler;
use reelmix_player::store::SqliteSegmentStore;

/// Command-line arguments for reelmix-player
#[derive(Parser, Debug)]
#[command(name = "reelmix-player")]
#[command(about = "Keyword playlist player service for reelmix")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "reelmix.toml", env = "REELMIX_CONFIG")]
    config: PathBuf,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "REELMIX_PORT")]
    port: Option<u16>,

    /// SQLite database path (overrides config file)
    #[arg(short, long, env = "REELMIX_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reelmix_player=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = TomlConfig::load(&args.config).context("Failed to load configuration")?;
    let port = args.port.unwrap_or(config.port);
    let db_path = args
        .database
        .unwrap_or_else(|| PathBuf::from(&config.database_path));

    info!("Starting reelmix-player on port {}", port);
    info!("Corpus database: {}", db_path.display());

    let pool = reelmix_common::db::init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let (event_tx, _) = tokio::sync::broadcast::channel(256);
    let (command_tx, _) = tokio::sync::broadcast::channel(64);
    let (widget_event_tx, widget_event_rx) = tokio::sync::mpsc::unbounded_channel();

    // Core engine wiring: store -> index cache -> assembler -> player
    let clock = Arc::new(SystemClock);
    let store = Arc::new(SqliteSegmentStore::new(pool));
    let cache = Arc::new(
        IndexCache::new(store, config.engine.index_ttl(), clock.clone())
            .with_event_sender(event_tx.clone()),
    );
    let assembler = Arc::new(PlaylistAssembler::new(Arc::clone(&cache)));

    let widget = Arc::new(RemoteWidget::new(command_tx.clone()));
    let controller = ClipController::new(
        Box::new(Arc::clone(&widget)),
        config.engine.clone(),
        clock,
        event_tx.clone(),
    );

    let engine = Arc::new(PlayerEngine::new(controller));
    engine.start(
        widget_event_rx,
        Box::new(IntervalTicker::new(config.engine.poll_interval())),
    );

    let ctx = AppContext {
        cache,
        assembler,
        engine: Arc::clone(&engine),
        widget,
        widget_event_tx,
        event_tx,
        command_tx,
    };

    tokio::select! {
        result = api::run(ctx, port) => {
            result.context("HTTP server failed")?;
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            engine.stop();
        }
    }

    Ok(())
}
