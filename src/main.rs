//! Application entry point and server initialization
//!
//! This module contains the main function that:
//! - Loads environment configuration
//! - Initializes the database and the view aggregator
//! - Starts the HTTP server with graceful shutdown support

use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use notehub::aggregator::Aggregator;
use notehub::config::Config;
use notehub::database::{init_db, AppState};
use notehub::repository::{NoteRepository, RedbNoteRepository};
use notehub::route::create_app;
use notehub::service::NoteService;
use notehub::views::ViewCounter;

/// Application entry point
///
/// See [`Config`] for the environment variables read at startup. `RUST_LOG`
/// overrides the default log filter.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file if it exists
    dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notehub=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env();

    let db = init_db(&config.database_url).expect("Failed to initialize database");
    let repo: Arc<dyn NoteRepository> = Arc::new(RedbNoteRepository::new(Arc::new(db)));
    let views = Arc::new(ViewCounter::new());

    // The service and the aggregator share the same counter instance
    let service = NoteService::new(repo.clone(), views.clone()).with_ads(config.load_ads());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let aggregator = Aggregator::new(views, repo, config.flush_interval).spawn(shutdown_rx);

    let app = create_app(AppState { service }).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind listener");

    info!("server running at http://localhost:{}", config.port);
    info!(
        "using database {}; flushing views every {:?}",
        config.database_url, config.flush_interval
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Last drain-and-flush before exit
    let _ = shutdown_tx.send(true);
    if let Err(err) = aggregator.await {
        warn!("view aggregator did not stop cleanly: {err}");
    }
}

/// Waits until the process is asked to stop
///
/// In-flight requests still complete after this resolves; the views they
/// record are picked up by the aggregator's final flush in `main`. A signal
/// that cannot be listened for is logged and never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("cannot listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("cannot listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };
    info!("{received} received; draining connections before the final view flush");
}
