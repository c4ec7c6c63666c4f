//! Job-board API server.
//!
//! Usage:
//!   JWT_SECRET=... cargo run --bin seed_data   # optional demo data
//!   JWT_SECRET=... cargo run --bin jobboard    # start server on :5000

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jobboard::config::LogFormat;
use jobboard::{create_router, AppState, Config, Storage};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    // Held until exit so buffered file logs get flushed
    let _guard = init_tracing(&config);

    if let Err(e) = run(config).await {
        error!("server error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobboard=info,tower_http=info"));

    let (file_writer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "jobboard.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };
    let file_layer = file_writer.map(|writer| fmt::layer().json().with_writer(writer));

    let registry = tracing_subscriber::registry().with(file_layer);
    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).with(env_filter).init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .init(),
    }

    guard
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.bind_address();
    info!(database = %config.database_path, "opening store");
    let storage = Storage::open(&config.database_path)?;

    let state = AppState::new(config, storage.clone())?;
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "job board listening");
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let flushed = storage.flush()?;
    info!(bytes = flushed, "store flushed, shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("received shutdown signal");
}
