mod routes;
mod state;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use fit_worker::{Worker, WorkerConfig};

use crate::routes::make_router_with_cors;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "fit_daemon", about = "HTTP front end for the loadout optimizer")]
struct Args {
    #[arg(long, default_value_t = 3001)]
    port: u16,
    #[arg(long, default_value = "http://localhost:5173")]
    cors_origin: String,
    /// Emit a progress event every N results found (0 = none).
    #[arg(long, default_value_t = 1000)]
    progress_every: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let cors_origin: HeaderValue = args
        .cors_origin
        .parse()
        .with_context(|| format!("invalid --cors-origin '{}'", args.cors_origin))?;

    let state = AppState::new(Worker::new(WorkerConfig {
        progress_every: args.progress_every,
    }));
    let app = make_router_with_cors(state, cors_origin);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, progress_every = args.progress_every, "fit_daemon listening");
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}
