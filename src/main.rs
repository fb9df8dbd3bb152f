use anyhow::Context;
use clap::Parser;
use site_gateway::api::{build_routes, common};
use site_gateway::core::traits::DefaultStorageConfig;
use site_gateway::state::AppState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    bind: String,

    #[arg(short, long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory served under /static (defaults to <data-dir>/static)
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Directory containing the clipboard and vault pages
    #[arg(long, env = "TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, env = "LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Refuse to start when auth.json exists but cannot be parsed
    #[arg(long, env = "STRICT_AUTH")]
    strict_auth: bool,
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "site-gateway.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_tracing(args.log_dir.as_deref());

    let storage = match args.data_dir {
        Some(dir) => DefaultStorageConfig::with_path(dir),
        None => DefaultStorageConfig::new(),
    }
    .map_err(anyhow::Error::msg)?
    .with_static_dir(args.static_dir)
    .with_templates_dir(args.templates_dir);

    let state = AppState::load(storage, args.strict_auth)
        .map_err(anyhow::Error::msg)
        .context("Failed to init state")?;
    if !state.auth.is_enforced() {
        tracing::warn!("Authorization disabled, every request is treated as admin");
    }

    let app = build_routes(Arc::new(state))
        .layer(axum::middleware::from_fn(common::request_logger));

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
