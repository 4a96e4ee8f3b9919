//! Dynamic router demo server.
//!
//! Serves a couple of built-in endpoints and, optionally, a static site
//! for every path no route matches.
//!
//! ```text
//! dynamic-router --config router.toml
//! dynamic-router --bind 127.0.0.1:8080 --static-dir ./public --spa
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderValue, StatusCode};
use clap::Parser;
use tokio::net::TcpListener;

use dynamic_router::config::{load_config, validate_config, ConfigError, StaticFilesConfig};
use dynamic_router::observability::{logging, metrics};
use dynamic_router::{
    FileServerMode, HttpServer, Request, ResponseWriter, RouteError, RouterBuilder, ServerConfig,
    Shutdown,
};

#[derive(Parser)]
#[command(name = "dynamic-router")]
#[command(about = "HTTP router with static and dynamic path segments", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Serve this directory for unmatched requests.
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Serve the site root when a static file is missing.
    #[arg(long, requires = "static_dir")]
    spa: bool,
}

/// Dispatch context shared by every handler.
struct AppContext {
    started_at: Instant,
    version: &'static str,
}

fn health(ctx: &AppContext, w: &mut dyn ResponseWriter, _: &Request) {
    let body = serde_json::json!({
        "status": "ok",
        "version": ctx.version,
        "uptime_secs": ctx.started_at.elapsed().as_secs(),
    });
    w.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    w.write_status(StatusCode::OK);
    w.write(body.to_string().as_bytes());
}

fn echo(_: &AppContext, w: &mut dyn ResponseWriter, req: &Request) {
    // the dynamic segment is not captured, read it back from the path
    let value = req
        .uri()
        .path()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    w.write_status(StatusCode::OK);
    w.write(value.as_bytes());
}

fn routes(builder: &mut RouterBuilder<AppContext>) -> Result<(), RouteError> {
    builder.handle("/health", health)?;
    builder.handle("/echo/:value", echo)?;
    Ok(())
}

fn load(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    if let Some(root) = &cli.static_dir {
        config.static_files = Some(StaticFilesConfig {
            root: root.clone(),
            mode: if cli.spa {
                FileServerMode::Spa
            } else {
                FileServerMode::Classic
            },
        });
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init(&config.observability.log_filter);
    tracing::info!("dynamic-router v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let mut builder = RouterBuilder::new(AppContext {
        started_at: Instant::now(),
        version: env!("CARGO_PKG_VERSION"),
    });
    routes(&mut builder)?;
    if let Some(static_files) = &config.static_files {
        tracing::info!(
            root = %static_files.root.display(),
            mode = ?static_files.mode,
            "Serving static files for unmatched requests"
        );
        builder.serve_static_at(&static_files.root, static_files.mode);
    }
    let router = Arc::new(builder.build());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(router, &config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
