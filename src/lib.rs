//! Embeddable HTTP request router.
//!
//! Paths are matched segment by segment against a tree built at startup.
//! A segment written `:name` matches any single value at its level. Each
//! endpoint may carry filters that run before its handler and can stop
//! the request early.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use axum::http::StatusCode;
//! use dynamic_router::{filter, FileServerMode, HttpServer, RouterBuilder, ServerConfig, Shutdown};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RouterBuilder::new(());
//! builder.handle("/items/:id", |_, w, req| {
//!     w.write_status(StatusCode::OK);
//!     w.write(req.uri().path().as_bytes());
//! })?;
//! builder.handle_filtered(
//!     "/admin",
//!     vec![filter(|w, req| {
//!         let allowed = req.headers().contains_key("authorization");
//!         if !allowed {
//!             w.write_status(StatusCode::UNAUTHORIZED);
//!         }
//!         allowed
//!     })],
//!     |_, w, _| w.write_status(StatusCode::NO_CONTENT),
//! )?;
//! builder.serve_static_at("public", FileServerMode::Spa);
//! let router = Arc::new(builder.build());
//!
//! let config = ServerConfig::default();
//! let listener = tokio::net::TcpListener::bind(&config.listener.bind_address).await?;
//! let shutdown = Shutdown::new();
//! HttpServer::new(router, &config)
//!     .run(listener, shutdown.subscribe())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod static_files;

pub use config::ServerConfig;
pub use http::{Dispatch, HttpServer, Request, ResponseRecorder, ResponseWriter};
pub use lifecycle::Shutdown;
pub use routing::{filter, handler, Fallback, RouteError, Router, RouterBuilder};
pub use static_files::{FileServerMode, StaticFiles};
