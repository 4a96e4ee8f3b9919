//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router that forwards every request to dispatch
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run dispatch on the blocking pool, one task per request
//! - Report dispatch outcomes to logs and metrics
//!
//! # Design Decisions
//! - Routing itself is done by `routing::Router`; Axum only provides the
//!   connection loop and middleware stack
//! - Dispatch may block inside application handlers, so it never runs on
//!   an async worker thread

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::dispatch::Dispatch;
use crate::http::request::collect;
use crate::http::response::ResponseRecorder;
use crate::observability::metrics;
use crate::routing::Router as DynamicRouter;

/// Application state injected into the dispatch handler.
struct AppState<C> {
    router: Arc<DynamicRouter<C>>,
    max_body_bytes: usize,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

/// HTTP server driving a frozen routing tree.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server serving `router`.
    pub fn new<C>(router: Arc<DynamicRouter<C>>, config: &ServerConfig) -> Self
    where
        C: Send + Sync + 'static,
    {
        let state = AppState {
            router,
            max_body_bytes: config.listener.max_body_bytes,
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router<C>(config: &ServerConfig, state: AppState<C>) -> Router
    where
        C: Send + Sync + 'static,
    {
        Router::new()
            .fallback(dispatch_handler::<C>)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    )))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forwards every request to the routing tree.
async fn dispatch_handler<C>(State(state): State<AppState<C>>, request: Request<Body>) -> Response
where
    C: Send + Sync + 'static,
{
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (request, upgrade) = match collect(request, state.max_body_bytes).await {
        Ok(collected) => collected,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, error = %e, "Rejected request body");
            return (e.status(), e.to_string()).into_response();
        }
    };

    let router = state.router.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let mut recorder = ResponseRecorder::new().with_upgrade(upgrade);
        let outcome = router.serve(&mut recorder, &request);
        (recorder, outcome)
    })
    .await;

    let (recorder, outcome) = match joined {
        Ok(done) => done,
        Err(e) => {
            tracing::error!(request_id = %request_id, path = %path, error = %e, "Dispatch task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let status = recorder.status();
    match &outcome {
        Dispatch::Panicked(message) => tracing::error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            panic = %message,
            "Handler panicked"
        ),
        _ => tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            outcome = outcome.label(),
            status = status.as_u16(),
            "Request dispatched"
        ),
    }
    metrics::record_dispatch(outcome.label(), status.as_u16(), start_time);

    recorder.into_response()
}
