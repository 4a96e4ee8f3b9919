//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Transport layer (http::server) produces:
//!     → logging.rs (structured log events per dispatch)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Dispatch never logs or records; it reports a `Dispatch`
//!   outcome and the transport turns that into events
//! - Dispatch log lines carry the request ID set by the middleware

pub mod logging;
pub mod metrics;
