//! Response sink contract between the transport and the dispatch pipeline.
//!
//! # Design Decisions
//! - Minimal surface: status, headers, body bytes
//! - Connection hijacking is an optional capability, queried through
//!   `hijacker()` instead of being part of every sink

use axum::http::{HeaderMap, StatusCode};
use hyper::upgrade::OnUpgrade;

/// Destination for one HTTP response.
pub trait ResponseWriter: Send {
    /// Response headers. Written through immediately, never buffered.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status code.
    fn write_status(&mut self, status: StatusCode);

    /// Append bytes to the response body and return how many were accepted.
    fn write(&mut self, body: &[u8]) -> usize;

    /// Connection hijacking, if the underlying connection supports it.
    fn hijacker(&mut self) -> Option<&mut dyn Hijacker> {
        None
    }
}

/// Takes over the raw connection once the response has been sent.
pub trait Hijacker: Send {
    /// Claim the connection upgrade.
    ///
    /// The returned future resolves after the response (usually a
    /// `101 Switching Protocols`) is written, and must be driven on the
    /// runtime, e.g. with `tokio::spawn`.
    fn hijack(&mut self) -> Result<OnUpgrade, HijackError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HijackError {
    #[error("connection already hijacked")]
    AlreadyHijacked,
}
