//! Request adaptation for dispatch.
//!
//! # Responsibilities
//! - Collect the streaming request body (bounded)
//! - Detach the connection upgrade handle so dispatch can offer hijacking
//! - Decode the request path once for routing and static resolution
//!
//! # Design Decisions
//! - Dispatch is synchronous, so the body is fully read before routing
//! - Oversized bodies are rejected before any route is consulted

use std::borrow::Cow;

use axum::body::{self, Body, Bytes};
use axum::http::StatusCode;
use http_body_util::LengthLimitError;
use hyper::upgrade::OnUpgrade;
use percent_encoding::percent_decode_str;

/// Request as seen by filters, handlers and fallbacks.
pub type Request = axum::http::Request<Bytes>;

/// Errors raised while collecting a request body.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(axum::Error),
}

impl BodyError {
    /// Status the transport answers with.
    pub fn status(&self) -> StatusCode {
        match self {
            BodyError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            BodyError::Read(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn classify(err: axum::Error, limit: usize) -> Self {
        let inner = err.into_inner();
        if inner.is::<LengthLimitError>() {
            BodyError::TooLarge { limit }
        } else {
            BodyError::Read(axum::Error::new(inner))
        }
    }
}

/// Split a transport request into a dispatchable request and its upgrade handle.
pub async fn collect(
    request: axum::http::Request<Body>,
    limit: usize,
) -> Result<(Request, Option<OnUpgrade>), BodyError> {
    let (mut parts, body) = request.into_parts();
    let upgrade = parts.extensions.remove::<OnUpgrade>();
    let bytes = body::to_bytes(body, limit)
        .await
        .map_err(|e| BodyError::classify(e, limit))?;
    Ok((Request::from_parts(parts, bytes), upgrade))
}

/// The request path with percent-encoding removed.
///
/// Invalid UTF-8 sequences are replaced rather than rejected.
pub fn decoded_path<B>(request: &axum::http::Request<B>) -> Cow<'_, str> {
    percent_decode_str(request.uri().path()).decode_utf8_lossy()
}
