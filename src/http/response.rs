//! In-memory response sink.
//!
//! # Responsibilities
//! - Collect status, headers and body written by dispatch
//! - Carry the connection upgrade handle when the transport provides one
//! - Convert into an `axum` response once dispatch returns
//!
//! # Design Decisions
//! - Status defaults to 200, so a dispatch that writes nothing yields an
//!   empty 200 response
//! - The hijack capability is only advertised while an upgrade handle is held

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use hyper::upgrade::OnUpgrade;

use crate::http::writer::{HijackError, Hijacker, ResponseWriter};

#[derive(Debug)]
pub struct ResponseRecorder {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    upgrade: Option<OnUpgrade>,
    hijacked: bool,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            upgrade: None,
            hijacked: false,
        }
    }

    /// Attach the connection upgrade handle taken from the request.
    pub fn with_upgrade(mut self, upgrade: Option<OnUpgrade>) -> Self {
        self.upgrade = upgrade;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_hijacked(&self) -> bool {
        self.hijacked
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Default for ResponseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, body: &[u8]) -> usize {
        self.body.extend_from_slice(body);
        body.len()
    }

    fn hijacker(&mut self) -> Option<&mut dyn Hijacker> {
        if self.upgrade.is_some() || self.hijacked {
            Some(self as &mut dyn Hijacker)
        } else {
            None
        }
    }
}

impl Hijacker for ResponseRecorder {
    fn hijack(&mut self) -> Result<OnUpgrade, HijackError> {
        let upgrade = self.upgrade.take().ok_or(HijackError::AlreadyHijacked)?;
        self.hijacked = true;
        Ok(upgrade)
    }
}
