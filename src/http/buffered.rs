//! Buffering adapter around the transport's response sink.
//!
//! Status and body are held back until `flush`, so the status can still
//! be forced to 500 when application code panics after writing a 200.

use axum::http::{HeaderMap, StatusCode};

use crate::http::writer::{Hijacker, ResponseWriter};

pub(crate) struct BufferedResponse<'a> {
    inner: &'a mut dyn ResponseWriter,
    status: StatusCode,
    body: Vec<u8>,
}

impl<'a> BufferedResponse<'a> {
    pub(crate) fn new(inner: &'a mut dyn ResponseWriter) -> Self {
        Self {
            inner,
            status: StatusCode::OK,
            body: Vec::new(),
        }
    }

    /// The wrapped sink, bypassing the buffer.
    pub(crate) fn unbuffered(&mut self) -> &mut dyn ResponseWriter {
        &mut *self.inner
    }

    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }

    /// Send the buffered status and body to the wrapped sink.
    pub(crate) fn flush(self) {
        self.inner.write_status(self.status);
        if !self.body.is_empty() {
            self.inner.write(&self.body);
        }
    }
}

impl ResponseWriter for BufferedResponse<'_> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, body: &[u8]) -> usize {
        self.body.extend_from_slice(body);
        body.len()
    }

    fn hijacker(&mut self) -> Option<&mut dyn Hijacker> {
        self.inner.hijacker()
    }
}
