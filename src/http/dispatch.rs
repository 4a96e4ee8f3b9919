//! Request dispatch pipeline.
//!
//! # Data Flow
//! ```text
//! serve(sink, request)
//!     → wrap sink in BufferedResponse
//!     → lookup(percent-decoded path)
//!         ├─ miss + fallback   → fallback(sink)         (buffer bypassed)
//!         ├─ miss              → 404 → flush
//!         ├─ no handler        → nothing written
//!         └─ endpoint          → filters → handler → flush
//!     → panic anywhere         → status forced to 500 → flush
//! ```
//!
//! # Design Decisions
//! - Dispatch is synchronous and never logs; the returned `Dispatch`
//!   tells the transport what happened
//! - The buffer is flushed from a single place after the guarded region,
//!   so each request flushes at most once
//! - Panics never cross the dispatch boundary

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use axum::http::StatusCode;

use crate::http::buffered::BufferedResponse;
use crate::http::writer::ResponseWriter;
use crate::http::{decoded_path, Request};
use crate::routing::Router;

/// How a request was dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Every filter passed and the handler ran.
    Handled,
    /// A filter returned false.
    Rejected,
    /// The path matched a node without handler. Nothing was written.
    NoHandler,
    /// No route matched and no fallback is configured.
    NotFound,
    /// No route matched; the fallback served the request.
    Fallback,
    /// A filter, handler or fallback panicked.
    Panicked(String),
}

impl Dispatch {
    /// Short name for logs and metric labels.
    pub fn label(&self) -> &'static str {
        match self {
            Dispatch::Handled => "handled",
            Dispatch::Rejected => "rejected",
            Dispatch::NoHandler => "no_handler",
            Dispatch::NotFound => "not_found",
            Dispatch::Fallback => "fallback",
            Dispatch::Panicked(_) => "panicked",
        }
    }
}

enum Step {
    Flush(Dispatch),
    Skip(Dispatch),
}

impl<C> Router<C> {
    /// Serve one request against one response sink.
    pub fn serve(&self, w: &mut dyn ResponseWriter, req: &Request) -> Dispatch {
        let mut buffered = BufferedResponse::new(w);

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(&mut buffered, req)));

        match result {
            Ok(Step::Flush(outcome)) => {
                buffered.flush();
                outcome
            }
            Ok(Step::Skip(outcome)) => outcome,
            Err(payload) => {
                buffered.write_status(StatusCode::INTERNAL_SERVER_ERROR);
                buffered.flush();
                Dispatch::Panicked(panic_message(payload.as_ref()))
            }
        }
    }

    fn dispatch(&self, buffered: &mut BufferedResponse<'_>, req: &Request) -> Step {
        let node = match self.lookup(&decoded_path(req)) {
            Ok(node) => node,
            Err(_) => {
                return match &self.fallback {
                    Some(fallback) => {
                        fallback.serve(buffered.unbuffered(), req);
                        Step::Skip(Dispatch::Fallback)
                    }
                    None => {
                        buffered.write_status(StatusCode::NOT_FOUND);
                        Step::Flush(Dispatch::NotFound)
                    }
                };
            }
        };

        let Some(handler) = node.handler() else {
            return Step::Skip(Dispatch::NoHandler);
        };

        let w: &mut dyn ResponseWriter = buffered;
        for filter in node.filters() {
            if !filter(&mut *w, req) {
                return Step::Flush(Dispatch::Rejected);
            }
        }
        handler(&self.context, w, req);
        Step::Flush(Dispatch::Handled)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text.to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::writer::{HijackError, Hijacker};
    use crate::http::ResponseRecorder;
    use crate::routing::{filter, Fallback, RouterBuilder};
    use axum::body::Bytes;
    use axum::http::HeaderMap;
    use hyper::upgrade::OnUpgrade;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn get(path: &str) -> Request {
        axum::http::Request::builder().uri(path).body(Bytes::new()).unwrap()
    }

    fn serve<C>(router: &Router<C>, path: &str) -> (ResponseRecorder, Dispatch) {
        let mut recorder = ResponseRecorder::new();
        let outcome = router.serve(&mut recorder, &get(path));
        (recorder, outcome)
    }

    #[test]
    fn test_handler_response_flushed() {
        let mut builder = RouterBuilder::default();
        builder
            .handle("/tests/:testId", |_: &(), w, _| {
                w.write_status(StatusCode::OK);
                w.write(b"response");
            })
            .unwrap();
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/tests/1");
        assert_eq!(outcome, Dispatch::Handled);
        assert_eq!(recorder.status(), StatusCode::OK);
        assert_eq!(recorder.body(), b"response");
    }

    #[test]
    fn test_panic_after_ok_yields_500() {
        let mut builder = RouterBuilder::default();
        builder
            .handle("/tests/:testId", |_: &(), w, _| {
                w.write_status(StatusCode::OK);
                w.write(b"partial");
                panic!("something really bad");
            })
            .unwrap();
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/tests/1");
        assert_eq!(
            outcome,
            Dispatch::Panicked("something really bad".to_string())
        );
        assert_eq!(recorder.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(recorder.body(), b"partial");
    }

    #[test]
    fn test_filter_short_circuits() {
        let called = Arc::new(AtomicBool::new(false));
        let handler_called = called.clone();

        let mut builder = RouterBuilder::default();
        builder
            .handle_filtered(
                "/tests/:testId",
                vec![filter(|w, _| {
                    w.write_status(StatusCode::UNAUTHORIZED);
                    w.write(b"denied");
                    false
                })],
                move |_: &(), w, _| {
                    handler_called.store(true, Ordering::SeqCst);
                    w.write_status(StatusCode::OK);
                },
            )
            .unwrap();
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/tests/1");
        assert_eq!(outcome, Dispatch::Rejected);
        assert_eq!(recorder.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(recorder.body(), b"denied");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_filters_run_in_order() {
        let trail = Arc::new(Mutex::new(Vec::new()));
        let (t1, t2, t3, th) = (trail.clone(), trail.clone(), trail.clone(), trail.clone());

        let mut builder = RouterBuilder::default();
        builder
            .handle_filtered(
                "/ordered",
                vec![
                    filter(move |_, _| {
                        t1.lock().unwrap().push("first");
                        true
                    }),
                    filter(move |_, _| {
                        t2.lock().unwrap().push("second");
                        false
                    }),
                    filter(move |_, _| {
                        t3.lock().unwrap().push("third");
                        true
                    }),
                ],
                move |_: &(), _, _| th.lock().unwrap().push("handler"),
            )
            .unwrap();
        let router = builder.build();

        serve(&router, "/ordered");
        assert_eq!(*trail.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_passing_filters_reach_handler() {
        let mut builder = RouterBuilder::default();
        builder
            .handle_filtered(
                "/open",
                vec![filter(|_, _| true), filter(|_, _| true)],
                |_: &(), w, _| {
                    w.write_status(StatusCode::CREATED);
                },
            )
            .unwrap();
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/open");
        assert_eq!(outcome, Dispatch::Handled);
        assert_eq!(recorder.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_panicking_filter_yields_500() {
        let mut builder = RouterBuilder::default();
        builder
            .handle_filtered(
                "/guarded",
                vec![filter(|_, _| panic!("filter failed"))],
                |_: &(), w, _| w.write_status(StatusCode::OK),
            )
            .unwrap();
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/guarded");
        assert!(matches!(outcome, Dispatch::Panicked(_)));
        assert_eq!(recorder.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_without_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut builder = RouterBuilder::default();
        builder
            .handle("/tests/:testId", move |_: &(), _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let router = builder.build();

        for path in ["/unknown", "/tests/1/more", "/"] {
            let (recorder, outcome) = serve(&router, path);
            assert_eq!(outcome, Dispatch::NotFound, "path {path}");
            assert_eq!(recorder.status(), StatusCode::NOT_FOUND);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_percent_encoded_path_matches_route() {
        let mut builder = RouterBuilder::default();
        builder
            .handle("/café/:name", |_: &(), w, _| {
                w.write(b"menu");
            })
            .unwrap();
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/caf%C3%A9/my%20dish");
        assert_eq!(outcome, Dispatch::Handled);
        assert_eq!(recorder.status(), StatusCode::OK);
        assert_eq!(recorder.body(), b"menu");
    }

    #[test]
    fn test_intermediate_node_is_silent() {
        let mut builder = RouterBuilder::default();
        builder
            .handle("/api/v1/item", |_: &(), w, _| {
                w.write(b"item");
            })
            .unwrap();
        let router = builder.build();

        let mut recorder = ResponseRecorder::new();
        recorder.write_status(StatusCode::IM_A_TEAPOT);
        let outcome = router.serve(&mut recorder, &get("/api/v1"));

        assert_eq!(outcome, Dispatch::NoHandler);
        assert_eq!(recorder.status(), StatusCode::IM_A_TEAPOT);
        assert!(recorder.body().is_empty());
    }

    struct Teapot;

    impl Fallback for Teapot {
        fn serve(&self, w: &mut dyn ResponseWriter, _: &Request) {
            w.write_status(StatusCode::IM_A_TEAPOT);
            w.write(b"short and stout");
        }
    }

    struct Exploding;

    impl Fallback for Exploding {
        fn serve(&self, w: &mut dyn ResponseWriter, _: &Request) {
            w.write_status(StatusCode::OK);
            panic!("fallback failed");
        }
    }

    #[test]
    fn test_fallback_writes_unbuffered() {
        let mut builder = RouterBuilder::default();
        builder.handle("/api", |_: &(), _, _| {}).unwrap();
        builder.fallback(Teapot);
        let router = builder.build();
        assert!(router.has_fallback());

        let (recorder, outcome) = serve(&router, "/static/app.js");
        assert_eq!(outcome, Dispatch::Fallback);
        assert_eq!(recorder.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(recorder.body(), b"short and stout");
    }

    #[test]
    fn test_fallback_panic_yields_500() {
        let mut builder = RouterBuilder::<()>::default();
        builder.fallback(Exploding);
        let router = builder.build();

        let (recorder, outcome) = serve(&router, "/anything");
        assert!(matches!(outcome, Dispatch::Panicked(_)));
        assert_eq!(recorder.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_context_reaches_handler() {
        let mut builder = RouterBuilder::new("tenant-a".to_string());
        builder
            .handle("/whoami", |ctx: &String, w, _| {
                w.write(ctx.as_bytes());
            })
            .unwrap();
        let router = builder.build();

        let (recorder, _) = serve(&router, "/whoami");
        assert_eq!(recorder.body(), b"tenant-a");
    }

    #[test]
    fn test_handler_sees_full_request() {
        let mut builder = RouterBuilder::default();
        builder
            .handle("/items/:id", |_: &(), w, req: &Request| {
                let id = req.uri().path().rsplit('/').next().unwrap_or_default();
                w.write(id.as_bytes());
            })
            .unwrap();
        let router = builder.build();

        let (recorder, _) = serve(&router, "/items/12345?verbose=1");
        assert_eq!(recorder.body(), b"12345");
    }

    #[derive(Default)]
    struct HijackableSink {
        inner: ResponseRecorder,
        queried: bool,
    }

    impl ResponseWriter for HijackableSink {
        fn headers_mut(&mut self) -> &mut HeaderMap {
            self.inner.headers_mut()
        }

        fn write_status(&mut self, status: StatusCode) {
            self.inner.write_status(status);
        }

        fn write(&mut self, body: &[u8]) -> usize {
            self.inner.write(body)
        }

        fn hijacker(&mut self) -> Option<&mut dyn Hijacker> {
            Some(self as &mut dyn Hijacker)
        }
    }

    impl Hijacker for HijackableSink {
        fn hijack(&mut self) -> Result<OnUpgrade, HijackError> {
            self.queried = true;
            Err(HijackError::AlreadyHijacked)
        }
    }

    #[test]
    fn test_hijack_capability_exposed_through_buffer() {
        let mut builder = RouterBuilder::default();
        builder
            .handle("/ws", |_: &(), w, _| match w.hijacker() {
                Some(hijacker) => {
                    let _ = hijacker.hijack();
                }
                None => w.write_status(StatusCode::INTERNAL_SERVER_ERROR),
            })
            .unwrap();
        let router = builder.build();

        let mut sink = HijackableSink::default();
        router.serve(&mut sink, &get("/ws"));
        assert!(sink.queried);
        assert_eq!(sink.inner.status(), StatusCode::OK);

        let (recorder, _) = serve(&router, "/ws");
        assert_eq!(recorder.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
