//! HTTP dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (collect body, detach upgrade handle)
//!     → dispatch.rs (lookup, filters, handler, panic recovery)
//!         → buffered.rs (status/body held until flush)
//!     → response.rs (recorded response → Axum response)
//!     → Send to client
//! ```

pub mod buffered;
pub mod dispatch;
pub mod request;
pub mod response;
pub mod server;
pub mod writer;

pub use dispatch::Dispatch;
pub use request::{decoded_path, Request};
pub use response::ResponseRecorder;
pub use server::HttpServer;
pub use writer::{HijackError, Hijacker, ResponseWriter};
