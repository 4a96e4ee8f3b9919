//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (binary):
//!     Load config → Validate → Build routes → Freeze router → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → broadcast → server stops accepting
//!     → in-flight requests drain → exit
//! ```
//!
//! # Design Decisions
//! - Route registration completes before the listener is bound, so the
//!   tree is never read while it is still being written
//! - Shutdown is a broadcast: any number of tasks may subscribe

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
