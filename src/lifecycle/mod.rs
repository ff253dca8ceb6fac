//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     latched watch flag → server stops accepting → in-flight requests finish → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
pub use signals::wait_for_signal;
