//! Shared utilities.
//!
//! - [`tracing`]: Span recording helpers and the `security_event!` macro

pub mod tracing;
