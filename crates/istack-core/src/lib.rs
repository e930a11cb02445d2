//! # istack Core
//!
//! Foundational types shared by the istack crates.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//!
//! # Example
//!
//! ```ignore
//! use istack_core::AppError;
//!
//! let error = AppError::forbidden("Session lacks the required roles".to_string());
//! assert_eq!(error.status, axum::http::StatusCode::FORBIDDEN);
//! ```

pub mod errors;

// Re-export commonly used types at crate root
pub use errors::AppError;
