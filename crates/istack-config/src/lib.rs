//! # istack Config
//!
//! Configuration types loaded from environment variables:
//!
//! - [`jwt`]: JWT verification and issuance configuration
//! - [`logging`]: Log level and JSON log file configuration
//!
//! # Example
//!
//! ```ignore
//! use istack_config::{JwtConfig, LogConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let log_config = LogConfig::from_env();
//! ```

pub mod jwt;
pub mod logging;

// Re-export commonly used types at crate root
pub use jwt::JwtConfig;
pub use logging::{LogConfig, LogRotation};
