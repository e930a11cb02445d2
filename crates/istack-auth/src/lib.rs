//! # istack Auth
//!
//! Organization-scoped sessions and authorization for istack services.
//!
//! This crate provides:
//!
//! - [`org`]: Organization path algebra (`root>parent>child`)
//! - [`session`]: The [`Session`] entity and the authorization evaluator
//! - [`claims`]: Mapping between sessions and token claims
//! - [`jwt`]: Token creation and verification
//! - [`error`]: Malformed token, authentication and authorization errors
//!
//! # Role inheritance
//!
//! Roles are granted per organization. A role granted for an organization
//! also applies to all of its descendants, never to its ancestors:
//!
//! ```
//! use istack_auth::Session;
//!
//! let session = Session::new(
//!     Some("user-id".to_string()),
//!     [("root", vec!["R1"]), ("root>parent>org", vec!["R2"])],
//!     None,
//! );
//!
//! assert!(session.has_any_role_of(&["R1"], Some("root>parent>org")));
//! assert!(!session.has_any_role_of(&["R2"], Some("root")));
//! ```

pub mod claims;
pub mod error;
pub mod jwt;
pub mod org;
pub mod session;

// Re-export commonly used types at crate root
pub use claims::{TokenClaims, UserClaims, from_claims, to_claims};
pub use error::{AuthenticationFailure, AuthorizationFailure, MalformedTokenError};
pub use jwt::{create_access_token, decode_session, verify_token};
pub use org::{ORG_SEPARATOR, ancestors, iterate_parents};
pub use session::{RoleMap, Session, create_anonymous_session, generate_session_id};
