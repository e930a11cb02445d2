//! Sessions and the authorization evaluator.
//!
//! A [`Session`] is a user identity plus the roles that identity holds in
//! each organization. Roles are stored only at the organization they were
//! granted for; inheritance down the organization tree is computed when a
//! session is queried:
//!
//! - a role granted at `root` applies to `root>parent>child`
//! - a role granted at `root>parent>child` does not apply to `root`
//!
//! An empty list of admitted roles is satisfied by organization membership
//! alone, so callers can express "any presence in this organization" without
//! enumerating roles.

use std::collections::{BTreeMap, BTreeSet};

use rand::RngCore;
use rand::rngs::OsRng;

use crate::org::{is_valid, iterate_parents};

/// Roles granted per organization path.
pub type RoleMap = BTreeMap<String, BTreeSet<String>>;

/// Number of random bytes in a generated session id.
const SESSION_ID_BYTES: usize = 16;

/// A user's session, valid for the processing of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    identity: Option<String>,
    roles: RoleMap,
    session_id: String,
}

impl Session {
    /// Creates a session.
    ///
    /// A fresh random session id is generated unless `session_id` is given,
    /// which is the case when a session is rebuilt from token claims.
    pub fn new<I, K, R, S>(
        identity: Option<String>,
        roles_by_org: I,
        session_id: Option<String>,
    ) -> Self
    where
        I: IntoIterator<Item = (K, R)>,
        K: Into<String>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles = roles_by_org
            .into_iter()
            .map(|(org, roles)| (org.into(), roles.into_iter().map(Into::into).collect()))
            .collect();

        Self {
            identity,
            roles,
            session_id: session_id.unwrap_or_else(generate_session_id),
        }
    }

    /// Creates a session without identity, optionally scoped to the
    /// organization hinted by the request.
    ///
    /// A blank or malformed hint (such as `acme>>branch`) is treated as no
    /// hint. The hinted organization gets an empty role set.
    pub fn anonymous(org_hint: Option<&str>) -> Self {
        let roles: RoleMap = match org_hint.map(str::trim) {
            Some(org) if is_valid(org) => BTreeMap::from([(org.to_string(), BTreeSet::new())]),
            _ => BTreeMap::new(),
        };

        Self {
            identity: None,
            roles,
            session_id: generate_session_id(),
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn roles(&self) -> &RoleMap {
        &self.roles
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Roles that apply to `org`, including those inherited from its ancestors.
    pub fn effective_roles(&self, org: &str) -> BTreeSet<&str> {
        iterate_parents(org, true)
            .into_iter()
            .filter_map(|path| self.roles.get(path))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Checks whether the session has any of `admitted_roles`.
    ///
    /// Without `org` every organization the session has an entry for is
    /// considered on its own role set. With `org` the roles of `org` and all
    /// of its ancestors count. An empty `admitted_roles` is satisfied by an
    /// entry for `org` or one of its ancestors (or any entry at all when no
    /// `org` is given).
    pub fn has_any_role_of(&self, admitted_roles: &[&str], org: Option<&str>) -> bool {
        match org {
            None => self
                .roles
                .values()
                .any(|roles| qualifies(roles, admitted_roles)),
            Some(org) => {
                let mut entries = iterate_parents(org, true)
                    .into_iter()
                    .filter_map(|path| self.roles.get(path))
                    .peekable();

                if admitted_roles.is_empty() {
                    return entries.peek().is_some();
                }
                entries.any(|roles| qualifies(roles, admitted_roles))
            }
        }
    }

    /// Minimal set of organizations for which the session holds any of
    /// `admitted_roles`.
    ///
    /// An organization qualifies on its own role set. When both an
    /// organization and one of its descendants qualify only the ancestor is
    /// kept, since the descendant is covered through inheritance.
    pub fn organizations_for_roles(&self, admitted_roles: &[&str]) -> BTreeSet<String> {
        let qualifying: BTreeSet<&str> = self
            .roles
            .iter()
            .filter(|(_, roles)| qualifies(roles, admitted_roles))
            .map(|(org, _)| org.as_str())
            .collect();

        qualifying
            .iter()
            .filter(|org| {
                !iterate_parents(org, false)
                    .into_iter()
                    .any(|parent| qualifying.contains(parent))
            })
            .map(|org| org.to_string())
            .collect()
    }
}

/// Builds the session used for unauthenticated requests.
///
/// `request_org_header` is the raw value of the organization hint header.
pub fn create_anonymous_session(request_org_header: Option<&str>) -> Session {
    Session::anonymous(request_org_header)
}

/// Generates a random session id from the operating system's CSPRNG.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn qualifies(roles: &BTreeSet<String>, admitted_roles: &[&str]) -> bool {
    admitted_roles.is_empty() || admitted_roles.iter().any(|role| roles.contains(*role))
}
