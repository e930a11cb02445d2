use axum::{Json, extract::Query};
use tracing::instrument;

use istack_auth::TokenClaims;

use crate::middleware::auth::{AuthSession, CurrentSession};

use super::model::{ErrorResponse, OrganizationsQuery, OrganizationsResponse};

/// Claims of the current session
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Claims of the authenticated session", body = TokenClaims),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Session",
    security(("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_session(AuthSession(session): AuthSession) -> Json<TokenClaims> {
    Json(session.to_claims())
}

/// Organizations in which the session holds any of the given roles
///
/// Works without a token: the anonymous session then only knows the
/// organization from the `x-ist-org` header.
#[utoipa::path(
    get,
    path = "/api/session/organizations",
    params(OrganizationsQuery),
    responses(
        (status = 200, description = "Minimal covering set of organizations", body = OrganizationsResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse)
    ),
    tag = "Session",
    security((), ("bearer_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_organizations(
    CurrentSession(session): CurrentSession,
    Query(query): Query<OrganizationsQuery>,
) -> Json<OrganizationsResponse> {
    let organizations = session
        .organizations_for_roles(&query.admitted_roles())
        .into_iter()
        .collect();

    Json(OrganizationsResponse { organizations })
}
