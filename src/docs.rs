use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use istack_auth::{TokenClaims, UserClaims};

use crate::modules::session::model::{ErrorResponse, OrganizationsResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::session::controller::get_session,
        crate::modules::session::controller::get_organizations,
    ),
    components(
        schemas(
            TokenClaims,
            UserClaims,
            OrganizationsResponse,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Session", description = "Session and organization lookup")
    ),
    info(
        title = "istack API",
        version = "0.1.0",
        description = "Organization scoped sessions and role based authorization.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
