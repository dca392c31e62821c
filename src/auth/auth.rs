use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

use crate::model::user::UserRole;

/// Authenticated caller, resolved from the bearer token by the auth
/// middleware and stashed in request extensions.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub name: String,
    pub role: UserRole,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_superadmin(&self) -> actix_web::Result<()> {
        if self.role == UserRole::Superadmin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Superadmin only"))
        }
    }
}
