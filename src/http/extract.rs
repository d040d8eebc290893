use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::auth::token;
use crate::domain::user::{fields, role_of, Role};
use crate::error::Error;
use crate::state::AppState;
use crate::store::document::Document;

/// Authenticated caller, resolved from the `Authorization: Bearer` token.
/// Extraction fails with 401 when the token is missing, invalid, expired,
/// issued to a user that no longer exists, or issued before the user's
/// last password change.
pub struct CurrentUser {
    pub id: String,
    pub role: Role,
    pub doc: Document,
}

impl CurrentUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), Error> {
        if !allowed.contains(&self.role) {
            return Err(Error::Forbidden(
                "you do not have permission to perform this action".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Error> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                Error::Unauthorized(
                    "you are not logged in; please log in to get access".to_string(),
                )
            })?;

        let claims = token::verify(token, state.config.jwt_secret.as_bytes())?;

        let user = state
            .users
            .find_for_auth(&claims.sub)
            .await?
            .ok_or_else(|| {
                Error::Unauthorized(
                    "the user belonging to this token no longer exists".to_string(),
                )
            })?;

        if let Ok(changed_ms) = user.timestamp(fields::PASSWORD_CHANGED_AT) {
            if changed_ms / 1000 > claims.iat {
                return Err(Error::Unauthorized(
                    "password recently changed; please log in again".to_string(),
                ));
            }
        }

        let role = role_of(&user);
        Ok(CurrentUser {
            id: claims.sub,
            role,
            doc: user,
        })
    }
}
