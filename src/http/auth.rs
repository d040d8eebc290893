use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{password, token};
use crate::domain::user::{fields, SignupInput};
use crate::error::Error;
use crate::state::AppState;

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupInput>,
) -> Result<impl IntoResponse, Error> {
    let user = state.users.create(input).await?;
    let token = token::sign(
        user.id()?,
        state.config.jwt_secret.as_bytes(),
        state.config.jwt_ttl_secs,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "token": token,
            "data": { "user": user.to_json() },
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, Error> {
    let (Some(email), Some(pass)) = (input.email, input.password) else {
        return Err(Error::Validation(
            "please provide email and password".to_string(),
        ));
    };

    let Some(user) = state.users.find_by_email_with_password(&email).await? else {
        return Err(Error::Unauthorized(
            "incorrect email or password".to_string(),
        ));
    };
    let verified = user
        .text(fields::PASSWORD)
        .is_ok_and(|hash| password::verify(&pass, hash));
    if !verified {
        return Err(Error::Unauthorized(
            "incorrect email or password".to_string(),
        ));
    }
    let token = token::sign(
        user.id()?,
        state.config.jwt_secret.as_bytes(),
        state.config.jwt_ttl_secs,
    )?;

    Ok(Json(json!({ "status": "success", "token": token })))
}
