use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;

use crate::domain::user::Role;
use crate::error::Error;
use crate::http::extract::CurrentUser;
use crate::http::{clamp_plan, data_envelope, list_envelope};
use crate::query::plan::ReadPlan;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    user.require_role(&[Role::Admin])?;
    let plan = clamp_plan(ReadPlan::from_params(&params), &state);
    let result = state.users.find_many(&plan).await?;
    Ok(list_envelope("users", &result))
}

pub async fn get_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    user.require_role(&[Role::Admin])?;
    let found = state.users.find_by_id(&id).await?;
    Ok(data_envelope("user", &found))
}
