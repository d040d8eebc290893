use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::domain::tour::{TourInput, TourPatch};
use crate::domain::user::Role;
use crate::error::Error;
use crate::http::extract::CurrentUser;
use crate::http::{clamp_plan, data_envelope, list_envelope};
use crate::query::plan::ReadPlan;
use crate::state::AppState;

pub async fn list_tours(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let plan = clamp_plan(ReadPlan::from_params(&params), &state);
    let result = state.tours.find_many(&plan).await?;
    Ok(list_envelope("tours", &result))
}

/// Alias route: pre-fills the query string with the five best-rated cheap
/// tours before the normal listing path runs.
pub async fn top_five_cheap(
    State(state): State<AppState>,
    Query(mut params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    params.insert("limit".to_string(), "5".to_string());
    params.insert("sort".to_string(), "-ratingsAverage,price".to_string());
    params.insert(
        "fields".to_string(),
        "name,price,ratingsAverage,summary,difficulty".to_string(),
    );

    let plan = clamp_plan(ReadPlan::from_params(&params), &state);
    let result = state.tours.find_many(&plan).await?;
    Ok(list_envelope("tours", &result))
}

pub async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let tour = state.tours.find_by_id(&id).await?;
    Ok(data_envelope("tour", &tour))
}

pub async fn create_tour(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(input): Json<TourInput>,
) -> Result<impl IntoResponse, Error> {
    user.require_role(&[Role::Admin, Role::LeadGuide])?;
    let tour = state.tours.create(input).await?;
    Ok(data_envelope("tour", &tour))
}

pub async fn update_tour(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<TourPatch>,
) -> Result<impl IntoResponse, Error> {
    user.require_role(&[Role::Admin, Role::LeadGuide])?;
    let tour = state.tours.find_and_update(&id, patch).await?;
    Ok(data_envelope("tour", &tour))
}

pub async fn delete_tour(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    user.require_role(&[Role::Admin, Role::LeadGuide])?;
    state.tours.find_and_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn tour_stats(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let stats = state.tours.stats().await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "stats": stats },
    })))
}

pub async fn monthly_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(year): Path<i32>,
) -> Result<impl IntoResponse, Error> {
    user.require_role(&[Role::Admin, Role::LeadGuide, Role::Guide])?;
    let plan = state.tours.monthly_plan(year).await?;
    Ok(Json(json!({
        "status": "success",
        "data": { "plan": plan },
    })))
}
