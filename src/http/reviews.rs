use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::domain::review::{fields, ReviewInput, ReviewPatch};
use crate::error::Error;
use crate::http::extract::CurrentUser;
use crate::http::{clamp_plan, data_envelope, list_envelope};
use crate::query::plan::{FilterExpr, ReadPlan};
use crate::state::AppState;
use crate::store::document::Value;

pub async fn list_reviews(
    State(state): State<AppState>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let plan = clamp_plan(ReadPlan::from_params(&params), &state);
    let result = state.reviews.find_many(&plan, None).await?;
    Ok(list_envelope("reviews", &result))
}

/// Nested listing: scoped to one tour by a base filter, so user-supplied
/// filters cannot widen the result set.
pub async fn list_tour_reviews(
    State(state): State<AppState>,
    Path(tour_id): Path<String>,
    Query(params): Query<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, Error> {
    let plan = clamp_plan(ReadPlan::from_params(&params), &state);
    let base = FilterExpr::Eq(fields::TOUR.to_string(), Value::Text(tour_id));
    let result = state.reviews.find_many(&plan, Some(&base)).await?;
    Ok(list_envelope("reviews", &result))
}

pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let review = state.reviews.find_by_id(&id).await?;
    Ok(data_envelope("review", &review))
}

pub async fn create_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut input): Json<ReviewInput>,
) -> Result<impl IntoResponse, Error> {
    if input.user.is_none() {
        input.user = Some(user.id.clone());
    }
    let review = state.reviews.create(input).await?;
    Ok(data_envelope("review", &review))
}

/// Nested creation: the tour comes from the path and the author from the
/// authenticated caller unless the body says otherwise.
pub async fn create_tour_review(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(tour_id): Path<String>,
    Json(mut input): Json<ReviewInput>,
) -> Result<impl IntoResponse, Error> {
    if input.tour.is_none() {
        input.tour = Some(tour_id);
    }
    if input.user.is_none() {
        input.user = Some(user.id.clone());
    }
    let review = state.reviews.create(input).await?;
    Ok(data_envelope("review", &review))
}

pub async fn update_review(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<ReviewPatch>,
) -> Result<impl IntoResponse, Error> {
    let review = state.reviews.find_and_update(&id, patch).await?;
    Ok(data_envelope("review", &review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    state.reviews.find_and_delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
