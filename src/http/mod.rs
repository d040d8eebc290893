//! HTTP boundary: route wiring, the error-to-status mapping, and the JSON
//! response envelopes. Handlers stay thin; semantics live in the domain and
//! query layers.

pub mod auth;
pub mod extract;
pub mod reviews;
pub mod tours;
pub mod users;

use std::time::Duration;

use axum::http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::error::{Error, ErrorCode};
use crate::query::exec::FindResult;
use crate::query::plan::ReadPlan;
use crate::state::AppState;
use crate::store::document::Document;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/v1/users/signup", axum::routing::post(auth::signup))
        .route("/api/v1/users/login", axum::routing::post(auth::login))
        .route("/api/v1/users", get(users::list_users))
        .route("/api/v1/users/:id", get(users::get_user))
        .route(
            "/api/v1/tours",
            get(tours::list_tours).post(tours::create_tour),
        )
        .route("/api/v1/tours/top-5-cheap", get(tours::top_five_cheap))
        .route("/api/v1/tours/stats", get(tours::tour_stats))
        .route("/api/v1/tours/monthly-plan/:year", get(tours::monthly_plan))
        .route(
            "/api/v1/tours/:id",
            get(tours::get_tour)
                .patch(tours::update_tour)
                .delete(tours::delete_tour),
        )
        .route(
            "/api/v1/tours/:id/reviews",
            get(reviews::list_tour_reviews).post(reviews::create_tour_review),
        )
        .route(
            "/api/v1/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/api/v1/reviews/:id",
            get(reviews::get_review)
                .patch(reviews::update_review)
                .delete(reviews::delete_review),
        )
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState) -> Result<(), Error> {
    let address = format!("0.0.0.0:{}", state.config.port);
    let listener = TcpListener::bind(&address).await?;
    info!("server running on {address}");

    let app = router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if ctrl_c().await.is_ok() {
            info!("received interrupt, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => error!("failed to install terminate handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.code() {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::Decode
            | ErrorCode::Store
            | ErrorCode::Io
            | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Client faults carry their message; server faults are logged and
        // answered generically.
        let (kind, message) = if status.is_client_error() {
            ("fail", self.to_string())
        } else {
            error!(code = self.code_str(), "request failed: {self}");
            ("error", "something went wrong".to_string())
        };

        (
            status,
            Json(json!({ "status": kind, "message": message })),
        )
            .into_response()
    }
}

/// Applies the deployment page-size cap before a plan executes.
pub(crate) fn clamp_plan(mut plan: ReadPlan, state: &AppState) -> ReadPlan {
    plan.limit = plan.limit.min(state.config.max_page_size);
    plan
}

pub(crate) fn list_envelope(key: &str, result: &FindResult) -> Json<serde_json::Value> {
    let docs: Vec<serde_json::Value> = result.documents.iter().map(Document::to_json).collect();
    Json(json!({
        "status": "success",
        "results": docs.len(),
        "total": result.matched,
        "data": { key: docs },
    }))
}

pub(crate) fn data_envelope(key: &str, doc: &Document) -> Json<serde_json::Value> {
    Json(json!({
        "status": "success",
        "data": { key: doc.to_json() },
    }))
}
