use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::app::{AppError, DashboardApp, SelectionChange};
use crate::error::ApiError;

type ApiResult<T> = Result<T, (StatusCode, String)>;

/// Build the Axum router for the scoreboard API.
pub fn router(app: Arc<DashboardApp>) -> Router {
    Router::new()
        .route("/api/session", get(session_handler))
        .route("/api/session/key", put(submit_key_handler).delete(logout_handler))
        .route("/api/session/retry", post(retry_handler))
        .route("/api/session/sportsbook-group", put(sportsbook_group_handler))
        .route("/api/sports", get(sports_handler))
        .route("/api/scoreboard", get(scoreboard_handler))
        .route("/api/scoreboard/selection", put(selection_handler))
        .route("/api/events/:id", get(open_event_handler).delete(close_event_handler))
        .route(
            "/api/events/:id/sections/:section/line-movement",
            get(line_movement_handler),
        )
        .route("/api/events/:id/fights", post(fights_handler))
        .layer(CorsLayer::permissive())
        .with_state(app)
}

fn error_response(e: AppError) -> (StatusCode, String) {
    let status = match &e {
        AppError::NeedsKey | AppError::NotReady => StatusCode::CONFLICT,
        AppError::EmptyKey
        | AppError::InvalidSportsbookGroup(_)
        | AppError::InvalidEventId(_)
        | AppError::UnknownSection(_) => StatusCode::BAD_REQUEST,
        AppError::NoDetail(_) | AppError::NotOpen(_) => StatusCode::NOT_FOUND,
        AppError::Api(ApiError::Unsupported { .. }) => StatusCode::NOT_FOUND,
        AppError::Api(api) if api.is_unauthorized() => StatusCode::FORBIDDEN,
        AppError::Api(_) => StatusCode::BAD_GATEWAY,
    };
    (status, e.to_string())
}

#[derive(Deserialize)]
struct KeyBody {
    key: String,
}

#[derive(Deserialize)]
struct GroupBody {
    group: String,
}

#[derive(Deserialize)]
struct EventQuery {
    date: Option<NaiveDate>,
}

/// GET /api/session
async fn session_handler(State(app): State<Arc<DashboardApp>>) -> impl IntoResponse {
    Json(app.status().await)
}

/// PUT /api/session/key
async fn submit_key_handler(
    State(app): State<Arc<DashboardApp>>,
    Json(body): Json<KeyBody>,
) -> ApiResult<impl IntoResponse> {
    app.submit_key(&body.key)
        .await
        .map(Json)
        .map_err(error_response)
}

/// DELETE /api/session/key
async fn logout_handler(State(app): State<Arc<DashboardApp>>) -> impl IntoResponse {
    Json(app.logout().await)
}

/// POST /api/session/retry
async fn retry_handler(State(app): State<Arc<DashboardApp>>) -> ApiResult<impl IntoResponse> {
    app.retry_probe().await.map(Json).map_err(error_response)
}

/// PUT /api/session/sportsbook-group
async fn sportsbook_group_handler(
    State(app): State<Arc<DashboardApp>>,
    Json(body): Json<GroupBody>,
) -> ApiResult<impl IntoResponse> {
    app.set_sportsbook_group(&body.group)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /api/sports
async fn sports_handler(State(app): State<Arc<DashboardApp>>) -> impl IntoResponse {
    Json(app.sports().await)
}

/// GET /api/scoreboard
async fn scoreboard_handler(State(app): State<Arc<DashboardApp>>) -> impl IntoResponse {
    Json(app.scoreboard().await)
}

/// PUT /api/scoreboard/selection
async fn selection_handler(
    State(app): State<Arc<DashboardApp>>,
    Json(change): Json<SelectionChange>,
) -> impl IntoResponse {
    Json(app.select(change).await)
}

/// GET /api/events/:id?date=YYYY-MM-DD
async fn open_event_handler(
    State(app): State<Arc<DashboardApp>>,
    Path(id): Path<String>,
    Query(query): Query<EventQuery>,
) -> ApiResult<impl IntoResponse> {
    app.open_event(&id, query.date)
        .await
        .map(Json)
        .map_err(error_response)
}

/// DELETE /api/events/:id
async fn close_event_handler(
    State(app): State<Arc<DashboardApp>>,
    Path(id): Path<String>,
) -> StatusCode {
    if app.close_event(&id).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// GET /api/events/:id/sections/:section/line-movement
async fn line_movement_handler(
    State(app): State<Arc<DashboardApp>>,
    Path((id, section)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    app.line_movement(&id, &section)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /api/events/:id/fights
async fn fights_handler(
    State(app): State<Arc<DashboardApp>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    app.expand_fights(&id)
        .await
        .map(Json)
        .map_err(error_response)
}
