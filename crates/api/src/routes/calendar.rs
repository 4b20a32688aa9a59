//! Calendar connection endpoints
//!
//! Connect, callback, disconnect and target-calendar selection all operate
//! on the caller's own account; only the status endpoint takes an explicit
//! instructor id.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookslot_domain::CalendarStatus;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn connect(State(state): State<AppState>, caller: Caller) -> ApiResult<Json<Value>> {
    caller.require_instructor_access(caller.user_id)?;

    let url = state.oauth.authorization_url(caller.user_id)?;
    Ok(Json(json!({ "authorization_url": url })))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
    pub state: String,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Json<Value>> {
    let instructor_id = state.oauth.handle_callback(&query.code, &query.state).await?;
    Ok(Json(json!({ "instructor_id": instructor_id, "connected": true })))
}

pub async fn disconnect(State(state): State<AppState>, caller: Caller) -> ApiResult<StatusCode> {
    caller.require_instructor_access(caller.user_id)?;

    state.oauth.disconnect(caller.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct CalendarIdBody {
    pub calendar_id: String,
}

pub async fn set_calendar_id(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<CalendarIdBody>,
) -> ApiResult<StatusCode> {
    caller.require_instructor_access(caller.user_id)?;

    state.oauth.set_calendar_id(caller.user_id, &body.calendar_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn status(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
    caller: Caller,
) -> ApiResult<Json<CalendarStatus>> {
    caller.require_instructor_access(instructor_id)?;

    let status = state.oauth.status(instructor_id).await?;
    Ok(Json(status))
}
