//! Booking submission

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookslot_core::BookingRequest;
use bookslot_domain::{Appointment, StudentContact};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BookingBody {
    pub appointment_type_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub student: StudentContact,
}

pub async fn create_booking(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
    caller: Caller,
    Json(body): Json<BookingBody>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let request = BookingRequest {
        instructor_id,
        student_id: caller.user_id,
        appointment_type_id: body.appointment_type_id,
        start: body.start,
        end: body.end,
        contact: body.student,
    };

    let appointment = state.booking.book(request).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}
