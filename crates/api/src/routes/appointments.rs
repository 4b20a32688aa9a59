//! Appointment lifecycle transitions

use axum::extract::{Path, State};
use axum::Json;
use bookslot_domain::{Appointment, AppointmentStatus, BookslotError};
use uuid::Uuid;

use crate::auth::{Caller, Role};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn confirm(
    state: State<AppState>,
    path: Path<Uuid>,
    caller: Caller,
) -> ApiResult<Json<Appointment>> {
    instructor_transition(state, path, caller, AppointmentStatus::Confirmed).await
}

pub async fn reject(
    state: State<AppState>,
    path: Path<Uuid>,
    caller: Caller,
) -> ApiResult<Json<Appointment>> {
    instructor_transition(state, path, caller, AppointmentStatus::Rejected).await
}

pub async fn complete(
    state: State<AppState>,
    path: Path<Uuid>,
    caller: Caller,
) -> ApiResult<Json<Appointment>> {
    instructor_transition(state, path, caller, AppointmentStatus::Completed).await
}

/// Cancellation is open to the booking student as well as the instructor.
pub async fn cancel(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    caller: Caller,
) -> ApiResult<Json<Appointment>> {
    let appointment = state.appointments.get(appointment_id).await?;

    let allowed = match caller.role {
        Role::Student => appointment.student_id == caller.user_id,
        _ => caller.can_manage_instructor(appointment.instructor_id),
    };
    if !allowed {
        return Err(BookslotError::Authorization(
            "only the booking student or the instructor may cancel".to_string(),
        )
        .into());
    }

    let updated = state.lifecycle.transition(appointment_id, AppointmentStatus::Cancelled).await?;
    Ok(Json(updated))
}

async fn instructor_transition(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    caller: Caller,
    target: AppointmentStatus,
) -> ApiResult<Json<Appointment>> {
    let appointment = state.appointments.get(appointment_id).await?;
    caller.require_instructor_access(appointment.instructor_id)?;

    let updated = state.lifecycle.transition(appointment_id, target).await?;
    Ok(Json(updated))
}
