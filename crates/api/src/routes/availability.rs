//! Free-slot listing

use axum::extract::{Path, Query, State};
use axum::Json;
use bookslot_domain::{BookslotError, FreeSlot};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub appointment_type_id: Uuid,
}

pub async fn list_slots(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
    Query(query): Query<SlotQuery>,
) -> ApiResult<Json<Vec<FreeSlot>>> {
    let appointment_type = state
        .appointment_types
        .get(query.appointment_type_id)
        .await
        .map_err(|err| match err {
            BookslotError::NotFound(_) => {
                BookslotError::Validation("unknown appointment type".to_string())
            }
            other => other,
        })?;

    if appointment_type.instructor_id != instructor_id {
        return Err(BookslotError::Validation(
            "appointment type belongs to another instructor".to_string(),
        )
        .into());
    }
    if !appointment_type.active {
        return Err(
            BookslotError::Validation("appointment type is not active".to_string()).into()
        );
    }

    let slots = state.availability.free_slots(instructor_id, query.date, &appointment_type).await?;
    Ok(Json(slots))
}
