//! Manual block management

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookslot_domain::{BookslotError, ManualBlock};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Caller;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockBody {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

pub async fn create_block(
    State(state): State<AppState>,
    Path(instructor_id): Path<Uuid>,
    caller: Caller,
    Json(body): Json<BlockBody>,
) -> ApiResult<(StatusCode, Json<ManualBlock>)> {
    caller.require_instructor_access(instructor_id)?;

    if body.start >= body.end {
        return Err(BookslotError::Validation("block start must precede end".to_string()).into());
    }

    let block = ManualBlock {
        id: Uuid::now_v7(),
        instructor_id,
        start: body.start,
        end: body.end,
        reason: body.reason,
        created_at: Utc::now(),
    };
    state.blocks.insert(&block).await?;

    Ok((StatusCode::CREATED, Json(block)))
}

pub async fn delete_block(
    State(state): State<AppState>,
    Path((instructor_id, block_id)): Path<(Uuid, Uuid)>,
    caller: Caller,
) -> ApiResult<StatusCode> {
    caller.require_instructor_access(instructor_id)?;

    if !state.blocks.delete(instructor_id, block_id).await? {
        return Err(BookslotError::NotFound(format!("manual block {block_id}")).into());
    }
    Ok(StatusCode::NO_CONTENT)
}
