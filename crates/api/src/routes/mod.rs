//! Route table and handlers

mod appointments;
mod availability;
mod blocks;
mod bookings;
mod calendar;

use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/instructors/{id}/slots", get(availability::list_slots))
        .route("/instructors/{id}/bookings", post(bookings::create_booking))
        .route("/instructors/{id}/blocks", post(blocks::create_block))
        .route("/instructors/{id}/blocks/{block_id}", delete(blocks::delete_block))
        .route("/instructors/{id}/calendar/status", get(calendar::status))
        .route("/calendar/connect", get(calendar::connect))
        .route("/calendar/callback", get(calendar::callback))
        .route("/calendar/disconnect", post(calendar::disconnect))
        .route("/calendar/calendar-id", post(calendar::set_calendar_id))
        .route("/appointments/{id}/confirm", post(appointments::confirm))
        .route("/appointments/{id}/reject", post(appointments::reject))
        .route("/appointments/{id}/cancel", post(appointments::cancel))
        .route("/appointments/{id}/complete", post(appointments::complete))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
