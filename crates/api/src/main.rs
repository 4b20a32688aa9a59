use std::sync::Arc;

use anyhow::Context;
use bookslot_api::{router, AppState};
use bookslot_core::{
    AvailabilityService, BookingService, LifecycleService, SystemClock,
};
use bookslot_infra::database::{
    DatabaseManager, SqliteAppointmentRepository, SqliteAppointmentTypeRepository,
    SqliteCredentialStore, SqliteManualBlockRepository, SqliteOutboxRepository,
};
use bookslot_infra::integrations::calendar::{
    CalendarApiClient, CalendarOAuthManager, ExternalCalendarBusySource,
};
use bookslot_infra::observability::init_tracing;
use bookslot_infra::sync::{CalendarOutboxWorker, OutboxWorkerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = bookslot_infra::config::load().context("failed to load configuration")?;

    let db = DatabaseManager::new(&config.database.path, config.database.pool_size)
        .context("failed to open database")?;

    let appointments = Arc::new(SqliteAppointmentRepository::new(db.clone()));
    let appointment_types = Arc::new(SqliteAppointmentTypeRepository::new(db.clone()));
    let blocks = Arc::new(SqliteManualBlockRepository::new(db.clone()));
    let credentials = Arc::new(SqliteCredentialStore::new(db.clone()));
    let outbox = Arc::new(SqliteOutboxRepository::new(db.clone()));

    let oauth = Arc::new(
        CalendarOAuthManager::new(config.calendar.clone(), credentials)
            .context("failed to build calendar oauth manager")?,
    );
    let events = Arc::new(
        CalendarApiClient::new(oauth.clone(), config.calendar.api_base_url.clone())
            .context("failed to build calendar client")?,
    );
    let external_busy = Arc::new(
        ExternalCalendarBusySource::new(oauth.clone(), config.calendar.api_base_url.clone())
            .context("failed to build busy source")?,
    );

    let clock = Arc::new(SystemClock);
    let availability = Arc::new(AvailabilityService::new(
        appointments.clone(),
        blocks.clone(),
        external_busy,
        config.booking.clone(),
        clock.clone(),
    ));
    let booking = Arc::new(BookingService::new(
        availability.clone(),
        appointments.clone(),
        appointment_types.clone(),
        outbox.clone(),
        clock,
    ));
    let lifecycle = Arc::new(LifecycleService::new(appointments.clone(), outbox.clone()));

    let mut worker = CalendarOutboxWorker::new(
        outbox,
        appointments.clone(),
        events,
        OutboxWorkerConfig::default(),
    );
    worker.start().map_err(anyhow::Error::msg)?;

    let state = AppState {
        availability,
        booking,
        lifecycle,
        oauth,
        appointments,
        appointment_types,
        blocks,
    };
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "bookslot listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    worker.stop().await.map_err(anyhow::Error::msg)?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
