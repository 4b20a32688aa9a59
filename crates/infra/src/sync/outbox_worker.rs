//! Background worker applying queued calendar mirror operations.
//!
//! Polls the outbox for pending jobs and replays each one against the
//! external calendar. Join handles are tracked, cancellation is explicit,
//! and batch processing is bounded by a timeout. Provider failures reschedule
//! the job with exponential backoff until the retry budget is exhausted.

use std::sync::Arc;
use std::time::Duration;

use bookslot_core::{AppointmentRepository, CalendarEventPort, OutboxQueue};
use bookslot_domain::{BookslotError, SyncAction, SyncJob};
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the outbox worker.
#[derive(Debug, Clone)]
pub struct OutboxWorkerConfig {
    /// Maximum number of jobs to process per batch
    pub batch_size: usize,
    /// Interval between polling attempts
    pub poll_interval: Duration,
    /// Timeout for processing a single batch
    pub processing_timeout: Duration,
    /// Maximum attempts before marking a job permanently failed
    pub max_retries: u32,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            poll_interval: Duration::from_secs(30),
            processing_timeout: Duration::from_secs(300),
            max_retries: 3,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Outbox worker with explicit lifecycle management.
pub struct CalendarOutboxWorker {
    outbox: Arc<dyn OutboxQueue>,
    appointments: Arc<dyn AppointmentRepository>,
    events: Arc<dyn CalendarEventPort>,
    config: OutboxWorkerConfig,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl CalendarOutboxWorker {
    pub fn new(
        outbox: Arc<dyn OutboxQueue>,
        appointments: Arc<dyn AppointmentRepository>,
        events: Arc<dyn CalendarEventPort>,
        config: OutboxWorkerConfig,
    ) -> Self {
        Self {
            outbox,
            appointments,
            events,
            config,
            cancellation: CancellationToken::new(),
            task_handle: None,
        }
    }

    /// Start the worker, spawning the background processing task.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), String> {
        if self.is_running() {
            return Err("worker already running".to_string());
        }

        info!("starting calendar outbox worker");
        self.cancellation = CancellationToken::new();

        let outbox = Arc::clone(&self.outbox);
        let appointments = Arc::clone(&self.appointments);
        let events = Arc::clone(&self.events);
        let config = self.config.clone();
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::process_loop(outbox, appointments, events, config, cancel).await;
        });

        self.task_handle = Some(handle);
        Ok(())
    }

    /// Stop the worker and wait for the processing task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), String> {
        if !self.is_running() {
            return Err("worker not running".to_string());
        }

        info!("stopping calendar outbox worker");
        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            match tokio::time::timeout(self.config.join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("worker task panicked: {e}");
                    return Err("worker task panicked".to_string());
                }
                Err(_) => {
                    warn!("worker task did not complete within timeout");
                    return Err("worker task timeout".to_string());
                }
            }
        }

        info!("calendar outbox worker stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    async fn process_loop(
        outbox: Arc<dyn OutboxQueue>,
        appointments: Arc<dyn AppointmentRepository>,
        events: Arc<dyn CalendarEventPort>,
        config: OutboxWorkerConfig,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("outbox worker process loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.poll_interval) => {
                    match tokio::time::timeout(
                        config.processing_timeout,
                        Self::process_batch(&outbox, &appointments, &events, &config),
                    )
                    .await
                    {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => error!(error = %e, "outbox batch failed"),
                        Err(_) => warn!(
                            timeout_secs = config.processing_timeout.as_secs(),
                            "outbox batch timed out"
                        ),
                    }
                }
            }
        }
    }

    /// Process one batch of due jobs.
    pub async fn process_batch(
        outbox: &Arc<dyn OutboxQueue>,
        appointments: &Arc<dyn AppointmentRepository>,
        events: &Arc<dyn CalendarEventPort>,
        config: &OutboxWorkerConfig,
    ) -> Result<(), String> {
        let jobs = outbox
            .pending_ready(Utc::now(), config.batch_size)
            .await
            .map_err(|e| format!("failed to fetch pending jobs: {e}"))?;

        if jobs.is_empty() {
            return Ok(());
        }
        info!(count = jobs.len(), "processing outbox batch");

        let mut fatal_errors: Vec<String> = Vec::new();
        for job in jobs {
            match Self::apply_job(appointments, events, &job).await {
                Ok(()) => {
                    if let Err(e) = outbox.mark_sent(job.id).await {
                        warn!(job_id = %job.id, error = %e, "mark_sent failed");
                        fatal_errors.push(format!("mark_sent error for {}: {e}", job.id));
                    }
                }
                Err(e) => {
                    let attempts = job.attempts + 1;
                    let reason = truncate_reason(&e.to_string());
                    let outcome = if attempts >= config.max_retries {
                        warn!(job_id = %job.id, attempts, error = %e, "job exhausted retries");
                        outbox.mark_failed(job.id, &reason).await
                    } else {
                        let delay = Duration::from_millis(calculate_backoff(job.attempts));
                        debug!(job_id = %job.id, attempts, delay_ms = delay.as_millis() as u64, "rescheduling job");
                        let retry_after = Utc::now()
                            + chrono::Duration::from_std(delay)
                                .unwrap_or_else(|_| chrono::Duration::seconds(32));
                        outbox.mark_retry(job.id, attempts, retry_after, &reason).await
                    };
                    if let Err(mark_err) = outcome {
                        warn!(job_id = %job.id, error = %mark_err, "status update failed");
                        fatal_errors.push(format!("status update error for {}: {mark_err}", job.id));
                    }
                }
            }
        }

        if !fatal_errors.is_empty() {
            return Err(fatal_errors.join("; "));
        }
        Ok(())
    }

    /// Replay one mirror operation. `Ok(())` covers deliberate no-ops such
    /// as an unconnected calendar or an appointment already mirrored.
    async fn apply_job(
        appointments: &Arc<dyn AppointmentRepository>,
        events: &Arc<dyn CalendarEventPort>,
        job: &SyncJob,
    ) -> bookslot_domain::Result<()> {
        match job.action {
            SyncAction::CreateEvent => {
                let appointment = appointments.get(job.appointment_id).await?;
                if appointment.external_event_id.is_some() {
                    debug!(appointment_id = %appointment.id, "event already mirrored");
                    return Ok(());
                }
                // The appointment may have left the active set while this
                // job waited for a retry; mirroring it now would create an
                // event no queued delete will ever remove.
                if !appointment.status.is_active() {
                    debug!(appointment_id = %appointment.id, "appointment no longer active, nothing to mirror");
                    return Ok(());
                }
                if let Some(event_id) = events.create_event(&appointment).await? {
                    appointments.set_external_event_id(appointment.id, Some(&event_id)).await?;
                }
                Ok(())
            }
            SyncAction::UpdateEvent => {
                let appointment = appointments.get(job.appointment_id).await?;
                match appointment.external_event_id.as_deref() {
                    Some(event_id) => events.update_event(&appointment, event_id).await,
                    // Mirror was never created, e.g. the calendar was
                    // connected after booking.
                    None => {
                        if !appointment.status.is_active() {
                            return Ok(());
                        }
                        if let Some(event_id) = events.create_event(&appointment).await? {
                            appointments
                                .set_external_event_id(appointment.id, Some(&event_id))
                                .await?;
                        }
                        Ok(())
                    }
                }
            }
            SyncAction::DeleteEvent => {
                let appointment = match appointments.get(job.appointment_id).await {
                    Ok(a) => a,
                    // The appointment row outlives every queued job in
                    // practice; a missing row leaves nothing to unmirror.
                    Err(BookslotError::NotFound(_)) => return Ok(()),
                    Err(e) => return Err(e),
                };
                let Some(event_id) = appointment.external_event_id.as_deref() else {
                    return Ok(());
                };
                events.delete_event(job.instructor_id, event_id).await?;
                appointments.set_external_event_id(appointment.id, None).await
            }
        }
    }
}

impl Drop for CalendarOutboxWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("outbox worker dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}

/// Exponential backoff with jitter for retry scheduling, in milliseconds.
pub fn calculate_backoff(attempt: u32) -> u64 {
    let base_delay = 1000u64;
    let max_delay = 32000u64;

    let delay = base_delay * 2u64.pow(attempt.min(5));
    let capped_delay = delay.min(max_delay);

    // Add ±25% jitter
    use rand::Rng;
    let jitter_range = (capped_delay as f64 * 0.25) as u64;
    let mut rng = rand::thread_rng();
    let jitter = rng.gen_range(0..=jitter_range * 2) as i64 - jitter_range as i64;

    (capped_delay as i64 + jitter).max(0) as u64
}

fn truncate_reason(reason: &str) -> String {
    const MAX_LEN: usize = 256;
    if reason.len() <= MAX_LEN {
        return reason.to_string();
    }
    let mut truncated = reason.chars().take(MAX_LEN.saturating_sub(3)).collect::<String>();
    truncated.push_str("...");
    truncated
}
