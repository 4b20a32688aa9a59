//! Calendar sync outbox worker

mod outbox_worker;

pub use outbox_worker::{calculate_backoff, CalendarOutboxWorker, OutboxWorkerConfig};
