//! Calendar sync ports

pub mod ports;

pub use ports::{CalendarEventPort, CredentialStore, OutboxQueue};
