//! # Bookslot Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The slot computation engine
//! - The booking transaction coordinator
//! - The appointment lifecycle state machine
//!
//! ## Architecture Principles
//! - Only depends on `bookslot-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod availability;
pub mod booking;
pub mod clock;
pub mod lifecycle;
pub mod sync;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export specific items to avoid ambiguity
pub use availability::ports::{ExternalBusySource, ManualBlockRepository};
pub use availability::AvailabilityService;
pub use booking::ports::{AppointmentRepository, AppointmentTypeRepository};
pub use booking::{BookingRequest, BookingService};
pub use clock::{Clock, SystemClock};
pub use lifecycle::LifecycleService;
pub use sync::ports::{CalendarEventPort, CredentialStore, OutboxQueue};
